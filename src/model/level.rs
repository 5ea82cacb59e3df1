//! Persisted level record consumed by the game client

use crate::io::configuration::OCCUPANCY_TOLERANCE;
use crate::io::error::{GenerationError, Result};
use crate::model::difficulty::Difficulty;
use crate::model::point::Point;
use crate::model::vine::Vine;
use crate::spatial::OccupancyGrid;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How the points of a mask are interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskMode {
    /// Listed points are hidden
    #[serde(rename = "hide")]
    Hide,
    /// Only listed points are visible
    #[serde(rename = "show")]
    Show,
    /// Every point is visible regardless of the list
    #[serde(rename = "show-all")]
    ShowAll,
}

/// Visibility declaration reconciling full visual coverage with unfilled cells
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    /// Interpretation of `points`
    pub mode: MaskMode,
    /// Cells affected by the mask
    pub points: Vec<Point>,
}

impl Mask {
    /// Test whether a cell is hidden by this mask
    pub fn is_masked(&self, point: Point) -> bool {
        let listed = self.points.contains(&point);
        match self.mode {
            MaskMode::Hide => listed,
            MaskMode::Show => !listed,
            MaskMode::ShowAll => false,
        }
    }
}

/// A complete generated level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Level number
    pub id: u32,
    /// Display name
    pub name: String,
    /// Difficulty tier
    pub difficulty: Difficulty,
    /// Grid dimensions as `[width, height]`
    pub grid_size: [usize; 2],
    /// Optional visibility mask
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Mask>,
    /// Vines in the order they are listed to the client
    pub vines: Vec<Vine>,
    /// Upper bound on moves the player may take
    pub max_moves: usize,
    /// Moves needed by the shortest known clearing order
    pub min_moves: usize,
    /// Complexity label of the tier
    pub complexity: String,
    /// Lives granted to the player
    pub grace: u32,
    /// Colors referenced by vine color indices
    pub color_scheme: Vec<String>,
    /// Seed that produced the accepted attempt
    #[serde(default)]
    pub generation_seed: u64,
    /// Attempts used by the generator
    #[serde(default)]
    pub generation_attempts: usize,
    /// Wall-clock generation time
    #[serde(default)]
    pub generation_elapsed_ms: u64,
    /// Heuristic quality score
    #[serde(default)]
    pub generation_score: f64,
}

impl Level {
    /// Grid width
    pub const fn width(&self) -> usize {
        self.grid_size[0]
    }

    /// Grid height
    pub const fn height(&self) -> usize {
        self.grid_size[1]
    }

    /// Number of grid cells
    pub const fn total_cells(&self) -> usize {
        self.width() * self.height()
    }

    /// Number of cells covered by vines
    pub fn occupied_cells(&self) -> usize {
        self.vines.iter().map(Vine::len).sum()
    }

    /// Fraction of the grid covered by vines
    pub fn coverage(&self) -> f64 {
        if self.total_cells() == 0 {
            return 0.0;
        }
        self.occupied_cells() as f64 / self.total_cells() as f64
    }

    /// Test whether the client renders the cell
    pub fn is_cell_visible(&self, point: Point) -> bool {
        self.mask.as_ref().is_none_or(|mask| !mask.is_masked(point))
    }

    /// Check ids, vine shapes and cell ownership
    ///
    /// # Errors
    ///
    /// Returns `InvalidVine` for a duplicate id, a malformed vine or two vines
    /// sharing a cell
    pub fn validate_structure(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for vine in &self.vines {
            if !seen.insert(vine.id.as_str()) {
                return Err(GenerationError::InvalidVine {
                    vine_id: vine.id.clone(),
                    reason: "duplicate id".to_string(),
                });
            }
            vine.validate(self.width(), self.height())?;
        }
        OccupancyGrid::from_vines(self.width(), self.height(), &self.vines)?;
        Ok(())
    }

    /// Lowest occupancy accepted for the level's tier
    ///
    /// The tier's occupancy floor capped at its non-LIFO coverage target, less
    /// the tolerance.
    pub fn minimum_occupancy(&self) -> f64 {
        let spec = self.difficulty.spec();
        (spec.min_occupancy.min(spec.non_lifo_coverage) - OCCUPANCY_TOLERANCE).max(0.0)
    }

    /// Check the design rules the oracle does not see
    ///
    /// The oracle ignores a vine's own cells, so a vine whose body lies on
    /// its own exit path is rejected here. Occupancy must also reach the
    /// tier minimum.
    ///
    /// # Errors
    ///
    /// Returns `InvalidVine` for a self-blocking vine or
    /// `CoverageInsufficient` when too few cells are occupied
    pub fn validate_design(&self) -> Result<()> {
        if let Some(vine) = self
            .vines
            .iter()
            .find(|vine| vine.blocks_own_exit(self.width(), self.height()))
        {
            return Err(GenerationError::InvalidVine {
                vine_id: vine.id.clone(),
                reason: format!("body lies on its own exit path {}", vine.head_direction),
            });
        }

        let required = self.minimum_occupancy();
        if self.coverage() < required {
            return Err(GenerationError::CoverageInsufficient {
                achieved: self.coverage(),
                required,
            });
        }
        Ok(())
    }
}
