//! Vine placement strategies
//!
//! A strategy lays out the primary vines of one attempt. Strategies are looked
//! up by name in a [`StrategyRegistry`] built once at start-up.

/// Reference strategy with an exit guarantee per vine
pub mod center_out;
/// Anchor-then-fill strategy gated by the greedy check
pub mod clearable_first;
/// Edge-biased strategy without ordering guarantees
pub mod direction_first;
/// Seed selection and body growth helpers
pub mod growth;
/// Name-keyed strategy lookup
pub mod registry;

use crate::io::error::Result;
use crate::model::generation::{GenerationConfig, GenerationStats};
use crate::model::vine::Vine;
use crate::spatial::OccupancyGrid;
use rand::rngs::StdRng;

pub use registry::StrategyRegistry;

/// Name of the LIFO centre-out strategy
pub const STRATEGY_CENTER_OUT: &str = "center-out";
/// Name of the edge-biased strategy
pub const STRATEGY_DIRECTION_FIRST: &str = "direction-first";
/// Name of the greedy-checked strategy
pub const STRATEGY_CLEARABLE_FIRST: &str = "clearable-first";

/// Inputs shared by every strategy for one attempt
#[derive(Clone, Copy, Debug)]
pub struct PlacementContext<'a> {
    /// Effective configuration for the attempt, relaxations applied
    pub config: &'a GenerationConfig,
    /// Zero-based attempt number
    pub attempt: usize,
    /// Seed the attempt's random stream was built from
    pub seed: u64,
}

/// Vines laid out by a strategy together with the grid they occupy
#[derive(Clone, Debug)]
pub struct Placement {
    /// Vines in placement order
    pub vines: Vec<Vine>,
    /// Ownership of every cell
    pub grid: OccupancyGrid,
}

impl Placement {
    /// Empty placement sized for the attempt's grid
    pub fn empty(config: &GenerationConfig) -> Self {
        Self {
            vines: Vec::new(),
            grid: OccupancyGrid::new(config.grid_width, config.grid_height),
        }
    }

    /// Append a vine, claiming its cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidVine` if a cell is outside the grid or already owned
    pub fn push(&mut self, vine: Vine) -> Result<()> {
        self.grid.place_vine(&vine)?;
        self.vines.push(vine);
        Ok(())
    }

    /// Remove the vine with `id`, releasing its cells
    pub fn remove(&mut self, id: &str) -> Option<Vine> {
        let position = self.vines.iter().position(|vine| vine.id == id)?;
        let vine = self.vines.remove(position);
        self.grid.remove_vine(&vine);
        Some(vine)
    }

    /// Remove up to `count` of the most recently placed vines
    pub fn pop_recent(&mut self, count: usize) -> Vec<Vine> {
        let keep = self.vines.len().saturating_sub(count);
        let removed = self.vines.split_off(keep);
        for vine in &removed {
            self.grid.remove_vine(vine);
        }
        removed
    }

    /// Vine with `id`
    pub fn vine(&self, id: &str) -> Option<&Vine> {
        self.vines.iter().find(|vine| vine.id == id)
    }

    /// Fraction of cells covered
    pub fn coverage(&self) -> f64 {
        self.grid.coverage()
    }
}

/// Interchangeable algorithm producing an initial vine layout
pub trait PlacementStrategy: Send + Sync {
    /// Registry name
    fn name(&self) -> &'static str;

    /// One-line summary for listings
    fn description(&self) -> &'static str;

    /// Whether every vine is placed with a clear corridor
    ///
    /// Placements from such strategies are solvable in reverse placement order.
    fn is_lifo(&self) -> bool;

    /// Lay out the primary vines of one attempt
    ///
    /// # Errors
    ///
    /// Returns `Placement` when too few vines could be laid out
    fn place_vines(
        &self,
        context: &PlacementContext<'_>,
        rng: &mut StdRng,
        stats: &mut GenerationStats,
    ) -> Result<Placement>;
}
