//! Vine records and their structural invariants

use crate::io::error::{GenerationError, Result};
use crate::model::point::{Direction, Point};
use serde::{Deserialize, Serialize};

/// Prefix shared by every generated vine identifier
pub const VINE_ID_PREFIX: &str = "vine_";

/// A contiguous orthogonal path of cells that slides off the grid in its head direction
///
/// `ordered_path[0]` is the head and the last element is the tail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vine {
    /// Identifier, unique within a level
    pub id: String,
    /// Direction the head travels when the vine is cleared
    pub head_direction: Direction,
    /// Cells from head to tail
    pub ordered_path: Vec<Point>,
    /// Index into the level's color scheme
    #[serde(default)]
    pub color_index: usize,
}

impl Vine {
    /// Create a vine with color index 0
    pub fn new(id: impl Into<String>, head_direction: Direction, ordered_path: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            head_direction,
            ordered_path,
            color_index: 0,
        }
    }

    /// Build a vine whose head direction is implied by its first two cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidVine` if the path has fewer than two cells or the first
    /// two cells are not adjacent
    pub fn from_path(id: impl Into<String>, ordered_path: Vec<Point>) -> Result<Self> {
        let id = id.into();
        let direction = match (ordered_path.first(), ordered_path.get(1)) {
            (Some(&head), Some(&neck)) => neck.direction_to(head),
            _ => None,
        };
        let Some(head_direction) = direction else {
            return Err(GenerationError::InvalidVine {
                vine_id: id,
                reason: "head and neck must be two adjacent cells".to_string(),
            });
        };
        Ok(Self::new(id, head_direction, ordered_path))
    }

    /// Head cell
    pub fn head(&self) -> Option<Point> {
        self.ordered_path.first().copied()
    }

    /// The cell the head would move into next
    pub fn head_target(&self) -> Option<Point> {
        self.head().map(|head| head.step(self.head_direction))
    }

    /// Number of cells in the path
    pub fn len(&self) -> usize {
        self.ordered_path.len()
    }

    /// Test whether the path has no cells
    pub fn is_empty(&self) -> bool {
        self.ordered_path.is_empty()
    }

    /// Test whether a body cell lies on the head's path off a grid
    pub fn blocks_own_exit(&self, width: usize, height: usize) -> bool {
        let Some(mut cell) = self.head_target() else {
            return false;
        };
        let inside = |point: Point| {
            point.x >= 0 && point.y >= 0 && (point.x as usize) < width && (point.y as usize) < height
        };
        while inside(cell) {
            if self.ordered_path.iter().skip(1).any(|&body| body == cell) {
                return true;
            }
            cell = cell.step(self.head_direction);
        }
        false
    }

    /// Numeric suffix of a `vine_N` identifier
    pub fn sequence_number(&self) -> Option<usize> {
        self.id.strip_prefix(VINE_ID_PREFIX)?.parse().ok()
    }

    /// Check length, adjacency, head consistency and grid bounds
    ///
    /// # Errors
    ///
    /// Returns `InvalidVine` describing the first violated invariant
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        let invalid = |reason: String| GenerationError::InvalidVine {
            vine_id: self.id.clone(),
            reason,
        };

        if self.ordered_path.len() < 2 {
            return Err(invalid(format!(
                "length {} is below the minimum of 2",
                self.ordered_path.len()
            )));
        }

        for point in &self.ordered_path {
            let inside = point.x >= 0
                && point.y >= 0
                && (point.x as usize) < width
                && (point.y as usize) < height;
            if !inside {
                return Err(invalid(format!("cell {point} lies outside the grid")));
            }
        }

        for pair in self.ordered_path.windows(2) {
            if let [a, b] = pair {
                if a.manhattan_distance(*b) != 1 {
                    return Err(invalid(format!("cells {a} and {b} are not adjacent")));
                }
            }
        }

        let mut seen = std::collections::HashSet::with_capacity(self.ordered_path.len());
        for point in &self.ordered_path {
            if !seen.insert(*point) {
                return Err(invalid(format!("cell {point} is visited twice")));
            }
        }

        if let (Some(&head), Some(&neck)) = (self.ordered_path.first(), self.ordered_path.get(1)) {
            if neck.step(self.head_direction) != head {
                return Err(invalid(format!(
                    "head direction {} disagrees with head {head} and neck {neck}",
                    self.head_direction
                )));
            }
        }

        Ok(())
    }
}

/// Next free `vine_N` identifier after every numbered id in `vines`
pub fn next_vine_id(vines: &[Vine]) -> String {
    let next = vines
        .iter()
        .filter_map(Vine::sequence_number)
        .max()
        .map_or(1, |n| n + 1);
    format!("{VINE_ID_PREFIX}{next}")
}
