//! Solvability oracle
//!
//! A state is the set of vines not yet cleared. A vine can be cleared when no
//! cell of its corridor (head to grid edge) is owned by another remaining vine,
//! and the goal is the empty set. The exhaustive search is the only authority
//! for accepting a level; the greedy and partial checks are cheap pre-filters.

use crate::algorithm::bitset::VineSet;
use crate::io::error::{GenerationError, Result};
use crate::model::level::Level;
use crate::model::point::Point;
use crate::model::vine::Vine;
use crate::spatial::OccupancyGrid;
use std::collections::{HashMap, HashSet};

/// Outcome of the exhaustive search
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Solvability {
    /// A full clearing order exists
    Solvable {
        /// Vine ids in clearing order
        order: Vec<String>,
    },
    /// Every reachable state was explored and none is empty
    Unsolvable {
        /// Vines of the smallest dead-end state found
        stuck: Vec<String>,
    },
    /// The state cap was hit before a verdict
    BudgetExhausted,
}

/// Verdict plus search statistics
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolvabilityReport {
    /// Verdict
    pub solvability: Solvability,
    /// States expanded by the search
    pub states_explored: usize,
    /// Distinct states recorded
    pub states_recorded: usize,
    /// Cap that applied
    pub max_states: usize,
}

impl SolvabilityReport {
    /// Test whether a clearing order was found
    pub const fn is_solvable(&self) -> bool {
        matches!(self.solvability, Solvability::Solvable { .. })
    }

    /// Convert into the clearing order or a typed error
    ///
    /// # Errors
    ///
    /// Returns `Unsolvable` for a proven dead end and `SearchBudgetExhausted`
    /// when the cap was hit, so callers can tell the two apart
    pub fn into_order(self) -> Result<Vec<String>> {
        match self.solvability {
            Solvability::Solvable { order } => Ok(order),
            Solvability::Unsolvable { stuck } => Err(GenerationError::Unsolvable {
                remaining: stuck.len(),
                method: "exhaustive search",
            }),
            Solvability::BudgetExhausted => Err(GenerationError::SearchBudgetExhausted {
                max_states: self.max_states,
                states_explored: self.states_explored,
            }),
        }
    }
}

/// Result of the greedy pre-filter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GreedyOutcome {
    /// Vine ids in the order they were cleared
    pub cleared: Vec<String>,
    /// Vines left when the loop stopped
    pub remaining: usize,
}

impl GreedyOutcome {
    /// Test whether every vine was cleared
    pub const fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// Per-vine corridor obstacles, precomputed once per vine set
#[derive(Clone, Debug)]
pub struct ClearanceModel {
    ids: Vec<String>,
    obstacles: Vec<Vec<usize>>,
}

impl ClearanceModel {
    /// Build the model after validating the vines against the grid
    ///
    /// # Errors
    ///
    /// Returns `InvalidVine` if a vine is malformed, leaves the grid or overlaps another
    pub fn new(width: usize, height: usize, vines: &[Vine]) -> Result<Self> {
        for vine in vines {
            vine.validate(width, height)?;
        }
        let grid = OccupancyGrid::from_vines(width, height, vines)?;
        Ok(Self::from_grid(vines, &grid))
    }

    /// Build the model from vines already recorded in `grid`
    pub fn from_grid(vines: &[Vine], grid: &OccupancyGrid) -> Self {
        let positions: HashMap<&str, usize> = vines
            .iter()
            .enumerate()
            .map(|(position, vine)| (vine.id.as_str(), position))
            .collect();

        let obstacles = vines
            .iter()
            .enumerate()
            .map(|(position, vine)| {
                let Some(head) = vine.head() else {
                    return Vec::new();
                };
                let mut owners: Vec<usize> = grid
                    .corridor(head, vine.head_direction)
                    .filter_map(|point| grid.owner(point))
                    .filter_map(|owner| positions.get(owner).copied())
                    .filter(|&owner| owner != position)
                    .collect();
                owners.sort_unstable();
                owners.dedup();
                owners
            })
            .collect();

        Self {
            ids: vines.iter().map(|vine| vine.id.clone()).collect(),
            obstacles,
        }
    }

    /// Number of vines
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Test whether the model has no vines
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Test whether a remaining vine can leave the grid now
    pub fn is_clearable(&self, position: usize, remaining: &VineSet) -> bool {
        remaining.contains(position)
            && self
                .obstacles
                .get(position)
                .is_some_and(|owners| owners.iter().all(|&owner| !remaining.contains(owner)))
    }

    /// Remaining vines that can leave the grid now
    pub fn clearable<'a>(&'a self, remaining: &'a VineSet) -> impl Iterator<Item = usize> + 'a {
        remaining
            .iter()
            .filter(move |&position| self.is_clearable(position, remaining))
    }

    fn ids_of(&self, positions: impl IntoIterator<Item = usize>) -> Vec<String> {
        positions
            .into_iter()
            .filter_map(|position| self.ids.get(position).cloned())
            .collect()
    }

    /// Exhaustive depth-first search over remaining-vine sets
    ///
    /// Each distinct state is recorded once. When `max_states` states have been
    /// recorded without a verdict the search reports `BudgetExhausted` rather
    /// than `Unsolvable`.
    pub fn search(&self, max_states: usize) -> SolvabilityReport {
        let report = |solvability, states_explored, states_recorded| SolvabilityReport {
            solvability,
            states_explored,
            states_recorded,
            max_states,
        };

        let start = VineSet::full(self.len());
        let mut visited: HashSet<VineSet> = HashSet::new();
        let mut parents: HashMap<VineSet, (VineSet, usize)> = HashMap::new();
        let mut stack = vec![start.clone()];
        let mut smallest_dead_end: Option<VineSet> = None;
        let mut explored = 0;
        visited.insert(start);

        while let Some(state) = stack.pop() {
            explored += 1;

            if state.is_empty() {
                let mut order = Vec::with_capacity(self.len());
                let mut cursor = state;
                while let Some((parent, cleared)) = parents.get(&cursor) {
                    order.push(*cleared);
                    cursor = parent.clone();
                }
                order.reverse();
                return report(
                    Solvability::Solvable {
                        order: self.ids_of(order),
                    },
                    explored,
                    visited.len(),
                );
            }

            let moves: Vec<usize> = self.clearable(&state).collect();
            if moves.is_empty() {
                let smaller = smallest_dead_end
                    .as_ref()
                    .is_none_or(|current| state.count() < current.count());
                if smaller {
                    smallest_dead_end = Some(state);
                }
                continue;
            }

            for &cleared in moves.iter().rev() {
                let next = state.without(cleared);
                if visited.contains(&next) {
                    continue;
                }
                if visited.len() >= max_states {
                    return report(Solvability::BudgetExhausted, explored, visited.len());
                }
                visited.insert(next.clone());
                parents.insert(next.clone(), (state.clone(), cleared));
                stack.push(next);
            }
        }

        let stuck = smallest_dead_end.map_or_else(Vec::new, |state| self.ids_of(state.iter()));
        report(Solvability::Unsolvable { stuck }, explored, visited.len())
    }

    /// Repeatedly clear every clearable vine
    ///
    /// Stops when nothing is clearable or after `max_iterations` rounds.
    pub fn greedy(&self, max_iterations: usize) -> GreedyOutcome {
        let mut remaining = VineSet::full(self.len());
        let mut cleared = Vec::with_capacity(self.len());

        for _ in 0..max_iterations {
            if remaining.is_empty() {
                break;
            }
            let round: Vec<usize> = self.clearable(&remaining).collect();
            if round.is_empty() {
                break;
            }
            for position in round {
                remaining.remove(position);
                cleared.push(position);
            }
        }

        GreedyOutcome {
            cleared: self.ids_of(cleared),
            remaining: remaining.count(),
        }
    }
}

/// Decide whether a vine set can be fully cleared
///
/// # Errors
///
/// Returns `InvalidVine` if the vines do not form a valid placement
pub fn is_solvable(
    width: usize,
    height: usize,
    vines: &[Vine],
    max_states: usize,
) -> Result<SolvabilityReport> {
    Ok(ClearanceModel::new(width, height, vines)?.search(max_states))
}

/// Decide whether a persisted level can be fully cleared
///
/// # Errors
///
/// Returns `InvalidVine` if the level's vines do not form a valid placement
pub fn is_level_solvable(level: &Level, max_states: usize) -> Result<SolvabilityReport> {
    is_solvable(level.width(), level.height(), &level.vines, max_states)
}

/// Cheap single-step pre-check
///
/// Treats a vine as removable when the cell in front of its head is off the
/// grid or not owned by another remaining vine. Looser than corridor clearing,
/// so a `false` here rules a candidate out before the expensive retry.
pub fn is_likely_solvable_partial(
    vines: &[Vine],
    width: usize,
    height: usize,
    max_steps: usize,
) -> bool {
    let mut owners: HashMap<Point, usize> = HashMap::new();
    for (position, vine) in vines.iter().enumerate() {
        for &point in &vine.ordered_path {
            owners.insert(point, position);
        }
    }
    let grid = OccupancyGrid::new(width, height);
    let mut remaining = VineSet::full(vines.len());

    for _ in 0..max_steps {
        if remaining.is_empty() {
            return true;
        }
        let movable: Vec<usize> = remaining
            .iter()
            .filter(|&position| {
                vines
                    .get(position)
                    .and_then(Vine::head_target)
                    .is_none_or(|target| {
                        !grid.in_bounds(target)
                            || owners.get(&target).is_none_or(|&owner| {
                                owner == position || !remaining.contains(owner)
                            })
                    })
            })
            .collect();
        if movable.is_empty() {
            return false;
        }
        for position in movable {
            remaining.remove(position);
        }
    }
    remaining.is_empty()
}
