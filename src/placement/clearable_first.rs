//! Edge anchors followed by greedy-checked fill

use crate::algorithm::solvability::ClearanceModel;
use crate::io::configuration::{MAX_SEED_ATTEMPTS, MIN_VINE_LENGTH};
use crate::io::error::{Result, placement_failure};
use crate::model::generation::GenerationStats;
use crate::model::point::{Direction, Point};
use crate::model::vine::{Vine, next_vine_id};
use crate::placement::growth::{GrowthWeights, grow_body, seed_candidates, target_lengths};
use crate::placement::{Placement, PlacementContext, PlacementStrategy, STRATEGY_CLEARABLE_FIRST};
use crate::spatial::OccupancyGrid;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Growth preferences of the clearable-first strategy
pub const CLEARABLE_FIRST_WEIGHTS: GrowthWeights = GrowthWeights {
    straight: 1.0,
    perpendicular: 1.0,
    free_neighbor: 0.5,
    jitter: 0.5,
    greedy_probability: 0.7,
    guard_reachability: true,
};

/// Share of the estimated vine slots given to edge anchors
pub const ANCHOR_FRACTION: f64 = 0.3;

/// Grid cells assumed per vine when estimating anchor slots
pub const CELLS_PER_ANCHOR_SLOT: usize = 5;

/// Consecutive rejected candidates that end the fill phase
pub const FILL_FAILURE_LIMIT: usize = 50;

/// Anchors vines on the border, then keeps any candidate that still clears
///
/// Candidates are accepted when the greedy clearing pass empties the grid,
/// which the solvability oracle confirms later.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClearableFirst;

impl PlacementStrategy for ClearableFirst {
    fn name(&self) -> &'static str {
        STRATEGY_CLEARABLE_FIRST
    }

    fn description(&self) -> &'static str {
        "Edge anchors then greedy-checked fill"
    }

    fn is_lifo(&self) -> bool {
        false
    }

    fn place_vines(
        &self,
        context: &PlacementContext<'_>,
        rng: &mut StdRng,
        stats: &mut GenerationStats,
    ) -> Result<Placement> {
        let config = context.config;
        let target_cells = config.target_cells();
        let lengths = target_lengths(config, rng);
        let mut layout = Placement::empty(config);

        let anchors = anchor_count(config.total_cells());
        let mut placed_anchors = 0;
        for _ in 0..anchors * MAX_SEED_ATTEMPTS {
            if placed_anchors >= anchors {
                break;
            }
            stats.placement_attempts += 1;
            let length = lengths.get(placed_anchors).copied().unwrap_or(MIN_VINE_LENGTH);
            if let Some(vine) = grow_anchor(&layout.grid, &next_vine_id(&layout.vines), length, rng)
            {
                if clears_greedily(&layout, &vine) {
                    layout.push(vine)?;
                    placed_anchors += 1;
                }
            }
        }

        let mut failures = 0;
        let mut next_length = placed_anchors;
        while layout.grid.occupied_count() < target_cells && failures < FILL_FAILURE_LIMIT {
            stats.placement_attempts += 1;
            let length = lengths
                .get(next_length % lengths.len().max(1))
                .copied()
                .unwrap_or(MIN_VINE_LENGTH);
            let candidate = grow_anywhere(&layout.grid, &next_vine_id(&layout.vines), length, rng);
            match candidate {
                Some(vine) if clears_greedily(&layout, &vine) => {
                    layout.push(vine)?;
                    next_length += 1;
                    failures = 0;
                }
                _ => failures += 1,
            }
        }

        if layout.vines.len() < 2 {
            return Err(placement_failure(
                &next_vine_id(&layout.vines),
                &format!("only {} vines placed", layout.vines.len()),
            ));
        }
        Ok(layout)
    }
}

/// Number of edge anchors for a grid of `total_cells`
pub fn anchor_count(total_cells: usize) -> usize {
    let slots = total_cells / CELLS_PER_ANCHOR_SLOT;
    ((slots as f64 * ANCHOR_FRACTION) as usize).max(2)
}

fn grow_anchor(
    grid: &OccupancyGrid,
    vine_id: &str,
    length: usize,
    rng: &mut StdRng,
) -> Option<Vine> {
    let edges: Vec<Point> = seed_candidates(grid)
        .into_iter()
        .filter(|&point| grid.is_edge(point))
        .collect();
    let &seed = edges.choose(rng)?;

    let direction = Direction::ALL.into_iter().find(|&direction| {
        grid.distance_to_edge(seed, direction) == 0 && grid.is_free(seed.step(direction.opposite()))
    })?;
    grow_body(grid, vine_id, seed, direction, length, &CLEARABLE_FIRST_WEIGHTS, rng)
}

fn grow_anywhere(
    grid: &OccupancyGrid,
    vine_id: &str,
    length: usize,
    rng: &mut StdRng,
) -> Option<Vine> {
    let &seed = seed_candidates(grid).choose(rng)?;
    let mut directions = Direction::ALL;
    directions.shuffle(rng);

    let direction = directions
        .into_iter()
        .find(|&direction| grid.is_free(seed.step(direction.opposite())))?;
    grow_body(grid, vine_id, seed, direction, length, &CLEARABLE_FIRST_WEIGHTS, rng)
}

/// Whether the greedy clearing pass still empties the layout with `vine` added
pub fn clears_greedily(layout: &Placement, vine: &Vine) -> bool {
    let mut grid = layout.grid.clone();
    if grid.place_vine(vine).is_err() {
        return false;
    }
    let mut vines = layout.vines.clone();
    vines.push(vine.clone());
    ClearanceModel::from_grid(&vines, &grid)
        .greedy(vines.len() + 1)
        .is_complete()
}
