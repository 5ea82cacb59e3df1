//! Edge-biased placement pointing heads at the nearest edge

use crate::algorithm::backtracking::BacktrackEngine;
use crate::io::configuration::MAX_SEED_ATTEMPTS;
use crate::io::error::{Result, placement_failure};
use crate::model::generation::GenerationStats;
use crate::model::point::{Direction, Point};
use crate::model::vine::{Vine, next_vine_id};
use crate::placement::growth::{
    GrowthWeights, PlacementMiss, grow_body, seed_candidates, target_lengths,
};
use crate::placement::{Placement, PlacementContext, PlacementStrategy, STRATEGY_DIRECTION_FIRST};
use crate::spatial::OccupancyGrid;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

/// Growth preferences of the direction-first strategy
pub const DIRECTION_FIRST_WEIGHTS: GrowthWeights = GrowthWeights {
    straight: 2.0,
    perpendicular: 1.0,
    free_neighbor: 0.3,
    jitter: 0.5,
    greedy_probability: 0.7,
    guard_reachability: false,
};

/// Probability of seeding on an edge cell
pub const EDGE_SEED_PROBABILITY: f64 = 0.8;

/// Tail-extension sweeps after primary placement
pub const TAIL_EXTENSION_PASSES: usize = 3;

/// Seeds mostly on the border and points heads straight off the grid
///
/// Corridors are not checked, so the layout carries no ordering guarantee and
/// must be confirmed by the solvability oracle.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectionFirst;

impl PlacementStrategy for DirectionFirst {
    fn name(&self) -> &'static str {
        STRATEGY_DIRECTION_FIRST
    }

    fn description(&self) -> &'static str {
        "Edge-biased seeds with heads toward the nearest edge"
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
        let engine = BacktrackEngine::new(config, context.attempt, context.seed);
        let target_cells = config.target_cells();
        let mut layout = Placement::empty(config);

        for target_length in target_lengths(config, rng) {
            if layout.grid.occupied_count() >= target_cells {
                break;
            }
            let vine_id = next_vine_id(&layout.vines);

            match place_toward_edge(&layout.grid, &vine_id, target_length, rng, stats) {
                Ok(vine) => layout.push(vine)?,
                Err(miss) => {
                    let blockers = miss.direct_blockers(&layout.grid);
                    let mut retry = |grid: &OccupancyGrid, rng: &mut StdRng, stats: &mut GenerationStats| {
                        place_toward_edge(grid, &vine_id, target_length, rng, stats).ok()
                    };
                    if let Err(e) = engine.recover_placement(
                        &mut layout,
                        &vine_id,
                        &blockers,
                        rng,
                        stats,
                        &mut retry,
                    ) {
                        log::debug!("Skipping vine: {e}");
                    }
                }
            }
        }

        if layout.vines.len() < 2 {
            return Err(placement_failure(
                &next_vine_id(&layout.vines),
                &format!("only {} vines placed", layout.vines.len()),
            ));
        }

        let extended = extend_tails(&mut layout, rng);
        log::trace!("Tail extension added {extended} cells");
        Ok(layout)
    }
}

fn place_toward_edge(
    grid: &OccupancyGrid,
    vine_id: &str,
    target_length: usize,
    rng: &mut StdRng,
    stats: &mut GenerationStats,
) -> std::result::Result<Vine, PlacementMiss> {
    let mut miss = PlacementMiss::default();

    for _ in 0..MAX_SEED_ATTEMPTS {
        stats.placement_attempts += 1;
        let Some(seed) = choose_edge_biased_seed(grid, rng) else {
            break;
        };
        miss.last_seed = Some(seed);

        let Some(direction) = grid
            .directions_by_edge_distance(seed)
            .into_iter()
            .find(|&direction| grid.is_free(seed.step(direction.opposite())))
        else {
            continue;
        };
        if let Some(vine) = grow_body(
            grid,
            vine_id,
            seed,
            direction,
            target_length,
            &DIRECTION_FIRST_WEIGHTS,
            rng,
        ) {
            return Ok(vine);
        }
    }

    Err(miss)
}

fn choose_edge_biased_seed(grid: &OccupancyGrid, rng: &mut StdRng) -> Option<Point> {
    let candidates = seed_candidates(grid);
    if rng.random_bool(EDGE_SEED_PROBABILITY) {
        let edge: Vec<Point> = candidates
            .iter()
            .copied()
            .filter(|&point| grid.is_edge(point))
            .collect();
        if let Some(&seed) = edge.choose(rng) {
            return Some(seed);
        }
    }
    candidates.choose(rng).copied()
}

/// Grow tails into adjacent empty cells
///
/// Heads and head directions are untouched. Returns the number of cells added.
pub fn extend_tails(layout: &mut Placement, rng: &mut StdRng) -> usize {
    let mut added = 0;

    for _ in 0..TAIL_EXTENSION_PASSES {
        let mut grew = false;
        for vine in &mut layout.vines {
            let (Some(tail), Some(head)) = (vine.ordered_path.last().copied(), vine.head()) else {
                continue;
            };
            let corridor: Vec<Point> = layout.grid.corridor(head, vine.head_direction).collect();
            let options: Vec<Point> = Direction::ALL
                .iter()
                .map(|&direction| tail.step(direction))
                .filter(|point| layout.grid.is_free(*point) && !corridor.contains(point))
                .collect();
            let Some(&next) = options.choose(rng) else {
                continue;
            };
            if layout.grid.occupy(next, &vine.id).is_ok() {
                vine.ordered_path.push(next);
                added += 1;
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }

    added
}
