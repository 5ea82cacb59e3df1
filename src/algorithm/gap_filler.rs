//! Short filler vines that top up coverage after primary placement

use crate::algorithm::solvability::ClearanceModel;
use crate::io::configuration::{
    FALLBACK_FILLER_PASSES, FILLER_ITERATION_FACTOR, FILLER_MAX_STATES, FILLER_STALL_LIMIT,
    LIFO_FILLER_MAX_LENGTH, MIN_VINE_LENGTH,
};
use crate::io::error::Result;
use crate::model::generation::GenerationStats;
use crate::model::point::{Direction, Point};
use crate::model::vine::{Vine, next_vine_id};
use crate::placement::Placement;
use crate::placement::growth::{GrowthWeights, grow_body};
use crate::spatial::OccupancyGrid;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Growth preferences for fillers
pub const FILLER_WEIGHTS: GrowthWeights = GrowthWeights {
    straight: 1.0,
    perpendicular: 1.0,
    free_neighbor: 0.5,
    jitter: 0.5,
    greedy_probability: 0.5,
    guard_reachability: false,
};

/// Fillers added by each phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Fillers with a clear corridor at placement time
    pub lifo_fillers: usize,
    /// Two-cell fillers admitted by the solvability oracle
    pub fallback_fillers: usize,
}

impl FillReport {
    /// Total fillers added
    pub const fn total(&self) -> usize {
        self.lifo_fillers + self.fallback_fillers
    }
}

/// Add fillers until `target_cells` are covered or no filler fits
///
/// The first phase only places fillers whose corridor is clear, which keeps
/// reverse placement order valid. The second phase runs only when the first
/// stalls short of the target; its two-cell fillers may point anywhere and
/// each one is kept only if the exact search still clears the whole layout.
///
/// # Errors
///
/// Returns `InvalidVine` if a filler conflicts with the grid
pub fn fill_gaps(
    layout: &mut Placement,
    target_cells: usize,
    rng: &mut StdRng,
    stats: &mut GenerationStats,
) -> Result<FillReport> {
    let mut report = FillReport::default();
    if layout.grid.occupied_count() >= target_cells {
        return Ok(report);
    }

    report.lifo_fillers = fill_lifo(layout, target_cells, rng)?;
    if layout.grid.occupied_count() < target_cells {
        report.fallback_fillers = fill_fallback(layout, target_cells, rng, stats)?;
        stats.non_lifo_fillers += report.fallback_fillers;
    }

    log::debug!(
        "Gap filler added {} LIFO and {} fallback fillers, coverage {:.1}%",
        report.lifo_fillers,
        report.fallback_fillers,
        layout.coverage() * 100.0
    );
    Ok(report)
}

fn fill_lifo(layout: &mut Placement, target_cells: usize, rng: &mut StdRng) -> Result<usize> {
    let iterations = layout.grid.total_cells() * FILLER_ITERATION_FACTOR;
    let mut added = 0;
    let mut stalled = 0;

    for _ in 0..iterations {
        if layout.grid.occupied_count() >= target_cells || stalled >= FILLER_STALL_LIMIT {
            break;
        }
        let vine_id = next_vine_id(&layout.vines);
        let mut heads = layout.grid.empty_cells();
        heads.shuffle(rng);

        let filler = heads
            .into_iter()
            .find_map(|head| {
                let length = rng.random_range(MIN_VINE_LENGTH..=LIFO_FILLER_MAX_LENGTH);
                lifo_filler(&layout.grid, &vine_id, head, length, rng)
            })
            .or_else(|| edge_filler(&layout.grid, &vine_id, rng));

        match filler {
            Some(vine) => {
                layout.push(vine)?;
                added += 1;
                stalled = 0;
            }
            None => stalled += 1,
        }
    }

    Ok(added)
}

/// Filler headed at `head` along a clear corridor
pub fn lifo_filler(
    grid: &OccupancyGrid,
    vine_id: &str,
    head: Point,
    length: usize,
    rng: &mut StdRng,
) -> Option<Vine> {
    if !grid.is_free(head) {
        return None;
    }
    let mut directions = Direction::ALL;
    directions.shuffle(rng);

    let direction = directions.into_iter().find(|&direction| {
        grid.is_free(head.step(direction.opposite())) && grid.is_corridor_clear(head, direction, None)
    })?;
    grow_body(grid, vine_id, head, direction, length, &FILLER_WEIGHTS, rng)
}

/// Two-cell filler on the border pointing straight off the grid
pub fn edge_filler(grid: &OccupancyGrid, vine_id: &str, rng: &mut StdRng) -> Option<Vine> {
    let mut edges: Vec<Point> = grid
        .empty_cells()
        .into_iter()
        .filter(|&point| grid.is_edge(point))
        .collect();
    edges.shuffle(rng);

    edges.into_iter().find_map(|head| {
        Direction::ALL
            .into_iter()
            .filter(|&direction| grid.distance_to_edge(head, direction) == 0)
            .find_map(|direction| {
                let neck = head.step(direction.opposite());
                grid.is_free(neck)
                    .then(|| Vine::new(vine_id, direction, vec![head, neck]))
            })
    })
}

fn fill_fallback(
    layout: &mut Placement,
    target_cells: usize,
    rng: &mut StdRng,
    stats: &mut GenerationStats,
) -> Result<usize> {
    let mut added = 0;

    for _ in 0..FALLBACK_FILLER_PASSES {
        let mut added_this_pass = 0;
        let mut heads = layout.grid.empty_cells();
        heads.shuffle(rng);

        for head in heads {
            if layout.grid.occupied_count() >= target_cells {
                return Ok(added);
            }
            if !layout.grid.is_free(head) {
                continue;
            }
            let vine_id = next_vine_id(&layout.vines);
            let mut directions = Direction::ALL;
            directions.shuffle(rng);

            for direction in directions {
                let neck = head.step(direction.opposite());
                if !layout.grid.is_free(neck) {
                    continue;
                }
                let filler = Vine::new(vine_id.as_str(), direction, vec![head, neck]);
                if keeps_layout_solvable(layout, &filler, stats) {
                    layout.push(filler)?;
                    added += 1;
                    added_this_pass += 1;
                    break;
                }
            }
        }

        if added_this_pass == 0 {
            break;
        }
    }

    Ok(added)
}

fn keeps_layout_solvable(layout: &Placement, filler: &Vine, stats: &mut GenerationStats) -> bool {
    let mut grid = layout.grid.clone();
    if grid.place_vine(filler).is_err() {
        return false;
    }
    let mut vines = layout.vines.clone();
    vines.push(filler.clone());

    let report = ClearanceModel::from_grid(&vines, &grid).search(FILLER_MAX_STATES);
    stats.oracle_states_explored += report.states_explored;
    report.is_solvable()
}
