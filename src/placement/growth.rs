//! Seed selection and body growth shared by the placement strategies

use crate::io::configuration::{CENTER_SEED_POOL_MIN, MAX_SEED_ATTEMPTS, MIN_VINE_LENGTH};
use crate::model::generation::{GenerationConfig, GenerationStats};
use crate::model::point::{Direction, Point};
use crate::model::vine::Vine;
use crate::spatial::OccupancyGrid;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::collections::BTreeSet;

/// Preference weights steering body growth
#[derive(Clone, Copy, Debug)]
pub struct GrowthWeights {
    /// Bonus for continuing in the growth direction
    pub straight: f64,
    /// Bonus for turning at a right angle
    pub perpendicular: f64,
    /// Bonus per free neighbour of the candidate cell
    pub free_neighbor: f64,
    /// Scale of the random jitter added to every score
    pub jitter: f64,
    /// Probability of taking the best-scored cell instead of a random one
    pub greedy_probability: f64,
    /// Reject cells that cut empty space off from the grid edge
    pub guard_reachability: bool,
}

/// Why a single vine could not be placed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementMiss {
    /// Last seed cell that was tried
    pub last_seed: Option<Point>,
}

impl PlacementMiss {
    /// Owners of the cells obstructing the exits of the last seed
    pub fn direct_blockers(&self, grid: &OccupancyGrid) -> BTreeSet<String> {
        self.last_seed
            .map(|seed| grid.corridor_owners(seed))
            .unwrap_or_default()
    }
}

/// Target lengths for the primary vines of an attempt
///
/// Enough vines of the tier's average length to cover the target cells, and
/// never fewer than the configured vine count. Each length is the average plus
/// a random offset of -1, 0 or +1.
pub fn target_lengths(config: &GenerationConfig, rng: &mut StdRng) -> Vec<usize> {
    let average = config
        .difficulty
        .spec()
        .target_average_length()
        .max(MIN_VINE_LENGTH);
    let count = (config.target_cells() / average).max(config.vine_count);
    let cap = ((config.grid_width + config.grid_height) / 2).max(MIN_VINE_LENGTH);

    (0..count)
        .map(|_| {
            let length = match rng.random_range(0..3) {
                0 => average.saturating_sub(1),
                1 => average,
                _ => average + 1,
            };
            length.clamp(MIN_VINE_LENGTH, cap)
        })
        .collect()
}

/// Empty cells with room for at least a neck
pub fn seed_candidates(grid: &OccupancyGrid) -> Vec<Point> {
    grid.empty_cells()
        .into_iter()
        .filter(|&point| grid.free_neighbors(point) > 0)
        .collect()
}

/// Seed drawn from the cells closest to the grid centre
pub fn choose_center_seed(grid: &OccupancyGrid, rng: &mut StdRng) -> Option<Point> {
    let center_x = grid.width() as f64 / 2.0;
    let center_y = grid.height() as f64 / 2.0;
    let distance = |point: Point| {
        (f64::from(point.x) - center_x).abs() + (f64::from(point.y) - center_y).abs()
    };

    let mut candidates = seed_candidates(grid);
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|a, b| distance(*a).total_cmp(&distance(*b)));

    let pool = (candidates.len() / 4)
        .max(CENTER_SEED_POOL_MIN)
        .min(candidates.len());
    candidates.get(rng.random_range(0..pool)).copied()
}

/// Head direction with a clear corridor and a free neck cell
///
/// The nearest edge is tried first, then the others by distance to the edge.
pub fn find_exit_direction(grid: &OccupancyGrid, seed: Point) -> Option<Direction> {
    grid.directions_by_edge_distance(seed)
        .into_iter()
        .find(|&direction| {
            grid.is_free(seed.step(direction.opposite()))
                && grid.is_corridor_clear(seed, direction, None)
        })
}

/// Place one vine whose corridor is clear at placement time
///
/// Tries up to `MAX_SEED_ATTEMPTS` centre-biased seeds. Every vine placed this
/// way can be cleared before any vine placed earlier, which is what makes
/// reverse placement order a valid solution.
///
/// # Errors
///
/// Returns the last seed tried when no attempt produced a vine
pub fn place_with_exit_guarantee(
    grid: &OccupancyGrid,
    vine_id: &str,
    target_length: usize,
    weights: &GrowthWeights,
    rng: &mut StdRng,
    stats: &mut GenerationStats,
) -> Result<Vine, PlacementMiss> {
    let mut miss = PlacementMiss::default();

    for _ in 0..MAX_SEED_ATTEMPTS {
        stats.placement_attempts += 1;
        let Some(seed) = choose_center_seed(grid, rng) else {
            break;
        };
        miss.last_seed = Some(seed);

        let Some(direction) = find_exit_direction(grid, seed) else {
            continue;
        };
        if let Some(vine) = grow_body(grid, vine_id, seed, direction, target_length, weights, rng) {
            return Ok(vine);
        }
    }

    Err(miss)
}

/// Grow a vine backwards from its head
///
/// The neck sits exactly opposite the head direction; later cells are picked
/// by `weights`. Growth stops early when no acceptable cell remains, so the
/// result may be shorter than `target_length` but never shorter than 2.
pub fn grow_body(
    grid: &OccupancyGrid,
    vine_id: &str,
    head: Point,
    head_direction: Direction,
    target_length: usize,
    weights: &GrowthWeights,
    rng: &mut StdRng,
) -> Option<Vine> {
    let grow_direction = head_direction.opposite();
    let neck = head.step(grow_direction);
    if !grid.is_free(head) || !grid.is_free(neck) {
        return None;
    }

    let corridor: Vec<Point> = grid.corridor(head, head_direction).collect();
    let mut path = vec![head, neck];
    let mut current = neck;

    while path.len() < target_length {
        let Some(next) = choose_next_cell(grid, &path, &corridor, current, grow_direction, weights, rng)
        else {
            break;
        };
        path.push(next);
        current = next;
    }

    Some(Vine::new(vine_id, head_direction, path))
}

fn choose_next_cell(
    grid: &OccupancyGrid,
    path: &[Point],
    corridor: &[Point],
    current: Point,
    grow_direction: Direction,
    weights: &GrowthWeights,
    rng: &mut StdRng,
) -> Option<Point> {
    let open = |point: Point| grid.is_free(point) && !path.contains(&point);

    let mut candidates: Vec<Point> = current
        .neighbors()
        .into_iter()
        .filter(|&point| open(point) && !corridor.contains(&point))
        .collect();

    if weights.guard_reachability && !candidates.is_empty() {
        let baseline = grid.edge_reachable_empty(path);
        let mut reserved = path.to_vec();
        candidates.retain(|&candidate| {
            reserved.push(candidate);
            let after = grid.edge_reachable_empty(&reserved);
            reserved.pop();
            baseline.saturating_sub(after) <= 1
        });
    }

    if candidates.is_empty() {
        return None;
    }

    let scored: Vec<(Point, f64)> = candidates
        .iter()
        .map(|&candidate| {
            let mut score = 0.0;
            match current.direction_to(candidate) {
                Some(direction) if direction == grow_direction => score += weights.straight,
                Some(direction) if direction.is_perpendicular_to(grow_direction) => {
                    score += weights.perpendicular;
                }
                _ => {}
            }
            let free = candidate
                .neighbors()
                .into_iter()
                .filter(|&point| open(point) && point != candidate)
                .count();
            score += free as f64 * weights.free_neighbor;
            score += rng.random::<f64>() * weights.jitter;
            (candidate, score)
        })
        .collect();

    if rng.random::<f64>() < weights.greedy_probability {
        scored
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|&(point, _)| point)
    } else {
        candidates.choose(rng).copied()
    }
}
