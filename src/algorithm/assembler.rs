//! Turns an accepted vine layout into a persisted level record

use crate::io::configuration::{
    BASE_SCORE, SCORE_ATTEMPT_PENALTY, SCORE_COVERAGE_BONUS, SCORE_DEPTH_PENALTY,
    SCORE_FREE_ATTEMPTS, SCORE_IDEAL_COVERAGE, SCORE_LENGTH_SPREAD_WEIGHT, SCORE_SPARSE_COVERAGE,
    SCORE_SPARSE_PENALTY,
};
use crate::model::difficulty::COLOR_PALETTE;
use crate::model::generation::GenerationConfig;
use crate::model::level::{Level, Mask, MaskMode};
use crate::model::point::Point;
use crate::model::vine::{VINE_ID_PREFIX, Vine};
use std::collections::HashSet;
use std::time::Duration;

/// Facts about the accepted attempt recorded on the level
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AssemblyContext {
    /// Seed of the accepted attempt
    pub seed: u64,
    /// Attempts used, including the accepted one
    pub attempts: usize,
    /// Wall-clock time spent generating
    pub elapsed: Duration,
    /// Longest blocking chain in the layout
    pub max_blocking_depth: usize,
}

/// Build the level record for an accepted layout
///
/// Vines are renumbered `vine_1..vine_n` in the given order and coloured
/// round-robin from the tier's palette.
pub fn assemble_level(
    config: &GenerationConfig,
    vines: &[Vine],
    context: &AssemblyContext,
) -> Level {
    let spec = config.difficulty.spec();
    let colors = spec.color_count.1.clamp(1, COLOR_PALETTE.len());
    let vines = renumber_vines(vines, colors);

    let min_moves = vines.len();
    let coverage = covered_fraction(config.total_cells(), &vines);

    Level {
        id: config.level_id,
        name: format!("Level {}", config.level_id),
        difficulty: config.difficulty,
        grid_size: [config.grid_width, config.grid_height],
        mask: derive_mask(config.grid_width, config.grid_height, &vines),
        max_moves: config.max_moves.max(min_moves),
        min_moves,
        complexity: spec.complexity.to_string(),
        grace: spec.default_grace,
        color_scheme: COLOR_PALETTE
            .iter()
            .take(colors)
            .map(ToString::to_string)
            .collect(),
        generation_seed: context.seed,
        generation_attempts: context.attempts,
        generation_elapsed_ms: u64::try_from(context.elapsed.as_millis()).unwrap_or(u64::MAX),
        generation_score: quality_score(
            context.attempts,
            coverage,
            &vines,
            context.max_blocking_depth,
            spec.max_blocking_depth,
        ),
        vines,
    }
}

/// Sequential ids and round-robin colour indices
pub fn renumber_vines(vines: &[Vine], colors: usize) -> Vec<Vine> {
    vines
        .iter()
        .enumerate()
        .map(|(index, vine)| Vine {
            id: format!("{VINE_ID_PREFIX}{}", index + 1),
            color_index: index % colors.max(1),
            ..vine.clone()
        })
        .collect()
}

/// Visibility mask reconciling empty cells with full visual coverage
///
/// No mask for a full grid. Sparse gaps are hidden individually; when empty
/// cells dominate, only the occupied cells are shown.
pub fn derive_mask(width: usize, height: usize, vines: &[Vine]) -> Option<Mask> {
    let occupied: HashSet<Point> = vines
        .iter()
        .flat_map(|vine| vine.ordered_path.iter().copied())
        .collect();
    let total = width * height;
    if occupied.len() >= total {
        return None;
    }

    let in_grid = (0..height).flat_map(|y| (0..width).map(move |x| Point::new(x as i32, y as i32)));
    let empty = total - occupied.len();
    let (mode, mut points): (MaskMode, Vec<Point>) = if empty * 2 <= total {
        (
            MaskMode::Hide,
            in_grid.filter(|point| !occupied.contains(point)).collect(),
        )
    } else {
        (
            MaskMode::Show,
            in_grid.filter(|point| occupied.contains(point)).collect(),
        )
    };
    points.sort_by_key(|point| point.row_major_key());
    Some(Mask { mode, points })
}

/// Heuristic quality of an accepted level
pub fn quality_score(
    attempts: usize,
    coverage: f64,
    vines: &[Vine],
    max_blocking_depth: usize,
    depth_limit: usize,
) -> f64 {
    let mut score = BASE_SCORE;
    score -= attempts.saturating_sub(SCORE_FREE_ATTEMPTS) as f64 * SCORE_ATTEMPT_PENALTY;

    if (SCORE_IDEAL_COVERAGE.0..=SCORE_IDEAL_COVERAGE.1).contains(&coverage) {
        score += SCORE_COVERAGE_BONUS;
    } else if coverage < SCORE_SPARSE_COVERAGE {
        score -= SCORE_SPARSE_PENALTY;
    }

    if vines.len() > 2 {
        let lengths = vines.iter().map(Vine::len);
        let spread = lengths.clone().max().unwrap_or(0) - lengths.min().unwrap_or(0);
        score += spread as f64 * SCORE_LENGTH_SPREAD_WEIGHT;
    }

    score - max_blocking_depth.saturating_sub(depth_limit) as f64 * SCORE_DEPTH_PENALTY
}

fn covered_fraction(total_cells: usize, vines: &[Vine]) -> f64 {
    if total_cells == 0 {
        return 0.0;
    }
    vines.iter().map(Vine::len).sum::<usize>() as f64 / total_cells as f64
}
