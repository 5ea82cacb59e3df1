//! Runtime generation parameters and the statistics gathered while honouring them

use crate::io::configuration::{
    AGGRESSIVE_BACKTRACK_WINDOW, AGGRESSIVE_MAX_BACKTRACK_ATTEMPTS, ATTEMPT_SEED_STRIDE,
    DEFAULT_BACKTRACK_WINDOW, DEFAULT_HARD_TIMEOUT, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_BACKTRACK_ATTEMPTS, DEFAULT_MAX_STATES, DEFAULT_SEED_MULTIPLIER,
    DEFAULT_SOFT_TIMEOUT, MAX_VINE_COUNT_DIVISOR, MIN_VINE_COUNT,
};
use crate::io::error::{Result, invalid_parameter};
use crate::model::difficulty::Difficulty;
use crate::placement::{STRATEGY_CENTER_OUT, StrategyRegistry};
use rand::Rng;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Parameters for generating one level
#[derive(Clone, Debug)]
pub struct GenerationConfig {
    /// Level number
    pub level_id: u32,
    /// Grid width in cells
    pub grid_width: usize,
    /// Grid height in cells
    pub grid_height: usize,
    /// Target number of vines
    pub vine_count: usize,
    /// Upper move bound written to the level
    pub max_moves: usize,
    /// Fraction of cells that must be covered
    pub min_coverage: f64,
    /// Difficulty tier
    pub difficulty: Difficulty,
    /// Explicit seed; derived from the level id when absent
    pub seed: Option<u64>,
    /// Draw the seed from entropy when no explicit seed is given
    pub randomize: bool,
    /// Replace an existing level file
    pub overwrite: bool,
    /// Vines removed per sliding-window backtrack
    pub backtrack_window: usize,
    /// Sliding-window backtracks per failed vine
    pub max_backtrack_attempts: usize,
    /// Directory for failure dumps, disabled when absent
    pub dump_dir: Option<PathBuf>,
    /// Name of the primary placement strategy
    pub strategy: String,
    /// State cap of the exhaustive solvability search
    pub max_states: usize,
    /// Top-level attempts before giving up
    pub max_attempts: usize,
    /// Soft circuit breaker, extendable once
    pub soft_timeout: Duration,
    /// Hard circuit breaker
    pub hard_timeout: Duration,
    /// Reject attempts whose blocking depth exceeds the tier limit
    pub strict_depth: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::for_level(1)
    }
}

impl GenerationConfig {
    /// Configuration derived from the level's position in the campaign
    pub fn for_level(level_id: u32) -> Self {
        Self::with_difficulty(level_id, Difficulty::for_level(level_id))
    }

    /// Configuration for a level with an explicit difficulty tier
    pub fn with_difficulty(level_id: u32, difficulty: Difficulty) -> Self {
        let (grid_width, grid_height) = difficulty.spec().default_grid();
        let min_coverage = default_coverage(difficulty, true);
        let vine_count = default_vine_count(grid_width * grid_height, min_coverage, difficulty);

        Self {
            level_id,
            grid_width,
            grid_height,
            vine_count,
            max_moves: vine_count * 2,
            min_coverage,
            difficulty,
            seed: None,
            randomize: false,
            overwrite: false,
            backtrack_window: DEFAULT_BACKTRACK_WINDOW,
            max_backtrack_attempts: DEFAULT_MAX_BACKTRACK_ATTEMPTS,
            dump_dir: None,
            strategy: STRATEGY_CENTER_OUT.to_string(),
            max_states: DEFAULT_MAX_STATES,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            soft_timeout: DEFAULT_SOFT_TIMEOUT,
            hard_timeout: DEFAULT_HARD_TIMEOUT,
            strict_depth: false,
        }
    }

    /// Resize the grid and recompute the size-dependent defaults
    #[must_use]
    pub fn with_grid(mut self, width: usize, height: usize) -> Self {
        self.grid_width = width;
        self.grid_height = height;
        self.vine_count = default_vine_count(width * height, self.min_coverage, self.difficulty);
        self.max_moves = self.vine_count * 2;
        self
    }

    /// Select the primary strategy and recompute the coverage defaults for it
    ///
    /// LIFO strategies aim for a full grid, the others for the tier's
    /// non-LIFO coverage. The vine count follows the new coverage.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStrategy` if `name` is not registered
    pub fn with_strategy(mut self, name: &str, registry: &StrategyRegistry) -> Result<Self> {
        let lifo = registry.get(name)?.is_lifo();
        self.strategy = name.to_string();
        self.min_coverage = default_coverage(self.difficulty, lifo);
        self.vine_count = default_vine_count(self.total_cells(), self.min_coverage, self.difficulty);
        self.max_moves = self.vine_count * 2;
        Ok(self)
    }

    /// Switch to the wide backtracking preset
    #[must_use]
    pub const fn with_aggressive_backtracking(mut self) -> Self {
        self.backtrack_window = AGGRESSIVE_BACKTRACK_WINDOW;
        self.max_backtrack_attempts = AGGRESSIVE_MAX_BACKTRACK_ATTEMPTS;
        self
    }

    /// Number of grid cells
    pub const fn total_cells(&self) -> usize {
        self.grid_width * self.grid_height
    }

    /// Cells that must be covered to meet `min_coverage`
    pub fn target_cells(&self) -> usize {
        let target = (self.total_cells() as f64 * self.min_coverage).ceil() as usize;
        target.min(self.total_cells())
    }

    /// Seed of attempt zero
    ///
    /// An explicit seed wins, then entropy when randomizing, then a value
    /// derived from the level id.
    pub fn base_seed(&self) -> u64 {
        match self.seed {
            Some(seed) => seed,
            None if self.randomize => rand::rng().random(),
            None => u64::from(self.level_id).wrapping_mul(DEFAULT_SEED_MULTIPLIER),
        }
    }

    /// Seed used by a given attempt
    pub const fn attempt_seed(base_seed: u64, attempt: usize) -> u64 {
        base_seed.wrapping_add((attempt as u64).wrapping_mul(ATTEMPT_SEED_STRIDE))
    }

    /// Check that the parameters describe a generatable level
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if self.grid_width < 2 || self.grid_height < 2 {
            return Err(invalid_parameter(
                "grid_size",
                &format!("{}x{}", self.grid_width, self.grid_height),
                &"both dimensions must be at least 2",
            ));
        }
        if !(self.min_coverage > 0.0 && self.min_coverage <= 1.0) {
            return Err(invalid_parameter(
                "min_coverage",
                &self.min_coverage,
                &"must lie in (0, 1]",
            ));
        }
        if self.backtrack_window == 0 {
            return Err(invalid_parameter(
                "backtrack_window",
                &self.backtrack_window,
                &"must be at least 1",
            ));
        }
        if self.max_attempts == 0 {
            return Err(invalid_parameter(
                "max_attempts",
                &self.max_attempts,
                &"must be at least 1",
            ));
        }
        if self.max_states == 0 {
            return Err(invalid_parameter(
                "max_states",
                &self.max_states,
                &"must be at least 1",
            ));
        }
        if self.hard_timeout < self.soft_timeout {
            return Err(invalid_parameter(
                "hard_timeout",
                &format!("{:?}", self.hard_timeout),
                &"must not be shorter than the soft timeout",
            ));
        }
        Ok(())
    }
}

/// Coverage target for a tier
///
/// LIFO strategies aim for a full grid, the others use the tier's table value.
pub const fn default_coverage(difficulty: Difficulty, lifo: bool) -> f64 {
    if lifo {
        1.0
    } else {
        difficulty.spec().non_lifo_coverage
    }
}

/// Vine count implied by grid area, coverage and the tier's average length
pub fn default_vine_count(total_cells: usize, coverage: f64, difficulty: Difficulty) -> usize {
    let spec = difficulty.spec();
    let average = spec.target_average_length().max(1);
    let estimate = (total_cells as f64 * coverage / average as f64) as usize;
    estimate
        .clamp(spec.vine_count.0, spec.vine_count.1)
        .min(total_cells / MAX_VINE_COUNT_DIVISOR)
        .max(MIN_VINE_COUNT)
}

/// Counters accumulated across all attempts of one level
#[derive(Clone, Debug, Default)]
pub struct GenerationStats {
    /// Top-level attempts started
    pub attempts: usize,
    /// Seed cells tried by placement strategies
    pub placement_attempts: usize,
    /// Backtracking removals tried
    pub backtracks_attempted: usize,
    /// Successful cycle-breaker repairs
    pub cycle_breaker_repairs: usize,
    /// Failure dumps written
    pub dumps_produced: usize,
    /// Fillers accepted without the LIFO guarantee
    pub non_lifo_fillers: usize,
    /// Attempts that reached valid geometry
    pub structural_successes: usize,
    /// Relaxation steps applied
    pub relaxations: usize,
    /// Longest blocking chain of the last analysed attempt
    pub max_blocking_depth: usize,
    /// Mean blocking depth of the last analysed attempt
    pub average_blocking_depth: f64,
    /// Coverage of the last analysed attempt
    pub coverage: f64,
    /// States explored by the exhaustive oracle
    pub oracle_states_explored: usize,
    /// Failed attempts keyed by failure kind
    pub failures: BTreeMap<&'static str, usize>,
    /// Wall-clock time spent on the level
    pub elapsed: Duration,
}

impl GenerationStats {
    /// Count a failed attempt under its kind
    pub fn record_failure(&mut self, kind: &'static str) {
        *self.failures.entry(kind).or_insert(0) += 1;
    }

    /// Total failed attempts
    pub fn failure_count(&self) -> usize {
        self.failures.values().sum()
    }

    /// Share of attempts that produced valid geometry
    pub fn structural_success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.structural_successes as f64 / self.attempts as f64
    }
}
