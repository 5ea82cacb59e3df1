//! Attempt loop driving placement, repair, validation and assembly

use crate::algorithm::assembler::{AssemblyContext, assemble_level};
use crate::algorithm::backtracking::BacktrackEngine;
use crate::algorithm::gap_filler::fill_gaps;
use crate::algorithm::solvability::ClearanceModel;
use crate::analysis::blocking::{BlockingAnalysis, BlockingGraph};
use crate::io::configuration::{
    COVERAGE_RELAXATION_STEP, MAX_MASKED_SHORTFALL, MIN_VINE_COUNT, PROGRESS_LOG_INTERVAL,
    RELAX_COVERAGE_AFTER, RELAX_COVERAGE_AGAIN_AFTER, RELAX_VINE_COUNT_AFTER,
    STRATEGY_FALLBACK_AFTER, STRUCTURAL_HEALTH_THRESHOLD, VINE_COUNT_RELAXATION,
};
use crate::io::error::{GenerationError, Result};
use crate::model::generation::{GenerationConfig, GenerationStats};
use crate::model::level::Level;
use crate::model::vine::VINE_ID_PREFIX;
use crate::placement::{
    Placement, PlacementContext, PlacementStrategy, STRATEGY_CENTER_OUT, StrategyRegistry,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Lowest coverage the relaxation ladder will go down to
const MIN_RELAXED_COVERAGE: f64 = 0.05;

/// Stage of a single attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationPhase {
    /// Strategy and gap filler lay out vines
    Placing,
    /// Blocking graph metrics are computed
    Analyzing,
    /// Blocking cycles are broken
    Repairing,
    /// Coverage and solvability are checked
    Validating,
    /// The level record is built
    Assembling,
    /// The level was accepted
    Done,
}

impl fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Placing => "placing",
            Self::Analyzing => "analyzing",
            Self::Repairing => "repairing",
            Self::Validating => "validating",
            Self::Assembling => "assembling",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// An accepted level with the statistics of its generation
#[derive(Clone, Debug)]
pub struct GeneratedLevel {
    /// The assembled level
    pub level: Level,
    /// Counters gathered over every attempt
    pub stats: GenerationStats,
    /// Clearing order proven by the oracle, in final vine ids
    pub clearing_order: Vec<String>,
}

struct Accepted {
    layout: Placement,
    order: Vec<String>,
    analysis: BlockingAnalysis,
}

struct AttemptFailure {
    error: GenerationError,
    layout: Option<Box<Placement>>,
}

impl AttemptFailure {
    const fn bare(error: GenerationError) -> Self {
        Self {
            error,
            layout: None,
        }
    }

    fn with_layout(error: GenerationError, layout: Placement) -> Self {
        Self {
            error,
            layout: Some(Box::new(layout)),
        }
    }
}

struct LastFailure {
    failure: AttemptFailure,
    attempt: usize,
    seed: u64,
    strategy: String,
}

/// Stateful generator for one level, advanced one attempt at a time
///
/// Attempts use seeds derived from a single base seed, so a run is fully
/// reproducible apart from its wall-clock timings.
pub struct LevelGenerator {
    config: GenerationConfig,
    effective: GenerationConfig,
    primary: Box<dyn PlacementStrategy>,
    fallback: Box<dyn PlacementStrategy>,
    base_seed: u64,
    attempt: usize,
    started: Instant,
    soft_limit: Duration,
    soft_extended: bool,
    stats: GenerationStats,
    last_failure: Option<LastFailure>,
}

impl LevelGenerator {
    /// Prepare a generator
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an invalid configuration or
    /// `UnknownStrategy` when the primary or fallback strategy is missing
    pub fn new(config: GenerationConfig, registry: &StrategyRegistry) -> Result<Self> {
        config.validate()?;
        let primary = registry.get(&config.strategy)?;
        let fallback = registry.get(STRATEGY_CENTER_OUT)?;
        let base_seed = config.base_seed();

        Ok(Self {
            effective: config.clone(),
            soft_limit: config.soft_timeout,
            config,
            primary,
            fallback,
            base_seed,
            attempt: 0,
            started: Instant::now(),
            soft_extended: false,
            stats: GenerationStats::default(),
            last_failure: None,
        })
    }

    /// Seed of attempt zero
    pub const fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Attempts started so far
    pub const fn attempts(&self) -> usize {
        self.attempt
    }

    /// Attempt cap
    pub const fn max_attempts(&self) -> usize {
        self.config.max_attempts
    }

    /// Counters gathered so far
    pub const fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// Configuration after the relaxations applied so far
    pub const fn effective_config(&self) -> &GenerationConfig {
        &self.effective
    }

    /// Run attempts until one is accepted
    ///
    /// # Errors
    ///
    /// Returns `Timeout` when a circuit breaker trips or `AttemptsExhausted`
    /// when every attempt failed
    pub fn run(mut self) -> Result<GeneratedLevel> {
        loop {
            if let Some(generated) = self.step()? {
                return Ok(generated);
            }
        }
    }

    /// Run a single attempt
    ///
    /// Returns `Ok(None)` when the attempt failed but another may follow.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` when a circuit breaker trips or `AttemptsExhausted`
    /// once the attempt cap is reached
    pub fn step(&mut self) -> Result<Option<GeneratedLevel>> {
        if self.attempt >= self.config.max_attempts {
            return Err(self.exhausted());
        }
        if let Some((elapsed, limit, hard)) = self.tripped_breaker() {
            return Err(self.timed_out(elapsed, limit, hard));
        }
        self.relax();

        let attempt = self.attempt;
        self.attempt += 1;
        self.stats.attempts = self.attempt;
        let seed = GenerationConfig::attempt_seed(self.base_seed, attempt);
        let mut rng = StdRng::seed_from_u64(seed);

        if attempt == STRATEGY_FALLBACK_AFTER && self.primary.name() != STRATEGY_CENTER_OUT {
            log::warn!(
                "Level {}: falling back from {} to {}",
                self.config.level_id,
                self.primary.name(),
                STRATEGY_CENTER_OUT
            );
        }
        let strategy = if attempt < STRATEGY_FALLBACK_AFTER {
            self.primary.as_ref()
        } else {
            self.fallback.as_ref()
        };
        // Dumps name the registry entry that actually ran
        let mut attempt_config = self.effective.clone();
        attempt_config.strategy = self.strategy_key(attempt).to_string();

        match run_attempt(&attempt_config, strategy, attempt, seed, &mut rng, &mut self.stats) {
            Ok(accepted) => Ok(Some(self.finish(accepted, seed))),
            Err(failure) => {
                self.stats.record_failure(failure.error.kind());
                log::debug!(
                    "Level {} attempt {attempt} failed: {}",
                    self.config.level_id,
                    failure.error
                );
                if self.attempt % PROGRESS_LOG_INTERVAL == 0 {
                    log::info!(
                        "Level {}: {} attempts, {:.0}% structurally valid, failures {:?}",
                        self.config.level_id,
                        self.attempt,
                        self.stats.structural_success_rate() * 100.0,
                        self.stats.failures
                    );
                }
                self.last_failure = Some(LastFailure {
                    failure,
                    attempt,
                    seed,
                    strategy: attempt_config.strategy,
                });
                Ok(None)
            }
        }
    }

    /// Registry name of the strategy used by an attempt
    fn strategy_key(&self, attempt: usize) -> &str {
        if attempt < STRATEGY_FALLBACK_AFTER {
            &self.config.strategy
        } else {
            STRATEGY_CENTER_OUT
        }
    }

    /// Elapsed time, limit and breaker kind of a tripped circuit breaker
    fn tripped_breaker(&mut self) -> Option<(Duration, Duration, bool)> {
        let elapsed = self.started.elapsed();
        if elapsed >= self.config.hard_timeout {
            return Some((elapsed, self.config.hard_timeout, true));
        }
        if elapsed < self.soft_limit {
            return None;
        }

        let rate = self.stats.structural_success_rate();
        if !self.soft_extended && rate >= STRUCTURAL_HEALTH_THRESHOLD {
            self.soft_extended = true;
            self.soft_limit = (self.soft_limit + self.config.soft_timeout).min(self.config.hard_timeout);
            log::info!(
                "Level {}: extending soft timeout to {:.0}s ({:.0}% structurally valid)",
                self.config.level_id,
                self.soft_limit.as_secs_f64(),
                rate * 100.0
            );
            return None;
        }

        Some((elapsed, self.soft_limit, false))
    }

    fn timed_out(&mut self, elapsed: Duration, limit: Duration, hard: bool) -> GenerationError {
        let breaker = if hard { "hard" } else { "soft" };
        let reason = format!(
            "{breaker} timeout of {:.1}s tripped after {:.1}s",
            limit.as_secs_f64(),
            elapsed.as_secs_f64()
        );
        let (dump, _) = self.dump_last_failure(Some(&reason));

        log::warn!(
            "Level {}: {reason} and {} attempts",
            self.config.level_id,
            self.attempt
        );
        GenerationError::Timeout {
            elapsed,
            limit,
            hard,
            dump,
        }
    }

    fn relax(&mut self) {
        match self.attempt {
            RELAX_VINE_COUNT_AFTER => {
                let relaxed = (self.effective.vine_count as f64 * VINE_COUNT_RELAXATION) as usize;
                self.effective.vine_count = relaxed.max(MIN_VINE_COUNT);
                self.stats.relaxations += 1;
                log::warn!(
                    "Level {}: relaxing vine count to {}",
                    self.config.level_id,
                    self.effective.vine_count
                );
            }
            RELAX_COVERAGE_AFTER | RELAX_COVERAGE_AGAIN_AFTER => {
                self.effective.min_coverage =
                    (self.effective.min_coverage - COVERAGE_RELAXATION_STEP).max(MIN_RELAXED_COVERAGE);
                self.stats.relaxations += 1;
                log::warn!(
                    "Level {}: relaxing minimum coverage to {:.0}%",
                    self.config.level_id,
                    self.effective.min_coverage * 100.0
                );
            }
            _ => {}
        }
    }

    fn finish(&mut self, accepted: Accepted, seed: u64) -> GeneratedLevel {
        log::trace!("Level {}: {}", self.config.level_id, GenerationPhase::Assembling);
        let elapsed = self.started.elapsed();
        let context = AssemblyContext {
            seed,
            attempts: self.attempt,
            elapsed,
            max_blocking_depth: accepted.analysis.max_depth,
        };
        let level = assemble_level(&self.effective, &accepted.layout.vines, &context);

        let renamed: HashMap<&str, String> = accepted
            .layout
            .vines
            .iter()
            .enumerate()
            .map(|(index, vine)| (vine.id.as_str(), format!("{VINE_ID_PREFIX}{}", index + 1)))
            .collect();
        let clearing_order = accepted
            .order
            .iter()
            .filter_map(|id| renamed.get(id.as_str()).cloned())
            .collect();

        self.stats.coverage = level.coverage();
        self.stats.elapsed = elapsed;
        log::info!(
            "Level {} accepted on attempt {} ({} vines, {:.1}% coverage, depth {}, score {:.1})",
            level.id,
            self.attempt,
            level.vines.len(),
            level.coverage() * 100.0,
            accepted.analysis.max_depth,
            level.generation_score
        );
        log::trace!("Level {}: {}", self.config.level_id, GenerationPhase::Done);

        GeneratedLevel {
            level,
            stats: self.stats.clone(),
            clearing_order,
        }
    }

    /// Write the terminal failure dump
    ///
    /// The last failed attempt is dumped with its layout. When no attempt has
    /// failed yet, the attempt that would run next is dumped with an empty grid.
    fn dump_last_failure(
        &mut self,
        reason: Option<&str>,
    ) -> (Option<PathBuf>, Option<Box<GenerationError>>) {
        let mut config = self.effective.clone();

        let Some(LastFailure {
            failure,
            attempt,
            seed,
            strategy,
        }) = self.last_failure.take()
        else {
            let attempt = self.attempt;
            config.strategy = self.strategy_key(attempt).to_string();
            let seed = GenerationConfig::attempt_seed(self.base_seed, attempt);
            let engine = BacktrackEngine::new(&config, attempt, seed);
            let message = reason.unwrap_or("no attempt completed");
            let dump = engine.dump_failure(message, &Placement::empty(&config), &mut self.stats);
            return (dump, None);
        };

        config.strategy = strategy;
        let message = match reason {
            Some(reason) => format!("{reason}; last attempt failed: {}", failure.error),
            None => failure.error.to_string(),
        };
        let layout = failure
            .layout
            .map_or_else(|| Placement::empty(&config), |layout| *layout);
        let engine = BacktrackEngine::new(&config, attempt, seed);
        let dump = engine.dump_failure(&message, &layout, &mut self.stats);
        (dump, Some(Box::new(failure.error)))
    }

    fn exhausted(&mut self) -> GenerationError {
        let (dump, last) = self.dump_last_failure(None);

        log::warn!(
            "Level {}: giving up after {} attempts",
            self.config.level_id,
            self.attempt
        );
        GenerationError::AttemptsExhausted {
            level_id: self.config.level_id,
            attempts: self.attempt,
            dump,
            last,
        }
    }
}

/// Generate one level with the strategies in `registry`
///
/// # Errors
///
/// Returns `InvalidParameter` or `UnknownStrategy` for a bad configuration,
/// `Timeout` when a circuit breaker trips and `AttemptsExhausted` when no
/// attempt was accepted
pub fn generate_level(config: &GenerationConfig, registry: &StrategyRegistry) -> Result<GeneratedLevel> {
    LevelGenerator::new(config.clone(), registry)?.run()
}

fn run_attempt(
    config: &GenerationConfig,
    strategy: &dyn PlacementStrategy,
    attempt: usize,
    seed: u64,
    rng: &mut StdRng,
    stats: &mut GenerationStats,
) -> std::result::Result<Accepted, AttemptFailure> {
    let level_id = config.level_id;
    let trace = |phase: GenerationPhase| log::trace!("Level {level_id} attempt {attempt}: {phase}");

    trace(GenerationPhase::Placing);
    let context = PlacementContext {
        config,
        attempt,
        seed,
    };
    let mut layout = strategy
        .place_vines(&context, rng, stats)
        .map_err(AttemptFailure::bare)?;
    if let Err(e) = fill_gaps(&mut layout, config.target_cells(), rng, stats) {
        return Err(AttemptFailure::with_layout(e, layout));
    }
    stats.structural_successes += 1;

    trace(GenerationPhase::Analyzing);
    let mut analysis = BlockingGraph::build(&layout.vines, &layout.grid).analyze();
    let mut surviving_cycles = None;
    if analysis.has_cycles() {
        trace(GenerationPhase::Repairing);
        let engine = BacktrackEngine::new(config, attempt, seed);
        match engine.break_cycles(&mut layout, stats) {
            Ok(_) => {
                if let Err(e) = fill_gaps(&mut layout, config.target_cells(), rng, stats) {
                    return Err(AttemptFailure::with_layout(e, layout));
                }
            }
            Err(e) => surviving_cycles = Some(e),
        }
        analysis = BlockingGraph::build(&layout.vines, &layout.grid).analyze();
    }
    stats.max_blocking_depth = analysis.max_depth;
    stats.average_blocking_depth = analysis.average_depth;
    stats.coverage = layout.coverage();

    trace(GenerationPhase::Validating);
    let depth_limit = config.difficulty.spec().max_blocking_depth;
    if config.strict_depth && analysis.max_depth > depth_limit {
        let error = GenerationError::DepthExceeded {
            depth: analysis.max_depth,
            limit: depth_limit,
        };
        return Err(AttemptFailure::with_layout(error, layout));
    }

    let coverage = layout.coverage();
    if coverage < config.min_coverage {
        if coverage + MAX_MASKED_SHORTFALL < config.min_coverage {
            let error = GenerationError::CoverageInsufficient {
                achieved: coverage,
                required: config.min_coverage,
            };
            return Err(AttemptFailure::with_layout(error, layout));
        }
        log::debug!(
            "Level {level_id}: masking coverage shortfall of {:.1}%",
            (config.min_coverage - coverage) * 100.0
        );
    }

    let model = ClearanceModel::from_grid(&layout.vines, &layout.grid);
    let greedy = model.greedy(model.len() + 1);
    if !greedy.is_complete() {
        let error = surviving_cycles.unwrap_or(GenerationError::Unsolvable {
            remaining: greedy.remaining,
            method: "greedy",
        });
        return Err(AttemptFailure::with_layout(error, layout));
    }

    let report = model.search(config.max_states);
    stats.oracle_states_explored += report.states_explored;
    match report.into_order() {
        Ok(order) => Ok(Accepted {
            layout,
            order,
            analysis,
        }),
        Err(e) => Err(AttemptFailure::with_layout(
            surviving_cycles.unwrap_or(e),
            layout,
        )),
    }
}
