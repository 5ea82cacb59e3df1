//! Generation constants and runtime configuration defaults

use std::time::Duration;

// Seed derivation
/// Multiplier deriving a default seed from the level id
pub const DEFAULT_SEED_MULTIPLIER: u64 = 31_337;
/// Prime stride separating the seeds of consecutive attempts
pub const ATTEMPT_SEED_STRIDE: u64 = 7_919;

// Vine geometry
/// Shortest legal vine (head plus neck)
pub const MIN_VINE_LENGTH: usize = 2;
/// Fewest vines a default configuration asks for
pub const MIN_VINE_COUNT: usize = 3;
/// Fraction of the grid area that bounds the default vine count
pub const MAX_VINE_COUNT_DIVISOR: usize = 4;
/// Seed cells tried before a single vine placement is declared failed
pub const MAX_SEED_ATTEMPTS: usize = 100;
/// Smallest pool of centre-ranked seed candidates sampled from
pub const CENTER_SEED_POOL_MIN: usize = 5;

// Backtracking
/// Vines removed by one sliding-window backtrack
pub const DEFAULT_BACKTRACK_WINDOW: usize = 3;
/// Sliding-window backtracks tried per failed vine
pub const DEFAULT_MAX_BACKTRACK_ATTEMPTS: usize = 2;
/// Window used by the aggressive preset
pub const AGGRESSIVE_BACKTRACK_WINDOW: usize = 6;
/// Attempt cap used by the aggressive preset
pub const AGGRESSIVE_MAX_BACKTRACK_ATTEMPTS: usize = 6;
/// Score bonus for vines blocking the failing vine directly
pub const DIRECT_BLOCKER_BONUS: usize = 1_000;
/// Weight of blocking fan-out in cycle-breaker combination scores
pub const COMBINATION_FAN_OUT_WEIGHT: usize = 10;
/// Multi-vine removal combinations tried per cycle-breaker pass
pub const MAX_CYCLE_BREAKER_COMBINATIONS: usize = 12;
/// Step cap of the cheap partial-solvability pre-check
pub const PARTIAL_CHECK_MAX_STEPS: usize = 200;
/// Oracle budget for validating a cycle-breaker removal
pub const REPAIR_MAX_STATES: usize = 50_000;

// Gap filling
/// Longest filler grown by the LIFO phase
pub const LIFO_FILLER_MAX_LENGTH: usize = 5;
/// Iterations without progress before the LIFO phase stops
pub const FILLER_STALL_LIMIT: usize = 10;
/// LIFO phase iteration cap as a multiple of the grid area
pub const FILLER_ITERATION_FACTOR: usize = 3;
/// Passes made by the fallback phase
pub const FALLBACK_FILLER_PASSES: usize = 3;
/// Oracle budget for validating a single fallback filler
pub const FILLER_MAX_STATES: usize = 20_000;

// Orchestration
/// Attempts per level before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 200;
/// Exhaustive-search cap of the solvability oracle
pub const DEFAULT_MAX_STATES: usize = 200_000;
/// Soft circuit breaker
pub const DEFAULT_SOFT_TIMEOUT: Duration = Duration::from_secs(30);
/// Hard circuit breaker
pub const DEFAULT_HARD_TIMEOUT: Duration = Duration::from_secs(60);
/// Structural success rate that earns one soft-timeout extension
pub const STRUCTURAL_HEALTH_THRESHOLD: f64 = 0.5;
/// Attempts spent on the configured strategy before falling back
pub const STRATEGY_FALLBACK_AFTER: usize = 25;
/// Attempt at which the target vine count is reduced
pub const RELAX_VINE_COUNT_AFTER: usize = 40;
/// Attempt at which coverage is first relaxed
pub const RELAX_COVERAGE_AFTER: usize = 80;
/// Attempt at which coverage is relaxed a second time
pub const RELAX_COVERAGE_AGAIN_AFTER: usize = 120;
/// Factor applied to the vine count when relaxing
pub const VINE_COUNT_RELAXATION: f64 = 0.9;
/// Coverage removed by each relaxation step
pub const COVERAGE_RELAXATION_STEP: f64 = 0.05;
/// Coverage shortfall that may be hidden behind a mask
pub const MAX_MASKED_SHORTFALL: f64 = 0.10;
/// Attempts between progress log lines
pub const PROGRESS_LOG_INTERVAL: usize = 25;

// Scoring
/// Starting quality score
pub const BASE_SCORE: f64 = 100.0;
/// Attempts allowed before the score starts dropping
pub const SCORE_FREE_ATTEMPTS: usize = 100;
/// Score lost per attempt beyond the free allowance
pub const SCORE_ATTEMPT_PENALTY: f64 = 0.1;
/// Coverage band earning the density bonus
pub const SCORE_IDEAL_COVERAGE: (f64, f64) = (0.85, 0.95);
/// Density bonus
pub const SCORE_COVERAGE_BONUS: f64 = 10.0;
/// Coverage under which the sparse penalty applies
pub const SCORE_SPARSE_COVERAGE: f64 = 0.7;
/// Sparse penalty
pub const SCORE_SPARSE_PENALTY: f64 = 20.0;
/// Bonus per unit of vine length spread
pub const SCORE_LENGTH_SPREAD_WEIGHT: f64 = 2.0;
/// Penalty per level of blocking depth above the tier limit
pub const SCORE_DEPTH_PENALTY: f64 = 5.0;

// Validation settings
/// Allowed occupancy below the tier's minimum coverage before a level is rejected
pub const OCCUPANCY_TOLERANCE: f64 = 0.40;

// Output settings
/// Directory receiving level files
pub const DEFAULT_OUTPUT_DIR: &str = "levels";
/// Directory receiving failure dumps from the command line
pub const DEFAULT_DUMP_DIR: &str = "failing_dumps";

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;
