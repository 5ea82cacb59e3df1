/// Level record assembly, masking and quality scoring
pub mod assembler;
/// Repair of failed placements and blocking cycles
pub mod backtracking;
/// Fixed-width vine sets used as search states
pub mod bitset;
/// Coverage top-up with short filler vines
pub mod gap_filler;
/// Attempt loop with fallback, relaxation and circuit breakers
pub mod orchestrator;
/// Exact and approximate clearing checks
pub mod solvability;
