//! Tests for generation constants and their relationships

#[cfg(test)]
mod tests {
    use vinegen::io::configuration::{
        AGGRESSIVE_BACKTRACK_WINDOW, AGGRESSIVE_MAX_BACKTRACK_ATTEMPTS, ATTEMPT_SEED_STRIDE,
        DEFAULT_BACKTRACK_WINDOW, DEFAULT_HARD_TIMEOUT, DEFAULT_MAX_ATTEMPTS,
        DEFAULT_MAX_BACKTRACK_ATTEMPTS, DEFAULT_SEED_MULTIPLIER, DEFAULT_SOFT_TIMEOUT,
        MIN_VINE_LENGTH, RELAX_COVERAGE_AFTER, RELAX_COVERAGE_AGAIN_AFTER, RELAX_VINE_COUNT_AFTER,
        STRATEGY_FALLBACK_AFTER, VINE_COUNT_RELAXATION,
    };

    // Tests seed derivation constants
    // Verified by changing the stride
    #[test]
    fn test_seed_constants() {
        assert_eq!(DEFAULT_SEED_MULTIPLIER, 31_337);
        assert_eq!(ATTEMPT_SEED_STRIDE, 7_919);
    }

    // Tests the aggressive preset widens both backtracking limits
    // Verified by swapping the presets
    #[test]
    fn test_backtracking_presets() {
        assert_eq!(
            (DEFAULT_BACKTRACK_WINDOW, DEFAULT_MAX_BACKTRACK_ATTEMPTS),
            (3, 2)
        );
        assert_eq!(
            (AGGRESSIVE_BACKTRACK_WINDOW, AGGRESSIVE_MAX_BACKTRACK_ATTEMPTS),
            (6, 6)
        );
    }

    // Tests the recovery schedule is ordered within the attempt cap
    // Verified by relaxing coverage before falling back
    #[test]
    fn test_recovery_schedule_order() {
        assert!(STRATEGY_FALLBACK_AFTER < RELAX_VINE_COUNT_AFTER);
        assert!(RELAX_VINE_COUNT_AFTER < RELAX_COVERAGE_AFTER);
        assert!(RELAX_COVERAGE_AFTER < RELAX_COVERAGE_AGAIN_AFTER);
        assert!(RELAX_COVERAGE_AGAIN_AFTER < DEFAULT_MAX_ATTEMPTS);
        assert!(VINE_COUNT_RELAXATION < 1.0);
    }

    // Tests timeouts and vine length floor
    // Verified by making the soft timeout longer than the hard one
    #[test]
    fn test_limits() {
        assert!(DEFAULT_SOFT_TIMEOUT < DEFAULT_HARD_TIMEOUT);
        assert_eq!(MIN_VINE_LENGTH, 2);
    }
}
