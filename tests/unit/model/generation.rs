//! Tests for generation parameters, seed derivation and statistics

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use vinegen::GenerationError;
    use vinegen::io::configuration::{
        AGGRESSIVE_BACKTRACK_WINDOW, ATTEMPT_SEED_STRIDE, DEFAULT_SEED_MULTIPLIER,
    };
    use vinegen::model::difficulty::Difficulty;
    use vinegen::model::generation::{
        GenerationConfig, GenerationStats, default_coverage, default_vine_count,
    };
    use vinegen::placement::{STRATEGY_CENTER_OUT, STRATEGY_DIRECTION_FIRST, StrategyRegistry};

    // Tests defaults follow the tier derived from the level id
    // Verified by ignoring the level id in for_level
    #[test]
    fn test_for_level_uses_tier_defaults() {
        let config = GenerationConfig::for_level(20);

        assert_eq!(config.difficulty, Difficulty::Sprout);
        assert_eq!(
            (config.grid_width, config.grid_height),
            Difficulty::Sprout.spec().default_grid()
        );
        assert!((config.min_coverage - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.max_moves, config.vine_count * 2);
        assert!(config.validate().is_ok());
    }

    // Tests resizing recomputes the vine count
    // Verified by keeping the old vine count in with_grid
    #[test]
    fn test_with_grid_recomputes_vine_count() {
        let config = GenerationConfig::with_difficulty(1, Difficulty::Tutorial).with_grid(7, 10);

        assert_eq!(config.total_cells(), 70);
        assert_eq!(config.vine_count, 8);
        assert_eq!(config.target_cells(), 70);
    }

    // Tests the vine count estimate is clamped by tier and area
    // Verified by removing the area-based cap
    #[test]
    fn test_default_vine_count_clamps() {
        assert_eq!(default_vine_count(48, 1.0, Difficulty::Seedling), 6);
        assert_eq!(default_vine_count(8, 1.0, Difficulty::Seedling), 3);
        assert_eq!(default_vine_count(2_000, 1.0, Difficulty::Tutorial), 8);
    }

    // Tests coverage defaults for LIFO and non-LIFO strategies
    // Verified by returning the table value for LIFO strategies
    #[test]
    fn test_default_coverage() {
        assert!((default_coverage(Difficulty::Sprout, true) - 1.0).abs() < f64::EPSILON);
        assert!((default_coverage(Difficulty::Sprout, false) - 0.80).abs() < f64::EPSILON);
    }

    // Tests target cells round up and never exceed the grid
    // Verified by truncating instead of rounding up
    #[test]
    fn test_target_cells_rounds_up() {
        let mut config = GenerationConfig::for_level(1).with_grid(3, 3);
        config.min_coverage = 0.5;
        assert_eq!(config.target_cells(), 5);
        config.min_coverage = 1.0;
        assert_eq!(config.target_cells(), 9);
    }

    // Tests seed precedence and per-attempt stride
    // Verified by ignoring the explicit seed
    #[test]
    fn test_seed_derivation() {
        let mut config = GenerationConfig::for_level(3);
        assert_eq!(config.base_seed(), 3 * DEFAULT_SEED_MULTIPLIER);

        config.seed = Some(31_337);
        config.randomize = true;
        assert_eq!(config.base_seed(), 31_337);

        assert_eq!(GenerationConfig::attempt_seed(100, 0), 100);
        assert_eq!(GenerationConfig::attempt_seed(100, 2), 100 + 2 * ATTEMPT_SEED_STRIDE);
        assert_eq!(GenerationConfig::attempt_seed(u64::MAX, 1), ATTEMPT_SEED_STRIDE - 1);
    }

    // Tests validation names the offending parameter
    // Verified by dropping the timeout ordering check
    #[test]
    fn test_validate_rejects_bad_parameters() {
        let parameter_of = |config: &GenerationConfig| match config.validate() {
            Err(GenerationError::InvalidParameter { parameter, .. }) => parameter,
            other => unreachable!("Expected InvalidParameter, got {other:?}"),
        };

        let base = GenerationConfig::for_level(1);

        let mut config = base.clone().with_grid(1, 5);
        assert_eq!(parameter_of(&config), "grid_size");

        config = base.clone();
        config.min_coverage = 0.0;
        assert_eq!(parameter_of(&config), "min_coverage");

        config = base.clone();
        config.backtrack_window = 0;
        assert_eq!(parameter_of(&config), "backtrack_window");

        config = base.clone();
        config.max_attempts = 0;
        assert_eq!(parameter_of(&config), "max_attempts");

        config = base.clone();
        config.max_states = 0;
        assert_eq!(parameter_of(&config), "max_states");

        config = base;
        config.soft_timeout = Duration::from_secs(10);
        config.hard_timeout = Duration::from_secs(5);
        assert_eq!(parameter_of(&config), "hard_timeout");
    }

    // Tests switching strategy recomputes coverage and vine count
    // Verified by keeping the LIFO coverage for every strategy
    #[test]
    fn test_with_strategy_recomputes_coverage() {
        let registry = StrategyRegistry::with_defaults();
        let lifo = GenerationConfig::with_difficulty(1, Difficulty::Seedling);

        let config = lifo
            .clone()
            .with_strategy(STRATEGY_DIRECTION_FIRST, &registry)
            .unwrap();

        let expected = Difficulty::Seedling.spec().non_lifo_coverage;
        assert_eq!(config.strategy, STRATEGY_DIRECTION_FIRST);
        assert!((config.min_coverage - expected).abs() < f64::EPSILON);
        assert_eq!(
            config.vine_count,
            default_vine_count(config.total_cells(), expected, Difficulty::Seedling)
        );
        assert_eq!(config.max_moves, config.vine_count * 2);

        let back = config.with_strategy(STRATEGY_CENTER_OUT, &registry).unwrap();
        assert!((back.min_coverage - 1.0).abs() < f64::EPSILON);
        assert_eq!(back.vine_count, lifo.vine_count);

        assert!(matches!(
            lifo.with_strategy("spiral", &registry),
            Err(GenerationError::UnknownStrategy { .. })
        ));
    }

    // Tests the aggressive preset widens the backtrack window
    // Verified by leaving the window unchanged
    #[test]
    fn test_aggressive_backtracking_preset() {
        let config = GenerationConfig::for_level(1).with_aggressive_backtracking();
        assert_eq!(config.backtrack_window, AGGRESSIVE_BACKTRACK_WINDOW);
        assert!(config.max_backtrack_attempts >= config.backtrack_window);
    }

    // Tests failure bookkeeping and structural success rate
    // Verified by dividing by failures instead of attempts
    #[test]
    fn test_stats_counters() {
        let mut stats = GenerationStats::default();
        assert!(stats.structural_success_rate().abs() < f64::EPSILON);

        stats.attempts = 4;
        stats.structural_successes = 3;
        stats.record_failure("coverage");
        stats.record_failure("coverage");
        stats.record_failure("unsolvable");

        assert_eq!(stats.failure_count(), 3);
        assert_eq!(stats.failures.get("coverage"), Some(&2));
        assert!((stats.structural_success_rate() - 0.75).abs() < f64::EPSILON);
    }
}
