//! Tests for command-line parsing, batch generation and level validation

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::fs;
    use std::path::{Path, PathBuf};
    use vinegen::GenerationError;
    use vinegen::io::cli::{
        BatchGenerator, Cli, Command, GenerateArgs, parse_level_range, validate_level_file,
        validate_levels,
    };
    use vinegen::io::configuration::{
        AGGRESSIVE_BACKTRACK_WINDOW, DEFAULT_DUMP_DIR, DEFAULT_MAX_STATES, DEFAULT_OUTPUT_DIR,
    };
    use vinegen::io::level_file::{level_path, read_level, write_level};
    use vinegen::model::difficulty::Difficulty;
    use vinegen::model::point::{Direction, Point};
    use vinegen::model::vine::Vine;
    use vinegen::placement::{STRATEGY_CENTER_OUT, STRATEGY_DIRECTION_FIRST, StrategyRegistry};

    fn generate_args(extra: &[&str]) -> GenerateArgs {
        let mut args = vec!["vinegen", "generate"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Command::Generate(args) => args,
            other => unreachable!("Expected generate, got {other:?}"),
        }
    }

    fn small_batch(out: &Path, levels: &str) -> GenerateArgs {
        let out = out.to_string_lossy().into_owned();
        generate_args(&[
            "--levels", levels, "--out", &out, "-W", "5", "-H", "5", "--no-dumps",
        ])
    }

    // Tests single ids and every range syntax
    // Verified by treating the upper bound as exclusive
    #[test]
    fn test_parse_level_range() {
        assert_eq!(parse_level_range("4"), Ok(4..=4));
        assert_eq!(parse_level_range("3..8"), Ok(3..=8));
        assert_eq!(parse_level_range("3..=8"), Ok(3..=8));
        assert_eq!(parse_level_range("2-5"), Ok(2..=5));
        assert_eq!(parse_level_range(" 6 .. 6 "), Ok(6..=6));
    }

    // Tests malformed and reversed ranges are rejected
    // Verified by swapping reversed bounds
    #[test]
    fn test_parse_level_range_errors() {
        assert!(parse_level_range("").is_err());
        assert!(parse_level_range("abc").is_err());
        assert!(parse_level_range("8..3").is_err());
        assert!(parse_level_range("0").is_err());
        assert!(parse_level_range("1..x").is_err());
    }

    // Tests CLI parsing with only the required levels
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_generate_defaults() {
        let args = generate_args(&["-l", "1"]);

        assert_eq!(args.levels, 1..=1);
        assert_eq!(args.out, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert_eq!(args.dump_dir, PathBuf::from(DEFAULT_DUMP_DIR));
        assert_eq!(args.strategy, STRATEGY_CENTER_OUT);
        assert_eq!(args.seed, None);
        assert!(!args.aggressive && !args.no_dumps && !args.overwrite);
    }

    // Tests CLI parsing with all available arguments
    // Verified by modifying custom parsers to ensure they're invoked
    #[test]
    fn test_generate_all_args() {
        let args = generate_args(&[
            "--levels",
            "2..3",
            "--out",
            "out",
            "-W",
            "8",
            "-H",
            "11",
            "-d",
            "sprout",
            "-s",
            "99",
            "--strategy",
            STRATEGY_DIRECTION_FIRST,
            "--min-coverage",
            "0.8",
            "--vine-count",
            "12",
            "--max-moves",
            "30",
            "--backtrack-window",
            "4",
            "--max-backtrack-attempts",
            "5",
            "--dump-dir",
            "dumps",
            "--max-states",
            "1000",
            "--max-attempts",
            "50",
            "--strict-depth",
            "--overwrite",
        ]);

        assert_eq!(args.levels, 2..=3);
        assert_eq!(args.width, Some(8));
        assert_eq!(args.height, Some(11));
        assert_eq!(args.difficulty, Some(Difficulty::Sprout));
        assert_eq!(args.seed, Some(99));
        assert_eq!(args.min_coverage, Some(0.8));
        assert_eq!(args.vine_count, Some(12));
        assert_eq!(args.max_moves, Some(30));
        assert_eq!(args.backtrack_window, Some(4));
        assert_eq!(args.max_backtrack_attempts, Some(5));
        assert_eq!(args.dump_dir, PathBuf::from("dumps"));
        assert_eq!(args.max_states, Some(1000));
        assert_eq!(args.max_attempts, Some(50));
        assert!(args.strict_depth && args.overwrite);
    }

    // Tests seed and randomize cannot be combined
    // Verified by removing the conflict declaration
    #[test]
    fn test_seed_conflicts_with_randomize() {
        let result = Cli::try_parse_from(["vinegen", "generate", "-l", "1", "-s", "5", "--randomize"]);
        assert!(result.is_err());
    }

    // Tests global flags and the remaining subcommands
    // Verified by scoping verbosity to generate only
    #[test]
    fn test_other_subcommands() {
        let cli = Cli::parse_from(["vinegen", "validate", "levels", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.should_show_progress());
        match cli.command {
            Command::Validate { paths, max_states } => {
                assert_eq!(paths, vec![PathBuf::from("levels")]);
                assert_eq!(max_states, DEFAULT_MAX_STATES);
            }
            other => unreachable!("Expected validate, got {other:?}"),
        }

        let cli = Cli::parse_from(["vinegen", "--quiet", "render", "level_1.json"]);
        assert!(!cli.should_show_progress());
        assert!(matches!(cli.command, Command::Render { .. }));

        assert!(matches!(
            Cli::parse_from(["vinegen", "strategies"]).command,
            Command::Strategies
        ));
        assert!(Cli::try_parse_from(["vinegen", "validate"]).is_err());
    }

    // Tests per-level configuration honours the overrides
    // Verified by applying the aggressive preset after explicit values
    #[test]
    fn test_config_for() {
        let registry = StrategyRegistry::with_defaults();
        let args = generate_args(&[
            "-l",
            "1..2",
            "-W",
            "6",
            "-H",
            "9",
            "-s",
            "5",
            "--vine-count",
            "7",
            "--aggressive",
            "--max-backtrack-attempts",
            "9",
            "--no-dumps",
        ]);

        let config = args.config_for(2, &registry).unwrap();

        assert_eq!(config.level_id, 2);
        assert_eq!(config.difficulty, Difficulty::Tutorial);
        assert_eq!((config.grid_width, config.grid_height), (6, 9));
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.vine_count, 7);
        assert_eq!(config.max_moves, 14);
        assert_eq!(config.backtrack_window, AGGRESSIVE_BACKTRACK_WINDOW);
        assert_eq!(config.max_backtrack_attempts, 9);
        assert!((config.min_coverage - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.dump_dir, None);
    }

    // Tests non-LIFO strategies default to the tier coverage
    // Verified by always demanding full coverage
    #[test]
    fn test_config_for_non_lifo_coverage() {
        let registry = StrategyRegistry::with_defaults();
        let args = generate_args(&["-l", "1", "--strategy", STRATEGY_DIRECTION_FIRST]);

        let config = args.config_for(1, &registry).unwrap();
        let expected = Difficulty::Tutorial.spec().non_lifo_coverage;
        assert!((config.min_coverage - expected).abs() < f64::EPSILON);
        assert_eq!(config.dump_dir, Some(PathBuf::from(DEFAULT_DUMP_DIR)));

        let unknown = generate_args(&["-l", "1", "--strategy", "spiral"]);
        assert!(matches!(
            unknown.config_for(1, &registry),
            Err(GenerationError::UnknownStrategy { .. })
        ));
    }

    // Tests a batch writes one valid file per level
    // Verified by writing only the last level
    #[test]
    fn test_batch_process() {
        let dir = tempfile::tempdir().unwrap();
        let registry = StrategyRegistry::with_defaults();
        let mut batch = BatchGenerator::new(small_batch(dir.path(), "1..2"), &registry, false);
        assert!(batch.multi_progress().is_none());

        batch.process().unwrap();

        for level_id in 1..=2 {
            let path = level_path(dir.path(), level_id);
            let level = read_level(&path).unwrap();
            assert_eq!(level.id, level_id);
            assert_eq!(validate_level_file(&path, DEFAULT_MAX_STATES).unwrap(), level.vines.len());
        }
        assert!(batch.collect_levels().is_empty());
    }

    // Tests existing level files are skipped unless overwriting
    // Verified by regenerating every level
    #[test]
    fn test_collect_levels_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let registry = StrategyRegistry::with_defaults();
        fs::write(level_path(dir.path(), 2), "{}").unwrap();

        let batch = BatchGenerator::new(small_batch(dir.path(), "1..3"), &registry, false);
        assert_eq!(batch.collect_levels(), vec![1, 3]);

        let mut args = small_batch(dir.path(), "1..3");
        args.overwrite = true;
        let batch = BatchGenerator::new(args, &registry, true);
        assert_eq!(batch.collect_levels(), vec![1, 2, 3]);
        assert!(batch.multi_progress().is_some());
    }

    // Tests file validation applies the design rules before the oracle
    // Verified by only checking structure and solvability
    #[test]
    fn test_validate_level_file_design_rules() {
        let dir = tempfile::tempdir().unwrap();
        let registry = StrategyRegistry::with_defaults();
        BatchGenerator::new(small_batch(dir.path(), "1"), &registry, false)
            .process()
            .unwrap();
        let generated = read_level(&level_path(dir.path(), 1)).unwrap();

        let mut hooked = generated.clone();
        hooked.id = 2;
        hooked.vines = vec![Vine::new(
            "vine_1",
            Direction::Right,
            [(1, 0), (0, 0), (0, 1), (1, 1), (2, 1), (2, 0)]
                .into_iter()
                .map(|(x, y)| Point::new(x, y))
                .collect(),
        )];
        let path = write_level(dir.path(), &hooked, false).unwrap();
        let error = validate_level_file(&path, DEFAULT_MAX_STATES).unwrap_err();
        assert_eq!(error.kind(), "invalid_vine");

        let mut sparse = generated;
        sparse.id = 3;
        sparse.difficulty = Difficulty::Seedling;
        sparse.vines = vec![Vine::new(
            "vine_1",
            Direction::Left,
            vec![Point::new(0, 0), Point::new(1, 0)],
        )];
        let path = write_level(dir.path(), &sparse, false).unwrap();
        let error = validate_level_file(&path, DEFAULT_MAX_STATES).unwrap_err();
        assert_eq!(error.kind(), "coverage");
    }

    // Tests validation counts every failing file
    // Verified by stopping at the first failure
    #[test]
    fn test_validate_levels() {
        let dir = tempfile::tempdir().unwrap();
        let registry = StrategyRegistry::with_defaults();
        BatchGenerator::new(small_batch(dir.path(), "1"), &registry, false)
            .process()
            .unwrap();
        assert!(validate_levels(&[dir.path().to_path_buf()], DEFAULT_MAX_STATES).is_ok());

        let mut broken = read_level(&level_path(dir.path(), 1)).unwrap();
        broken.id = 2;
        if let Some(vine) = broken.vines.first_mut() {
            vine.head_direction = vine.head_direction.opposite();
        }
        write_level(dir.path(), &broken, false).unwrap();
        fs::write(dir.path().join("level_3.json"), "not json").unwrap();

        match validate_levels(&[dir.path().to_path_buf()], DEFAULT_MAX_STATES) {
            Err(GenerationError::ValidationFailed { failed, total }) => {
                assert_eq!((failed, total), (2, 3));
            }
            other => unreachable!("Expected ValidationFailed, got {other:?}"),
        }
    }
}
