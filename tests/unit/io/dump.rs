//! Tests for failure dump capture, persistence and replay

#[cfg(test)]
mod tests {
    use std::fs;
    use vinegen::io::dump::{
        DumpKind, FailureDump, OccupiedCell, collect_dump_files, load_failure_dump,
    };
    use vinegen::model::difficulty::Difficulty;
    use vinegen::model::generation::GenerationConfig;
    use vinegen::model::point::{Direction, Point};
    use vinegen::model::vine::Vine;
    use vinegen::placement::STRATEGY_DIRECTION_FIRST;
    use vinegen::spatial::OccupancyGrid;

    fn sample_dump() -> FailureDump {
        let mut config = GenerationConfig::with_difficulty(4, Difficulty::Tutorial).with_grid(4, 3);
        config.strategy = STRATEGY_DIRECTION_FIRST.to_string();
        let vines = vec![
            Vine::new(
                "vine_1",
                Direction::Left,
                vec![Point::new(0, 2), Point::new(1, 2), Point::new(1, 1)],
            ),
            Vine::new(
                "vine_2",
                Direction::Down,
                vec![Point::new(3, 0), Point::new(3, 1)],
            ),
        ];
        let grid = OccupancyGrid::from_vines(4, 3, &vines).unwrap();
        FailureDump::capture(&config, 3, 42, "vine_3 found no seed", &vines, &grid)
    }

    // Tests capture records the grid state sorted by row
    // Verified by listing cells in vine order
    #[test]
    fn test_capture() {
        let dump = sample_dump();

        assert_eq!(dump.level_id, 4);
        assert_eq!(dump.grid, [4, 3]);
        assert_eq!(dump.vines.len(), 2);
        assert!((dump.coverage - 5.0 / 12.0).abs() < 1e-9);
        assert_eq!(dump.difficulty, Difficulty::Tutorial);
        assert_eq!(dump.strategy, STRATEGY_DIRECTION_FIRST);
        assert_eq!(
            dump.occupied.first(),
            Some(&OccupiedCell {
                x: 3,
                y: 0,
                vine: "vine_2".to_string()
            })
        );
        let rows: Vec<(i32, i32)> = dump.occupied.iter().map(|cell| (cell.y, cell.x)).collect();
        let mut sorted = rows.clone();
        sorted.sort_unstable();
        assert_eq!(rows, sorted);
    }

    // Tests the dump is written as JSON and text and reads back intact
    // Verified by skipping the text rendering
    #[test]
    fn test_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("dumps");
        let dump = sample_dump();

        let path = dump.write(&target).unwrap();

        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("failure_level_4_seed_42_attempt_3.json")
        );
        assert!(target.join("failure_level_4_seed_42_attempt_3.txt").exists());
        assert_eq!(load_failure_dump(&path).unwrap(), dump);
        assert_eq!(collect_dump_files(&target).unwrap(), vec![path]);
    }

    // Tests the text rendering carries the header and grid
    // Verified by omitting the failure message
    #[test]
    fn test_render() {
        let text = sample_dump().render();

        assert!(text.starts_with("level 4 seed 42 attempt 3\nvine_3 found no seed\n"));
        assert!(text.contains("coverage 41.7%"));
        assert!(text.contains("<a..\n.a.b\n...v\n"));
        assert!(text.contains("b vine_2 down len=2"));
    }

    // Tests replay reruns the failing attempt's seed once
    // Verified by replaying from the level's base seed
    #[test]
    fn test_replay_config() {
        let config = sample_dump().replay_config();

        assert_eq!(config.level_id, 4);
        assert_eq!((config.grid_width, config.grid_height), (4, 3));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.base_seed(), 42);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.difficulty, Difficulty::Tutorial);
        assert_eq!(config.strategy, STRATEGY_DIRECTION_FIRST);
    }

    // Tests replay restores the attempt's effective parameters
    // Verified by rebuilding the parameters from tier defaults
    #[test]
    fn test_replay_restores_parameters() {
        let mut config = GenerationConfig::with_difficulty(6, Difficulty::Seedling).with_grid(7, 10);
        config.vine_count = 30;
        config.max_moves = 45;
        config.min_coverage = 0.85;
        config.backtrack_window = 1;
        config.max_backtrack_attempts = 1;
        config.max_states = 1;
        config.strict_depth = true;
        let grid = OccupancyGrid::new(7, 10);

        let dump = FailureDump::capture(&config, 5, 99, "stuck", &[], &grid);
        let parameters = dump.parameters.clone().unwrap();
        assert_eq!(parameters.vine_count, 30);
        assert_eq!(parameters.max_states, 1);

        let replay = dump.replay_config();
        assert_eq!(replay.vine_count, 30);
        assert_eq!(replay.max_moves, 45);
        assert!((replay.min_coverage - 0.85).abs() < f64::EPSILON);
        assert_eq!(replay.backtrack_window, 1);
        assert_eq!(replay.max_backtrack_attempts, 1);
        assert_eq!(replay.max_states, 1);
        assert!(replay.strict_depth);
        assert_eq!(replay.seed, Some(99));
        assert!(replay.validate().is_ok());
    }

    // Tests backtrack dumps are named after the vine being placed
    // Verified by sharing the failure dump name
    #[test]
    fn test_backtrack_dump_name() {
        let dump = sample_dump().backtrack("vine_3");

        assert_eq!(dump.kind, DumpKind::Backtrack);
        assert_eq!(dump.base_name(), "backtrack_level_4_seed_42_attempt_3_vine_3");
        assert_eq!(sample_dump().kind, DumpKind::Failure);
        assert_eq!(sample_dump().base_name(), "failure_level_4_seed_42_attempt_3");
    }

    // Tests dumps without tier or strategy load with defaults
    // Verified by requiring every field
    #[test]
    fn test_load_minimal_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failure.json");
        fs::write(
            &path,
            r#"{"level_id": 9, "grid": [5, 5], "seed": 7, "attempt": 0,
                "message": "stuck", "coverage": 0.0, "vines": [], "occupied": []}"#,
        )
        .unwrap();

        let dump = load_failure_dump(&path).unwrap();
        assert_eq!(dump.difficulty, Difficulty::default());
        assert!(dump.strategy.is_empty());
        assert_eq!(dump.kind, DumpKind::Failure);
        assert!(dump.parameters.is_none());
        assert_eq!(dump.replay_config().strategy, "center-out");
    }

    // Tests unreadable and malformed dumps report the file
    // Verified by mapping every failure to one kind
    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_failure_dump(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(missing.kind(), "persistence");

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{").unwrap();
        let error = load_failure_dump(&broken).unwrap_err();
        assert!(error.to_string().contains("broken.json"));
    }

    // Tests only JSON files are collected, in name order
    // Verified by returning directory order
    #[test]
    fn test_collect_dump_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "a.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }

        let files = collect_dump_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.json"), dir.path().join("b.json")]
        );
        assert!(collect_dump_files(&dir.path().join("none")).is_err());
    }
}
