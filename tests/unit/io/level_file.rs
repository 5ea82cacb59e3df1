//! Tests for level JSON persistence

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use vinegen::GenerationError;
    use vinegen::io::level_file::{collect_level_files, level_path, read_level, write_level};
    use vinegen::model::difficulty::Difficulty;
    use vinegen::model::level::Level;
    use vinegen::model::point::{Direction, Point};
    use vinegen::model::vine::Vine;

    fn level(id: u32) -> Level {
        Level {
            id,
            name: format!("Level {id}"),
            difficulty: Difficulty::Tutorial,
            grid_size: [2, 2],
            mask: None,
            vines: vec![
                Vine::new(
                    "vine_1",
                    Direction::Left,
                    vec![Point::new(0, 0), Point::new(1, 0)],
                ),
                Vine::new(
                    "vine_2",
                    Direction::Right,
                    vec![Point::new(1, 1), Point::new(0, 1)],
                ),
            ],
            max_moves: 4,
            min_moves: 2,
            complexity: "simple".to_string(),
            grace: 3,
            color_scheme: vec!["#7CB342".to_string()],
            generation_seed: 31_337,
            generation_attempts: 2,
            generation_elapsed_ms: 12,
            generation_score: 104.0,
        }
    }

    // Tests level files are named by id
    // Verified by zero-padding the id
    #[test]
    fn test_level_path() {
        assert_eq!(
            level_path(&PathBuf::from("levels"), 12),
            PathBuf::from("levels/level_12.json")
        );
    }

    // Tests a written level reads back unchanged
    // Verified by dropping generation metadata on write
    #[test]
    fn test_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");

        let path = write_level(&out, &level(3), false).unwrap();

        assert_eq!(path, out.join("level_3.json"));
        assert_eq!(read_level(&path).unwrap(), level(3));
    }

    // Tests existing files are kept unless overwriting
    // Verified by always truncating the file
    #[test]
    fn test_write_respects_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        write_level(dir.path(), &level(1), false).unwrap();

        let mut changed = level(1);
        changed.name = "Renamed".to_string();
        match write_level(dir.path(), &changed, false) {
            Err(GenerationError::Persistence { operation, .. }) => {
                assert_eq!(operation, "write level");
            }
            other => unreachable!("Expected Persistence error, got {other:?}"),
        }
        assert_eq!(read_level(&level_path(dir.path(), 1)).unwrap().name, "Level 1");

        write_level(dir.path(), &changed, true).unwrap();
        assert_eq!(read_level(&level_path(dir.path(), 1)).unwrap().name, "Renamed");
    }

    // Tests malformed files surface as serialization errors
    // Verified by treating decode failures as missing files
    #[test]
    fn test_read_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level_1.json");
        fs::write(&path, r#"{"id": 1}"#).unwrap();

        assert!(matches!(
            read_level(&path),
            Err(GenerationError::Serialization { .. })
        ));
    }

    // Tests files and directories expand to sorted JSON files
    // Verified by including non-JSON files from directories
    #[test]
    fn test_collect_level_files() {
        let dir = tempfile::tempdir().unwrap();
        let batch = dir.path().join("batch");
        fs::create_dir(&batch).unwrap();
        for name in ["level_2.json", "level_1.json", "notes.txt"] {
            fs::write(batch.join(name), "{}").unwrap();
        }
        let single = dir.path().join("extra.json");
        fs::write(&single, "{}").unwrap();

        let files = collect_level_files(&[single.clone(), batch.clone()]).unwrap();
        assert_eq!(
            files,
            vec![single, batch.join("level_1.json"), batch.join("level_2.json")]
        );

        let missing = collect_level_files(&[dir.path().join("missing")]);
        assert!(matches!(missing, Err(GenerationError::Persistence { .. })));
    }
}
