//! Tests for the persisted level record and its mask

#[cfg(test)]
mod tests {
    use vinegen::GenerationError;
    use vinegen::io::configuration::OCCUPANCY_TOLERANCE;
    use vinegen::model::difficulty::Difficulty;
    use vinegen::model::level::{Level, Mask, MaskMode};
    use vinegen::model::point::{Direction, Point};
    use vinegen::model::vine::Vine;

    fn level(vines: Vec<Vine>, mask: Option<Mask>) -> Level {
        Level {
            id: 7,
            name: "Level 7".to_string(),
            difficulty: Difficulty::Seedling,
            grid_size: [3, 2],
            mask,
            vines,
            max_moves: 4,
            min_moves: 2,
            complexity: "low".to_string(),
            grace: 3,
            color_scheme: vec!["#888888".to_string()],
            generation_seed: 11,
            generation_attempts: 1,
            generation_elapsed_ms: 0,
            generation_score: 100.0,
        }
    }

    fn two_vines() -> Vec<Vine> {
        vec![
            Vine::new(
                "vine_1",
                Direction::Left,
                vec![Point::new(0, 0), Point::new(1, 0)],
            ),
            Vine::new(
                "vine_2",
                Direction::Right,
                vec![Point::new(2, 1), Point::new(1, 1)],
            ),
        ]
    }

    // Tests each mask mode's interpretation of its point list
    // Verified by treating Show like Hide
    #[test]
    fn test_mask_modes() {
        let listed = Point::new(1, 1);
        let other = Point::new(0, 0);

        let hide = Mask { mode: MaskMode::Hide, points: vec![listed] };
        assert!(hide.is_masked(listed));
        assert!(!hide.is_masked(other));

        let show = Mask { mode: MaskMode::Show, points: vec![listed] };
        assert!(!show.is_masked(listed));
        assert!(show.is_masked(other));

        let all = Mask { mode: MaskMode::ShowAll, points: vec![listed] };
        assert!(!all.is_masked(listed));
        assert!(!all.is_masked(other));
    }

    // Tests coverage and visibility derived from vines and mask
    // Verified by dividing by the vine count instead of the area
    #[test]
    fn test_coverage_and_visibility() {
        let hidden = Point::new(2, 0);
        let level = level(
            two_vines(),
            Some(Mask { mode: MaskMode::Hide, points: vec![hidden] }),
        );

        assert_eq!(level.total_cells(), 6);
        assert_eq!(level.occupied_cells(), 4);
        assert!((level.coverage() - 4.0 / 6.0).abs() < 1e-9);
        assert!(!level.is_cell_visible(hidden));
        assert!(level.is_cell_visible(Point::new(0, 0)));
    }

    // Tests structure validation catches duplicates and overlaps
    // Verified by skipping the occupancy rebuild
    #[test]
    fn test_validate_structure() {
        assert!(level(two_vines(), None).validate_structure().is_ok());

        let mut duplicate = two_vines();
        duplicate[1].id = "vine_1".to_string();
        assert!(level(duplicate, None).validate_structure().is_err());

        let mut overlapping = two_vines();
        overlapping[1] = Vine::new(
            "vine_2",
            Direction::Up,
            vec![Point::new(1, 1), Point::new(1, 0)],
        );
        assert!(level(overlapping, None).validate_structure().is_err());
    }

    // Tests a vine hooked across its own exit path fails design validation
    // Verified by leaving self-blocking to the solvability oracle
    #[test]
    fn test_validate_design_rejects_self_blocking() {
        assert!(level(two_vines(), None).validate_design().is_ok());

        let hook = Vine::new(
            "vine_1",
            Direction::Right,
            vec![
                Point::new(1, 0),
                Point::new(0, 0),
                Point::new(0, 1),
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(2, 0),
            ],
        );
        let level = level(vec![hook], None);
        assert!(level.validate_structure().is_ok());

        match level.validate_design() {
            Err(GenerationError::InvalidVine { vine_id, reason }) => {
                assert_eq!(vine_id, "vine_1");
                assert!(reason.contains("own exit path"));
            }
            other => unreachable!("Expected InvalidVine, got {other:?}"),
        }
    }

    // Tests occupancy below the tier minimum fails design validation
    // Verified by comparing against the unrelaxed tier coverage
    #[test]
    fn test_validate_design_rejects_sparse_level() {
        let sparse = level(two_vines()[..1].to_vec(), None);
        let spec = Difficulty::Seedling.spec();
        let minimum = spec.min_occupancy.min(spec.non_lifo_coverage) - OCCUPANCY_TOLERANCE;
        assert!((sparse.minimum_occupancy() - minimum).abs() < 1e-9);

        match sparse.validate_design() {
            Err(GenerationError::CoverageInsufficient { achieved, required }) => {
                assert!((achieved - 2.0 / 6.0).abs() < 1e-9);
                assert!((required - minimum).abs() < 1e-9);
            }
            other => unreachable!("Expected CoverageInsufficient, got {other:?}"),
        }
    }

    // Tests JSON field names expected by the client
    // Verified by renaming the show-all variant
    #[test]
    fn test_serialization_format() {
        let with_mask = level(
            two_vines(),
            Some(Mask { mode: MaskMode::ShowAll, points: Vec::new() }),
        );
        let json = serde_json::to_value(&with_mask).unwrap();
        assert_eq!(json["mask"]["mode"], "show-all");
        assert_eq!(json["grid_size"], serde_json::json!([3, 2]));
        assert_eq!(json["vines"][0]["head_direction"], "left");

        let without_mask = serde_json::to_value(level(two_vines(), None)).unwrap();
        assert!(without_mask.get("mask").is_none());

        let parsed: Level = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, with_mask);
    }
}
