//! Tests for the strategy registry

#[cfg(test)]
mod tests {
    use vinegen::GenerationError;
    use vinegen::placement::center_out::CenterOut;
    use vinegen::placement::{
        PlacementStrategy, STRATEGY_CENTER_OUT, STRATEGY_CLEARABLE_FIRST, STRATEGY_DIRECTION_FIRST,
        StrategyRegistry,
    };

    // Tests the defaults hold every built-in strategy in name order
    // Verified by registering the defaults into a hash map
    #[test]
    fn test_defaults() {
        let registry = StrategyRegistry::with_defaults();

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.names(),
            vec![
                STRATEGY_CENTER_OUT,
                STRATEGY_CLEARABLE_FIRST,
                STRATEGY_DIRECTION_FIRST
            ]
        );
        for (name, description) in registry.list() {
            let strategy = registry.get(name).unwrap();
            assert_eq!(strategy.name(), name);
            assert_eq!(strategy.description(), description);
        }
        assert!(registry.get(STRATEGY_CENTER_OUT).unwrap().is_lifo());
        assert!(!registry.get(STRATEGY_DIRECTION_FIRST).unwrap().is_lifo());
    }

    // Tests unknown names list the registered alternatives
    // Verified by returning an empty list of names
    #[test]
    fn test_unknown_strategy() {
        let registry = StrategyRegistry::with_defaults();

        match registry.get("spiral") {
            Err(GenerationError::UnknownStrategy { name, available }) => {
                assert_eq!(name, "spiral");
                assert_eq!(available.len(), 3);
                assert!(available.contains(&STRATEGY_CENTER_OUT.to_string()));
            }
            Err(other) => unreachable!("Expected UnknownStrategy, got {other}"),
            Ok(_) => unreachable!("Expected UnknownStrategy"),
        }
    }

    // Tests custom strategies can be added and replace existing names
    // Verified by ignoring registrations for taken names
    #[test]
    fn test_register() {
        let mut registry = StrategyRegistry::new();
        assert!(registry.is_empty());

        registry.register("custom", "first", || Box::new(CenterOut));
        registry.register("custom", "second", || Box::new(CenterOut));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("custom"));
        assert!(!registry.contains(STRATEGY_CENTER_OUT));
        assert_eq!(registry.list(), vec![("custom", "second")]);
        assert_eq!(format!("{registry:?}"), "[\"custom\"]");
    }

    // Tests strategies registered by instance keep their own name and description
    // Verified by registering every strategy under the same description
    #[test]
    fn test_register_strategy() {
        let mut registry = StrategyRegistry::new();
        registry.register_strategy(|| Box::new(CenterOut));

        let strategy = CenterOut;
        assert_eq!(registry.names(), vec![STRATEGY_CENTER_OUT]);
        assert_eq!(
            registry.list(),
            vec![(STRATEGY_CENTER_OUT, strategy.description())]
        );

        registry.register("custom", "hand written", || Box::new(CenterOut));
        registry.register_strategy(|| Box::new(CenterOut));
        assert_eq!(registry.len(), 2);
    }
}
