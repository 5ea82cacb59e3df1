//! Name-keyed lookup of placement strategies

use crate::io::error::{GenerationError, Result};
use crate::placement::center_out::CenterOut;
use crate::placement::clearable_first::ClearableFirst;
use crate::placement::direction_first::DirectionFirst;
use crate::placement::PlacementStrategy;
use std::collections::BTreeMap;

/// Constructor for a fresh strategy instance
pub type StrategyFactory = fn() -> Box<dyn PlacementStrategy>;

#[derive(Clone, Copy)]
struct Entry {
    description: &'static str,
    factory: StrategyFactory,
}

/// Strategies available to the generator
///
/// Built once at start-up and passed to the orchestrator by reference.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    entries: BTreeMap<&'static str, Entry>,
}

impl StrategyRegistry {
    /// Registry without any strategies
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in strategy
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_strategy(|| Box::new(CenterOut));
        registry.register_strategy(|| Box::new(DirectionFirst));
        registry.register_strategy(|| Box::new(ClearableFirst));
        registry
    }

    /// Add or replace a strategy under an explicit name and description
    pub fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        factory: StrategyFactory,
    ) {
        self.entries.insert(name, Entry { description, factory });
    }

    /// Add or replace a strategy under the name and description it reports
    pub fn register_strategy(&mut self, factory: StrategyFactory) {
        let strategy = factory();
        self.register(strategy.name(), strategy.description(), factory);
    }

    /// Fresh instance of the strategy registered under `name`
    ///
    /// # Errors
    ///
    /// Returns `UnknownStrategy` listing the registered names
    pub fn get(&self, name: &str) -> Result<Box<dyn PlacementStrategy>> {
        self.entries
            .get(name)
            .map(|entry| (entry.factory)())
            .ok_or_else(|| GenerationError::UnknownStrategy {
                name: name.to_string(),
                available: self.names().iter().map(ToString::to_string).collect(),
            })
    }

    /// Whether a strategy is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// Name and description pairs in name order
    pub fn list(&self) -> Vec<(&'static str, &'static str)> {
        self.entries
            .iter()
            .map(|(&name, entry)| (name, entry.description))
            .collect()
    }

    /// Number of registered strategies
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no strategy is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
