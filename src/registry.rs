//! Name → rule lookup used by the engine and the fix pipeline.

use crate::rule::Rule;
use crate::rules;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("rule {0} is already registered")]
    Duplicate(&'static str),
}

/// Immutable after construction; rules are owned by the registry.
pub struct RuleRegistry {
    rules: IndexMap<&'static str, Box<dyn Rule>>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtin_rules()
    }
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: IndexMap::new() }
    }

    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        for rule in rules::all_rules() {
            let name = rule.name();
            if registry.register(rule).is_err() {
                log::warn!("Skipping duplicate built-in rule {name}");
            }
        }
        registry
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), RegistryError> {
        let name = rule.name();
        if self.rules.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.rules.insert(name, rule);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.rules.get(name).map(|r| r.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
