//! Name → behavior registries, built once and shared read-only.

use std::collections::BTreeMap;

use crate::comparator::ComparatorManager;
use crate::engine::command::CommandKind;
use crate::engine::test::TestKind;
use crate::error::{Result, SieveError};

/// Prefix marking comparator names in `require`.
pub const COMPARATOR_PREFIX: &str = "comparator-";

#[derive(Debug, Clone)]
pub struct CommandManager {
    commands: BTreeMap<String, CommandKind>,
}

impl CommandManager {
    pub fn empty() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, kind: CommandKind) {
        self.commands.insert(name.into(), kind);
    }

    pub fn get(&self, name: &str) -> Result<CommandKind> {
        self.commands
            .get(name)
            .copied()
            .ok_or_else(|| SieveError::feature(format!("unknown command '{name}'")))
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        let mut manager = Self::empty();
        for kind in CommandKind::ALL {
            manager.register(kind.name(), kind);
        }
        manager
    }
}

#[derive(Debug, Clone)]
pub struct TestManager {
    tests: BTreeMap<String, TestKind>,
}

impl TestManager {
    pub fn empty() -> Self {
        Self {
            tests: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, kind: TestKind) {
        self.tests.insert(name.into(), kind);
    }

    pub fn get(&self, name: &str) -> Result<TestKind> {
        self.tests
            .get(name)
            .copied()
            .ok_or_else(|| SieveError::feature(format!("unknown test '{name}'")))
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.tests.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tests.keys().map(String::as_str)
    }
}

impl Default for TestManager {
    fn default() -> Self {
        let mut manager = Self::empty();
        for kind in TestKind::ALL {
            manager.register(kind.name(), kind);
        }
        manager
    }
}

/// The three registries an interpreter evaluates against.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub commands: CommandManager,
    pub tests: TestManager,
    pub comparators: ComparatorManager,
}

impl Registry {
    /// Checks a `require` capability name against the registries.
    pub fn check_feature(&self, feature: &str) -> Result<()> {
        let supported = match feature.strip_prefix(COMPARATOR_PREFIX) {
            Some(comparator) => self.comparators.is_supported(comparator),
            None => self.commands.is_supported(feature) || self.tests.is_supported(feature),
        };
        if supported {
            Ok(())
        } else {
            Err(SieveError::feature(format!("unsupported feature '{feature}'")))
        }
    }

    /// Capability names advertised to script authors.
    pub fn capabilities(&self) -> Vec<String> {
        let mut caps: Vec<String> = self
            .commands
            .names()
            .chain(self.tests.names())
            .map(str::to_string)
            .collect();
        caps.extend(
            self.comparators
                .names()
                .map(|c| format!("{COMPARATOR_PREFIX}{c}")),
        );
        caps.sort();
        caps.dedup();
        caps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_feature() {
        let registry = Registry::default();
        assert!(registry.check_feature("fileinto").is_ok());
        assert!(registry.check_feature("envelope").is_ok());
        assert!(registry.check_feature("comparator-i;ascii-numeric").is_ok());
        assert!(matches!(
            registry.check_feature("comparator-i;unicode-casemap"),
            Err(SieveError::Feature(_))
        ));
        assert!(matches!(
            registry.check_feature("imap4flags"),
            Err(SieveError::Feature(_))
        ));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let registry = Registry::default();
        assert!(registry.commands.get("keep").is_ok());
        assert!(registry.commands.get("KEEP").is_err());
    }

    #[test]
    fn test_capabilities_include_comparators() {
        let caps = Registry::default().capabilities();
        assert!(caps.contains(&"comparator-i;octet".to_string()));
        assert!(caps.contains(&"vacation".to_string()));
    }
}
