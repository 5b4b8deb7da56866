//! Interpreter configuration.
//!
//! A JSON file decides which names scripts may use and which built-in
//! behavior each one maps to:
//!
//! ```json
//! {
//!   "disabled": ["vacation"],
//!   "commands": { "file": "fileinto" },
//!   "tests": {},
//!   "comparators": { "i;strict": "i;octet" },
//!   "max_nested_blocks": 50,
//!   "max_nested_tests": 50
//! }
//! ```

pub mod paths;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::comparator::ComparatorManager;
use crate::engine::{CommandKind, CommandManager, Registry, TestKind, TestManager};
use crate::sieve::ParseLimits;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown built-in {kind} '{name}'")]
    UnknownBuiltin { kind: &'static str, name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Register every built-in under its standard name.
    pub builtins: bool,
    /// Standard names left out of the registries.
    pub disabled: Vec<String>,
    /// Extra script name → built-in command name.
    pub commands: BTreeMap<String, String>,
    /// Extra script name → built-in test name.
    pub tests: BTreeMap<String, String>,
    /// Extra comparator name → built-in comparator name.
    pub comparators: BTreeMap<String, String>,
    pub max_nested_blocks: usize,
    pub max_nested_tests: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            builtins: true,
            disabled: Vec::new(),
            commands: BTreeMap::new(),
            tests: BTreeMap::new(),
            comparators: BTreeMap::new(),
            max_nested_blocks: ParseLimits::DEFAULT_MAX_NESTED_BLOCKS,
            max_nested_tests: ParseLimits::DEFAULT_MAX_NESTED_TESTS,
        }
    }
}

impl InterpreterConfig {
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(data)?;
        config.build_registry()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Loads the default config file; a missing file means built-in defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let Some(path) = paths::config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no interpreter config, using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn parse_limits(&self) -> ParseLimits {
        ParseLimits::default()
            .with_max_nested_blocks(self.max_nested_blocks)
            .with_max_nested_tests(self.max_nested_tests)
    }

    fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|d| d == name)
    }

    pub fn build_registry(&self) -> Result<Registry, ConfigError> {
        let builtin_comparators = ComparatorManager::default();
        let mut commands = CommandManager::empty();
        let mut tests = TestManager::empty();
        let mut comparators = ComparatorManager::empty();

        if self.builtins {
            for kind in CommandKind::ALL {
                if !self.is_disabled(kind.name()) {
                    commands.register(kind.name(), kind);
                }
            }
            for kind in TestKind::ALL {
                if !self.is_disabled(kind.name()) {
                    tests.register(kind.name(), kind);
                }
            }
            for name in builtin_comparators.names() {
                if !self.is_disabled(name) {
                    if let Ok(comparator) = builtin_comparators.get(name) {
                        comparators.register(name, comparator);
                    }
                }
            }
        }

        for (name, builtin) in &self.commands {
            let kind = CommandKind::ALL
                .into_iter()
                .find(|k| k.name() == builtin.as_str())
                .ok_or_else(|| ConfigError::UnknownBuiltin {
                    kind: "command",
                    name: builtin.clone(),
                })?;
            commands.register(name.as_str(), kind);
        }
        for (name, builtin) in &self.tests {
            let kind = TestKind::ALL
                .into_iter()
                .find(|k| k.name() == builtin.as_str())
                .ok_or_else(|| ConfigError::UnknownBuiltin {
                    kind: "test",
                    name: builtin.clone(),
                })?;
            tests.register(name.as_str(), kind);
        }
        for (name, builtin) in &self.comparators {
            let comparator =
                builtin_comparators
                    .get(builtin)
                    .map_err(|_| ConfigError::UnknownBuiltin {
                        kind: "comparator",
                        name: builtin.clone(),
                    })?;
            comparators.register(name.as_str(), comparator);
        }

        Ok(Registry {
            commands,
            tests,
            comparators,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registers_everything() {
        let registry = InterpreterConfig::default().build_registry().unwrap();
        assert_eq!(registry.capabilities(), Registry::default().capabilities());
    }

    #[test]
    fn test_aliases_and_disabled() {
        let config = InterpreterConfig::from_json(
            r#"{
                "disabled": ["vacation", "i;octet"],
                "commands": { "file": "fileinto" },
                "comparators": { "i;strict": "i;octet" }
            }"#,
        )
        .unwrap();
        let registry = config.build_registry().unwrap();

        assert_eq!(registry.commands.get("file").unwrap(), CommandKind::FileInto);
        assert!(registry.commands.is_supported("fileinto"));
        assert!(!registry.commands.is_supported("vacation"));
        assert!(!registry.comparators.is_supported("i;octet"));
        assert!(registry.comparators.is_supported("i;strict"));
        assert!(registry.tests.is_supported("header"));
    }

    #[test]
    fn test_without_builtins() {
        let config = InterpreterConfig::from_json(
            r#"{ "builtins": false, "tests": { "hdr": "header" } }"#,
        )
        .unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.tests.names().collect::<Vec<_>>(), ["hdr"]);
        assert!(registry.commands.names().next().is_none());
    }

    #[test]
    fn test_unknown_builtin_rejected() {
        let err = InterpreterConfig::from_json(r#"{ "commands": { "x": "explode" } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownBuiltin { kind: "command", ref name } if name == "explode"
        ));
    }

    #[test]
    fn test_nesting_limits() {
        let config = InterpreterConfig::from_json(r#"{ "max_nested_tests": 3 }"#).unwrap();
        let limits = config.parse_limits();
        assert_eq!(limits.max_nested_tests, 3);
        assert_eq!(limits.max_nested_blocks, ParseLimits::DEFAULT_MAX_NESTED_BLOCKS);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            InterpreterConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("sieve-config-{}", std::process::id()));
        let path = dir.join(paths::CONFIG_FILE);
        let mut config = InterpreterConfig::default();
        config.disabled.push("reject".to_string());
        config.save(&path).unwrap();

        assert_eq!(InterpreterConfig::load(&path).unwrap(), config);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("sieve-config-does-not-exist.json");
        assert!(matches!(
            InterpreterConfig::load(&path),
            Err(ConfigError::Io(_))
        ));
    }
}
