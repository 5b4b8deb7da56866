//! Per-user script storage on the local filesystem.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub const SCRIPT_EXTENSION: &str = "sieve";
const ACTIVE_FILE: &str = ".active";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptInfo {
    pub name: String,
    pub active: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No such script: {0}")]
    NotFound(String),
    #[error("Invalid name: '{0}'")]
    InvalidName(String),
    #[error("Script '{0}' is active")]
    Active(String),
    #[error("Script '{0}' already exists")]
    Exists(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage of named scripts, one active script per user.
pub trait ScriptRepository {
    fn put_script(&self, user: &str, name: &str, content: &str) -> StoreResult<()>;
    fn get_script(&self, user: &str, name: &str) -> StoreResult<String>;
    fn list_scripts(&self, user: &str) -> StoreResult<Vec<ScriptInfo>>;
    fn set_active(&self, user: &str, name: &str) -> StoreResult<()>;
    /// Name of the active script, if any.
    fn active_script(&self, user: &str) -> StoreResult<Option<String>>;
    /// Refuses to delete the active script.
    fn delete_script(&self, user: &str, name: &str) -> StoreResult<()>;
    fn rename_script(&self, user: &str, from: &str, to: &str) -> StoreResult<()>;
}

/// Layout: `<root>/<user>/<name>.sieve`, active name in `<root>/<user>/.active`.
#[derive(Debug, Clone)]
pub struct FileRepository {
    root: PathBuf,
}

fn validate_name(name: &str) -> StoreResult<()> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0']);
    if invalid {
        Err(StoreError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

impl FileRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, user: &str) -> StoreResult<PathBuf> {
        validate_name(user)?;
        Ok(self.root.join(user))
    }

    fn script_path(&self, user: &str, name: &str) -> StoreResult<PathBuf> {
        validate_name(name)?;
        Ok(self
            .user_dir(user)?
            .join(format!("{name}.{SCRIPT_EXTENSION}")))
    }

    fn existing_script_path(&self, user: &str, name: &str) -> StoreResult<PathBuf> {
        let path = self.script_path(user, name)?;
        if path.is_file() {
            Ok(path)
        } else {
            Err(StoreError::NotFound(name.to_string()))
        }
    }

    fn write_active(&self, user: &str, name: &str) -> StoreResult<()> {
        fs::write(self.user_dir(user)?.join(ACTIVE_FILE), name)?;
        Ok(())
    }
}

impl ScriptRepository for FileRepository {
    fn put_script(&self, user: &str, name: &str, content: &str) -> StoreResult<()> {
        let path = self.script_path(user, name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        tracing::info!(user, name, "script stored");
        Ok(())
    }

    fn get_script(&self, user: &str, name: &str) -> StoreResult<String> {
        let path = self.existing_script_path(user, name)?;
        Ok(fs::read_to_string(path)?)
    }

    fn list_scripts(&self, user: &str) -> StoreResult<Vec<ScriptInfo>> {
        let dir = self.user_dir(user)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let active = self.active_script(user)?;

        let mut scripts = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SCRIPT_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            scripts.push(ScriptInfo {
                name: name.to_string(),
                active: active.as_deref() == Some(name),
            });
        }
        scripts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(scripts)
    }

    fn set_active(&self, user: &str, name: &str) -> StoreResult<()> {
        self.existing_script_path(user, name)?;
        self.write_active(user, name)?;
        tracing::info!(user, name, "script activated");
        Ok(())
    }

    fn active_script(&self, user: &str) -> StoreResult<Option<String>> {
        let path = self.user_dir(user)?.join(ACTIVE_FILE);
        let name = match fs::read_to_string(&path) {
            Ok(name) => name.trim().to_string(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if name.is_empty() || self.existing_script_path(user, &name).is_err() {
            tracing::warn!(user, name = %name, "active marker points at a missing script");
            return Ok(None);
        }
        Ok(Some(name))
    }

    fn delete_script(&self, user: &str, name: &str) -> StoreResult<()> {
        let path = self.existing_script_path(user, name)?;
        if self.active_script(user)?.as_deref() == Some(name) {
            return Err(StoreError::Active(name.to_string()));
        }
        fs::remove_file(path)?;
        tracing::info!(user, name, "script deleted");
        Ok(())
    }

    fn rename_script(&self, user: &str, from: &str, to: &str) -> StoreResult<()> {
        let source = self.existing_script_path(user, from)?;
        let target = self.script_path(user, to)?;
        if target.exists() {
            return Err(StoreError::Exists(to.to_string()));
        }
        let was_active = self.active_script(user)?.as_deref() == Some(from);
        fs::rename(source, target)?;
        if was_active {
            self.write_active(user, to)?;
        }
        tracing::info!(user, from, to, "script renamed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempRoot(PathBuf);

    impl TempRoot {
        fn new(tag: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "sieve-store-{tag}-{}",
                std::process::id()
            ));
            let _ = fs::remove_dir_all(&path);
            Self(path)
        }

        fn repo(&self) -> FileRepository {
            FileRepository::new(&self.0)
        }
    }

    impl Drop for TempRoot {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_put_get_list() {
        let root = TempRoot::new("put");
        let repo = root.repo();
        repo.put_script("alice", "main", "keep;").unwrap();
        repo.put_script("alice", "spam", "discard;").unwrap();

        assert_eq!(repo.get_script("alice", "main").unwrap(), "keep;");
        assert_eq!(
            repo.list_scripts("alice").unwrap(),
            [
                ScriptInfo { name: "main".into(), active: false },
                ScriptInfo { name: "spam".into(), active: false },
            ]
        );
        assert!(root.0.join("alice").join("main.sieve").is_file());
        assert!(repo.list_scripts("bob").unwrap().is_empty());
    }

    #[test]
    fn test_missing_script() {
        let root = TempRoot::new("missing");
        let repo = root.repo();
        assert!(matches!(
            repo.get_script("alice", "nope"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.set_active("alice", "nope"),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(repo.active_script("alice").unwrap(), None);
    }

    #[test]
    fn test_active_script() {
        let root = TempRoot::new("active");
        let repo = root.repo();
        repo.put_script("alice", "main", "keep;").unwrap();
        repo.put_script("alice", "old", "keep;").unwrap();
        repo.set_active("alice", "main").unwrap();

        assert_eq!(repo.active_script("alice").unwrap().as_deref(), Some("main"));
        let listed = repo.list_scripts("alice").unwrap();
        assert!(listed.iter().any(|s| s.name == "main" && s.active));
        assert!(listed.iter().any(|s| s.name == "old" && !s.active));
    }

    #[test]
    fn test_delete_refuses_active() {
        let root = TempRoot::new("delete");
        let repo = root.repo();
        repo.put_script("alice", "main", "keep;").unwrap();
        repo.put_script("alice", "old", "keep;").unwrap();
        repo.set_active("alice", "main").unwrap();

        assert!(matches!(
            repo.delete_script("alice", "main"),
            Err(StoreError::Active(_))
        ));
        repo.delete_script("alice", "old").unwrap();
        assert_eq!(repo.list_scripts("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_rename_keeps_active_marker() {
        let root = TempRoot::new("rename");
        let repo = root.repo();
        repo.put_script("alice", "main", "keep;").unwrap();
        repo.put_script("alice", "other", "keep;").unwrap();
        repo.set_active("alice", "main").unwrap();

        assert!(matches!(
            repo.rename_script("alice", "main", "other"),
            Err(StoreError::Exists(_))
        ));
        repo.rename_script("alice", "main", "filters").unwrap();
        assert_eq!(
            repo.active_script("alice").unwrap().as_deref(),
            Some("filters")
        );
        assert!(matches!(
            repo.get_script("alice", "main"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_names() {
        let root = TempRoot::new("names");
        let repo = root.repo();
        for name in ["", "../etc", "a/b", "a\\b", ".active"] {
            assert!(
                matches!(
                    repo.put_script("alice", name, "keep;"),
                    Err(StoreError::InvalidName(_))
                ),
                "{name:?}"
            );
        }
        assert!(matches!(
            repo.list_scripts("../alice"),
            Err(StoreError::InvalidName(_))
        ));
    }
}
