//! Pace directory resolution
//!
//! State lives in a single directory, resolved in order:
//! 1. an explicit path (`--pace-dir` or `PACE_DIR`)
//! 2. the nearest `.pace/` found walking up from the working directory
//! 3. the global `<config dir>/pace`
//!
//! # Directory Structure
//!
//! ```text
//! .pace/
//!   tasks.db       # SQLite store: tasks, dependencies, labels, config
//!   config.toml    # Optional file configuration
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Serialize;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::sqlite::SqliteStore;

/// Name of the project-local directory
pub const PROJECT_DIR: &str = ".pace";

/// Name of the global directory under the platform config dir
pub const GLOBAL_DIR: &str = "pace";

pub const DB_FILE: &str = "tasks.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Explicit,
    Project,
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    root: PathBuf,
    scope: Scope,
}

impl Storage {
    pub fn new(root: PathBuf, scope: Scope) -> Self {
        Self { root, scope }
    }

    /// Resolve the pace directory for this process.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path.to_path_buf(), Scope::Explicit));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = Self::find_project(&cwd) {
            return Ok(Self::new(found, Scope::Project));
        }
        Self::global()
    }

    /// Walk upward from `start` looking for a `.pace/` directory.
    pub fn find_project(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_DIR))
            .find(|candidate| candidate.is_dir())
    }

    pub fn global() -> Result<Self> {
        let base = BaseDirs::new()
            .ok_or_else(|| Error::PaceDirUnavailable(PathBuf::from("~/.config/pace")))?;
        Ok(Self::new(base.config_dir().join(GLOBAL_DIR), Scope::Global))
    }

    /// Project storage rooted at `dir/.pace`.
    pub fn project(dir: &Path) -> Self {
        Self::new(dir.join(PROJECT_DIR), Scope::Project)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(DB_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn is_initialized(&self) -> bool {
        self.db_path().exists()
    }

    /// Create the directory if needed.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .map_err(|_| Error::PaceDirUnavailable(self.root.clone()))
    }

    pub fn open_store(&self) -> Result<SqliteStore> {
        self.ensure()?;
        SqliteStore::open(self.db_path())
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load_from_dir(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_project_walks_upward() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).expect("pace dir");
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).expect("nested");

        let found = Storage::find_project(&nested).expect("found");
        assert_eq!(found, dir.path().join(PROJECT_DIR));
    }

    #[test]
    fn find_project_ignores_plain_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(PROJECT_DIR), "not a dir").expect("file");
        let found = Storage::find_project(dir.path());
        assert_ne!(found, Some(dir.path().join(PROJECT_DIR)));
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::resolve(Some(dir.path())).expect("resolve");
        assert_eq!(storage.scope(), Scope::Explicit);
        assert_eq!(storage.db_path(), dir.path().join(DB_FILE));
    }

    #[test]
    fn open_store_creates_directory_and_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = Storage::project(dir.path());
        assert!(!storage.is_initialized());
        storage.open_store().expect("open");
        assert!(storage.is_initialized());
        assert_eq!(storage.root(), dir.path().join(PROJECT_DIR));
    }
}
