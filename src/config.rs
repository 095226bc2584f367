//! Configuration loading and management
//!
//! Handles parsing of `config.toml` inside the resolved pace directory.
//! Persisted scalar settings such as `id_prefix` live in the store instead.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::graph::Direction;
use crate::task::{parse_priority, TaskType};

pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for newly created tasks
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Dependency tree rendering
    #[serde(default)]
    pub tree: TreeConfig,

    /// Kanban board behaviour
    #[serde(default)]
    pub board: BoardConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksConfig {
    #[serde(default = "default_priority")]
    pub default_priority: u8,

    #[serde(default = "default_type")]
    pub default_type: String,
}

fn default_priority() -> u8 {
    3
}

fn default_type() -> String {
    "task".to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
            default_type: default_type(),
        }
    }
}

impl TasksConfig {
    pub fn task_type(&self) -> Result<TaskType> {
        self.default_type.parse().map_err(|_| {
            Error::InvalidConfig(format!(
                "tasks.default_type: unknown type '{}'",
                self.default_type
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_max_depth() -> usize {
    crate::graph::DEFAULT_MAX_DEPTH
}

fn default_direction() -> String {
    "up".to_string()
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            direction: default_direction(),
        }
    }
}

impl TreeConfig {
    pub fn direction(&self) -> Result<Direction> {
        self.direction.parse().map_err(|_| {
            Error::InvalidConfig(format!(
                "tree.direction: invalid direction '{}' (expected up|down|both)",
                self.direction
            ))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Program used to open task links; the platform opener when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_command: Option<String>,
}

impl Config {
    /// Load configuration from a `config.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from the pace directory, or return defaults when
    /// the file does not exist.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|err| Error::OperationFailed(format!("serialize config: {err}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        parse_priority(&self.tasks.default_priority.to_string()).map_err(|_| {
            Error::InvalidConfig(format!(
                "tasks.default_priority must be 1-4, got {}",
                self.tasks.default_priority
            ))
        })?;
        self.tasks.task_type()?;
        self.tree.direction()?;
        if self.tree.max_depth == 0 {
            return Err(Error::InvalidConfig(
                "tree.max_depth must be >= 1".to_string(),
            ));
        }
        if let Some(command) = &self.board.open_command {
            if command.trim().is_empty() {
                return Err(Error::InvalidConfig(
                    "board.open_command cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
