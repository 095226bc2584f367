//! Persistence contract for tasks, dependency edges, labels and config.
//!
//! Every read-path caller treats a store miss as [`Error::TaskNotFound`] or
//! [`Error::ConfigNotFound`]; callers use [`Error::is_not_found`] to branch.
//!
//! [`Error::TaskNotFound`]: crate::error::Error::TaskNotFound
//! [`Error::ConfigNotFound`]: crate::error::Error::ConfigNotFound
//! [`Error::is_not_found`]: crate::error::Error::is_not_found

use std::collections::HashMap;

use crate::error::Result;

/// Flat task row as persisted. Status, type and priority stay in their
/// stored integer form until hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: i64,
    pub task_type: i64,
    pub priority: i64,
    pub link: String,
}

/// Adjacency maps for the whole store. `blocked_by[x]` lists the blockers
/// of `x`; `blocks[x]` lists the tasks `x` blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyMaps {
    pub blocked_by: HashMap<String, Vec<String>>,
    pub blocks: HashMap<String, Vec<String>>,
}

impl DependencyMaps {
    pub fn insert(&mut self, blocker: &str, blocked: &str) {
        self.blocked_by
            .entry(blocked.to_string())
            .or_default()
            .push(blocker.to_string());
        self.blocks
            .entry(blocker.to_string())
            .or_default()
            .push(blocked.to_string());
    }
}

pub trait TaskStore {
    fn create_task(&self, row: &TaskRow) -> Result<()>;
    fn get_task(&self, id: &str) -> Result<TaskRow>;
    fn all_tasks(&self) -> Result<Vec<TaskRow>>;
    fn update_task(&self, row: &TaskRow) -> Result<()>;
    fn delete_task(&self, id: &str) -> Result<()>;

    /// Record that `blocker` blocks `blocked`. Re-adding an edge is a no-op.
    fn add_dependency(&self, blocker: &str, blocked: &str) -> Result<()>;
    fn remove_dependency(&self, blocker: &str, blocked: &str) -> Result<()>;
    /// Drop every edge touching `id` in either direction.
    fn remove_all_dependencies(&self, id: &str) -> Result<()>;
    fn blockers(&self, id: &str) -> Result<Vec<String>>;
    fn blocking(&self, id: &str) -> Result<Vec<String>>;
    fn all_dependencies(&self) -> Result<DependencyMaps>;

    fn add_label(&self, id: &str, label: &str) -> Result<()>;
    fn remove_label(&self, id: &str, label: &str) -> Result<()>;
    fn remove_all_labels(&self, id: &str) -> Result<()>;
    fn labels(&self, id: &str) -> Result<Vec<String>>;
    fn all_labels(&self) -> Result<HashMap<String, Vec<String>>>;

    fn get_config(&self, key: &str) -> Result<String>;
    fn set_config(&self, key: &str, value: &str) -> Result<()>;
    fn unset_config(&self, key: &str) -> Result<()>;
    fn all_config(&self) -> Result<Vec<(String, String)>>;
}
