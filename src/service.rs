//! Task service: validation, ID generation and hydration on top of a
//! [`TaskStore`].

use std::path::Path;

use crate::error::Result;
use crate::filter::Filter;
use crate::graph;
use crate::sqlite::SqliteStore;
use crate::store::TaskStore;
use crate::task::Task;

pub const CONFIG_KEY_PREFIX: &str = "id_prefix";
pub const DEFAULT_PREFIX: &str = "task";
const ID_HEX_LEN: usize = 3;

/// Derive an ID prefix from a directory name.
pub fn detect_prefix(dir: &Path) -> String {
    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
        .replace([' ', '_'], "-");
    if name.is_empty() || name == "." || name == "/" {
        return DEFAULT_PREFIX.to_string();
    }
    name
}

/// `<prefix>-<3 hex>`. Collisions surface as `DuplicateId` from the store
/// and are not retried.
pub fn generate_id(prefix: &str) -> String {
    let hex = format!("{:04x}", rand::random::<u16>());
    format!("{prefix}-{}", &hex[..ID_HEX_LEN])
}

pub struct TaskService<S = SqliteStore> {
    store: S,
    prefix: String,
}

impl<S: TaskStore> TaskService<S> {
    /// Resolve the ID prefix from config, persisting a detected default on
    /// first use.
    pub fn new(store: S) -> Result<Self> {
        let prefix = match store.get_config(CONFIG_KEY_PREFIX) {
            Ok(prefix) if !prefix.is_empty() => prefix,
            Ok(_) => Self::init_prefix(&store)?,
            Err(err) if err.is_not_found() => Self::init_prefix(&store)?,
            Err(err) => return Err(err),
        };
        tracing::debug!(prefix = %prefix, "task service ready");
        Ok(Self { store, prefix })
    }

    fn init_prefix(store: &S) -> Result<String> {
        let prefix = std::env::current_dir()
            .map(|cwd| detect_prefix(&cwd))
            .unwrap_or_else(|_| DEFAULT_PREFIX.to_string());
        store.set_config(CONFIG_KEY_PREFIX, &prefix)?;
        Ok(prefix)
    }

    /// Use a fixed prefix without touching config.
    pub fn with_prefix(store: S, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn generate_id(&self) -> String {
        generate_id(&self.prefix)
    }

    /// Validate and persist a new task, attaching its labels one by one.
    /// Label failures come back as warnings; the task row is kept.
    pub fn create(&self, task: &Task) -> Result<Vec<String>> {
        task.validate()?;
        self.store.create_task(&task.to_row())?;
        tracing::info!(id = %task.id, "task created");

        let mut warnings = Vec::new();
        for label in task.labels() {
            if let Err(err) = self.store.add_label(&task.id, label) {
                warnings.push(format!("add label '{label}': {err}"));
            }
        }
        Ok(warnings)
    }

    /// Replace the stored scalar fields. Labels and edges are untouched.
    pub fn update(&self, task: &Task) -> Result<()> {
        task.validate()?;
        self.store.update_task(&task.to_row())?;
        tracing::info!(id = %task.id, status = %task.status, "task updated");
        Ok(())
    }

    /// Remove every edge and label of the task, then the row itself.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.get_task(id)?;
        self.store.remove_all_dependencies(id)?;
        self.store.remove_all_labels(id)?;
        self.store.delete_task(id)?;
        tracing::info!(id = %id, "task deleted");
        Ok(())
    }

    /// Both tasks must exist. Cycles and self-loops are accepted.
    pub fn add_dependency(&self, blocker: &str, blocked: &str) -> Result<()> {
        self.store.get_task(blocker)?;
        self.store.get_task(blocked)?;
        self.store.add_dependency(blocker, blocked)?;
        tracing::info!(blocker = %blocker, blocked = %blocked, "dependency added");
        Ok(())
    }

    pub fn remove_dependency(&self, blocker: &str, blocked: &str) -> Result<()> {
        self.store.remove_dependency(blocker, blocked)
    }

    pub fn add_label(&self, id: &str, label: &str) -> Result<()> {
        self.store.get_task(id)?;
        self.store.add_label(id, label)
    }

    pub fn remove_label(&self, id: &str, label: &str) -> Result<()> {
        self.store.remove_label(id, label)
    }

    /// Every task, hydrated with edges and labels, in store order.
    pub fn load_all(&self) -> Result<Vec<Task>> {
        let rows = self.store.all_tasks()?;
        let mut deps = self.store.all_dependencies()?;
        let mut labels = self.store.all_labels()?;

        rows.into_iter()
            .map(|row| {
                let mut task = Task::from_row(row)?;
                task.set_blocked_by(deps.blocked_by.remove(&task.id).unwrap_or_default());
                task.set_blocks(deps.blocks.remove(&task.id).unwrap_or_default());
                task.set_labels(labels.remove(&task.id).unwrap_or_default());
                Ok(task)
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<Task> {
        let mut task = Task::from_row(self.store.get_task(id)?)?;
        task.set_blocked_by(self.store.blockers(id)?);
        task.set_blocks(self.store.blocking(id)?);
        task.set_labels(self.store.labels(id)?);
        Ok(task)
    }

    pub fn ready_tasks(&self) -> Result<Vec<Task>> {
        let tasks = self.load_all()?;
        let ready = graph::ready_tasks(&tasks)
            .into_iter()
            .cloned()
            .collect();
        Ok(ready)
    }

    pub fn select(&self, filter: &Filter) -> Result<Vec<Task>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect())
    }

    /// Case-insensitive substring match on title and description.
    pub fn search(&self, query: &str) -> Result<Vec<Task>> {
        let needle = query.to_lowercase();
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|task| {
                task.title.to_lowercase().contains(&needle)
                    || task.description.to_lowercase().contains(&needle)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::path::PathBuf;

    fn service() -> TaskService<SqliteStore> {
        TaskService::with_prefix(SqliteStore::open_in_memory().expect("open"), "pace")
    }

    #[test]
    fn detect_prefix_sanitizes_directory_names() {
        assert_eq!(detect_prefix(&PathBuf::from("/home/me/My Project_x")), "my-project-x");
        assert_eq!(detect_prefix(&PathBuf::from("/")), DEFAULT_PREFIX);
    }

    #[test]
    fn generated_ids_use_prefix_and_three_hex_chars() {
        let id = generate_id("pace");
        let (prefix, hex) = id.split_once('-').expect("separator");
        assert_eq!(prefix, "pace");
        assert_eq!(hex.len(), 3);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn new_persists_prefix_once() {
        let store = SqliteStore::open_in_memory().expect("open");
        store.set_config(CONFIG_KEY_PREFIX, "proj").expect("seed");
        let svc = TaskService::new(store).expect("service");
        assert_eq!(svc.prefix(), "proj");
        assert!(svc.generate_id().starts_with("proj-"));
    }

    #[test]
    fn new_initializes_missing_prefix() {
        let svc = TaskService::new(SqliteStore::open_in_memory().expect("open")).expect("service");
        let stored = svc.store().get_config(CONFIG_KEY_PREFIX).expect("persisted");
        assert_eq!(stored, svc.prefix());
    }

    #[test]
    fn create_rejects_invalid_task_before_writing() {
        let svc = service();
        let err = svc.create(&Task::new("pace-001", "")).expect_err("invalid");
        assert!(matches!(err, Error::EmptyTitle));
        assert!(svc.load_all().expect("load").is_empty());
    }

    #[test]
    fn create_attaches_labels_and_get_hydrates() {
        let svc = service();
        let task = Task::new("pace-001", "Write").with_labels(["docs", "q3"]);
        let warnings = svc.create(&task).expect("create");
        assert!(warnings.is_empty());

        let fetched = svc.get("pace-001").expect("get");
        assert_eq!(fetched.labels(), ["docs".to_string(), "q3".to_string()]);
    }

    #[test]
    fn add_dependency_requires_both_tasks() {
        let svc = service();
        svc.create(&Task::new("pace-001", "A")).expect("create");
        let err = svc.add_dependency("pace-001", "pace-404").expect_err("missing");
        assert!(err.is_not_found());
        svc.add_dependency("pace-001", "pace-001").expect("self loop allowed");
    }

    #[test]
    fn delete_missing_task_is_not_found() {
        let svc = service();
        assert!(svc.delete("pace-404").expect_err("missing").is_not_found());
    }

    #[test]
    fn search_matches_title_and_description() {
        let svc = service();
        svc.create(&Task::new("pace-001", "Fix Login")).expect("create");
        svc.create(&Task::new("pace-002", "Other").with_description("login page copy"))
            .expect("create");
        svc.create(&Task::new("pace-003", "Unrelated")).expect("create");
        let hits = svc.search("LOGIN").expect("search");
        assert_eq!(hits.len(), 2);
    }
}
