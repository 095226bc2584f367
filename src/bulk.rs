//! Per-item results for batch create, update and delete.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::filter::{Filter, Update, UpdatePreview};
use crate::service::TaskService;
use crate::store::TaskStore;
use crate::task::{parse_priority, Status, Task, TaskType, PRIORITY_UNSET};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkItem {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl BulkItem {
    pub fn for_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkResult {
    pub total: usize,
    pub succeeded: Vec<BulkItem>,
    pub failed: Vec<BulkItem>,
}

impl BulkResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn succeed(&mut self, item: BulkItem) {
        self.succeeded.push(item);
    }

    pub fn fail(&mut self, mut item: BulkItem, err: &Error) {
        tracing::warn!(id = %item.id, error = %err, "batch item failed");
        item.error = Some(err.to_string());
        self.failed.push(item);
    }

    /// An empty batch or one with at least one success.
    pub fn is_success(&self) -> bool {
        self.total == 0 || !self.succeeded.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.succeeded.iter().map(|item| item.warnings.len()).sum()
    }

    /// Joined failure messages, used when the whole batch failed.
    pub fn failure_summary(&self) -> String {
        self.failed
            .iter()
            .map(|item| match &item.error {
                Some(error) => format!("{}: {}", item.id, error),
                None => item.id.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// What a dry-run delete would remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletePreview {
    pub id: String,
    pub title: String,
    pub status: Status,
    #[serde(rename = "type")]
    pub task_type: TaskType,
}

impl From<&Task> for DeletePreview {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            status: task.status,
            task_type: task.task_type,
        }
    }
}

/// One entry of a bulk create payload. Missing fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub priority: u8,
    pub labels: Vec<String>,
    #[serde(alias = "url")]
    pub link: String,
}

impl TaskDraft {
    /// Decode one payload entry. Wrongly typed fields fail this entry only.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|err| Error::InvalidArgument(format!("invalid task: {err}")))
    }

    pub fn into_task(self, id: String, default_type: TaskType, default_priority: u8) -> Result<Task> {
        if self.title.is_empty() {
            return Err(Error::EmptyTitle);
        }
        let status = if self.status.is_empty() {
            Status::Todo
        } else {
            self.status.parse()?
        };
        let task_type = if self.task_type.is_empty() {
            default_type
        } else {
            self.task_type.parse()?
        };
        let priority = if self.priority == PRIORITY_UNSET {
            default_priority
        } else {
            parse_priority(&self.priority.to_string())?
        };
        Ok(Task::new(id, self.title)
            .with_description(self.description)
            .with_status(status)
            .with_type(task_type)
            .with_priority(priority)
            .with_link(&self.link)
            .with_labels(self.labels))
    }
}

impl<S: TaskStore> TaskService<S> {
    pub fn preview_update(&self, filter: &Filter, update: &Update) -> Result<Vec<UpdatePreview>> {
        Ok(self
            .select(filter)?
            .iter()
            .map(|task| update.preview(task))
            .collect())
    }

    /// Apply `update` to every task matching `filter`. A failed row write
    /// fails that item; label failures after a successful write are
    /// warnings.
    pub fn batch_update(&self, filter: &Filter, update: &Update) -> Result<BulkResult> {
        if update.is_empty() {
            return Err(Error::InvalidArgument("no updates specified".to_string()));
        }
        let matched = self.select(filter)?;
        let mut result = BulkResult::new(matched.len());

        for task in matched {
            let mut item = BulkItem::for_task(&task);
            if update.has_fields() {
                let mut changed = task.clone();
                update.apply_fields(&mut changed);
                if let Err(err) = self.update(&changed) {
                    result.fail(item, &err);
                    continue;
                }
            }
            for label in &update.add_labels {
                if let Err(err) = self.store().add_label(&task.id, label) {
                    item.warnings.push(format!("add label '{label}': {err}"));
                }
            }
            for label in &update.remove_labels {
                if let Err(err) = self.store().remove_label(&task.id, label) {
                    item.warnings.push(format!("remove label '{label}': {err}"));
                }
            }
            result.succeed(item);
        }
        tracing::info!(
            total = result.total,
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            "batch update finished"
        );
        Ok(result)
    }

    pub fn preview_delete(&self, filter: &Filter) -> Result<Vec<DeletePreview>> {
        Ok(self
            .select(filter)?
            .iter()
            .map(DeletePreview::from)
            .collect())
    }

    /// Delete each ID independently.
    pub fn delete_many<T: AsRef<str>>(&self, ids: &[T]) -> BulkResult {
        let mut result = BulkResult::new(ids.len());
        for id in ids {
            let id = id.as_ref();
            let mut item = BulkItem {
                id: id.to_string(),
                ..BulkItem::default()
            };
            match self.get(id) {
                Ok(task) => item.title = task.title,
                Err(err) => {
                    result.fail(item, &err);
                    continue;
                }
            }
            match self.delete(id) {
                Ok(()) => result.succeed(item),
                Err(err) => result.fail(item, &err),
            }
        }
        result
    }

    pub fn delete_matching(&self, filter: &Filter) -> Result<BulkResult> {
        let ids: Vec<String> = self
            .select(filter)?
            .into_iter()
            .map(|task| task.id)
            .collect();
        Ok(self.delete_many(&ids))
    }

    /// Create each payload entry independently with a fresh ID.
    pub fn create_many(
        &self,
        entries: Vec<Value>,
        default_type: TaskType,
        default_priority: u8,
    ) -> BulkResult {
        let mut result = BulkResult::new(entries.len());
        for entry in entries {
            let title = entry
                .get("title")
                .and_then(Value::as_str)
                .filter(|title| !title.is_empty())
                .unwrap_or("(empty)")
                .to_string();
            let id = self.generate_id();
            let mut item = BulkItem {
                id: id.clone(),
                title,
                ..BulkItem::default()
            };
            let task = match TaskDraft::from_value(entry)
                .and_then(|draft| draft.into_task(id, default_type, default_priority))
            {
                Ok(task) => task,
                Err(err) => {
                    item.id.clear();
                    result.fail(item, &err);
                    continue;
                }
            };
            match self.create(&task) {
                Ok(warnings) => {
                    item.warnings = warnings;
                    result.succeed(item);
                }
                Err(err) => result.fail(item, &err),
            }
        }
        result
    }
}
