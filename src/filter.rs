//! `key=value` filter and update expressions.
//!
//! Filters select tasks (`status`, `type`, `priority`, repeatable `label`);
//! updates mutate them (`status`, `type`, `priority` via `--set`, labels via
//! separate add/remove lists). Merging rejects a scalar field set twice in
//! both grammars.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{parse_priority, Status, Task, TaskType};

const FILTER_KEYS: &str = "status, type, priority, label";
const UPDATE_KEYS: &str = "status, type, priority";

fn split_assignment<'a>(kind: &'static str, token: &'a str) -> Result<(&'a str, &'a str)> {
    let format_error = || Error::ExpressionFormat {
        kind,
        token: token.to_string(),
    };
    let (key, value) = token.split_once('=').ok_or_else(format_error)?;
    if value.contains('=') {
        return Err(format_error());
    }
    let key = key.trim();
    if key.is_empty() {
        return Err(format_error());
    }
    Ok((key, value.trim()))
}

fn set_once<T>(slot: &mut Option<T>, value: Option<T>, field: &'static str) -> Result<()> {
    if let Some(value) = value {
        if slot.is_some() {
            return Err(Error::DuplicateField(field));
        }
        *slot = Some(value);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub status: Option<Status>,
    pub task_type: Option<TaskType>,
    pub priority: Option<u8>,
    pub labels: Vec<String>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.task_type.is_none()
            && self.priority.is_none()
            && self.labels.is_empty()
    }

    /// All set scalars must equal the task's value and every label must be
    /// present. The empty filter matches every task.
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|status| status != task.status) {
            return false;
        }
        if self.task_type.is_some_and(|kind| kind != task.task_type) {
            return false;
        }
        if self.priority.is_some_and(|priority| priority != task.priority) {
            return false;
        }
        self.labels.iter().all(|label| task.has_label(label))
    }
}

pub fn parse_filter(token: &str) -> Result<Filter> {
    let (key, value) = split_assignment("filter", token)?;
    let mut filter = Filter::default();
    match key {
        "status" => filter.status = Some(value.parse()?),
        "type" => filter.task_type = Some(value.parse()?),
        "priority" => filter.priority = Some(parse_priority(value)?),
        "label" => {
            if value.is_empty() {
                return Err(Error::InvalidValue {
                    key: "label",
                    value: String::new(),
                    reason: "label cannot be empty".to_string(),
                });
            }
            filter.labels.push(value.to_string());
        }
        other => {
            return Err(Error::UnknownKey {
                kind: "filter",
                key: other.to_string(),
                valid: FILTER_KEYS,
            })
        }
    }
    Ok(filter)
}

pub fn merge_filters<I>(filters: I) -> Result<Filter>
where
    I: IntoIterator<Item = Filter>,
{
    let mut merged = Filter::default();
    for filter in filters {
        set_once(&mut merged.status, filter.status, "status")?;
        set_once(&mut merged.task_type, filter.task_type, "type")?;
        set_once(&mut merged.priority, filter.priority, "priority")?;
        merged.labels.extend(filter.labels);
    }
    Ok(merged)
}

/// Parse and merge a list of filter tokens. Nothing is returned unless every
/// token parses.
pub fn parse_filters<S: AsRef<str>>(tokens: &[S]) -> Result<Filter> {
    let parsed = tokens
        .iter()
        .map(|token| parse_filter(token.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    merge_filters(parsed)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    pub status: Option<Status>,
    pub task_type: Option<TaskType>,
    pub priority: Option<u8>,
    pub add_labels: Vec<String>,
    pub remove_labels: Vec<String>,
}

impl Update {
    pub fn is_empty(&self) -> bool {
        !self.has_fields() && self.add_labels.is_empty() && self.remove_labels.is_empty()
    }

    pub fn has_fields(&self) -> bool {
        self.status.is_some() || self.task_type.is_some() || self.priority.is_some()
    }

    /// Apply scalar overrides. Labels are persisted separately.
    pub fn apply_fields(&self, task: &mut Task) {
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(kind) = self.task_type {
            task.task_type = kind;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }

    pub fn preview(&self, task: &Task) -> UpdatePreview {
        UpdatePreview {
            id: task.id.clone(),
            title: task.title.clone(),
            status: self
                .status
                .map(|status| format!("{} -> {}", task.status, status)),
            task_type: self
                .task_type
                .map(|kind| format!("{} -> {}", task.task_type, kind)),
            priority: self
                .priority
                .map(|priority| format!("{} -> {}", task.priority, priority)),
            add_labels: self.add_labels.clone(),
            remove_labels: self.remove_labels.clone(),
        }
    }
}

/// Field transitions a dry run would perform on one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePreview {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_labels: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_labels: Vec<String>,
}

pub fn parse_update(token: &str) -> Result<Update> {
    let (key, value) = split_assignment("set", token)?;
    let mut update = Update::default();
    match key {
        "status" => update.status = Some(value.parse()?),
        "type" => update.task_type = Some(value.parse()?),
        "priority" => update.priority = Some(parse_priority(value)?),
        other => {
            return Err(Error::UnknownKey {
                kind: "set",
                key: other.to_string(),
                valid: UPDATE_KEYS,
            })
        }
    }
    Ok(update)
}

pub fn merge_updates<I>(updates: I) -> Result<Update>
where
    I: IntoIterator<Item = Update>,
{
    let mut merged = Update::default();
    for update in updates {
        set_once(&mut merged.status, update.status, "status")?;
        set_once(&mut merged.task_type, update.task_type, "type")?;
        set_once(&mut merged.priority, update.priority, "priority")?;
        merged.add_labels.extend(update.add_labels);
        merged.remove_labels.extend(update.remove_labels);
    }
    Ok(merged)
}

pub fn parse_updates<S: AsRef<str>>(tokens: &[S]) -> Result<Update> {
    let parsed = tokens
        .iter()
        .map(|token| parse_update(token.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    merge_updates(parsed)
}
