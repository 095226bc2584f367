//! Task entity for pace.
//!
//! A task carries its own adjacency lists (`blocked_by`, `blocks`) and labels.
//! Symmetry of the blocking relation is maintained by the service against
//! the store; the entity accepts whatever lists it is given.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::store::TaskRow;

pub const PRIORITY_UNSET: u8 = 0;
pub const PRIORITY_URGENT: u8 = 1;
pub const PRIORITY_LOW: u8 = 4;
pub const DEFAULT_PRIORITY: u8 = 3;
pub const TITLE_LIMIT: usize = 50;
pub const LINK_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn index(self) -> usize {
        match self {
            Status::Todo => 0,
            Status::InProgress => 1,
            Status::Done => 2,
        }
    }

    /// Decode the stored integer form.
    pub fn from_index(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Status::Todo),
            1 => Ok(Status::InProgress),
            2 => Ok(Status::Done),
            other => Err(Error::InvalidStatus(other)),
        }
    }

    /// Cyclic successor: Done wraps to Todo.
    pub fn next(self) -> Self {
        match self {
            Status::Todo => Status::InProgress,
            Status::InProgress => Status::Done,
            Status::Done => Status::Todo,
        }
    }

    /// Cyclic predecessor: Todo wraps to Done.
    pub fn prev(self) -> Self {
        match self {
            Status::Todo => Status::Done,
            Status::InProgress => Status::Todo,
            Status::Done => Status::InProgress,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }

    pub fn column_title(self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Status::Todo),
            "in-progress" | "in_progress" | "inprogress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            _ => Err(Error::InvalidValue {
                key: "status",
                value: value.to_string(),
                reason: "valid: todo, in-progress, done".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Task,
    Bug,
    Feature,
    Chore,
    Docs,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Task,
        TaskType::Bug,
        TaskType::Feature,
        TaskType::Chore,
        TaskType::Docs,
    ];

    pub fn index(self) -> usize {
        match self {
            TaskType::Task => 0,
            TaskType::Bug => 1,
            TaskType::Feature => 2,
            TaskType::Chore => 3,
            TaskType::Docs => 4,
        }
    }

    /// Unknown stored values fall back to `Task`; the type is cosmetic.
    pub fn from_index(value: i64) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.index() as i64 == value)
            .unwrap_or_default()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Task => "task",
            TaskType::Bug => "bug",
            TaskType::Feature => "feature",
            TaskType::Chore => "chore",
            TaskType::Docs => "docs",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TaskType::Task => "T",
            TaskType::Bug => "B",
            TaskType::Feature => "F",
            TaskType::Chore => "C",
            TaskType::Docs => "D",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::InvalidValue {
                key: "type",
                value: value.to_string(),
                reason: "valid: task, bug, feature, chore, docs".to_string(),
            })
    }
}

/// Parse a priority in the settable range 1-4. Non-numeric or out-of-range
/// values are rejected, never clamped.
pub fn parse_priority(value: &str) -> Result<u8> {
    let trimmed = value.trim();
    let parsed: i64 = trimmed.parse().map_err(|_| Error::InvalidValue {
        key: "priority",
        value: trimmed.to_string(),
        reason: "not a number".to_string(),
    })?;
    if !(PRIORITY_URGENT as i64..=PRIORITY_LOW as i64).contains(&parsed) {
        return Err(Error::InvalidValue {
            key: "priority",
            value: trimmed.to_string(),
            reason: "priority must be 1-4".to_string(),
        });
    }
    Ok(parsed as u8)
}

/// Cyclic priority stepping used by the edit form (1..=4, unset starts at 1).
pub fn next_priority(priority: u8) -> u8 {
    if priority >= PRIORITY_LOW {
        PRIORITY_URGENT
    } else {
        priority + 1
    }
}

pub fn prev_priority(priority: u8) -> u8 {
    if priority <= PRIORITY_URGENT {
        PRIORITY_LOW
    } else {
        priority - 1
    }
}

pub fn priority_label(priority: u8) -> &'static str {
    match priority {
        1 => "urgent",
        2 => "high",
        3 => "normal",
        4 => "low",
        _ => "none",
    }
}

/// Trim and prefix `https://` when no scheme separator is present.
pub fn normalize_link(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.contains("://") {
        return trimmed.to_string();
    }
    format!("https://{trimmed}")
}

/// Require an absolute http(s) URL with a non-empty host.
pub fn validate_link(link: &str) -> Result<Url> {
    let invalid = || Error::InvalidLink(link.to_string());
    let parsed = Url::parse(link).map_err(|_| invalid())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid());
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(invalid()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TaskJson", try_from = "TaskJson")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub task_type: TaskType,
    pub priority: u8,
    link: String,
    labels: Vec<String>,
    blocked_by: Vec<String>,
    blocks: Vec<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: Status::Todo,
            task_type: TaskType::Task,
            priority: DEFAULT_PRIORITY,
            link: String::new(),
            labels: Vec::new(),
            blocked_by: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_link(mut self, link: &str) -> Self {
        self.set_link(link);
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_labels(labels);
        self
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    /// Stores the normalized form of `raw`.
    pub fn set_link(&mut self, raw: &str) {
        self.link = normalize_link(raw);
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn blocked_by(&self) -> &[String] {
        &self.blocked_by
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.is_empty() {
            return Err(Error::EmptyTitle);
        }
        if !self.link.is_empty() {
            validate_link(&self.link)?;
        }
        Ok(())
    }

    pub fn advance_status(&mut self) {
        self.status = self.status.next();
    }

    pub fn retreat_status(&mut self) {
        self.status = self.status.prev();
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|existing| existing == label)
    }

    /// Returns false when the label was already present.
    pub fn add_label(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.has_label(&label) {
            return false;
        }
        self.labels.push(label);
        true
    }

    /// Returns false when the label was absent.
    pub fn remove_label(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|existing| existing != label);
        before != self.labels.len()
    }

    /// Replaces the label set, keeping first occurrences in order.
    pub fn set_labels<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.clear();
        for label in labels {
            self.add_label(label);
        }
    }

    pub fn set_blocked_by(&mut self, ids: Vec<String>) {
        self.blocked_by = ids;
    }

    pub fn set_blocks(&mut self, ids: Vec<String>) {
        self.blocks = ids;
    }

    pub fn add_blocked_by(&mut self, id: impl Into<String>) {
        push_unique(&mut self.blocked_by, id.into());
    }

    pub fn add_blocks(&mut self, id: impl Into<String>) {
        push_unique(&mut self.blocks, id.into());
    }

    pub fn remove_blocked_by(&mut self, id: &str) {
        self.blocked_by.retain(|existing| existing != id);
    }

    pub fn remove_blocks(&mut self, id: &str) {
        self.blocks.retain(|existing| existing != id);
    }

    pub fn to_json(&self) -> TaskJson {
        TaskJson::from(self.clone())
    }

    pub fn to_row(&self) -> TaskRow {
        TaskRow {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.index() as i64,
            task_type: self.task_type.index() as i64,
            priority: i64::from(self.priority),
            link: self.link.clone(),
        }
    }

    /// Hydrate scalar fields from a stored row. Adjacency lists and labels
    /// are attached separately by the service.
    pub fn from_row(row: TaskRow) -> Result<Self> {
        let status = Status::from_index(row.status)?;
        let priority = u8::try_from(row.priority)
            .ok()
            .filter(|value| *value <= PRIORITY_LOW)
            .unwrap_or(PRIORITY_UNSET);
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            status,
            task_type: TaskType::from_index(row.task_type),
            priority,
            link: row.link,
            labels: Vec::new(),
            blocked_by: Vec::new(),
            blocks: Vec::new(),
        })
    }
}

fn push_unique(list: &mut Vec<String>, id: String) {
    if !list.contains(&id) {
        list.push(id);
    }
}

/// Canonical JSON shape of a task. Empty strings and collections are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub status: Status,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            task_type: task.task_type,
            priority: task.priority,
            blocked_by: task.blocked_by,
            blocks: task.blocks,
            labels: task.labels,
            link: task.link,
        }
    }
}

impl TryFrom<TaskJson> for Task {
    type Error = Error;

    fn try_from(json: TaskJson) -> Result<Self> {
        if json.priority > PRIORITY_LOW {
            return Err(Error::InvalidValue {
                key: "priority",
                value: json.priority.to_string(),
                reason: "priority must be 0-4".to_string(),
            });
        }
        let mut task = Task::new(json.id, json.title)
            .with_description(json.description)
            .with_status(json.status)
            .with_type(json.task_type)
            .with_priority(json.priority)
            .with_link(&json.link)
            .with_labels(json.labels);
        task.set_blocked_by(json.blocked_by);
        task.set_blocks(json.blocks);
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_title() {
        let task = Task::new("pace-001", "");
        assert!(matches!(task.validate(), Err(Error::EmptyTitle)));
    }

    #[test]
    fn validate_accepts_whitespace_title_and_empty_link() {
        assert!(Task::new("pace-001", " ").validate().is_ok());
        assert!(Task::new("pace-001", "Write").validate().is_ok());
    }

    #[test]
    fn validate_checks_link_scheme_and_host() {
        let ok = Task::new("a", "t").with_link("example.com/path");
        assert_eq!(ok.link(), "https://example.com/path");
        assert!(ok.validate().is_ok());

        let ftp = Task::new("a", "t").with_link("ftp://example.com");
        assert!(matches!(ftp.validate(), Err(Error::InvalidLink(_))));

        let hostless = Task::new("a", "t").with_link("https://");
        assert!(matches!(hostless.validate(), Err(Error::InvalidLink(_))));
    }

    #[test]
    fn status_from_index_rejects_out_of_range() {
        assert_eq!(Status::from_index(1).ok(), Some(Status::InProgress));
        assert!(matches!(Status::from_index(3), Err(Error::InvalidStatus(3))));
        assert!(matches!(Status::from_index(-1), Err(Error::InvalidStatus(-1))));
    }

    #[test]
    fn normalize_link_cases() {
        assert_eq!(normalize_link("   "), "");
        assert_eq!(normalize_link(" google.com "), "https://google.com");
        assert_eq!(normalize_link("http://a.b"), "http://a.b");
    }

    #[test]
    fn status_and_type_cycle() {
        assert_eq!(Status::Done.next(), Status::Todo);
        assert_eq!(Status::Todo.prev(), Status::Done);
        assert_eq!(TaskType::Docs.next(), TaskType::Task);
        assert_eq!(TaskType::Task.prev(), TaskType::Docs);
        assert_eq!(next_priority(4), 1);
        assert_eq!(prev_priority(1), 4);
        assert_eq!(next_priority(PRIORITY_UNSET), 1);

        let mut task = Task::new("a", "t").with_status(Status::Done);
        task.advance_status();
        assert_eq!(task.status, Status::Todo);
        task.retreat_status();
        assert_eq!(task.status, Status::Done);
    }

    #[test]
    fn label_mutators_are_idempotent() {
        let mut task = Task::new("a", "t");
        assert!(task.add_label("x"));
        assert!(!task.add_label("x"));
        assert!(!task.remove_label("missing"));
        assert!(task.remove_label("x"));
        assert!(!task.has_label("x"));

        task.set_labels(["b", "a", "b"]);
        assert_eq!(task.labels(), ["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn dependency_mutators_are_idempotent() {
        let mut task = Task::new("a", "t");
        task.add_blocked_by("b");
        task.add_blocked_by("b");
        task.add_blocks("c");
        assert_eq!(task.blocked_by(), ["b".to_string()]);
        task.remove_blocked_by("zzz");
        task.remove_blocks("c");
        assert!(task.blocks().is_empty());
    }

    #[test]
    fn json_omits_empty_fields_and_uses_names() {
        let task = Task::new("pace-1f2", "Write spec")
            .with_status(Status::InProgress)
            .with_type(TaskType::Bug);
        let value = serde_json::to_value(&task).expect("serialize");
        assert_eq!(value["status"], "in-progress");
        assert_eq!(value["type"], "bug");
        assert_eq!(value["priority"], 3);
        assert!(value.get("description").is_none());
        assert!(value.get("labels").is_none());
        assert!(value.get("blocked_by").is_none());
        assert!(value.get("link").is_none());
    }

    #[test]
    fn json_round_trip_preserves_fields() {
        let mut task = Task::new("pace-abc", "Review")
            .with_description("read it twice")
            .with_status(Status::Done)
            .with_type(TaskType::Docs)
            .with_priority(1)
            .with_link("https://example.com")
            .with_labels(["a", "b"]);
        task.add_blocked_by("pace-001");
        task.add_blocks("pace-002");

        let text = serde_json::to_string(&task).expect("serialize");
        let back: Task = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, task);
    }

    #[test]
    fn json_rejects_unknown_status_name() {
        let text = r#"{"id":"a","title":"t","status":"blocked","type":"task","priority":1}"#;
        assert!(serde_json::from_str::<Task>(text).is_err());
    }

    #[test]
    fn parse_priority_rejects_out_of_range() {
        assert_eq!(parse_priority("2").ok(), Some(2));
        assert!(parse_priority("0").is_err());
        assert!(parse_priority("5").is_err());
        assert!(parse_priority("high").is_err());
    }

    #[test]
    fn row_round_trip_keeps_legacy_priority() {
        let task = Task::new("a", "t").with_priority(PRIORITY_UNSET);
        let row = task.to_row();
        let back = Task::from_row(row).expect("hydrate");
        assert_eq!(back.priority, PRIORITY_UNSET);

        let mut bad = task.to_row();
        bad.status = 7;
        assert!(matches!(Task::from_row(bad), Err(Error::InvalidStatus(7))));
    }
}
