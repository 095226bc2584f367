//! Dependency graph queries: readiness and tree walks.
//!
//! The graph may contain cycles and self-loops; nothing here assumes a DAG.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::style::{style_for, StyleField};
use crate::task::{Status, Task};

pub const DEFAULT_MAX_DEPTH: usize = 50;
const TREE_TITLE_LIMIT: usize = 50;

pub type TaskIndex<'a> = HashMap<&'a str, &'a Task>;

pub fn index(tasks: &[Task]) -> TaskIndex<'_> {
    tasks.iter().map(|task| (task.id.as_str(), task)).collect()
}

/// A non-Done task whose resolvable blockers are all Done. Unresolved
/// blocker IDs count as satisfied.
pub fn is_ready(task: &Task, index: &TaskIndex<'_>) -> bool {
    if task.status == Status::Done {
        return false;
    }
    task.blocked_by().iter().all(|blocker| {
        index
            .get(blocker.as_str())
            .map_or(true, |found| found.status == Status::Done)
    })
}

/// Tasks that are ready, in input order.
pub fn ready_tasks(tasks: &[Task]) -> Vec<&Task> {
    let lookup = index(tasks);
    tasks
        .iter()
        .filter(|task| is_ready(task, &lookup))
        .collect()
}

/// True when the task has at least one resolvable, unfinished blocker.
pub fn is_blocked(task: &Task, index: &TaskIndex<'_>) -> bool {
    task.status != Status::Done && !is_ready(task, index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow blockers.
    #[default]
    Up,
    /// Follow blockees.
    Down,
    Both,
}

impl Direction {
    fn includes_up(self) -> bool {
        matches!(self, Direction::Up | Direction::Both)
    }

    fn includes_down(self) -> bool {
        matches!(self, Direction::Down | Direction::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Both => "both",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "both" => Ok(Direction::Both),
            _ => Err(Error::InvalidValue {
                key: "direction",
                value: value.to_string(),
                reason: "valid: up, down, both".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    pub direction: Direction,
    pub status: Option<Status>,
    /// Nodes at this depth are shown but not expanded. Direct neighbours of
    /// the root sit at depth 1.
    pub max_depth: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Up,
            status: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Task {
        id: String,
        title: String,
        status: Status,
        ready: bool,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<TreeNode>,
    },
    /// The ID already appears on the path from the root.
    Cycle { id: String, title: String },
    NotFound { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyTree {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub priority: u8,
    pub ready: bool,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<Vec<TreeNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<TreeNode>>,
}

struct Walker<'a, 'b> {
    index: &'b TaskIndex<'a>,
    options: TreeOptions,
    up: bool,
    path: HashSet<String>,
}

impl Walker<'_, '_> {
    fn children(&mut self, ids: &[String], depth: usize) -> Vec<TreeNode> {
        if depth > self.options.max_depth {
            return Vec::new();
        }
        let index = self.index;
        let wanted = self.options.status;
        ids.iter()
            .filter(|id| match (index.get(id.as_str()), wanted) {
                (Some(task), Some(status)) => task.status == status,
                _ => true,
            })
            .map(|id| self.node(id, depth))
            .collect()
    }

    fn node(&mut self, id: &str, depth: usize) -> TreeNode {
        let Some(task) = self.index.get(id).copied() else {
            return TreeNode::NotFound { id: id.to_string() };
        };
        if self.path.contains(id) {
            return TreeNode::Cycle {
                id: id.to_string(),
                title: task.title.clone(),
            };
        }

        let next = if self.up {
            task.blocked_by()
        } else {
            task.blocks()
        };
        self.path.insert(id.to_string());
        let children = self.children(next, depth + 1);
        self.path.remove(id);

        TreeNode::Task {
            id: id.to_string(),
            title: task.title.clone(),
            status: task.status,
            ready: is_ready(task, self.index),
            children,
        }
    }
}

/// Walk the dependency graph from `root`. The visited set is per path, so a
/// task may appear on several independent branches.
pub fn dependency_tree(root: &Task, index: &TaskIndex<'_>, options: TreeOptions) -> DependencyTree {
    let section = |up: bool, ids: &[String]| {
        let mut walker = Walker {
            index,
            options,
            up,
            path: HashSet::from([root.id.clone()]),
        };
        walker.children(ids, 1)
    };

    DependencyTree {
        id: root.id.clone(),
        title: root.title.clone(),
        status: root.status,
        priority: root.priority,
        ready: is_ready(root, index),
        direction: options.direction,
        blocked_by: options
            .direction
            .includes_up()
            .then(|| section(true, root.blocked_by())),
        blocks: options
            .direction
            .includes_down()
            .then(|| section(false, root.blocks())),
    }
}

impl DependencyTree {
    pub fn is_empty(&self) -> bool {
        let empty = |section: &Option<Vec<TreeNode>>| section.as_ref().map_or(true, Vec::is_empty);
        empty(&self.blocked_by) && empty(&self.blocks)
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(nodes) = self.blocked_by.as_ref().filter(|nodes| !nodes.is_empty()) {
            lines.push("BLOCKED BY:".to_string());
            render_nodes(nodes, "", &mut lines);
            lines.push(String::new());
        }

        let mut root = format!("► {}: {}", self.id, self.title);
        if self.ready {
            root.push_str(" [READY]");
        }
        lines.push(root);
        let status = style_for(StyleField::Status(self.status));
        let mut summary = format!("  {} {}", status.symbol, status.label);
        let priority = style_for(StyleField::Priority(self.priority));
        if !priority.symbol.is_empty() {
            summary.push(' ');
            summary.push_str(priority.symbol);
        }
        lines.push(summary);
        lines.push(String::new());

        if let Some(nodes) = self.blocks.as_ref().filter(|nodes| !nodes.is_empty()) {
            lines.push("BLOCKS:".to_string());
            render_nodes(nodes, "", &mut lines);
            lines.push(String::new());
        }

        if self.is_empty() {
            lines.push("No dependencies found.".to_string());
        }
        lines
    }
}

fn render_nodes(nodes: &[TreeNode], prefix: &str, lines: &mut Vec<String>) {
    for (position, node) in nodes.iter().enumerate() {
        let last = position + 1 == nodes.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        match node {
            TreeNode::NotFound { id } => {
                lines.push(format!("{prefix}{branch}{id} (not found)"));
            }
            TreeNode::Cycle { id, title } => {
                lines.push(format!("{prefix}{branch}{id}: {title} (cycle)"));
            }
            TreeNode::Task {
                id,
                title,
                status,
                ready,
                children,
            } => {
                let symbol = style_for(StyleField::Status(*status)).symbol;
                let mut line = format!(
                    "{prefix}{branch}{symbol} {id}: {}",
                    truncate_title(title, TREE_TITLE_LIMIT)
                );
                if *ready {
                    line.push_str(" [READY]");
                }
                lines.push(line);
                render_nodes(children, &format!("{prefix}{indent}"), lines);
            }
        }
    }
}

pub fn truncate_title(title: &str, limit: usize) -> String {
    if title.chars().count() <= limit {
        return title.to_string();
    }
    let kept: String = title.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", kept.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(tasks: &mut [Task], blocker: usize, blocked: usize) {
        let blocker_id = tasks[blocker].id.clone();
        let blocked_id = tasks[blocked].id.clone();
        tasks[blocker].add_blocks(blocked_id);
        tasks[blocked].add_blocked_by(blocker_id);
    }

    #[test]
    fn ready_ignores_dangling_blockers() {
        let mut task = Task::new("a", "A");
        task.add_blocked_by("ghost");
        let tasks = vec![task];
        assert!(is_ready(&tasks[0], &index(&tasks)));
    }

    #[test]
    fn ready_requires_done_blockers() {
        let mut tasks = vec![Task::new("x", "X"), Task::new("a", "A")];
        link(&mut tasks, 0, 1);
        assert!(!is_ready(&tasks[1], &index(&tasks)));
        assert!(is_blocked(&tasks[1], &index(&tasks)));

        tasks[0].status = Status::Done;
        assert!(is_ready(&tasks[1], &index(&tasks)));
        assert!(!is_ready(&tasks[0], &index(&tasks)));
    }

    #[test]
    fn ready_tasks_excludes_done() {
        let tasks = vec![
            Task::new("a", "A").with_status(Status::Done),
            Task::new("b", "B").with_status(Status::InProgress),
        ];
        let ready: Vec<&str> = ready_tasks(&tasks).iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ready, vec!["b"]);
    }

    #[test]
    fn tree_marks_cycle_back_to_root() {
        let mut tasks = vec![Task::new("a", "A"), Task::new("b", "B")];
        link(&mut tasks, 0, 1);
        link(&mut tasks, 1, 0);
        let lookup = index(&tasks);
        let tree = dependency_tree(
            &tasks[0],
            &lookup,
            TreeOptions {
                direction: Direction::Down,
                status: None,
                max_depth: 10,
            },
        );
        let blocks = tree.blocks.expect("down section");
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            TreeNode::Task { id, children, .. } => {
                assert_eq!(id, "b");
                assert_eq!(
                    children,
                    &vec![TreeNode::Cycle {
                        id: "a".to_string(),
                        title: "A".to_string()
                    }]
                );
            }
            other => panic!("unexpected node {other:?}"),
        }
        assert!(tree.blocked_by.is_none());
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut task = Task::new("a", "A");
        task.add_blocks("a");
        task.add_blocked_by("a");
        let tasks = vec![task];
        let lookup = index(&tasks);
        let tree = dependency_tree(
            &tasks[0],
            &lookup,
            TreeOptions {
                direction: Direction::Both,
                ..TreeOptions::default()
            },
        );
        assert!(matches!(
            tree.blocks.as_deref(),
            Some([TreeNode::Cycle { .. }])
        ));
        assert!(matches!(
            tree.blocked_by.as_deref(),
            Some([TreeNode::Cycle { .. }])
        ));
    }

    #[test]
    fn same_task_may_appear_on_independent_branches() {
        // root is blocked by b and c; both are blocked by d.
        let mut tasks = vec![
            Task::new("root", "Root"),
            Task::new("b", "B"),
            Task::new("c", "C"),
            Task::new("d", "D"),
        ];
        link(&mut tasks, 1, 0);
        link(&mut tasks, 2, 0);
        link(&mut tasks, 3, 1);
        link(&mut tasks, 3, 2);
        let lookup = index(&tasks);
        let tree = dependency_tree(&tasks[0], &lookup, TreeOptions::default());
        let lines = tree.render();
        let d_lines = lines.iter().filter(|line| line.contains("d: D")).count();
        assert_eq!(d_lines, 2);
        assert!(!lines.iter().any(|line| line.contains("(cycle)")));
    }

    #[test]
    fn depth_cap_is_inclusive() {
        let mut tasks = vec![Task::new("a", "A"), Task::new("b", "B"), Task::new("c", "C")];
        link(&mut tasks, 0, 1);
        link(&mut tasks, 1, 2);
        let lookup = index(&tasks);
        let tree = dependency_tree(
            &tasks[0],
            &lookup,
            TreeOptions {
                direction: Direction::Down,
                status: None,
                max_depth: 1,
            },
        );
        match tree.blocks.as_deref() {
            Some([TreeNode::Task { id, children, .. }]) => {
                assert_eq!(id, "b");
                assert!(children.is_empty());
            }
            other => panic!("unexpected section {other:?}"),
        }
    }

    #[test]
    fn status_filter_keeps_missing_ids() {
        let mut root = Task::new("root", "Root");
        root.add_blocked_by("done");
        root.add_blocked_by("ghost");
        let tasks = vec![root, Task::new("done", "Finished").with_status(Status::Done)];
        let lookup = index(&tasks);
        let tree = dependency_tree(
            &tasks[0],
            &lookup,
            TreeOptions {
                status: Some(Status::Todo),
                ..TreeOptions::default()
            },
        );
        assert_eq!(
            tree.blocked_by,
            Some(vec![TreeNode::NotFound {
                id: "ghost".to_string()
            }])
        );
    }

    #[test]
    fn render_draws_branches() {
        let mut tasks = vec![
            Task::new("root", "Root"),
            Task::new("b", "B"),
            Task::new("c", "C"),
        ];
        link(&mut tasks, 1, 0);
        link(&mut tasks, 2, 0);
        let lookup = index(&tasks);
        let lines = dependency_tree(&tasks[0], &lookup, TreeOptions::default()).render();
        assert_eq!(lines[0], "BLOCKED BY:");
        assert_eq!(lines[1], "├── ○ b: B [READY]");
        assert_eq!(lines[2], "└── ○ c: C [READY]");
        assert_eq!(lines[4], "► root: Root");
        assert_eq!(lines[5], "  ○ todo P3");
    }

    #[test]
    fn render_reports_no_dependencies() {
        let tasks = vec![Task::new("a", "Alone")];
        let lookup = index(&tasks);
        let lines = dependency_tree(&tasks[0], &lookup, TreeOptions::default()).render();
        assert_eq!(lines[0], "► a: Alone [READY]");
        assert_eq!(lines.last().map(String::as_str), Some("No dependencies found."));
    }

    #[test]
    fn truncate_title_adds_ellipsis() {
        assert_eq!(truncate_title("short", 50), "short");
        let long = "x".repeat(60);
        let cut = truncate_title(&long, 50);
        assert_eq!(cut.chars().count(), 50);
        assert!(cut.ends_with("..."));
    }
}
