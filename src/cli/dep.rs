//! pace task dep command implementations.

use serde::Serialize;

use crate::cli::{load_context, GlobalOptions};
use crate::error::{Error, Result};
use crate::graph::{self, Direction};
use crate::output::{emit_success, HumanOutput};
use crate::task::Status;

pub struct TreeOptions {
    pub id: String,
    pub direction: Option<String>,
    pub status: Option<String>,
    pub max_depth: Option<usize>,
    pub global: GlobalOptions,
}

#[derive(Serialize)]
struct Edge {
    blocker: String,
    blocked: String,
}

#[derive(Serialize)]
struct DependencyList {
    task_id: String,
    blocked_by: Vec<String>,
    blocks: Vec<String>,
}

#[derive(Serialize)]
struct ChainOutput {
    dependencies: Vec<Edge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

pub fn run_add(global: GlobalOptions, blocker: String, blocked: String) -> Result<()> {
    let ctx = load_context(&global)?;
    ctx.service.add_dependency(&blocker, &blocked)?;
    let human = HumanOutput::new(format!("pace task dep add: {blocker} blocks {blocked}"));
    emit_success(
        global.output(),
        "task dep add",
        &Edge { blocker, blocked },
        Some(&human),
    )
}

pub fn run_remove(global: GlobalOptions, blocker: String, blocked: String) -> Result<()> {
    let ctx = load_context(&global)?;
    ctx.service.remove_dependency(&blocker, &blocked)?;
    let human = HumanOutput::new(format!(
        "pace task dep remove: {blocker} no longer blocks {blocked}"
    ));
    emit_success(
        global.output(),
        "task dep remove",
        &Edge { blocker, blocked },
        Some(&human),
    )
}

pub fn run_list(global: GlobalOptions, id: String) -> Result<()> {
    let ctx = load_context(&global)?;
    let task = ctx.service.get(&id)?;

    let mut human = HumanOutput::new(format!("Dependencies of {id}"));
    human.push_summary("blocked by", join_or_none(task.blocked_by()));
    human.push_summary("blocks", join_or_none(task.blocks()));

    let output = DependencyList {
        task_id: id,
        blocked_by: task.blocked_by().to_vec(),
        blocks: task.blocks().to_vec(),
    };
    emit_success(global.output(), "task dep list", &output, Some(&human))
}

pub fn run_tree(options: TreeOptions) -> Result<()> {
    let ctx = load_context(&options.global)?;
    let direction: Direction = match options.direction.as_deref() {
        Some(value) => value.parse()?,
        None => ctx.config.tree.direction()?,
    };
    let status = options
        .status
        .as_deref()
        .map(str::parse::<Status>)
        .transpose()?;
    let max_depth = options.max_depth.unwrap_or(ctx.config.tree.max_depth);

    let tasks = ctx.service.load_all()?;
    let index = graph::index(&tasks);
    let root = index
        .get(options.id.as_str())
        .copied()
        .ok_or_else(|| Error::TaskNotFound(options.id.clone()))?;

    let tree = graph::dependency_tree(
        root,
        &index,
        graph::TreeOptions {
            direction,
            status,
            max_depth,
        },
    );

    let mut human = HumanOutput::new("");
    for line in tree.render() {
        human.push_line(line);
    }
    emit_success(options.global.output(), "task dep tree", &tree, Some(&human))
}

/// Link consecutive IDs. Individual failures are reported; the command
/// fails only when no edge could be added.
pub fn run_chain(global: GlobalOptions, ids: Vec<String>) -> Result<()> {
    let ctx = load_context(&global)?;
    let mut dependencies = Vec::new();
    let mut errors = Vec::new();

    for pair in ids.windows(2) {
        let (blocker, blocked) = (&pair[0], &pair[1]);
        match ctx.service.add_dependency(blocker, blocked) {
            Ok(()) => dependencies.push(Edge {
                blocker: blocker.clone(),
                blocked: blocked.clone(),
            }),
            Err(err) => errors.push(format!("{blocker}->{blocked}: {err}")),
        }
    }

    if dependencies.is_empty() && !errors.is_empty() {
        return Err(Error::OperationFailed(errors.join("; ")));
    }

    let mut human = HumanOutput::new(format!(
        "pace task dep chain: {} dependency(ies) added",
        dependencies.len()
    ));
    for edge in &dependencies {
        human.push_detail(format!("{} blocks {}", edge.blocker, edge.blocked));
    }
    for error in &errors {
        human.push_warning(error.clone());
    }
    emit_success(
        global.output(),
        "task dep chain",
        &ChainOutput {
            dependencies,
            errors,
        },
        Some(&human),
    )
}

fn join_or_none(ids: &[String]) -> String {
    if ids.is_empty() {
        "(none)".to_string()
    } else {
        ids.join(", ")
    }
}
