//! pace init and info command implementations.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{load_context, GlobalOptions};
use crate::error::Result;
use crate::graph;
use crate::output::{emit_success, HumanOutput};
use crate::service::TaskService;
use crate::storage::{Scope, Storage};
use crate::task::Status;

#[derive(Serialize)]
struct InitReport {
    pace_dir: PathBuf,
    created: bool,
    id_prefix: String,
}

#[derive(Serialize)]
struct TaskCounts {
    total: usize,
    todo: usize,
    in_progress: usize,
    done: usize,
    ready: usize,
}

#[derive(Serialize)]
struct InfoReport {
    pace_dir: PathBuf,
    database: PathBuf,
    config: PathBuf,
    scope: Scope,
    id_prefix: String,
    tasks: TaskCounts,
}

pub fn run_init(global: GlobalOptions) -> Result<()> {
    let storage = match global.pace_dir.as_deref() {
        Some(dir) => Storage::new(dir.to_path_buf(), Scope::Explicit),
        None => Storage::project(&std::env::current_dir()?),
    };
    let created = !storage.is_initialized();
    let service = TaskService::new(storage.open_store()?)?;

    let report = InitReport {
        pace_dir: storage.root().to_path_buf(),
        created,
        id_prefix: service.prefix().to_string(),
    };

    let header = if created {
        format!("pace init: created {}", storage.root().display())
    } else {
        format!("pace init: already initialized at {}", storage.root().display())
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("id prefix", service.prefix());
    human.push_next_step("pace task create --title \"...\"");

    emit_success(global.output(), "init", &report, Some(&human))
}

pub fn run_info(global: GlobalOptions) -> Result<()> {
    let ctx = load_context(&global)?;
    let tasks = ctx.service.load_all()?;
    let count = |status: Status| tasks.iter().filter(|task| task.status == status).count();
    let counts = TaskCounts {
        total: tasks.len(),
        todo: count(Status::Todo),
        in_progress: count(Status::InProgress),
        done: count(Status::Done),
        ready: graph::ready_tasks(&tasks).len(),
    };

    let scope = match ctx.storage.scope() {
        Scope::Explicit => "explicit",
        Scope::Project => "project",
        Scope::Global => "global",
    };
    let mut human = HumanOutput::new("pace info");
    human.push_summary("pace dir", ctx.storage.root().display().to_string());
    human.push_summary("storage", scope);
    human.push_summary("id prefix", ctx.service.prefix());
    human.push_summary(
        "tasks",
        format!(
            "{} total ({} todo, {} in progress, {} done, {} ready)",
            counts.total, counts.todo, counts.in_progress, counts.done, counts.ready
        ),
    );

    let report = InfoReport {
        pace_dir: ctx.storage.root().to_path_buf(),
        database: ctx.storage.db_path(),
        config: ctx.storage.config_path(),
        scope: ctx.storage.scope(),
        id_prefix: ctx.service.prefix().to_string(),
        tasks: counts,
    };
    emit_success(global.output(), "info", &report, Some(&human))
}
