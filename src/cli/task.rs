//! pace task command implementations.

use serde::Serialize;

use crate::bulk::{BulkResult, DeletePreview};
use crate::cli::{load_context, GlobalOptions};
use crate::error::{Error, Result};
use crate::filter::{merge_updates, parse_filters, parse_updates, Update, UpdatePreview};
use crate::output::{emit_success, HumanOutput};
use crate::style::{style_for, StyleField};
use crate::task::{parse_priority, Status, Task, TaskType};

pub struct CreateOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub task_type: Option<String>,
    pub priority: Option<String>,
    pub labels: Vec<String>,
    pub url: Option<String>,
    pub bulk: Option<String>,
    pub global: GlobalOptions,
}

pub struct ListOptions {
    pub filters: Vec<String>,
    pub pretty: bool,
    pub global: GlobalOptions,
}

pub struct UpdateOptions {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub task_type: Option<String>,
    pub priority: Option<String>,
    pub url: Option<String>,
    pub add_labels: Vec<String>,
    pub remove_labels: Vec<String>,
    pub filters: Vec<String>,
    pub sets: Vec<String>,
    pub dry_run: bool,
    pub global: GlobalOptions,
}

pub struct DeleteOptions {
    pub ids: Vec<String>,
    pub filters: Vec<String>,
    pub dry_run: bool,
    pub global: GlobalOptions,
}

#[derive(Serialize)]
struct TaskListOutput {
    tasks: Vec<Task>,
    count: usize,
}

#[derive(Serialize)]
struct UpdatePreviewOutput {
    dry_run: bool,
    matched: usize,
    tasks: Vec<UpdatePreview>,
}

#[derive(Serialize)]
struct DeletePreviewOutput {
    dry_run: bool,
    matched: usize,
    tasks: Vec<DeletePreview>,
}

#[derive(Serialize)]
struct DeletedOutput {
    id: String,
    title: String,
}

#[derive(Serialize)]
struct LabelOutput {
    id: String,
    label: String,
}

pub fn run_create(options: CreateOptions) -> Result<()> {
    let ctx = load_context(&options.global)?;
    let default_type = ctx.config.tasks.task_type()?;
    let default_priority = ctx.config.tasks.default_priority;

    if let Some(input) = options.bulk.as_deref() {
        let raw = if input == "-" {
            std::io::read_to_string(std::io::stdin())?
        } else {
            input.to_string()
        };
        let entries: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|err| Error::InvalidArgument(format!("invalid JSON: {err}")))?;
        if entries.is_empty() {
            return Err(Error::InvalidArgument("no tasks provided".to_string()));
        }
        let result = ctx
            .service
            .create_many(entries, default_type, default_priority);
        return emit_bulk(&options.global, "task create", "created", result);
    }

    let title = options.title.unwrap_or_default();
    if title.is_empty() {
        return Err(Error::InvalidArgument("title is required".to_string()));
    }
    let status: Status = options.status.parse()?;
    let task_type = match options.task_type.as_deref() {
        Some(value) => value.parse()?,
        None => default_type,
    };
    let priority = match options.priority.as_deref() {
        Some(value) => parse_priority(value)?,
        None => default_priority,
    };

    let task = Task::new(ctx.service.generate_id(), title)
        .with_description(options.description.unwrap_or_default())
        .with_status(status)
        .with_type(task_type)
        .with_priority(priority)
        .with_link(options.url.as_deref().unwrap_or_default())
        .with_labels(options.labels);
    let warnings = ctx.service.create(&task)?;
    let created = ctx.service.get(&task.id)?;

    let mut human = task_detail(&created, &format!("pace task create: created {}", created.id));
    for warning in warnings {
        human.push_warning(warning);
    }
    human.push_next_step(format!("pace task get {}", created.id));

    emit_success(options.global.output(), "task create", &created, Some(&human))
}

pub fn run_get(global: GlobalOptions, id: String) -> Result<()> {
    let ctx = load_context(&global)?;
    let task = ctx.service.get(&id)?;
    let human = task_detail(&task, &format!("{}: {}", task.id, task.title));
    emit_success(global.output(), "task get", &task, Some(&human))
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let filter = parse_filters(&options.filters)?;
    let ctx = load_context(&options.global)?;
    let mut tasks = ctx.service.select(&filter)?;
    sort_by_priority(&mut tasks);

    let human = task_list_human("Tasks", &tasks, options.pretty);
    let count = tasks.len();
    emit_success(
        options.global.output(),
        "task list",
        &TaskListOutput { tasks, count },
        Some(&human),
    )
}

pub fn run_ready(global: GlobalOptions, pretty: bool) -> Result<()> {
    let ctx = load_context(&global)?;
    let mut tasks = ctx.service.ready_tasks()?;
    sort_by_priority(&mut tasks);

    let human = task_list_human("Ready tasks", &tasks, pretty);
    let count = tasks.len();
    emit_success(
        global.output(),
        "task ready",
        &TaskListOutput { tasks, count },
        Some(&human),
    )
}

pub fn run_search(global: GlobalOptions, query: String) -> Result<()> {
    let ctx = load_context(&global)?;
    let tasks = ctx.service.search(&query)?;
    let human = task_list_human(&format!("Tasks matching '{query}'"), &tasks, false);
    let count = tasks.len();
    emit_success(
        global.output(),
        "task search",
        &TaskListOutput { tasks, count },
        Some(&human),
    )
}

pub fn run_update(options: UpdateOptions) -> Result<()> {
    if !options.filters.is_empty() {
        return run_batch_update(options);
    }
    let id = options
        .id
        .clone()
        .ok_or_else(|| Error::InvalidArgument("task id or --filter required".to_string()))?;
    let has_fields = options.title.is_some()
        || options.description.is_some()
        || options.status.is_some()
        || options.task_type.is_some()
        || options.priority.is_some()
        || options.url.is_some();
    if !has_fields && options.add_labels.is_empty() && options.remove_labels.is_empty() {
        return Err(Error::InvalidArgument("no updates specified".to_string()));
    }

    let ctx = load_context(&options.global)?;
    let mut task = ctx.service.get(&id)?;
    if has_fields {
        if let Some(title) = options.title {
            task.title = title;
        }
        if let Some(description) = options.description {
            task.description = description;
        }
        if let Some(status) = options.status.as_deref() {
            task.status = status.parse()?;
        }
        if let Some(kind) = options.task_type.as_deref() {
            task.task_type = kind.parse()?;
        }
        if let Some(priority) = options.priority.as_deref() {
            task.priority = parse_priority(priority)?;
        }
        if let Some(url) = options.url.as_deref() {
            task.set_link(url);
        }
        ctx.service.update(&task)?;
    }
    for label in &options.add_labels {
        ctx.service.add_label(&id, label)?;
    }
    for label in &options.remove_labels {
        ctx.service.remove_label(&id, label)?;
    }

    let updated = ctx.service.get(&id)?;
    let human = task_detail(&updated, &format!("pace task update: updated {id}"));
    emit_success(options.global.output(), "task update", &updated, Some(&human))
}

fn run_batch_update(options: UpdateOptions) -> Result<()> {
    if options.title.is_some() || options.description.is_some() || options.url.is_some() {
        return Err(Error::InvalidArgument(
            "--title, --description and --url cannot be used with --filter".to_string(),
        ));
    }
    let filter = parse_filters(&options.filters)?;
    let update = build_update(&options)?;
    if update.is_empty() {
        return Err(Error::InvalidArgument("no updates specified".to_string()));
    }

    let ctx = load_context(&options.global)?;
    if options.dry_run {
        let previews = ctx.service.preview_update(&filter, &update)?;
        let mut human = HumanOutput::new(format!(
            "pace task update: dry run, {} task(s) would change",
            previews.len()
        ));
        for preview in &previews {
            human.push_detail(preview_line(preview));
        }
        let output = UpdatePreviewOutput {
            dry_run: true,
            matched: previews.len(),
            tasks: previews,
        };
        return emit_success(options.global.output(), "task update", &output, Some(&human));
    }

    let result = ctx.service.batch_update(&filter, &update)?;
    if result.total == 0 {
        let human = HumanOutput::new("pace task update: no tasks matched filter");
        return emit_success(options.global.output(), "task update", &result, Some(&human));
    }
    emit_bulk(&options.global, "task update", "updated", result)
}

/// `--set` tokens and the dedicated flags merge into one update; a field set
/// twice is rejected.
fn build_update(options: &UpdateOptions) -> Result<Update> {
    let mut flags = Update::default();
    if let Some(status) = options.status.as_deref() {
        flags.status = Some(status.parse()?);
    }
    if let Some(kind) = options.task_type.as_deref() {
        flags.task_type = Some(kind.parse::<TaskType>()?);
    }
    if let Some(priority) = options.priority.as_deref() {
        flags.priority = Some(parse_priority(priority)?);
    }
    flags.add_labels = options.add_labels.clone();
    flags.remove_labels = options.remove_labels.clone();
    merge_updates([parse_updates(&options.sets)?, flags])
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let ctx = load_context(&options.global)?;

    if !options.filters.is_empty() {
        let filter = parse_filters(&options.filters)?;
        if options.dry_run {
            let previews = ctx.service.preview_delete(&filter)?;
            return emit_delete_preview(&options.global, previews);
        }
        let result = ctx.service.delete_matching(&filter)?;
        if result.total == 0 {
            let human = HumanOutput::new("pace task delete: no tasks matched filter");
            return emit_success(options.global.output(), "task delete", &result, Some(&human));
        }
        return emit_bulk(&options.global, "task delete", "deleted", result);
    }

    if options.ids.is_empty() {
        return Err(Error::InvalidArgument(
            "task id or --filter required".to_string(),
        ));
    }
    if options.dry_run {
        let previews = options
            .ids
            .iter()
            .map(|id| ctx.service.get(id).map(|task| DeletePreview::from(&task)))
            .collect::<Result<Vec<_>>>()?;
        return emit_delete_preview(&options.global, previews);
    }
    if let [id] = options.ids.as_slice() {
        let task = ctx.service.get(id)?;
        ctx.service.delete(id)?;
        let human = HumanOutput::new(format!("pace task delete: deleted {id}"));
        let output = DeletedOutput {
            id: task.id,
            title: task.title,
        };
        return emit_success(options.global.output(), "task delete", &output, Some(&human));
    }
    let result = ctx.service.delete_many(&options.ids);
    emit_bulk(&options.global, "task delete", "deleted", result)
}

pub fn run_label_add(global: GlobalOptions, id: String, label: String) -> Result<()> {
    let ctx = load_context(&global)?;
    ctx.service.add_label(&id, &label)?;
    let human = HumanOutput::new(format!("pace task label add: {id} +{label}"));
    emit_success(
        global.output(),
        "task label add",
        &LabelOutput { id, label },
        Some(&human),
    )
}

pub fn run_label_remove(global: GlobalOptions, id: String, label: String) -> Result<()> {
    let ctx = load_context(&global)?;
    ctx.service.remove_label(&id, &label)?;
    let human = HumanOutput::new(format!("pace task label remove: {id} -{label}"));
    emit_success(
        global.output(),
        "task label remove",
        &LabelOutput { id, label },
        Some(&human),
    )
}

fn emit_delete_preview(global: &GlobalOptions, previews: Vec<DeletePreview>) -> Result<()> {
    let mut human = HumanOutput::new(format!(
        "pace task delete: dry run, {} task(s) would be deleted",
        previews.len()
    ));
    for preview in &previews {
        human.push_detail(format!(
            "{} [{}] {} ({})",
            preview.id, preview.task_type, preview.title, preview.status
        ));
    }
    let output = DeletePreviewOutput {
        dry_run: true,
        matched: previews.len(),
        tasks: previews,
    };
    emit_success(global.output(), "task delete", &output, Some(&human))
}

/// Emit a batch result, or fail with every item's error when nothing
/// succeeded.
fn emit_bulk(global: &GlobalOptions, command: &str, verb: &str, result: BulkResult) -> Result<()> {
    if !result.is_success() {
        return Err(Error::OperationFailed(result.failure_summary()));
    }
    let mut human = HumanOutput::new(format!(
        "pace {command}: {} {verb}, {} failed",
        result.succeeded.len(),
        result.failed.len()
    ));
    human.push_summary("total", result.total.to_string());
    for item in &result.succeeded {
        human.push_detail(format!("{} {}", item.id, item.title));
        for warning in &item.warnings {
            human.push_warning(format!("{}: {warning}", item.id));
        }
    }
    for item in &result.failed {
        let label = if item.id.is_empty() { &item.title } else { &item.id };
        human.push_warning(format!(
            "{label}: {}",
            item.error.as_deref().unwrap_or("failed")
        ));
    }
    emit_success(global.output(), command, &result, Some(&human))
}

fn preview_line(preview: &UpdatePreview) -> String {
    let mut parts = vec![format!("{} {}", preview.id, preview.title)];
    if let Some(status) = &preview.status {
        parts.push(format!("status: {status}"));
    }
    if let Some(kind) = &preview.task_type {
        parts.push(format!("type: {kind}"));
    }
    if let Some(priority) = &preview.priority {
        parts.push(format!("priority: {priority}"));
    }
    if !preview.add_labels.is_empty() {
        parts.push(format!("+labels: {}", preview.add_labels.join(", ")));
    }
    if !preview.remove_labels.is_empty() {
        parts.push(format!("-labels: {}", preview.remove_labels.join(", ")));
    }
    parts.join(" | ")
}

/// Stable ascending priority order.
pub(crate) fn sort_by_priority(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| task.priority);
}

/// One-line summary: status symbol (blocked wins), id, type, priority,
/// title, labels and dependency counts.
pub(crate) fn task_line(task: &Task) -> String {
    let blocked = !task.blocked_by().is_empty();
    let status = if blocked {
        style_for(StyleField::Blocked)
    } else {
        style_for(StyleField::Status(task.status))
    };
    let mut parts = vec![
        status.symbol.to_string(),
        task.id.clone(),
        format!("[{}]", task.task_type.symbol()),
    ];
    let priority = style_for(StyleField::Priority(task.priority));
    if !priority.symbol.is_empty() {
        parts.push(priority.symbol.to_string());
    }
    parts.push(task.title.clone());
    parts.extend(task.labels().iter().map(|label| format!("[{label}]")));
    if blocked {
        parts.push(format!("(blocked:{})", task.blocked_by().len()));
    }
    if !task.blocks().is_empty() {
        parts.push(format!("(blocks:{})", task.blocks().len()));
    }
    parts.join(" ")
}

fn task_list_human(header: &str, tasks: &[Task], pretty: bool) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    if tasks.is_empty() {
        human.push_line("No tasks found.");
        return human;
    }
    for task in tasks {
        human.push_line(task_line(task));
    }
    if pretty {
        human.push_line(String::new());
        human.push_line(format!("{} task(s)", tasks.len()));
        human.push_line("Status: ○ todo  ● in-progress  ● done  ⊘ blocked");
        human.push_line("Priority: P1 urgent  P2 high  P3 normal  P4 low");
    }
    human
}

fn task_detail(task: &Task, header: &str) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("id", task.id.clone());
    human.push_summary("title", task.title.clone());
    human.push_summary("status", task.status.to_string());
    human.push_summary("type", task.task_type.to_string());
    let priority = style_for(StyleField::Priority(task.priority));
    if !priority.symbol.is_empty() {
        human.push_summary("priority", format!("{} {}", priority.symbol, priority.label));
    }
    if !task.link().is_empty() {
        human.push_summary("link", task.link().to_string());
    }
    if !task.labels().is_empty() {
        human.push_summary("labels", task.labels().join(", "));
    }
    if !task.blocked_by().is_empty() {
        human.push_summary("blocked by", task.blocked_by().join(", "));
    }
    if !task.blocks().is_empty() {
        human.push_summary("blocks", task.blocks().join(", "));
    }
    if !task.description.is_empty() {
        human.push_detail(task.description.clone());
    }
    human
}
