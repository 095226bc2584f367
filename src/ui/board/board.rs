//! Kanban board state machine.
//!
//! Three columns keyed by [`Status`] and a focused column. Form and viewer
//! overlays take every key while open. Deletes and moves mutate the
//! columns before the store is written; a failed write is reported on the
//! status line and the in-memory board is left as is.

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::error::{Error, Result};
use crate::graph::{self, TaskIndex};
use crate::service::TaskService;
use crate::store::TaskStore;
use crate::task::{validate_link, Status, Task, TaskType};

use super::form::{FormAction, FormState, FormTarget};
use super::viewer::{ViewerAction, ViewerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Error,
    Info,
}

/// Result of one key press, for the terminal loop to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
    /// A validated link to hand to the OS opener.
    Open(String),
}

#[derive(Debug, Clone)]
pub enum Overlay {
    None,
    Form(FormState),
    Viewer(ViewerState),
}

#[derive(Debug, Clone, Copy)]
pub struct BoardDefaults {
    pub task_type: TaskType,
    pub priority: u8,
}

#[derive(Debug, Clone)]
pub struct Column {
    status: Status,
    tasks: Vec<Task>,
    selected: usize,
}

impl Column {
    fn new(status: Status) -> Self {
        Self {
            status,
            tasks: Vec::new(),
            selected: 0,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected_index(&self) -> Option<usize> {
        if self.tasks.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    fn move_selection(&mut self, delta: isize) {
        if self.tasks.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.tasks.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
    }

    fn remove_selected(&mut self) -> Option<Task> {
        if self.tasks.is_empty() {
            return None;
        }
        let task = self.tasks.remove(self.selected);
        self.clamp_selection();
        Some(task)
    }
}

pub struct Board<S: TaskStore> {
    service: TaskService<S>,
    columns: [Column; 3],
    focus: Status,
    overlay: Overlay,
    defaults: BoardDefaults,
    show_help: bool,
    status: Option<(String, StatusKind)>,
}

impl<S: TaskStore> Board<S> {
    /// Load every task from the service into its status column.
    pub fn load(service: TaskService<S>, defaults: BoardDefaults) -> Result<Self> {
        let tasks = service.load_all()?;
        let mut columns = Status::ALL.map(Column::new);
        for task in tasks {
            columns[task.status.index()].tasks.push(task);
        }
        tracing::debug!(
            todo = columns[0].tasks.len(),
            in_progress = columns[1].tasks.len(),
            done = columns[2].tasks.len(),
            "board loaded"
        );
        Ok(Self {
            service,
            columns,
            focus: Status::Todo,
            overlay: Overlay::None,
            defaults,
            show_help: false,
            status: None,
        })
    }

    pub fn columns(&self) -> &[Column; 3] {
        &self.columns
    }

    pub fn column(&self, status: Status) -> &Column {
        &self.columns[status.index()]
    }

    pub fn focus(&self) -> Status {
        self.focus
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn status_line(&self) -> Option<(&str, StatusKind)> {
        self.status
            .as_ref()
            .map(|(message, kind)| (message.as_str(), *kind))
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.column(self.focus).selected_task()
    }

    /// IDs of tasks with at least one unfinished blocker on the board.
    pub fn blocked_ids(&self) -> HashSet<String> {
        let index: TaskIndex<'_> = self
            .columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .map(|task| (task.id.as_str(), task))
            .collect();
        index
            .values()
            .filter(|task| graph::is_blocked(task, &index))
            .map(|task| task.id.clone())
            .collect()
    }

    pub fn footer_hint(&self) -> &'static str {
        match self.overlay {
            Overlay::Form(_) => "tab next field  left/right change  ctrl+s save  esc back",
            Overlay::Viewer(_) => "j/k scroll  v/esc close  q quit",
            Overlay::None => {
                "h/l column  j/k move  n new  e edit  d delete  enter advance  v view  o open  ? help  q quit"
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), StatusKind::Error));
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), StatusKind::Info));
    }

    /// Release the board's store.
    pub fn close(self) {
        tracing::debug!("board closed");
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Outcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Outcome::Quit;
        }
        match &mut self.overlay {
            Overlay::Form(form) => match form.handle_key(key) {
                FormAction::None => Outcome::Continue,
                FormAction::Cancel => {
                    self.overlay = Overlay::None;
                    Outcome::Continue
                }
                FormAction::Submit => {
                    self.save_form();
                    Outcome::Continue
                }
            },
            Overlay::Viewer(viewer) => match viewer.handle_key(key) {
                ViewerAction::None => Outcome::Continue,
                ViewerAction::Close => {
                    self.overlay = Overlay::None;
                    Outcome::Continue
                }
                ViewerAction::Quit => Outcome::Quit,
            },
            Overlay::None => self.handle_board_key(key),
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Outcome {
        match key.code {
            KeyCode::Char('q') => return Outcome::Quit,
            KeyCode::Left | KeyCode::Char('h') => self.focus = self.focus.prev(),
            KeyCode::Right | KeyCode::Char('l') => self.focus = self.focus.next(),
            KeyCode::Up | KeyCode::Char('k') => self.focused_mut().move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.focused_mut().move_selection(1),
            KeyCode::Char('n') => self.open_new_form(),
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Enter => self.advance_selected(),
            KeyCode::Char('v') => {
                if let Some(task) = self.selected_task() {
                    self.overlay = Overlay::Viewer(ViewerState::new(task));
                }
            }
            KeyCode::Char('o') => return self.open_selected_link(),
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Esc => self.show_help = false,
            _ => {}
        }
        Outcome::Continue
    }

    fn focused_mut(&mut self) -> &mut Column {
        &mut self.columns[self.focus.index()]
    }

    fn open_new_form(&mut self) {
        self.overlay = Overlay::Form(FormState::new_task(
            self.focus,
            self.defaults.task_type,
            self.defaults.priority,
        ));
    }

    fn open_edit_form(&mut self) {
        let column = self.column(self.focus);
        if let (Some(index), Some(task)) = (column.selected_index(), column.selected_task()) {
            self.overlay = Overlay::Form(FormState::edit_task(task, index));
        }
    }

    fn save_form(&mut self) {
        let Overlay::Form(form) = &mut self.overlay else {
            return;
        };
        let id = if form.is_new() {
            self.service.generate_id()
        } else {
            String::new()
        };
        let task = form.build(id);
        let result = match form.target() {
            FormTarget::New { .. } => self.service.create(&task).map(|warnings| {
                for warning in warnings {
                    tracing::warn!(task = %task.id, warning = %warning, "board create warning");
                }
            }),
            FormTarget::Edit { .. } => self.service.update(&task),
        };
        if let Err(err) = result {
            tracing::warn!(task = %task.id, error = %err, "board save failed");
            form.set_error(err.to_string());
            return;
        }

        let target = form.target().clone();
        self.overlay = Overlay::None;
        match target {
            FormTarget::New { status } => {
                let column = &mut self.columns[status.index()];
                column.tasks.push(task.clone());
                column.selected = column.tasks.len() - 1;
                self.set_info(format!("created {}", task.id));
            }
            FormTarget::Edit { original, index } => {
                let column = &mut self.columns[original.status.index()];
                let slot = match column.tasks.get(index) {
                    Some(existing) if existing.id == original.id => Some(index),
                    _ => column.tasks.iter().position(|t| t.id == original.id),
                };
                match slot {
                    Some(slot) => column.tasks[slot] = task.clone(),
                    None => column.tasks.push(task.clone()),
                }
                self.set_info(format!("updated {}", task.id));
            }
        }
    }

    fn delete_selected(&mut self) {
        let Some(task) = self.focused_mut().remove_selected() else {
            return;
        };
        for column in &mut self.columns {
            for other in &mut column.tasks {
                other.remove_blocked_by(&task.id);
                other.remove_blocks(&task.id);
            }
        }
        match self.service.delete(&task.id) {
            Ok(()) => self.set_info(format!("deleted {}", task.id)),
            Err(err) => self.report_failure("delete", &task.id, &err),
        }
    }

    fn advance_selected(&mut self) {
        let Some(mut task) = self.focused_mut().remove_selected() else {
            return;
        };
        task.advance_status();
        let status = task.status;
        let persisted = self.service.update(&task);
        let id = task.id.clone();
        self.columns[status.index()].tasks.push(task);
        match persisted {
            Ok(()) => self.set_info(format!("{id} -> {status}")),
            Err(err) => self.report_failure("move", &id, &err),
        }
    }

    fn open_selected_link(&mut self) -> Outcome {
        let Some(task) = self.selected_task() else {
            return Outcome::Continue;
        };
        if task.link().is_empty() {
            self.set_info("task has no link");
            return Outcome::Continue;
        }
        match validate_link(task.link()) {
            Ok(url) => Outcome::Open(url.to_string()),
            Err(err) => {
                self.set_error(err.to_string());
                Outcome::Continue
            }
        }
    }

    fn report_failure(&mut self, action: &str, id: &str, err: &Error) {
        tracing::warn!(task = %id, error = %err, "board {action} not persisted");
        self.set_error(format!("{action} {id} failed: {err}"));
    }
}
