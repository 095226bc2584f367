use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::task::{
    next_priority, prev_priority, Status, Task, TaskType, LINK_LIMIT, TITLE_LIMIT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Link,
    Type,
    Priority,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Description,
        FormField::Link,
        FormField::Type,
        FormField::Priority,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Link => "Link",
            FormField::Type => "Type",
            FormField::Priority => "Priority",
        }
    }

    fn is_text(self) -> bool {
        matches!(
            self,
            FormField::Title | FormField::Description | FormField::Link
        )
    }
}

/// What the form will do with its contents on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    /// Create a task in the column with this status.
    New { status: Status },
    /// Replace `original`, which sits at `index` in its column.
    Edit { original: Box<Task>, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Cancel,
    Submit,
}

#[derive(Debug, Clone)]
pub struct FormState {
    target: FormTarget,
    title: String,
    description: String,
    link: String,
    task_type: TaskType,
    priority: u8,
    active: usize,
    error: Option<String>,
}

impl FormState {
    pub fn new_task(status: Status, task_type: TaskType, priority: u8) -> Self {
        Self {
            target: FormTarget::New { status },
            title: String::new(),
            description: String::new(),
            link: String::new(),
            task_type,
            priority,
            active: 0,
            error: None,
        }
    }

    pub fn edit_task(task: &Task, index: usize) -> Self {
        Self {
            target: FormTarget::Edit {
                original: Box::new(task.clone()),
                index,
            },
            title: task.title.clone(),
            description: task.description.clone(),
            link: task.link().to_string(),
            task_type: task.task_type,
            priority: task.priority,
            active: 0,
            error: None,
        }
    }

    pub fn target(&self) -> &FormTarget {
        &self.target
    }

    pub fn is_new(&self) -> bool {
        matches!(self.target, FormTarget::New { .. })
    }

    pub fn active_field(&self) -> FormField {
        FormField::ALL[self.active]
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.title.clone(),
            FormField::Description => self.description.clone(),
            FormField::Link => self.link.clone(),
            FormField::Type => self.task_type.to_string(),
            FormField::Priority => format!("P{}", self.priority),
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => return FormAction::Submit,
                KeyCode::Char('u') => {
                    if let Some(value) = self.text_mut() {
                        value.clear();
                    }
                    self.error = None;
                }
                _ => {}
            }
            return FormAction::None;
        }

        let field = self.active_field();
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Tab | KeyCode::Down | KeyCode::Enter => self.move_active(1),
            KeyCode::BackTab | KeyCode::Up => self.move_active(-1),
            KeyCode::Left => self.step(-1),
            KeyCode::Right => self.step(1),
            KeyCode::Char('h') if !field.is_text() => self.step(-1),
            KeyCode::Char('l') if !field.is_text() => self.step(1),
            KeyCode::Backspace => {
                if let Some(value) = self.text_mut() {
                    value.pop();
                }
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                let limit = match field {
                    FormField::Title => Some(TITLE_LIMIT),
                    FormField::Link => Some(LINK_LIMIT),
                    _ => None,
                };
                if let Some(value) = self.text_mut() {
                    if limit.map_or(true, |max| value.chars().count() < max) {
                        value.push(ch);
                    }
                }
            }
            _ => {}
        }

        self.error = None;
        FormAction::None
    }

    /// Build the task this form describes. `id` is used only for new tasks;
    /// edits keep the original ID, status, labels and dependencies.
    pub fn build(&self, id: impl Into<String>) -> Task {
        let mut task = match &self.target {
            FormTarget::New { status } => Task::new(id, "").with_status(*status),
            FormTarget::Edit { original, .. } => original.as_ref().clone(),
        };
        task.title = self.title.trim().to_string();
        task.description = self.description.clone();
        task.set_link(&self.link);
        task.task_type = self.task_type;
        task.priority = self.priority;
        task
    }

    fn move_active(&mut self, delta: isize) {
        let len = FormField::ALL.len() as isize;
        let next = (self.active as isize + delta).rem_euclid(len);
        self.active = next as usize;
    }

    fn step(&mut self, delta: isize) {
        match self.active_field() {
            FormField::Type => {
                self.task_type = if delta > 0 {
                    self.task_type.next()
                } else {
                    self.task_type.prev()
                };
            }
            FormField::Priority => {
                self.priority = if delta > 0 {
                    next_priority(self.priority)
                } else {
                    prev_priority(self.priority)
                };
            }
            _ => {}
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.active_field() {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Link => Some(&mut self.link),
            FormField::Type | FormField::Priority => None,
        }
    }
}
