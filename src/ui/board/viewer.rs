use crossterm::event::{KeyCode, KeyEvent};

use crate::task::Task;

pub const EMPTY_DESCRIPTION: &str = "(no description)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    None,
    Close,
    Quit,
}

/// Read-only snapshot of one task.
#[derive(Debug, Clone)]
pub struct ViewerState {
    task: Task,
    scroll: u16,
}

impl ViewerState {
    pub fn new(task: &Task) -> Self {
        Self {
            task: task.clone(),
            scroll: 0,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn description(&self) -> &str {
        if self.task.description.trim().is_empty() {
            EMPTY_DESCRIPTION
        } else {
            &self.task.description
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewerAction {
        match key.code {
            KeyCode::Char('v') | KeyCode::Esc => ViewerAction::Close,
            KeyCode::Char('q') => ViewerAction::Quit,
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
                ViewerAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                ViewerAction::None
            }
            _ => ViewerAction::None,
        }
    }
}
