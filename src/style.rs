//! Symbol and tone lookup for status, priority and type values.
//!
//! Renderers map [`Tone`] onto their own palette; the CLI uses symbols only.

use crate::task::{priority_label, Status, TaskType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Muted,
    Info,
    Warning,
    Danger,
    Success,
    Accent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleField {
    Status(Status),
    /// A non-Done task with at least one open blocker.
    Blocked,
    Priority(u8),
    Type(TaskType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderHint {
    pub symbol: &'static str,
    pub label: &'static str,
    pub tone: Tone,
}

pub fn style_for(field: StyleField) -> RenderHint {
    match field {
        StyleField::Status(Status::Todo) => hint("○", "todo", Tone::Muted),
        StyleField::Status(Status::InProgress) => hint("●", "in-progress", Tone::Warning),
        StyleField::Status(Status::Done) => hint("●", "done", Tone::Success),
        StyleField::Blocked => hint("⊘", "blocked", Tone::Danger),
        StyleField::Priority(priority) => {
            let symbol = match priority {
                1 => "P1",
                2 => "P2",
                3 => "P3",
                4 => "P4",
                _ => "",
            };
            let tone = match priority {
                1 => Tone::Danger,
                2 => Tone::Warning,
                3 => Tone::Info,
                4 => Tone::Muted,
                _ => Tone::Plain,
            };
            hint(symbol, priority_label(priority), tone)
        }
        StyleField::Type(kind) => {
            let tone = match kind {
                TaskType::Task => Tone::Info,
                TaskType::Bug => Tone::Danger,
                TaskType::Feature => Tone::Success,
                TaskType::Chore => Tone::Muted,
                TaskType::Docs => Tone::Accent,
            };
            hint(kind.symbol(), kind.as_str(), tone)
        }
    }
}

fn hint(symbol: &'static str, label: &'static str, tone: Tone) -> RenderHint {
    RenderHint {
        symbol,
        label,
        tone,
    }
}
