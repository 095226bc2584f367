use std::collections::HashSet;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::store::TaskStore;
use crate::style::{style_for, StyleField, Tone};
use crate::task::Task;

use super::board::{Board, Column, Overlay, StatusKind};
use super::form::{FormField, FormState};
use super::viewer::ViewerState;

const HELP_KEY_WIDTH: usize = 10;
const LABEL_WIDTH: usize = 12;
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER: Color = Color::Rgb(92, 126, 166);
const COLOR_BORDER_FOCUS: Color = Color::Rgb(180, 156, 92);

/// One line in a column.
enum Row<'a> {
    Task {
        task: &'a Task,
        selected: bool,
        blocked: bool,
    },
    Empty,
}

pub fn render<S: TaskStore>(frame: &mut Frame, board: &Board<S>) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ]
            .as_ref(),
        )
        .split(chunks[0]);

    let blocked = board.blocked_ids();
    for (column, rect) in board.columns().iter().zip(columns.iter()) {
        let focused = column.status() == board.focus();
        render_column(frame, column, focused, &blocked, *rect);
    }
    render_footer(frame, board, chunks[1]);

    match board.overlay() {
        Overlay::Form(form) => render_form(frame, form, area),
        Overlay::Viewer(viewer) => render_viewer(frame, viewer, area),
        Overlay::None => {
            if board.show_help() {
                render_help(frame, area);
            }
        }
    }
}

fn render_column(
    frame: &mut Frame,
    column: &Column,
    focused: bool,
    blocked: &HashSet<String>,
    area: Rect,
) {
    let content_width = area.width.saturating_sub(2) as usize;
    let height = area.height.saturating_sub(2) as usize;
    let rows: Vec<Row<'_>> = if column.tasks().is_empty() {
        vec![Row::Empty]
    } else {
        column
            .tasks()
            .iter()
            .enumerate()
            .map(|(idx, task)| Row::Task {
                task,
                selected: focused && column.selected_index() == Some(idx),
                blocked: blocked.contains(&task.id),
            })
            .collect()
    };
    let (start, end) = list_window(rows.len(), column.selected_index(), height);
    let lines: Vec<Line<'static>> = rows[start..end]
        .iter()
        .map(|row| render_row(row, content_width))
        .collect();

    let status_hint = style_for(StyleField::Status(column.status()));
    let title = format!(
        " {} {} ({}) ",
        status_hint.symbol,
        column.status().column_title(),
        column.tasks().len()
    );
    let border = if focused {
        COLOR_BORDER_FOCUS
    } else {
        COLOR_BORDER
    };
    let mut title_style = Style::default().fg(tone_color(status_hint.tone));
    if focused {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(title, title_style))
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(widget, area);
}

fn render_row(row: &Row<'_>, width: usize) -> Line<'static> {
    let (task, selected, blocked) = match row {
        Row::Empty => {
            return Line::from(Span::styled(
                "No tasks",
                Style::default().fg(COLOR_MUTED_DARK),
            ))
        }
        Row::Task {
            task,
            selected,
            blocked,
        } => (*task, *selected, *blocked),
    };

    let type_hint = style_for(StyleField::Type(task.task_type));
    let priority_hint = style_for(StyleField::Priority(task.priority));
    let mut suffix = String::new();
    if let Some(first) = task.labels().first() {
        suffix.push_str(&format!(" #{first}"));
        if task.labels().len() > 1 {
            suffix.push_str(&format!(" +{}", task.labels().len() - 1));
        }
    }
    if !task.blocks().is_empty() {
        suffix.push_str(&format!(" blocks:{}", task.blocks().len()));
    }

    let used = 4 + priority_hint.symbol.len() + 1 + suffix.chars().count();
    let title = truncate_text(&task.title, width.saturating_sub(used));

    let base = if blocked {
        Style::default().fg(COLOR_MUTED_DARK)
    } else {
        Style::default().fg(COLOR_TEXT)
    };
    let mut title_style = base;
    if !task.link().is_empty() {
        title_style = title_style.add_modifier(Modifier::UNDERLINED);
    }
    let symbol_color = if blocked {
        COLOR_MUTED_DARK
    } else {
        tone_color(type_hint.tone)
    };

    let mut spans = vec![
        Span::styled(
            format!("[{}] ", type_hint.symbol),
            Style::default().fg(symbol_color),
        ),
        Span::styled(title, title_style),
    ];
    if !priority_hint.symbol.is_empty() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            priority_hint.symbol.to_string(),
            Style::default()
                .fg(tone_color(priority_hint.tone))
                .add_modifier(Modifier::BOLD),
        ));
    }
    if !suffix.is_empty() {
        spans.push(Span::styled(suffix, Style::default().fg(COLOR_MUTED)));
    }

    if selected {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }
    Line::from(spans)
}

fn render_footer<S: TaskStore>(frame: &mut Frame, board: &Board<S>, area: Rect) {
    let hint_span = Span::styled(board.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = if let Some((status, kind)) = board.status_line() {
        let status_style = match kind {
            StatusKind::Error => Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
            StatusKind::Info => Style::default().fg(COLOR_WARNING),
        };
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(status.to_string(), status_style),
        ])
    } else {
        Line::from(hint_span)
    };
    let widget = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(COLOR_BORDER)),
    );
    frame.render_widget(widget, area);
}

fn render_form(frame: &mut Frame, form: &FormState, area: Rect) {
    let modal = centered_rect(64, 11, area);
    frame.render_widget(Clear, modal);
    let width = modal.width.saturating_sub(2) as usize;
    let value_width = width.saturating_sub(LABEL_WIDTH + 1);

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let active = form.active_field() == field;
        let value = form.value(field);
        let shown = match field {
            FormField::Type | FormField::Priority => format!("< {value} >"),
            _ if active => format!("{value}_"),
            _ if value.is_empty() => "(optional)".to_string(),
            _ => value,
        };
        let shown = match field {
            FormField::Description => shown.replace('\n', " "),
            _ => shown,
        };
        let value_style = if active {
            Style::default().fg(COLOR_TEXT)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        let mut spans = vec![
            Span::styled(
                format!("{:<LABEL_WIDTH$}", field.label()),
                Style::default().fg(COLOR_ACCENT),
            ),
            Span::raw(" "),
            Span::styled(truncate_text(&shown, value_width), value_style),
        ];
        if active {
            for span in &mut spans {
                span.style = span.style.add_modifier(Modifier::REVERSED);
            }
        }
        lines.push(Line::from(spans));
    }
    if let Some(error) = form.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default()
                .fg(COLOR_ERROR)
                .add_modifier(Modifier::BOLD),
        )));
    }

    let title = if form.is_new() { " New Task " } else { " Edit Task " };
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(COLOR_BORDER_FOCUS)),
    );
    frame.render_widget(widget, modal);
}

fn render_viewer(frame: &mut Frame, viewer: &ViewerState, area: Rect) {
    let modal = centered_rect(72, area.height.saturating_sub(6), area);
    frame.render_widget(Clear, modal);
    let task = viewer.task();
    let status = style_for(StyleField::Status(task.status));
    let task_type = style_for(StyleField::Type(task.task_type));
    let priority = style_for(StyleField::Priority(task.priority));

    let mut lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(task.id.clone(), Style::default().fg(COLOR_MUTED)),
            Span::raw("  "),
            Span::styled(
                format!("{} {}", status.symbol, status.label),
                Style::default().fg(tone_color(status.tone)),
            ),
            Span::raw("  "),
            Span::styled(
                task_type.label.to_string(),
                Style::default().fg(tone_color(task_type.tone)),
            ),
            Span::raw("  "),
            Span::styled(
                priority.label.to_string(),
                Style::default().fg(tone_color(priority.tone)),
            ),
        ]),
    ];
    if !task.link().is_empty() {
        lines.push(Line::from(Span::styled(
            task.link().to_string(),
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::UNDERLINED),
        )));
    }
    if !task.labels().is_empty() {
        lines.push(Line::from(Span::styled(
            task.labels()
                .iter()
                .map(|label| format!("#{label}"))
                .collect::<Vec<_>>()
                .join(" "),
            Style::default().fg(COLOR_MUTED),
        )));
    }
    lines.push(Line::from(""));
    for line in viewer.description().lines() {
        lines.push(Line::from(line.to_string()));
    }

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Task ")
                .border_style(Style::default().fg(COLOR_BORDER_FOCUS)),
        )
        .wrap(Wrap { trim: false })
        .scroll((viewer.scroll(), 0));
    frame.render_widget(widget, modal);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let entries = [
        ("h/l", "previous/next column"),
        ("j/k", "move selection"),
        ("n", "new task in this column"),
        ("e", "edit task"),
        ("d", "delete task"),
        ("enter", "advance status"),
        ("v", "view task"),
        ("o", "open link"),
        ("?", "hide help"),
        ("q", "quit"),
    ];
    let modal = centered_rect(44, entries.len() as u16 + 4, area);
    frame.render_widget(Clear, modal);
    let width = modal.width.saturating_sub(2) as usize;

    let mut lines = vec![
        Line::from(Span::styled(
            "Keys",
            Style::default().fg(COLOR_INFO).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (keys, desc) in entries {
        lines.push(help_line(keys, desc, width));
    }
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER)),
    );
    frame.render_widget(widget, modal);
}

fn help_line(keys: &str, desc: &str, width: usize) -> Line<'static> {
    let desc_width = width.saturating_sub(HELP_KEY_WIDTH + 1);
    Line::from(vec![
        Span::styled(
            format!("{keys:<HELP_KEY_WIDTH$}"),
            Style::default()
                .fg(COLOR_ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(truncate_text(desc, desc_width), Style::default().fg(COLOR_MUTED)),
    ])
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Plain => COLOR_TEXT,
        Tone::Muted => COLOR_MUTED,
        Tone::Info => COLOR_INFO,
        Tone::Warning => COLOR_WARNING,
        Tone::Danger => COLOR_ERROR,
        Tone::Success => COLOR_SUCCESS,
        Tone::Accent => COLOR_ACCENT,
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}
