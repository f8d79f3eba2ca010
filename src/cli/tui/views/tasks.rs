//! Tasks view: task table with a detail panel

use chrono::{DateTime, Utc};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::super::app::{App, ConfirmAction, InputMode, OpStatus};
use super::super::utils::{due_label, truncate_str};
use crate::domain::{check_add_blocker, Task, TaskState};

/// Draw the tasks view
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    draw_task_table(frame, app, body[0]);
    draw_detail(frame, app, body[1]);
    draw_status_bar(frame, app, chunks[2]);

    if app.show_help() {
        super::draw_help(frame);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let open = app.tasks().iter().filter(|t| !t.state.is_done()).count();
    let mut summary = format!(
        "{} tasks, {} open, {} overdue",
        app.tasks().len(),
        open,
        app.overdue_count()
    );
    if app.refreshing() {
        summary.push_str("  [refreshing]");
    }
    if app.creating() {
        summary.push_str("  [creating]");
    }

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "taskdeck",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(summary, Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_task_table(frame: &mut Frame, app: &App, area: Rect) {
    let now = Utc::now();
    let items: Vec<ListItem> = app
        .tasks()
        .iter()
        .map(|t| task_row(app, t, now))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Tasks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.tasks().is_empty() {
        state.select(Some(app.task_index()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// One table row: op marker, id, state, due date, title
fn task_row(app: &App, task: &Task, now: DateTime<Utc>) -> ListItem<'static> {
    let marker = match app.op_status(task.id) {
        Some(OpStatus::Pending) => Span::styled("* ", Style::default().fg(Color::Yellow)),
        Some(OpStatus::Failed) => Span::styled("! ", Style::default().fg(Color::Red)),
        None => Span::raw("  "),
    };
    let due_style = if task.is_overdue(now) {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    ListItem::new(Line::from(vec![
        marker,
        Span::styled(format!("#{:<5}", task.id), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:<12}", task.state.label()),
            state_style(task.state),
        ),
        Span::styled(format!("{:<12}", due_label(task.due_date.as_ref())), due_style),
        Span::raw(truncate_str(&task.title, 48)),
    ]))
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Details ");

    let Some(task) = app.selected_task() else {
        frame.render_widget(Paragraph::new("No task selected").block(block), area);
        return;
    };

    let label_style = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::styled(
            task.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(vec![
            Span::styled("State:   ", label_style),
            Span::styled(task.state.label(), state_style(task.state)),
        ]),
        Line::from(vec![
            Span::styled("Due:     ", label_style),
            Span::raw(due_label(task.due_date.as_ref())),
        ]),
        Line::from(vec![
            Span::styled("Created: ", label_style),
            Span::raw(task.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]),
    ];
    if let Some(done) = task.completed_at {
        lines.push(Line::from(vec![
            Span::styled("Done at: ", label_style),
            Span::raw(done.format("%Y-%m-%d %H:%M").to_string()),
        ]));
    }

    match app.op_status(task.id) {
        Some(OpStatus::Pending) => lines.push(Line::styled(
            "Request in flight...",
            Style::default().fg(Color::Yellow),
        )),
        Some(OpStatus::Failed) => lines.push(Line::styled(
            "Last request failed",
            Style::default().fg(Color::Red),
        )),
        None => {}
    }

    if let Some(desc) = &task.description {
        lines.push(Line::raw(""));
        lines.push(Line::raw(truncate_str(desc, 300)));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Blocked by:", label_style));
    push_link_lines(&mut lines, &task.blockers, app);
    lines.push(Line::styled("Blocks:", label_style));
    push_link_lines(&mut lines, &task.dependents, app);

    // While the add-blocker prompt is open, list ids the check would accept
    if let InputMode::AddBlocker(_) = app.input_mode() {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Available:", label_style));
        let mut shown = 0;
        for candidate in app.tasks() {
            if check_add_blocker(task, candidate.id).is_err() {
                continue;
            }
            if shown == 5 {
                lines.push(Line::raw("  ..."));
                break;
            }
            lines.push(Line::raw(format!(
                "  #{} {}",
                candidate.id,
                truncate_str(&candidate.title, 32)
            )));
            shown += 1;
        }
        if shown == 0 {
            lines.push(Line::raw("  (none)"));
        }
    }

    let detail = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(detail, area);
}

fn push_link_lines(lines: &mut Vec<Line<'static>>, ids: &[i64], app: &App) {
    if ids.is_empty() {
        lines.push(Line::raw("  (none)"));
        return;
    }
    for id in ids {
        let title = app.task_title(*id).unwrap_or("(unknown)");
        lines.push(Line::raw(format!("  #{} {}", id, truncate_str(title, 36))));
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match app.input_mode() {
        InputMode::NewTask(buf) => (
            format!("New task title: {}_", buf),
            Style::default().fg(Color::Yellow),
        ),
        InputMode::AddBlocker(buf) => {
            let id = app.selected_task().map(|t| t.id).unwrap_or_default();
            (
                format!("Add blocker to #{}: {}_", id, buf),
                Style::default().fg(Color::Yellow),
            )
        }
        InputMode::RemoveBlocker(buf) => {
            let id = app.selected_task().map(|t| t.id).unwrap_or_default();
            (
                format!("Remove blocker from #{}: {}_", id, buf),
                Style::default().fg(Color::Yellow),
            )
        }
        InputMode::Confirm(ConfirmAction::DeleteTask(id)) => (
            format!("Delete task #{}? (y/n)", id),
            Style::default().fg(Color::Red),
        ),
        InputMode::Normal => match app.status_message() {
            Some(msg) => (msg.to_string(), Style::default().fg(Color::Cyan)),
            None => (
                "j/k move  1-5 state  n new  b block  x unblock  d delete  r refresh  Tab view  ? help  q quit"
                    .to_string(),
                Style::default().fg(Color::DarkGray),
            ),
        },
    };

    let bar = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn state_style(state: TaskState) -> Style {
    let color = match state {
        TaskState::Backlog => Color::DarkGray,
        TaskState::Todo => Color::White,
        TaskState::InProgress => Color::Yellow,
        TaskState::Blocked => Color::Red,
        TaskState::Done => Color::Green,
    };
    Style::default().fg(color)
}
