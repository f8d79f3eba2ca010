//! Board views

pub mod products;
pub mod tasks;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::utils::centered_rect;

/// Help overlay shared by both views
fn draw_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    let lines = vec![
        Line::styled("Keys", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(""),
        Line::raw("j / k      move selection"),
        Line::raw("1-5        set state: Backlog, To Do, In Progress, Blocked, Done"),
        Line::raw("n          new task"),
        Line::raw("b          add a blocker to the selected task"),
        Line::raw("x          remove a blocker from the selected task"),
        Line::raw("d          delete the selected task"),
        Line::raw("r          refresh from the service"),
        Line::raw("Tab        switch between tasks and products"),
        Line::raw("Esc        dismiss prompts and messages"),
        Line::raw("q          quit"),
    ];
    let help = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Help "));
    frame.render_widget(Clear, area);
    frame.render_widget(help, area);
}
