//! Products view: read-only catalog table

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use super::super::app::App;
use super::super::utils::truncate_str;
use crate::domain::{categories, Product};

/// Draw the products view
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
    draw_product_table(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);

    if app.show_help() {
        super::draw_help(frame);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let cats = categories(app.products());
    let summary = format!(
        "{} products in {} categories",
        app.products().len(),
        cats.len()
    );

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

fn draw_product_table(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app.products().iter().map(product_row).collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Products "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.products().is_empty() {
        state.select(Some(app.product_index()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn product_row(p: &Product) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(format!("#{:<4}", p.id), Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{:<30}", truncate_str(&p.name, 28))),
        Span::styled(format!("{:<14}", p.category), Style::default().fg(Color::Cyan)),
        Span::styled(format!("{:>9.2}  ", p.price), Style::default().fg(Color::Green)),
        Span::styled(
            truncate_str(&p.description, 44),
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let text = app
        .status_message()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "j/k move  Tab tasks  ? help  q quit".to_string());

    let bar = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}
