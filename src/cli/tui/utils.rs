//! Shared utilities for board views

use chrono::{DateTime, Utc};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncate_at = max_len.saturating_sub(3);
        let truncated: String = s.chars().take(truncate_at).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional due date as YYYY-MM-DD, "-" when unset
pub fn due_label(due: Option<&DateTime<Utc>>) -> String {
    match due {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

/// Centered sub-rectangle sized as percentages of the parent
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn truncate_short_string() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn truncate_exact_length() {
        assert_eq!(truncate_str("hello", 5), "hello");
    }

    #[test]
    fn truncate_long_string() {
        assert_eq!(truncate_str("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_empty_string() {
        assert_eq!(truncate_str("", 5), "");
    }

    #[test]
    fn due_label_formats_date_only() {
        let due = Utc.with_ymd_and_hms(2024, 12, 24, 18, 30, 0).unwrap();
        assert_eq!(due_label(Some(&due)), "2024-12-24");
        assert_eq!(due_label(None), "-");
    }

    #[test]
    fn centered_rect_stays_inside_parent() {
        let parent = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(50, 50, parent);
        assert!(inner.width <= parent.width);
        assert!(inner.height <= parent.height);
        assert!(inner.x >= parent.x && inner.y >= parent.y);
    }
}
