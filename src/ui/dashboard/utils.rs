//! Dashboard utility functions
//!
//! Contains helper functions used across dashboard components

use crate::events::{EventType, Topic};
use crate::logging::LogLevel;
use crate::models::AppointmentStatus;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::Color;

/// Get a ratatui color for an event based on the area it came from
pub fn get_topic_color(topic: &Topic) -> Color {
    match topic {
        Topic::Dashboard | Topic::Appointments => Color::Cyan,
        Topic::Search | Topic::Records => Color::LightBlue,
        Topic::Statistics | Topic::Audit => Color::Yellow,
        Topic::Map => Color::Magenta,
        Topic::Export | Topic::Session => Color::Green,
    }
}

pub fn status_color(status: AppointmentStatus) -> Color {
    match status {
        AppointmentStatus::Pending => Color::Yellow,
        AppointmentStatus::Completed => Color::Green,
        AppointmentStatus::Cancelled => Color::Red,
    }
}

pub fn event_icon(event_type: EventType, log_level: LogLevel) -> &'static str {
    match (event_type, log_level) {
        (EventType::Success, _) => "✅",
        (EventType::Error, LogLevel::Warn) => "⚠",
        (EventType::Error, _) => "❌",
        (EventType::Info, _) => "ℹ",
        (EventType::Refresh, _) => "↻",
    }
}

/// Format compact timestamp with date and time from full timestamp
pub fn format_compact_timestamp(timestamp: &str) -> String {
    // Extract from "YYYY-MM-DD HH:MM:SS" format
    if let Some((date_part, time_part)) = timestamp.split_once(' ') {
        if let (Some(month_day), Some(hour_min)) = (date_part.get(5..10), time_part.get(0..5)) {
            return format!("{} {}", month_day, hour_min);
        }
    }
    timestamp.to_string()
}

/// A `percent_x` by `percent_y` rectangle centered in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
