//! Dashboard header component
//!
//! Renders the title, the clock and the sync gauge

use super::super::state::DashboardState;
use crate::engine::Operation;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

const TRACKED_OPERATIONS: [Operation; 8] = [
    Operation::Dashboard,
    Operation::Search,
    Operation::NextNumber,
    Operation::RecordLookup,
    Operation::Statistics,
    Operation::AuditLog,
    Operation::Map,
    Operation::Neighborhoods,
];

/// Render header with title, clock and sync status.
pub fn render_header(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let header_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let title_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(header_chunks[0]);

    let version = env!("CARGO_PKG_VERSION");
    let title = Paragraph::new(format!("MARI · CLÍNICA VETERINARIA v{}", version))
        .alignment(Alignment::Left)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_type(BorderType::Thick),
        );
    f.render_widget(title, title_chunks[0]);

    let clock = Paragraph::new(state.clock_text().to_string())
        .alignment(Alignment::Right)
        .style(Style::default().fg(Color::LightCyan))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_type(BorderType::Thick),
        );
    f.render_widget(clock, title_chunks[1]);

    let loading: Vec<String> = TRACKED_OPERATIONS
        .iter()
        .filter(|op| state.engine.is_loading(**op))
        .map(|op| op.to_string())
        .collect();

    let (progress_text, gauge_color, progress_percent) = if loading.is_empty() {
        ("SINCRONIZADO".to_string(), Color::LightGreen, 100)
    } else {
        // Loops every 20 ticks while requests are in flight
        let progress = ((state.tick % 20) as f64 / 20.0 * 100.0) as u16;
        (
            format!("CARGANDO - {}", loading.join(", ")),
            Color::LightBlue,
            progress,
        )
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .gauge_style(
            Style::default()
                .fg(gauge_color)
                .add_modifier(Modifier::BOLD),
        )
        .percent(progress_percent)
        .label(progress_text);

    f.render_widget(gauge, header_chunks[1]);
}
