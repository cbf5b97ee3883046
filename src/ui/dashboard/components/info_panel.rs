//! Dashboard info panel component
//!
//! Renders session information

use crate::engine::EditMode;
use crate::environment::Environment;

use super::super::state::DashboardState;
use ratatui::Frame;
use ratatui::prelude::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap};

/// Render info panel.
pub fn render_info_panel(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let mut info_lines = Vec::new();

    // Environment with color coding
    let env_color = match state.environment {
        Environment::Production => Color::Green,
        Environment::Local => Color::LightBlue,
        Environment::Custom { .. } => Color::Yellow,
    };
    info_lines.push(Line::from(vec![Span::styled(
        format!("Entorno: {}", state.environment),
        Style::default().fg(env_color),
    )]));
    info_lines.push(Line::from(vec![Span::styled(
        state.environment.api_url(),
        Style::default().fg(Color::DarkGray),
    )]));

    let version = env!("CARGO_PKG_VERSION");
    info_lines.push(Line::from(vec![Span::styled(
        format!("Versión: {}", version),
        Style::default().fg(Color::Cyan),
    )]));

    let uptime = state.start_time.elapsed();
    let uptime_string = if uptime.as_secs() >= 3600 {
        format!(
            "Sesión: {}h {}m",
            uptime.as_secs() / 3600,
            (uptime.as_secs() % 3600) / 60
        )
    } else {
        format!(
            "Sesión: {}m {}s",
            uptime.as_secs() / 60,
            uptime.as_secs() % 60
        )
    };
    info_lines.push(Line::from(vec![Span::styled(
        uptime_string,
        Style::default().fg(Color::LightGreen),
    )]));

    let next_number = state
        .engine
        .next_number()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());
    info_lines.push(Line::from(vec![Span::styled(
        format!("Próximo número: {}", next_number),
        Style::default().fg(Color::LightYellow),
    )]));

    let (mode_text, mode_color) = match state.engine.edit_mode() {
        EditMode::Idle => ("Modo: nuevo registro".to_string(), Color::Gray),
        EditMode::Editing(number) => (format!("Modo: editando #{}", number), Color::LightMagenta),
    };
    info_lines.push(Line::from(vec![Span::styled(
        mode_text,
        Style::default().fg(mode_color),
    )]));

    let info_block = Block::default()
        .title("SESIÓN")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::uniform(1));

    let info_paragraph = Paragraph::new(info_lines)
        .block(info_block)
        .wrap(Wrap { trim: true });
    f.render_widget(info_paragraph, area);
}
