//! Dashboard main renderer

use super::components::{
    agenda, audit, footer, header, info_panel, logs, map, overlays, record_form, search,
    statistics, summary,
};
use super::state::{DashboardState, Section};
use crate::presentation::dashboard_view;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Tabs};
use strum::IntoEnumIterator;

pub fn render_dashboard(f: &mut Frame, state: &DashboardState) {
    if state.with_background_color {
        f.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(16, 20, 24))),
            f.area(),
        );
    }

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(2),
        ])
        .margin(1)
        .split(f.area());

    header::render_header(f, main_chunks[0], state);

    let titles: Vec<String> = Section::iter()
        .enumerate()
        .map(|(i, section)| format!("{} {}", i + 1, section))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.section.index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, main_chunks[1]);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(main_chunks[2]);

    let snapshot = state.engine.snapshot();
    match state.section {
        Section::Dashboard => {
            summary::render_summary(f, content_chunks[0], state, &dashboard_view(&snapshot))
        }
        Section::Agenda => {
            agenda::render_agenda(f, content_chunks[0], state, &dashboard_view(&snapshot))
        }
        Section::Search => search::render_search(f, content_chunks[0], state),
        Section::Record => record_form::render_record_form(f, content_chunks[0], state),
        Section::Statistics => statistics::render_statistics(f, content_chunks[0], state),
        Section::Audit => audit::render_audit(f, content_chunks[0], state),
        Section::Map => map::render_map(f, content_chunks[0], state),
    }

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Fill(1)])
        .split(content_chunks[1]);
    info_panel::render_info_panel(f, side_chunks[0], state);
    logs::render_logs_panel(f, side_chunks[1], state);

    footer::render_footer(f, main_chunks[3], state);

    overlays::render_notifications(f, main_chunks[2], state);
    overlays::render_dialogs(f, f.area(), state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ViewSyncEngine;
    use crate::environment::Environment;
    use crate::ui::app::UIConfig;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Instant;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn every_section_renders_without_data() {
        let mut state = DashboardState::new(
            ViewSyncEngine::new(),
            Environment::Local,
            Instant::now(),
            UIConfig::new(true, std::env::temp_dir()),
        );
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        for section in Section::iter() {
            state.section = section;
            terminal.draw(|f| render_dashboard(f, &state)).unwrap();
        }
    }

    #[test]
    fn empty_dashboard_shows_empty_states() {
        let state = DashboardState::new(
            ViewSyncEngine::new(),
            Environment::Local,
            Instant::now(),
            UIConfig::new(false, std::env::temp_dir()),
        );
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|f| render_dashboard(f, &state)).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("No hay turnos programados para hoy"));
        assert!(text.contains("No hay atenciones recientes"));
    }
}
