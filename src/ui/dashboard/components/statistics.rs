//! Statistics section
//!
//! Bar charts built from the grouped counts

use super::super::state::DashboardState;
use super::summary::render_empty;
use crate::presentation::statistics_view;
use crate::presentation::views::Bar;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{BarChart, Block, BorderType, Borders};

const TITLE: &str = "ESTADÍSTICAS";

fn chart<'a>(title: String, data: &'a [(&'a str, u64)], color: Color) -> BarChart<'a> {
    BarChart::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .data(data)
        .bar_width(9)
        .bar_gap(1)
        .bar_style(Style::default().fg(color))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        )
}

fn pairs(bars: &[Bar]) -> Vec<(&str, u64)> {
    bars.iter().map(|bar| (bar.label.as_str(), bar.value)).collect()
}

pub fn render_statistics(f: &mut Frame, area: Rect, state: &DashboardState) {
    let Some(stats) = state.engine.statistics() else {
        return render_empty(f, area, TITLE, "Cargando estadísticas...");
    };
    let view = statistics_view(stats);

    let range = state.engine.stats_range();
    let range_text = match (&range.from, &range.to) {
        (None, None) => "todo el período".to_string(),
        (from, to) => format!(
            "{} a {}",
            from.as_deref().unwrap_or("inicio"),
            to.as_deref().unwrap_or("hoy")
        ),
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
        ])
        .split(rows[0]);

    let by_type = pairs(&view.by_type);
    let by_species = pairs(&view.by_species);
    let by_sex = pairs(&view.by_sex);
    let by_month = pairs(&view.by_month);
    let neighborhoods = pairs(&view.top_neighborhoods);

    f.render_widget(
        chart(
            format!("TOTAL {} ({})", view.total, range_text),
            &by_type,
            Color::LightGreen,
        ),
        top[0],
    );
    f.render_widget(
        chart("ESPECIE".to_string(), &by_species, Color::LightBlue),
        top[1],
    );
    f.render_widget(chart("SEXO".to_string(), &by_sex, Color::LightMagenta), top[2]);
    f.render_widget(
        chart("POR MES".to_string(), &by_month, Color::Yellow),
        top[3],
    );
    f.render_widget(
        chart(
            "TOP 10 BARRIOS".to_string(),
            &neighborhoods,
            Color::LightCyan,
        ),
        rows[1],
    );
}
