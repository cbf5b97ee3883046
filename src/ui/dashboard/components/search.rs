//! Record search section

use super::super::state::{DashboardState, InputMode, PromptKind};
use super::summary::render_empty;
use crate::presentation::{SearchView, search_view};

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState};

const TITLE: &str = "RESULTADOS";

pub fn render_search(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Fill(1)])
        .split(area);

    let (filter_text, filter_style) = match &state.input_mode {
        InputMode::Prompt {
            kind: PromptKind::Search,
            buffer,
        } => (format!("{}▏", buffer), Style::default().fg(Color::White)),
        _ => {
            let pairs = state.engine.last_filters().pairs();
            let text = if pairs.is_empty() {
                "numero= tipo= especie= dni= barrio= desde= hasta=".to_string()
            } else {
                pairs
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            (text, Style::default().fg(Color::DarkGray))
        }
    };
    let filters = Paragraph::new(filter_text).style(filter_style).block(
        Block::default()
            .title("FILTROS")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(filters, chunks[0]);

    let rows = match search_view(state.engine.search_state()) {
        SearchView::NotSearched(message) | SearchView::NoResults(message) => {
            return render_empty(f, chunks[1], TITLE, message);
        }
        SearchView::Results(rows) => rows,
    };

    let table_rows: Vec<Row> = rows
        .into_iter()
        .map(|row| {
            Row::new(vec![
                format!("#{}", row.number),
                row.date,
                row.kind.to_string(),
                format!("{} ({}, {})", row.animal, row.species, row.sex),
                row.age,
                format!("{} - DNI {}", row.guardian, row.national_id),
                row.phone,
                row.address,
                row.neighborhood,
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(6),
            Constraint::Length(11),
            Constraint::Length(18),
            Constraint::Fill(2),
            Constraint::Length(15),
            Constraint::Fill(2),
            Constraint::Length(14),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ],
    )
    .header(
        Row::new(vec![
            "N°", "Fecha", "Tipo", "Animal", "Edad", "Tutor", "Teléfono", "Dirección", "Barrio",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray))
    .block(
        Block::default()
            .title(TITLE)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    let mut table_state = TableState::default().with_selected(Some(state.selected));
    f.render_stateful_widget(table, chunks[1], &mut table_state);
}
