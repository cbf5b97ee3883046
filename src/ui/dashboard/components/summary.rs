//! Dashboard summary section
//!
//! Counters, today's appointments and the latest records

use super::super::state::DashboardState;
use super::super::utils::status_color;
use crate::presentation::{DashboardView, Listing};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState};

fn section_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
}

/// Paragraph shown in place of an empty list.
pub fn render_empty(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(section_block(title));
    f.render_widget(paragraph, area);
}

pub fn render_summary(f: &mut Frame, area: Rect, state: &DashboardState, view: &DashboardView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ])
        .split(area);

    render_counters(f, chunks[0], view);
    render_today(f, chunks[1], state, view);
    render_recent(f, chunks[2], view);
}

fn render_counters(f: &mut Frame, area: Rect, view: &DashboardView) {
    let constraints: Vec<Constraint> = view
        .counters
        .iter()
        .map(|_| Constraint::Ratio(1, view.counters.len() as u32))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (counter, cell) in view.counters.iter().zip(cells.iter()) {
        let text = vec![
            Line::from(Span::styled(
                counter.value.to_string(),
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                counter.label,
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(paragraph, *cell);
    }
}

fn render_today(f: &mut Frame, area: Rect, state: &DashboardState, view: &DashboardView) {
    const TITLE: &str = "TURNOS DE HOY";
    let rows = match &view.today {
        Listing::Empty(message) => return render_empty(f, area, TITLE, message),
        Listing::Rows(rows) => rows,
    };

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Span::raw(row.time.clone()),
                Span::raw(row.animal.clone()),
                Span::raw(row.guardian.clone()),
                Span::raw(row.kind.clone()),
                Span::styled(
                    row.status.to_string(),
                    Style::default().fg(status_color(row.status)),
                ),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(6),
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(18),
            Constraint::Length(11),
        ],
    )
    .header(
        Row::new(vec!["Hora", "Animal", "Tutor", "Tipo", "Estado"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray))
    .block(section_block(TITLE));

    let mut table_state = TableState::default().with_selected(Some(state.selected));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn render_recent(f: &mut Frame, area: Rect, view: &DashboardView) {
    const TITLE: &str = "ÚLTIMAS ATENCIONES";
    let rows = match &view.recent {
        Listing::Empty(message) => return render_empty(f, area, TITLE, message),
        Listing::Rows(rows) => rows,
    };

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            Row::new(vec![
                format!("#{}", row.number),
                row.date.clone(),
                row.kind.to_string(),
                row.animal.clone(),
                row.species.clone(),
                row.guardian.clone(),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(6),
            Constraint::Length(11),
            Constraint::Length(18),
            Constraint::Fill(1),
            Constraint::Length(10),
            Constraint::Fill(1),
        ],
    )
    .header(
        Row::new(vec!["N°", "Fecha", "Tipo", "Animal", "Especie", "Tutor"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(section_block(TITLE));

    f.render_widget(table, area);
}
