//! Audit log section

use super::super::state::DashboardState;
use super::summary::render_empty;
use crate::presentation::{Listing, audit_view};

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Row, Table, TableState};

const TITLE: &str = "AUDITORÍA";

pub fn render_audit(f: &mut Frame, area: Rect, state: &DashboardState) {
    let rows = match audit_view(state.engine.audit_log()) {
        Listing::Empty(message) => return render_empty(f, area, TITLE, message),
        Listing::Rows(rows) => rows,
    };

    let table_rows: Vec<Row> = rows
        .into_iter()
        .map(|row| Row::new(vec![row.timestamp, row.operation, row.user, row.description]))
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(17),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Fill(1),
        ],
    )
    .header(
        Row::new(vec!["Fecha", "Operación", "Usuario", "Descripción"])
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
    f.render_stateful_widget(table, area, &mut table_state);
}
