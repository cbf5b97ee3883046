//! Weekly schedule section

use super::super::state::DashboardState;
use super::super::utils::status_color;
use super::summary::render_empty;
use crate::presentation::{DashboardView, Listing};

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState};

pub fn render_agenda(f: &mut Frame, area: Rect, state: &DashboardState, view: &DashboardView) {
    const TITLE: &str = "CRONOGRAMA SEMANAL";
    let days = match &view.week {
        Listing::Empty(message) => return render_empty(f, area, TITLE, message),
        Listing::Rows(days) => days,
    };

    // Day headers are not selectable; map the selection over appointment rows only.
    let mut items = Vec::new();
    let mut selected_item = None;
    let mut appointment_index = 0;
    for day in days {
        items.push(ListItem::new(Line::from(Span::styled(
            day.header.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))));
        for row in &day.rows {
            if appointment_index == state.selected {
                selected_item = Some(items.len());
            }
            items.push(ListItem::new(Line::from(vec![
                Span::raw(format!("  {:<6}", row.time)),
                Span::raw(format!("{:<16}", row.animal)),
                Span::styled(
                    format!("{:<20}", row.guardian),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(format!("{:<18}", row.kind)),
                Span::styled(
                    row.status.to_string(),
                    Style::default().fg(status_color(row.status)),
                ),
            ])));
            appointment_index += 1;
        }
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(TITLE)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut list_state = ListState::default().with_selected(selected_item);
    f.render_stateful_widget(list, area, &mut list_state);
}
