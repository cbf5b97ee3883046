//! Record entry section

use super::super::state::{DashboardState, InputMode};
use crate::engine::EditMode;
use crate::models::AttentionType;
use crate::presentation::FormField;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};

pub fn render_record_form(f: &mut Frame, area: Rect, state: &DashboardState) {
    let form = state.engine.form();
    let typing = state.input_mode == InputMode::Form;

    let lines: Vec<Line> = form
        .visible_fields()
        .into_iter()
        .map(|field| {
            let focused = typing && field == form.focus();
            let raw = form.get(field);
            let value = match field {
                FormField::AttentionType => AttentionType::label_for(raw),
                _ => raw.to_string(),
            };
            let cursor = if focused { "▏" } else { "" };
            let label_style = if focused {
                Style::default()
                    .fg(Color::LightYellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(format!("{:>18}: ", field.to_string()), label_style),
                Span::raw(format!("{}{}", value, cursor)),
            ])
        })
        .collect();

    let title = match state.engine.edit_mode() {
        EditMode::Idle => "NUEVA ATENCIÓN".to_string(),
        EditMode::Editing(number) => format!("EDITANDO REGISTRO #{}", number),
    };
    let border_color = if typing { Color::LightYellow } else { Color::Cyan };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .padding(Padding::horizontal(1)),
    );
    f.render_widget(paragraph, area);
}
