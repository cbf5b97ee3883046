//! Floating widgets: transient notifications, confirmation dialog and the
//! one-line prompts outside the search section.

use super::super::state::{DashboardState, InputMode, PromptKind};
use super::super::utils::centered_rect;
use crate::events::EventType;

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

const TOAST_WIDTH: u16 = 48;
const TOAST_HEIGHT: u16 = 3;

/// Stacks active notifications in the top-right corner of `area`, newest on top.
pub fn render_notifications(f: &mut Frame, area: Rect, state: &DashboardState) {
    let width = TOAST_WIDTH.min(area.width);
    for (i, event) in state.engine.notifier().active().rev().enumerate() {
        let y = area.y + (i as u16) * TOAST_HEIGHT;
        if y + TOAST_HEIGHT > area.y + area.height {
            break;
        }
        let rect = Rect::new(area.x + area.width - width, y, width, TOAST_HEIGHT);
        let color = match event.event_type {
            EventType::Success => Color::Green,
            EventType::Error => Color::Red,
            EventType::Info | EventType::Refresh => Color::Blue,
        };
        let toast = Paragraph::new(event.msg.clone())
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(color)),
            );
        f.render_widget(Clear, rect);
        f.render_widget(toast, rect);
    }
}

pub fn render_dialogs(f: &mut Frame, area: Rect, state: &DashboardState) {
    match &state.input_mode {
        InputMode::Confirm(action) => {
            let rect = centered_rect(50, 20, area);
            let dialog = Paragraph::new(format!("{}\n\n[S] Sí    [N] No", action.prompt()))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title("CONFIRMAR")
                        .borders(Borders::ALL)
                        .border_type(BorderType::Thick)
                        .border_style(Style::default().fg(Color::LightYellow)),
                )
                .style(Style::default().add_modifier(Modifier::BOLD));
            f.render_widget(Clear, rect);
            f.render_widget(dialog, rect);
        }
        InputMode::Prompt { kind, buffer } if *kind != PromptKind::Search => {
            let rect = centered_rect(70, 15, area);
            let prompt = Paragraph::new(format!("{}▏", buffer))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .title(kind.title())
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(Color::LightYellow)),
                );
            f.render_widget(Clear, rect);
            f.render_widget(prompt, rect);
        }
        _ => {}
    }
}
