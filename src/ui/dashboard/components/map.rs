//! Coverage map section
//!
//! Zones plotted on the world-map canvas, with a side list of record counts

use super::super::state::DashboardState;
use super::summary::render_empty;
use crate::presentation::{Listing, map_view};

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Map, MapResolution};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState};

const TITLE: &str = "MAPA DE BARRIOS";

pub fn render_map(f: &mut Frame, area: Rect, state: &DashboardState) {
    let view = map_view(state.engine.map_zones());
    let (points, bounds) = match (&view.points, view.bounds) {
        (Listing::Rows(points), Some(bounds)) => (points, bounds),
        (Listing::Empty(message), _) => return render_empty(f, area, TITLE, message),
        (Listing::Rows(_), None) => return,
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    // Circle radius scales with the record count, relative to the busiest zone.
    let max_count = points.iter().map(|p| p.count).max().unwrap_or(0).max(1) as f64;
    let span = (bounds.longitude.1 - bounds.longitude.0).max(bounds.latitude.1 - bounds.latitude.0);

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!("{} ({} registros)", TITLE, view.total_records))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .marker(Marker::Braille)
        .x_bounds([bounds.longitude.0, bounds.longitude.1])
        .y_bounds([bounds.latitude.0, bounds.latitude.1])
        .paint(|ctx| {
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: Color::DarkGray,
            });
            ctx.layer();
            for point in points {
                let (r, g, b) = point.color;
                let color = Color::Rgb(r, g, b);
                ctx.draw(&Circle {
                    x: point.longitude,
                    y: point.latitude,
                    radius: span * 0.01 + span * 0.04 * (point.count as f64 / max_count),
                    color,
                });
                ctx.print(
                    point.longitude,
                    point.latitude,
                    Line::from(Span::styled(
                        point.name.clone(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    )),
                );
            }
        });
    f.render_widget(canvas, chunks[0]);

    let items: Vec<ListItem> = points
        .iter()
        .map(|point| {
            let (r, g, b) = point.color;
            ListItem::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(Color::Rgb(r, g, b))),
                Span::raw(format!("{:<22}", point.name)),
                Span::styled(
                    format!("{:>5}", point.count),
                    Style::default().fg(Color::LightGreen),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title("BARRIOS")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut list_state = ListState::default().with_selected(Some(state.selected));
    f.render_stateful_widget(list, chunks[1], &mut list_state);
}
