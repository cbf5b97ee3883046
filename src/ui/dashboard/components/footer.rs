//! Dashboard footer component
//!
//! Renders key hints for the current section and input mode

use super::super::state::{DashboardState, InputMode, Section};
use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

fn section_hints(section: Section) -> &'static str {
    match section {
        Section::Dashboard | Section::Agenda => {
            "[A] Nuevo turno [C] Completar [X] Cancelar [P] Pendiente [D] Eliminar turno"
        }
        Section::Search => "[/] Buscar [E] Editar [D] Eliminar",
        Section::Record => "[Enter] Editar formulario [N] Nuevo registro",
        Section::Statistics => "[F] Rango de fechas",
        Section::Audit => "",
        Section::Map => "[A] Nuevo barrio [E] Editar barrio [D] Eliminar barrio",
    }
}

/// Render footer.
pub fn render_footer(f: &mut Frame, area: ratatui::layout::Rect, state: &DashboardState) {
    let footer_text = match &state.input_mode {
        InputMode::Normal => format!(
            "[Q] Salir | [Tab/1-7] Sección | [R] Actualizar | [Shift+E] Exportar | [Shift+L] Cerrar sesión | {}",
            section_hints(state.section)
        ),
        InputMode::Prompt { .. } => "[Enter] Aceptar | [Esc] Cancelar".to_string(),
        InputMode::Form => {
            "[↑/↓] Campo | [Espacio] Cambiar tipo | [Enter] Guardar | [Esc] Salir del formulario"
                .to_string()
        }
        InputMode::Confirm(_) => "[S/Y] Confirmar | cualquier otra tecla cancela".to_string(),
    };

    let footer = Paragraph::new(footer_text)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_type(BorderType::Thick),
        );
    f.render_widget(footer, area);
}
