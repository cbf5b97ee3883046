//! Dashboard state management
//!
//! Contains the main dashboard state struct and related enums

use crate::consts::cli_consts::ui;
use crate::dates::format_clock;
use crate::engine::ViewSyncEngine;
use crate::environment::Environment;
use crate::ui::app::UIConfig;

use chrono::Local;
use std::path::PathBuf;
use std::time::Instant;

/// Top-level sections, in tab order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::EnumIter, strum::Display)]
pub enum Section {
    #[strum(to_string = "Dashboard")]
    Dashboard,
    #[strum(to_string = "Agenda")]
    Agenda,
    #[strum(to_string = "Búsqueda")]
    Search,
    #[strum(to_string = "Registro")]
    Record,
    #[strum(to_string = "Estadísticas")]
    Statistics,
    #[strum(to_string = "Auditoría")]
    Audit,
    #[strum(to_string = "Mapa")]
    Map,
}

impl Section {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// What a one-line prompt is collecting.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PromptKind {
    /// `key=value` search filters
    Search,
    /// `desde=YYYY-MM-DD hasta=YYYY-MM-DD`
    StatsRange,
    /// New appointment fields
    Appointment,
    /// Map zone fields; `Some(id)` edits an existing zone.
    Zone(Option<u64>),
}

impl PromptKind {
    /// Title of the floating prompt box; the search prompt renders inline.
    pub fn title(self) -> &'static str {
        match self {
            PromptKind::Search => "BUSCAR",
            PromptKind::StatsRange => "RANGO (desde=AAAA-MM-DD hasta=AAAA-MM-DD)",
            PromptKind::Appointment => {
                "NUEVO TURNO (fecha= hora= animal= tutor= tipo= [telefono=] [obs=])"
            }
            PromptKind::Zone(None) => "NUEVO BARRIO (nombre= lat= lng= [color=])",
            PromptKind::Zone(Some(_)) => "EDITAR BARRIO (nombre= lat= lng= color=)",
        }
    }
}

/// Destructive action waiting for a yes/no answer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PendingAction {
    DeleteRecord(u32),
    DeleteAppointment(u64),
    DeleteZone(u64),
    Logout,
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::DeleteRecord(number) => {
                format!("¿Está seguro que desea eliminar el registro #{}?", number)
            }
            PendingAction::DeleteAppointment(_) => {
                "¿Está seguro que desea eliminar este turno?".to_string()
            }
            PendingAction::DeleteZone(_) => {
                "¿Está seguro que desea eliminar este barrio del mapa?".to_string()
            }
            PendingAction::Logout => "¿Está seguro que desea cerrar sesión?".to_string(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InputMode {
    Normal,
    Prompt { kind: PromptKind, buffer: String },
    /// Typing into the record form.
    Form,
    Confirm(PendingAction),
}

/// Dashboard state: the engine plus everything that only matters on screen.
#[derive(Debug)]
pub struct DashboardState {
    /// Sole owner of fetched data.
    pub engine: ViewSyncEngine,
    /// The environment in which the application is running.
    pub environment: Environment,
    /// The start time of the application, used for computing uptime.
    pub start_time: Instant,
    /// Whether to enable background colors
    pub with_background_color: bool,
    /// Where exports are written.
    pub export_dir: PathBuf,
    pub section: Section,
    pub input_mode: InputMode,
    /// Highlighted row of the current section's list.
    pub selected: usize,
    /// Animation tick counter
    pub tick: usize,
    /// Set once logout completes; the session clears the config on exit.
    pub logged_out: bool,

    clock_text: String,
    last_clock_update: Instant,
}

impl DashboardState {
    pub fn new(
        engine: ViewSyncEngine,
        environment: Environment,
        start_time: Instant,
        ui_config: UIConfig,
    ) -> Self {
        Self {
            engine,
            environment,
            start_time,
            with_background_color: ui_config.with_background_color,
            export_dir: ui_config.export_dir,
            section: Section::Dashboard,
            input_mode: InputMode::Normal,
            selected: 0,
            tick: 0,
            logged_out: false,
            clock_text: format_clock(Local::now().naive_local()),
            last_clock_update: Instant::now(),
        }
    }

    pub fn clock_text(&self) -> &str {
        &self.clock_text
    }

    /// Refreshes the header clock once per `CLOCK_INTERVAL_MS`.
    pub fn refresh_clock(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_clock_update) >= ui::clock_interval() {
            self.clock_text = format_clock(Local::now().naive_local());
            self.last_clock_update = now;
        }
    }
}
