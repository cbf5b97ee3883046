mod api;
mod cli_messages;
mod config;
mod consts;
mod dates;
mod engine;
mod environment;
mod events;
mod logging;
mod models;
mod presentation;
mod session;
mod ui;

use crate::models::{
    AppointmentStatus, CareRecord, DateRange, MapZone, NewAppointment, SearchFilters,
};
use crate::session::{HeadlessCommand, run_headless_mode, run_tui_mode, setup_session};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Backend base URL. Remembered for later runs.
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive dashboard
    Tui {
        /// Paint a dark background behind the dashboard
        #[arg(long, default_value_t = false)]
        with_background: bool,
    },
    /// Print the dashboard summary and the weekly schedule
    Dashboard,
    /// Search care records
    Search {
        #[arg(long)]
        numero: Option<String>,
        /// castracion or atencion_primaria
        #[arg(long)]
        tipo: Option<String>,
        #[arg(long)]
        especie: Option<String>,
        #[arg(long)]
        dni: Option<String>,
        #[arg(long)]
        barrio: Option<String>,
        #[arg(long, value_name = "FECHA")]
        desde: Option<String>,
        #[arg(long, value_name = "FECHA")]
        hasta: Option<String>,
    },
    /// Print one care record
    Show { numero: u32 },
    /// Create a care record, or update one with --edit
    Submit {
        /// JSON file with the record
        #[arg(long, value_name = "PATH")]
        file: PathBuf,
        /// Number of the record to replace
        #[arg(long, value_name = "NUMERO")]
        edit: Option<u32>,
    },
    /// Delete a care record
    Delete {
        numero: u32,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print statistics, optionally for a date range
    Stats {
        #[arg(long, value_name = "FECHA")]
        desde: Option<String>,
        #[arg(long, value_name = "FECHA")]
        hasta: Option<String>,
    },
    /// Print the audit log
    Audit,
    /// Download the spreadsheet export
    Export {
        /// Target directory (defaults to the configured one, then the current directory)
        #[arg(long, value_name = "PATH")]
        dir: Option<PathBuf>,
    },
    /// Manage appointments
    Turno {
        #[command(subcommand)]
        command: TurnoCommand,
    },
    /// Manage map zones
    Zones {
        #[command(subcommand)]
        command: ZonesCommand,
    },
    /// List registered neighborhoods and their record counts
    Barrios,
    /// Close the backend session and clear the local configuration
    Logout,
}

#[derive(Subcommand)]
enum TurnoCommand {
    /// Schedule an appointment
    Add {
        #[arg(long)]
        fecha: String,
        #[arg(long)]
        hora: String,
        #[arg(long)]
        animal: String,
        #[arg(long)]
        tutor: String,
        #[arg(long)]
        tipo: String,
        #[arg(long, default_value = "")]
        telefono: String,
        #[arg(long, default_value = "")]
        observaciones: String,
    },
    /// Change an appointment's status
    Status {
        id: u64,
        /// pendiente, completado or cancelado
        status: AppointmentStatus,
    },
    /// Delete an appointment
    Delete {
        id: u64,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ZonesCommand {
    /// List map zones with their record counts
    List,
    /// Create a zone, or replace one with --id
    Save {
        #[arg(long)]
        nombre: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Hex color, e.g. #6366f1
        #[arg(long)]
        color: String,
        #[arg(long)]
        id: Option<u64>,
    },
    /// Delete a zone
    Delete {
        id: u64,
        #[arg(long)]
        yes: bool,
    },
}

/// Reads a record in the backend's JSON shape.
fn read_record(path: &Path) -> Result<CareRecord, Box<dyn Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let record = serde_json::from_str(&contents)
        .map_err(|e| format!("Invalid record in {}: {}", path.display(), e))?;
    Ok(record)
}

/// Maps a one-shot command to its headless form. `Tui` has none.
fn headless_command(command: Command) -> Result<Option<HeadlessCommand>, Box<dyn Error>> {
    let headless = match command {
        Command::Tui { .. } => return Ok(None),
        Command::Dashboard => HeadlessCommand::Dashboard,
        Command::Search {
            numero,
            tipo,
            especie,
            dni,
            barrio,
            desde,
            hasta,
        } => HeadlessCommand::Search(SearchFilters {
            numero,
            tipo_atencion: tipo,
            especie,
            dni,
            barrio,
            fecha_desde: desde,
            fecha_hasta: hasta,
        }),
        Command::Show { numero } => HeadlessCommand::Show(numero),
        Command::Submit { file, edit } => HeadlessCommand::Submit {
            record: read_record(&file)?,
            edit,
        },
        Command::Delete { numero, yes } => HeadlessCommand::Delete {
            number: numero,
            yes,
        },
        Command::Stats { desde, hasta } => HeadlessCommand::Statistics(DateRange {
            from: desde,
            to: hasta,
        }),
        Command::Audit => HeadlessCommand::Audit,
        Command::Export { dir } => HeadlessCommand::Export(dir),
        Command::Turno { command } => match command {
            TurnoCommand::Add {
                fecha,
                hora,
                animal,
                tutor,
                tipo,
                telefono,
                observaciones,
            } => HeadlessCommand::AddAppointment(NewAppointment {
                date: fecha,
                time: hora,
                animal_name: animal,
                guardian_name: tutor,
                phone: telefono,
                kind: tipo,
                notes: observaciones,
            }),
            TurnoCommand::Status { id, status } => {
                HeadlessCommand::AppointmentStatus { id, status }
            }
            TurnoCommand::Delete { id, yes } => HeadlessCommand::DeleteAppointment { id, yes },
        },
        Command::Zones { command } => match command {
            ZonesCommand::List => HeadlessCommand::ListZones,
            ZonesCommand::Save {
                nombre,
                lat,
                lng,
                color,
                id,
            } => HeadlessCommand::SaveZone {
                zone: MapZone {
                    id: None,
                    name: nombre,
                    latitude: lat,
                    longitude: lng,
                    color,
                    derived_count: 0,
                },
                id,
            },
            ZonesCommand::Delete { id, yes } => HeadlessCommand::DeleteZone { id, yes },
        },
        Command::Barrios => HeadlessCommand::Neighborhoods,
        Command::Logout => HeadlessCommand::Logout,
    };
    Ok(Some(headless))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let with_background = match &args.command {
        Command::Tui { with_background } => Some(*with_background),
        // The dashboard shows notifications itself; elsewhere they go to stderr
        _ => {
            logging::init_stderr_logger();
            None
        }
    };

    let session = setup_session(args.api_url.as_deref())?;
    match headless_command(args.command)? {
        Some(command) => run_headless_mode(session, command).await,
        None => run_tui_mode(session, with_background.unwrap_or(false)).await,
    }
}
