//! Headless mode execution
//!
//! One-shot commands drive the same engine operations as the dashboard,
//! print the resulting view as plain text and report engine notifications
//! as tagged console lines.

use super::SessionData;
use crate::api::Backend;
use crate::config::Config;
use crate::engine::{Confirm, EditMode, SyncRequest, ViewSyncEngine};
use crate::events::EventType;
use crate::models::{
    AppointmentStatus, CareRecord, DateRange, MapZone, NewAppointment, SearchFilters,
};
use crate::presentation::views::{MapView, NeighborhoodRow, SearchView, StatisticsView};
use crate::presentation::{
    DashboardView, Listing, audit_view, dashboard_view, map_view, neighborhoods_view,
    record_detail, search_view, statistics_view,
};
use crate::{print_cmd_error, print_cmd_info, print_cmd_success};
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

/// A single headless operation, already parsed from the command line.
#[derive(Debug, Clone)]
pub enum HeadlessCommand {
    Dashboard,
    Search(SearchFilters),
    Show(u32),
    Submit {
        record: CareRecord,
        edit: Option<u32>,
    },
    Delete {
        number: u32,
        yes: bool,
    },
    Statistics(DateRange),
    Audit,
    Export(Option<PathBuf>),
    AddAppointment(NewAppointment),
    AppointmentStatus {
        id: u64,
        status: AppointmentStatus,
    },
    DeleteAppointment {
        id: u64,
        yes: bool,
    },
    ListZones,
    SaveZone {
        zone: MapZone,
        id: Option<u64>,
    },
    DeleteZone {
        id: u64,
        yes: bool,
    },
    Neighborhoods,
    Logout,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0} request(s) failed")]
    RequestsFailed(usize),
}

/// Asks on the terminal; anything but an explicit yes declines.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [s/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(
            answer.trim().to_lowercase().as_str(),
            "s" | "si" | "sí" | "y" | "yes"
        )
    }
}

/// Runs the application in headless mode
///
/// Executes `command`, prints its output and every notification it raised.
/// Fails when any request failed, so scripts can check the exit status.
pub async fn run_headless_mode(
    session: SessionData,
    command: HeadlessCommand,
) -> Result<(), Box<dyn Error>> {
    let mut engine = ViewSyncEngine::new();
    let logging_out = matches!(command, HeadlessCommand::Logout);

    let output = run_command(
        &mut engine,
        session.backend.as_ref(),
        command,
        &session.export_dir,
        &StdinConfirm,
    )
    .await;
    if let Some(output) = output {
        println!("{}", output);
    }

    if logging_out {
        Config::clear(&session.config_path)?;
    }

    let failures = report_notifications(&mut engine);
    if failures > 0 {
        return Err(Box::new(CommandError::RequestsFailed(failures)));
    }
    Ok(())
}

/// Prints the notifications raised so far. Returns how many were errors.
fn report_notifications(engine: &mut ViewSyncEngine) -> usize {
    let mut failures = 0;
    for event in engine.notifier_mut().drain_undelivered() {
        match event.event_type {
            EventType::Success => print_cmd_success!(&event.msg, ""),
            EventType::Info => print_cmd_info!(&event.msg, ""),
            EventType::Error => {
                failures += 1;
                print_cmd_error!(&event.msg);
            }
            // Already forwarded to the log facade
            EventType::Refresh => {}
        }
    }
    failures
}

/// Executes one request; refreshes it triggers are for live views and are skipped.
async fn execute(engine: &mut ViewSyncEngine, backend: &dyn Backend, request: SyncRequest) {
    let follow_ups = engine.dispatch(backend, request).await;
    if !follow_ups.is_empty() {
        log::debug!("Skipping {} follow-up refreshes", follow_ups.len());
    }
}

/// Runs `command` against the engine and renders what it loaded.
///
/// `confirm` is consulted for destructive commands not given `--yes`.
pub async fn run_command(
    engine: &mut ViewSyncEngine,
    backend: &dyn Backend,
    command: HeadlessCommand,
    export_dir: &std::path::Path,
    confirm: &dyn Confirm,
) -> Option<String> {
    match command {
        HeadlessCommand::Dashboard => {
            let request = engine.refresh_dashboard();
            execute(engine, backend, request).await;
            Some(render_dashboard(&dashboard_view(&engine.snapshot())))
        }
        HeadlessCommand::Search(filters) => {
            let request = engine.search(filters);
            execute(engine, backend, request).await;
            Some(render_search(&search_view(engine.search_state())))
        }
        HeadlessCommand::Show(number) => {
            let request = engine.edit_record(number);
            execute(engine, backend, request).await;
            engine.loaded_record().map(|record| {
                record_detail(record)
                    .into_iter()
                    .map(|(label, value)| format!("{:<22}{}", format!("{}:", label), value))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        HeadlessCommand::Submit { mut record, edit } => {
            if let Some(number) = edit {
                let request = engine.edit_record(number);
                execute(engine, backend, request).await;
                if engine.edit_mode() != EditMode::Editing(number) {
                    return None;
                }
                record.record_number = number;
            } else if record.record_number == 0 {
                let request = engine.load_next_number();
                execute(engine, backend, request).await;
                record.record_number = engine.next_number()?;
            }
            let request = engine.submit_record(record);
            execute(engine, backend, request).await;
            None
        }
        HeadlessCommand::Delete { number, yes } => {
            let confirm: &dyn Confirm = if yes { &true } else { confirm };
            match engine.delete_record(number, confirm) {
                Some(request) => execute(engine, backend, request).await,
                None => print_cmd_info!("Operación cancelada", ""),
            }
            None
        }
        HeadlessCommand::Statistics(range) => {
            let request = engine.load_statistics(range);
            execute(engine, backend, request).await;
            engine
                .statistics()
                .map(|stats| render_statistics(&statistics_view(stats)))
        }
        HeadlessCommand::Audit => {
            let request = engine.load_audit_log();
            execute(engine, backend, request).await;
            Some(render_listing(&audit_view(engine.audit_log()), |row| {
                format!(
                    "{}  {:<12} {:<14} {}",
                    row.timestamp, row.operation, row.user, row.description
                )
            }))
        }
        HeadlessCommand::Export(dir) => {
            let dir = dir.unwrap_or_else(|| export_dir.to_path_buf());
            let request = engine.export(dir);
            execute(engine, backend, request).await;
            engine
                .last_export()
                .map(|path| path.display().to_string())
        }
        HeadlessCommand::AddAppointment(appointment) => {
            let request = engine.create_appointment(appointment);
            execute(engine, backend, request).await;
            None
        }
        HeadlessCommand::AppointmentStatus { id, status } => {
            let request = engine.update_appointment_status(id, status);
            execute(engine, backend, request).await;
            None
        }
        HeadlessCommand::DeleteAppointment { id, yes } => {
            let confirm: &dyn Confirm = if yes { &true } else { confirm };
            match engine.delete_appointment(id, confirm) {
                Some(request) => execute(engine, backend, request).await,
                None => print_cmd_info!("Operación cancelada", ""),
            }
            None
        }
        HeadlessCommand::ListZones => {
            let request = engine.refresh_map();
            execute(engine, backend, request).await;
            Some(render_map(&map_view(engine.map_zones())))
        }
        HeadlessCommand::SaveZone { zone, id } => {
            let request = engine.upsert_map_zone(zone, id);
            execute(engine, backend, request).await;
            None
        }
        HeadlessCommand::DeleteZone { id, yes } => {
            let confirm: &dyn Confirm = if yes { &true } else { confirm };
            match engine.delete_map_zone(id, confirm) {
                Some(request) => execute(engine, backend, request).await,
                None => print_cmd_info!("Operación cancelada", ""),
            }
            None
        }
        HeadlessCommand::Neighborhoods => {
            let request = engine.load_neighborhoods();
            execute(engine, backend, request).await;
            Some(render_neighborhoods(&neighborhoods_view(
                engine.neighborhoods(),
            )))
        }
        HeadlessCommand::Logout => {
            let request = engine.logout();
            execute(engine, backend, request).await;
            None
        }
    }
}

fn render_listing<T>(listing: &Listing<T>, line: impl Fn(&T) -> String) -> String {
    match listing {
        Listing::Rows(rows) => rows.iter().map(line).collect::<Vec<_>>().join("\n"),
        Listing::Empty(message) => message.to_string(),
    }
}

fn render_dashboard(view: &DashboardView) -> String {
    let mut lines: Vec<String> = view
        .counters
        .iter()
        .map(|counter| format!("{:<24}{}", format!("{}:", counter.label), counter.value))
        .collect();

    lines.push(String::new());
    lines.push("Turnos de hoy".to_string());
    lines.push(render_listing(&view.today, |row| {
        format!(
            "  {}  {} ({})  {}  [{}]",
            row.time, row.animal, row.guardian, row.kind, row.status
        )
    }));

    lines.push(String::new());
    lines.push("Últimas atenciones".to_string());
    lines.push(render_listing(&view.recent, |row| {
        format!(
            "  #{:<5} {}  {:<18} {} ({})  {}",
            row.number, row.date, row.kind, row.animal, row.species, row.guardian
        )
    }));

    lines.push(String::new());
    lines.push("Agenda de la semana".to_string());
    lines.push(render_listing(&view.week, |day| {
        let mut block = vec![format!("  {}", day.header)];
        block.extend(day.rows.iter().map(|row| {
            format!(
                "    {}  {} ({})  {}  [{}]",
                row.time, row.animal, row.guardian, row.kind, row.status
            )
        }));
        block.join("\n")
    }));

    lines.join("\n")
}

fn render_search(view: &SearchView) -> String {
    match view {
        SearchView::NotSearched(message) | SearchView::NoResults(message) => message.to_string(),
        SearchView::Results(rows) => rows
            .iter()
            .map(|row| {
                format!(
                    "#{:<5} {}  {:<18} {} ({}, {}, {})  {} DNI {}  {}  {}  {}",
                    row.number,
                    row.date,
                    row.kind,
                    row.animal,
                    row.species,
                    row.sex,
                    row.age,
                    row.guardian,
                    row.national_id,
                    row.phone,
                    row.address,
                    row.neighborhood
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_statistics(view: &StatisticsView) -> String {
    let sections = [
        ("Por tipo", &view.by_type),
        ("Por especie", &view.by_species),
        ("Por sexo", &view.by_sex),
        ("Por mes", &view.by_month),
        ("Barrios principales", &view.top_neighborhoods),
    ];
    let mut lines = vec![format!("Total de atenciones: {}", view.total)];
    for (title, bars) in sections {
        if bars.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(title.to_string());
        lines.extend(
            bars.iter()
                .map(|bar| format!("  {:<28}{}", bar.label, bar.value)),
        );
    }
    lines.join("\n")
}

fn render_map(view: &MapView) -> String {
    let mut body = render_listing(&view.points, |point| {
        let (r, g, b) = point.color;
        format!(
            "{:>4}  {:<24} ({:.5}, {:.5})  #{:02x}{:02x}{:02x}  {} atenciones",
            point.id.map(|id| id.to_string()).unwrap_or_default(),
            point.name,
            point.latitude,
            point.longitude,
            r,
            g,
            b,
            point.count
        )
    });
    if !view.points.rows().is_empty() {
        body.push_str(&format!("\nTotal en el mapa: {}", view.total_records));
    }
    body
}

fn render_neighborhoods(listing: &Listing<NeighborhoodRow>) -> String {
    render_listing(listing, |row| {
        if row.variants.is_empty() {
            format!("{:<28}{}", row.name, row.records)
        } else {
            format!("{:<28}{:<6}{}", row.name, row.records, row.variants)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::api::error::ApiError;
    use crate::models::{GroupCount, RecordSnapshot, ServerReply, Statistics};
    use crate::presentation::views::{NO_APPOINTMENTS_TODAY, NO_RESULTS};

    fn export_dir() -> PathBuf {
        std::env::temp_dir()
    }

    #[tokio::test]
    async fn dashboard_prints_counters_and_empty_states() {
        let mut backend = MockBackend::new();
        backend.expect_dashboard().times(1).returning(|| {
            Ok(RecordSnapshot {
                today_count: 3,
                week_count: 11,
                ..Default::default()
            })
        });

        let mut engine = ViewSyncEngine::new();
        let output = run_command(
            &mut engine,
            &backend,
            HeadlessCommand::Dashboard,
            &export_dir(),
            &false,
        )
        .await
        .unwrap();

        assert!(output.contains("Atenciones hoy:"));
        assert!(output.contains("11"));
        assert!(output.contains(NO_APPOINTMENTS_TODAY));
        assert_eq!(report_notifications(&mut engine), 0);
    }

    #[tokio::test]
    async fn empty_search_prints_no_results() {
        let mut backend = MockBackend::new();
        backend
            .expect_search_records()
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let mut engine = ViewSyncEngine::new();
        let output = run_command(
            &mut engine,
            &backend,
            HeadlessCommand::Search(SearchFilters::default()),
            &export_dir(),
            &false,
        )
        .await
        .unwrap();
        assert_eq!(output, NO_RESULTS);
    }

    #[tokio::test]
    async fn declined_delete_never_reaches_backend() {
        let backend = MockBackend::new();
        let mut engine = ViewSyncEngine::new();
        let output = run_command(
            &mut engine,
            &backend,
            HeadlessCommand::Delete {
                number: 4,
                yes: false,
            },
            &export_dir(),
            &false,
        )
        .await;
        assert!(output.is_none());
        assert_eq!(report_notifications(&mut engine), 0);
    }

    #[tokio::test]
    async fn confirmed_delete_skips_follow_up_refreshes() {
        let mut backend = MockBackend::new();
        backend.expect_delete_record().times(1).returning(|_| {
            Ok(ServerReply {
                success: Some(true),
                message: None,
            })
        });
        // No search or dashboard expectations: refreshing them would panic.

        let mut engine = ViewSyncEngine::new();
        run_command(
            &mut engine,
            &backend,
            HeadlessCommand::Delete {
                number: 4,
                yes: true,
            },
            &export_dir(),
            &false,
        )
        .await;
        assert_eq!(report_notifications(&mut engine), 0);
    }

    #[tokio::test]
    async fn missing_record_counts_as_failure() {
        let mut backend = MockBackend::new();
        backend.expect_get_record().times(1).returning(|_| {
            Err(ApiError::NotFound { message: None })
        });

        let mut engine = ViewSyncEngine::new();
        let output = run_command(
            &mut engine,
            &backend,
            HeadlessCommand::Show(99),
            &export_dir(),
            &false,
        )
        .await;
        assert!(output.is_none());
        assert_eq!(report_notifications(&mut engine), 1);
    }

    #[tokio::test]
    async fn submit_without_number_takes_the_next_one() {
        let mut backend = MockBackend::new();
        backend.expect_next_number().times(1).returning(|| Ok(42));
        backend
            .expect_create_record()
            .withf(|record| record.record_number == 42)
            .times(1)
            .returning(|_| {
                Ok(ServerReply {
                    success: Some(true),
                    message: Some("Atención registrada".to_string()),
                })
            });

        let mut engine = ViewSyncEngine::new();
        run_command(
            &mut engine,
            &backend,
            HeadlessCommand::Submit {
                record: CareRecord::default(),
                edit: None,
            },
            &export_dir(),
            &false,
        )
        .await;
        assert_eq!(report_notifications(&mut engine), 0);
    }

    #[test]
    fn statistics_skip_empty_groups() {
        let view = statistics_view(&Statistics {
            total: Some(7),
            by_species: vec![GroupCount {
                label: "Perro".to_string(),
                count: 7,
            }],
            ..Default::default()
        });
        let text = render_statistics(&view);
        assert!(text.starts_with("Total de atenciones: 7"));
        assert!(text.contains("Por especie"));
        assert!(!text.contains("Por sexo"));
    }
}
