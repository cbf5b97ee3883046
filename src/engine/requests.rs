//! Requests issued by the engine and the outcomes they produce.
//!
//! A [`SyncRequest`] is plain data: it can be executed inline (headless mode)
//! or moved into a spawned task (TUI mode). Its [`SyncOutcome`] is handed back
//! to [`ViewSyncEngine::apply`](super::ViewSyncEngine::apply) on the task that
//! owns the engine.

use super::sequencer::RequestToken;
use crate::api::Backend;
use crate::api::error::ApiError;
use crate::models::{
    AppointmentStatus, AuditEntry, CareRecord, DateRange, MapZone, NeighborhoodEntry,
    NewAppointment, RecordSnapshot, SearchFilters, ServerReply, Statistics,
};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Where a record save goes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SubmitMode {
    Create,
    Update(u32),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Zones plus the per-neighborhood counts joined onto them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapData {
    pub zones: Vec<MapZone>,
    pub counts: HashMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncRequest {
    Dashboard(RequestToken),
    Search(RequestToken, SearchFilters),
    NextNumber(RequestToken),
    LoadRecord(RequestToken, u32),
    Statistics(RequestToken, DateRange),
    AuditLog(RequestToken),
    Map(RequestToken),
    Neighborhoods(RequestToken),
    Submit(SubmitMode, CareRecord),
    DeleteRecord(u32),
    CreateAppointment(NewAppointment),
    UpdateAppointmentStatus(u64, AppointmentStatus),
    DeleteAppointment(u64),
    SaveZone(Option<u64>, MapZone),
    DeleteZone(u64),
    Export(PathBuf),
    Logout,
}

#[derive(Debug)]
pub enum SyncOutcome {
    Dashboard(RequestToken, Result<RecordSnapshot, ApiError>),
    Search(RequestToken, Result<Vec<CareRecord>, ApiError>),
    NextNumber(RequestToken, Result<u32, ApiError>),
    RecordLoaded(RequestToken, u32, Result<CareRecord, ApiError>),
    Statistics(RequestToken, Result<Statistics, ApiError>),
    AuditLog(RequestToken, Result<Vec<AuditEntry>, ApiError>),
    Map(RequestToken, Result<MapData, ApiError>),
    Neighborhoods(RequestToken, Result<Vec<NeighborhoodEntry>, ApiError>),
    Submitted(SubmitMode, Result<ServerReply, ApiError>),
    RecordDeleted(u32, Result<ServerReply, ApiError>),
    AppointmentCreated(Result<ServerReply, ApiError>),
    AppointmentStatusUpdated(AppointmentStatus, Result<ServerReply, ApiError>),
    AppointmentDeleted(u64, Result<ServerReply, ApiError>),
    ZoneSaved(Result<ServerReply, ApiError>),
    ZoneDeleted(u64, Result<ServerReply, ApiError>),
    Exported(Result<PathBuf, ExportError>),
    LoggedOut(Result<(), ApiError>),
}

/// `atenciones_<YYYY-MM-DD>.xlsx`
pub fn export_file_name(today: &str) -> String {
    format!("atenciones_{}.xlsx", today)
}

impl SyncRequest {
    /// Performs the request against `backend`. Never fails: errors travel
    /// inside the outcome.
    pub async fn execute(self, backend: &dyn Backend) -> SyncOutcome {
        match self {
            SyncRequest::Dashboard(token) => SyncOutcome::Dashboard(token, backend.dashboard().await),
            SyncRequest::Search(token, filters) => {
                SyncOutcome::Search(token, backend.search_records(&filters).await)
            }
            SyncRequest::NextNumber(token) => {
                SyncOutcome::NextNumber(token, backend.next_number().await)
            }
            SyncRequest::LoadRecord(token, number) => {
                SyncOutcome::RecordLoaded(token, number, backend.get_record(number).await)
            }
            SyncRequest::Statistics(token, range) => {
                SyncOutcome::Statistics(token, backend.statistics(&range).await)
            }
            SyncRequest::AuditLog(token) => SyncOutcome::AuditLog(token, backend.audit_log().await),
            SyncRequest::Map(token) => SyncOutcome::Map(token, fetch_map(backend).await),
            SyncRequest::Neighborhoods(token) => {
                SyncOutcome::Neighborhoods(token, backend.neighborhoods().await)
            }
            SyncRequest::Submit(mode, record) => {
                let result = match mode {
                    SubmitMode::Create => backend.create_record(&record).await,
                    SubmitMode::Update(number) => backend.update_record(number, &record).await,
                };
                SyncOutcome::Submitted(mode, result)
            }
            SyncRequest::DeleteRecord(number) => {
                SyncOutcome::RecordDeleted(number, backend.delete_record(number).await)
            }
            SyncRequest::CreateAppointment(appointment) => {
                SyncOutcome::AppointmentCreated(backend.create_appointment(&appointment).await)
            }
            SyncRequest::UpdateAppointmentStatus(id, status) => SyncOutcome::AppointmentStatusUpdated(
                status,
                backend.update_appointment_status(id, status).await,
            ),
            SyncRequest::DeleteAppointment(id) => {
                SyncOutcome::AppointmentDeleted(id, backend.delete_appointment(id).await)
            }
            SyncRequest::SaveZone(id, zone) => {
                let result = match id {
                    Some(id) => backend.update_map_zone(id, &zone).await,
                    None => backend.create_map_zone(&zone).await,
                };
                SyncOutcome::ZoneSaved(result)
            }
            SyncRequest::DeleteZone(id) => {
                SyncOutcome::ZoneDeleted(id, backend.delete_map_zone(id).await)
            }
            SyncRequest::Export(dir) => SyncOutcome::Exported(export_to(backend, dir).await),
            SyncRequest::Logout => SyncOutcome::LoggedOut(backend.logout().await),
        }
    }
}

/// Zones are required; missing counts only leave `derived_count` at 0.
async fn fetch_map(backend: &dyn Backend) -> Result<MapData, ApiError> {
    let (zones, counts) = tokio::join!(backend.map_zones(), backend.neighborhood_stats());
    let zones = zones?;
    let counts = counts.unwrap_or_else(|e| {
        log::warn!("neighborhood statistics unavailable: {}", e);
        HashMap::new()
    });
    Ok(MapData { zones, counts })
}

async fn export_to(backend: &dyn Backend, dir: PathBuf) -> Result<PathBuf, ExportError> {
    let bytes = backend.export().await?;
    let path = dir.join(export_file_name(&crate::dates::today_iso()));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}
