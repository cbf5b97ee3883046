//! View sync engine
//!
//! Sole owner of everything fetched from the backend. Operations return
//! [`SyncRequest`]s; executing one yields a [`SyncOutcome`] that is fed back
//! through [`ViewSyncEngine::apply`], which updates state, raises
//! notifications and returns follow-up requests. Failures never touch state.

pub mod edit_mode;
pub mod grouping;
pub mod notifications;
pub mod requests;
pub mod sequencer;

pub use edit_mode::EditMode;
pub use grouping::{AppointmentGroup, group_appointments_by_date, join_neighborhood_counts};
pub use notifications::Notifier;
pub use requests::{ExportError, MapData, SubmitMode, SyncOutcome, SyncRequest};
pub use sequencer::{Operation, RequestToken, Sequencer};

use crate::api::Backend;
use crate::api::error::ApiError;
use crate::dates::today_iso;
use crate::events::{Event, Topic};
use crate::models::{
    AppointmentStatus, AuditEntry, CareRecord, DateRange, MapZone, NeighborhoodEntry,
    NewAppointment, RecordSnapshot, SearchFilters, Statistics,
};
use crate::presentation::form::RecordForm;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Asks the user before a destructive request is issued.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A decision already taken, e.g. from a dialog or `--yes`.
impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

/// Result of the last search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchState {
    #[default]
    NotSearched,
    NoResults,
    Results(Vec<CareRecord>),
}

#[derive(Debug)]
pub struct ViewSyncEngine {
    snapshot: Arc<RecordSnapshot>,
    search: SearchState,
    last_filters: SearchFilters,
    statistics: Option<Statistics>,
    stats_range: DateRange,
    audit_log: Vec<AuditEntry>,
    map_zones: Vec<MapZone>,
    neighborhoods: Vec<NeighborhoodEntry>,
    next_number: Option<u32>,
    loaded_record: Option<CareRecord>,
    last_export: Option<PathBuf>,
    form: RecordForm,
    edit_mode: EditMode,
    sequencer: Sequencer,
    notifier: Notifier,
}

impl Default for ViewSyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSyncEngine {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(RecordSnapshot::default()),
            search: SearchState::NotSearched,
            last_filters: SearchFilters::default(),
            statistics: None,
            stats_range: DateRange::default(),
            audit_log: Vec::new(),
            map_zones: Vec::new(),
            neighborhoods: Vec::new(),
            next_number: None,
            loaded_record: None,
            last_export: None,
            form: RecordForm::new(&today_iso()),
            edit_mode: EditMode::Idle,
            sequencer: Sequencer::default(),
            notifier: Notifier::default(),
        }
    }

    // Accessors

    pub fn snapshot(&self) -> Arc<RecordSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn last_filters(&self) -> &SearchFilters {
        &self.last_filters
    }

    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    pub fn stats_range(&self) -> &DateRange {
        &self.stats_range
    }

    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    pub fn map_zones(&self) -> &[MapZone] {
        &self.map_zones
    }

    pub fn neighborhoods(&self) -> &[NeighborhoodEntry] {
        &self.neighborhoods
    }

    pub fn next_number(&self) -> Option<u32> {
        self.next_number
    }

    /// Last record fetched through [`ViewSyncEngine::edit_record`].
    pub fn loaded_record(&self) -> Option<&CareRecord> {
        self.loaded_record.as_ref()
    }

    pub fn last_export(&self) -> Option<&PathBuf> {
        self.last_export.as_ref()
    }

    pub fn form(&self) -> &RecordForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RecordForm {
        &mut self.form
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    pub fn is_loading(&self, operation: Operation) -> bool {
        self.sequencer.in_flight(operation)
    }

    /// Expires notifications.
    pub fn tick(&mut self, now: Instant) {
        self.notifier.prune(now);
    }

    fn notify(&mut self, event: Event) {
        self.notifier.push(event);
    }

    fn notify_failure(&mut self, topic: Topic, error: &ApiError, fallback: &str) {
        log::debug!("{} request failed: {}", topic, error);
        let message = error.user_message(fallback);
        self.notify(Event::error(topic, message));
    }

    // Read operations

    pub fn refresh_dashboard(&mut self) -> SyncRequest {
        SyncRequest::Dashboard(self.sequencer.issue(Operation::Dashboard))
    }

    pub fn search(&mut self, filters: SearchFilters) -> SyncRequest {
        self.last_filters = filters.clone();
        SyncRequest::Search(self.sequencer.issue(Operation::Search), filters)
    }

    /// Re-runs the last search.
    pub fn repeat_search(&mut self) -> SyncRequest {
        let filters = self.last_filters.clone();
        self.search(filters)
    }

    pub fn load_next_number(&mut self) -> SyncRequest {
        SyncRequest::NextNumber(self.sequencer.issue(Operation::NextNumber))
    }

    /// Fetches record `number`; the form switches to editing it once the
    /// fetch succeeds.
    pub fn edit_record(&mut self, number: u32) -> SyncRequest {
        SyncRequest::LoadRecord(self.sequencer.issue(Operation::RecordLookup), number)
    }

    pub fn load_statistics(&mut self, range: DateRange) -> SyncRequest {
        self.stats_range = range.clone();
        SyncRequest::Statistics(self.sequencer.issue(Operation::Statistics), range)
    }

    pub fn load_audit_log(&mut self) -> SyncRequest {
        SyncRequest::AuditLog(self.sequencer.issue(Operation::AuditLog))
    }

    pub fn refresh_map(&mut self) -> SyncRequest {
        SyncRequest::Map(self.sequencer.issue(Operation::Map))
    }

    pub fn load_neighborhoods(&mut self) -> SyncRequest {
        SyncRequest::Neighborhoods(self.sequencer.issue(Operation::Neighborhoods))
    }

    // Form and edit mode

    /// Leaves edit mode and blanks the form.
    pub fn cancel_edit(&mut self) -> SyncRequest {
        self.reset_form()
    }

    pub fn reset_form(&mut self) -> SyncRequest {
        // A lookup still on its way must not re-enter edit mode
        self.sequencer.invalidate(Operation::RecordLookup);
        self.edit_mode = EditMode::Idle;
        self.form.reset(&today_iso());
        if let Some(number) = self.next_number {
            self.form.set_number(number);
        }
        self.load_next_number()
    }

    // Mutations

    /// Saves `record`: an update while editing, a create otherwise.
    pub fn submit_record(&mut self, record: CareRecord) -> SyncRequest {
        let mode = match self.edit_mode {
            EditMode::Editing(number) => SubmitMode::Update(number),
            EditMode::Idle => SubmitMode::Create,
        };
        SyncRequest::Submit(mode, record)
    }

    /// Saves the form's content. Invalid input is reported and nothing is sent.
    pub fn submit_form(&mut self) -> Option<SyncRequest> {
        match self.form.to_record() {
            Ok(record) => Some(self.submit_record(record)),
            Err(e) => {
                self.notify(Event::error(Topic::Records, e.to_string()));
                None
            }
        }
    }

    pub fn delete_record(&mut self, number: u32, confirm: &dyn Confirm) -> Option<SyncRequest> {
        let prompt = format!("¿Está seguro que desea eliminar el registro #{}?", number);
        confirm
            .confirm(&prompt)
            .then_some(SyncRequest::DeleteRecord(number))
    }

    pub fn create_appointment(&mut self, appointment: NewAppointment) -> SyncRequest {
        SyncRequest::CreateAppointment(appointment)
    }

    pub fn update_appointment_status(&mut self, id: u64, status: AppointmentStatus) -> SyncRequest {
        SyncRequest::UpdateAppointmentStatus(id, status)
    }

    pub fn delete_appointment(&mut self, id: u64, confirm: &dyn Confirm) -> Option<SyncRequest> {
        confirm
            .confirm("¿Está seguro que desea eliminar este turno?")
            .then_some(SyncRequest::DeleteAppointment(id))
    }

    /// Creates `zone`, or replaces zone `existing_id` with it.
    pub fn upsert_map_zone(&mut self, zone: MapZone, existing_id: Option<u64>) -> SyncRequest {
        SyncRequest::SaveZone(existing_id, zone)
    }

    pub fn delete_map_zone(&mut self, id: u64, confirm: &dyn Confirm) -> Option<SyncRequest> {
        confirm
            .confirm("¿Está seguro que desea eliminar este barrio del mapa?")
            .then_some(SyncRequest::DeleteZone(id))
    }

    pub fn export(&mut self, dir: PathBuf) -> SyncRequest {
        self.notify(Event::info(Topic::Export, "Generando archivo Excel..."));
        SyncRequest::Export(dir)
    }

    pub fn logout(&mut self) -> SyncRequest {
        SyncRequest::Logout
    }

    // Outcomes

    /// Applies a finished request. Returns the requests it triggers.
    pub fn apply(&mut self, outcome: SyncOutcome) -> Vec<SyncRequest> {
        match outcome {
            SyncOutcome::Dashboard(token, result) => {
                if !self.sequencer.accept(token) {
                    return Vec::new();
                }
                match result {
                    Ok(snapshot) => {
                        self.snapshot = Arc::new(snapshot);
                        self.notify(Event::refresh(Topic::Dashboard, "Dashboard actualizado"));
                    }
                    Err(e) => self.notify_failure(
                        Topic::Dashboard,
                        &e,
                        "Error al cargar datos del dashboard",
                    ),
                }
                Vec::new()
            }
            SyncOutcome::Search(token, result) => {
                if !self.sequencer.accept(token) {
                    return Vec::new();
                }
                match result {
                    Ok(records) if records.is_empty() => {
                        self.search = SearchState::NoResults;
                        self.notify(Event::refresh(Topic::Search, "Búsqueda sin resultados"));
                    }
                    Ok(records) => {
                        self.notify(Event::refresh(
                            Topic::Search,
                            format!("{} resultados", records.len()),
                        ));
                        self.search = SearchState::Results(records);
                    }
                    Err(e) => self.notify_failure(Topic::Search, &e, "Error en la búsqueda"),
                }
                Vec::new()
            }
            SyncOutcome::NextNumber(token, result) => {
                if !self.sequencer.accept(token) {
                    return Vec::new();
                }
                match result {
                    Ok(number) => {
                        self.next_number = Some(number);
                        if !self.edit_mode.is_editing() {
                            self.form.set_number(number);
                        }
                    }
                    Err(e) => self.notify_failure(
                        Topic::Records,
                        &e,
                        "Error al obtener el siguiente número",
                    ),
                }
                Vec::new()
            }
            SyncOutcome::RecordLoaded(token, number, result) => {
                if !self.sequencer.accept(token) {
                    return Vec::new();
                }
                match result {
                    Ok(record) => {
                        self.form.load(&record);
                        self.loaded_record = Some(record);
                        self.edit_mode = EditMode::Editing(number);
                        self.notify(Event::info(
                            Topic::Records,
                            format!("Editando registro #{}", number),
                        ));
                    }
                    Err(e @ ApiError::NotFound { .. }) => {
                        self.notify_failure(Topic::Records, &e, "Registro no encontrado")
                    }
                    Err(e) => {
                        self.notify_failure(Topic::Records, &e, "Error al cargar el registro")
                    }
                }
                Vec::new()
            }
            SyncOutcome::Statistics(token, result) => {
                if !self.sequencer.accept(token) {
                    return Vec::new();
                }
                match result {
                    Ok(stats) => self.statistics = Some(stats),
                    Err(e) => {
                        self.notify_failure(Topic::Statistics, &e, "Error al cargar estadísticas")
                    }
                }
                Vec::new()
            }
            SyncOutcome::AuditLog(token, result) => {
                if !self.sequencer.accept(token) {
                    return Vec::new();
                }
                match result {
                    Ok(entries) => self.audit_log = entries,
                    Err(e) => self.notify_failure(Topic::Audit, &e, "Error al cargar auditoría"),
                }
                Vec::new()
            }
            SyncOutcome::Map(token, result) => {
                if !self.sequencer.accept(token) {
                    return Vec::new();
                }
                match result {
                    Ok(MapData { zones, counts }) => {
                        self.map_zones = join_neighborhood_counts(zones, &counts);
                        self.notify(Event::refresh(Topic::Map, "Mapa actualizado"));
                    }
                    Err(e) => self.notify_failure(Topic::Map, &e, "Error al cargar el mapa"),
                }
                Vec::new()
            }
            SyncOutcome::Neighborhoods(token, result) => {
                if !self.sequencer.accept(token) {
                    return Vec::new();
                }
                match result {
                    Ok(entries) => self.neighborhoods = entries,
                    Err(e) => self.notify_failure(Topic::Map, &e, "Error al cargar barrios"),
                }
                Vec::new()
            }
            SyncOutcome::Submitted(mode, result) => match result {
                Ok(reply) => {
                    let fallback = match mode {
                        SubmitMode::Create => "Atención registrada exitosamente",
                        SubmitMode::Update(_) => "Atención actualizada exitosamente",
                    };
                    let message = reply.message.unwrap_or_else(|| fallback.to_string());
                    self.notify(Event::success(Topic::Records, message));
                    self.edit_mode = EditMode::Idle;
                    self.form.reset(&today_iso());
                    vec![self.load_next_number()]
                }
                Err(e) => {
                    let fallback = match mode {
                        SubmitMode::Create => "Error al registrar atención",
                        SubmitMode::Update(_) => "Error al actualizar atención",
                    };
                    self.notify_failure(Topic::Records, &e, fallback);
                    Vec::new()
                }
            },
            SyncOutcome::RecordDeleted(number, result) => match result {
                Ok(reply) => {
                    let message = reply
                        .message
                        .unwrap_or_else(|| format!("Registro #{} eliminado", number));
                    self.notify(Event::success(Topic::Records, message));
                    vec![self.repeat_search(), self.refresh_dashboard()]
                }
                Err(e) => {
                    self.notify_failure(Topic::Records, &e, "Error al eliminar registro");
                    Vec::new()
                }
            },
            SyncOutcome::AppointmentCreated(result) => match result {
                Ok(_) => {
                    self.notify(Event::success(Topic::Appointments, "Turno creado exitosamente"));
                    vec![self.refresh_dashboard()]
                }
                Err(e) => {
                    self.notify_failure(Topic::Appointments, &e, "Error al crear turno");
                    Vec::new()
                }
            },
            SyncOutcome::AppointmentStatusUpdated(status, result) => match result {
                Ok(_) => {
                    self.notify(Event::success(Topic::Appointments, format!("Turno {}", status)));
                    vec![self.refresh_dashboard()]
                }
                Err(e) => {
                    self.notify_failure(Topic::Appointments, &e, "Error al actualizar turno");
                    Vec::new()
                }
            },
            SyncOutcome::AppointmentDeleted(id, result) => match result {
                Ok(_) => {
                    log::debug!("appointment {} deleted", id);
                    self.notify(Event::success(Topic::Appointments, "Turno eliminado"));
                    vec![self.refresh_dashboard()]
                }
                Err(e) => {
                    self.notify_failure(Topic::Appointments, &e, "Error al eliminar turno");
                    Vec::new()
                }
            },
            SyncOutcome::ZoneSaved(result) => match result {
                Ok(reply) => {
                    let message = reply
                        .message
                        .unwrap_or_else(|| "Barrio guardado exitosamente".to_string());
                    self.notify(Event::success(Topic::Map, message));
                    vec![self.refresh_map()]
                }
                Err(e) => {
                    self.notify_failure(Topic::Map, &e, "Error al guardar barrio");
                    Vec::new()
                }
            },
            SyncOutcome::ZoneDeleted(id, result) => match result {
                Ok(_) => {
                    log::debug!("map zone {} deleted", id);
                    self.notify(Event::success(Topic::Map, "Barrio eliminado"));
                    vec![self.refresh_map()]
                }
                Err(e) => {
                    self.notify_failure(Topic::Map, &e, "Error al eliminar barrio");
                    Vec::new()
                }
            },
            SyncOutcome::Exported(result) => {
                match result {
                    Ok(path) => {
                        self.notify(Event::success(Topic::Export, "Archivo descargado exitosamente"));
                        self.last_export = Some(path);
                    }
                    Err(e) => {
                        log::debug!("export failed: {}", e);
                        self.notify(Event::error(Topic::Export, "Error al exportar datos"));
                    }
                }
                Vec::new()
            }
            SyncOutcome::LoggedOut(result) => {
                if let Err(e) = result {
                    log::warn!("logout request failed: {}", e);
                }
                self.notify(Event::info(Topic::Session, "Sesión cerrada"));
                Vec::new()
            }
        }
    }

    /// Executes `request` and applies its outcome, returning follow-ups unexecuted.
    pub async fn dispatch(&mut self, backend: &dyn Backend, request: SyncRequest) -> Vec<SyncRequest> {
        let outcome = request.execute(backend).await;
        self.apply(outcome)
    }

    /// Executes `request` and every follow-up it triggers, in order.
    pub async fn run(&mut self, backend: &dyn Backend, request: SyncRequest) {
        let mut queue = VecDeque::from([request]);
        while let Some(request) = queue.pop_front() {
            let follow_ups = self.dispatch(backend, request).await;
            queue.extend(follow_ups);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::events::EventType;
    use crate::models::{AttentionType, ServerReply};
    use crate::presentation::form::FormField;
    use mockall::predicate::eq;
    use std::cell::Cell;

    fn ok_reply(message: &str) -> Result<ServerReply, ApiError> {
        Ok(ServerReply {
            success: Some(true),
            message: Some(message.to_string()),
        })
    }

    fn record(number: u32) -> CareRecord {
        CareRecord {
            record_number: number,
            date: "2025-11-27".to_string(),
            attention_type: AttentionType::Sterilization,
            animal_name: "Toby".to_string(),
            species: "perro".to_string(),
            sex: "macho".to_string(),
            ..Default::default()
        }
    }

    fn latest_message(engine: &ViewSyncEngine) -> String {
        engine.notifier().latest().map(|e| e.msg.clone()).unwrap_or_default()
    }

    struct CountingConfirm {
        answer: bool,
        asked: Cell<usize>,
    }

    impl Confirm for CountingConfirm {
        fn confirm(&self, _prompt: &str) -> bool {
            self.asked.set(self.asked.get() + 1);
            self.answer
        }
    }

    #[tokio::test]
    async fn dashboard_success_replaces_snapshot() {
        let mut backend = MockBackend::new();
        backend.expect_dashboard().times(1).returning(|| {
            Ok(RecordSnapshot {
                today_count: 3,
                ..Default::default()
            })
        });
        let mut engine = ViewSyncEngine::new();
        let request = engine.refresh_dashboard();
        engine.run(&backend, request).await;
        assert_eq!(engine.snapshot().today_count, 3);
        assert!(!engine.is_loading(Operation::Dashboard));
    }

    #[tokio::test]
    async fn dashboard_failure_keeps_previous_snapshot() {
        let mut engine = ViewSyncEngine::new();
        let token = engine.sequencer.issue(Operation::Dashboard);
        engine.apply(SyncOutcome::Dashboard(
            token,
            Ok(RecordSnapshot {
                week_count: 9,
                ..Default::default()
            }),
        ));
        let before = engine.snapshot();

        let mut backend = MockBackend::new();
        backend.expect_dashboard().times(1).returning(|| {
            Err(ApiError::Http {
                status: 500,
                message: None,
                body: String::new(),
            })
        });
        let request = engine.refresh_dashboard();
        engine.run(&backend, request).await;

        assert_eq!(*engine.snapshot(), *before);
        let latest = engine.notifier().latest().unwrap();
        assert_eq!(latest.event_type, EventType::Error);
        assert_eq!(latest.msg, "Error al cargar datos del dashboard");
    }

    #[tokio::test]
    async fn empty_search_result_is_no_results() {
        let mut backend = MockBackend::new();
        backend
            .expect_search_records()
            .withf(|filters| filters.especie.as_deref() == Some("gato"))
            .times(1)
            .returning(|_| Ok(Vec::new()));
        let mut engine = ViewSyncEngine::new();
        let request = engine.search(SearchFilters {
            especie: Some("gato".to_string()),
            ..Default::default()
        });
        engine.run(&backend, request).await;
        assert_eq!(*engine.search_state(), SearchState::NoResults);
    }

    #[tokio::test]
    async fn search_keeps_server_order() {
        let mut backend = MockBackend::new();
        backend
            .expect_search_records()
            .returning(|_| Ok(vec![record(9), record(2), record(5)]));
        let mut engine = ViewSyncEngine::new();
        let request = engine.search(SearchFilters::default());
        engine.run(&backend, request).await;
        match engine.search_state() {
            SearchState::Results(records) => {
                let numbers: Vec<_> = records.iter().map(|r| r.record_number).collect();
                assert_eq!(numbers, [9, 2, 5]);
            }
            other => panic!("unexpected search state {:?}", other),
        }
    }

    #[test]
    fn stale_search_response_is_discarded() {
        let mut engine = ViewSyncEngine::new();
        let first = match engine.search(SearchFilters::default()) {
            SyncRequest::Search(token, _) => token,
            other => panic!("unexpected request {:?}", other),
        };
        let second = match engine.search(SearchFilters::default()) {
            SyncRequest::Search(token, _) => token,
            other => panic!("unexpected request {:?}", other),
        };

        engine.apply(SyncOutcome::Search(second, Ok(vec![record(2)])));
        engine.apply(SyncOutcome::Search(first, Ok(vec![record(1), record(3)])));

        assert_eq!(*engine.search_state(), SearchState::Results(vec![record(2)]));
    }

    #[test]
    fn stale_dashboard_response_is_discarded() {
        let mut engine = ViewSyncEngine::new();
        let SyncRequest::Dashboard(first) = engine.refresh_dashboard() else {
            panic!("expected dashboard request");
        };
        let SyncRequest::Dashboard(second) = engine.refresh_dashboard() else {
            panic!("expected dashboard request");
        };
        let newer = RecordSnapshot {
            today_count: 2,
            ..Default::default()
        };
        engine.apply(SyncOutcome::Dashboard(second, Ok(newer.clone())));
        engine.apply(SyncOutcome::Dashboard(
            first,
            Ok(RecordSnapshot {
                today_count: 1,
                ..Default::default()
            }),
        ));
        assert_eq!(*engine.snapshot(), newer);
    }

    #[test]
    fn declined_delete_sends_nothing() {
        let mut engine = ViewSyncEngine::new();
        let confirm = CountingConfirm {
            answer: false,
            asked: Cell::new(0),
        };
        let before = engine.search_state().clone();

        let request = engine.delete_record(5, &confirm);

        assert!(request.is_none());
        assert_eq!(confirm.asked.get(), 1);
        assert_eq!(*engine.search_state(), before);
        assert!(engine.notifier().latest().is_none());
    }

    #[tokio::test]
    async fn accepted_delete_refreshes_search_and_dashboard_once() {
        let mut backend = MockBackend::new();
        backend
            .expect_delete_record()
            .with(eq(5))
            .times(1)
            .returning(|_| ok_reply("Registro eliminado exitosamente"));
        backend
            .expect_search_records()
            .withf(|filters| filters.barrio.as_deref() == Some("Centro"))
            .times(1)
            .returning(|_| Ok(vec![record(6)]));
        backend
            .expect_dashboard()
            .times(1)
            .returning(|| Ok(RecordSnapshot::default()));

        let mut engine = ViewSyncEngine::new();
        let filters = SearchFilters {
            barrio: Some("Centro".to_string()),
            ..Default::default()
        };
        let token = engine.sequencer.issue(Operation::Search);
        engine.last_filters = filters;
        engine.apply(SyncOutcome::Search(token, Ok(vec![record(5), record(6)])));

        let request = engine.delete_record(5, &true).unwrap();
        engine.run(&backend, request).await;

        assert_eq!(*engine.search_state(), SearchState::Results(vec![record(6)]));
    }

    #[tokio::test]
    async fn failed_delete_triggers_no_refresh() {
        let mut backend = MockBackend::new();
        backend.expect_delete_record().times(1).returning(|_| {
            Err(ApiError::NotFound {
                message: Some("Registro no encontrado".to_string()),
            })
        });
        let mut engine = ViewSyncEngine::new();
        let request = engine.delete_record(5, &true).unwrap();
        let follow_ups = engine.dispatch(&backend, request).await;
        assert!(follow_ups.is_empty());
        assert_eq!(latest_message(&engine), "Registro no encontrado");
    }

    #[tokio::test]
    async fn edit_mode_entered_only_after_successful_fetch() {
        let mut backend = MockBackend::new();
        backend
            .expect_get_record()
            .with(eq(7))
            .times(1)
            .returning(|n| Ok(record(n)));
        backend.expect_get_record().with(eq(8)).times(1).returning(|_| {
            Err(ApiError::NotFound {
                message: Some("Registro no encontrado".to_string()),
            })
        });

        let mut engine = ViewSyncEngine::new();
        let request = engine.edit_record(8);
        engine.run(&backend, request).await;
        assert_eq!(engine.edit_mode(), EditMode::Idle);
        assert_eq!(latest_message(&engine), "Registro no encontrado");

        let request = engine.edit_record(7);
        engine.run(&backend, request).await;
        assert_eq!(engine.edit_mode(), EditMode::Editing(7));
        assert_eq!(engine.form().get(FormField::AnimalName), "Toby");
        assert_eq!(engine.loaded_record(), Some(&record(7)));
    }

    #[test]
    fn late_lookup_after_cancel_stays_idle() {
        let mut engine = ViewSyncEngine::new();
        let SyncRequest::LoadRecord(token, number) = engine.edit_record(7) else {
            panic!("expected a record lookup");
        };
        engine.cancel_edit();

        let follow_ups = engine.apply(SyncOutcome::RecordLoaded(token, number, Ok(record(7))));
        assert!(follow_ups.is_empty());
        assert_eq!(engine.edit_mode(), EditMode::Idle);
        assert_eq!(engine.form().get(FormField::AnimalName), "");
        assert!(matches!(
            engine.submit_record(record(7)),
            SyncRequest::Submit(SubmitMode::Create, _)
        ));
    }

    #[test]
    fn edit_mode_routes_submit_to_update() {
        let mut engine = ViewSyncEngine::new();
        let token = engine.sequencer.issue(Operation::RecordLookup);
        engine.apply(SyncOutcome::RecordLoaded(token, 4, Ok(record(4))));

        assert_eq!(
            engine.submit_record(record(4)),
            SyncRequest::Submit(SubmitMode::Update(4), record(4))
        );

        engine.cancel_edit();
        assert_eq!(engine.edit_mode(), EditMode::Idle);
        assert_eq!(
            engine.submit_record(record(4)),
            SyncRequest::Submit(SubmitMode::Create, record(4))
        );
    }

    #[tokio::test]
    async fn successful_submit_clears_form_and_requests_next_number() {
        let mut backend = MockBackend::new();
        backend
            .expect_update_record()
            .with(eq(4), eq(record(4)))
            .times(1)
            .returning(|_, _| ok_reply("Atención actualizada"));
        backend.expect_next_number().times(1).returning(|| Ok(11));

        let mut engine = ViewSyncEngine::new();
        let token = engine.sequencer.issue(Operation::RecordLookup);
        engine.apply(SyncOutcome::RecordLoaded(token, 4, Ok(record(4))));

        let request = engine.submit_form().unwrap();
        engine.run(&backend, request).await;

        assert_eq!(engine.edit_mode(), EditMode::Idle);
        assert_eq!(engine.form().get(FormField::AnimalName), "");
        assert_eq!(engine.form().get(FormField::Date), today_iso());
        assert_eq!(engine.form().get(FormField::Number), "11");
        assert!(
            engine
                .notifier()
                .history()
                .any(|e| e.event_type == EventType::Success && e.msg == "Atención actualizada")
        );
    }

    #[tokio::test]
    async fn rejected_submit_keeps_form_and_shows_server_message() {
        let mut backend = MockBackend::new();
        backend.expect_create_record().times(1).returning(|_| {
            Err(ApiError::Http {
                status: 400,
                message: Some("Error: El número de registro 10 ya existe".to_string()),
                body: String::new(),
            })
        });

        let mut engine = ViewSyncEngine::new();
        engine.form_mut().set(FormField::Number, "10");
        engine.form_mut().set(FormField::AnimalName, "Toby");
        let request = engine.submit_form().unwrap();
        let follow_ups = engine.dispatch(&backend, request).await;

        assert!(follow_ups.is_empty());
        assert_eq!(engine.form().get(FormField::AnimalName), "Toby");
        assert_eq!(engine.edit_mode(), EditMode::Idle);
        assert_eq!(latest_message(&engine), "Error: El número de registro 10 ya existe");
    }

    #[test]
    fn invalid_form_number_is_never_sent() {
        let mut engine = ViewSyncEngine::new();
        engine.form_mut().set(FormField::Number, "diez");
        assert!(engine.submit_form().is_none());
        assert_eq!(
            engine.notifier().latest().unwrap().event_type,
            EventType::Error
        );
    }

    #[test]
    fn next_number_does_not_overwrite_an_edited_record() {
        let mut engine = ViewSyncEngine::new();
        let token = engine.sequencer.issue(Operation::RecordLookup);
        engine.apply(SyncOutcome::RecordLoaded(token, 4, Ok(record(4))));
        let token = engine.sequencer.issue(Operation::NextNumber);
        engine.apply(SyncOutcome::NextNumber(token, Ok(30)));

        assert_eq!(engine.form().get(FormField::Number), "4");
        assert_eq!(engine.next_number(), Some(30));
    }

    #[tokio::test]
    async fn zone_mutation_refetches_the_whole_map() {
        let mut backend = MockBackend::new();
        backend
            .expect_delete_map_zone()
            .with(eq(3))
            .times(1)
            .returning(|_| ok_reply("Barrio eliminado"));
        backend.expect_map_zones().times(1).returning(|| {
            Ok(vec![MapZone {
                id: Some(1),
                name: "Centro".to_string(),
                latitude: -33.0,
                longitude: -58.5,
                color: "#6366f1".to_string(),
                derived_count: 0,
            }])
        });
        backend
            .expect_neighborhood_stats()
            .times(1)
            .returning(|| Ok([("centro ".to_string(), 12)].into_iter().collect()));

        let mut engine = ViewSyncEngine::new();
        let request = engine.delete_map_zone(3, &true).unwrap();
        engine.run(&backend, request).await;

        assert_eq!(engine.map_zones().len(), 1);
        assert_eq!(engine.map_zones()[0].derived_count, 12);
    }

    #[tokio::test]
    async fn appointment_status_change_announces_and_refreshes() {
        let mut backend = MockBackend::new();
        backend
            .expect_update_appointment_status()
            .with(eq(9), eq(AppointmentStatus::Completed))
            .times(1)
            .returning(|_, _| Ok(ServerReply::default()));
        backend
            .expect_dashboard()
            .times(1)
            .returning(|| Ok(RecordSnapshot::default()));

        let mut engine = ViewSyncEngine::new();
        let request = engine.update_appointment_status(9, AppointmentStatus::Completed);
        engine.run(&backend, request).await;

        assert!(
            engine
                .notifier()
                .history()
                .any(|e| e.msg == "Turno completado")
        );
    }

    #[tokio::test]
    async fn export_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = MockBackend::new();
        backend
            .expect_export()
            .times(1)
            .returning(|| Ok(b"xlsx".to_vec()));

        let mut engine = ViewSyncEngine::new();
        let request = engine.export(dir.path().to_path_buf());
        engine.run(&backend, request).await;

        let path = engine.last_export().unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("atenciones_{}.xlsx", today_iso())
        );
        assert_eq!(std::fs::read(path).unwrap(), b"xlsx");
        assert_eq!(latest_message(&engine), "Archivo descargado exitosamente");
    }
}
