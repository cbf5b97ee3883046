//! Dashboard state update logic
//!
//! Key handling and per-frame updates. Every method returns the requests the
//! UI loop has to dispatch.

use super::state::{DashboardState, InputMode, PendingAction, PromptKind, Section};

use crate::engine::{SearchState, SyncRequest, group_appointments_by_date};
use crate::events::{Event, Topic};
use crate::models::{
    AppointmentStatus, DateRange, MapZone, NewAppointment, SearchFilters, parse_prompt_pairs,
};
use crate::presentation::FormField;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;
use strum::IntoEnumIterator;

/// What a key press asks the UI loop to do.
#[derive(Debug, Default)]
pub struct Reaction {
    pub requests: Vec<SyncRequest>,
    pub quit: bool,
}

impl Reaction {
    fn send(request: SyncRequest) -> Self {
        Self {
            requests: vec![request],
            quit: false,
        }
    }

    fn send_all(requests: Vec<SyncRequest>) -> Self {
        Self {
            requests,
            quit: false,
        }
    }

    fn maybe(request: Option<SyncRequest>) -> Self {
        Self::send_all(request.into_iter().collect())
    }

    fn quit() -> Self {
        Self {
            requests: Vec::new(),
            quit: true,
        }
    }
}

/// Parses `desde=YYYY-MM-DD hasta=YYYY-MM-DD` (either part optional).
pub fn parse_range(input: &str) -> Result<DateRange, String> {
    let mut range = DateRange::default();
    for (key, value) in parse_prompt_pairs(input, &["desde", "hasta"]).map_err(|e| e.describe("Rango"))? {
        match key {
            "desde" => range.from = Some(value),
            _ => range.to = Some(value),
        }
    }
    Ok(range)
}

/// Renders filters back into prompt syntax.
fn filters_to_prompt(filters: &SearchFilters) -> String {
    filters
        .pairs()
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

impl DashboardState {
    /// Per-frame update: animation tick, notification expiry and the clock.
    pub fn update(&mut self, now: Instant) {
        self.tick += 1;
        self.engine.tick(now);
        self.refresh_clock(now);
        let len = self.selection_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Requests issued when the UI starts.
    pub fn initial_requests(&mut self) -> Vec<SyncRequest> {
        vec![
            self.engine.refresh_dashboard(),
            self.engine.load_next_number(),
        ]
    }

    /// Switches section and loads what it shows.
    pub fn enter_section(&mut self, section: Section) -> Vec<SyncRequest> {
        self.section = section;
        self.selected = 0;
        self.input_mode = InputMode::Normal;
        self.reload_section()
    }

    fn reload_section(&mut self) -> Vec<SyncRequest> {
        match self.section {
            Section::Dashboard | Section::Agenda => vec![self.engine.refresh_dashboard()],
            Section::Search => match self.engine.search_state() {
                SearchState::NotSearched => Vec::new(),
                _ => vec![self.engine.repeat_search()],
            },
            Section::Record => {
                if self.engine.edit_mode().is_editing() {
                    Vec::new()
                } else {
                    vec![self.engine.load_next_number()]
                }
            }
            Section::Statistics => {
                let range = self.engine.stats_range().clone();
                vec![self.engine.load_statistics(range)]
            }
            Section::Audit => vec![self.engine.load_audit_log()],
            Section::Map => vec![self.engine.refresh_map()],
        }
    }

    fn selection_len(&self) -> usize {
        let snapshot = self.engine.snapshot();
        match self.section {
            Section::Dashboard => snapshot.today_appointments.len(),
            Section::Agenda => snapshot.week_appointments.len(),
            Section::Search => match self.engine.search_state() {
                SearchState::Results(records) => records.len(),
                _ => 0,
            },
            Section::Audit => self.engine.audit_log().len(),
            Section::Map => self.engine.map_zones().len(),
            Section::Record | Section::Statistics => 0,
        }
    }

    /// Id of the highlighted appointment; the agenda lists them grouped by day.
    pub fn selected_appointment(&self) -> Option<u64> {
        let snapshot = self.engine.snapshot();
        match self.section {
            Section::Dashboard => snapshot.today_appointments.get(self.selected)?.id,
            Section::Agenda => group_appointments_by_date(&snapshot.week_appointments)
                .into_iter()
                .flat_map(|group| group.appointments)
                .nth(self.selected)?
                .id,
            _ => None,
        }
    }

    fn selected_record(&self) -> Option<u32> {
        match self.engine.search_state() {
            SearchState::Results(records) => records.get(self.selected).map(|r| r.record_number),
            _ => None,
        }
    }

    fn selected_zone(&self) -> Option<u64> {
        self.engine.map_zones().get(self.selected)?.id
    }

    fn open_prompt(&mut self, kind: PromptKind, buffer: String) -> Reaction {
        self.input_mode = InputMode::Prompt { kind, buffer };
        Reaction::default()
    }

    fn notify_error(&mut self, topic: Topic, msg: impl Into<String>) {
        self.engine.notifier_mut().push(Event::error(topic, msg));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Reaction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Reaction::quit();
        }
        match self.input_mode.clone() {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Prompt { kind, buffer } => self.handle_prompt_key(key, kind, buffer),
            InputMode::Form => self.handle_form_key(key),
            InputMode::Confirm(action) => self.handle_confirm_key(key, action),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Reaction {
        let sections: Vec<Section> = Section::iter().collect();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Reaction::quit(),
            KeyCode::Tab => {
                let next = sections[(self.section.index() + 1) % sections.len()];
                return Reaction::send_all(self.enter_section(next));
            }
            KeyCode::BackTab => {
                let prev = sections[(self.section.index() + sections.len() - 1) % sections.len()];
                return Reaction::send_all(self.enter_section(prev));
            }
            KeyCode::Char(c @ '1'..='7') => {
                let index = c as usize - '1' as usize;
                return Reaction::send_all(self.enter_section(sections[index]));
            }
            KeyCode::Char('r') => return Reaction::send_all(self.reload_section()),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                return Reaction::default();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.selection_len() {
                    self.selected += 1;
                }
                return Reaction::default();
            }
            KeyCode::Char('E') => {
                let dir = self.export_dir.clone();
                return Reaction::send(self.engine.export(dir));
            }
            KeyCode::Char('L') => {
                self.input_mode = InputMode::Confirm(PendingAction::Logout);
                return Reaction::default();
            }
            _ => {}
        }

        match (self.section, key.code) {
            (Section::Dashboard | Section::Agenda, KeyCode::Char(c @ ('c' | 'x' | 'p'))) => {
                let status = match c {
                    'c' => AppointmentStatus::Completed,
                    'x' => AppointmentStatus::Cancelled,
                    _ => AppointmentStatus::Pending,
                };
                match self.selected_appointment() {
                    Some(id) => Reaction::send(self.engine.update_appointment_status(id, status)),
                    None => Reaction::default(),
                }
            }
            (Section::Dashboard | Section::Agenda, KeyCode::Char('d')) => {
                if let Some(id) = self.selected_appointment() {
                    self.input_mode = InputMode::Confirm(PendingAction::DeleteAppointment(id));
                }
                Reaction::default()
            }
            (Section::Dashboard | Section::Agenda, KeyCode::Char('a')) => {
                self.open_prompt(PromptKind::Appointment, String::new())
            }
            (Section::Search, KeyCode::Char('/') | KeyCode::Enter) => {
                self.input_mode = InputMode::Prompt {
                    kind: PromptKind::Search,
                    buffer: filters_to_prompt(self.engine.last_filters()),
                };
                Reaction::default()
            }
            (Section::Search, KeyCode::Char('e')) => match self.selected_record() {
                Some(number) => {
                    self.section = Section::Record;
                    Reaction::send(self.engine.edit_record(number))
                }
                None => Reaction::default(),
            },
            (Section::Search, KeyCode::Char('d')) => {
                if let Some(number) = self.selected_record() {
                    self.input_mode = InputMode::Confirm(PendingAction::DeleteRecord(number));
                }
                Reaction::default()
            }
            (Section::Record, KeyCode::Enter | KeyCode::Char('i')) => {
                self.input_mode = InputMode::Form;
                Reaction::default()
            }
            (Section::Record, KeyCode::Char('n')) => Reaction::send(self.engine.cancel_edit()),
            (Section::Statistics, KeyCode::Char('f')) => {
                let range = self.engine.stats_range();
                let mut buffer = Vec::new();
                if let Some(from) = &range.from {
                    buffer.push(format!("desde={}", from));
                }
                if let Some(to) = &range.to {
                    buffer.push(format!("hasta={}", to));
                }
                self.input_mode = InputMode::Prompt {
                    kind: PromptKind::StatsRange,
                    buffer: buffer.join(" "),
                };
                Reaction::default()
            }
            (Section::Map, KeyCode::Char('a')) => self.open_prompt(PromptKind::Zone(None), String::new()),
            (Section::Map, KeyCode::Char('e')) => {
                match self.engine.map_zones().get(self.selected) {
                    Some(zone @ MapZone { id: Some(id), .. }) => {
                        let (id, buffer) = (*id, zone.to_prompt());
                        self.open_prompt(PromptKind::Zone(Some(id)), buffer)
                    }
                    _ => Reaction::default(),
                }
            }
            (Section::Map, KeyCode::Char('d')) => {
                if let Some(id) = self.selected_zone() {
                    self.input_mode = InputMode::Confirm(PendingAction::DeleteZone(id));
                }
                Reaction::default()
            }
            _ => Reaction::default(),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent, kind: PromptKind, mut buffer: String) -> Reaction {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                Reaction::default()
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                match kind {
                    PromptKind::Search => match SearchFilters::parse_prompt(&buffer) {
                        Ok(filters) => {
                            self.selected = 0;
                            Reaction::send(self.engine.search(filters))
                        }
                        Err(msg) => {
                            self.notify_error(Topic::Search, msg);
                            Reaction::default()
                        }
                    },
                    PromptKind::StatsRange => match parse_range(&buffer) {
                        Ok(range) => Reaction::send(self.engine.load_statistics(range)),
                        Err(msg) => {
                            self.notify_error(Topic::Statistics, msg);
                            Reaction::default()
                        }
                    },
                    PromptKind::Appointment => match NewAppointment::parse_prompt(&buffer) {
                        Ok(appointment) => Reaction::send(self.engine.create_appointment(appointment)),
                        Err(msg) => {
                            self.notify_error(Topic::Appointments, msg);
                            Reaction::default()
                        }
                    },
                    PromptKind::Zone(existing_id) => {
                        let base = existing_id
                            .and_then(|id| self.engine.map_zones().iter().find(|z| z.id == Some(id)))
                            .cloned();
                        match MapZone::parse_prompt(&buffer, base.as_ref()) {
                            Ok(zone) => Reaction::send(self.engine.upsert_map_zone(zone, existing_id)),
                            Err(msg) => {
                                self.notify_error(Topic::Map, msg);
                                Reaction::default()
                            }
                        }
                    }
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.input_mode = InputMode::Prompt { kind, buffer };
                Reaction::default()
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                self.input_mode = InputMode::Prompt { kind, buffer };
                Reaction::default()
            }
            _ => Reaction::default(),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Reaction {
        let form = self.engine.form_mut();
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Up | KeyCode::BackTab => form.focus_prev(),
            KeyCode::Down | KeyCode::Tab => form.focus_next(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if form.focus() == FormField::AttentionType =>
            {
                form.toggle_attention_type()
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) if form.focus() != FormField::AttentionType => form.input_char(c),
            KeyCode::Enter => {
                let request = self.engine.submit_form();
                if request.is_some() {
                    self.input_mode = InputMode::Normal;
                }
                return Reaction::maybe(request);
            }
            _ => {}
        }
        Reaction::default()
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, action: PendingAction) -> Reaction {
        self.input_mode = InputMode::Normal;
        let accepted = matches!(key.code, KeyCode::Char('y' | 'Y' | 's' | 'S'));
        match action {
            PendingAction::DeleteRecord(number) => {
                Reaction::maybe(self.engine.delete_record(number, &accepted))
            }
            PendingAction::DeleteAppointment(id) => {
                Reaction::maybe(self.engine.delete_appointment(id, &accepted))
            }
            PendingAction::DeleteZone(id) => {
                Reaction::maybe(self.engine.delete_map_zone(id, &accepted))
            }
            PendingAction::Logout if accepted => Reaction::send(self.engine.logout()),
            PendingAction::Logout => Reaction::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EditMode, MapData, SyncOutcome, ViewSyncEngine};
    use crate::environment::Environment;
    use crate::ui::app::UIConfig;
    use crossterm::event::KeyEventKind;
    use std::collections::HashMap;

    fn state() -> DashboardState {
        DashboardState::new(
            ViewSyncEngine::new(),
            Environment::Local,
            Instant::now(),
            UIConfig::new(false, std::env::temp_dir()),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn type_text(state: &mut DashboardState, text: &str) {
        for c in text.chars() {
            state.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn number_keys_switch_sections_and_load_them() {
        let mut state = state();
        let reaction = state.handle_key(press(KeyCode::Char('7')));
        assert_eq!(state.section, Section::Map);
        assert!(matches!(reaction.requests.as_slice(), [SyncRequest::Map(_)]));

        let reaction = state.handle_key(press(KeyCode::Tab));
        assert_eq!(state.section, Section::Dashboard);
        assert!(matches!(reaction.requests.as_slice(), [SyncRequest::Dashboard(_)]));
    }

    #[test]
    fn search_prompt_issues_a_search() {
        let mut state = state();
        state.enter_section(Section::Search);
        state.handle_key(press(KeyCode::Char('/')));
        type_text(&mut state, "especie=gato");
        let reaction = state.handle_key(press(KeyCode::Enter));

        match reaction.requests.as_slice() {
            [SyncRequest::Search(_, filters)] => {
                assert_eq!(filters.especie.as_deref(), Some("gato"))
            }
            other => panic!("unexpected requests {:?}", other),
        }
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn bad_search_prompt_notifies_instead_of_sending() {
        let mut state = state();
        state.enter_section(Section::Search);
        state.handle_key(press(KeyCode::Enter));
        type_text(&mut state, "color=rojo");
        let reaction = state.handle_key(press(KeyCode::Enter));
        assert!(reaction.requests.is_empty());
        assert_eq!(
            state.engine.notifier().latest().unwrap().msg,
            "Filtro desconocido: color"
        );
    }

    #[test]
    fn reopened_search_prompt_keeps_spaced_values() {
        let filters = SearchFilters {
            barrio: Some("San Martín".to_string()),
            especie: Some("perro".to_string()),
            ..Default::default()
        };
        let prompt = filters_to_prompt(&filters);
        assert_eq!(SearchFilters::parse_prompt(&prompt), Ok(filters));
    }

    #[test]
    fn appointment_prompt_creates_an_appointment() {
        let mut state = state();
        state.enter_section(Section::Agenda);
        state.handle_key(press(KeyCode::Char('a')));
        assert!(matches!(
            state.input_mode,
            InputMode::Prompt { kind: PromptKind::Appointment, .. }
        ));
        type_text(
            &mut state,
            "fecha=2026-10-20 hora=09:00 animal=Toby tutor=Juan Gómez tipo=castracion obs=en ayunas",
        );
        let reaction = state.handle_key(press(KeyCode::Enter));
        match reaction.requests.as_slice() {
            [SyncRequest::CreateAppointment(appointment)] => {
                assert_eq!(appointment.guardian_name, "Juan Gómez");
                assert_eq!(appointment.notes, "en ayunas");
            }
            other => panic!("unexpected requests {:?}", other),
        }
    }

    #[test]
    fn incomplete_appointment_prompt_notifies() {
        let mut state = state();
        state.handle_key(press(KeyCode::Char('a')));
        type_text(&mut state, "fecha=2026-10-20 animal=Toby");
        let reaction = state.handle_key(press(KeyCode::Enter));
        assert!(reaction.requests.is_empty());
        assert_eq!(
            state.engine.notifier().latest().unwrap().msg,
            "Falta el campo: hora"
        );
    }

    #[test]
    fn map_prompts_create_and_edit_zones() {
        let mut state = state();
        let token = match state.enter_section(Section::Map).as_slice() {
            [SyncRequest::Map(token)] => *token,
            other => panic!("unexpected requests {:?}", other),
        };
        let zone = MapZone {
            id: Some(9),
            name: "Villa Sarita".to_string(),
            latitude: -27.36,
            longitude: -55.89,
            color: "#ff0000".to_string(),
            derived_count: 0,
        };
        state.engine.apply(SyncOutcome::Map(
            token,
            Ok(MapData {
                zones: vec![zone],
                counts: HashMap::new(),
            }),
        ));

        state.handle_key(press(KeyCode::Char('e')));
        assert_eq!(
            state.input_mode,
            InputMode::Prompt {
                kind: PromptKind::Zone(Some(9)),
                buffer: "nombre=Villa Sarita lat=-27.36 lng=-55.89 color=#ff0000".to_string(),
            }
        );
        type_text(&mut state, " lat=-27.4");
        match state.handle_key(press(KeyCode::Enter)).requests.as_slice() {
            [SyncRequest::SaveZone(Some(9), saved)] => {
                assert_eq!(saved.name, "Villa Sarita");
                assert_eq!(saved.latitude, -27.4);
            }
            other => panic!("unexpected requests {:?}", other),
        }

        state.handle_key(press(KeyCode::Char('a')));
        type_text(&mut state, "nombre=Centro lat=-27.37 lng=-55.9");
        match state.handle_key(press(KeyCode::Enter)).requests.as_slice() {
            [SyncRequest::SaveZone(None, created)] => assert_eq!(created.color, "#6366f1"),
            other => panic!("unexpected requests {:?}", other),
        }
    }

    #[test]
    fn declining_logout_sends_nothing() {
        let mut state = state();
        state.handle_key(press(KeyCode::Char('L')));
        assert_eq!(state.input_mode, InputMode::Confirm(PendingAction::Logout));
        let reaction = state.handle_key(press(KeyCode::Char('n')));
        assert!(reaction.requests.is_empty());
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn form_typing_and_submit() {
        let mut state = state();
        state.enter_section(Section::Record);
        state.handle_key(press(KeyCode::Enter));
        assert_eq!(state.input_mode, InputMode::Form);
        type_text(&mut state, "15");
        let reaction = state.handle_key(press(KeyCode::Enter));
        match reaction.requests.as_slice() {
            [SyncRequest::Submit(_, record)] => assert_eq!(record.record_number, 15),
            other => panic!("unexpected requests {:?}", other),
        }
        assert_eq!(state.engine.edit_mode(), EditMode::Idle);
    }

    #[test]
    fn stats_range_prompt() {
        assert_eq!(
            parse_range("desde=2025-01-01").unwrap(),
            DateRange {
                from: Some("2025-01-01".to_string()),
                to: None
            }
        );
        assert!(parse_range("2025").is_err());
    }

    #[test]
    fn quit_keys() {
        let mut state = state();
        assert!(state.handle_key(press(KeyCode::Char('q'))).quit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(state.handle_key(ctrl_c).quit);
    }
}
