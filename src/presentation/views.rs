//! Snapshot to presentation model
//!
//! Pure functions; nothing here touches the terminal. The UI and the headless
//! printers both render these models.

use crate::consts::cli_consts::ui::TOP_NEIGHBORHOODS;
use crate::dates::{format_display_date, format_month_label, format_schedule_day, format_timestamp};
use crate::engine::{SearchState, group_appointments_by_date};
use crate::models::{
    Appointment, AppointmentStatus, AttentionType, AuditEntry, CareRecord, GroupCount, MapZone,
    NeighborhoodEntry, RecentRecord, RecordSnapshot, Statistics,
};

pub const NO_APPOINTMENTS_TODAY: &str = "No hay turnos programados para hoy";
pub const NO_RECENT_RECORDS: &str = "No hay atenciones recientes";
pub const NO_APPOINTMENTS_THIS_WEEK: &str = "No hay turnos programados para esta semana";
pub const NO_RESULTS: &str = "No se encontraron resultados";
pub const NOT_SEARCHED: &str = "Ingrese filtros y presione Enter para buscar";
pub const NO_AUDIT_ENTRIES: &str = "No hay registros de auditoría";
pub const NO_MAP_ZONES: &str = "No hay barrios cargados en el mapa";
pub const NO_NEIGHBORHOODS: &str = "No hay barrios registrados";

const AGE_FALLBACK: &str = "No especificada";
const PHONE_FALLBACK: &str = "No registrado";
const ADDRESS_FALLBACK: &str = "No registrada";
const NEIGHBORHOOD_FALLBACK: &str = "No especificado";

/// Rows, or the message shown in their place.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Rows(Vec<T>),
    Empty(&'static str),
}

impl<T> Listing<T> {
    fn from_rows(rows: Vec<T>, empty: &'static str) -> Self {
        if rows.is_empty() {
            Listing::Empty(empty)
        } else {
            Listing::Rows(rows)
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Listing::Rows(rows) => rows,
            Listing::Empty(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub label: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentRow {
    pub id: Option<u64>,
    pub time: String,
    pub animal: String,
    pub guardian: String,
    pub kind: String,
    pub status: AppointmentStatus,
}

impl From<&Appointment> for AppointmentRow {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id,
            time: appointment.time.clone(),
            animal: appointment.animal_name.clone(),
            guardian: appointment.guardian_name.clone(),
            kind: AttentionType::label_for(&appointment.kind),
            status: appointment.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentRow {
    pub number: u32,
    pub date: String,
    pub kind: &'static str,
    pub animal: String,
    pub species: String,
    pub guardian: String,
}

impl From<&RecentRecord> for RecentRow {
    fn from(record: &RecentRecord) -> Self {
        Self {
            number: record.record_number,
            date: format_display_date(&record.date),
            kind: record.attention_type.label(),
            animal: record.animal_name.clone(),
            species: record.species.clone(),
            guardian: record.guardian_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDay {
    pub header: String,
    pub rows: Vec<AppointmentRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub counters: Vec<Counter>,
    pub today: Listing<AppointmentRow>,
    pub recent: Listing<RecentRow>,
    pub week: Listing<ScheduleDay>,
}

pub fn dashboard_view(snapshot: &RecordSnapshot) -> DashboardView {
    let mut counters = vec![
        Counter {
            label: "Atenciones hoy",
            value: snapshot.today_count,
        },
        Counter {
            label: "Esta semana",
            value: snapshot.week_count,
        },
        Counter {
            label: "Este mes",
            value: snapshot.month_count,
        },
        Counter {
            label: "Atención primaria hoy",
            value: snapshot.primary_care_count,
        },
    ];
    if let Some(recurrent) = snapshot.recurrent_today {
        counters.push(Counter {
            label: "Recurrentes hoy",
            value: recurrent,
        });
    }

    let today = snapshot
        .today_appointments
        .iter()
        .map(AppointmentRow::from)
        .collect();
    let recent = snapshot.recent_records.iter().map(RecentRow::from).collect();
    let week = group_appointments_by_date(&snapshot.week_appointments)
        .into_iter()
        .map(|group| ScheduleDay {
            header: format_schedule_day(&group.date),
            rows: group.appointments.iter().map(AppointmentRow::from).collect(),
        })
        .collect();

    DashboardView {
        counters,
        today: Listing::from_rows(today, NO_APPOINTMENTS_TODAY),
        recent: Listing::from_rows(recent, NO_RECENT_RECORDS),
        week: Listing::from_rows(week, NO_APPOINTMENTS_THIS_WEEK),
    }
}

/// One search result with display fallbacks applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub number: u32,
    pub date: String,
    pub kind: &'static str,
    pub animal: String,
    pub species: String,
    pub sex: String,
    pub age: String,
    pub guardian: String,
    pub national_id: String,
    pub phone: String,
    pub address: String,
    pub neighborhood: String,
}

fn or_fallback(value: &Option<String>, fallback: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

impl From<&CareRecord> for RecordRow {
    fn from(record: &CareRecord) -> Self {
        Self {
            number: record.record_number,
            date: format_display_date(&record.date),
            kind: record.attention_type.label(),
            animal: record.animal_name.clone(),
            species: record.species.clone(),
            sex: record.sex.clone(),
            age: or_fallback(&record.age, AGE_FALLBACK),
            guardian: record.guardian.full_name.clone(),
            national_id: record.guardian.national_id.clone(),
            phone: or_fallback(&record.guardian.phone, PHONE_FALLBACK),
            address: or_fallback(&record.guardian.address, ADDRESS_FALLBACK),
            neighborhood: or_fallback(&record.guardian.neighborhood, NEIGHBORHOOD_FALLBACK),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchView {
    NotSearched(&'static str),
    NoResults(&'static str),
    Results(Vec<RecordRow>),
}

pub fn search_view(state: &SearchState) -> SearchView {
    match state {
        SearchState::NotSearched => SearchView::NotSearched(NOT_SEARCHED),
        SearchState::NoResults => SearchView::NoResults(NO_RESULTS),
        SearchState::Results(records) => {
            SearchView::Results(records.iter().map(RecordRow::from).collect())
        }
    }
}

/// Label/value pairs of a single record, primary-care fields included only
/// when they apply.
pub fn record_detail(record: &CareRecord) -> Vec<(&'static str, String)> {
    let row = RecordRow::from(record);
    let mut fields = vec![
        ("Número", row.number.to_string()),
        ("Fecha", row.date),
        ("Tipo", row.kind.to_string()),
        ("Animal", row.animal),
        ("Especie", row.species),
        ("Sexo", row.sex),
        ("Edad", row.age),
        ("Tutor", row.guardian),
        ("DNI", row.national_id),
        ("Teléfono", row.phone),
        ("Dirección", row.address),
        ("Barrio", row.neighborhood),
    ];
    if record.attention_type == AttentionType::PrimaryCare {
        for (label, value) in [
            ("Motivo", &record.motive),
            ("Diagnóstico", &record.diagnosis),
            ("Tratamiento", &record.treatment),
            ("Derivación", &record.referral),
        ] {
            fields.push((label, or_fallback(value, "-")));
        }
    }
    if let Some(notes) = record.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        fields.push(("Observaciones", notes.to_string()));
    }
    fields
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsView {
    pub total: u64,
    pub by_type: Vec<Bar>,
    pub by_species: Vec<Bar>,
    pub by_sex: Vec<Bar>,
    pub by_month: Vec<Bar>,
    pub top_neighborhoods: Vec<Bar>,
}

fn bars(counts: &[GroupCount], label: impl Fn(&str) -> String) -> Vec<Bar> {
    counts
        .iter()
        .map(|group| Bar {
            label: if group.label.trim().is_empty() {
                NEIGHBORHOOD_FALLBACK.to_string()
            } else {
                label(&group.label)
            },
            value: group.count,
        })
        .collect()
}

pub fn statistics_view(stats: &Statistics) -> StatisticsView {
    let by_type = bars(&stats.by_type, AttentionType::label_for);
    let total = stats
        .total
        .unwrap_or_else(|| by_type.iter().map(|bar| bar.value).sum());

    let mut top_neighborhoods = bars(&stats.by_neighborhood, str::to_string);
    // Stable: ties keep the server's order.
    top_neighborhoods.sort_by(|a, b| b.value.cmp(&a.value));
    top_neighborhoods.truncate(TOP_NEIGHBORHOODS);

    StatisticsView {
        total,
        by_type,
        by_species: bars(&stats.by_species, str::to_string),
        by_sex: bars(&stats.by_sex, str::to_string),
        by_month: bars(&stats.by_month, format_month_label),
        top_neighborhoods,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    pub timestamp: String,
    pub operation: String,
    pub user: String,
    pub description: String,
}

pub fn audit_view(entries: &[AuditEntry]) -> Listing<AuditRow> {
    let rows = entries
        .iter()
        .map(|entry| AuditRow {
            timestamp: format_timestamp(&entry.timestamp),
            operation: entry.operation.clone(),
            user: or_fallback(&entry.user, "Sistema"),
            description: or_fallback(&entry.description, "-"),
        })
        .collect();
    Listing::from_rows(rows, NO_AUDIT_ENTRIES)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub id: Option<u64>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub count: u64,
    pub color: (u8, u8, u8),
}

/// Bounding box as `(min, max)` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub longitude: (f64, f64),
    pub latitude: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub points: Listing<MapPoint>,
    pub total_records: u64,
    pub bounds: Option<Bounds>,
}

const DEFAULT_ZONE_RGB: (u8, u8, u8) = (0x63, 0x66, 0xf1);
const MAP_MARGIN_DEG: f64 = 0.01;

/// `#rrggbb` to RGB.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

pub fn map_view(zones: &[MapZone]) -> MapView {
    let points: Vec<MapPoint> = zones
        .iter()
        .map(|zone| MapPoint {
            id: zone.id,
            name: zone.name.clone(),
            latitude: zone.latitude,
            longitude: zone.longitude,
            count: zone.derived_count,
            color: parse_hex_color(&zone.color).unwrap_or(DEFAULT_ZONE_RGB),
        })
        .collect();

    let bounds = points.iter().fold(None, |acc: Option<Bounds>, p| {
        let (lon, lat) = (p.longitude, p.latitude);
        Some(match acc {
            None => Bounds {
                longitude: (lon, lon),
                latitude: (lat, lat),
            },
            Some(b) => Bounds {
                longitude: (b.longitude.0.min(lon), b.longitude.1.max(lon)),
                latitude: (b.latitude.0.min(lat), b.latitude.1.max(lat)),
            },
        })
    });
    let bounds = bounds.map(|b| Bounds {
        longitude: (b.longitude.0 - MAP_MARGIN_DEG, b.longitude.1 + MAP_MARGIN_DEG),
        latitude: (b.latitude.0 - MAP_MARGIN_DEG, b.latitude.1 + MAP_MARGIN_DEG),
    });

    MapView {
        total_records: points.iter().map(|p| p.count).sum(),
        points: Listing::from_rows(points, NO_MAP_ZONES),
        bounds,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodRow {
    pub name: String,
    pub records: u64,
    pub variants: String,
}

pub fn neighborhoods_view(entries: &[NeighborhoodEntry]) -> Listing<NeighborhoodRow> {
    let rows = entries
        .iter()
        .map(|entry| NeighborhoodRow {
            name: entry.name.clone(),
            records: entry.record_count,
            variants: entry.variants.join(", "),
        })
        .collect();
    Listing::from_rows(rows, NO_NEIGHBORHOODS)
}
