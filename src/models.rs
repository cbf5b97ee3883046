//! Wire types of the clinic backend.
//!
//! Field names follow the backend's JSON (Spanish) through serde renames; the
//! Rust side uses English names.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::dates::{NormalizedDate, normalize_date};

/// Kind of attention a care record documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttentionType {
    #[default]
    #[serde(rename = "castracion")]
    Sterilization,
    #[serde(rename = "atencion_primaria")]
    PrimaryCare,
}

impl AttentionType {
    /// Value used on the wire and in query strings.
    pub fn as_wire(&self) -> &'static str {
        match self {
            AttentionType::Sterilization => "castracion",
            AttentionType::PrimaryCare => "atencion_primaria",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            AttentionType::Sterilization => "Castración",
            AttentionType::PrimaryCare => "Atención Primaria",
        }
    }

    /// Label for an arbitrary wire value; unknown values are shown as-is.
    pub fn label_for(raw: &str) -> String {
        raw.parse::<AttentionType>()
            .map(|t| t.label().to_string())
            .unwrap_or_else(|_| raw.to_string())
    }
}

impl FromStr for AttentionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "castracion" | "castración" => Ok(AttentionType::Sterilization),
            "atencion_primaria" | "atención primaria" | "primaria" => Ok(AttentionType::PrimaryCare),
            other => Err(format!("Unknown attention type: {}", other)),
        }
    }
}

impl Display for AttentionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Appointment lifecycle.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum AppointmentStatus {
    #[default]
    #[serde(rename = "pendiente")]
    #[strum(serialize = "pendiente")]
    Pending,
    #[serde(rename = "completado")]
    #[strum(serialize = "completado")]
    Completed,
    #[serde(rename = "cancelado")]
    #[strum(serialize = "cancelado")]
    Cancelled,
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" | "pending" => Ok(AppointmentStatus::Pending),
            "completado" | "completed" => Ok(AppointmentStatus::Completed),
            "cancelado" | "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

/// A scheduled visit (turno).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Server-assigned; some aggregate listings omit it.
    #[serde(default)]
    pub id: Option<u64>,
    /// Calendar date as sent by the server (ISO-8601 in practice).
    #[serde(rename = "fecha", default)]
    pub date: String,
    #[serde(rename = "hora", default)]
    pub time: String,
    #[serde(rename = "nombre_animal", default)]
    pub animal_name: String,
    #[serde(rename = "tutor_nombre", default)]
    pub guardian_name: String,
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(rename = "estado", default)]
    pub status: AppointmentStatus,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "observaciones", default)]
    pub notes: Option<String>,
}

/// Payload of `POST /api/turnos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewAppointment {
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "hora")]
    pub time: String,
    #[serde(rename = "nombre_animal")]
    pub animal_name: String,
    #[serde(rename = "tutor_nombre")]
    pub guardian_name: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "observaciones")]
    pub notes: String,
}

/// Embedded guardian (tutor) data of a care record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianInfo {
    #[serde(rename = "nombre_apellido", default)]
    pub full_name: String,
    #[serde(rename = "dni", default)]
    pub national_id: String,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "barrio", default)]
    pub neighborhood: Option<String>,
}

/// A clinic visit record (atención).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareRecord {
    #[serde(rename = "numero")]
    pub record_number: u32,
    #[serde(rename = "fecha", default)]
    pub date: String,
    #[serde(rename = "tipo_atencion", default)]
    pub attention_type: AttentionType,
    #[serde(rename = "nombre_animal", default)]
    pub animal_name: String,
    #[serde(rename = "especie", default)]
    pub species: String,
    #[serde(rename = "sexo", default)]
    pub sex: String,
    #[serde(rename = "edad", default)]
    pub age: Option<String>,
    #[serde(rename = "tutor", default)]
    pub guardian: GuardianInfo,
    #[serde(rename = "motivo", default)]
    pub motive: Option<String>,
    #[serde(rename = "diagnostico", default)]
    pub diagnosis: Option<String>,
    #[serde(rename = "tratamiento", default)]
    pub treatment: Option<String>,
    #[serde(rename = "derivacion", default)]
    pub referral: Option<String>,
    #[serde(rename = "observaciones", default)]
    pub notes: Option<String>,
}

/// Flattened create/update payload for `/api/atenciones`.
///
/// Guardian fields travel at the top level and optional fields as empty
/// strings, which is what the backend's form handlers read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSubmission {
    pub numero: u32,
    pub fecha: String,
    pub tipo_atencion: AttentionType,
    pub nombre_animal: String,
    pub especie: String,
    pub sexo: String,
    pub edad: String,
    pub nombre_apellido: String,
    pub dni: String,
    pub telefono: String,
    pub direccion: String,
    pub barrio: String,
    pub motivo: String,
    pub diagnostico: String,
    pub tratamiento: String,
    pub derivacion: String,
    pub observaciones: String,
}

fn or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl From<&CareRecord> for RecordSubmission {
    fn from(record: &CareRecord) -> Self {
        // Dates read back from the server may come in any supported shape;
        // the backend stores ISO dates.
        let fecha = match normalize_date(&record.date) {
            NormalizedDate::Parsed(date) => date.format("%Y-%m-%d").to_string(),
            NormalizedDate::Unparsed(raw) => raw,
        };
        Self {
            numero: record.record_number,
            fecha,
            tipo_atencion: record.attention_type,
            nombre_animal: record.animal_name.clone(),
            especie: record.species.clone(),
            sexo: record.sex.clone(),
            edad: or_empty(&record.age),
            nombre_apellido: record.guardian.full_name.clone(),
            dni: record.guardian.national_id.clone(),
            telefono: or_empty(&record.guardian.phone),
            direccion: or_empty(&record.guardian.address),
            barrio: or_empty(&record.guardian.neighborhood),
            motivo: or_empty(&record.motive),
            diagnostico: or_empty(&record.diagnosis),
            tratamiento: or_empty(&record.treatment),
            derivacion: or_empty(&record.referral),
            observaciones: or_empty(&record.notes),
        }
    }
}

/// Abbreviated record listed on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentRecord {
    #[serde(rename = "numero")]
    pub record_number: u32,
    #[serde(rename = "fecha", default)]
    pub date: String,
    #[serde(rename = "tipo_atencion", default)]
    pub attention_type: AttentionType,
    #[serde(rename = "nombre_animal", default)]
    pub animal_name: String,
    #[serde(rename = "especie", default)]
    pub species: String,
    #[serde(rename = "tutor", default)]
    pub guardian_name: String,
}

/// Dashboard aggregate. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    #[serde(rename = "hoy", default)]
    pub today_count: u64,
    #[serde(rename = "semana", default)]
    pub week_count: u64,
    #[serde(rename = "mes", default)]
    pub month_count: u64,
    #[serde(rename = "primaria_hoy", default)]
    pub primary_care_count: u64,
    #[serde(rename = "recurrente_hoy", default)]
    pub recurrent_today: Option<u64>,
    #[serde(rename = "turnos_hoy", default)]
    pub today_appointments: Vec<Appointment>,
    #[serde(rename = "ultimas", default)]
    pub recent_records: Vec<RecentRecord>,
    #[serde(rename = "turnos_semana", default)]
    pub week_appointments: Vec<Appointment>,
}

/// One bucket of a grouped statistic.
///
/// The backend has sent both `["perro", 12]` pairs and
/// `{"especie": "perro", "cantidad": 12}` objects over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGroupCount")]
pub struct GroupCount {
    pub label: String,
    pub count: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGroupCount {
    Pair(Option<serde_json::Value>, u64),
    Object(serde_json::Map<String, serde_json::Value>),
}

fn value_label(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl TryFrom<RawGroupCount> for GroupCount {
    type Error = String;

    fn try_from(raw: RawGroupCount) -> Result<Self, Self::Error> {
        match raw {
            RawGroupCount::Pair(label, count) => Ok(GroupCount {
                label: label.as_ref().map(value_label).unwrap_or_default(),
                count,
            }),
            RawGroupCount::Object(map) => {
                let count = map
                    .get("cantidad")
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| "grouped count without 'cantidad'".to_string())?;
                let label = map
                    .iter()
                    .find(|(key, _)| key.as_str() != "cantidad")
                    .map(|(_, v)| value_label(v))
                    .unwrap_or_default();
                Ok(GroupCount { label, count })
            }
        }
    }
}

/// Aggregates returned by `/api/estadisticas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(rename = "por_tipo", default)]
    pub by_type: Vec<GroupCount>,
    #[serde(rename = "por_especie", default)]
    pub by_species: Vec<GroupCount>,
    #[serde(rename = "por_sexo", default)]
    pub by_sex: Vec<GroupCount>,
    #[serde(rename = "por_mes", default)]
    pub by_month: Vec<GroupCount>,
    #[serde(rename = "por_barrio", default)]
    pub by_neighborhood: Vec<GroupCount>,
}

/// One audit log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(rename = "fecha_hora", default)]
    pub timestamp: String,
    #[serde(rename = "tipo_operacion", default)]
    pub operation: String,
    #[serde(rename = "usuario", default)]
    pub user: Option<String>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "datos_anteriores", default)]
    pub previous_data: Option<String>,
    #[serde(rename = "datos_nuevos", default)]
    pub new_data: Option<String>,
}

fn default_zone_color() -> String {
    "#6366f1".to_string()
}

/// A geolocated coverage area (barrio) shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapZone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "latitud", alias = "lat")]
    pub latitude: f64,
    #[serde(rename = "longitud", alias = "lng", alias = "lon")]
    pub longitude: f64,
    #[serde(default = "default_zone_color")]
    pub color: String,
    /// Joined client-side from the per-neighborhood statistics.
    #[serde(skip)]
    pub derived_count: u64,
}

/// Entry of `/api/barrios/lista`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodEntry {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "registros", default)]
    pub record_count: u64,
    #[serde(rename = "variantes", default)]
    pub variants: Vec<String>,
}

/// Generic `{success, message}` reply of mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerReply {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ServerReply {
    /// A reply without a `success` flag counts as accepted.
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextNumber {
    pub numero: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    pub estado: AppointmentStatus,
}

/// Record search filters. Empty values are never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub numero: Option<String>,
    pub tipo_atencion: Option<String>,
    pub especie: Option<String>,
    pub dni: Option<String>,
    pub barrio: Option<String>,
    pub fecha_desde: Option<String>,
    pub fecha_hasta: Option<String>,
}

impl SearchFilters {
    /// Non-empty filter entries in wire order.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("numero", &self.numero),
            ("tipo_atencion", &self.tipo_atencion),
            ("especie", &self.especie),
            ("dni", &self.dni),
            ("barrio", &self.barrio),
            ("fecha_desde", &self.fecha_desde),
            ("fecha_hasta", &self.fecha_hasta),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    /// Encodes the non-empty entries as a query string (no leading `?`).
    pub fn to_query_string(&self) -> String {
        encode_query(&self.pairs())
    }

    /// Parses `key=value` entries as typed in the TUI search prompt.
    /// Unknown keys are reported back so the caller can notify.
    pub fn parse_prompt(input: &str) -> Result<Self, String> {
        const KEYS: &[&str] = &[
            "numero",
            "tipo",
            "tipo_atencion",
            "especie",
            "dni",
            "barrio",
            "desde",
            "fecha_desde",
            "hasta",
            "fecha_hasta",
        ];
        let mut filters = SearchFilters::default();
        for (key, value) in parse_prompt_pairs(input, KEYS).map_err(|e| e.describe("Filtro"))? {
            let value = Some(value);
            match key {
                "numero" => filters.numero = value,
                "tipo" | "tipo_atencion" => filters.tipo_atencion = value,
                "especie" => filters.especie = value,
                "dni" => filters.dni = value,
                "barrio" => filters.barrio = value,
                "desde" | "fecha_desde" => filters.fecha_desde = value,
                _ => filters.fecha_hasta = value,
            }
        }
        Ok(filters)
    }
}

/// Why a `key=value` prompt line was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    /// Text typed before any key.
    Dangling(String),
    UnknownKey(String),
}

impl PromptError {
    /// Spanish message, `noun` naming what the keys stand for.
    pub fn describe(&self, noun: &str) -> String {
        match self {
            PromptError::Dangling(word) => format!("{} inválido: {}", noun, word),
            PromptError::UnknownKey(key) => format!("{} desconocido: {}", noun, key),
        }
    }
}

/// Splits a prompt line into `key=value` entries, `keys` being the accepted
/// keys. A value runs up to the next word that opens an entry, so
/// `barrio=San Martín especie=perro` keeps both words of the neighborhood.
/// A later entry for the same key wins once the caller folds them.
pub fn parse_prompt_pairs<'k>(
    input: &str,
    keys: &[&'k str],
) -> Result<Vec<(&'k str, String)>, PromptError> {
    let mut entries: Vec<(&'k str, Vec<&str>)> = Vec::new();
    for word in input.split_whitespace() {
        if let Some((key, value)) = word.split_once('=') {
            if let Some(known) = keys.iter().find(|k| **k == key) {
                let first: Vec<&str> = Some(value).filter(|v| !v.is_empty()).into_iter().collect();
                entries.push((*known, first));
                continue;
            }
            // `2=dos` inside free text is kept; a word-like key is a typo
            if !key.is_empty() && key.chars().all(|c| c.is_alphabetic() || c == '_') {
                return Err(PromptError::UnknownKey(key.to_string()));
            }
        }
        match entries.last_mut() {
            Some((_, words)) => words.push(word),
            None => return Err(PromptError::Dangling(word.to_string())),
        }
    }
    Ok(entries
        .into_iter()
        .map(|(key, words)| (key, words.join(" ")))
        .collect())
}

impl NewAppointment {
    /// Keys of the appointment prompt.
    pub const PROMPT_KEYS: &'static [&'static str] = &[
        "fecha",
        "hora",
        "animal",
        "tutor",
        "tipo",
        "telefono",
        "obs",
        "observaciones",
    ];

    /// Builds an appointment from prompt entries. Date, time, animal,
    /// guardian and kind are required; the date may use any accepted format
    /// and is sent as ISO.
    pub fn parse_prompt(input: &str) -> Result<Self, String> {
        let mut appointment = NewAppointment::default();
        for (key, value) in
            parse_prompt_pairs(input, Self::PROMPT_KEYS).map_err(|e| e.describe("Campo"))?
        {
            match key {
                "fecha" => appointment.date = value,
                "hora" => appointment.time = value,
                "animal" => appointment.animal_name = value,
                "tutor" => appointment.guardian_name = value,
                "tipo" => appointment.kind = value,
                "telefono" => appointment.phone = value,
                _ => appointment.notes = value,
            }
        }
        let required = [
            ("fecha", &appointment.date),
            ("hora", &appointment.time),
            ("animal", &appointment.animal_name),
            ("tutor", &appointment.guardian_name),
            ("tipo", &appointment.kind),
        ];
        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(format!("Falta el campo: {}", key));
        }
        match normalize_date(&appointment.date) {
            NormalizedDate::Parsed(date) => appointment.date = date.format("%Y-%m-%d").to_string(),
            NormalizedDate::Unparsed(raw) => return Err(format!("Fecha inválida: {}", raw)),
        }
        Ok(appointment)
    }
}

impl MapZone {
    /// Keys of the zone prompt.
    pub const PROMPT_KEYS: &'static [&'static str] = &["nombre", "lat", "lng", "color"];

    /// Prompt text that reproduces this zone.
    pub fn to_prompt(&self) -> String {
        format!(
            "nombre={} lat={} lng={} color={}",
            self.name, self.latitude, self.longitude, self.color
        )
    }

    /// Builds a zone from prompt entries, starting from `base` when editing.
    /// A new zone needs a name and both coordinates.
    pub fn parse_prompt(input: &str, base: Option<&MapZone>) -> Result<Self, String> {
        let mut name = base.map(|z| z.name.clone());
        let mut latitude = base.map(|z| z.latitude);
        let mut longitude = base.map(|z| z.longitude);
        let mut color = base.map(|z| z.color.clone()).unwrap_or_else(default_zone_color);
        for (key, value) in
            parse_prompt_pairs(input, Self::PROMPT_KEYS).map_err(|e| e.describe("Campo"))?
        {
            match key {
                "nombre" => name = Some(value),
                "lat" => latitude = Some(parse_coordinate("lat", &value, 90.0)?),
                "lng" => longitude = Some(parse_coordinate("lng", &value, 180.0)?),
                _ if value.is_empty() => color = default_zone_color(),
                _ => color = value,
            }
        }
        let name = name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| "Falta el campo: nombre".to_string())?;
        let latitude = latitude.ok_or_else(|| "Falta el campo: lat".to_string())?;
        let longitude = longitude.ok_or_else(|| "Falta el campo: lng".to_string())?;
        Ok(MapZone {
            id: base.and_then(|z| z.id),
            name,
            latitude,
            longitude,
            color,
            derived_count: base.map(|z| z.derived_count).unwrap_or_default(),
        })
    }
}

fn parse_coordinate(key: &str, value: &str, limit: f64) -> Result<f64, String> {
    value
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or_else(|| format!("Coordenada inválida: {}={}", key, value))
}

/// Optional date range of the statistics view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRange {
    pub fn to_query_string(&self) -> String {
        let pairs: Vec<(&'static str, &str)> = [("fecha_desde", &self.from), ("fecha_hasta", &self.to)]
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| (key, v))
            })
            .collect();
        encode_query(&pairs)
    }
}

fn encode_query(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filters_produce_empty_query() {
        let filters = SearchFilters {
            numero: Some("".to_string()),
            especie: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(filters.is_empty());
        assert_eq!(filters.to_query_string(), "");
    }

    #[test]
    fn only_non_empty_filters_are_encoded() {
        let filters = SearchFilters {
            numero: Some("42".to_string()),
            barrio: Some("San Francisco".to_string()),
            fecha_hasta: Some("2025-11-30".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query_string(),
            "numero=42&barrio=San%20Francisco&fecha_hasta=2025-11-30"
        );
    }

    #[test]
    fn prompt_parsing_accepts_short_keys() {
        let filters = SearchFilters::parse_prompt("tipo=castracion desde=2025-01-01").unwrap();
        assert_eq!(filters.tipo_atencion.as_deref(), Some("castracion"));
        assert_eq!(filters.fecha_desde.as_deref(), Some("2025-01-01"));
        assert!(SearchFilters::parse_prompt("color=rojo").is_err());
        assert!(SearchFilters::parse_prompt("numero").is_err());
    }

    #[test]
    fn prompt_values_may_contain_spaces() {
        let filters = SearchFilters::parse_prompt("barrio=San Martín especie=perro").unwrap();
        assert_eq!(filters.barrio.as_deref(), Some("San Martín"));
        assert_eq!(filters.especie.as_deref(), Some("perro"));

        // Only known keys start a new entry
        assert_eq!(
            SearchFilters::parse_prompt("numero=4 color=rojo"),
            Err("Filtro desconocido: color".to_string())
        );
        assert_eq!(
            SearchFilters::parse_prompt("San Martín"),
            Err("Filtro inválido: San".to_string())
        );
    }

    #[test]
    fn appointment_prompt_requires_core_fields() {
        let appointment = NewAppointment::parse_prompt(
            "fecha=20/10/2026 hora=10:30 animal=Luna tutor=Ana María Pérez tipo=castracion",
        )
        .unwrap();
        assert_eq!(appointment.date, "2026-10-20");
        assert_eq!(appointment.guardian_name, "Ana María Pérez");
        assert_eq!(appointment.phone, "");

        assert_eq!(
            NewAppointment::parse_prompt("fecha=2026-10-20 hora=10:30 animal=Luna tipo=control"),
            Err("Falta el campo: tutor".to_string())
        );
    }

    #[test]
    fn zone_prompt_edits_keep_the_id() {
        let existing = MapZone {
            id: Some(9),
            name: "Centro".to_string(),
            latitude: -27.36,
            longitude: -55.89,
            color: "#ff0000".to_string(),
            derived_count: 4,
        };
        let edited = MapZone::parse_prompt("nombre=Villa Sarita lat=-27,37", Some(&existing)).unwrap();
        assert_eq!(edited.id, Some(9));
        assert_eq!(edited.name, "Villa Sarita");
        assert_eq!(edited.latitude, -27.37);
        assert_eq!(edited.longitude, -55.89);
        assert_eq!(edited.color, "#ff0000");

        let created = MapZone::parse_prompt("nombre=Itaembé Miní lat=-27.4 lng=-55.9", None).unwrap();
        assert_eq!(created.id, None);
        assert_eq!(created.color, "#6366f1");
        assert_eq!(
            MapZone::parse_prompt("nombre=Norte lat=-95 lng=1", None),
            Err("Coordenada inválida: lat=-95".to_string())
        );
        assert_eq!(
            MapZone::parse_prompt("nombre=Norte lat=1", None),
            Err("Falta el campo: lng".to_string())
        );
    }

    #[test]
    fn grouped_counts_accept_both_wire_shapes() {
        let stats: Statistics = serde_json::from_value(json!({
            "total": 3,
            "por_tipo": [["castracion", 2], ["atencion_primaria", 1]],
            "por_especie": [{"especie": "perro", "cantidad": 3}],
            "por_barrio": [[null, 1]]
        }))
        .unwrap();
        assert_eq!(stats.by_type[0], GroupCount { label: "castracion".into(), count: 2 });
        assert_eq!(stats.by_species[0], GroupCount { label: "perro".into(), count: 3 });
        assert_eq!(stats.by_neighborhood[0].label, "");
        assert!(stats.by_month.is_empty());
    }

    #[test]
    fn dashboard_payload_tolerates_missing_fields() {
        let snapshot: RecordSnapshot = serde_json::from_value(json!({
            "hoy": 2,
            "turnos_semana": [
                {"fecha": "2025-11-28", "hora": "09:00", "nombre_animal": "Luna",
                 "tutor_nombre": "Ana", "tipo": "castracion", "estado": "pendiente", "id": 7}
            ]
        }))
        .unwrap();
        assert_eq!(snapshot.today_count, 2);
        assert_eq!(snapshot.month_count, 0);
        assert!(snapshot.today_appointments.is_empty());
        assert_eq!(snapshot.week_appointments[0].id, Some(7));
        assert_eq!(snapshot.week_appointments[0].status, AppointmentStatus::Pending);
    }

    #[test]
    fn submission_is_flattened_with_iso_date() {
        let record = CareRecord {
            record_number: 10,
            date: "Sun, 05 Jan 2025 00:00:00 GMT".to_string(),
            attention_type: AttentionType::Sterilization,
            animal_name: "Toby".to_string(),
            guardian: GuardianInfo {
                full_name: "Juan Pérez".to_string(),
                national_id: "30111222".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let body = serde_json::to_value(RecordSubmission::from(&record)).unwrap();
        assert_eq!(body["numero"], 10);
        assert_eq!(body["fecha"], "2025-01-05");
        assert_eq!(body["tipo_atencion"], "castracion");
        assert_eq!(body["nombre_apellido"], "Juan Pérez");
        assert_eq!(body["telefono"], "");
        assert!(body.get("tutor").is_none());
    }

    #[test]
    fn lookup_without_attention_type_defaults_to_sterilization() {
        let record: CareRecord = serde_json::from_value(json!({
            "numero": 5, "fecha": "2025-02-01", "nombre_animal": "Mora",
            "especie": "gato", "sexo": "hembra", "edad": null,
            "tutor": {"nombre_apellido": "Eva", "dni": "1", "direccion": null, "barrio": "Centro", "telefono": ""}
        }))
        .unwrap();
        assert_eq!(record.attention_type, AttentionType::Sterilization);
        assert_eq!(record.guardian.neighborhood.as_deref(), Some("Centro"));
    }

    #[test]
    fn status_display_matches_wire_value() {
        assert_eq!(AppointmentStatus::Completed.to_string(), "completado");
        assert_eq!(
            serde_json::to_value(StatusUpdate { estado: AppointmentStatus::Cancelled }).unwrap(),
            json!({"estado": "cancelado"})
        );
        assert_eq!("pending".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Pending));
    }

    #[test]
    fn map_zone_accepts_short_coordinate_keys() {
        let zone: MapZone = serde_json::from_value(json!({
            "id": 3, "nombre": "Centro", "lat": -33.01, "lng": -58.51
        }))
        .unwrap();
        assert_eq!(zone.color, "#6366f1");
        assert_eq!(zone.derived_count, 0);
        let body = serde_json::to_value(&zone).unwrap();
        assert_eq!(body["latitud"], -33.01);
        assert!(body.get("derived_count").is_none());
    }
}
