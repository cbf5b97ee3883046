//! Grouping helpers over fetched collections.

use crate::models::{Appointment, MapZone};
use std::collections::{BTreeMap, HashMap};

/// Appointments sharing a `fecha`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentGroup {
    pub date: String,
    pub appointments: Vec<Appointment>,
}

/// Groups appointments by their raw date. Groups come out in ascending
/// lexicographic date order; members keep their input order.
pub fn group_appointments_by_date(appointments: &[Appointment]) -> Vec<AppointmentGroup> {
    let mut groups: BTreeMap<&str, Vec<Appointment>> = BTreeMap::new();
    for appointment in appointments {
        groups
            .entry(appointment.date.as_str())
            .or_default()
            .push(appointment.clone());
    }
    groups
        .into_iter()
        .map(|(date, appointments)| AppointmentGroup {
            date: date.to_string(),
            appointments,
        })
        .collect()
}

/// Lowercases and collapses whitespace so `" San  Martín "` matches `"san martín"`.
pub fn neighborhood_key(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fills each zone's `derived_count` from per-neighborhood record counts.
/// Zones without a matching neighborhood get 0.
pub fn join_neighborhood_counts(
    mut zones: Vec<MapZone>,
    counts: &HashMap<String, u64>,
) -> Vec<MapZone> {
    let mut by_key: HashMap<String, u64> = HashMap::with_capacity(counts.len());
    for (name, count) in counts {
        *by_key.entry(neighborhood_key(name)).or_default() += count;
    }
    for zone in &mut zones {
        zone.derived_count = by_key
            .get(&neighborhood_key(&zone.name))
            .copied()
            .unwrap_or(0);
    }
    zones
}
