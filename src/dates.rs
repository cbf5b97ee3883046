//! Date normalization and Spanish display formatting.
//!
//! The backend hands out dates in several shapes depending on the storage
//! engine behind it (plain ISO dates from SQLite, RFC-1123 strings from
//! PostgreSQL through the JSON encoder, timestamps with or without a `T`).
//! [`normalize_date`] tries an ordered list of shape matchers and falls back
//! to [`NormalizedDate::Unparsed`] instead of failing.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use std::fmt::{self, Display};

pub const WEEKDAYS: [&str; 7] = [
    "Domingo",
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
];

pub const MONTHS_SHORT: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

const MONTHS_LONG: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Outcome of date normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedDate {
    Parsed(NaiveDate),
    Unparsed(String),
}

impl NormalizedDate {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            NormalizedDate::Parsed(date) => Some(*date),
            NormalizedDate::Unparsed(_) => None,
        }
    }
}

impl Display for NormalizedDate {
    /// `DD/MM/YYYY`, or the original text when the shape was not recognized.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedDate::Parsed(date) => write!(f, "{}", date.format("%d/%m/%Y")),
            NormalizedDate::Unparsed(raw) => f.write_str(raw),
        }
    }
}

impl From<NaiveDate> for NormalizedDate {
    fn from(date: NaiveDate) -> Self {
        NormalizedDate::Parsed(date)
    }
}

impl From<NaiveDateTime> for NormalizedDate {
    fn from(datetime: NaiveDateTime) -> Self {
        NormalizedDate::Parsed(datetime.date())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for NormalizedDate {
    fn from(datetime: DateTime<Tz>) -> Self {
        NormalizedDate::Parsed(datetime.date_naive())
    }
}

/// A recognized input shape and how to pull the calendar date out of it.
struct DateShape {
    name: &'static str,
    extract: fn(&str) -> Option<NaiveDate>,
}

const SHAPES: &[DateShape] = &[
    DateShape {
        name: "YYYY-MM-DD",
        extract: iso_date,
    },
    DateShape {
        name: "YYYY-MM-DDTHH:MM:SS[.f]",
        extract: iso_datetime_t,
    },
    DateShape {
        name: "YYYY-MM-DD HH:MM:SS[.f]",
        extract: iso_datetime_space,
    },
    DateShape {
        name: "RFC-1123",
        extract: rfc1123,
    },
    DateShape {
        name: "DD/MM/YYYY",
        extract: display_date,
    },
];

fn iso_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn iso_datetime(raw: &str, separator: char) -> Option<NaiveDate> {
    let (date, time) = raw.split_once(separator)?;
    let date = iso_date(date)?;
    NaiveTime::parse_from_str(time, "%H:%M:%S%.f").ok()?;
    Some(date)
}

fn iso_datetime_t(raw: &str) -> Option<NaiveDate> {
    iso_datetime(raw, 'T')
}

fn iso_datetime_space(raw: &str) -> Option<NaiveDate> {
    iso_datetime(raw, ' ')
}

fn rfc1123(raw: &str) -> Option<NaiveDate> {
    if !raw.contains("GMT") && !raw.contains(',') {
        return None;
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(raw) {
        return Some(datetime.naive_utc().date());
    }
    // Lenient path: ignore the weekday and anything after the year.
    let body = raw.split_once(',').map_or(raw, |(_, rest)| rest);
    let mut tokens = body.split_whitespace();
    let day = tokens.next()?;
    let month = tokens.next()?;
    let year = tokens.next()?;
    NaiveDate::parse_from_str(&format!("{} {} {}", day, month, year), "%d %b %Y").ok()
}

fn display_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}

/// Normalizes any supported date shape. Unknown shapes pass through unchanged.
pub fn normalize_date(raw: &str) -> NormalizedDate {
    let trimmed = raw.trim();
    for shape in SHAPES {
        if let Some(date) = (shape.extract)(trimmed) {
            log::trace!("date {:?} matched shape {}", raw, shape.name);
            return NormalizedDate::Parsed(date);
        }
    }
    NormalizedDate::Unparsed(raw.to_string())
}

/// `DD/MM/YYYY` display string for a raw server date.
pub fn format_display_date(raw: &str) -> String {
    normalize_date(raw).to_string()
}

/// Header of a weekly schedule day, e.g. `Jueves 27/11 - Nov 2025`.
pub fn format_schedule_day(raw: &str) -> String {
    match normalize_date(raw) {
        NormalizedDate::Parsed(date) => format!(
            "{} {:02}/{:02} - {} {}",
            WEEKDAYS[date.weekday().num_days_from_sunday() as usize],
            date.day(),
            date.month(),
            MONTHS_SHORT[date.month0() as usize],
            date.year()
        ),
        NormalizedDate::Unparsed(raw) => raw,
    }
}

/// Chart label for a `YYYY-MM` month bucket, e.g. `Nov 2025`.
pub fn format_month_label(raw: &str) -> String {
    let parsed = raw.split_once('-').and_then(|(year, month)| {
        let month: usize = month.get(..2).unwrap_or(month).parse().ok()?;
        let name = MONTHS_SHORT.get(month.checked_sub(1)?)?;
        Some(format!("{} {}", name, year))
    });
    parsed.unwrap_or_else(|| raw.to_string())
}

/// Date plus `HH:MM` when the raw value carries a time of day.
pub fn format_timestamp(raw: &str) -> String {
    let date = format_display_date(raw);
    match find_time(raw) {
        Some(time) if date != raw => format!("{} {}", date, time),
        _ => date,
    }
}

fn find_time(raw: &str) -> Option<&str> {
    let bytes = raw.as_bytes();
    (2..bytes.len().saturating_sub(2)).find_map(|i| {
        let window = &bytes[i - 2..i + 3];
        let is_time = window[2] == b':'
            && window[..2].iter().all(u8::is_ascii_digit)
            && window[3..].iter().all(u8::is_ascii_digit);
        is_time.then(|| &raw[i - 2..i + 3])
    })
}

/// Long Spanish clock text for the header, e.g.
/// `jueves, 27 de noviembre de 2025, 14:05`.
pub fn format_clock(now: NaiveDateTime) -> String {
    format!(
        "{}, {} de {} de {}, {:02}:{:02}",
        WEEKDAYS[now.weekday().num_days_from_sunday() as usize].to_lowercase(),
        now.day(),
        MONTHS_LONG[now.month0() as usize],
        now.year(),
        now.hour(),
        now.minute()
    )
}

/// Today's date in ISO form, used to prefill forms.
pub fn today_iso() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
