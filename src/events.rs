//! Event System
//!
//! Notifications raised by the sync engine and the activity log entries
//! built from them.

use crate::logging::{LogLevel, should_log_with_env};
use chrono::Local;
use std::fmt::Display;
use std::time::Instant;

/// Area of the client an event belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum Topic {
    Dashboard,
    Search,
    Records,
    Appointments,
    Statistics,
    Audit,
    Map,
    Export,
    Session,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Success,
    Error,
    Info,
    Refresh,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub topic: Topic,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
    /// When the event was raised; drives notification expiry.
    pub raised_at: Instant,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.topic == other.topic
            && self.msg == other.msg
            && self.timestamp == other.timestamp
            && self.event_type == other.event_type
            && self.log_level == other.log_level
        // raised_at is not compared; two identical messages are the same event
    }
}

impl Eq for Event {}

impl Event {
    fn new(topic: Topic, msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            topic,
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
            raised_at: Instant::now(),
        }
    }

    pub fn success(topic: Topic, msg: impl Into<String>) -> Self {
        Self::new(topic, msg.into(), EventType::Success, LogLevel::Info)
    }

    pub fn error(topic: Topic, msg: impl Into<String>) -> Self {
        Self::new(topic, msg.into(), EventType::Error, LogLevel::Error)
    }

    pub fn info(topic: Topic, msg: impl Into<String>) -> Self {
        Self::new(topic, msg.into(), EventType::Info, LogLevel::Info)
    }

    /// Background refresh bookkeeping; only shown when `RUST_LOG` asks for it.
    pub fn refresh(topic: Topic, msg: impl Into<String>) -> Self {
        Self::new(topic, msg.into(), EventType::Refresh, LogLevel::Debug)
    }

    /// Whether this event pops up as a transient notification.
    pub fn is_notification(&self) -> bool {
        self.event_type != EventType::Refresh
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }

    /// Forwards the event to the `log` facade at its level.
    pub fn log(&self) {
        let level = match self.log_level {
            LogLevel::Trace => log::Level::Trace,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        };
        log::log!(level, "[{}] {}", self.topic, self.msg);
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.event_type, self.timestamp, self.msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_events_are_not_notifications() {
        assert!(!Event::refresh(Topic::Dashboard, "dashboard actualizado").is_notification());
        assert!(Event::error(Topic::Search, "Error en la búsqueda").is_notification());
    }

    #[test]
    fn success_and_error_always_display() {
        assert!(Event::success(Topic::Records, "ok").should_display());
        assert!(Event::error(Topic::Records, "fallo").should_display());
    }

    #[test]
    fn display_includes_type_and_message() {
        let event = Event::info(Topic::Export, "Generando archivo Excel...");
        let text = event.to_string();
        assert!(text.starts_with("Info ["));
        assert!(text.ends_with("Generando archivo Excel..."));
    }
}
