//! Transient notifications and the activity log.

use crate::consts::cli_consts::{MAX_ACTIVITY_LOGS, ui};
use crate::events::Event;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    /// Notifications currently on screen, oldest first.
    active: VecDeque<Event>,
    /// Everything raised this session, capped at `MAX_ACTIVITY_LOGS`.
    history: VecDeque<Event>,
    /// Events not yet handed to a consumer, capped like `history`.
    undelivered: VecDeque<Event>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_ttl(ui::notification_ttl())
    }
}

impl Notifier {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            active: VecDeque::new(),
            history: VecDeque::new(),
            undelivered: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: Event) {
        event.log();
        if event.is_notification() {
            self.active.push_back(event.clone());
        }
        if self.history.len() >= MAX_ACTIVITY_LOGS {
            self.history.pop_front();
        }
        self.history.push_back(event.clone());
        // Only headless sessions drain it
        if self.undelivered.len() >= MAX_ACTIVITY_LOGS {
            self.undelivered.pop_front();
        }
        self.undelivered.push_back(event);
    }

    /// Drops notifications older than the TTL.
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.active
            .retain(|event| now.saturating_duration_since(event.raised_at) < ttl);
    }

    pub fn active(&self) -> impl DoubleEndedIterator<Item = &Event> {
        self.active.iter()
    }

    pub fn history(&self) -> impl DoubleEndedIterator<Item = &Event> {
        self.history.iter()
    }

    /// Takes the events raised since the last call.
    pub fn drain_undelivered(&mut self) -> Vec<Event> {
        self.undelivered.drain(..).collect()
    }

    pub fn latest(&self) -> Option<&Event> {
        self.history.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Topic;

    #[test]
    fn notifications_expire_after_ttl() {
        let mut notifier = Notifier::default();
        notifier.push(Event::error(Topic::Dashboard, "Error al cargar datos del dashboard"));
        let raised = notifier.active().next().unwrap().raised_at;

        notifier.prune(raised + Duration::from_millis(3_999));
        assert_eq!(notifier.active().count(), 1);

        notifier.prune(raised + Duration::from_secs(4));
        assert_eq!(notifier.active().count(), 0);
        // The activity log keeps it.
        assert_eq!(notifier.history().count(), 1);
    }

    #[test]
    fn history_is_capped() {
        let mut notifier = Notifier::default();
        for i in 0..(MAX_ACTIVITY_LOGS + 5) {
            notifier.push(Event::info(Topic::Search, format!("evento {}", i)));
        }
        assert_eq!(notifier.history().count(), MAX_ACTIVITY_LOGS);
        assert_eq!(notifier.history().next().unwrap().msg, "evento 5");
    }

    #[test]
    fn undrained_events_are_capped() {
        let mut notifier = Notifier::default();
        for i in 0..5_000 {
            notifier.push(Event::refresh(Topic::Dashboard, format!("refresco {}", i)));
        }
        let undelivered = notifier.drain_undelivered();
        assert_eq!(undelivered.len(), MAX_ACTIVITY_LOGS);
        assert_eq!(undelivered.last().unwrap().msg, "refresco 4999");
    }

    #[test]
    fn refresh_events_skip_the_toast_queue() {
        let mut notifier = Notifier::default();
        notifier.push(Event::refresh(Topic::Map, "mapa actualizado"));
        assert_eq!(notifier.active().count(), 0);
        assert_eq!(notifier.drain_undelivered().len(), 1);
        assert!(notifier.drain_undelivered().is_empty());
    }
}
