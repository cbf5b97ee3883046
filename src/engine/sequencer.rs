//! Request tokens
//!
//! Every read operation stamps its requests with a monotonically increasing
//! sequence number. A response is applied only when it is newer than the last
//! one applied for the same operation, so a slow early request can never
//! overwrite the result of a later one.

use std::collections::HashMap;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, strum::Display)]
pub enum Operation {
    Dashboard,
    Search,
    NextNumber,
    RecordLookup,
    Statistics,
    AuditLog,
    Map,
    Neighborhoods,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RequestToken {
    pub operation: Operation,
    pub seq: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    issued: u64,
    applied: u64,
}

#[derive(Debug, Default)]
pub struct Sequencer {
    counters: HashMap<Operation, Counters>,
}

impl Sequencer {
    pub fn issue(&mut self, operation: Operation) -> RequestToken {
        let counters = self.counters.entry(operation).or_default();
        counters.issued += 1;
        RequestToken {
            operation,
            seq: counters.issued,
        }
    }

    /// Marks `token` applied if it is the newest response seen so far.
    /// Returns `false` for stale tokens, which must be discarded.
    pub fn accept(&mut self, token: RequestToken) -> bool {
        let counters = self.counters.entry(token.operation).or_default();
        if token.seq <= counters.applied {
            log::debug!(
                "discarding stale {} response (seq {} <= {})",
                token.operation,
                token.seq,
                counters.applied
            );
            return false;
        }
        counters.applied = token.seq;
        true
    }

    /// Makes every request issued so far for `operation` stale.
    pub fn invalidate(&mut self, operation: Operation) {
        let counters = self.counters.entry(operation).or_default();
        counters.applied = counters.issued;
    }

    /// Whether any request for `operation` is still waiting for a response
    /// newer than the last one applied.
    pub fn in_flight(&self, operation: Operation) -> bool {
        self.counters
            .get(&operation)
            .is_some_and(|c| c.issued > c.applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_request_wins() {
        let mut sequencer = Sequencer::default();
        let first = sequencer.issue(Operation::Search);
        let second = sequencer.issue(Operation::Search);

        assert!(sequencer.accept(second));
        assert!(!sequencer.accept(first));
        assert!(!sequencer.in_flight(Operation::Search));
    }

    #[test]
    fn operations_are_sequenced_independently() {
        let mut sequencer = Sequencer::default();
        let search = sequencer.issue(Operation::Search);
        let dashboard = sequencer.issue(Operation::Dashboard);
        let _newer_dashboard = sequencer.issue(Operation::Dashboard);

        assert!(sequencer.accept(dashboard));
        assert!(sequencer.accept(search));
        assert!(sequencer.in_flight(Operation::Dashboard));
    }

    #[test]
    fn a_token_is_applied_once() {
        let mut sequencer = Sequencer::default();
        let token = sequencer.issue(Operation::Map);
        assert!(sequencer.accept(token));
        assert!(!sequencer.accept(token));
    }

    #[test]
    fn invalidated_requests_are_discarded() {
        let mut sequencer = Sequencer::default();
        let lookup = sequencer.issue(Operation::RecordLookup);
        sequencer.invalidate(Operation::RecordLookup);

        assert!(!sequencer.in_flight(Operation::RecordLookup));
        assert!(!sequencer.accept(lookup));

        let next = sequencer.issue(Operation::RecordLookup);
        assert!(sequencer.accept(next));
    }
}
