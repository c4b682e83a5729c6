use std::collections::HashSet;

use chrono::NaiveDateTime;
use logsift_state::LogEvent;
use logsift_state::LogId;

/// Set of events decoded for one log family. Identical
/// `(source_id, timestamp, description)` triples collapse into one, so rotated
/// copies of the same lines are stored once.
#[derive(Debug, Default)]
pub struct EventCollector {
    events: HashSet<LogEvent>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the event was already collected.
    pub fn add(&mut self, source_id: LogId, timestamp: NaiveDateTime, description: &str) -> bool {
        self.events
            .insert(LogEvent::new(source_id, timestamp, description))
    }

    /// Take every collected event, oldest first, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<LogEvent> {
        let mut events: Vec<LogEvent> = self.events.drain().collect();
        events.sort();
        events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
