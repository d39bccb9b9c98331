use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::chemistry::ChemistryState;
use crate::interaction::InteractionKind;

/// Number of points kept for the rolling chart.
pub const HISTORY_CAPACITY: usize = 15;
/// Number of events kept for the feed.
pub const LOG_CAPACITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub event: InteractionKind,
    /// Levels as they stood when the event arrived, before it was applied.
    pub snapshot: ChemistryState,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub chemistry: ChemistryState,
    pub time: String,
}

/// Event feed, newest first, capped at [`LOG_CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    next_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog {
            entries: VecDeque::with_capacity(LOG_CAPACITY + 1),
            next_id: 1,
        }
    }

    /// Records an event and returns its id.
    pub fn record(
        &mut self,
        event: InteractionKind,
        snapshot: ChemistryState,
        timestamp: String,
    ) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;

        self.entries.push_front(LogEntry {
            id,
            event,
            snapshot,
            timestamp,
        });
        self.entries.truncate(LOG_CAPACITY);
        id
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_id = 1;
    }
}

/// Rolling chart window, oldest first, capped at [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default)]
pub struct History {
    points: VecDeque<HistoryPoint>,
}

impl History {
    pub fn new() -> Self {
        History {
            points: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    pub fn push(&mut self, chemistry: ChemistryState, time: String) {
        self.points.push_back(HistoryPoint { chemistry, time });
        while self.points.len() > HISTORY_CAPACITY {
            self.points.pop_front();
        }
    }

    pub fn points(&self) -> Vec<HistoryPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
