//! Bounded audit log for gated operations
//!
//! Every successfully dispatched permission-gated operation leaves one entry
//! here. The popup/settings UI reads the snapshot to show a site activity
//! feed; nothing in the core consumes it.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum retained audit entries; oldest are evicted first
pub const EVENT_LOG_CAPACITY: usize = 100;

/// One audit entry: which operation a given origin performed, and when
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub operation: String,
    pub origin: String,
    pub timestamp: DateTime<Utc>,
}

/// In-process bounded FIFO of audit entries
pub struct EventLog {
    entries: Mutex<VecDeque<AuditEntry>>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest once at capacity
    pub fn record(&self, operation: &str, origin: &str) {
        let entry = AuditEntry {
            operation: operation.to_string(),
            origin: origin.to_string(),
            timestamp: Utc::now(),
        };

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Snapshot of retained entries, oldest first
    pub fn recent(&self) -> Vec<AuditEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(EVENT_LOG_CAPACITY)
    }
}
