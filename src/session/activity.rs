//! Activity log ring buffer
//!
//! User-visible history of what the session did, newest first and capped at
//! [`ACTIVITY_LOG_CAPACITY`] entries. Each entry is mirrored to `tracing`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Maximum number of retained entries
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

/// Severity of an activity entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// RFC-3339 timestamp
    pub time: String,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
}

/// Bounded, newest-first activity log
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a timestamped entry and drop anything past the capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use wellscope::session::activity::{ActivityKind, ActivityLog};
    ///
    /// let mut log = ActivityLog::new();
    /// log.append("first", ActivityKind::Info);
    /// log.append("second", ActivityKind::Success);
    /// assert_eq!(log.latest().unwrap().msg, "second");
    /// ```
    pub fn append(&mut self, msg: impl Into<String>, kind: ActivityKind) {
        let msg = msg.into();
        match kind {
            ActivityKind::Error => tracing::error!(activity = %kind, "{}", msg),
            ActivityKind::Warning => tracing::warn!(activity = %kind, "{}", msg),
            _ => tracing::info!(activity = %kind, "{}", msg),
        }

        self.entries.push_front(ActivityEntry {
            time: Utc::now().to_rfc3339(),
            msg,
            kind,
        });
        self.entries.truncate(ACTIVITY_LOG_CAPACITY);
    }

    /// Replace the contents with entries read back from a snapshot
    pub fn restore(&mut self, entries: Vec<ActivityEntry>) {
        self.entries = entries
            .into_iter()
            .take(ACTIVITY_LOG_CAPACITY)
            .collect();
    }

    pub fn latest(&self) -> Option<&ActivityEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<ActivityEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
