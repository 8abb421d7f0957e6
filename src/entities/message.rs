use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// One submitted contact message. Immutable once created; the epoch-ms
/// timestamp doubles as the id used for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    pub email: String,
    pub message: String,
    pub timestamp: i64,
}

impl Message {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
            timestamp: Local::now().timestamp_millis(),
        }
    }

    /// Creation time rendered for the history list, e.g. `Jan 05, 2026 14:30`.
    pub fn sent_at(&self) -> String {
        match Local.timestamp_millis_opt(self.timestamp).single() {
            Some(when) => when.format("%b %d, %Y %H:%M").to_string(),
            None => String::from("unknown"),
        }
    }
}
