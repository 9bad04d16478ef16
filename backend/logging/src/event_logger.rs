//! Bot Event Logger
//!
//! Per-user bot events (recognitions, throttling, failures) written through
//! `tracing` so they land in the NDJSON log file.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotEvent {
    PhotoRecognized {
        engine: String,
        chars: usize,
        elapsed_ms: u64,
    },
    RateLimited {
        retained: usize,
    },
    OcrFailed {
        engine: String,
        error_msg: String,
    },
    HistoryServed {
        count: usize,
    },
    LanguageChanged {
        language: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
    pub event: BotEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Build the log entry for an event, redacting free-text fields.
    pub fn entry(user_id: i64, mut event: BotEvent) -> EventLogEntry {
        if let BotEvent::OcrFailed { error_msg, .. } = &mut event {
            *error_msg = redact_sensitive_data(error_msg);
        }
        EventLogEntry {
            user_id,
            timestamp: Utc::now(),
            event,
        }
    }

    /// Log a bot event for `user_id`.
    pub fn log_event(user_id: i64, event: BotEvent) {
        let entry = Self::entry(user_id, event);
        let json = serde_json::to_string(&entry.event).unwrap_or_default();
        info!(target: "bot_events", user_id = entry.user_id, timestamp = %entry.timestamp, event = %json, "Bot event");
    }
}
