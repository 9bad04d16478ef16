//! Structured logging for SnapText.
//!
//! Handles log redaction, console plus rolling NDJSON file output, and per-user bot event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{BotEvent, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
