//! Structured logging for Vani.
//!
//! Console output on stderr, NDJSON files with daily rotation, redaction of
//! personal data, and the tutor event trail.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, TutorEvent};
pub use logger::{LoggerGuard, init_logger};
pub use redact::redact_sensitive_data;
