//! Tutor Event Logger
//!
//! Every exchange of a session is mirrored to the `tutor_events` target so a
//! reviewer can replay the dialogue from the NDJSON log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TutorEvent {
    SessionStarted {
        subject: String,
        language: String,
    },
    StudentTurn {
        content: String,
        correct: Option<bool>,
        score: u8,
    },
    TutorReply {
        mode: String,
        content: String,
    },
    Repair {
        kind: String,
    },
    BackendFailure {
        provider: String,
        error_msg: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: TutorEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts free text in the event, then hands it to tracing.
    pub fn log_event(session_id: &str, mut event: TutorEvent) {
        match &mut event {
            TutorEvent::StudentTurn { content, .. } | TutorEvent::TutorReply { content, .. } => {
                *content = redact_sensitive_data(content);
            }
            TutorEvent::BackendFailure { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            TutorEvent::SessionStarted { .. } | TutorEvent::Repair { .. } => {}
        }

        let failure = matches!(event, TutorEvent::BackendFailure { .. });
        let entry = EventLogEntry {
            session_id: session_id.into(),
            timestamp: Utc::now(),
            event,
        };

        match serde_json::to_string(&entry) {
            Ok(json) if failure => warn!(target: "tutor_events", event = %json, "tutor event"),
            Ok(json) => info!(target: "tutor_events", event = %json, "tutor event"),
            Err(e) => warn!(target: "tutor_events", error = %e, "unserializable tutor event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let entry = EventLogEntry {
            session_id: "s1".into(),
            timestamp: Utc::now(),
            event: TutorEvent::Repair { kind: "leak_guard".into() },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "repair");
        assert_eq!(json["event"]["kind"], "leak_guard");
    }

    #[test]
    fn log_event_without_subscriber_is_silent() {
        EventLogger::log_event(
            "s1",
            TutorEvent::StudentTurn {
                content: "mail me at a@b.com".into(),
                correct: Some(false),
                score: 40,
            },
        );
    }
}
