use thiserror::Error;

/// Top-level error type for the tutoring controller.
#[derive(Debug, Error)]
pub enum TutorError {
    /// OCR produced no usable text; no session is created.
    #[error("no problem detected in the extracted text")]
    NoProblemDetected,

    #[error("backend unavailable ({provider}): {message}")]
    BackendUnavailable { provider: String, message: String },

    #[error("backend timed out after {after_ms} ms")]
    BackendTimeout { after_ms: u64 },

    /// A reply was requested for a session with no turns at all.
    #[error("cannot compose a prompt from an empty transcript")]
    EmptyTranscript,

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TutorError {
    /// Caller-side sequencing bugs, as opposed to environmental failures.
    pub fn is_precondition(&self) -> bool {
        matches!(self, TutorError::EmptyTranscript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_transcript_is_a_precondition() {
        let err = TutorError::EmptyTranscript;
        assert!(err.is_precondition());
        assert!(!TutorError::NoProblemDetected.is_precondition());
    }

    #[test]
    fn backend_errors_are_environmental() {
        let timeout = TutorError::BackendTimeout { after_ms: 60_000 };
        let down = TutorError::BackendUnavailable {
            provider: "ollama".into(),
            message: "connection refused".into(),
        };
        assert!(!timeout.is_precondition());
        assert!(timeout.to_string().contains("60000 ms"));
        assert!(!down.is_precondition());
        assert!(down.to_string().contains("ollama"));
    }
}
