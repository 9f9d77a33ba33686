//! Bounded conversation window.
//!
//! Only the newest turns are sent to the backend. Older turns stay in the
//! session log and are dropped from the prompt without summarizing.

use vani_core::{ChatMessage, Speaker};

use crate::session_state::Turn;

pub struct ContextWindow {
    pub messages: Vec<ChatMessage>,
    /// Turns left out of the prompt.
    pub dropped: usize,
}

impl ContextWindow {
    /// Keeps the last `max_turns` turns (at least one), oldest first.
    pub fn build(transcript: &[Turn], max_turns: usize) -> Self {
        let keep = max_turns.max(1).min(transcript.len());
        let dropped = transcript.len() - keep;
        let messages = transcript[dropped..]
            .iter()
            .map(|turn| match turn.speaker() {
                Speaker::Student => ChatMessage::user(turn.text()),
                Speaker::Tutor => ChatMessage::assistant(turn.text()),
            })
            .collect();
        Self { messages, dropped }
    }
}
