//! Tunable constants for one tutoring controller.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lowest consecutive-wrong streak that may unlock Hint mode.
pub const HINT_STREAK_FLOOR: u32 = 2;

/// Thresholds for the mode table and the mastered flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModePolicy {
    pub hint_streak: u32,
    pub deep_probe_score: u8,
    pub socratic_score: u8,
    pub mastery_score: u8,
}

impl Default for ModePolicy {
    fn default() -> Self {
        Self {
            hint_streak: HINT_STREAK_FLOOR,
            deep_probe_score: 75,
            socratic_score: 40,
            mastery_score: 90,
        }
    }
}

impl ModePolicy {
    /// Builds a policy, raising `hint_streak` to the escalation floor.
    pub fn new(hint_streak: u32, deep_probe_score: u8, socratic_score: u8, mastery_score: u8) -> Self {
        Self {
            hint_streak: hint_streak.max(HINT_STREAK_FLOOR),
            deep_probe_score,
            socratic_score,
            mastery_score,
        }
    }
}

/// Score movement for heuristic judgements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoringSettings {
    pub initial_score: u8,
    pub step_up: u8,
    pub step_down: u8,
    /// Ask the backend for a second opinion and blend it in.
    pub assisted: bool,
    /// Weight of the heuristic score in the blend, in [0, 1].
    pub heuristic_weight: f32,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            initial_score: 50,
            step_up: 15,
            step_down: 10,
            assisted: false,
            heuristic_weight: 0.5,
        }
    }
}

/// Generation parameters for backend calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "phi3".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Everything the controller needs besides its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TutorSettings {
    pub policy: ModePolicy,
    pub scoring: ScoringSettings,
    pub generation: GenerationSettings,
    /// Most recent turns included in each prompt.
    pub history_window: usize,
    /// Judged student turns after which the dialogue counts as complete.
    pub max_turns: u32,
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self {
            policy: ModePolicy::default(),
            scoring: ScoringSettings::default(),
            generation: GenerationSettings::default(),
            history_window: 6,
            max_turns: 8,
        }
    }
}
