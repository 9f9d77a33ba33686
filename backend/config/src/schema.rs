//! Vani configuration schema.
//!
//! Every field is optional on disk; `apply_all_defaults` fills the gaps and
//! `validate` checks the result. Keys are camelCase in YAML.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root of `~/.vani/config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaniConfig {
    /// Default reply language for new sessions (code or English name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Comprehension meter and mode thresholds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutor: Option<TutorConfig>,

    /// Text-generation backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,

    /// Translation collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslationConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Tutor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TutorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_up: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_down: Option<u32>,
    /// Consecutive wrong answers that switch to Hint mode (min 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_streak: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_probe_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socratic_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastery_score: Option<u32>,
    /// Turns of history sent with each prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_window: Option<u32>,
    /// Judged turns before the dialogue counts as complete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assisted_scoring: Option<bool>,
    /// Heuristic share of the blended score, in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heuristic_weight: Option<f32>,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// "ollama" | "demo" | "auto"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TranslationConfig {
    /// "none" | "libretranslate" | "llm"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// LibreTranslate server URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Memoize translations in-process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<bool>,
    /// Per-request limit for LibreTranslate calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for NDJSON log files; relative paths are under the config dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Write log files at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<bool>,
}
