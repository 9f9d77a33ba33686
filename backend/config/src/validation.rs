//! Config validation: range and consistency checks with field paths.

use thiserror::Error;
use vani_core::{Language, HINT_STREAK_FLOOR};

use crate::schema::VaniConfig;

pub const BACKEND_PROVIDERS: [&str; 3] = ["ollama", "demo", "auto"];
pub const TRANSLATION_PROVIDERS: [&str; 3] = ["none", "libretranslate", "llm"];
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &VaniConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_language(config, &mut report);
    validate_tutor(config, &mut report);
    validate_backend(config, &mut report);
    validate_translation(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_language(config: &VaniConfig, report: &mut ValidationReport) {
    if let Some(lang) = &config.language {
        if let Err(e) = lang.parse::<Language>() {
            report.error("language", e);
        }
    }
}

fn validate_tutor(config: &VaniConfig, report: &mut ValidationReport) {
    let Some(tutor) = &config.tutor else { return };

    let scores = [
        ("tutor.initialScore", tutor.initial_score),
        ("tutor.stepUp", tutor.step_up),
        ("tutor.stepDown", tutor.step_down),
        ("tutor.deepProbeScore", tutor.deep_probe_score),
        ("tutor.socraticScore", tutor.socratic_score),
        ("tutor.masteryScore", tutor.mastery_score),
    ];
    for (path, value) in scores {
        if let Some(v) = value {
            if v > 100 {
                report.error(path, format!("must be within 0..=100, got {v}"));
            }
        }
    }

    if let Some(streak) = tutor.hint_streak {
        if streak < HINT_STREAK_FLOOR {
            report.error(
                "tutor.hintStreak",
                format!("Hint mode needs at least {HINT_STREAK_FLOOR} consecutive wrong answers, got {streak}"),
            );
        }
    }

    if let (Some(deep), Some(socratic)) = (tutor.deep_probe_score, tutor.socratic_score) {
        if deep <= socratic {
            report.error(
                "tutor.deepProbeScore",
                format!("must be above socraticScore ({deep} <= {socratic})"),
            );
        }
    }

    if let (Some(mastery), Some(deep)) = (tutor.mastery_score, tutor.deep_probe_score) {
        if mastery < deep {
            report.warn(
                "tutor.masteryScore",
                "below deepProbeScore; students can be mastered outside DeepProbe mode",
            );
        }
    }

    if tutor.step_up == Some(0) {
        report.warn("tutor.stepUp", "0 means correct answers never raise the score");
    }

    if tutor.history_window == Some(0) {
        report.error("tutor.historyWindow", "must be >= 1");
    }

    if tutor.max_turns == Some(0) {
        report.error("tutor.maxTurns", "must be >= 1");
    }

    if let Some(w) = tutor.heuristic_weight {
        if !(0.0..=1.0).contains(&w) {
            report.error("tutor.heuristicWeight", format!("must be within [0, 1], got {w}"));
        }
    }
}

fn validate_backend(config: &VaniConfig, report: &mut ValidationReport) {
    let Some(backend) = &config.backend else { return };

    if let Some(provider) = &backend.provider {
        if !BACKEND_PROVIDERS.contains(&provider.as_str()) {
            report.error(
                "backend.provider",
                format!("Unknown backend '{provider}'. Use 'ollama', 'demo', or 'auto'"),
            );
        }
    }
    if let Some(url) = &backend.base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            report.error("backend.baseUrl", format!("'{url}' is not an http(s) URL"));
        }
    }
    if backend.timeout_secs == Some(0) {
        report.error("backend.timeoutSecs", "must be > 0");
    }
    if backend.max_tokens == Some(0) {
        report.error("backend.maxTokens", "must be > 0");
    }
    if let Some(t) = backend.temperature {
        if !(0.0..=2.0).contains(&t) {
            report.error("backend.temperature", format!("must be within [0, 2], got {t}"));
        }
    }

    let assisted = config
        .tutor
        .as_ref()
        .and_then(|t| t.assisted_scoring)
        .unwrap_or(false);
    if assisted && backend.provider.as_deref() == Some("demo") {
        report.warn(
            "tutor.assistedScoring",
            "the demo backend cannot grade answers; the heuristic score will be used",
        );
    }
}

fn validate_translation(config: &VaniConfig, report: &mut ValidationReport) {
    let Some(translation) = &config.translation else { return };

    match translation.provider.as_deref() {
        None => {}
        Some(p) if !TRANSLATION_PROVIDERS.contains(&p) => report.error(
            "translation.provider",
            format!("Unknown translator '{p}'. Use 'none', 'libretranslate', or 'llm'"),
        ),
        Some("libretranslate") if translation.base_url.is_none() => {
            report.error("translation.baseUrl", "LibreTranslate needs a server URL")
        }
        Some("llm")
            if config.backend.as_ref().and_then(|b| b.provider.as_deref()) == Some("demo") =>
        {
            report.warn(
                "translation.provider",
                "the demo backend cannot translate; replies stay in English",
            )
        }
        Some(_) => {}
    }

    if translation.timeout_secs == Some(0) {
        report.error("translation.timeoutSecs", "must be > 0");
    }

    let non_english = config
        .language
        .as_deref()
        .and_then(|l| l.parse::<Language>().ok())
        .is_some_and(|l| l != Language::En);
    if non_english && translation.provider.as_deref() == Some("none") {
        report.warn(
            "translation.provider",
            "replies in the wrong script cannot be translated with provider 'none'",
        );
    }
}

fn validate_logging(config: &VaniConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            report.error(
                "logging.level",
                format!("Unknown level '{level}'. Use one of {}", LOG_LEVELS.join(", ")),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{BackendConfig, TranslationConfig, TutorConfig};

    #[test]
    fn defaults_are_valid() {
        let report = validate(&apply_all_defaults(VaniConfig::default()));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn hint_streak_below_floor_is_error() {
        let mut cfg = VaniConfig::default();
        cfg.tutor = Some(TutorConfig {
            hint_streak: Some(1),
            ..Default::default()
        });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "tutor.hintStreak");
    }

    #[test]
    fn thresholds_must_be_ordered_and_in_range() {
        let mut cfg = VaniConfig::default();
        cfg.tutor = Some(TutorConfig {
            deep_probe_score: Some(40),
            socratic_score: Some(60),
            initial_score: Some(150),
            heuristic_weight: Some(1.5),
            ..Default::default()
        });
        let report = validate(&cfg);
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"tutor.initialScore"));
        assert!(paths.contains(&"tutor.deepProbeScore"));
        assert!(paths.contains(&"tutor.heuristicWeight"));
    }

    #[test]
    fn unknown_providers_are_errors() {
        let mut cfg = VaniConfig::default();
        cfg.backend = Some(BackendConfig {
            provider: Some("gpt".into()),
            timeout_secs: Some(0),
            ..Default::default()
        });
        cfg.translation = Some(TranslationConfig {
            provider: Some("google".into()),
            timeout_secs: Some(0),
            ..Default::default()
        });
        cfg.language = Some("fr".into());
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 5, "errors: {:?}", report.errors);
        assert!(report.errors.iter().any(|e| e.path == "translation.timeoutSecs"));
    }

    #[test]
    fn non_english_without_translator_warns() {
        let mut cfg = apply_all_defaults(VaniConfig::default());
        cfg.language = Some("kannada".into());
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].path, "translation.provider");
    }
}
