//! Config defaults: fills every unset field from the built-in settings.

use vani_core::{GenerationSettings, ModePolicy, ScoringSettings, TutorSettings};

use crate::schema::{BackendConfig, LoggingConfig, TranslationConfig, TutorConfig, VaniConfig};

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_BACKEND: &str = "auto";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_TRANSLATION: &str = "none";
pub const DEFAULT_LIBRETRANSLATE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TRANSLATION_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: VaniConfig) -> VaniConfig {
    let config = apply_language_default(config);
    let config = apply_tutor_defaults(config);
    let config = apply_backend_defaults(config);
    let config = apply_translation_defaults(config);
    apply_logging_defaults(config)
}

fn apply_language_default(mut config: VaniConfig) -> VaniConfig {
    config.language.get_or_insert_with(|| DEFAULT_LANGUAGE.to_string());
    config
}

fn apply_tutor_defaults(mut config: VaniConfig) -> VaniConfig {
    let policy = ModePolicy::default();
    let scoring = ScoringSettings::default();
    let settings = TutorSettings::default();

    let tutor = config.tutor.get_or_insert_with(TutorConfig::default);
    tutor.initial_score.get_or_insert(u32::from(scoring.initial_score));
    tutor.step_up.get_or_insert(u32::from(scoring.step_up));
    tutor.step_down.get_or_insert(u32::from(scoring.step_down));
    tutor.hint_streak.get_or_insert(policy.hint_streak);
    tutor.deep_probe_score.get_or_insert(u32::from(policy.deep_probe_score));
    tutor.socratic_score.get_or_insert(u32::from(policy.socratic_score));
    tutor.mastery_score.get_or_insert(u32::from(policy.mastery_score));
    tutor
        .history_window
        .get_or_insert(u32::try_from(settings.history_window).unwrap_or(u32::MAX));
    tutor.max_turns.get_or_insert(settings.max_turns);
    tutor.assisted_scoring.get_or_insert(scoring.assisted);
    tutor.heuristic_weight.get_or_insert(scoring.heuristic_weight);
    config
}

fn apply_backend_defaults(mut config: VaniConfig) -> VaniConfig {
    let generation = GenerationSettings::default();
    let backend = config.backend.get_or_insert_with(BackendConfig::default);
    backend.provider.get_or_insert_with(|| DEFAULT_BACKEND.to_string());
    backend.base_url.get_or_insert_with(|| DEFAULT_OLLAMA_URL.to_string());
    backend.model.get_or_insert(generation.model);
    backend.timeout_secs.get_or_insert(generation.timeout.as_secs());
    backend.max_tokens.get_or_insert(generation.max_tokens);
    backend.temperature.get_or_insert(generation.temperature);
    config
}

fn apply_translation_defaults(mut config: VaniConfig) -> VaniConfig {
    let translation = config.translation.get_or_insert_with(TranslationConfig::default);
    translation.provider.get_or_insert_with(|| DEFAULT_TRANSLATION.to_string());
    if translation.provider.as_deref() == Some("libretranslate") {
        translation
            .base_url
            .get_or_insert_with(|| DEFAULT_LIBRETRANSLATE_URL.to_string());
        translation.timeout_secs.get_or_insert(DEFAULT_TRANSLATION_TIMEOUT_SECS);
    }
    translation.cache.get_or_insert(true);
    config
}

fn apply_logging_defaults(mut config: VaniConfig) -> VaniConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.dir.get_or_insert_with(|| DEFAULT_LOG_DIR.to_string());
    logging.file.get_or_insert(true);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_section() {
        let cfg = apply_all_defaults(VaniConfig::default());
        assert_eq!(cfg.language.as_deref(), Some("en"));
        let tutor = cfg.tutor.unwrap();
        assert_eq!(tutor.initial_score, Some(50));
        assert_eq!(tutor.hint_streak, Some(2));
        assert_eq!(tutor.history_window, Some(6));
        assert_eq!(tutor.max_turns, Some(8));
        let backend = cfg.backend.unwrap();
        assert_eq!(backend.provider.as_deref(), Some("auto"));
        assert_eq!(backend.model.as_deref(), Some("phi3"));
        assert_eq!(backend.timeout_secs, Some(60));
        assert_eq!(cfg.translation.unwrap().provider.as_deref(), Some("none"));
        assert_eq!(cfg.logging.unwrap().level.as_deref(), Some("info"));
    }

    #[test]
    fn does_not_override_user_values() {
        let mut cfg = VaniConfig::default();
        cfg.tutor = Some(TutorConfig {
            initial_score: Some(30),
            ..Default::default()
        });
        cfg.translation = Some(TranslationConfig {
            provider: Some("libretranslate".into()),
            ..Default::default()
        });
        let cfg = apply_all_defaults(cfg);
        let tutor = cfg.tutor.unwrap();
        assert_eq!(tutor.initial_score, Some(30));
        assert_eq!(tutor.step_up, Some(15));
        let translation = cfg.translation.unwrap();
        assert_eq!(translation.base_url.as_deref(), Some(DEFAULT_LIBRETRANSLATE_URL));
        assert_eq!(translation.timeout_secs, Some(DEFAULT_TRANSLATION_TIMEOUT_SECS));
    }
}
