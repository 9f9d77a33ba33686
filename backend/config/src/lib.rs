//! `vani-config`: runtime configuration for the Vani tutor.
//!
//! Loads `~/.vani/config.yaml`, resolves `${VAR}` references, fills defaults,
//! validates, and converts the result into the settings the tutor consumes.

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{BackendConfig, LoggingConfig, TranslationConfig, TutorConfig, VaniConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use vani_core::{GenerationSettings, Language, ModePolicy, ScoringSettings, TutorSettings};

/// Load, substitute env vars, apply defaults, and validate.
///
/// Validation errors abort; warnings are logged.
pub async fn load_and_prepare(path: &Path) -> Result<VaniConfig> {
    let raw_config = load_config(path).await?;

    let value: Value =
        serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let referenced = collect_referenced_vars(&value);
    if !referenced.is_empty() {
        tracing::debug!(vars = ?referenced, "Config references env vars");
    }
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: VaniConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        let details: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("Invalid config at {}:\n  {}", path.display(), details.join("\n  "));
    }

    Ok(config)
}

fn score(value: Option<u32>, fallback: u8) -> u8 {
    value.map_or(fallback, |v| u8::try_from(v.min(100)).unwrap_or(100))
}

/// Builds controller settings from a defaulted config. Unset fields fall
/// back to the built-in defaults.
pub fn tutor_settings(config: &VaniConfig) -> TutorSettings {
    let base = TutorSettings::default();
    let tutor = config.tutor.clone().unwrap_or_default();
    let backend = config.backend.clone().unwrap_or_default();

    let policy = ModePolicy::new(
        tutor.hint_streak.unwrap_or(base.policy.hint_streak),
        score(tutor.deep_probe_score, base.policy.deep_probe_score),
        score(tutor.socratic_score, base.policy.socratic_score),
        score(tutor.mastery_score, base.policy.mastery_score),
    );
    let scoring = ScoringSettings {
        initial_score: score(tutor.initial_score, base.scoring.initial_score),
        step_up: score(tutor.step_up, base.scoring.step_up),
        step_down: score(tutor.step_down, base.scoring.step_down),
        assisted: tutor.assisted_scoring.unwrap_or(base.scoring.assisted),
        heuristic_weight: tutor
            .heuristic_weight
            .unwrap_or(base.scoring.heuristic_weight)
            .clamp(0.0, 1.0),
    };
    let generation = GenerationSettings {
        model: backend.model.unwrap_or(base.generation.model),
        max_tokens: backend.max_tokens.unwrap_or(base.generation.max_tokens),
        temperature: backend.temperature.unwrap_or(base.generation.temperature),
        timeout: backend
            .timeout_secs
            .map_or(base.generation.timeout, Duration::from_secs),
    };

    TutorSettings {
        policy,
        scoring,
        generation,
        history_window: tutor
            .history_window
            .map_or(base.history_window, |w| w.max(1) as usize),
        max_turns: tutor.max_turns.unwrap_or(base.max_turns).max(1),
    }
}

/// The configured session language, English when unset.
pub fn default_language(config: &VaniConfig) -> Result<Language> {
    match config.language.as_deref() {
        None => Ok(Language::En),
        Some(raw) => raw
            .parse::<Language>()
            .map_err(|e| anyhow::anyhow!("language: {e}")),
    }
}

/// Log directory; relative paths resolve under `config_dir`. `None` when
/// file logging is off.
pub fn log_dir(config: &VaniConfig, config_dir: &Path) -> Option<PathBuf> {
    let logging = config.logging.as_ref()?;
    if !logging.file.unwrap_or(true) {
        return None;
    }
    let dir = PathBuf::from(logging.dir.as_deref().unwrap_or(defaults::DEFAULT_LOG_DIR));
    Some(if dir.is_absolute() {
        dir
    } else {
        config_dir.join(dir)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_convert_to_default_settings() {
        let cfg = apply_all_defaults(VaniConfig::default());
        assert_eq!(tutor_settings(&cfg), TutorSettings::default());
        assert_eq!(default_language(&cfg).unwrap(), Language::En);
    }

    #[test]
    fn overrides_flow_into_settings() {
        let mut cfg = VaniConfig::default();
        cfg.tutor = Some(TutorConfig {
            initial_score: Some(30),
            hint_streak: Some(1),
            history_window: Some(0),
            assisted_scoring: Some(true),
            ..Default::default()
        });
        cfg.backend = Some(BackendConfig {
            model: Some("llama3".into()),
            timeout_secs: Some(5),
            ..Default::default()
        });
        let settings = tutor_settings(&apply_all_defaults(cfg));
        assert_eq!(settings.scoring.initial_score, 30);
        assert!(settings.scoring.assisted);
        assert_eq!(settings.policy.hint_streak, 2);
        assert_eq!(settings.history_window, 1);
        assert_eq!(settings.generation.model, "llama3");
        assert_eq!(settings.generation.timeout, Duration::from_secs(5));
    }

    #[test]
    fn language_accepts_names_and_rejects_unknown() {
        let mut cfg = VaniConfig::default();
        cfg.language = Some("te".into());
        assert_eq!(default_language(&cfg).unwrap(), Language::Te);
        cfg.language = Some("klingon".into());
        assert!(default_language(&cfg).is_err());
    }

    #[test]
    fn log_dir_resolution() {
        let base = Path::new("/home/s/.vani");
        let cfg = apply_all_defaults(VaniConfig::default());
        assert_eq!(log_dir(&cfg, base), Some(base.join("logs")));

        let mut off = cfg.clone();
        off.logging = Some(LoggingConfig {
            file: Some(false),
            ..Default::default()
        });
        assert_eq!(log_dir(&off, base), None);
    }

    #[tokio::test]
    async fn invalid_file_fails_to_prepare() {
        let dir = std::env::temp_dir().join(format!("vani-prepare-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = config_file_path(&dir);
        tokio::fs::write(&path, "tutor:\n  hintStreak: 1\n").await.unwrap();
        let err = load_and_prepare(&path).await.unwrap_err();
        assert!(err.to_string().contains("tutor.hintStreak"));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
