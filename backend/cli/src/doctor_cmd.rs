//! `vani doctor`: checks that everything a session needs is reachable.

use std::path::Path;

use anyhow::Result;

use vani_config::{validate, VaniConfig};

use crate::backend::{libretranslate_from, ollama_from};
use crate::terminal_output as out;

/// Runs every check and reports whether all required ones passed.
pub async fn run(config: &VaniConfig, config_path: &Path) -> Result<bool> {
    println!("\nRunning Vani doctor...\n");

    let mut healthy = check_config(config, config_path);
    healthy &= check_backend(config).await;
    healthy &= check_translation(config).await;

    println!();
    if healthy {
        out::note_success("All checks passed. Vani is ready.");
    } else {
        out::note_error("Some checks failed. See above.");
    }
    Ok(healthy)
}

fn check_config(config: &VaniConfig, config_path: &Path) -> bool {
    println!("Config ({}):", config_path.display());
    if !config_path.exists() {
        out::note_info("no config file; built-in defaults in use (`vani config init` writes one)");
    }
    let report = validate(config);
    for warning in &report.warnings {
        out::note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        out::note_error(&format!("{}: {}", error.path, error.message));
    }
    if report.is_valid() {
        out::note_success("config is valid");
    }
    report.is_valid()
}

async fn check_backend(config: &VaniConfig) -> bool {
    println!("\nBackends:");
    let ollama = ollama_from(config);
    let model = config
        .backend
        .as_ref()
        .and_then(|b| b.model.clone())
        .unwrap_or_else(|| vani_core::GenerationSettings::default().model);
    let provider = config
        .backend
        .as_ref()
        .and_then(|b| b.provider.clone())
        .unwrap_or_default();

    let mut available = vec!["demo"];
    let reachable = match ollama.ping().await {
        Ok(()) => {
            out::note_success(&format!("Ollama reachable at {}", ollama.base_url()));
            match ollama.has_model(&model).await {
                Ok(true) => out::note_success(&format!("model '{model}' is available")),
                Ok(false) => out::note_warn(&format!("model '{model}' not found; run `ollama pull {model}`")),
                Err(e) => out::note_warn(&format!("could not list models: {e}")),
            }
            available.push("ollama");
            true
        }
        Err(e) => {
            let msg = format!("Ollama not reachable at {}: {e}", ollama.base_url());
            if provider == "ollama" {
                out::note_error(&msg);
            } else {
                out::note_warn(&format!("{msg} (sessions fall back to demo mode)"));
            }
            false
        }
    };
    out::note_info(&format!("available backends: {}", available.join(", ")));

    reachable || provider != "ollama"
}

async fn check_translation(config: &VaniConfig) -> bool {
    println!("\nTranslation:");
    let Some(translation) = &config.translation else {
        out::note_info("translation disabled");
        return true;
    };
    match translation.provider.as_deref() {
        Some("libretranslate") => {
            let lt = libretranslate_from(config);
            match lt.ping().await {
                Ok(()) => {
                    out::note_success(&format!("LibreTranslate reachable at {}", lt.base_url()));
                    true
                }
                Err(e) => {
                    out::note_error(&format!("LibreTranslate not reachable at {}: {e}", lt.base_url()));
                    false
                }
            }
        }
        Some("llm") => {
            out::note_info("translating with the text-generation backend");
            true
        }
        _ => {
            out::note_info("translation disabled; off-script replies are shown as generated");
            true
        }
    }
}
