//! Builds the controller's collaborators from the loaded config.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use vani_config::VaniConfig;
use vani_core::{LlmProvider, Translator};
use vani_providers::{
    resolve_backend, BackendChoice, CachedTranslator, LibreTranslateTranslator, LlmTranslator,
    OllamaProvider, PassthroughTranslator,
};
use vani_tutor::TutorController;

pub fn ollama_from(config: &VaniConfig) -> OllamaProvider {
    match config.backend.as_ref().and_then(|b| b.base_url.as_deref()) {
        Some(url) => OllamaProvider::new().with_base_url(url),
        None => OllamaProvider::new(),
    }
}

pub fn libretranslate_from(config: &VaniConfig) -> LibreTranslateTranslator {
    let translation = config.translation.clone().unwrap_or_default();
    let url = translation
        .base_url
        .unwrap_or_else(|| vani_config::defaults::DEFAULT_LIBRETRANSLATE_URL.to_string());
    let timeout = translation
        .timeout_secs
        .unwrap_or(vani_config::defaults::DEFAULT_TRANSLATION_TIMEOUT_SECS);
    LibreTranslateTranslator::new(url)
        .with_api_key(translation.api_key)
        .with_timeout(Duration::from_secs(timeout))
}

pub fn backend_choice(config: &VaniConfig, flag: Option<&str>) -> Result<BackendChoice> {
    flag.or_else(|| config.backend.as_ref().and_then(|b| b.provider.as_deref()))
        .map_or(Ok(BackendChoice::default()), |raw| raw.parse().map_err(|e: String| anyhow!(e)))
}

pub fn build_translator(config: &VaniConfig, backend: &Arc<dyn LlmProvider>, model: &str) -> Arc<dyn Translator> {
    let translation = config.translation.as_ref();
    let cache = translation.and_then(|t| t.cache).unwrap_or(true);
    match translation.and_then(|t| t.provider.as_deref()).unwrap_or("none") {
        "libretranslate" => {
            let lt = libretranslate_from(config);
            if cache {
                Arc::new(CachedTranslator::new(lt))
            } else {
                Arc::new(lt)
            }
        }
        "llm" => {
            let llm = LlmTranslator::new(Arc::clone(backend), model);
            if cache {
                Arc::new(CachedTranslator::new(llm))
            } else {
                Arc::new(llm)
            }
        }
        _ => Arc::new(PassthroughTranslator),
    }
}

/// Resolves the backend (probing Ollama for `auto`) and assembles a controller.
pub async fn build_controller(config: &VaniConfig, backend_flag: Option<&str>) -> Result<TutorController> {
    let settings = vani_config::tutor_settings(config);
    let choice = backend_choice(config, backend_flag)?;
    let ollama = ollama_from(config);

    let backend = resolve_backend(choice, ollama.clone()).await;
    if backend.name() == "ollama" {
        match ollama.has_model(&settings.generation.model).await {
            Ok(true) => {}
            Ok(false) => warn!(
                model = %settings.generation.model,
                "model is not pulled; run `ollama pull {}`",
                settings.generation.model
            ),
            Err(e) => warn!(error = %e, "could not list Ollama models"),
        }
    }

    let translator = build_translator(config, &backend, &settings.generation.model);
    info!(
        backend = %backend.name(),
        translator = %translator.name(),
        model = %settings.generation.model,
        "tutor ready"
    );
    Ok(TutorController::new(backend, translator, settings))
}
