use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use vani_core::{ChatMessage, Language, LlmProvider, LlmRequest, Translator};

/// Translates by asking the text-generation backend itself.
pub struct LlmTranslator {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl LlmTranslator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    fn request(&self, text: &str, target: Language) -> LlmRequest {
        LlmRequest {
            model: self.model.clone(),
            system_prompt: format!(
                "You are a translator. Translate the user's text into {}. \
                 Keep numbers, formulas and units unchanged. \
                 Reply with the translation only.",
                target.english_name()
            ),
            messages: vec![ChatMessage::user(text)],
            max_tokens: 512,
            temperature: 0.2,
        }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    fn name(&self) -> &str {
        "llm"
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String> {
        let response = self.provider.complete(&self.request(text, target)).await?;
        let translated = response.content.trim();
        if translated.is_empty() {
            anyhow::bail!("{} returned an empty translation", response.provider);
        }
        Ok(translated.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::demo::DemoProvider;

    #[tokio::test]
    async fn uses_backend_output() {
        let backend = Arc::new(DemoProvider::new().with_response("  कौन सा सूत्र?  "));
        let t = LlmTranslator::new(backend, "phi3");
        let out = t.translate("Which formula?", Language::Hi).await.unwrap();
        assert_eq!(out, "कौन सा सूत्र?");
    }

    #[tokio::test]
    async fn empty_output_is_an_error() {
        let backend = Arc::new(DemoProvider::new().with_response("   "));
        let t = LlmTranslator::new(backend, "phi3");
        assert!(t.translate("Which formula?", Language::Ta).await.is_err());
    }

    #[test]
    fn prompt_names_target_language() {
        let t = LlmTranslator::new(Arc::new(DemoProvider::new()), "phi3");
        let req = t.request("hello", Language::Te);
        assert!(req.system_prompt.contains("Telugu"));
        assert_eq!(req.messages, vec![ChatMessage::user("hello")]);
    }
}
