use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use vani_core::{Language, Translator};

/// Client for a self-hosted LibreTranslate server.
pub struct LibreTranslateTranslator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl LibreTranslateTranslator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks that the server answers `/languages`.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/languages", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .with_context(|| format!("LibreTranslate is not reachable at {}", self.base_url))?;
        if !response.status().is_success() {
            anyhow::bail!("LibreTranslate returned HTTP {}", response.status());
        }
        Ok(())
    }

    fn body<'a>(&'a self, text: &'a str, target: Language) -> TranslateRequest<'a> {
        TranslateRequest {
            q: text,
            source: "auto",
            target: target.code(),
            format: "text",
            api_key: self.api_key.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

#[async_trait]
impl Translator for LibreTranslateTranslator {
    fn name(&self) -> &str {
        "libretranslate"
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String> {
        debug!(target_lang = %target, chars = text.len(), "Sending text to LibreTranslate");

        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .timeout(self.timeout)
            .json(&self.body(text, target))
            .send()
            .await
            .context("LibreTranslate HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("LibreTranslate returned {}: {}", status, error_body);
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .context("Failed to parse LibreTranslate response")?;

        let translated = parsed.translated_text.trim();
        if translated.is_empty() {
            anyhow::bail!("LibreTranslate returned an empty translation");
        }
        Ok(translated.to_string())
    }
}
