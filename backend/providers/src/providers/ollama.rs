use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use vani_core::{LlmProvider, LlmRequest, LlmResponse};

const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Ollama local LLM provider.
#[derive(Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: "http://localhost:11434".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks that the server answers at all.
    pub async fn ping(&self) -> Result<()> {
        self.list_models().await.map(|_| ())
    }

    /// Names of the locally pulled models (e.g. `phi3:latest`).
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PING_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Ollama is not reachable at {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Ollama returned HTTP {}", status);
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .context("Failed to parse Ollama model list")?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// True when a pulled model's tag starts with `model` (`phi3` matches `phi3:latest`).
    pub async fn has_model(&self, model: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|tag| tag.starts_with(model)))
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize, Deserialize)]
struct OllamaChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
    eval_count: Option<u64>,
    prompt_eval_count: Option<u64>,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Deserialize)]
struct OllamaModelTag {
    name: String,
}

fn chat_body(request: &LlmRequest) -> OllamaChatRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if !request.system_prompt.is_empty() {
        messages.push(OllamaChatMessage {
            role: "system".to_string(),
            content: request.system_prompt.clone(),
        });
    }
    messages.extend(request.messages.iter().map(|m| OllamaChatMessage {
        role: m.role.as_str().to_string(),
        content: m.content.clone(),
    }));

    // Strip any provider prefix like "ollama/"
    let model = request
        .model
        .rsplit('/')
        .next()
        .unwrap_or(&request.model)
        .to_string();

    OllamaChatRequest {
        model,
        messages,
        stream: false,
        options: OllamaOptions {
            temperature: request.temperature,
            num_predict: request.max_tokens,
        },
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let start = Instant::now();
        let body = chat_body(request);
        let model = body.model.clone();

        debug!(model = %model, messages = body.messages.len(), "Sending request to Ollama");

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await
            .context("Ollama HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama returned {}: {}", status, error_body);
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        let tokens_used = chat_response.eval_count.unwrap_or(0)
            + chat_response.prompt_eval_count.unwrap_or(0);

        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(latency_ms, tokens_used, "Ollama replied");

        Ok(LlmResponse {
            content: chat_response.message.content.trim().to_string(),
            provider: "ollama".to_string(),
            model,
            tokens_used,
            latency_ms,
        })
    }
}
