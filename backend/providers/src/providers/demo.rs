use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use vani_core::{LlmProvider, LlmRequest, LlmResponse};

/// Canned Socratic replies used when no model is available.
const DEMO_RESPONSES: [&str; 5] = [
    "That is a great question! Before I give you the answer, let me ask: \
     What does Newton's Second Law of Motion tell us about the relationship \
     between force, mass, and acceleration?",
    "Good thinking! Now, if F = m x a, and we know the mass of the object, \
     what value would you substitute for 'm' in the formula?",
    "Excellent! You have substituted the mass correctly. \
     Now look at the acceleration value given in the problem. \
     Can you plug it in and calculate the result?",
    "You are almost there! Check your arithmetic once more. \
     What unit does force have, and does your answer carry that unit?",
    "Well done! You solved it. Can you now explain in your own words \
     why a heavier object needs more force to achieve the same acceleration?",
];

/// Offline backend that cycles through canned replies.
///
/// Every new session restarts the cycle, so `/new` opens with the first
/// canned question again.
pub struct DemoProvider {
    responses: Vec<String>,
    cursor: AtomicUsize,
}

impl DemoProvider {
    pub fn new() -> Self {
        Self {
            responses: DEMO_RESPONSES.iter().map(|s| s.to_string()).collect(),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Always answer with `response`.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.responses = vec![response.into()];
        self
    }

    pub fn with_responses<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses = responses.into_iter().map(Into::into).collect();
        self
    }

    fn reset(&self) {
        self.cursor.store(0, Ordering::Relaxed);
    }
}

impl Default for DemoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for DemoProvider {
    fn name(&self) -> &str {
        "demo"
    }

    fn begin_session(&self) {
        self.reset();
    }

    async fn complete(&self, _req: &LlmRequest) -> Result<LlmResponse> {
        if self.responses.is_empty() {
            anyhow::bail!("demo provider has no canned responses");
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.responses.len();
        Ok(LlmResponse {
            content: self.responses[i].clone(),
            provider: "demo".to_string(),
            model: "canned".to_string(),
            tokens_used: 0,
            latency_ms: 0,
        })
    }
}
