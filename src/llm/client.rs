use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::types::{CompletionRequest, CompletionResponse};
use super::TextCompletion;
use crate::config::LlmConfig;
use crate::error::{LlmError, LlmResult};

/// Client for an OpenAI-compatible completion endpoint.
///
/// One attempt per prompt: no retries, no backoff.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    timeout_ms: u64,
    health_timeout: Duration,
}

impl CompletionClient {
    /// Create a new completion client
    pub fn new(config: &LlmConfig) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_ms: config.timeout_ms,
            health_timeout: Duration::from_millis(config.health_timeout_ms),
        })
    }

    /// Send a single completion request, surfacing failures as errors.
    pub async fn complete(&self, prompt: &str) -> LlmResult<String> {
        let url = format!("{}/v1/completions", self.base_url);
        let request = CompletionRequest::new(&self.model, prompt, self.max_tokens, self.temperature);

        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "Calling completion endpoint"
        );

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let completion: CompletionResponse =
            response
                .json()
                .await
                .map_err(|e| LlmError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        info!(
            model = %self.model,
            latency_ms = start.elapsed().as_millis(),
            "Completion call succeeded"
        );

        Ok(completion.first_text().unwrap_or_default().to_string())
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextCompletion for CompletionClient {
    async fn generate(&self, prompt: &str) -> String {
        match self.complete(prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, model = %self.model, "Completion call failed");
                String::new()
            }
        }
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);

        match self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, url = %url, "Completion service health probe failed");
                false
            }
        }
    }
}
