//! Chat-completions client for the external LLM endpoint.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::config::LlmConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// One completion for the given message sequence.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// OpenAI-compatible `POST <base_url>/chat/completions` provider.
pub struct OpenAiCompatProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiCompatProvider {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;

        tracing::info!(
            base_url = %config.base_url,
            model = %config.model,
            key_configured = !config.api_key.is_empty(),
            "creating LLM provider"
        );

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Parse a completion body, surfacing `{error}` envelopes and HTML
    /// error pages (CDNs sometimes return 200 with HTML) as clear errors.
    fn parse_completion(status: reqwest::StatusCode, body: &str, endpoint: &str) -> Result<String> {
        let trimmed = body.trim_start();
        if trimmed.starts_with('<') {
            let preview: String = trimmed.chars().take(200).collect();
            return Err(anyhow!(
                "endpoint {} returned HTML instead of JSON (HTTP {}): {}",
                endpoint,
                status,
                preview
            ));
        }

        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            let preview: String = body.chars().take(300).collect();
            anyhow!(
                "failed to parse JSON from {} (HTTP {}): {}. Body: {}",
                endpoint,
                status,
                e,
                preview
            )
        })?;

        if let Some(error) = value.get("error") {
            return Err(anyhow!("LLM API error: {}", error));
        }
        if !status.is_success() {
            return Err(anyhow!("LLM API returned HTTP {}: {}", status, body));
        }

        let completion: CompletionResponse = serde_json::from_value(value)
            .map_err(|e| anyhow!("unexpected completion shape from {}: {}", endpoint, e))?;
        let first = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no choices returned from {}", endpoint))?;
        Ok(first.message.content.trim().to_string())
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(anyhow!("LLM API key is not configured"));
        }

        let request = json!({
            "model": self.model,
            "messages": messages,
        });

        let endpoint = self.endpoint();
        tracing::debug!(
            %endpoint,
            model = %self.model,
            message_count = messages.len(),
            "sending chat completion request"
        );

        let response = self
            .http
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("request to {} timed out", endpoint)
                } else if e.is_connect() {
                    anyhow!("failed to connect to {}: {}", endpoint, e)
                } else {
                    anyhow!("request to {} failed: {}", endpoint, e)
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("failed to read response body from {}: {}", endpoint, e))?;

        Self::parse_completion(status, &body, &endpoint)
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}
