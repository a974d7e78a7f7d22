use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::service::{CompletionRequest, CompletionResponse, LlmService};

const API_VERSION: &str = "2023-06-01";

/// HTTP client for the Anthropic Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout_secs: u64,
}

#[derive(Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let api_key = config.api_key.clone().ok_or(GatewayError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl LlmService for AnthropicClient {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        let mut messages = vec![json!({"role": "user", "content": req.user})];
        if req.json_only {
            // Prefill the opening brace so the model completes a bare
            // JSON object instead of wrapping it in prose.
            messages.push(json!({"role": "assistant", "content": "{"}));
        }

        let body = json!({
            "model": req.model,
            "max_tokens": req.max_tokens,
            "temperature": req.temperature,
            "system": req.system,
            "messages": messages,
        });

        let url = format!("{}/v1/messages", self.base_url);
        tracing::debug!(model = %req.model, "sending completion request");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.timeout_secs)
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        let mut text: String = parsed
            .content
            .iter()
            .filter(|b| b.kind == "text")
            .map(|b| b.text.as_str())
            .collect();
        if text.trim().is_empty() {
            return Err(GatewayError::EmptyCompletion);
        }
        if req.json_only && !text.trim_start().starts_with('{') {
            // Re-attach the prefilled brace the API does not echo back.
            text.insert(0, '{');
        }

        Ok(CompletionResponse {
            content: text,
            model: parsed.model,
        })
    }
}
