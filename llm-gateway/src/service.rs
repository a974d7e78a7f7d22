use async_trait::async_trait;

use crate::error::GatewayError;

/// A single completion request to the model.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// When set, the gateway constrains the completion to a single JSON
    /// object (prefilled opening brace, no prose around it).
    pub json_only: bool,
}

/// The model's reply.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

/// Capability trait for text-model completions.
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, GatewayError>;
}

/// Builder for completion requests.
///
/// ```ignore
/// let response = CompletionBuilder::new("claude-sonnet-4-20250514")
///     .system(system_prompt)
///     .user(payload)
///     .json_only()
///     .execute(&*llm)
///     .await?;
/// ```
pub struct CompletionBuilder {
    req: CompletionRequest,
}

impl CompletionBuilder {
    pub fn new(model: &str) -> Self {
        Self {
            req: CompletionRequest {
                model: model.to_string(),
                system: String::new(),
                user: String::new(),
                max_tokens: 1024,
                temperature: 0.0,
                json_only: false,
            },
        }
    }

    pub fn system(mut self, system: &str) -> Self {
        self.req.system = system.to_string();
        self
    }

    pub fn user(mut self, user: &str) -> Self {
        self.req.user = user.to_string();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.req.max_tokens = max_tokens;
        self
    }

    pub fn json_only(mut self) -> Self {
        self.req.json_only = true;
        self
    }

    pub async fn execute(
        self,
        service: &dyn LlmService,
    ) -> Result<CompletionResponse, GatewayError> {
        service.complete(self.req).await
    }
}
