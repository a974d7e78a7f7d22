use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::service::{CompletionRequest, CompletionResponse, LlmService};

/// Scripted [`LlmService`] for tests: replays queued outcomes in order.
///
/// Once the script is exhausted every further call fails, which makes
/// unexpected extra model calls visible in assertions.
pub struct ScriptedLlm {
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reply(self, content: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(content.to_string()));
        self
    }

    pub fn fail(self, err: GatewayError) -> Self {
        self.script.lock().unwrap().push_back(Err(err));
        self
    }

    /// Number of completions served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn complete(&self, req: CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(CompletionResponse {
                content,
                model: req.model,
            }),
            Some(Err(err)) => Err(err),
            None => Err(GatewayError::Transport("script exhausted".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::CompletionBuilder;

    #[tokio::test]
    async fn replays_in_order() {
        let llm = ScriptedLlm::new().reply("first").reply("second");
        let a = CompletionBuilder::new("m").user("x").execute(&llm).await.unwrap();
        let b = CompletionBuilder::new("m").user("x").execute(&llm).await.unwrap();
        assert_eq!(a.content, "first");
        assert_eq!(b.content, "second");
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn exhausted_script_errors() {
        let llm = ScriptedLlm::new();
        let out = CompletionBuilder::new("m").user("x").execute(&llm).await;
        assert!(matches!(out, Err(GatewayError::Transport(_))));
    }
}
