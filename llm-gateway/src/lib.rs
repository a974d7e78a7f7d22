//! Capability interface to external text models.
//!
//! The rest of the workspace talks to the model through the [`LlmService`]
//! trait so tests can substitute a scripted implementation. The shipped
//! implementation is [`AnthropicClient`], an HTTP client for the Messages
//! API with a per-call wall-clock limit and an optional strict-JSON
//! completion mode.

mod anthropic;
mod config;
mod error;
mod scripted;
mod service;

pub use anthropic::AnthropicClient;
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use scripted::ScriptedLlm;
pub use service::{CompletionBuilder, CompletionRequest, CompletionResponse, LlmService};
