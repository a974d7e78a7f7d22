/// Errors produced by the LLM gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("no API key found (set ANTHROPIC_API_KEY)")]
    MissingApiKey,

    #[error("model call timed out after {0} s")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("model API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned an empty completion")]
    EmptyCompletion,

    #[error("could not decode model API response: {0}")]
    Decode(String),
}
