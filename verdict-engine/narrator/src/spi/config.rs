/// Narrator configuration loaded from environment variables.
///
/// | Variable | Default |
/// |----------|---------|
/// | `ADVISOR_NARRATION_ENABLED` | `true` |
/// | `ADVISOR_LLM_MODEL` | `claude-sonnet-4-20250514` |
/// | `ADVISOR_NARRATION_MAX_TOKENS` | `512` |
/// | `ADVISOR_NARRATION_TIMEOUT_SECS` | `5` |
#[derive(Debug, Clone)]
pub struct NarratorConfig {
    pub enabled: bool,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl NarratorConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("ADVISOR_NARRATION_ENABLED")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(true),
            model: std::env::var("ADVISOR_LLM_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),
            max_tokens: std::env::var("ADVISOR_NARRATION_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(512),
            timeout_secs: std::env::var("ADVISOR_NARRATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
