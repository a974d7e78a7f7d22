/// Classifier configuration loaded from environment variables.
///
/// | Variable | Default |
/// |----------|---------|
/// | `ADVISOR_LLM_MODEL` | `claude-sonnet-4-20250514` |
/// | `ADVISOR_LLM_MAX_TOKENS` | `1024` |
/// | `ADVISOR_DRAFT_CACHE_TTL_SECS` | `600` |
///
/// Temperature is fixed at 0 and not configurable.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub model: String,
    pub max_tokens: u32,
    pub draft_cache_ttl_secs: u64,
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        Self {
            model: std::env::var("ADVISOR_LLM_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),
            max_tokens: std::env::var("ADVISOR_LLM_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            draft_cache_ttl_secs: std::env::var("ADVISOR_DRAFT_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
