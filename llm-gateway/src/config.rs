/// Gateway configuration loaded from environment variables.
///
/// | Variable | Default |
/// |----------|---------|
/// | `ANTHROPIC_API_KEY` | *(none)* |
/// | `ADVISOR_LLM_BASE_URL` | `https://api.anthropic.com` |
/// | `ADVISOR_LLM_TIMEOUT_SECS` | `8` |
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            base_url: std::env::var("ADVISOR_LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com".into()),
            timeout_secs: std::env::var("ADVISOR_LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),
        }
    }

    /// Returns `true` when an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
