/// Orchestrator configuration loaded from environment variables.
///
/// | Variable | Default |
/// |----------|---------|
/// | `ADVISOR_PREVIEW_CACHE_TTL_SECS` | `120` |
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    pub cache_ttl_secs: u64,
}

impl PreviewConfig {
    pub fn from_env() -> Self {
        Self {
            cache_ttl_secs: std::env::var("ADVISOR_PREVIEW_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
