use std::path::PathBuf;

/// Engine configuration loaded from environment variables.
///
/// | Variable | Default |
/// |----------|---------|
/// | `ADVISOR_REGULATIONS_DIR` | `data/regulations` |
/// | `ADVISOR_TAXONOMY_PATH` | *(embedded taxonomy)* |
/// | `ADVISOR_CONFIDENCE_THRESHOLD` | `0.6` |
/// | `ADVISOR_ALWAYS_REVIEW` | *(empty)* |
///
/// Nothing here can affect the monotonicity of `deny`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub regulations_dir: PathBuf,
    pub taxonomy_path: Option<PathBuf>,
    pub confidence_threshold: f64,
    /// Canonical keys an operator forces into review regardless of outcome.
    pub always_review: Vec<String>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            regulations_dir: std::env::var("ADVISOR_REGULATIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/regulations")),
            taxonomy_path: std::env::var("ADVISOR_TAXONOMY_PATH").ok().map(PathBuf::from),
            confidence_threshold: std::env::var("ADVISOR_CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.6),
            always_review: std::env::var("ADVISOR_ALWAYS_REVIEW")
                .map(|s| {
                    s.split(',')
                        .map(|k| k.trim().to_string())
                        .filter(|k| !k.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
