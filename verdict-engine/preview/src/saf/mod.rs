pub use crate::api::types::{PreviewOutcome, PreviewRequest, PreviewResponse};
pub use crate::core::orchestrator::PreviewService;
pub use crate::spi::config::PreviewConfig;
