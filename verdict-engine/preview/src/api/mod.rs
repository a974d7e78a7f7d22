pub mod types;

pub use types::{PreviewOutcome, PreviewRequest, PreviewResponse};
