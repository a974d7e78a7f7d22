//! LLM-assisted item classification.
//!
//! One strict-JSON call per preview: the model picks a canonical from
//! the closed taxonomy, extracts numeric parameters, and proposes
//! conservative draft verdicts. Output is validated by the engine's
//! schema guard before anything downstream (the draft cache included)
//! ever sees it.

pub mod api;
pub mod core;
pub mod spi;

pub use api::{ClassifyError, ClassifyRequest, ItemClassifier};
pub use spi::ClassifierConfig;
