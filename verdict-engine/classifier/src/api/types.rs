use serde::{Deserialize, Serialize};

use verdict_engine::{Canonical, ItemParams, Itinerary, Segment};

/// One classification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    pub itinerary: Itinerary,
    #[serde(default)]
    pub segments: Vec<Segment>,
    /// Caller-supplied numeric attributes, passed to the model as hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_params_hint: Option<ItemParams>,
}

/// Errors produced by the classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// Timeout, transport failure, or a non-JSON body. One attempt per
    /// request; the caller decides whether review is needed.
    #[error("model unavailable: {0}")]
    Unavailable(String),

    /// The model answered but its output failed the schema guard.
    #[error("schema violation in '{field}': {detail}")]
    Invalid {
        field: String,
        detail: String,
        /// Populated when the canonical field itself was recoverable.
        canonical: Option<Canonical>,
    },
}
