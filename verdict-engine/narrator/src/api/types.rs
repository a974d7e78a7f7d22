use serde::{Deserialize, Serialize};

use verdict_engine::{Canonical, ItemParams, PreviewState, Resolved};

/// The resolved decision handed to the narrator, read-only.
#[derive(Debug, Clone)]
pub struct NarrationInput {
    pub label: String,
    pub canonical: Canonical,
    pub params: ItemParams,
    pub state: PreviewState,
    pub resolved: Resolved,
    /// Stable identifiers of the rules behind the decision.
    pub sources: Vec<String>,
}

/// Structured UX payload. Badges and sources are copied from the
/// resolved decision, never written by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narration {
    pub title: String,
    pub carry_on_reason: String,
    pub checked_reason: String,
    pub bullets: Vec<String>,
    pub badges: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footnote: Option<String>,
    pub sources: Vec<String>,
}

impl Narration {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.bullets.is_empty()
    }
}

/// Errors produced by the narration adapter.
#[derive(Debug, thiserror::Error)]
pub enum NarrateError {
    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("narration contract violated: {0}")]
    Contract(String),
}
