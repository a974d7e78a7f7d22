use serde::{Deserialize, Serialize};

use verdict_engine::{EngineTrace, Flags, ItemParams, Itinerary, PreviewState, Resolved, Segment};
use verdict_engine_narrator::Narration;

/// One preview request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req_id: Option<String>,
    pub itinerary: Itinerary,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_params: Option<ItemParams>,
    #[serde(default)]
    pub duty_free: bool,
}

/// The cacheable part of a preview: everything except the caller's
/// request id, so idempotent requests share byte-identical decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewOutcome {
    pub state: PreviewState,
    pub resolved: Resolved,
    pub engine: EngineTrace,
    pub narration: Narration,
    pub flags: Flags,
}

/// Full preview response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub req_id: String,
    pub state: PreviewState,
    pub resolved: Resolved,
    pub engine: EngineTrace,
    pub narration: Narration,
    pub flags: Flags,
}

impl PreviewResponse {
    pub fn from_outcome(req_id: String, outcome: PreviewOutcome) -> Self {
        Self {
            req_id,
            state: outcome.state,
            resolved: outcome.resolved,
            engine: outcome.engine,
            narration: outcome.narration,
            flags: outcome.flags,
        }
    }
}
