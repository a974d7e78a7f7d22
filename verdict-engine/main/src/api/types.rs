use serde::{Deserialize, Serialize};

use crate::spi::types::{CabinClass, Canonical, ParamName, VerdictStatus};

/// Ordered trip: origin, optional via-points, destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub origin: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub via: Vec<String>,
    pub destination: String,
    /// True when a via-point re-screens carry-on for the onward leg.
    #[serde(default)]
    pub has_rescreening: bool,
}

impl Itinerary {
    pub fn direct(origin: &str, destination: &str) -> Self {
        Self {
            origin: origin.to_string(),
            via: Vec::new(),
            destination: destination.to_string(),
            has_rescreening: false,
        }
    }

    /// Airports in travel order.
    pub fn airports(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.origin.as_str())
            .chain(self.via.iter().map(String::as_str))
            .chain(std::iter::once(self.destination.as_str()))
    }
}

/// One operated flight leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub carrier: String,
    pub cabin_class: CabinClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fare_class: Option<String>,
}

/// Optional numeric item attributes. Absent means unknown — never a
/// sentinel zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemParams {
    #[serde(default)]
    pub volume_ml: Option<f64>,
    #[serde(default)]
    pub wh: Option<f64>,
    #[serde(default)]
    pub count: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub abv_percent: Option<f64>,
    #[serde(default)]
    pub blade_length_cm: Option<f64>,
}

impl ItemParams {
    pub fn get(&self, name: ParamName) -> Option<f64> {
        match name {
            ParamName::VolumeMl => self.volume_ml,
            ParamName::Wh => self.wh,
            ParamName::Count => self.count,
            ParamName::WeightKg => self.weight_kg,
            ParamName::AbvPercent => self.abv_percent,
            ParamName::BladeLengthCm => self.blade_length_cm,
        }
    }

    pub fn is_empty(&self) -> bool {
        ParamName::ALL.iter().all(|p| self.get(*p).is_none())
    }
}

/// Per-bag draft verdict as proposed by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BagVerdict {
    pub status: VerdictStatus,
    #[serde(default)]
    pub badges: Vec<String>,
}

/// Extraction signals accompanying a classification draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub matched_terms: Vec<String>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Which model produced a draft, and at what temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub temperature: f64,
}

/// Validated classifier output: canonical, params, draft verdicts, signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationDraft {
    pub canonical: Canonical,
    pub params: ItemParams,
    pub carry_on: BagVerdict,
    pub checked: BagVerdict,
    pub needs_review: bool,
    pub signals: Signals,
    pub model_info: ModelInfo,
}

/// Authoritative per-bag verdict after rule resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVerdict {
    pub status: VerdictStatus,
    pub badges: Vec<String>,
    /// Stable identifiers of the template and rules behind this verdict.
    pub reason_codes: Vec<String>,
}

/// The pair of resolved verdicts for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolved {
    pub carry_on: ResolvedVerdict,
    pub checked: ResolvedVerdict,
}

/// Whether a preview is final or needs a human in the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewState {
    Complete,
    NeedsReview,
}

/// Failure and review signals accumulated along the pipeline.
///
/// No flag ever downgrades a `deny`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub validation_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offending_field: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_params: Vec<ParamName>,
    #[serde(default)]
    pub low_confidence: bool,
    #[serde(default)]
    pub conflict: bool,
    #[serde(default)]
    pub llm_error: bool,
    #[serde(rename = "override", default)]
    pub override_review: bool,
    /// Human-readable context per raised flag (rule ids, field names).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl Flags {
    /// True when any review-forcing flag is set.
    pub fn any(&self) -> bool {
        self.validation_error
            || !self.missing_params.is_empty()
            || self.low_confidence
            || self.conflict
            || self.llm_error
            || self.override_review
    }
}

/// Trace of what the engine consulted for a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineTrace {
    pub canonical: Canonical,
    pub params: ItemParams,
    /// Taxonomy template the merge started from.
    pub template: String,
    /// Stable identifiers of every contributing rule, in merge order.
    pub applied_rules: Vec<String>,
    /// Layers that contributed at least one rule, e.g. `country:KR`.
    pub layers: Vec<String>,
}
