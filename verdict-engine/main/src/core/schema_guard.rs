use serde::Deserialize;
use serde_json::Value;

use crate::api::types::{
    BagVerdict, ClassificationDraft, ItemParams, ModelInfo, Signals,
};
use crate::core::taxonomy::Taxonomy;
use crate::spi::types::{Canonical, VerdictStatus};

/// Maximum number of matched terms the classifier may return.
pub const MAX_MATCHED_TERMS: usize = 4;

/// A schema violation in the classifier output.
///
/// `canonical` is populated when the canonical field itself was
/// recoverable, so the caller can still fall back to taxonomy defaults.
#[derive(Debug, Clone)]
pub struct GuardViolation {
    pub field: String,
    pub detail: String,
    pub canonical: Option<Canonical>,
}

impl GuardViolation {
    fn new(field: &str, detail: impl Into<String>, canonical: Option<Canonical>) -> Self {
        Self {
            field: field.to_string(),
            detail: detail.into(),
            canonical,
        }
    }
}

#[derive(Deserialize)]
struct RawDraft {
    canonical: String,
    #[serde(default)]
    params: RawParams,
    carry_on: Value,
    checked: Value,
    #[serde(default)]
    needs_review: bool,
    signals: RawSignals,
    model_info: Option<RawModelInfo>,
}

#[derive(Deserialize, Default)]
struct RawParams {
    volume_ml: Option<Value>,
    wh: Option<Value>,
    count: Option<Value>,
    weight_kg: Option<Value>,
    abv_percent: Option<Value>,
    blade_length_cm: Option<Value>,
}

#[derive(Deserialize)]
struct RawSignals {
    matched_terms: Vec<Value>,
    confidence: Value,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
struct RawModelInfo {
    name: String,
    temperature: f64,
}

/// Validate raw classifier output against the response schema.
///
/// Beyond shape checks this enforces: the canonical is a member of the
/// closed set, each numeric parameter is null or finite and
/// non-negative, statuses are enum members, matched terms are verbatim
/// substrings of the label (at most [`MAX_MATCHED_TERMS`]), and the
/// confidence lies in `[0, 1]`.
pub fn validate_draft(
    taxonomy: &Taxonomy,
    raw: &Value,
    label: &str,
) -> Result<ClassificationDraft, GuardViolation> {
    let parsed: RawDraft = serde_json::from_value(raw.clone())
        .map_err(|e| GuardViolation::new("root", e.to_string(), None))?;

    let canonical = Canonical::from_key(&parsed.canonical).ok_or_else(|| {
        GuardViolation::new(
            "canonical",
            format!("'{}' is not a member of the closed set", parsed.canonical),
            None,
        )
    })?;
    // Benign or risk, the key must be one the taxonomy actually knows.
    if !canonical.is_benign() && !taxonomy.is_risk(canonical) {
        return Err(GuardViolation::new(
            "canonical",
            format!("'{canonical}' has no taxonomy entry"),
            None,
        ));
    }
    let recovered = Some(canonical);

    let params = ItemParams {
        volume_ml: numeric_param("params.volume_ml", &parsed.params.volume_ml, recovered)?,
        wh: numeric_param("params.wh", &parsed.params.wh, recovered)?,
        count: numeric_param("params.count", &parsed.params.count, recovered)?,
        weight_kg: numeric_param("params.weight_kg", &parsed.params.weight_kg, recovered)?,
        abv_percent: numeric_param("params.abv_percent", &parsed.params.abv_percent, recovered)?,
        blade_length_cm: numeric_param(
            "params.blade_length_cm",
            &parsed.params.blade_length_cm,
            recovered,
        )?,
    };

    let carry_on = bag_verdict("carry_on", &parsed.carry_on, recovered)?;
    let checked = bag_verdict("checked", &parsed.checked, recovered)?;

    if parsed.signals.matched_terms.len() > MAX_MATCHED_TERMS {
        return Err(GuardViolation::new(
            "signals.matched_terms",
            format!("more than {MAX_MATCHED_TERMS} terms"),
            recovered,
        ));
    }
    let mut matched_terms = Vec::new();
    for term in &parsed.signals.matched_terms {
        let Some(term) = term.as_str() else {
            return Err(GuardViolation::new(
                "signals.matched_terms",
                "non-string term",
                recovered,
            ));
        };
        // Terms the model did not copy verbatim from the label are
        // dropped; the conflict detector treats a short remainder as a
        // low-confidence signal.
        if label.contains(term) {
            matched_terms.push(term.to_string());
        }
    }

    let confidence = parsed.signals.confidence.as_f64().ok_or_else(|| {
        GuardViolation::new("signals.confidence", "not a number", recovered)
    })?;
    if !(0.0..=1.0).contains(&confidence) || !confidence.is_finite() {
        return Err(GuardViolation::new(
            "signals.confidence",
            format!("{confidence} outside [0, 1]"),
            recovered,
        ));
    }

    let model_info = parsed
        .model_info
        .ok_or_else(|| GuardViolation::new("model_info", "missing", recovered))?;

    Ok(ClassificationDraft {
        canonical,
        params,
        carry_on,
        checked,
        needs_review: parsed.needs_review,
        signals: Signals {
            matched_terms,
            confidence,
            notes: parsed.signals.notes,
        },
        model_info: ModelInfo {
            name: model_info.name,
            temperature: model_info.temperature,
        },
    })
}

fn numeric_param(
    field: &str,
    value: &Option<Value>,
    canonical: Option<Canonical>,
) -> Result<Option<f64>, GuardViolation> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let n = value
                .as_f64()
                .ok_or_else(|| GuardViolation::new(field, "not a number", canonical))?;
            if !n.is_finite() || n < 0.0 {
                return Err(GuardViolation::new(
                    field,
                    format!("{n} is not a finite non-negative number"),
                    canonical,
                ));
            }
            Ok(Some(n))
        }
    }
}

fn bag_verdict(
    field: &str,
    value: &Value,
    canonical: Option<Canonical>,
) -> Result<BagVerdict, GuardViolation> {
    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| GuardViolation::new(field, "missing status", canonical))?;
    let status: VerdictStatus = serde_json::from_value(Value::String(status.to_string()))
        .map_err(|_| {
            GuardViolation::new(field, format!("unknown status '{status}'"), canonical)
        })?;
    let badges = match value.get("badges") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let mut badges = Vec::new();
            for item in items {
                let Some(badge) = item.as_str() else {
                    return Err(GuardViolation::new(field, "non-string badge", canonical));
                };
                badges.push(badge.to_string());
            }
            badges
        }
        Some(_) => {
            return Err(GuardViolation::new(field, "badges is not an array", canonical));
        }
    };
    Ok(BagVerdict { status, badges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn taxonomy() -> Taxonomy {
        Taxonomy::load_default().unwrap()
    }

    fn valid_raw() -> Value {
        json!({
            "canonical": "aerosol_toiletry",
            "params": {
                "volume_ml": 350.0, "wh": null, "count": null,
                "weight_kg": null, "abv_percent": null, "blade_length_cm": null
            },
            "carry_on": { "status": "limit", "badges": ["security screening limits"] },
            "checked": { "status": "allow", "badges": [] },
            "needs_review": false,
            "signals": {
                "matched_terms": ["hair spray", "350ml"],
                "confidence": 0.93
            },
            "model_info": { "name": "test-model", "temperature": 0.0 }
        })
    }

    #[test]
    fn accepts_a_valid_draft() {
        let draft = validate_draft(&taxonomy(), &valid_raw(), "hair spray 350ml").unwrap();
        assert_eq!(draft.canonical, Canonical::AerosolToiletry);
        assert_eq!(draft.params.volume_ml, Some(350.0));
        assert_eq!(draft.signals.matched_terms.len(), 2);
    }

    #[test]
    fn rejects_unknown_canonical() {
        let mut raw = valid_raw();
        raw["canonical"] = json!("plasma_rifle");
        let err = validate_draft(&taxonomy(), &raw, "hair spray 350ml").unwrap_err();
        assert_eq!(err.field, "canonical");
        assert!(err.canonical.is_none());
    }

    #[test]
    fn rejects_negative_numeric_param_but_recovers_canonical() {
        let mut raw = valid_raw();
        raw["params"]["volume_ml"] = json!(-5.0);
        let err = validate_draft(&taxonomy(), &raw, "hair spray 350ml").unwrap_err();
        assert_eq!(err.field, "params.volume_ml");
        assert_eq!(err.canonical, Some(Canonical::AerosolToiletry));
    }

    #[test]
    fn rejects_out_of_enum_status() {
        let mut raw = valid_raw();
        raw["carry_on"]["status"] = json!("maybe");
        let err = validate_draft(&taxonomy(), &raw, "hair spray 350ml").unwrap_err();
        assert_eq!(err.field, "carry_on");
    }

    #[test]
    fn drops_terms_that_are_not_verbatim_substrings() {
        let mut raw = valid_raw();
        raw["signals"]["matched_terms"] = json!(["hair spray", "hairspray!"]);
        let draft = validate_draft(&taxonomy(), &raw, "hair spray 350ml").unwrap();
        assert_eq!(draft.signals.matched_terms, vec!["hair spray"]);
    }

    #[test]
    fn rejects_confidence_outside_unit_interval() {
        let mut raw = valid_raw();
        raw["signals"]["confidence"] = json!(1.2);
        let err = validate_draft(&taxonomy(), &raw, "hair spray 350ml").unwrap_err();
        assert_eq!(err.field, "signals.confidence");
    }

    #[test]
    fn rejects_too_many_matched_terms() {
        let mut raw = valid_raw();
        raw["signals"]["matched_terms"] = json!(["h", "a", "i", "r", "s"]);
        let err = validate_draft(&taxonomy(), &raw, "hair spray 350ml").unwrap_err();
        assert_eq!(err.field, "signals.matched_terms");
    }
}
