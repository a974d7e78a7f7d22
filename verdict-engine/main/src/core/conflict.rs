use crate::api::types::ClassificationDraft;
use crate::core::resolver::Resolution;
use crate::core::taxonomy::Taxonomy;
use crate::spi::types::VerdictStatus;

/// Minimum matched terms before a draft counts as grounded in the label.
const MIN_MATCHED_TERMS: usize = 2;

/// Review signals raised by comparing the draft against the merged rules.
#[derive(Debug, Clone, Default)]
pub struct ConflictFindings {
    pub conflict: bool,
    pub low_confidence: bool,
    pub details: Vec<String>,
}

/// Compare the LLM draft verdicts with the rule-derived outcome.
///
/// The merged verdict is authoritative; a draft that is more permissive
/// than what a rule emitted is a conflict, as is a draft that relaxes a
/// taxonomy `deny` template. Low extraction quality (confidence under
/// the threshold, fewer than two grounded terms) raises review without
/// being a conflict.
pub fn detect(
    taxonomy: &Taxonomy,
    draft: &ClassificationDraft,
    resolution: &Resolution,
    confidence_threshold: f64,
    has_rescreening: bool,
    duty_free: bool,
) -> ConflictFindings {
    let mut findings = ConflictFindings::default();

    let bags = [
        ("carry_on", draft.carry_on.status, resolution.carry_rule_status),
        ("checked", draft.checked.status, resolution.checked_rule_status),
    ];
    for (bag, draft_status, rule_status) in bags {
        if let Some(rule_status) = rule_status {
            if draft_status < rule_status {
                findings.conflict = true;
                findings.details.push(format!(
                    "draft {bag} verdict is more permissive than the rule outcome"
                ));
            }
        }
    }

    let (carry_template, checked_template) = taxonomy.default_verdicts(draft.canonical);
    for (bag, draft_status, template_status) in [
        ("carry_on", draft.carry_on.status, carry_template.status),
        ("checked", draft.checked.status, checked_template.status),
    ] {
        if template_status == VerdictStatus::Deny && draft_status != VerdictStatus::Deny {
            findings.conflict = true;
            findings.details.push(format!(
                "draft {bag} verdict contradicts the taxonomy template"
            ));
        }
    }

    if duty_free && has_rescreening && resolution.steb_required {
        findings.conflict = true;
        findings
            .details
            .push("rescreening transfer invalidates the STEB seal".to_string());
    }

    if draft.signals.confidence < confidence_threshold {
        findings.low_confidence = true;
        findings.details.push(format!(
            "confidence {} below threshold {confidence_threshold}",
            draft.signals.confidence
        ));
    }
    if draft.signals.matched_terms.len() < MIN_MATCHED_TERMS {
        findings.low_confidence = true;
        findings
            .details
            .push("fewer than two matched terms".to_string());
    }

    findings
}
