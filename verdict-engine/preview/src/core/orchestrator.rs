use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use preview_cache::TtlCache;
use verdict_engine::{
    detect, missing_params, resolve, AirportDirectory, Canonical, ClassificationDraft,
    EngineConfig, EngineError, EngineTrace, Flags, ItemParams, PreviewState, RegulationStore,
    Resolved, ResolvedVerdict, ResolveRequest, Taxonomy, VerdictStatus,
};
use verdict_engine_classifier::{ClassifyError, ClassifyRequest, ItemClassifier};
use verdict_engine_narrator::{DecisionNarrator, Narration, NarrationInput};

use crate::api::types::{PreviewOutcome, PreviewRequest, PreviewResponse};
use crate::spi::PreviewConfig;

const MANUAL_REVIEW_BADGE: &str = "manual review required";

/// Drives the preview pipeline and owns the preview cache.
///
/// All pipeline failures surface through `flags`; `preview` itself never
/// fails. Nothing downstream of the resolver can change a `deny`.
pub struct PreviewService {
    classifier: ItemClassifier,
    narrator: Option<DecisionNarrator>,
    taxonomy: Arc<Taxonomy>,
    store: Arc<RegulationStore>,
    airports: Arc<dyn AirportDirectory>,
    engine_config: EngineConfig,
    cache: TtlCache<PreviewOutcome>,
}

impl PreviewService {
    pub fn new(
        classifier: ItemClassifier,
        narrator: Option<DecisionNarrator>,
        taxonomy: Arc<Taxonomy>,
        store: Arc<RegulationStore>,
        airports: Arc<dyn AirportDirectory>,
        engine_config: EngineConfig,
        config: PreviewConfig,
    ) -> Self {
        Self {
            classifier,
            narrator,
            taxonomy,
            store,
            airports,
            engine_config,
            cache: TtlCache::new(Duration::from_secs(config.cache_ttl_secs)),
        }
    }

    /// Produce a preview for one item and itinerary.
    ///
    /// Identical requests within the cache TTL share one in-flight
    /// computation and return byte-identical resolved verdicts and
    /// applied-rule traces; only `req_id` differs per caller.
    pub async fn preview(&self, req: &PreviewRequest) -> PreviewResponse {
        let key = self.fingerprint(req);
        let outcome = match self
            .cache
            .get_or_try_compute(&key, || async {
                Ok::<_, Infallible>(self.run_pipeline(req).await)
            })
            .await
        {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        };

        let req_id = req
            .req_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        PreviewResponse::from_outcome(req_id, outcome)
    }

    /// Rebuild the regulation index from disk (operator signal).
    pub fn reload_rules(&self) -> Result<(usize, usize), EngineError> {
        self.cache.clear();
        self.store.reload()
    }

    async fn run_pipeline(&self, req: &PreviewRequest) -> PreviewOutcome {
        let mut flags = Flags::default();

        let classify_req = ClassifyRequest {
            label: req.label.clone(),
            locale: req.locale.clone(),
            itinerary: req.itinerary.clone(),
            segments: req.segments.clone(),
            item_params_hint: req.item_params,
        };

        let draft = match self.classifier.classify(&classify_req).await {
            Ok(draft) => draft,
            Err(ClassifyError::Unavailable(detail)) => {
                flags.llm_error = true;
                flags.details.push(detail);
                return self.fallback_outcome(req, flags, "fallback:llm_error");
            }
            Err(ClassifyError::Invalid {
                field,
                detail,
                canonical,
            }) => {
                flags.validation_error = true;
                flags.offending_field = Some(field.clone());
                flags.details.push(format!("{field}: {detail}"));
                match canonical {
                    // Canonical was recoverable: fall back to its
                    // taxonomy defaults, skipping rule resolution.
                    Some(canonical) => {
                        return self.template_outcome(req, canonical, flags);
                    }
                    None => {
                        return self
                            .fallback_outcome(req, flags, "fallback:validation_error");
                    }
                }
            }
        };

        let params = merge_params(draft.params, req.item_params);
        let missing = missing_params(&self.taxonomy, draft.canonical, &params);
        if !missing.is_empty() {
            flags.missing_params = missing;
        }

        let index = self.store.snapshot();
        let resolution = resolve(
            &self.taxonomy,
            &index,
            self.airports.as_ref(),
            &ResolveRequest {
                canonical: draft.canonical,
                params: &params,
                itinerary: &req.itinerary,
                segments: &req.segments,
                duty_free: req.duty_free,
            },
        );

        let findings = detect(
            &self.taxonomy,
            &draft,
            &resolution,
            self.engine_config.confidence_threshold,
            req.itinerary.has_rescreening,
            req.duty_free,
        );
        flags.conflict = findings.conflict;
        flags.low_confidence = findings.low_confidence;
        flags.details.extend(findings.details);

        self.apply_override(draft.canonical, &mut flags);

        let state = final_state(&flags, &resolution.resolved);
        let narration = self
            .narrate(req, &draft, &params, state, &resolution)
            .await;

        PreviewOutcome {
            state,
            resolved: resolution.resolved,
            engine: resolution.trace,
            narration,
            flags,
        }
    }

    /// Taxonomy-defaults outcome for a recoverable canonical.
    fn template_outcome(
        &self,
        req: &PreviewRequest,
        canonical: Canonical,
        mut flags: Flags,
    ) -> PreviewOutcome {
        let (carry, checked) = self.taxonomy.default_verdicts(canonical);
        let template = format!("taxonomy:{canonical}");
        let params = req.item_params.unwrap_or_default();
        let resolved = Resolved {
            carry_on: ResolvedVerdict {
                status: carry.status,
                badges: carry.badges,
                reason_codes: vec![template.clone()],
            },
            checked: ResolvedVerdict {
                status: checked.status,
                badges: checked.badges,
                reason_codes: vec![template.clone()],
            },
        };
        let missing = missing_params(&self.taxonomy, canonical, &params);
        if !missing.is_empty() {
            flags.missing_params = missing;
        }

        PreviewOutcome {
            state: PreviewState::NeedsReview,
            resolved,
            engine: EngineTrace {
                canonical,
                params,
                template,
                applied_rules: Vec::new(),
                layers: Vec::new(),
            },
            narration: Narration::default(),
            flags,
        }
    }

    /// Safe outcome when no canonical is available at all: both bags
    /// `limit` with a manual-review badge.
    fn fallback_outcome(
        &self,
        req: &PreviewRequest,
        flags: Flags,
        template: &str,
    ) -> PreviewOutcome {
        let verdict = ResolvedVerdict {
            status: VerdictStatus::Limit,
            badges: vec![MANUAL_REVIEW_BADGE.to_string()],
            reason_codes: vec![template.to_string()],
        };
        PreviewOutcome {
            state: PreviewState::NeedsReview,
            resolved: Resolved {
                carry_on: verdict.clone(),
                checked: verdict,
            },
            engine: EngineTrace {
                canonical: Canonical::BenignGeneral,
                params: req.item_params.unwrap_or_default(),
                template: template.to_string(),
                applied_rules: Vec::new(),
                layers: Vec::new(),
            },
            narration: Narration::default(),
            flags,
        }
    }

    fn apply_override(&self, canonical: Canonical, flags: &mut Flags) {
        if self
            .engine_config
            .always_review
            .iter()
            .any(|k| k == canonical.as_str())
        {
            flags.override_review = true;
            flags
                .details
                .push(format!("operator policy forces review for {canonical}"));
        }
    }

    async fn narrate(
        &self,
        req: &PreviewRequest,
        draft: &ClassificationDraft,
        params: &ItemParams,
        state: PreviewState,
        resolution: &verdict_engine::Resolution,
    ) -> Narration {
        let Some(narrator) = &self.narrator else {
            return Narration::default();
        };
        let input = NarrationInput {
            label: req.label.clone(),
            canonical: draft.canonical,
            params: *params,
            state,
            resolved: resolution.resolved.clone(),
            sources: resolution.trace.applied_rules.clone(),
        };
        match narrator.narrate(&input).await {
            Ok(narration) => narration,
            Err(err) => {
                // The decision is already authoritative without it.
                tracing::warn!(error = %err, "narration discarded");
                Narration::default()
            }
        }
    }

    /// Fingerprint over everything that influences the decision. The
    /// request id is deliberately excluded.
    fn fingerprint(&self, req: &PreviewRequest) -> String {
        preview_cache::fingerprint(&[
            &req.label,
            req.locale.as_deref().unwrap_or(""),
            &serde_json::to_string(&req.itinerary).unwrap_or_default(),
            &serde_json::to_string(&req.segments).unwrap_or_default(),
            &serde_json::to_string(&req.item_params).unwrap_or_default(),
            if req.duty_free { "duty_free" } else { "" },
        ])
    }
}

/// State is `complete` only when nothing demands a human: no flag set
/// and neither bag resolved to `deny`.
fn final_state(flags: &Flags, resolved: &Resolved) -> PreviewState {
    if flags.any()
        || resolved.carry_on.status == VerdictStatus::Deny
        || resolved.checked.status == VerdictStatus::Deny
    {
        PreviewState::NeedsReview
    } else {
        PreviewState::Complete
    }
}

/// Draft parameters win; caller-supplied hints fill the holes the model
/// left. No inference happens here.
fn merge_params(draft: ItemParams, hint: Option<ItemParams>) -> ItemParams {
    let Some(hint) = hint else { return draft };
    ItemParams {
        volume_ml: draft.volume_ml.or(hint.volume_ml),
        wh: draft.wh.or(hint.wh),
        count: draft.count.or(hint.count),
        weight_kg: draft.weight_kg.or(hint.weight_kg),
        abv_percent: draft.abv_percent.or(hint.abv_percent),
        blade_length_cm: draft.blade_length_cm.or(hint.blade_length_cm),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_fill_only_the_holes() {
        let draft = ItemParams {
            volume_ml: Some(700.0),
            ..Default::default()
        };
        let hint = ItemParams {
            volume_ml: Some(500.0),
            abv_percent: Some(40.0),
            ..Default::default()
        };
        let merged = merge_params(draft, Some(hint));
        assert_eq!(merged.volume_ml, Some(700.0));
        assert_eq!(merged.abv_percent, Some(40.0));
    }

    #[test]
    fn deny_always_forces_review() {
        let verdict = ResolvedVerdict {
            status: VerdictStatus::Deny,
            badges: vec![],
            reason_codes: vec![],
        };
        let resolved = Resolved {
            carry_on: verdict.clone(),
            checked: ResolvedVerdict {
                status: VerdictStatus::Allow,
                badges: vec![],
                reason_codes: vec![],
            },
        };
        assert_eq!(
            final_state(&Flags::default(), &resolved),
            PreviewState::NeedsReview
        );
    }
}
