use std::sync::Arc;
use std::time::Duration;

use llm_gateway::{CompletionBuilder, LlmService};
use preview_cache::TtlCache;
use verdict_engine::{validate_draft, ClassificationDraft, Taxonomy};

use crate::api::types::{ClassifyError, ClassifyRequest};
use crate::core::prompt;
use crate::spi::ClassifierConfig;

/// The LLM classifier: one strict-JSON model call per uncached request.
///
/// Validated drafts are cached by request fingerprint; the cache never
/// holds raw model bytes. There is no retry inside a single request —
/// the caller observes exactly one attempt.
pub struct ItemClassifier {
    llm: Arc<dyn LlmService>,
    taxonomy: Arc<Taxonomy>,
    config: ClassifierConfig,
    cache: TtlCache<ClassificationDraft>,
}

impl ItemClassifier {
    pub fn new(llm: Arc<dyn LlmService>, taxonomy: Arc<Taxonomy>, config: ClassifierConfig) -> Self {
        let cache = TtlCache::new(Duration::from_secs(config.draft_cache_ttl_secs));
        Self {
            llm,
            taxonomy,
            config,
            cache,
        }
    }

    /// Classify a free-text label for the given itinerary.
    pub async fn classify(
        &self,
        req: &ClassifyRequest,
    ) -> Result<ClassificationDraft, ClassifyError> {
        let key = self.fingerprint(req);
        if let Some(draft) = self.cache.get(&key) {
            tracing::debug!(label = %req.label, "draft cache hit");
            return Ok(draft);
        }

        let response = CompletionBuilder::new(&self.config.model)
            .system(&prompt::system_prompt(&self.taxonomy))
            .user(&prompt::user_payload(&self.taxonomy, req))
            .max_tokens(self.config.max_tokens)
            .json_only()
            .execute(&*self.llm)
            .await
            .map_err(|e| {
                tracing::warn!(label = %req.label, error = %e, "classification call failed");
                ClassifyError::Unavailable(e.to_string())
            })?;

        let raw: serde_json::Value = serde_json::from_str(&response.content)
            .map_err(|e| ClassifyError::Unavailable(format!("non-JSON body: {e}")))?;

        let draft = validate_draft(&self.taxonomy, &raw, &req.label).map_err(|v| {
            tracing::warn!(label = %req.label, field = %v.field, "draft failed schema guard");
            ClassifyError::Invalid {
                field: v.field,
                detail: v.detail,
                canonical: v.canonical,
            }
        })?;

        self.cache.insert(&key, draft.clone());
        Ok(draft)
    }

    /// `sha256(label ‖ locale ‖ itinerary ‖ segments ‖ hints)` over the
    /// canonical JSON rendering of each part.
    fn fingerprint(&self, req: &ClassifyRequest) -> String {
        preview_cache::fingerprint(&[
            &req.label,
            req.locale.as_deref().unwrap_or(""),
            &serde_json::to_string(&req.itinerary).unwrap_or_default(),
            &serde_json::to_string(&req.segments).unwrap_or_default(),
            &serde_json::to_string(&req.item_params_hint).unwrap_or_default(),
        ])
    }
}
