use std::path::{Path, PathBuf};
use std::sync::Arc;

use llm_gateway::ScriptedLlm;
use verdict_engine::{
    CabinClass, EmbeddedAirports, EngineConfig, Itinerary, RegulationStore, Segment, Taxonomy,
};
use verdict_engine_classifier::{ClassifierConfig, ItemClassifier};
use verdict_engine_narrator::{DecisionNarrator, NarratorConfig};
use verdict_engine_preview::{PreviewConfig, PreviewRequest, PreviewService};

pub fn shipped_regulations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/regulations")
}

/// Build the full pipeline against the shipped data with a scripted model.
pub fn service(llm: ScriptedLlm, with_narrator: bool) -> (PreviewService, Arc<ScriptedLlm>) {
    service_with_review_list(llm, with_narrator, Vec::new())
}

pub fn service_with_review_list(
    llm: ScriptedLlm,
    with_narrator: bool,
    always_review: Vec<String>,
) -> (PreviewService, Arc<ScriptedLlm>) {
    let llm = Arc::new(llm);
    let taxonomy = Arc::new(Taxonomy::load_default().unwrap());
    let store = Arc::new(RegulationStore::open(&shipped_regulations_dir()).unwrap());

    let classifier = ItemClassifier::new(
        llm.clone(),
        taxonomy.clone(),
        ClassifierConfig {
            model: "scripted".into(),
            max_tokens: 1024,
            draft_cache_ttl_secs: 600,
        },
    );
    let narrator = with_narrator.then(|| {
        DecisionNarrator::new(
            llm.clone(),
            NarratorConfig {
                enabled: true,
                model: "scripted".into(),
                max_tokens: 512,
                timeout_secs: 5,
            },
        )
    });

    let engine_config = EngineConfig {
        regulations_dir: shipped_regulations_dir(),
        taxonomy_path: None,
        confidence_threshold: 0.6,
        always_review,
    };

    let service = PreviewService::new(
        classifier,
        narrator,
        taxonomy,
        store,
        Arc::new(EmbeddedAirports::new()),
        engine_config,
        PreviewConfig { cache_ttl_secs: 120 },
    );
    (service, llm)
}

/// Scripted classifier reply with the given canonical, params, and drafts.
pub fn draft_body(
    canonical: &str,
    params: serde_json::Value,
    carry_status: &str,
    checked_status: &str,
    terms: &[&str],
    confidence: f64,
) -> String {
    serde_json::json!({
        "canonical": canonical,
        "params": params,
        "carry_on": { "status": carry_status, "badges": [] },
        "checked": { "status": checked_status, "badges": [] },
        "needs_review": false,
        "signals": { "matched_terms": terms, "confidence": confidence },
        "model_info": { "name": "scripted", "temperature": 0.0 }
    })
    .to_string()
}

pub fn request(label: &str, origin: &str, via: &[&str], destination: &str) -> PreviewRequest {
    PreviewRequest {
        label: label.into(),
        locale: Some("en".into()),
        req_id: None,
        itinerary: Itinerary {
            origin: origin.into(),
            via: via.iter().map(|s| s.to_string()).collect(),
            destination: destination.into(),
            has_rescreening: !via.is_empty(),
        },
        segments: vec![],
        item_params: None,
        duty_free: false,
    }
}

pub fn segment(carrier: &str, cabin: CabinClass) -> Segment {
    Segment {
        carrier: carrier.into(),
        cabin_class: cabin,
        fare_class: None,
    }
}
