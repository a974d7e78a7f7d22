use serde_json::json;

use verdict_engine::Taxonomy;

use crate::api::types::ClassifyRequest;

/// Render the system prompt from the taxonomy.
///
/// The closed set, the required-parameter table, and the conservative
/// default verdicts all come from the same data file the runtime guard
/// reads, so prompt and guard cannot drift apart.
pub fn system_prompt(taxonomy: &Taxonomy) -> String {
    let mut catalog = String::new();
    for entry in taxonomy.iter() {
        let required: Vec<&str> = entry.required.iter().map(|p| p.as_str()).collect();
        let required = if required.is_empty() {
            "none".to_string()
        } else if entry.required_any {
            format!("at least one of {}", required.join(", "))
        } else {
            required.join(", ")
        };
        catalog.push_str(&format!(
            "- {} (family: {}; required params: {}; defaults: carry_on={}, checked={})\n",
            entry.key,
            entry.family,
            required,
            entry.carry_on.status.as_str(),
            entry.checked.status.as_str(),
        ));
    }

    format!(
        "You classify an air-travel item label into a closed risk taxonomy and \
extract quantitative parameters for a baggage advisor.\n\
\n\
Rules:\n\
1. Choose `canonical` from the closed set below, or `benign_general` when the \
item carries no travel risk. Never invent a new key.\n\
2. Never invent numeric values. A parameter not stated in the label or in \
`item_params_hint` is null.\n\
3. `matched_terms` must be 2 to 4 verbatim substrings copied from the label.\n\
4. `confidence` is a number in [0, 1].\n\
5. Draft verdicts are conservative: start from the listed defaults (aerosols \
and liquids default to limit in the cabin, spare batteries are cabin-only) and \
only tighten, never relax.\n\
6. Respond with a single JSON object, no prose, exactly this shape:\n\
{{\"canonical\": string, \"params\": {{\"volume_ml\": number|null, \"wh\": number|null, \
\"count\": number|null, \"weight_kg\": number|null, \"abv_percent\": number|null, \
\"blade_length_cm\": number|null}}, \"carry_on\": {{\"status\": \
\"allow\"|\"limit\"|\"deny\", \"badges\": [string]}}, \"checked\": {{\"status\": \
\"allow\"|\"limit\"|\"deny\", \"badges\": [string]}}, \"needs_review\": boolean, \
\"signals\": {{\"matched_terms\": [string], \"confidence\": number, \"notes\": \
string|null}}, \"model_info\": {{\"name\": string, \"temperature\": number}}}}\n\
\n\
Closed set:\n{catalog}"
    )
}

/// Render the user payload for one request.
pub fn user_payload(taxonomy: &Taxonomy, req: &ClassifyRequest) -> String {
    let hint = taxonomy.synonym_hint(&req.label).map(|c| c.as_str());
    json!({
        "label": req.label,
        "locale": req.locale,
        "itinerary": req.itinerary,
        "segments": req.segments,
        "item_params_hint": req.item_params_hint,
        "canonical_hint": hint,
    })
    .to_string()
}
