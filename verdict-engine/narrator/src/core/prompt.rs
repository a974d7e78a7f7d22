use serde_json::json;

use crate::api::types::NarrationInput;

pub fn system_prompt() -> String {
    "You turn a resolved baggage decision into short user-facing text.\n\
\n\
Rules:\n\
1. Only paraphrase what is in the input. Never introduce a number that is \
not already present, never change a verdict, never add a condition.\n\
2. Respond with a single JSON object, no prose:\n\
{\"title\": string, \"carry_on_reason\": string, \"checked_reason\": string, \
\"bullets\": [string], \"footnote\": string|null}\n\
3. `title` names the item family in plain words. Each reason is one short \
sentence for that bag. 2 to 4 bullets covering the conditions the passenger \
must satisfy. `footnote` is optional fine print.\n"
        .to_string()
}

pub fn user_payload(input: &NarrationInput) -> String {
    json!({
        "label": input.label,
        "canonical": input.canonical,
        "params": input.params,
        "state": input.state,
        "carry_on": input.resolved.carry_on,
        "checked": input.resolved.checked,
    })
    .to_string()
}
