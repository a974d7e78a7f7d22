use std::sync::Arc;
use std::time::Duration;

use llm_gateway::{CompletionBuilder, LlmService};
use serde::Deserialize;

use crate::api::types::{NarrateError, Narration, NarrationInput};
use crate::core::{prompt, sanitize};
use crate::spi::NarratorConfig;

#[derive(Deserialize)]
struct RawNarration {
    title: String,
    carry_on_reason: String,
    checked_reason: String,
    bullets: Vec<String>,
    #[serde(default)]
    footnote: Option<String>,
}

/// Second model call that rewrites the resolved decision for the UI.
pub struct DecisionNarrator {
    llm: Arc<dyn LlmService>,
    config: NarratorConfig,
}

impl DecisionNarrator {
    pub fn new(llm: Arc<dyn LlmService>, config: NarratorConfig) -> Self {
        Self { llm, config }
    }

    /// Narrate a resolved decision.
    ///
    /// The reply may only paraphrase: a new numeric value, a missing
    /// field, or bullet counts outside 2..=4 all discard the narration.
    /// Callers treat any error as "ship with an empty narration block".
    pub async fn narrate(&self, input: &NarrationInput) -> Result<Narration, NarrateError> {
        let call = CompletionBuilder::new(&self.config.model)
            .system(&prompt::system_prompt())
            .user(&prompt::user_payload(input))
            .max_tokens(self.config.max_tokens)
            .json_only()
            .execute(&*self.llm);

        let response = tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), call)
            .await
            .map_err(|_| {
                NarrateError::Unavailable(format!(
                    "narration timed out after {} s",
                    self.config.timeout_secs
                ))
            })?
            .map_err(|e| NarrateError::Unavailable(e.to_string()))?;

        let raw: RawNarration = serde_json::from_str(&response.content)
            .map_err(|e| NarrateError::Contract(format!("malformed reply: {e}")))?;

        if !(2..=4).contains(&raw.bullets.len()) {
            return Err(NarrateError::Contract(format!(
                "{} bullets outside 2..=4",
                raw.bullets.len()
            )));
        }

        let allowed = sanitize::allowed_numbers(input);
        for text in std::iter::once(&raw.title)
            .chain([&raw.carry_on_reason, &raw.checked_reason])
            .chain(raw.bullets.iter())
            .chain(raw.footnote.iter())
        {
            if let Some(novel) = sanitize::find_novel_number(text, &allowed) {
                return Err(NarrateError::Contract(format!(
                    "introduced numeric value '{novel}'"
                )));
            }
        }

        // Badges and sources come from the resolved decision itself.
        let mut badges = input.resolved.carry_on.badges.clone();
        for badge in &input.resolved.checked.badges {
            if !badges.contains(badge) {
                badges.push(badge.clone());
            }
        }

        Ok(Narration {
            title: raw.title,
            carry_on_reason: raw.carry_on_reason,
            checked_reason: raw.checked_reason,
            bullets: raw.bullets,
            badges,
            footnote: raw.footnote,
            sources: input.sources.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_gateway::ScriptedLlm;
    use verdict_engine::{
        Canonical, ItemParams, PreviewState, Resolved, ResolvedVerdict, VerdictStatus,
    };

    fn input() -> NarrationInput {
        NarrationInput {
            label: "hair spray 350ml".into(),
            canonical: Canonical::AerosolToiletry,
            params: ItemParams {
                volume_ml: Some(350.0),
                ..Default::default()
            },
            state: PreviewState::Complete,
            resolved: Resolved {
                carry_on: ResolvedVerdict {
                    status: VerdictStatus::Limit,
                    badges: vec!["≤500 ml per container, 2 L total".into()],
                    reason_codes: vec!["country:KR:aerosol_toiletry#0".into()],
                },
                checked: ResolvedVerdict {
                    status: VerdictStatus::Allow,
                    badges: vec!["release valve protected".into()],
                    reason_codes: vec!["taxonomy:aerosol_toiletry".into()],
                },
            },
            sources: vec!["country:KR:aerosol_toiletry#0".into()],
        }
    }

    fn narrator(llm: ScriptedLlm) -> DecisionNarrator {
        DecisionNarrator::new(
            Arc::new(llm),
            NarratorConfig {
                enabled: true,
                model: "scripted".into(),
                max_tokens: 512,
                timeout_secs: 5,
            },
        )
    }

    #[tokio::test]
    async fn well_formed_reply_is_accepted() {
        let body = r#"{
            "title": "Aerosol toiletry",
            "carry_on_reason": "Allowed in the cabin within aerosol limits.",
            "checked_reason": "Fine in checked baggage with the valve protected.",
            "bullets": ["Keep containers at 500 ml or less", "Protect the release valve"],
            "footnote": null
        }"#;
        let narration = narrator(ScriptedLlm::new().reply(body))
            .narrate(&input())
            .await
            .unwrap();
        assert_eq!(narration.title, "Aerosol toiletry");
        assert_eq!(narration.bullets.len(), 2);
        assert_eq!(narration.sources, vec!["country:KR:aerosol_toiletry#0"]);
        assert!(narration.badges.iter().any(|b| b.contains("500 ml")));
    }

    #[tokio::test]
    async fn novel_number_discards_the_narration() {
        let body = r#"{
            "title": "Aerosol toiletry",
            "carry_on_reason": "Allowed up to 750 ml.",
            "checked_reason": "Fine in checked baggage.",
            "bullets": ["Keep containers small", "Protect the valve"],
            "footnote": null
        }"#;
        let err = narrator(ScriptedLlm::new().reply(body))
            .narrate(&input())
            .await
            .unwrap_err();
        assert!(matches!(err, NarrateError::Contract(_)), "{err}");
    }

    #[tokio::test]
    async fn bullet_bounds_are_enforced() {
        let body = r#"{
            "title": "Aerosol toiletry",
            "carry_on_reason": "ok",
            "checked_reason": "ok",
            "bullets": ["only one"],
            "footnote": null
        }"#;
        let err = narrator(ScriptedLlm::new().reply(body))
            .narrate(&input())
            .await
            .unwrap_err();
        assert!(matches!(err, NarrateError::Contract(_)));
    }

    #[tokio::test]
    async fn transport_failure_is_unavailable() {
        let err = narrator(ScriptedLlm::new())
            .narrate(&input())
            .await
            .unwrap_err();
        assert!(matches!(err, NarrateError::Unavailable(_)));
    }
}
