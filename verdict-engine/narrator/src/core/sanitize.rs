use std::collections::HashSet;

use regex::Regex;

use crate::api::types::NarrationInput;

/// Numeric tokens allowed to appear in narration text: everything the
/// resolved decision and the original label already contain.
pub fn allowed_numbers(input: &NarrationInput) -> HashSet<String> {
    let mut corpus = String::new();
    corpus.push_str(&input.label);
    for verdict in [&input.resolved.carry_on, &input.resolved.checked] {
        for badge in &verdict.badges {
            corpus.push(' ');
            corpus.push_str(badge);
        }
    }
    if let Ok(params) = serde_json::to_string(&input.params) {
        corpus.push(' ');
        corpus.push_str(&params);
    }
    number_tokens(&corpus)
}

/// Every numeric token in `text`, both as written and with a trailing
/// `.0` stripped so `160` and `160.0` count as the same number.
pub fn number_tokens(text: &str) -> HashSet<String> {
    let pattern = Regex::new(r"\d+(?:\.\d+)?").expect("static pattern");
    let mut tokens = HashSet::new();
    for m in pattern.find_iter(text) {
        let token = m.as_str().to_string();
        if let Some(stripped) = token.strip_suffix(".0") {
            tokens.insert(stripped.to_string());
        }
        tokens.insert(token);
    }
    tokens
}

/// Check that `text` introduces no numeric token outside `allowed`.
pub fn find_novel_number(text: &str, allowed: &HashSet<String>) -> Option<String> {
    number_tokens(text)
        .into_iter()
        .find(|token| !allowed.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_cover_decimals_and_integers() {
        let tokens = number_tokens("≤2.5 kg and 160 Wh");
        assert!(tokens.contains("2.5"));
        assert!(tokens.contains("160"));
    }

    #[test]
    fn trailing_point_zero_is_normalized() {
        let tokens = number_tokens("350.0 ml");
        assert!(tokens.contains("350"));
        assert!(tokens.contains("350.0"));
    }

    #[test]
    fn novel_number_is_caught() {
        let allowed = number_tokens("≤500 ml per container");
        assert_eq!(find_novel_number("limit is 500 ml", &allowed), None);
        assert!(find_novel_number("limit is 750 ml", &allowed).is_some());
    }
}
