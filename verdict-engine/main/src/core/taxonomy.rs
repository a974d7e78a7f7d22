use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::spi::types::{Canonical, EngineError, ParamName, VerdictStatus};

/// Embedded taxonomy, the single source of truth shared between the
/// classifier prompt and the runtime guards.
pub const DEFAULT_TAXONOMY: &str = include_str!("../taxonomy.toml");

/// Constant per-bag default: status plus condition badges.
#[derive(Debug, Clone, PartialEq)]
pub struct VerdictTemplate {
    pub status: VerdictStatus,
    pub badges: Vec<String>,
}

impl VerdictTemplate {
    fn allow() -> Self {
        Self {
            status: VerdictStatus::Allow,
            badges: Vec::new(),
        }
    }
}

/// One risk-key record of the taxonomy.
#[derive(Debug, Clone)]
pub struct TaxonEntry {
    pub key: Canonical,
    pub family: String,
    pub required: Vec<ParamName>,
    /// When set, any one of `required` satisfies the parameter guard.
    pub required_any: bool,
    pub optional: Vec<ParamName>,
    pub carry_on: VerdictTemplate,
    pub checked: VerdictTemplate,
    pub synonyms: Vec<String>,
}

/// Closed taxonomy of risk keys: required-parameter table, default
/// verdict templates, and synonym hints.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    entries: BTreeMap<Canonical, TaxonEntry>,
}

// ---------------------------------------------------------------------------
// TOML parsing types (private)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TaxonomyToml {
    risk: Vec<RawEntry>,
}

#[derive(Deserialize)]
struct RawEntry {
    key: String,
    family: String,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    required_any: bool,
    #[serde(default)]
    optional: Vec<String>,
    carry_on: RawTemplate,
    checked: RawTemplate,
    #[serde(default)]
    synonyms: Vec<String>,
}

#[derive(Deserialize)]
struct RawTemplate {
    status: String,
    #[serde(default)]
    badges: Vec<String>,
}

fn parse_status(key: &str, s: &str) -> Result<VerdictStatus, EngineError> {
    match s {
        "allow" => Ok(VerdictStatus::Allow),
        "limit" => Ok(VerdictStatus::Limit),
        "deny" => Ok(VerdictStatus::Deny),
        other => Err(EngineError::Taxonomy(format!(
            "{key}: unknown status '{other}'"
        ))),
    }
}

fn parse_params(key: &str, names: &[String]) -> Result<Vec<ParamName>, EngineError> {
    names
        .iter()
        .map(|n| {
            ParamName::from_key(n)
                .ok_or_else(|| EngineError::Taxonomy(format!("{key}: unknown parameter '{n}'")))
        })
        .collect()
}

impl Taxonomy {
    /// Parse the embedded taxonomy.
    pub fn load_default() -> Result<Self, EngineError> {
        Self::parse(DEFAULT_TAXONOMY)
    }

    /// Parse a taxonomy from an external file (operator override).
    pub fn load_from(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, EngineError> {
        let raw: TaxonomyToml =
            toml::from_str(text).map_err(|e| EngineError::Taxonomy(e.to_string()))?;

        let mut entries = BTreeMap::new();
        for entry in raw.risk {
            let key = Canonical::from_key(&entry.key).ok_or_else(|| {
                EngineError::Taxonomy(format!("unknown canonical key '{}'", entry.key))
            })?;
            if key.is_benign() {
                return Err(EngineError::Taxonomy(
                    "benign_general cannot carry a risk entry".into(),
                ));
            }
            let parsed = TaxonEntry {
                key,
                family: entry.family,
                required: parse_params(&entry.key, &entry.required)?,
                required_any: entry.required_any,
                optional: parse_params(&entry.key, &entry.optional)?,
                carry_on: VerdictTemplate {
                    status: parse_status(&entry.key, &entry.carry_on.status)?,
                    badges: entry.carry_on.badges,
                },
                checked: VerdictTemplate {
                    status: parse_status(&entry.key, &entry.checked.status)?,
                    badges: entry.checked.badges,
                },
                synonyms: entry.synonyms,
            };
            if entries.insert(key, parsed).is_some() {
                return Err(EngineError::Taxonomy(format!(
                    "duplicate entry for '{key}'"
                )));
            }
        }

        // The closed set and the data file must cover each other exactly,
        // otherwise the prompt and the guard drift apart.
        for canonical in Canonical::ALL {
            if !canonical.is_benign() && !entries.contains_key(canonical) {
                return Err(EngineError::Taxonomy(format!(
                    "missing entry for '{canonical}'"
                )));
            }
        }

        Ok(Self { entries })
    }

    /// True when `canonical` is a member of the risk set.
    pub fn is_risk(&self, canonical: Canonical) -> bool {
        self.entries.contains_key(&canonical)
    }

    pub fn entry(&self, canonical: Canonical) -> Option<&TaxonEntry> {
        self.entries.get(&canonical)
    }

    pub fn required_params(&self, canonical: Canonical) -> &[ParamName] {
        self.entries
            .get(&canonical)
            .map(|e| e.required.as_slice())
            .unwrap_or(&[])
    }

    pub fn optional_params(&self, canonical: Canonical) -> &[ParamName] {
        self.entries
            .get(&canonical)
            .map(|e| e.optional.as_slice())
            .unwrap_or(&[])
    }

    /// Default `(carry_on, checked)` templates. Anything outside the risk
    /// set is field-safe by construction: allow on both bags, no badges.
    pub fn default_verdicts(&self, canonical: Canonical) -> (VerdictTemplate, VerdictTemplate) {
        match self.entries.get(&canonical) {
            Some(e) => (e.carry_on.clone(), e.checked.clone()),
            None => (VerdictTemplate::allow(), VerdictTemplate::allow()),
        }
    }

    /// Case-insensitive synonym scan over a free-text label.
    pub fn synonym_hint(&self, label: &str) -> Option<Canonical> {
        let lowered = label.to_lowercase();
        self.entries.values().find_map(|entry| {
            entry
                .synonyms
                .iter()
                .any(|s| lowered.contains(&s.to_lowercase()))
                .then_some(entry.key)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxonEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
