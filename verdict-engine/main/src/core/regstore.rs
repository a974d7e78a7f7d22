use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::spi::types::{
    BagTarget, CabinClass, Canonical, EngineError, RegulationFile, RegulationRule, RouteType,
    Scope,
};

/// One indexed rule with its stable identifier.
#[derive(Debug, Clone)]
pub struct StoredRule {
    /// `scope:code:item_category#n`, with `-` for the empty international code.
    pub id: String,
    pub scope: Scope,
    pub code: String,
    pub rule: RegulationRule,
}

/// Immutable index over every loaded regulation record.
///
/// Built once from the data directory and served behind an atomic
/// pointer swap; readers never observe a partially-built index.
#[derive(Debug, Default)]
pub struct RegulationIndex {
    by_key: HashMap<(Scope, String, Canonical), Vec<Arc<StoredRule>>>,
    by_scope: HashMap<(Scope, String), Vec<Arc<StoredRule>>>,
    rule_count: usize,
    file_count: usize,
}

// Identity of a rule under its lookup key: the three condition fields
// plus the bag it targets. Two records may share a key only when this
// vector distinguishes them.
type ConditionVector = (
    Option<RouteType>,
    Option<CabinClass>,
    Option<String>,
    BagTarget,
);

impl RegulationIndex {
    /// Load and validate every `*.json` file under `dir`.
    ///
    /// Files are visited in name order so identifiers are stable across
    /// loads of the same data.
    pub fn load_dir(dir: &Path) -> Result<Self, EngineError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut index = RegulationIndex::default();
        let mut seen: HashMap<(Scope, String, Canonical), HashSet<ConditionVector>> =
            HashMap::new();
        for path in &paths {
            let text = std::fs::read_to_string(path)?;
            let file: RegulationFile =
                serde_json::from_str(&text).map_err(|e| EngineError::Data {
                    path: path.display().to_string(),
                    detail: e.to_string(),
                })?;
            index.add_file(&path.display().to_string(), file, &mut seen)?;
        }
        tracing::info!(
            files = index.file_count,
            rules = index.rule_count,
            "loaded regulation index"
        );
        Ok(index)
    }

    fn add_file(
        &mut self,
        path: &str,
        file: RegulationFile,
        seen: &mut HashMap<(Scope, String, Canonical), HashSet<ConditionVector>>,
    ) -> Result<(), EngineError> {
        if file.rules.is_empty() {
            return Err(EngineError::Data {
                path: path.to_string(),
                detail: "empty rules array".into(),
            });
        }
        match file.scope {
            Scope::International => {
                if !file.code.is_empty() {
                    return Err(EngineError::Data {
                        path: path.to_string(),
                        detail: "international scope must not carry a code".into(),
                    });
                }
            }
            Scope::Airline | Scope::Country => {
                // Two-character IATA carrier codes may contain digits
                // ("7C"); ISO country codes are letters only, but the
                // shared check stays permissive.
                if file.code.len() != 2
                    || !file
                        .code
                        .chars()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
                {
                    return Err(EngineError::Data {
                        path: path.to_string(),
                        detail: format!("invalid {} code '{}'", file.scope.as_str(), file.code),
                    });
                }
            }
        }

        for (index, rule) in file.rules.into_iter().enumerate() {
            let vector = (
                rule.constraints.route_type,
                rule.constraints.cabin_class,
                rule.constraints.fare_class.clone(),
                rule.constraints.applies_to(),
            );
            // The condition vector is part of a rule's identity: two
            // records under the same key must differ in at least one
            // condition field, across files included.
            let key = (file.scope, file.code.clone(), rule.item_category);
            if !seen.entry(key).or_default().insert(vector) {
                return Err(EngineError::DuplicateRule {
                    path: path.to_string(),
                    index,
                });
            }

            let n = self
                .by_key
                .get(&(file.scope, file.code.clone(), rule.item_category))
                .map(Vec::len)
                .unwrap_or(0);
            let code_part = if file.code.is_empty() { "-" } else { &file.code };
            let stored = Arc::new(StoredRule {
                id: format!(
                    "{}:{}:{}#{}",
                    file.scope.as_str(),
                    code_part,
                    rule.item_category,
                    n
                ),
                scope: file.scope,
                code: file.code.clone(),
                rule,
            });

            self.by_key
                .entry((stored.scope, stored.code.clone(), stored.rule.item_category))
                .or_default()
                .push(stored.clone());
            self.by_scope
                .entry((stored.scope, stored.code.clone()))
                .or_default()
                .push(stored);
            self.rule_count += 1;
        }
        self.file_count += 1;
        Ok(())
    }

    /// All records (conditional variants included) for a lookup key.
    pub fn find(&self, scope: Scope, code: &str, canonical: Canonical) -> &[Arc<StoredRule>] {
        self.by_key
            .get(&(scope, code.to_string(), canonical))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every record registered under a scope+code.
    pub fn scope_rules(&self, scope: Scope, code: &str) -> &[Arc<StoredRule>] {
        self.by_scope
            .get(&(scope, code.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }
}

/// Shared handle over the current regulation index.
///
/// `reload` swaps the whole index pointer atomically; previews that
/// already took a snapshot keep resolving against the index they
/// started with.
pub struct RegulationStore {
    dir: PathBuf,
    index: RwLock<Arc<RegulationIndex>>,
}

impl RegulationStore {
    /// Build the store from a data directory.
    pub fn open(dir: &Path) -> Result<Self, EngineError> {
        let index = RegulationIndex::load_dir(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            index: RwLock::new(Arc::new(index)),
        })
    }

    /// The current index. Cheap; clones an `Arc`.
    pub fn snapshot(&self) -> Arc<RegulationIndex> {
        self.index.read().expect("regulation index lock").clone()
    }

    /// Rebuild from disk and atomically replace the index. On failure the
    /// previous index stays in service.
    pub fn reload(&self) -> Result<(usize, usize), EngineError> {
        let fresh = RegulationIndex::load_dir(&self.dir)?;
        let counts = (fresh.file_count, fresh.rule_count);
        *self.index.write().expect("regulation index lock") = Arc::new(fresh);
        tracing::info!(files = counts.0, rules = counts.1, "regulation index reloaded");
        Ok(counts)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
