use crate::api::types::ItemParams;
use crate::core::taxonomy::Taxonomy;
use crate::spi::types::{Canonical, ParamName};

/// Required parameters that are still unknown for this canonical.
///
/// For `required_any` families a single present member satisfies the
/// table; otherwise every listed name must be present. Anything outside
/// the risk set has no required parameters.
pub fn missing_params(
    taxonomy: &Taxonomy,
    canonical: Canonical,
    params: &ItemParams,
) -> Vec<ParamName> {
    let Some(entry) = taxonomy.entry(canonical) else {
        return Vec::new();
    };

    if entry.required_any {
        let any_present = entry.required.iter().any(|p| params.get(*p).is_some());
        if any_present {
            Vec::new()
        } else {
            entry.required.clone()
        }
    } else {
        entry
            .required
            .iter()
            .copied()
            .filter(|p| params.get(*p).is_none())
            .collect()
    }
}
