// Re-export all public types from SPI
pub use crate::spi::config::EngineConfig;
pub use crate::spi::traits::AirportDirectory;
pub use crate::spi::types::{
    BagTarget, CabinClass, Canonical, Constraints, EngineError, ParamName, RegulationFile,
    RegulationRule, RouteType, Scope, Severity, VerdictStatus,
};

// Re-export all public types from API
pub use crate::api::types::{
    BagVerdict, ClassificationDraft, EngineTrace, Flags, ItemParams, Itinerary, ModelInfo,
    PreviewState, Resolved, ResolvedVerdict, Segment, Signals,
};

// Core engine surface
pub use crate::core::airports::EmbeddedAirports;
pub use crate::core::conflict::{detect, ConflictFindings};
pub use crate::core::param_guard::missing_params;
pub use crate::core::regstore::{RegulationIndex, RegulationStore, StoredRule};
pub use crate::core::resolver::{resolve, Resolution, ResolveRequest};
pub use crate::core::schema_guard::{validate_draft, GuardViolation, MAX_MATCHED_TERMS};
pub use crate::core::taxonomy::{TaxonEntry, Taxonomy, VerdictTemplate, DEFAULT_TAXONOMY};
