//! Preview orchestrator: drives classify → guard → resolve → reconcile
//! → narrate for one item and itinerary, with fingerprint caching and
//! single-flight sharing of concurrent identical requests.

pub mod api;
pub mod core;
pub mod spi;
mod saf;

pub use saf::*;
