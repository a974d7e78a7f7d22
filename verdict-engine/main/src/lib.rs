//! verdict-engine: the decision core of the baggage advisor.
//!
//! Given a classified item and a passenger itinerary, the engine merges
//! layered regulation rules (country security, carrier policy,
//! international dangerous goods) on top of per-category default verdict
//! templates and produces a per-bag *allow / limit / deny* decision with
//! the conditions the passenger must satisfy.
//!
//! The engine is pure CPU work: it never suspends and holds no state
//! beyond the immutable taxonomy and the atomically-swappable regulation
//! index. The LLM-facing halves of the pipeline live in the sibling
//! `verdict-engine-classifier` and `verdict-engine-narrator` crates.
//!
//! # Quick Start
//!
//! ```no_run
//! use verdict_engine::{
//!     resolve, Canonical, EmbeddedAirports, ItemParams, Itinerary,
//!     RegulationStore, ResolveRequest, Taxonomy,
//! };
//!
//! let taxonomy = Taxonomy::load_default().expect("embedded taxonomy");
//! let store = RegulationStore::open("data/regulations".as_ref()).expect("rules");
//! let itinerary = Itinerary::direct("ICN", "LAX");
//! let params = ItemParams::default();
//! let resolution = resolve(
//!     &taxonomy,
//!     &store.snapshot(),
//!     &EmbeddedAirports::new(),
//!     &ResolveRequest {
//!         canonical: Canonical::AerosolToiletry,
//!         params: &params,
//!         itinerary: &itinerary,
//!         segments: &[],
//!         duty_free: false,
//!     },
//! );
//! println!("{:?}", resolution.resolved.carry_on.status);
//! ```

/// Service Provider Interface: configuration, capability traits, shared vocabulary.
pub mod spi;
/// Application Programming Interface: request and result types.
pub mod api;
mod core;
mod saf;

pub use saf::*;
