//! Narration adapter: rewrites a resolved decision into user-facing
//! bullets with a second model call.
//!
//! Strictly non-authoritative. The model only paraphrases fields that
//! are already present; a reply that introduces a new numeric value or
//! breaks the bullet bounds is discarded and the preview ships with an
//! empty narration block.

pub mod api;
pub mod core;
pub mod spi;

pub use api::{DecisionNarrator, NarrateError, Narration, NarrationInput};
pub use spi::NarratorConfig;
