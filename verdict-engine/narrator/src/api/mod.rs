pub mod service;
pub mod types;

pub use service::DecisionNarrator;
pub use types::{NarrateError, Narration, NarrationInput};
