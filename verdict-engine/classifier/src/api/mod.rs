pub mod service;
pub mod types;

pub use service::ItemClassifier;
pub use types::{ClassifyError, ClassifyRequest};
