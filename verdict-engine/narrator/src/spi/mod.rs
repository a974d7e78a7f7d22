pub mod config;

pub use config::NarratorConfig;
