pub mod config;
pub mod traits;
pub mod types;

pub use config::EngineConfig;
pub use traits::AirportDirectory;
pub use types::*;
