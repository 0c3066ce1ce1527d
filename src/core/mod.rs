pub mod config;
pub mod error;
pub mod types;

pub use config::GameConfig;
pub use error::{ConquestError, Result, UpstreamError};
pub use types::{canonical_name, NationId, TerritoryId, Year};
