use thiserror::Error;

use crate::core::types::{NationId, TerritoryId};

/// Why the upstream nation service could not answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("unexpected status code {0}")]
    Status(u16),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed nation document: {0}")]
    Malformed(String),

    #[error("requested {requested} but upstream returned {returned}")]
    IdentityMismatch { requested: NationId, returned: NationId },
}

#[derive(Error, Debug)]
pub enum ConquestError {
    #[error("Nation not found: {0}")]
    NationNotFound(NationId),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] UpstreamError),

    #[error("Unknown territory: {0}")]
    UnknownTerritory(TerritoryId),

    #[error("No nation resides in {0}")]
    NoResident(TerritoryId),

    #[error("{0} can't attack itself")]
    SelfAttack(NationId),

    #[error("There is already a war at {0}")]
    WarAlreadyOngoing(TerritoryId),

    #[error("{territory} is already held by {resident}")]
    AlreadyOccupied {
        territory: TerritoryId,
        resident: NationId,
    },

    #[error("Map error: {0}")]
    Map(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConquestError {
    /// True when the failure came from the rate limiter or an upstream 429
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            ConquestError::UpstreamUnavailable(UpstreamError::RateLimited { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, ConquestError>;
