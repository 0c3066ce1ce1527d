//! Game configuration
//!
//! Every tunable that touches the upstream nation service lives here so the
//! rate limit and cache lifetime can be adjusted without a rebuild.

use std::collections::HashSet;
use std::path::Path;

use chrono::Duration;
use serde::Deserialize;

use crate::core::error::{ConquestError, Result};

/// Census scale id the upstream service uses for defense forces
pub const DEFENSE_FORCES_CENSUS_SCALE: u32 = 46;

/// Top-level configuration, normally loaded from a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub api: ApiConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    /// Seed for the combat RNG; `None` draws one from entropy
    pub seed: Option<u64>,
    /// Offline nation roster used when not talking to the live API
    pub nations: Vec<NationEntry>,
    /// Territories on the strategic map and their starting residents
    pub territories: Vec<TerritoryEntry>,
}

/// Upstream HTTP settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// The upstream service rejects requests without a User-Agent
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.nationstates.net/cgi-bin/api.cgi".into(),
            user_agent: "NSImperialism".into(),
            timeout_secs: 10,
        }
    }
}

/// At most `requests` upstream calls per `window_secs`
///
/// Defaults match the published upstream limit of 50 requests per 30 seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub requests: usize,
    pub window_secs: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 50,
            window_secs: 30,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::seconds(self.window_secs)
    }
}

/// How long a fetched nation snapshot is trusted
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 600 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NationEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub demonym: String,
    #[serde(default)]
    pub defense_forces: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerritoryEntry {
    pub id: String,
    #[serde(default)]
    pub resident: Option<String>,
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: GameConfig =
            toml::from_str(content).map_err(|e| ConquestError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.rate_limit.requests == 0 {
            return Err(ConquestError::Config(
                "rate_limit.requests must be at least 1".into(),
            ));
        }

        if self.rate_limit.window_secs <= 0 {
            return Err(ConquestError::Config(
                "rate_limit.window_secs must be positive".into(),
            ));
        }

        if self.cache.ttl_secs < 0 {
            return Err(ConquestError::Config("cache.ttl_secs must not be negative".into()));
        }

        if let Some(nation) = self.nations.iter().find(|n| n.defense_forces > 100) {
            return Err(ConquestError::Config(format!(
                "nation {} has defense_forces {} (must be 0-100)",
                nation.id, nation.defense_forces
            )));
        }

        let mut seen = HashSet::new();
        for territory in &self.territories {
            if !seen.insert(territory.id.as_str()) {
                return Err(ConquestError::Config(format!(
                    "territory {} is listed twice",
                    territory.id
                )));
            }
        }

        Ok(())
    }
}
