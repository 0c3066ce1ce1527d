//! Async HTTP client for the upstream nation-data API
//!
//! One GET per nation, asking only for the shards the game needs (full name,
//! flag, demonym and the defense-forces census rank). The response is XML.

use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, USER_AGENT};
use reqwest::{Client, StatusCode};
use tokio::runtime::Runtime;

use crate::core::config::{ApiConfig, DEFENSE_FORCES_CENSUS_SCALE};
use crate::core::error::{ConquestError, Result, UpstreamError};
use crate::core::types::NationId;
use crate::nation::provider::NationDataProvider;
use crate::nation::snapshot::Nation;

/// Bytes escaped in a query value; the RFC 3986 unreserved set passes through
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Client for the nation-data API
pub struct NationStatesClient {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl NationStatesClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Full request URL for one nation
    pub fn nation_url(&self, id: &NationId) -> String {
        format!(
            "{}?nation={};q=census+fullname+flag+demonym;scale={};mode=prank",
            self.base_url,
            utf8_percent_encode(id.as_str(), QUERY_VALUE),
            DEFENSE_FORCES_CENSUS_SCALE
        )
    }

    /// Fetch and decode the current snapshot of one nation
    pub async fn fetch_nation(&self, id: &NationId) -> Result<Nation> {
        tracing::info!(nation = %id, "pulling down nation data");

        let response = self
            .client
            .get(self.nation_url(id))
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = retry_after(response.headers());
            tracing::warn!(?retry_after_secs, "too many requests to nation API");
            return Err(UpstreamError::RateLimited { retry_after_secs }.into());
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ConquestError::NationNotFound(id.clone()));
        }

        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()).into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let nation = Nation::parse_xml(&body)?;
        if &nation.id != id {
            return Err(UpstreamError::IdentityMismatch {
                requested: id.clone(),
                returned: nation.id,
            }
            .into());
        }

        Ok(nation)
    }
}

/// Seconds from `X-Retry-After` (falling back to the standard `Retry-After`)
fn retry_after(headers: &HeaderMap) -> Option<u64> {
    ["X-Retry-After", "Retry-After"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| value.trim().parse().ok())
}

/// Blocking [`NationDataProvider`] over [`NationStatesClient`]
///
/// Owns its own runtime; must not be called from inside another tokio
/// runtime.
pub struct HttpNationProvider {
    client: NationStatesClient,
    runtime: Runtime,
}

impl HttpNationProvider {
    pub fn new(client: NationStatesClient) -> Result<Self> {
        Ok(Self {
            client,
            runtime: Runtime::new()?,
        })
    }
}

impl NationDataProvider for HttpNationProvider {
    fn nation(&self, id: &NationId) -> Result<Nation> {
        self.runtime.block_on(self.client.fetch_nation(id))
    }
}
