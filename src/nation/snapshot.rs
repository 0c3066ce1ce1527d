//! Nation snapshots as returned by the upstream nation-data service

use serde::{Deserialize, Serialize};

use crate::core::config::DEFENSE_FORCES_CENSUS_SCALE;
use crate::core::error::{Result, UpstreamError};
use crate::core::types::NationId;

/// Highest defense-forces percentile rank
pub const MAX_DEFENSE_FORCES: u8 = 100;

/// Immutable snapshot of one nation at the time it was pulled down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nation {
    pub id: NationId,
    /// Full display name, e.g. "The Empire of the Mechalus"
    pub name: String,
    pub flag_url: String,
    pub demonym: String,
    defense_forces: u8,
}

impl Nation {
    pub fn new(id: impl Into<NationId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            flag_url: String::new(),
            demonym: String::new(),
            defense_forces: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_demonym(mut self, demonym: impl Into<String>) -> Self {
        self.demonym = demonym.into();
        self
    }

    pub fn with_defense_forces(mut self, percentile_rank: u32) -> Self {
        self.set_defense_forces(percentile_rank);
        self
    }

    /// Defense-forces percentile rank in 0..=100
    pub fn defense_forces(&self) -> u8 {
        self.defense_forces
    }

    /// Set the percentile rank, clamped to 100
    pub fn set_defense_forces(&mut self, percentile_rank: u32) {
        self.defense_forces = percentile_rank.min(MAX_DEFENSE_FORCES as u32) as u8;
    }

    /// Name to show in war titles and logs, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }

    pub fn url(&self) -> String {
        format!("https://www.nationstates.net/nation={}", self.id)
    }

    /// Flags are hosted with a `t2` thumbnail next to the full-size image
    pub fn flag_thumbnail_url(&self) -> String {
        self.flag_url.replace(".png", "t2.png")
    }

    /// Decode the upstream XML document for a single nation
    pub fn parse_xml(xml: &str) -> Result<Self> {
        let document: XmlNation = quick_xml::de::from_str(xml)
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        Ok(document.into_nation())
    }
}

/// XML shape of `?nation=<id>;q=census+fullname+flag+demonym;scale=46;mode=prank`
#[derive(Debug, Deserialize)]
struct XmlNation {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "FULLNAME", default)]
    full_name: String,
    #[serde(rename = "FLAG", default)]
    flag: String,
    #[serde(rename = "DEMONYM", default)]
    demonym: String,
    #[serde(rename = "CENSUS", default)]
    census: XmlCensus,
}

#[derive(Debug, Default, Deserialize)]
struct XmlCensus {
    #[serde(rename = "SCALE", default)]
    scales: Vec<XmlScale>,
}

#[derive(Debug, Deserialize)]
struct XmlScale {
    #[serde(rename = "@id")]
    id: u32,
    #[serde(rename = "PRANK", default)]
    percentage_rank: Option<f64>,
}

impl XmlNation {
    fn into_nation(self) -> Nation {
        // A nation without the defense scale is treated as having none
        let defense_forces = self
            .census
            .scales
            .iter()
            .find(|scale| scale.id == DEFENSE_FORCES_CENSUS_SCALE)
            .and_then(|scale| scale.percentage_rank)
            .map(|rank| rank.round().clamp(0.0, MAX_DEFENSE_FORCES as f64) as u32)
            .unwrap_or(0);

        Nation {
            id: NationId::new(&self.id),
            name: self.full_name,
            flag_url: self.flag,
            demonym: self.demonym,
            defense_forces: 0,
        }
        .with_defense_forces(defense_forces)
    }
}
