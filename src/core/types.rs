//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical nation identifier
///
/// Upstream ids are lower-case with underscores in place of spaces, so
/// `"The West Pacific"` and `"the_west_pacific"` name the same nation.
/// Every `NationId` is stored in canonical form; equality is by that form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NationId(String);

impl NationId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(canonical_name(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lower-case, trim, and replace spaces with underscores
pub fn canonical_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

impl fmt::Display for NationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NationId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for NationId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<NationId> for String {
    fn from(id: NationId) -> Self {
        id.0
    }
}

/// Identifier of a contested territory on the strategic map
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerritoryId(pub String);

impl TerritoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TerritoryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Game year counter (one war round per year)
pub type Year = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_unchanged_when_already_canonical() {
        assert_eq!(canonical_name("testlandia"), "testlandia");
        assert_eq!(canonical_name("the_mechalus"), "the_mechalus");
    }

    #[test]
    fn test_canonical_name_replaces_spaces() {
        assert_eq!(canonical_name("the mechalus"), "the_mechalus");
        assert_eq!(canonical_name("The West Pacific"), "the_west_pacific");
    }

    #[test]
    fn test_canonical_name_lowercases() {
        assert_eq!(canonical_name("The_Mechalus"), "the_mechalus");
    }

    #[test]
    fn test_nation_id_equality_is_canonical() {
        assert_eq!(NationId::new("The Mechalus"), NationId::new("the_mechalus"));
        assert_ne!(NationId::new("attacker"), NationId::new("defender"));
    }

    #[test]
    fn test_nation_id_serde_canonicalizes() {
        let id: NationId = serde_json::from_str("\"Some Nation\"").unwrap();
        assert_eq!(id.as_str(), "some_nation");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"some_nation\"");
    }
}
