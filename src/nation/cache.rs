//! Time-boxed memoization of nation lookups

use ahash::AHashMap;
use chrono::{DateTime, Duration, Utc};

use crate::core::types::NationId;
use crate::nation::snapshot::Nation;

#[derive(Debug, Clone)]
struct CachedNation {
    nation: Nation,
    pulled_down_at: DateTime<Utc>,
}

/// Nation snapshots keyed by id, trusted for `ttl` after they were fetched
///
/// Expired entries are never evicted; they read as absent and are replaced
/// by the next successful fetch. Not synchronized: wrap in a lock when shared
/// (see `CachedProvider`).
#[derive(Debug, Clone)]
pub struct NationCache {
    entries: AHashMap<NationId, CachedNation>,
    ttl: Duration,
}

impl NationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: AHashMap::new(),
            ttl,
        }
    }

    /// Store `nation` under `id`, superseding any earlier entry
    pub fn add_nation(&mut self, id: NationId, nation: Nation, now: DateTime<Utc>) {
        self.entries.insert(
            id,
            CachedNation {
                nation,
                pulled_down_at: now,
            },
        );
    }

    /// The cached nation, unless absent or expired (callers can't tell which)
    pub fn get_nation(&self, id: &NationId, now: DateTime<Utc>) -> Option<&Nation> {
        let cached = self.entries.get(id)?;

        if cached.pulled_down_at + self.ttl < now {
            return None;
        }

        Some(&cached.nation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
