//! Nation data providers
//!
//! The war engine only ever sees [`NationDataProvider`]. In production the
//! HTTP provider is wrapped in a [`CachedProvider`] so repeated lookups of
//! the same belligerents within a year don't hit the upstream quota.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ahash::AHashMap;
use chrono::{DateTime, Duration, Utc};

use crate::core::error::{ConquestError, Result, UpstreamError};
use crate::core::types::NationId;
use crate::nation::cache::NationCache;
use crate::nation::limiter::RateLimiter;
use crate::nation::snapshot::Nation;

/// Resolves a nation id to its current attributes
///
/// Implementations must never return a nation whose id differs from the
/// one requested.
pub trait NationDataProvider: Send + Sync {
    fn nation(&self, id: &NationId) -> Result<Nation>;
}

impl<P: NationDataProvider + ?Sized> NationDataProvider for &P {
    fn nation(&self, id: &NationId) -> Result<Nation> {
        (**self).nation(id)
    }
}

impl<P: NationDataProvider + ?Sized> NationDataProvider for Arc<P> {
    fn nation(&self, id: &NationId) -> Result<Nation> {
        (**self).nation(id)
    }
}

impl<P: NationDataProvider + ?Sized> NationDataProvider for Box<P> {
    fn nation(&self, id: &NationId) -> Result<Nation> {
        (**self).nation(id)
    }
}

/// Map-backed provider for offline play and tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryNations {
    nations: AHashMap<NationId, Nation>,
}

impl InMemoryNations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a nation, keyed by its own id
    pub fn insert(&mut self, nation: Nation) {
        self.nations.insert(nation.id.clone(), nation);
    }

    pub fn len(&self) -> usize {
        self.nations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nations.is_empty()
    }
}

impl FromIterator<Nation> for InMemoryNations {
    fn from_iter<I: IntoIterator<Item = Nation>>(iter: I) -> Self {
        let mut nations = Self::new();
        for nation in iter {
            nations.insert(nation);
        }
        nations
    }
}

impl NationDataProvider for InMemoryNations {
    fn nation(&self, id: &NationId) -> Result<Nation> {
        self.nations
            .get(id)
            .cloned()
            .ok_or_else(|| ConquestError::NationNotFound(id.clone()))
    }
}

/// Source of "now" for time-boxed components
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Read-through cache in front of a rate-limited provider
///
/// A fresh cache entry is served without touching the limiter. On a miss the
/// limiter is consulted; a saturated limiter fails the lookup with
/// [`UpstreamError::RateLimited`] instead of calling upstream. Failed fetches
/// are never cached.
pub struct CachedProvider<P, C = SystemClock> {
    inner: P,
    cache: Mutex<NationCache>,
    limiter: Arc<RateLimiter>,
    clock: C,
}

impl<P: NationDataProvider> CachedProvider<P, SystemClock> {
    pub fn new(inner: P, ttl: Duration, limiter: Arc<RateLimiter>) -> Self {
        Self::with_clock(inner, ttl, limiter, SystemClock)
    }
}

impl<P: NationDataProvider, C: Clock> CachedProvider<P, C> {
    pub fn with_clock(inner: P, ttl: Duration, limiter: Arc<RateLimiter>, clock: C) -> Self {
        Self {
            inner,
            cache: Mutex::new(NationCache::new(ttl)),
            limiter,
            clock,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn lock_cache(&self) -> MutexGuard<'_, NationCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: NationDataProvider, C: Clock> NationDataProvider for CachedProvider<P, C> {
    fn nation(&self, id: &NationId) -> Result<Nation> {
        let now = self.clock.now();

        if let Some(nation) = self.lock_cache().get_nation(id, now) {
            tracing::debug!(nation = %id, "cache hit");
            return Ok(nation.clone());
        }

        if !self.limiter.try_acquire(now) {
            tracing::warn!(nation = %id, "rate limit reached, not calling upstream");
            return Err(UpstreamError::RateLimited {
                retry_after_secs: None,
            }
            .into());
        }

        tracing::debug!(nation = %id, "cache miss");
        let nation = self.inner.nation(id)?;
        self.lock_cache().add_nation(id.clone(), nation.clone(), now);
        Ok(nation)
    }
}
