//! Cache + rate limiter in front of a provider, driving real wars

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use territory_war::core::error::{ConquestError, Result};
use territory_war::core::types::{NationId, TerritoryId};
use territory_war::nation::{
    CachedProvider, InMemoryNations, ManualClock, Nation, NationCache, NationDataProvider,
    RateLimiter,
};
use territory_war::war::War;

fn ten_o_clock() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2010-10-10T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Upstream stand-in that counts how often it is called
struct Upstream {
    nations: InMemoryNations,
    calls: AtomicUsize,
}

impl NationDataProvider for Upstream {
    fn nation(&self, id: &NationId) -> Result<Nation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.nations.nation(id)
    }
}

fn upstream() -> Upstream {
    Upstream {
        nations: [
            Nation::new("attacker").with_defense_forces(0),
            Nation::new("defender").with_defense_forces(100),
        ]
        .into_iter()
        .collect(),
        calls: AtomicUsize::new(0),
    }
}

fn war() -> War {
    War::new(
        "The Attackian War for A",
        NationId::new("attacker"),
        NationId::new("defender"),
        TerritoryId::new("A"),
    )
}

#[test]
fn test_limiter_quota_of_three_per_ten_minutes() {
    let limiter = RateLimiter::new(3, Duration::minutes(10));
    let t0 = ten_o_clock();
    for _ in 0..3 {
        limiter.add_request_time(t0);
    }

    assert!(limiter.is_at_rate_limit(t0 + Duration::minutes(1)));
    assert!(!limiter.is_at_rate_limit(t0 + Duration::minutes(20)));
}

#[test]
fn test_cache_hit_then_expiry() {
    let ttl = Duration::minutes(10);
    let mut cache = NationCache::new(ttl);
    let id = NationId::new("testlandia");
    let t0 = ten_o_clock();
    cache.add_nation(id.clone(), Nation::new("testlandia"), t0);

    assert_eq!(cache.get_nation(&id, t0).map(|n| n.id.clone()), Some(id.clone()));
    assert!(cache.get_nation(&id, t0 + ttl + Duration::seconds(1)).is_none());
}

#[test]
fn test_war_through_cache_only_fetches_each_nation_once() {
    let clock = Arc::new(ManualClock::new(ten_o_clock()));
    let limiter = Arc::new(RateLimiter::new(50, Duration::seconds(30)));
    let provider =
        CachedProvider::with_clock(upstream(), Duration::minutes(10), limiter, clock.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut war = war();

    while war.is_ongoing() {
        war.tick(&provider, &mut rng).unwrap();
        clock.advance(Duration::minutes(1));
    }

    assert_eq!(war.score(), 120);
    assert_eq!(provider.inner().calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_saturated_limiter_aborts_tick_without_change() {
    let clock = Arc::new(ManualClock::new(ten_o_clock()));
    let limiter = Arc::new(RateLimiter::new(1, Duration::minutes(10)));
    let provider = CachedProvider::with_clock(upstream(), Duration::minutes(10), limiter, clock);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut war = war();

    // Defender is fetched first and uses the whole quota
    let err = war.tick(&provider, &mut rng).unwrap_err();
    assert!(err.is_rate_limited());
    assert!(matches!(err, ConquestError::UpstreamUnavailable(_)));
    assert_eq!(war.score(), 0);
    assert!(war.is_ongoing());
}

#[test]
fn test_shared_limiter_across_providers() {
    let clock = Arc::new(ManualClock::new(ten_o_clock()));
    let limiter = Arc::new(RateLimiter::new(2, Duration::minutes(10)));
    let first = CachedProvider::with_clock(
        upstream(),
        Duration::minutes(10),
        limiter.clone(),
        clock.clone(),
    );
    let second = CachedProvider::with_clock(upstream(), Duration::minutes(10), limiter, clock);

    first.nation(&NationId::new("attacker")).unwrap();
    second.nation(&NationId::new("defender")).unwrap();

    let err = second.nation(&NationId::new("attacker")).unwrap_err();
    assert!(err.is_rate_limited());
}
