//! Nation data: snapshots, the upstream client, and the cache and rate
//! limiter that sit in front of it

pub mod cache;
pub mod client;
pub mod limiter;
pub mod provider;
pub mod snapshot;

pub use cache::NationCache;
pub use client::{HttpNationProvider, NationStatesClient};
pub use limiter::RateLimiter;
pub use provider::{
    CachedProvider, Clock, InMemoryNations, ManualClock, NationDataProvider, SystemClock,
};
pub use snapshot::{Nation, MAX_DEFENSE_FORCES};
