//! Cache statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::slots::Fetch;

/// Statistics for one key space
///
/// `hits` counts every lookup served without a backing call, including
/// lookups that waited on another caller's fetch (also counted in
/// `coalesced`). `misses` equals the number of backing calls made.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
}

impl CacheStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one lookup
    pub fn record(&self, fetch: Fetch) {
        match fetch {
            Fetch::Hit => self.record_hit(),
            Fetch::Coalesced => {
                self.record_hit();
                self.coalesced.fetch_add(1, Ordering::Relaxed);
            }
            Fetch::Miss => self.record_miss(),
        }
    }

    /// Record a cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get hits that were served by a concurrent caller's fetch
    pub fn coalesced(&self) -> u64 {
        self.coalesced.load(Ordering::Relaxed)
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        self.snapshot().hit_ratio()
    }

    /// Copy the current counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            coalesced: self.coalesced(),
        }
    }
}

/// Point-in-time copy of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Lookups served without a backing call
    pub hits: u64,
    /// Backing calls made
    pub misses: u64,
    /// Hits that waited on another caller's fetch
    pub coalesced: u64,
}

impl StatsSnapshot {
    /// Total lookups
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl std::ops::Add for StatsSnapshot {
    type Output = StatsSnapshot;

    fn add(self, other: StatsSnapshot) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            coalesced: self.coalesced + other.coalesced,
        }
    }
}

/// Statistics for the three key spaces of a song cache
#[derive(Debug, Default)]
pub struct CacheStatsSet {
    /// Lookups by id
    pub by_id: CacheStats,
    /// Lookups by title
    pub by_title: CacheStats,
    /// Lookups by album
    pub by_album: CacheStats,
}

impl CacheStatsSet {
    /// Create new stats trackers
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters summed over all key spaces
    pub fn total(&self) -> StatsSnapshot {
        self.by_id.snapshot() + self.by_title.snapshot() + self.by_album.snapshot()
    }
}
