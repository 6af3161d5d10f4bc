//! # songcache
//!
//! Read-through cache in front of a [`songstore::SongService`].
//!
//! ## Architecture
//! - **Key spaces**: independent id, title and album maps, each behind its own lock
//! - **Slots**: one once-initialized slot per key, so racing lookups share one backing call
//! - **Population**: results are stored on first lookup, including "not found" and empty matches
//! - **No eviction**: entries live as long as the cache

#![warn(missing_docs)]

mod cache;
mod slots;
mod stats;

pub use cache::SongCache;
pub use slots::Fetch;
pub use stats::{CacheStats, CacheStatsSet, StatsSnapshot};
