//! SongCache: read-through cache wrapping a SongService

use std::sync::Arc;

use songstore::{Song, SongId, SongService, SongStore};
use tracing::debug;

use crate::slots::{Fetch, SlotMap};
use crate::stats::CacheStatsSet;

/// Read-through cache with independent id, title and album key spaces
///
/// Every result is stored the first time its key is queried, including
/// `None` for unknown ids and empty sequences for unmatched titles or
/// albums. Entries are never replaced or evicted.
pub struct SongCache<S = SongStore> {
    /// Authoritative service queried on misses
    backing: S,

    /// id -> song, `None` when the id is unknown
    by_id: SlotMap<SongId, Option<Arc<Song>>>,

    /// title -> matching songs
    by_title: SlotMap<String, Arc<[Song]>>,

    /// album -> matching songs
    by_album: SlotMap<String, Arc<[Song]>>,

    /// Cache statistics
    stats: CacheStatsSet,
}

impl SongCache<SongStore> {
    /// Cache over the reference ten-song catalog with default latency
    pub fn fixture() -> Self {
        Self::new(SongStore::fixture())
    }
}

impl<S: SongService> SongCache<S> {
    /// Create an empty cache in front of `backing`
    pub fn new(backing: S) -> Self {
        Self {
            backing,
            by_id: SlotMap::new(),
            by_title: SlotMap::new(),
            by_album: SlotMap::new(),
            stats: CacheStatsSet::new(),
        }
    }

    /// Look up a song by id
    ///
    /// # Returns
    /// * `Option<Arc<Song>>` - The song, or `None` if the backing has no such id
    pub fn lookup_by_id(&self, id: SongId) -> Option<Arc<Song>> {
        self.fetch_by_id(id).0
    }

    /// Look up all songs with exactly this title
    ///
    /// # Returns
    /// * `Arc<[Song]>` - Matches in backing order, possibly empty
    pub fn lookup_by_title(&self, title: &str) -> Arc<[Song]> {
        self.fetch_by_title(title).0
    }

    /// Look up all songs on exactly this album
    ///
    /// # Returns
    /// * `Arc<[Song]>` - Matches in backing order, possibly empty
    pub fn lookup_by_album(&self, album: &str) -> Arc<[Song]> {
        self.fetch_by_album(album).0
    }

    /// Look up a song by id, reporting how the lookup was served
    pub fn fetch_by_id(&self, id: SongId) -> (Option<Arc<Song>>, Fetch) {
        let (song, fetch) = self
            .by_id
            .get_or_fetch(&id, || self.backing.find_by_id(id).map(Arc::new));
        self.stats.by_id.record(fetch);
        log_lookup("id", &id.to_string(), fetch);
        (song, fetch)
    }

    /// Look up songs by title, reporting how the lookup was served
    pub fn fetch_by_title(&self, title: &str) -> (Arc<[Song]>, Fetch) {
        let (songs, fetch) = self
            .by_title
            .get_or_fetch(title, || Arc::from(self.backing.find_by_title(title)));
        self.stats.by_title.record(fetch);
        log_lookup("title", title, fetch);
        (songs, fetch)
    }

    /// Look up songs by album, reporting how the lookup was served
    pub fn fetch_by_album(&self, album: &str) -> (Arc<[Song]>, Fetch) {
        let (songs, fetch) = self
            .by_album
            .get_or_fetch(album, || Arc::from(self.backing.find_by_album(album)));
        self.stats.by_album.record(fetch);
        log_lookup("album", album, fetch);
        (songs, fetch)
    }

    /// Check whether an id lookup has been stored (found or not)
    pub fn is_cached_id(&self, id: SongId) -> bool {
        self.by_id.contains(&id)
    }

    /// Check whether a title lookup has been stored
    pub fn is_cached_title(&self, title: &str) -> bool {
        self.by_title.contains(title)
    }

    /// Check whether an album lookup has been stored
    pub fn is_cached_album(&self, album: &str) -> bool {
        self.by_album.contains(album)
    }

    /// Number of stored id lookups
    pub fn cached_ids(&self) -> usize {
        self.by_id.len()
    }

    /// Number of stored title lookups
    pub fn cached_titles(&self) -> usize {
        self.by_title.len()
    }

    /// Number of stored album lookups
    pub fn cached_albums(&self) -> usize {
        self.by_album.len()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStatsSet {
        &self.stats
    }

    /// Get the backing service
    pub fn backing(&self) -> &S {
        &self.backing
    }
}

fn log_lookup(space: &str, key: &str, fetch: Fetch) {
    match fetch {
        Fetch::Hit => debug!(space, key, "served from cache"),
        Fetch::Coalesced => debug!(space, key, "served by in-flight fetch"),
        Fetch::Miss => debug!(space, key, "fetched from backing store"),
    }
}

impl<S: SongService> SongService for SongCache<S> {
    fn find_by_id(&self, id: SongId) -> Option<Song> {
        self.lookup_by_id(id).map(|song| Song::clone(&song))
    }

    fn find_by_title(&self, title: &str) -> Vec<Song> {
        self.lookup_by_title(title).to_vec()
    }

    fn find_by_album(&self, album: &str) -> Vec<Song> {
        self.lookup_by_album(album).to_vec()
    }
}
