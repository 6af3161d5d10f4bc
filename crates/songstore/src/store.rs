//! Backing song store
//!
//! Holds a fixed catalog in memory and answers lookups by linear scan. Every
//! lookup first sleeps for the configured latency to model a slow remote
//! service.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::parser::parse_catalog;
use crate::song::{Song, SongId, SongService};

/// Default simulated lookup latency (1 second)
pub const DEFAULT_LATENCY: Duration = Duration::from_secs(1);

/// SongStore is the authoritative, slow song catalog
#[derive(Debug)]
pub struct SongStore {
    /// Catalog in storage order
    songs: Vec<Song>,

    /// Delay applied before every lookup
    latency: Duration,

    /// Number of lookups served
    calls: AtomicU64,
}

impl SongStore {
    /// Create a store over the given songs
    ///
    /// # Arguments
    /// * `songs` - Catalog in storage order
    ///
    /// # Returns
    /// * `Result<SongStore>` - Fails with `DuplicateId` if two songs share an id
    pub fn new(songs: Vec<Song>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(songs.len());
        for song in &songs {
            if !seen.insert(song.id) {
                return Err(Error::DuplicateId(song.id));
            }
        }

        Ok(Self {
            songs,
            latency: DEFAULT_LATENCY,
            calls: AtomicU64::new(0),
        })
    }

    /// Reference catalog: ten songs where songs N and N+5 share artist and album
    pub fn fixture() -> Self {
        let durations = [180, 200, 220, 220, 220];
        let songs = (1..=10)
            .map(|n: SongId| {
                let group = (n - 1) % 5;
                Song::new(
                    n,
                    format!("Song {}", n),
                    format!("Artist {}", group + 1),
                    format!("Album {}", group + 1),
                    durations[group as usize],
                )
            })
            .collect();

        Self {
            songs,
            latency: DEFAULT_LATENCY,
            calls: AtomicU64::new(0),
        }
    }

    /// Load a store from a catalog file
    ///
    /// # Arguments
    /// * `path` - Path to a catalog document (see [`crate::parse_catalog`])
    ///
    /// # Returns
    /// * `Result<SongStore>` - Store over the file's songs
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let store = Self::new(parse_catalog(&contents)?)?;
        info!("Loaded {} songs from {}", store.len(), path.display());
        Ok(store)
    }

    /// Set the simulated lookup latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Simulated lookup latency
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Number of lookups served so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Catalog in storage order
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Get the number of songs in the catalog
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    fn simulate_latency(&self, query: &str) {
        debug!(latency = ?self.latency, query, "backing lookup");
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    fn collect_matching(&self, pred: impl Fn(&Song) -> bool) -> Vec<Song> {
        self.songs.iter().filter(|song| pred(song)).cloned().collect()
    }
}

impl SongService for SongStore {
    fn find_by_id(&self, id: SongId) -> Option<Song> {
        self.simulate_latency("id");
        self.songs.iter().find(|song| song.id == id).cloned()
    }

    fn find_by_title(&self, title: &str) -> Vec<Song> {
        self.simulate_latency("title");
        self.collect_matching(|song| song.title == title)
    }

    fn find_by_album(&self, album: &str) -> Vec<Song> {
        self.simulate_latency("album");
        self.collect_matching(|song| song.album == album)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::render_catalog;
    use std::time::Instant;
    use tempfile::TempDir;

    fn instant_fixture() -> SongStore {
        SongStore::fixture().with_latency(Duration::ZERO)
    }

    fn ids(songs: &[Song]) -> Vec<SongId> {
        songs.iter().map(|song| song.id).collect()
    }

    #[test]
    fn test_fixture_layout() {
        let store = instant_fixture();

        assert_eq!(store.len(), 10);
        assert!(!store.is_empty());
        assert_eq!(store.songs()[0], Song::new(1, "Song 1", "Artist 1", "Album 1", 180));
        assert_eq!(store.songs()[5], Song::new(6, "Song 6", "Artist 1", "Album 1", 180));
        assert_eq!(store.songs()[9], Song::new(10, "Song 10", "Artist 5", "Album 5", 220));
        assert_eq!(store.latency(), Duration::ZERO);
    }

    #[test]
    fn test_default_latency() {
        assert_eq!(SongStore::fixture().latency(), DEFAULT_LATENCY);
    }

    #[test]
    fn test_find_by_id() {
        let store = instant_fixture();

        let song = store.find_by_id(3).unwrap();
        assert_eq!(song.title, "Song 3");
        assert_eq!(store.find_by_id(42), None);
        assert_eq!(store.calls(), 2);
    }

    #[test]
    fn test_find_by_title() {
        let store = instant_fixture();

        assert_eq!(ids(&store.find_by_title("Song 1")), vec![1]);
        assert!(store.find_by_title("song 1").is_empty());
        assert!(store.find_by_title("Song 1 ").is_empty());
        assert_eq!(store.calls(), 3);
    }

    #[test]
    fn test_find_by_album_keeps_storage_order() {
        let store = instant_fixture();

        assert_eq!(ids(&store.find_by_album("Album 1")), vec![1, 6]);
        assert_eq!(ids(&store.find_by_album("Album 5")), vec![5, 10]);
        assert!(store.find_by_album("Album 9").is_empty());
    }

    #[test]
    fn test_duplicate_id() {
        let songs = vec![
            Song::new(1, "A", "X", "Y", 10),
            Song::new(1, "B", "X", "Y", 20),
        ];
        assert!(matches!(SongStore::new(songs), Err(Error::DuplicateId(1))));
    }

    #[test]
    fn test_latency_is_applied() {
        let store = SongStore::fixture().with_latency(Duration::from_millis(20));

        let start = Instant::now();
        store.find_by_id(1);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_open_catalog_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("songs.toon");
        std::fs::write(&path, render_catalog(instant_fixture().songs())).unwrap();

        let store = SongStore::open(&path).unwrap().with_latency(Duration::ZERO);
        assert_eq!(store.len(), 10);
        assert_eq!(ids(&store.find_by_album("Album 2")), vec![2, 7]);
    }

    #[test]
    fn test_bundled_catalog_matches_fixture() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/songs.toon");
        let store = SongStore::open(path).unwrap();

        assert_eq!(store.songs(), instant_fixture().songs());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = SongStore::open(dir.path().join("missing.toon"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_open_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dup.toon");
        std::fs::write(
            &path,
            "songs[2]{id,title,artist,album,duration}:\n  4,A,X,Y,10\n  4,B,X,Y,20\n",
        )
        .unwrap();

        assert!(matches!(SongStore::open(&path), Err(Error::DuplicateId(4))));
    }
}
