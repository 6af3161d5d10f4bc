//! The song record and the lookup contract shared by the store and the cache

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique song identifier
pub type SongId = u32;

/// An immutable song record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    /// Unique identifier
    pub id: SongId,
    /// Song title (not unique)
    pub title: String,
    /// Performing artist
    pub artist: String,
    /// Album name (not unique)
    pub album: String,
    /// Length in seconds
    pub duration: u32,
}

impl Song {
    /// Create a new song record
    pub fn new(
        id: SongId,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration,
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Song{{id={}, title='{}', artist='{}', album='{}', duration={}}}",
            self.id, self.title, self.artist, self.album, self.duration
        )
    }
}

/// Query contract answered by the backing store and by any cache in front of it
///
/// Keys are matched verbatim: case-sensitive, no trimming.
pub trait SongService: Send + Sync {
    /// Find the song with the given identifier
    fn find_by_id(&self, id: SongId) -> Option<Song>;

    /// Find every song with exactly this title, in catalog order
    fn find_by_title(&self, title: &str) -> Vec<Song>;

    /// Find every song on exactly this album, in catalog order
    fn find_by_album(&self, album: &str) -> Vec<Song>;
}

impl<S: SongService + ?Sized> SongService for std::sync::Arc<S> {
    fn find_by_id(&self, id: SongId) -> Option<Song> {
        (**self).find_by_id(id)
    }

    fn find_by_title(&self, title: &str) -> Vec<Song> {
        (**self).find_by_title(title)
    }

    fn find_by_album(&self, album: &str) -> Vec<Song> {
        (**self).find_by_album(album)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let song = Song::new(1, "Song 1", "Artist 1", "Album 1", 180);
        assert_eq!(
            song.to_string(),
            "Song{id=1, title='Song 1', artist='Artist 1', album='Album 1', duration=180}"
        );
    }

    #[test]
    fn test_equality_is_structural() {
        let a = Song::new(7, "Song 7", "Artist 2", "Album 2", 200);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Song::new(7, "Song 7", "Artist 2", "Album 2", 201));
    }
}
