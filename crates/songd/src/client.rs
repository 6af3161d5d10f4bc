//! Query client driving a SongCache

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use songcache::{Fetch, SongCache};
use songstore::{Song, SongId, SongService, SongStore};
use tracing::info;

/// One lookup against the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Id(SongId),
    Title(String),
    Album(String),
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Id(id) => write!(f, "lookup_by_id({})", id),
            Query::Title(title) => write!(f, "lookup_by_title({:?})", title),
            Query::Album(album) => write!(f, "lookup_by_album({:?})", album),
        }
    }
}

/// Result of a query as seen by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Song(Option<Arc<Song>>),
    Songs(Arc<[Song]>),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Song(Some(song)) => write!(f, "{}", song),
            Answer::Song(None) => write!(f, "not found"),
            Answer::Songs(songs) => {
                write!(f, "[")?;
                for (i, song) in songs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", song)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A served query with its observed cost
#[derive(Debug, Clone)]
pub struct Outcome {
    pub query: Query,
    pub answer: Answer,
    pub elapsed: Duration,
    pub cached: bool,
}

/// Issues queries through the cache and reports whether each was a hit
pub struct Client<S = SongStore> {
    cache: Arc<SongCache<S>>,
}

impl<S: SongService> Client<S> {
    pub fn new(cache: Arc<SongCache<S>>) -> Self {
        Self { cache }
    }

    pub fn execute(&self, query: &Query) -> Outcome {
        let start = Instant::now();

        let (answer, fetch) = match query {
            Query::Id(id) => {
                let (song, fetch) = self.cache.fetch_by_id(*id);
                (Answer::Song(song), fetch)
            }
            Query::Title(title) => {
                let (songs, fetch) = self.cache.fetch_by_title(title);
                (Answer::Songs(songs), fetch)
            }
            Query::Album(album) => {
                let (songs, fetch) = self.cache.fetch_by_album(album);
                (Answer::Songs(songs), fetch)
            }
        };

        let elapsed = start.elapsed();
        let cached = fetch != Fetch::Miss;
        if cached {
            info!("{} served from cache in {:?}", query, elapsed);
        } else {
            info!("{} fetched from backing store in {:?}", query, elapsed);
        }

        Outcome {
            query: query.clone(),
            answer,
            elapsed,
            cached,
        }
    }

    pub fn run(&self, queries: &[Query]) -> Vec<Outcome> {
        queries.iter().map(|query| self.execute(query)).collect()
    }
}

/// Fixed demonstration sequence: repeated ids, titles and albums
pub fn demo_sequence() -> Vec<Query> {
    let mut queries: Vec<Query> = [1, 2, 1, 3, 2].into_iter().map(Query::Id).collect();
    queries.extend(
        ["Song 1", "Song 2", "Song 1", "Song 2"]
            .into_iter()
            .map(|title| Query::Title(title.to_string())),
    );
    queries.extend(
        ["Album 1", "Album 2", "Album 1", "Album 2"]
            .into_iter()
            .map(|album| Query::Album(album.to_string())),
    );
    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        let store = SongStore::fixture().with_latency(Duration::ZERO);
        Client::new(Arc::new(SongCache::new(store)))
    }

    #[test]
    fn test_demo_sequence_shape() {
        let queries = demo_sequence();

        assert_eq!(queries.len(), 13);
        assert_eq!(queries[0], Query::Id(1));
        assert_eq!(queries[5], Query::Title("Song 1".to_string()));
        assert_eq!(queries[12], Query::Album("Album 2".to_string()));
    }

    #[test]
    fn test_demo_hits_and_misses() {
        let outcomes = client().run(&demo_sequence());

        let cached: Vec<bool> = outcomes.iter().map(|o| o.cached).collect();
        assert_eq!(
            cached,
            vec![
                false, false, true, false, true, // ids
                false, false, true, true, // titles
                false, false, true, true, // albums
            ]
        );
    }

    #[test]
    fn test_not_found_answer() {
        let client = client();

        let first = client.execute(&Query::Id(99));
        let second = client.execute(&Query::Id(99));

        assert_eq!(first.answer, Answer::Song(None));
        assert_eq!(first.answer.to_string(), "not found");
        assert!(!first.cached);
        assert!(second.cached);
    }

    #[test]
    fn test_shared_backing_does_not_mislabel_hits() {
        let store = Arc::new(SongStore::fixture().with_latency(Duration::ZERO));
        let ours = Client::new(Arc::new(SongCache::new(Arc::clone(&store))));
        let other = SongCache::new(Arc::clone(&store));

        ours.execute(&Query::Id(1));
        let hit = std::thread::scope(|s| {
            s.spawn(|| other.lookup_by_album("Album 5"));
            ours.execute(&Query::Id(1))
        });

        assert!(hit.cached);
        assert_eq!(store.calls(), 2);
    }

    #[test]
    fn test_answer_display() {
        let outcome = client().execute(&Query::Album("Album 1".to_string()));

        assert_eq!(
            outcome.answer.to_string(),
            "[Song{id=1, title='Song 1', artist='Artist 1', album='Album 1', duration=180}, \
             Song{id=6, title='Song 6', artist='Artist 1', album='Album 1', duration=180}]"
        );
        assert_eq!(outcome.query.to_string(), "lookup_by_album(\"Album 1\")");
    }
}
