//! SongCache demo driver
//!
//! Runs a fixed query sequence through the cache, optionally fires a burst of
//! concurrent lookups on one uncached album, and prints cache statistics.

mod client;
mod report;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use songcache::SongCache;
use songstore::{Song, SongStore};
use tracing::{info, warn};

use crate::client::{demo_sequence, Client};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog file (defaults to the built-in ten-song catalog)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Simulated backing store latency in milliseconds
    #[arg(short, long, default_value_t = 1000)]
    latency_ms: u64,

    /// Number of concurrent lookups to fire at one uncached album
    #[arg(short, long, default_value_t = 0)]
    burst: usize,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

fn open_store(args: &Args) -> Result<SongStore> {
    let store = match &args.catalog {
        Some(path) => SongStore::open(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => SongStore::fixture(),
    };
    Ok(store.with_latency(Duration::from_millis(args.latency_ms)))
}

/// Album in catalog order that has not been looked up yet
fn uncached_album(cache: &SongCache) -> Option<String> {
    cache
        .backing()
        .songs()
        .iter()
        .map(|song| song.album.as_str())
        .find(|album| !cache.is_cached_album(album))
        .map(str::to_string)
}

async fn burst(cache: Arc<SongCache>, album: String, n: usize) -> Result<Vec<Arc<[Song]>>> {
    let calls_before = cache.backing().calls();
    let start = Instant::now();

    let tasks: Vec<_> = (0..n)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let album = album.clone();
            tokio::task::spawn_blocking(move || cache.lookup_by_album(&album))
        })
        .collect();

    let mut results = Vec::with_capacity(n);
    for task in tasks {
        results.push(task.await?);
    }

    info!(
        "Burst of {} lookups for {:?} took {:?} with {} backing call(s)",
        n,
        album,
        start.elapsed(),
        cache.backing().calls() - calls_before
    );
    Ok(results)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    info!("Starting songd v{}", env!("CARGO_PKG_VERSION"));
    let store = open_store(&args)?;
    info!(
        "Catalog: {} songs, backing latency {:?}",
        store.len(),
        store.latency()
    );

    let cache = Arc::new(SongCache::new(store));
    let client = Client::new(Arc::clone(&cache));

    let sequence = demo_sequence();
    let outcomes = tokio::task::spawn_blocking(move || client.run(&sequence)).await?;
    for outcome in &outcomes {
        println!(
            "{:<28} {:>6} {:>10.1?}  {}",
            outcome.query.to_string(),
            if outcome.cached { "HIT" } else { "MISS" },
            outcome.elapsed,
            outcome.answer
        );
    }

    if args.burst > 0 {
        match uncached_album(&cache) {
            Some(album) => {
                let results = burst(Arc::clone(&cache), album, args.burst).await?;
                let shared = results.iter().all(|songs| Arc::ptr_eq(songs, &results[0]));
                println!(
                    "\nburst: {} concurrent lookups shared one result: {}",
                    results.len(),
                    shared
                );
            }
            None => warn!("Every album is already cached, skipping burst"),
        }
    }

    println!();
    if args.json {
        println!("{}", report::render_json(&cache)?);
    } else {
        print!("{}", report::render_text(&cache));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_cache() -> Arc<SongCache> {
        Arc::new(SongCache::new(
            SongStore::fixture().with_latency(Duration::ZERO),
        ))
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["songd"]).unwrap();

        assert_eq!(args.catalog, None);
        assert_eq!(args.latency_ms, 1000);
        assert_eq!(args.burst, 0);
        assert!(!args.json);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "songd",
            "--catalog",
            "songs.toon",
            "--latency-ms",
            "5",
            "--burst",
            "4",
            "--json",
        ])
        .unwrap();

        assert_eq!(args.catalog, Some(PathBuf::from("songs.toon")));
        assert_eq!(args.latency_ms, 5);
        assert_eq!(args.burst, 4);
        assert!(args.json);
    }

    #[test]
    fn test_open_store_missing_catalog() {
        let args = Args::try_parse_from(["songd", "--catalog", "/nonexistent/songs.toon"]).unwrap();
        let err = open_store(&args).unwrap_err();
        assert!(err.to_string().contains("failed to load catalog"));
    }

    #[test]
    fn test_uncached_album() {
        let cache = instant_cache();

        assert_eq!(uncached_album(&cache).as_deref(), Some("Album 1"));
        cache.lookup_by_album("Album 1");
        cache.lookup_by_album("Album 2");
        assert_eq!(uncached_album(&cache).as_deref(), Some("Album 3"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_burst_single_flight() {
        let cache = Arc::new(SongCache::new(
            SongStore::fixture().with_latency(Duration::from_millis(50)),
        ));

        let results = burst(Arc::clone(&cache), "Album 4".to_string(), 6)
            .await
            .unwrap();

        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|songs| Arc::ptr_eq(songs, &results[0])));
        assert_eq!(cache.backing().calls(), 1);
    }
}
