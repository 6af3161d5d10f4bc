//! Cache statistics report

use serde::Serialize;
use songcache::{SongCache, StatsSnapshot};

#[derive(Debug, Serialize)]
struct Report {
    version: &'static str,
    catalog_songs: usize,
    backing_calls: u64,
    cached_ids: usize,
    cached_titles: usize,
    cached_albums: usize,
    by_id: StatsSnapshot,
    by_title: StatsSnapshot,
    by_album: StatsSnapshot,
    total: StatsSnapshot,
}

impl Report {
    fn collect(cache: &SongCache) -> Self {
        let stats = cache.stats();
        Self {
            version: env!("CARGO_PKG_VERSION"),
            catalog_songs: cache.backing().len(),
            backing_calls: cache.backing().calls(),
            cached_ids: cache.cached_ids(),
            cached_titles: cache.cached_titles(),
            cached_albums: cache.cached_albums(),
            by_id: stats.by_id.snapshot(),
            by_title: stats.by_title.snapshot(),
            by_album: stats.by_album.snapshot(),
            total: stats.total(),
        }
    }
}

fn space_line(name: &str, cached: usize, stats: &StatsSnapshot) -> String {
    format!(
        "{}: entries={} hits={} misses={} coalesced={} hit_ratio={:.2}\n",
        name,
        cached,
        stats.hits,
        stats.misses,
        stats.coalesced,
        stats.hit_ratio()
    )
}

/// INFO-style text report
pub fn render_text(cache: &SongCache) -> String {
    let report = Report::collect(cache);
    let mut out = format!(
        "# Server\n\
         songd_version:{}\n\
         \n\
         # Backing\n\
         catalog_songs:{}\n\
         backing_calls:{}\n\
         \n\
         # Cache\n",
        report.version, report.catalog_songs, report.backing_calls,
    );
    out.push_str(&space_line("by_id", report.cached_ids, &report.by_id));
    out.push_str(&space_line("by_title", report.cached_titles, &report.by_title));
    out.push_str(&space_line("by_album", report.cached_albums, &report.by_album));
    out.push_str(&format!(
        "cache_hits:{}\ncache_misses:{}\ncache_hit_ratio:{:.2}\n",
        report.total.hits,
        report.total.misses,
        report.total.hit_ratio()
    ));
    out
}

/// Same report as pretty-printed JSON
pub fn render_json(cache: &SongCache) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Report::collect(cache))
}
