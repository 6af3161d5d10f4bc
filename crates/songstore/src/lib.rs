//! # songstore
//!
//! Authoritative song catalog behind the song cache.
//!
//! ## Overview
//! - Fixed in-memory catalog, linear-scan lookups
//! - Lookups by id, title and album, each with simulated latency
//! - Catalogs load from TOON tabular files

#![warn(missing_docs)]

mod error;
mod parser;
mod song;
mod store;

pub use error::{Error, Result};
pub use parser::{parse_catalog, render_catalog, COLLECTION, FIELDS};
pub use song::{Song, SongId, SongService};
pub use store::{SongStore, DEFAULT_LATENCY};
