//! Error types for songstore

use std::fmt;
use std::io;

use crate::song::SongId;

/// Result type alias for songstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or loading a song catalog
///
/// Lookups never fail: a missing song is `None` and an empty match set is
/// an empty `Vec`.
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(io::Error),

    /// Catalog parse error
    Parse(String),

    /// Two songs share the same identifier
    DuplicateId(SongId),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Parse(msg) => write!(f, "Parse error: {}", msg),
            Error::DuplicateId(id) => write!(f, "Duplicate song id: {}", id),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<nom::Err<nom::error::Error<&str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&str>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => Error::Parse("Unexpected end of catalog".to_string()),
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                let snippet: String = e.input.lines().next().unwrap_or("").chars().take(40).collect();
                Error::Parse(format!("{:?} near '{}'", e.code, snippet))
            }
        }
    }
}
