//! Catalog parser using nom
//!
//! Catalog format (TOON tabular block):
//! ```text
//! # comments and blank lines are ignored
//! songs[2]{id,title,artist,album,duration}:
//!   1,Song 1,Artist 1,Album 1,180
//!   2,Song 2,Artist 2,Album 2,200
//! ```
//!
//! Rows are indented. Text fields are taken verbatim and may not contain
//! commas.

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map_res},
    multi::separated_list1,
    sequence::{delimited, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::song::Song;

/// Collection name expected in the catalog header
pub const COLLECTION: &str = "songs";

/// Field list expected in the catalog header, in row order
pub const FIELDS: [&str; 5] = ["id", "title", "artist", "album", "duration"];

/// Catalog header line
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogHeader<'a> {
    /// Collection name
    pub collection: &'a str,
    /// Declared number of rows
    pub row_count: u32,
    /// Declared field names
    pub fields: Vec<&'a str>,
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| digits.parse::<u32>())(input)
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn text(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ',' && c != '\n' && c != '\r')(input)
}

/// Parse a header line: `songs[N]{id,title,artist,album,duration}:`
pub fn parse_header(input: &str) -> IResult<&str, CatalogHeader<'_>> {
    let (rest, (collection, row_count, fields, _)) = tuple((
        ident,
        delimited(char('['), number, char(']')),
        delimited(char('{'), separated_list1(char(','), ident), char('}')),
        terminated(tag(":"), space0),
    ))(input)?;

    Ok((
        rest,
        CatalogHeader {
            collection,
            row_count,
            fields,
        },
    ))
}

/// Parse one indented row: `  id,title,artist,album,duration`
pub fn parse_row(input: &str) -> IResult<&str, Song> {
    let (rest, (_, id, _, title, _, artist, _, album, _, duration, _)) = tuple((
        space1,
        number,
        char(','),
        text,
        char(','),
        text,
        char(','),
        text,
        char(','),
        number,
        space0,
    ))(input)?;

    Ok((rest, Song::new(id, title, artist, album, duration)))
}

fn located(line_no: usize, err: nom::Err<nom::error::Error<&str>>) -> Error {
    match Error::from(err) {
        Error::Parse(msg) => Error::Parse(format!("line {}: {}", line_no, msg)),
        other => other,
    }
}

fn is_skipped(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Parse a complete catalog document into songs, in file order
pub fn parse_catalog(input: &str) -> Result<Vec<Song>> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !is_skipped(line));

    let (header_line, raw_header) = lines
        .next()
        .ok_or_else(|| Error::Parse("Missing catalog header".to_string()))?;
    let (_, header) = all_consuming(parse_header)(raw_header).map_err(|e| located(header_line, e))?;

    if header.collection != COLLECTION {
        return Err(Error::Parse(format!(
            "line {}: expected collection '{}', found '{}'",
            header_line, COLLECTION, header.collection
        )));
    }
    if header.fields != FIELDS {
        return Err(Error::Parse(format!(
            "line {}: expected fields {{{}}}, found {{{}}}",
            header_line,
            FIELDS.join(","),
            header.fields.join(",")
        )));
    }

    let mut songs = Vec::new();
    for (line_no, raw_row) in lines {
        let (_, song) = all_consuming(parse_row)(raw_row).map_err(|e| located(line_no, e))?;
        songs.push(song);
    }

    if songs.len() != header.row_count as usize {
        return Err(Error::Parse(format!(
            "declared {} rows, found {}",
            header.row_count,
            songs.len()
        )));
    }

    Ok(songs)
}

/// Render songs as a catalog document accepted by [`parse_catalog`]
pub fn render_catalog(songs: &[Song]) -> String {
    let mut out = format!("{}[{}]{{{}}}:\n", COLLECTION, songs.len(), FIELDS.join(","));
    for song in songs {
        out.push_str(&format!(
            "  {},{},{},{},{}\n",
            song.id, song.title, song.artist, song.album, song.duration
        ));
    }
    out
}
