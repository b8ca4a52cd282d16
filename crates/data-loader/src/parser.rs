//! Parser for MovieLens data files.
//!
//! This module handles parsing the .dat files:
//! - users.dat: userId::gender::age::occupation::zipcode
//! - movies.dat: movieId::title::genres
//! - ratings.dat: userId::movieId::rating::timestamp
//!
//! Only the fields the recommendation core consumes are materialized:
//! user id, movie id + title, and the rating triple. Demographics and
//! genre lists are validated for shape and then dropped.

use crate::error::{DataLoadError, Result};
use reco::{MovieId, RatingValue, UserId};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One line of movies.dat, before it becomes a `reco::Movie`
#[derive(Debug, Clone)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
}

/// One line of ratings.dat
#[derive(Debug, Clone, Copy)]
pub struct RatingRecord {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: RatingValue,
    /// Unix timestamp when the rating was made; carried because the file
    /// format has it, unused by the core
    pub timestamp: i64,
}

/// Helper function to read a file with ISO-8859-1 encoding (Latin-1)
///
/// The MovieLens dataset uses ISO-8859-1 encoding, not UTF-8.
/// ISO-8859-1 is a single-byte encoding where each byte directly maps to
/// a Unicode code point, so widening byte-by-byte is a faithful decode.
fn read_lines_latin1(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content: String = bytes.iter().map(|&b| b as char).collect();
    Ok(content.lines().map(|s| s.to_string()).collect())
}

fn parse_error(file: &str, line: usize, reason: impl Into<String>) -> DataLoadError {
    DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: reason.into(),
    }
}

/// Split a line into exactly `expected` "::"-separated fields
fn split_fields<'a>(
    line: &'a str,
    expected: usize,
    file: &str,
    line_no: usize,
) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = line.split("::").collect();
    if fields.len() != expected {
        return Err(parse_error(
            file,
            line_no,
            format!("Expected {} fields, found {}", expected, fields.len()),
        ));
    }
    Ok(fields)
}

fn parse_id(field: &str, name: &str, file: &str, line_no: usize) -> Result<u32> {
    field
        .parse()
        .map_err(|e| parse_error(file, line_no, format!("Invalid {}: {}", name, e)))
}

/// Parse the users.dat file
///
/// Format: userId::gender::age::occupation::zipcode
///
/// The demographic fields are shape-checked but not kept; the core only
/// needs the identity.
pub fn parse_users(path: &Path) -> Result<Vec<UserId>> {
    let lines = read_lines_latin1(path)?;
    let mut users = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue; // Skip empty lines
        }

        let fields = split_fields(line_trimmed, 5, "users.dat", line_no)?;
        users.push(parse_id(fields[0], "userId", "users.dat", line_no)?);
    }

    Ok(users)
}

/// Parse the movies.dat file
///
/// Format: movieId::title::genres
///
/// The title keeps its year suffix ("Toy Story (1995)") as display data;
/// the pipe-separated genre list is not materialized.
pub fn parse_movies(path: &Path) -> Result<Vec<MovieRecord>> {
    let lines = read_lines_latin1(path)?;
    let mut movies = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue; // Skip empty lines
        }

        let fields = split_fields(line_trimmed, 3, "movies.dat", line_no)?;
        movies.push(MovieRecord {
            id: parse_id(fields[0], "movieId", "movies.dat", line_no)?,
            title: fields[1].to_string(),
        });
    }

    Ok(movies)
}

/// Parse the ratings.dat file
///
/// Format: userId::movieId::rating::timestamp
///
/// The rating must parse as an integer in 1..=5; anything else is
/// rejected here, where the file/line context is still at hand.
pub fn parse_ratings(path: &Path) -> Result<Vec<RatingRecord>> {
    let lines = read_lines_latin1(path)?;
    let mut ratings = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue; // Skip empty lines
        }

        let fields = split_fields(line_trimmed, 4, "ratings.dat", line_no)?;
        let rating: RatingValue = fields[2]
            .parse()
            .map_err(|e| parse_error("ratings.dat", line_no, format!("Invalid rating: {}", e)))?;
        if !(1..=5).contains(&rating) {
            return Err(DataLoadError::InvalidValue {
                field: "rating".to_string(),
                value: fields[2].to_string(),
            });
        }

        ratings.push(RatingRecord {
            user_id: parse_id(fields[0], "userId", "ratings.dat", line_no)?,
            movie_id: parse_id(fields[1], "movieId", "ratings.dat", line_no)?,
            rating,
            timestamp: fields[3].parse().map_err(|e| {
                parse_error("ratings.dat", line_no, format!("Invalid timestamp: {}", e))
            })?,
        });
    }

    Ok(ratings)
}
