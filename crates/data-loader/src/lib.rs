//! # Data Loader Crate
//!
//! Loads a MovieLens-1M-style directory into a [`reco::Dataset`].
//!
//! ## Main Components
//!
//! - **parser**: Parse the three .dat files into plain records
//! - **error**: Error types with file/line context
//!
//! The loader is the write side of the core's
//! exclusive-write-then-read-only discipline: it builds the dataset
//! through `reco`'s public mutation API and hands it back UNAGGREGATED.
//! The caller invokes [`reco::Dataset::aggregate_movie_ratings`] exactly
//! once before querying.
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::load_dataset;
//! use std::path::Path;
//!
//! let mut dataset = load_dataset(Path::new("data/ml-1m"))?;
//! dataset.aggregate_movie_ratings()?;
//!
//! let (users, movies, ratings) = dataset.counts();
//! println!("{} users, {} movies, {} ratings", users, movies, ratings);
//! ```

pub mod error;
pub mod parser;

pub use error::{DataLoadError, Result};
pub use parser::{MovieRecord, RatingRecord};

use reco::{Dataset, Movie, User};
use std::path::Path;
use tracing::info;

/// Load the entire MovieLens dataset from a directory.
///
/// Parses users.dat, movies.dat, and ratings.dat (in parallel, with
/// nested `rayon::join`) and builds the dataset. Ratings referencing an
/// unknown user or movie fail the load; the returned dataset has NOT had
/// the aggregation pass run on it.
pub fn load_dataset(data_dir: &Path) -> Result<Dataset> {
    let users_path = data_dir.join("users.dat");
    let movies_path = data_dir.join("movies.dat");
    let ratings_path = data_dir.join("ratings.dat");

    // Parse all three files in parallel; rayon::join runs two closures
    // concurrently, nested to get three-way parallelism.
    let ((users, movies), ratings) = rayon::join(
        || {
            rayon::join(
                || parser::parse_users(&users_path),
                || parser::parse_movies(&movies_path),
            )
        },
        || parser::parse_ratings(&ratings_path),
    );
    let users = users?;
    let movies = movies?;
    let ratings = ratings?;

    info!(
        users = users.len(),
        movies = movies.len(),
        ratings = ratings.len(),
        "parsed MovieLens files"
    );

    let mut dataset = Dataset::new();
    for user_id in users {
        dataset.insert_user(User::new(user_id));
    }
    for record in movies {
        dataset.insert_movie(Movie::new(record.id, record.title));
    }
    // add_rating rejects dangling references, so referential integrity
    // holds by the time the dataset is returned
    for record in ratings {
        dataset.add_rating(record.user_id, record.movie_id, record.rating)?;
    }

    let (user_count, movie_count, rating_count) = dataset.counts();
    info!(user_count, movie_count, rating_count, "dataset built");
    Ok(dataset)
}
