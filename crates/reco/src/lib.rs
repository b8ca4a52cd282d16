//! # Reco Crate
//!
//! The collaborative-filtering core: similarity metrics, a bounded top-K
//! ranking structure, and the recommendation queries built on them. This
//! crate does no I/O; it consumes an already-populated [`Dataset`] and
//! answers pure queries against it.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (User, Movie, SimilarMovie, SimilarUser)
//! - **dataset**: The read-only query context plus the aggregation pass
//! - **similarity**: Pearson and Euclidean-derived similarity metrics
//! - **best_keeper**: Generic bounded top-K container
//! - **engine**: The four recommendation queries
//! - **error**: Error types for contract violations
//!
//! ## Example Usage
//!
//! ```
//! use reco::{engine, Dataset, Movie, User};
//!
//! let mut dataset = Dataset::new();
//! dataset.insert_user(User::new(1));
//! dataset.insert_user(User::new(2));
//! dataset.insert_movie(Movie::new(1, "Toy Story (1995)"));
//! dataset.add_rating(1, 1, 5)?;
//! dataset.add_rating(2, 1, 4)?;
//!
//! // Run the aggregation pass exactly once, then query freely
//! dataset.aggregate_movie_ratings()?;
//! let neighbors = engine::similar_users(&dataset, 1, 10)?;
//! let recommended = engine::recommend_from_user(&dataset, 1, &neighbors, 5)?;
//! assert!(recommended.is_empty()); // the lone neighbor rated nothing new
//! # Ok::<(), reco::RecoError>(())
//! ```

// Public modules
pub mod best_keeper;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod similarity;
pub mod types;

// Re-export commonly used types for convenience
pub use best_keeper::BestKeeper;
pub use dataset::Dataset;
pub use error::{RecoError, Result};
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    RatingValue,
    // Core types
    User,
    Movie,
    // Query results
    SimilarMovie,
    SimilarUser,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::new();
        assert_eq!(dataset.counts(), (0, 0, 0));
        assert!(dataset.get_user(1).is_none());
        assert!(dataset.get_movie(1).is_none());
    }

    #[test]
    fn test_insert_and_get() {
        let mut dataset = Dataset::new();
        dataset.insert_user(User::new(1));
        dataset.insert_movie(Movie::new(1193, "One Flew Over the Cuckoo's Nest (1975)"));
        dataset.add_rating(1, 1193, 5).unwrap();

        let user = dataset.get_user(1).unwrap();
        assert_eq!(user.ratings.get(&1193), Some(&5));

        let movie = dataset.get_movie(1193).unwrap();
        assert_eq!(movie.title, "One Flew Over the Cuckoo's Nest (1975)");
    }
}
