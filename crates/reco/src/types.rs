//! Core domain types for the recommendation engine.
//!
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (UserId, MovieId, RatingValue)
//! - Structs owning their rating maps outright
//! - Derive macros for common traits

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with movie IDs

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// A single rating value on the 1-5 scale
pub type RatingValue = i32;

// =============================================================================
// Entities
// =============================================================================

/// A user and the ratings they have given.
///
/// The identity is fixed at construction; the rating map is populated
/// through [`crate::Dataset::add_rating`] during data load and is treated
/// as read-only once queries start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Ratings given by this user, keyed by movie (one rating per movie)
    pub ratings: HashMap<MovieId, RatingValue>,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            ratings: HashMap::new(),
        }
    }
}

/// A movie and the ratings it has received.
///
/// The per-user rating map stays empty until
/// [`crate::Dataset::aggregate_movie_ratings`] runs; item-based similarity
/// queries are meaningless before that pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    /// Display title, e.g. "Toy Story (1995)". The engine never reads it.
    pub title: String,
    /// Ratings received by this movie, keyed by user
    pub ratings: HashMap<UserId, RatingValue>,
}

impl Movie {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ratings: HashMap::new(),
        }
    }

    /// Mean of all ratings this movie has received, or `None` if it has none.
    pub fn mean_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let total: i64 = self.ratings.values().map(|&r| r as i64).sum();
        Some(total as f64 / self.ratings.len() as f64)
    }
}

// =============================================================================
// Query Results
// =============================================================================

/// A movie paired with its similarity to some query movie.
///
/// Produced by [`crate::engine::similar_movies`]; never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarMovie {
    pub movie_id: MovieId,
    /// Pearson similarity in [-1, 1]
    pub similarity: f64,
}

/// A user paired with their similarity to some query user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarUser {
    pub user_id: UserId,
    /// Pearson similarity in [-1, 1] (Euclidean fallback for one-movie overlaps)
    pub similarity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_rating_empty() {
        let movie = Movie::new(1, "Unseen (1999)");
        assert_eq!(movie.mean_rating(), None);
    }

    #[test]
    fn test_mean_rating_true_division() {
        let mut movie = Movie::new(1, "Half Star (2001)");
        movie.ratings.insert(1, 4);
        movie.ratings.insert(2, 5);

        // 9 / 2 must be 4.5, not integer-truncated
        assert_eq!(movie.mean_rating(), Some(4.5));
    }
}
