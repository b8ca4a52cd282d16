//! Dataset - the read-only query context.
//!
//! The dataset owns every user and movie for one analysis session and is
//! the explicit context every engine query takes by shared reference.
//! Discipline is exclusive-write-then-read-only: the loader populates it,
//! the aggregation pass runs exactly once, and from then on only `&self`
//! methods are called (which makes parallel querying safe, see the
//! engine integration tests).
//!
//! Rust concepts demonstrated:
//! - BTreeMap for sorted key access (full scans visit ascending ids,
//!   which is what makes similarity tie-breaks deterministic)
//! - Borrowing: getters return `&T` (references) not `T` (owned values)
//! - Disjoint field borrows via destructuring in the aggregation pass

use crate::error::{RecoError, Result};
use crate::types::{Movie, MovieId, RatingValue, User, UserId};
use std::collections::BTreeMap;
use tracing::debug;

/// Owns all users and movies for one analysis session.
#[derive(Debug, Default)]
pub struct Dataset {
    users: BTreeMap<UserId, User>,
    movies: BTreeMap<MovieId, Movie>,
}

impl Dataset {
    /// Creates a new, empty Dataset
    pub fn new() -> Self {
        Self::default()
    }

    // Getters - Note: These return references (&T) not owned values (T)

    /// Get a user by ID
    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// Iterate all users in ascending id order
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Iterate all movies in ascending id order
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    /// Get counts for debugging/validation: (users, movies, ratings)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.users.values().map(|u| u.ratings.len()).sum();
        (self.users.len(), self.movies.len(), total_ratings)
    }

    // Mutators - used during data loading only

    /// Insert a user into the dataset
    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Insert a movie into the dataset
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Record a rating against the user's map.
    ///
    /// Both endpoints must already exist; a dangling reference is a caller
    /// error. Rating a movie twice overwrites the earlier value (one rating
    /// per user-movie pair).
    pub fn add_rating(
        &mut self,
        user_id: UserId,
        movie_id: MovieId,
        rating: RatingValue,
    ) -> Result<()> {
        if !self.movies.contains_key(&movie_id) {
            return Err(RecoError::UnknownMovie { id: movie_id });
        }
        let user = self
            .users
            .get_mut(&user_id)
            .ok_or(RecoError::UnknownUser { id: user_id })?;
        user.ratings.insert(movie_id, rating);
        Ok(())
    }

    /// Aggregation pass: record every user's ratings against the
    /// corresponding movie, populating each movie's per-user rating map.
    ///
    /// Precondition: run exactly once, after loading completes and before
    /// any query. Re-running against an already-aggregated dataset is not
    /// guarded against; for integer ratings a second run overwrites with
    /// identical values, but callers must not rely on that.
    pub fn aggregate_movie_ratings(&mut self) -> Result<()> {
        let Self { users, movies } = self;
        let mut recorded = 0usize;
        for (&user_id, user) in users.iter() {
            for (&movie_id, &rating) in &user.ratings {
                let movie = movies
                    .get_mut(&movie_id)
                    .ok_or(RecoError::UnknownMovie { id: movie_id })?;
                movie.ratings.insert(user_id, rating);
                recorded += 1;
            }
        }
        debug!(recorded, "aggregated movie rating maps");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_dataset() -> Dataset {
        let mut dataset = Dataset::new();
        for id in 1..=3 {
            dataset.insert_user(User::new(id));
        }
        dataset.insert_movie(Movie::new(10, "First (1990)"));
        dataset.insert_movie(Movie::new(20, "Second (1991)"));

        dataset.add_rating(1, 10, 5).unwrap();
        dataset.add_rating(2, 10, 3).unwrap();
        dataset.add_rating(2, 20, 4).unwrap();
        dataset
    }

    #[test]
    fn test_counts() {
        let dataset = loaded_dataset();
        assert_eq!(dataset.counts(), (3, 2, 3));
    }

    #[test]
    fn test_add_rating_rejects_dangling_references() {
        let mut dataset = loaded_dataset();

        assert_eq!(
            dataset.add_rating(99, 10, 4),
            Err(RecoError::UnknownUser { id: 99 })
        );
        assert_eq!(
            dataset.add_rating(1, 99, 4),
            Err(RecoError::UnknownMovie { id: 99 })
        );
    }

    #[test]
    fn test_movie_maps_empty_before_aggregation() {
        let dataset = loaded_dataset();
        assert!(dataset.get_movie(10).unwrap().ratings.is_empty());
    }

    #[test]
    fn test_aggregation_populates_movie_maps() {
        let mut dataset = loaded_dataset();
        dataset.aggregate_movie_ratings().unwrap();

        let first = dataset.get_movie(10).unwrap();
        assert_eq!(first.ratings.len(), 2);
        assert_eq!(first.ratings.get(&1), Some(&5));
        assert_eq!(first.ratings.get(&2), Some(&3));

        let second = dataset.get_movie(20).unwrap();
        assert_eq!(second.ratings.len(), 1);
        assert_eq!(second.ratings.get(&2), Some(&4));

        // User 3 rated nothing, so they appear nowhere
        assert!(!first.ratings.contains_key(&3));
    }

    #[test]
    fn test_scans_are_ascending_by_id() {
        let mut dataset = Dataset::new();
        for id in [30, 10, 20] {
            dataset.insert_movie(Movie::new(id, format!("Movie {}", id)));
        }

        let ids: Vec<MovieId> = dataset.movies().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }
}
