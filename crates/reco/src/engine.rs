//! Recommendation queries.
//!
//! Stateless free functions over an explicit `&Dataset` context: every call
//! is a pure, idempotent query against the current snapshot, so nothing
//! here holds state between calls and concurrent callers can share one
//! dataset freely.
//!
//! Ordering is deterministic throughout: full scans visit entities in
//! ascending id order and the keeper keeps the first-inserted item on
//! ties, so equal similarities resolve to the lower id; recommendation
//! ranking sorts by (score descending, id ascending) explicitly.

use crate::best_keeper::BestKeeper;
use crate::dataset::Dataset;
use crate::error::{RecoError, Result};
use crate::similarity::{movie_pearson, user_pearson};
use crate::types::{MovieId, SimilarMovie, SimilarUser, UserId};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

fn higher_similarity(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// The `k` movies most similar to `target`, best first.
///
/// Scans every other movie in the dataset and ranks by Pearson similarity
/// over common raters. The target itself is excluded by id.
#[instrument(skip(dataset))]
pub fn similar_movies(dataset: &Dataset, target: MovieId, k: usize) -> Result<Vec<SimilarMovie>> {
    let target_movie = dataset
        .get_movie(target)
        .ok_or(RecoError::UnknownMovie { id: target })?;

    let mut best = BestKeeper::new(k, |a: &SimilarMovie, b: &SimilarMovie| {
        higher_similarity(a.similarity, b.similarity)
    })?;
    for other in dataset.movies() {
        if other.id == target {
            continue;
        }
        best.add(SimilarMovie {
            movie_id: other.id,
            similarity: movie_pearson(target_movie, other),
        });
    }

    debug!(target, kept = best.len(), "ranked movie neighborhood");
    Ok(best.into_vec())
}

/// The `k` users most similar to `target`, best first.
#[instrument(skip(dataset))]
pub fn similar_users(dataset: &Dataset, target: UserId, k: usize) -> Result<Vec<SimilarUser>> {
    let target_user = dataset
        .get_user(target)
        .ok_or(RecoError::UnknownUser { id: target })?;

    let mut best = BestKeeper::new(k, |a: &SimilarUser, b: &SimilarUser| {
        higher_similarity(a.similarity, b.similarity)
    })?;
    for other in dataset.users() {
        if other.id == target {
            continue;
        }
        best.add(SimilarUser {
            user_id: other.id,
            similarity: user_pearson(target_user, other),
        });
    }

    debug!(target, kept = best.len(), "ranked user neighborhood");
    Ok(best.into_vec())
}

/// Item-based recommendation: rank the neighbor movies themselves.
///
/// Each neighbor (target excluded, movies nobody rated excluded) is scored
/// by the mean of its own ratings; the neighbor's similarity to the target
/// deliberately does not enter the score. Returns the top `k` movie ids,
/// score descending, lower id first on ties.
#[instrument(skip(dataset, neighbors), fields(neighbors = neighbors.len()))]
pub fn recommend_from_movie(
    dataset: &Dataset,
    target: MovieId,
    neighbors: &[SimilarMovie],
    k: usize,
) -> Result<Vec<MovieId>> {
    if dataset.get_movie(target).is_none() {
        return Err(RecoError::UnknownMovie { id: target });
    }

    // BTreeMap collapses duplicate neighbor ids and keeps candidates in
    // ascending id order for the stable sort below.
    let mut scores: BTreeMap<MovieId, f64> = BTreeMap::new();
    for neighbor in neighbors {
        if neighbor.movie_id == target {
            continue;
        }
        let movie = dataset
            .get_movie(neighbor.movie_id)
            .ok_or(RecoError::UnknownMovie {
                id: neighbor.movie_id,
            })?;
        if let Some(mean) = movie.mean_rating() {
            scores.insert(movie.id, mean);
        }
    }

    Ok(rank_descending(scores, k))
}

/// User-based recommendation: rank movies the neighbors rated.
///
/// For every movie any neighbor rated that the target has not, the score
/// is the plain sum of the neighbors' ratings: unnormalized by count and
/// unweighted by neighbor similarity. Returns the top `k` movie ids,
/// score descending, lower id first on ties.
#[instrument(skip(dataset, neighbors), fields(neighbors = neighbors.len()))]
pub fn recommend_from_user(
    dataset: &Dataset,
    target: UserId,
    neighbors: &[SimilarUser],
    k: usize,
) -> Result<Vec<MovieId>> {
    let target_user = dataset
        .get_user(target)
        .ok_or(RecoError::UnknownUser { id: target })?;

    let mut scores: BTreeMap<MovieId, i64> = BTreeMap::new();
    for neighbor in neighbors {
        let user = dataset
            .get_user(neighbor.user_id)
            .ok_or(RecoError::UnknownUser {
                id: neighbor.user_id,
            })?;
        for (&movie_id, &rating) in &user.ratings {
            if target_user.ratings.contains_key(&movie_id) {
                continue;
            }
            *scores.entry(movie_id).or_insert(0) += rating as i64;
        }
    }

    Ok(rank_descending(scores, k))
}

/// Sort candidates score-descending (lower id first on ties) and keep `k`.
fn rank_descending<S: PartialOrd + Copy>(scores: BTreeMap<MovieId, S>, k: usize) -> Vec<MovieId> {
    let mut ranked: Vec<(MovieId, S)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(k);
    ranked.into_iter().map(|(movie_id, _)| movie_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Movie, User};

    /// Three users, four movies. Users 1 and 2 agree closely, user 3
    /// rates against the grain; movie 4 is rated by nobody.
    fn create_test_dataset() -> Dataset {
        let mut dataset = Dataset::new();
        for id in 1..=3 {
            dataset.insert_user(User::new(id));
        }
        for id in 1..=4 {
            dataset.insert_movie(Movie::new(id, format!("Movie {}", id)));
        }

        // user 1: likes 1 and 2, dislikes 3
        dataset.add_rating(1, 1, 5).unwrap();
        dataset.add_rating(1, 2, 4).unwrap();
        dataset.add_rating(1, 3, 1).unwrap();
        // user 2: close to user 1
        dataset.add_rating(2, 1, 4).unwrap();
        dataset.add_rating(2, 2, 5).unwrap();
        dataset.add_rating(2, 3, 2).unwrap();
        // user 3: the opposite taste
        dataset.add_rating(3, 1, 1).unwrap();
        dataset.add_rating(3, 2, 2).unwrap();
        dataset.add_rating(3, 3, 5).unwrap();

        dataset.aggregate_movie_ratings().unwrap();
        dataset
    }

    #[test]
    fn test_similar_movies_excludes_target() {
        let dataset = create_test_dataset();
        let similar = similar_movies(&dataset, 1, 10).unwrap();

        assert_eq!(similar.len(), 3);
        assert!(similar.iter().all(|s| s.movie_id != 1));
    }

    #[test]
    fn test_similar_movies_best_first() {
        let dataset = create_test_dataset();
        let similar = similar_movies(&dataset, 1, 10).unwrap();

        for pair in similar.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        // Movie 3 is rated inversely to movie 1 everywhere
        assert_eq!(similar.last().unwrap().movie_id, 3);
    }

    #[test]
    fn test_similar_users_ranks_agreeing_user_first() {
        let dataset = create_test_dataset();
        let similar = similar_users(&dataset, 1, 2).unwrap();

        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0].user_id, 2);
        assert!(similar[0].similarity > similar[1].similarity);
    }

    #[test]
    fn test_unknown_targets_are_errors() {
        let dataset = create_test_dataset();

        assert_eq!(
            similar_movies(&dataset, 99, 5).unwrap_err(),
            RecoError::UnknownMovie { id: 99 }
        );
        assert_eq!(
            similar_users(&dataset, 99, 5).unwrap_err(),
            RecoError::UnknownUser { id: 99 }
        );
        assert_eq!(
            recommend_from_movie(&dataset, 99, &[], 5).unwrap_err(),
            RecoError::UnknownMovie { id: 99 }
        );
        assert_eq!(
            recommend_from_user(&dataset, 99, &[], 5).unwrap_err(),
            RecoError::UnknownUser { id: 99 }
        );
    }

    #[test]
    fn test_unknown_neighbor_is_an_error_not_a_skip() {
        let dataset = create_test_dataset();
        let neighbors = vec![SimilarMovie {
            movie_id: 99,
            similarity: 0.9,
        }];

        assert_eq!(
            recommend_from_movie(&dataset, 1, &neighbors, 5).unwrap_err(),
            RecoError::UnknownMovie { id: 99 }
        );
    }

    #[test]
    fn test_zero_capacity_neighborhood_is_an_error() {
        let dataset = create_test_dataset();
        assert_eq!(
            similar_movies(&dataset, 1, 0).unwrap_err(),
            RecoError::InvalidCapacity
        );
    }

    #[test]
    fn test_recommend_from_movie_scores_by_mean_rating() {
        let dataset = create_test_dataset();
        let neighbors = vec![
            SimilarMovie {
                movie_id: 2,
                similarity: 0.9,
            },
            SimilarMovie {
                movie_id: 3,
                similarity: 0.1,
            },
        ];

        // Means: movie 2 = (4+5+2)/3 ≈ 3.67, movie 3 = (1+2+5)/3 ≈ 2.67.
        // Similarity must not reorder them.
        let recommended = recommend_from_movie(&dataset, 1, &neighbors, 10).unwrap();
        assert_eq!(recommended, vec![2, 3]);
    }

    #[test]
    fn test_recommend_from_movie_excludes_target_and_unrated() {
        let dataset = create_test_dataset();
        let neighbors = vec![
            SimilarMovie {
                movie_id: 1,
                similarity: 1.0,
            },
            SimilarMovie {
                movie_id: 4,
                similarity: 0.8,
            },
            SimilarMovie {
                movie_id: 2,
                similarity: 0.5,
            },
        ];

        // Movie 1 is the target, movie 4 has no ratings at all
        let recommended = recommend_from_movie(&dataset, 1, &neighbors, 10).unwrap();
        assert_eq!(recommended, vec![2]);
    }

    #[test]
    fn test_recommend_from_user_sums_neighbor_ratings() {
        let mut dataset = Dataset::new();
        for id in 1..=3 {
            dataset.insert_user(User::new(id));
        }
        dataset.insert_movie(Movie::new(1, "Seen (1990)"));
        dataset.insert_movie(Movie::new(2, "Unseen (1991)"));

        // Target rated movie 1 only; both neighbors rated movie 2
        dataset.add_rating(1, 1, 5).unwrap();
        dataset.add_rating(2, 1, 4).unwrap();
        dataset.add_rating(2, 2, 4).unwrap();
        dataset.add_rating(3, 2, 3).unwrap();
        dataset.aggregate_movie_ratings().unwrap();

        let neighbors = vec![
            SimilarUser {
                user_id: 2,
                similarity: 0.9,
            },
            SimilarUser {
                user_id: 3,
                similarity: 0.4,
            },
        ];

        // Movie 2 accumulates 4 + 3 = 7; movie 1 is already rated
        let recommended = recommend_from_user(&dataset, 1, &neighbors, 10).unwrap();
        assert_eq!(recommended, vec![2]);
    }

    #[test]
    fn test_recommend_ties_break_toward_lower_id() {
        let mut dataset = Dataset::new();
        dataset.insert_user(User::new(1));
        dataset.insert_user(User::new(2));
        dataset.insert_movie(Movie::new(7, "Late (1995)"));
        dataset.insert_movie(Movie::new(3, "Early (1994)"));

        // Neighbor rates both candidates identically
        dataset.add_rating(2, 7, 4).unwrap();
        dataset.add_rating(2, 3, 4).unwrap();
        dataset.aggregate_movie_ratings().unwrap();

        let neighbors = vec![SimilarUser {
            user_id: 2,
            similarity: 0.5,
        }];
        let recommended = recommend_from_user(&dataset, 1, &neighbors, 10).unwrap();
        assert_eq!(recommended, vec![3, 7]);
    }

    #[test]
    fn test_recommend_with_zero_k_is_empty() {
        let dataset = create_test_dataset();
        let neighbors = vec![SimilarMovie {
            movie_id: 2,
            similarity: 0.9,
        }];

        assert!(recommend_from_movie(&dataset, 1, &neighbors, 0)
            .unwrap()
            .is_empty());
        assert!(recommend_from_user(&dataset, 1, &[], 0).unwrap().is_empty());
    }
}
