//! Error types for the reco crate.
//!
//! Every error here is a caller/contract error: the engine is pure
//! computation over an in-memory dataset, so nothing is retried and
//! nothing is swallowed. Degenerate numeric cases (empty overlaps,
//! zero variance) are NOT errors; they resolve to documented fallback
//! values inside the similarity module.

use crate::types::{MovieId, UserId};
use thiserror::Error;

/// Errors surfaced by the recommendation core
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecoError {
    /// A bounded ranking structure was built with zero capacity
    #[error("Top-K capacity must be positive")]
    InvalidCapacity,

    /// A query referenced a user id the dataset does not contain
    #[error("Unknown user: {id}")]
    UnknownUser { id: UserId },

    /// A query (or the aggregation pass) referenced a movie id the
    /// dataset does not contain
    #[error("Unknown movie: {id}")]
    UnknownMovie { id: MovieId },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecoError>;
