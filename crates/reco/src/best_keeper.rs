//! BestKeeper - a bounded, comparator-driven top-K container.
//!
//! Keeps the K best-ranked items ever inserted and discards the rest. The
//! buffer stays sorted best-to-worst, so rejecting a no-better candidate
//! at capacity costs one comparison and accepting one costs a binary
//! search plus an insert (O(log K) to find, O(K) to shift).
//!
//! Rust concepts demonstrated:
//! - Generic types parameterized over a closure (the ordering relation)
//! - `partition_point` for binary search over a custom order
//! - Exclusive ownership of the internal buffer; callers only see slices

use crate::error::{RecoError, Result};
use std::cmp::Ordering;

/// Bounded container retaining the best `capacity` items by comparator rank.
///
/// The comparator is three-way: `Ordering::Less` means the first argument
/// ranks better. Ties are kept first-inserted-first, and an item that ties
/// with the current worst at capacity is discarded.
#[derive(Debug)]
pub struct BestKeeper<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    items: Vec<T>,
    capacity: usize,
    compare: F,
}

impl<T, F> BestKeeper<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    /// Create a keeper holding at most `capacity` items.
    ///
    /// Zero capacity is a contract violation and fails immediately.
    pub fn new(capacity: usize, compare: F) -> Result<Self> {
        if capacity == 0 {
            return Err(RecoError::InvalidCapacity);
        }
        Ok(Self {
            items: Vec::with_capacity(capacity),
            capacity,
            compare,
        })
    }

    /// Offer an item; it is kept only while it ranks among the best seen.
    pub fn add(&mut self, item: T) {
        if self.items.len() == self.capacity {
            // Full: only a strictly better item may evict the current worst.
            match self.items.last() {
                Some(worst) if (self.compare)(&item, worst) == Ordering::Less => {
                    self.items.pop();
                }
                _ => return,
            }
        }
        // Insert after any equal-ranked items so first-in wins ties.
        let position = self
            .items
            .partition_point(|held| (self.compare)(held, &item) != Ordering::Greater);
        self.items.insert(position, item);
    }

    /// Best-to-worst view of everything currently held.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consume the keeper, yielding the best-to-worst snapshot.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
