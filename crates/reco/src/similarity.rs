//! Pairwise similarity metrics.
//!
//! Pure functions over two entities' rating maps. Degenerate inputs never
//! error; they resolve to fixed fallback values:
//!
//! | case                                | result                       |
//! |-------------------------------------|------------------------------|
//! | no common ratings (Pearson)         | 0.0                          |
//! | one common rating, movies           | 0.0                          |
//! | one common rating, users            | Euclidean-derived similarity |
//! | zero variance on both sides         | 1.0                          |
//! | no common ratings (distance)        | +infinity                    |

use crate::types::{Movie, RatingValue, User};

/// Running sums over paired ratings restricted to the common keys.
#[derive(Debug, Default)]
struct PairedSums {
    n: usize,
    sum_x: f64,
    sum_y: f64,
    sum_x2: f64,
    sum_y2: f64,
    sum_xy: f64,
}

impl PairedSums {
    fn over(pairs: impl Iterator<Item = (RatingValue, RatingValue)>) -> Self {
        let mut sums = Self::default();
        for (rx, ry) in pairs {
            let (x, y) = (rx as f64, ry as f64);
            sums.n += 1;
            sums.sum_x += x;
            sums.sum_y += y;
            sums.sum_x2 += x * x;
            sums.sum_y2 += y * y;
            sums.sum_xy += x * y;
        }
        sums
    }

    /// Pearson correlation coefficient from the accumulated sums.
    ///
    /// Only meaningful for n >= 2; callers handle the 0/1 cases first.
    /// A ~0 denominator means both sides rated every common item
    /// identically (zero variance); that reads as perfect agreement, 1.0.
    fn pearson(&self) -> f64 {
        let n = self.n as f64;
        let numerator = self.sum_xy - self.sum_x * self.sum_y / n;
        // Clamp at zero: float jitter on a genuinely constant vector can
        // leave a tiny negative variance, and sqrt of that would be NaN.
        let var_x = (self.sum_x2 - self.sum_x * self.sum_x / n).max(0.0);
        let var_y = (self.sum_y2 - self.sum_y * self.sum_y / n).max(0.0);
        let denominator = (var_x * var_y).sqrt();
        if denominator < f64::EPSILON {
            return 1.0;
        }
        numerator / denominator
    }
}

/// Pearson similarity between two movies over their common raters.
///
/// Returns 0.0 for zero or one common rater: a single shared rater is no
/// signal for items, so it is treated like no overlap at all.
pub fn movie_pearson(a: &Movie, b: &Movie) -> f64 {
    let sums = PairedSums::over(
        a.ratings
            .iter()
            .filter_map(|(user_id, &ra)| b.ratings.get(user_id).map(|&rb| (ra, rb))),
    );
    match sums.n {
        0 | 1 => 0.0,
        _ => sums.pearson(),
    }
}

/// Pearson similarity between two users over their commonly-rated movies.
///
/// Pearson is undefined on one sample, so a single common movie falls back
/// to [`euclidean_similarity`] instead of returning 0.
pub fn user_pearson(a: &User, b: &User) -> f64 {
    let sums = PairedSums::over(
        a.ratings
            .iter()
            .filter_map(|(movie_id, &ra)| b.ratings.get(movie_id).map(|&rb| (ra, rb))),
    );
    match sums.n {
        0 => 0.0,
        1 => euclidean_similarity(a, b),
        _ => sums.pearson(),
    }
}

/// Sum of squared rating differences over the movies both users rated.
///
/// No common movie means the comparison is undefined and the distance is
/// +infinity, which is distinct from Pearson's 0 for the same overlap.
/// A user with zero ratings compared against itself is at distance 0.
pub fn euclidean_distance(a: &User, b: &User) -> f64 {
    if a.id == b.id && a.ratings.is_empty() {
        return 0.0;
    }
    let mut sum_square = 0.0;
    let mut any_common = false;
    for (movie_id, &ra) in &a.ratings {
        if let Some(&rb) = b.ratings.get(movie_id) {
            any_common = true;
            let diff = (ra - rb) as f64;
            sum_square += diff * diff;
        }
    }
    if any_common {
        sum_square
    } else {
        f64::INFINITY
    }
}

/// Maps [`euclidean_distance`] into (0, 1]: distance 0 becomes 1 and
/// +infinity becomes exactly 0.
pub fn euclidean_similarity(a: &User, b: &User) -> f64 {
    1.0 / (1.0 + euclidean_distance(a, b))
}
