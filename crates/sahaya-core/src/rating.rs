//! Feedback types and the rating aggregator's fold.
//!
//! The fold itself is pure; the store applies it inside a single transaction
//! so concurrent submissions for the same scribe cannot lose updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Lowest accepted feedback rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted feedback rating.
pub const MAX_RATING: u8 = 5;

/// Validate a submitted rating against the 1–5 scale.
pub fn validate_rating(rating: u8) -> Result<u8> {
  if (MIN_RATING..=MAX_RATING).contains(&rating) {
    Ok(rating)
  } else {
    Err(Error::RatingOutOfRange(rating))
  }
}

/// Incorporate one new rating into a scribe's running mean.
///
/// Returns the updated `(rating, total_ratings)`: the new mean rounded to one
/// decimal, and the count incremented by one. The count is monotonically
/// non-decreasing.
pub fn fold_rating(
  rating:        f64,
  total_ratings: u32,
  new_rating:    u8,
) -> (f64, u32) {
  let new_total = total_ratings + 1;
  let mean = (rating * total_ratings as f64 + new_rating as f64)
    / new_total as f64;
  ((mean * 10.0).round() / 10.0, new_total)
}

// ─── Feedback ────────────────────────────────────────────────────────────────

/// A student's review of a completed match. Creating one triggers the rating
/// aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
  pub feedback_id:  Uuid,
  pub match_id:     Uuid,
  pub student_id:   String,
  pub scribe_id:    String,
  /// 1–5 integer.
  pub rating:       u8,
  pub comment:      String,
  pub is_anonymous: bool,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::PlatformStore::add_feedback`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
  pub match_id:     Uuid,
  pub student_id:   String,
  pub scribe_id:    String,
  pub rating:       u8,
  pub comment:      String,
  #[serde(default)]
  pub is_anonymous: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fold_rounds_to_one_decimal_and_increments_count() {
    // (4.0 × 10 + 5) / 11 = 4.0909… → 4.1
    let (rating, total) = fold_rating(4.0, 10, 5);
    assert_eq!(rating, 4.1);
    assert_eq!(total, 11);
  }

  #[test]
  fn first_rating_becomes_the_mean() {
    let (rating, total) = fold_rating(0.0, 0, 4);
    assert_eq!(rating, 4.0);
    assert_eq!(total, 1);
  }

  #[test]
  fn fold_count_is_monotonic() {
    let mut rating = 0.0;
    let mut total = 0;
    for r in [5, 3, 4, 4, 2] {
      let prev = total;
      (rating, total) = fold_rating(rating, total, r);
      assert_eq!(total, prev + 1);
    }
    assert!((0.0..=5.0).contains(&rating));
  }

  #[test]
  fn ratings_outside_the_scale_are_rejected() {
    assert!(validate_rating(0).is_err());
    assert!(validate_rating(6).is_err());
    assert_eq!(validate_rating(1).unwrap(), 1);
    assert_eq!(validate_rating(5).unwrap(), 5);
  }
}
