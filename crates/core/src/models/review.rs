//! Product reviews.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ProductId, Rating, ReviewId, UserId};

/// A product review.
///
/// `user_name` is copied from the author at creation time and is not
/// updated if the author later changes their name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: Rating,
    pub title: String,
    pub comment: String,
    pub user_name: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: Rating,
    pub title: String,
    pub comment: String,
}

/// Partial review update by its author.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub rating: Option<Rating>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

impl Review {
    /// Apply a partial update in place, stamping `updated_at`.
    pub fn apply(&mut self, update: ReviewUpdate, now: DateTime<Utc>) {
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(comment) = update.comment {
            self.comment = comment;
        }
        self.updated_at = now;
    }
}

/// Aggregate rating figures for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    /// Mean rating rounded to one decimal, `0.0` without reviews.
    pub average_rating: f64,
    pub total_reviews: usize,
    /// Count per star value; always holds keys 1 through 5.
    pub rating_distribution: BTreeMap<u8, usize>,
}

impl ReviewStats {
    /// Compute stats from a set of ratings.
    #[must_use]
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        let mut rating_distribution: BTreeMap<u8, usize> =
            (Rating::MIN..=Rating::MAX).map(|stars| (stars, 0)).collect();
        let mut total_reviews = 0_usize;
        let mut sum = 0_u64;

        for rating in ratings {
            *rating_distribution.entry(rating.stars()).or_default() += 1;
            total_reviews += 1;
            sum += u64::from(rating.stars());
        }

        #[allow(clippy::cast_precision_loss)]
        let average_rating = if total_reviews == 0 {
            0.0
        } else {
            let mean = sum as f64 / total_reviews as f64;
            (mean * 10.0).round() / 10.0
        };

        Self {
            average_rating,
            total_reviews,
            rating_distribution,
        }
    }
}
