//! Product review route handlers.
//!
//! Anyone can read reviews; writing requires a logged-in shopper, and only
//! the author may edit or delete a review.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use makhana_core::models::{NewReview, Review, ReviewStats, ReviewUpdate, User};
use makhana_core::{ProductId, Rating, ReviewId};

use super::message;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

const MAX_TITLE_LENGTH: usize = 100;
const MAX_COMMENT_LENGTH: usize = 1000;

/// Review form. The author comes from the session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewForm {
    pub product_id: ProductId,
    pub rating: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
}

/// Partial review edit.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewPatch {
    pub rating: Option<i64>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Review not found or not authorized".to_string())
}

fn check_rating(rating: i64, errors: &mut Vec<String>) -> Option<Rating> {
    Rating::try_from(rating)
        .inspect_err(|_| errors.push("Rating must be between 1 and 5".to_string()))
        .ok()
}

fn check_text(label: &str, text: &str, max: usize, errors: &mut Vec<String>) {
    let length = text.trim().chars().count();
    if length == 0 {
        errors.push(format!("{label} is required"));
    } else if length > max {
        errors.push(format!("{label} must be at most {max} characters"));
    }
}

impl ReviewForm {
    fn validate(self, user: &User) -> Result<NewReview> {
        let mut errors = Vec::new();
        let rating = check_rating(self.rating, &mut errors);
        check_text("Title", &self.title, MAX_TITLE_LENGTH, &mut errors);
        check_text("Comment", &self.comment, MAX_COMMENT_LENGTH, &mut errors);

        match rating {
            Some(rating) if errors.is_empty() => Ok(NewReview {
                product_id: self.product_id,
                user_id: user.id,
                rating,
                title: self.title.trim().to_string(),
                comment: self.comment.trim().to_string(),
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

impl ReviewPatch {
    fn validate(self) -> Result<ReviewUpdate> {
        let mut errors = Vec::new();
        let rating = self.rating.and_then(|r| check_rating(r, &mut errors));
        if let Some(title) = &self.title {
            check_text("Title", title, MAX_TITLE_LENGTH, &mut errors);
        }
        if let Some(comment) = &self.comment {
            check_text("Comment", comment, MAX_COMMENT_LENGTH, &mut errors);
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(ReviewUpdate {
            rating,
            title: self.title.map(|t| t.trim().to_string()),
            comment: self.comment.map(|c| c.trim().to_string()),
        })
    }
}

/// Reviews of a product, newest first.
pub async fn for_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Json<Vec<Review>> {
    Json(state.storage().product_reviews(product_id).await)
}

/// Rating summary of a product.
pub async fn stats(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Json<ReviewStats> {
    Json(state.storage().product_review_stats(product_id).await)
}

/// Reviews written by the logged-in shopper.
pub async fn mine(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Json<Vec<Review>> {
    Json(state.storage().user_reviews(user.id).await)
}

/// Review a product. One review per shopper per product.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(form): Json<ReviewForm>,
) -> Result<(StatusCode, Json<Review>)> {
    let new = form.validate(&user)?;
    let review = state.storage().create_review(new).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Edit the caller's own review.
#[instrument(skip_all, fields(user_id = %user.id, review_id = %id))]
pub async fn update(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
    Json(patch): Json<ReviewPatch>,
) -> Result<Json<Review>> {
    let update = patch.validate()?;
    state
        .storage()
        .update_review(id, user.id, update)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Delete the caller's own review.
#[instrument(skip_all, fields(user_id = %user.id, review_id = %id))]
pub async fn destroy(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<Json<Value>> {
    if state.storage().delete_review(id, user.id).await? {
        Ok(message("Review deleted successfully"))
    } else {
        Err(not_found())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use makhana_core::{Email, UserId};

    use super::*;

    fn user() -> User {
        User {
            id: UserId::new(1),
            name: "Alice".to_string(),
            email: Email::parse("alice@example.com").unwrap(),
            password_hash: String::new(),
            wishlist: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn form(rating: i64, title: &str, comment: &str) -> ReviewForm {
        ReviewForm {
            product_id: ProductId::new(1),
            rating,
            title: title.to_string(),
            comment: comment.to_string(),
        }
    }

    #[test]
    fn test_valid_review_form() {
        let new = form(5, " Great ", "Crunchy").validate(&user()).unwrap();
        assert_eq!(new.user_id, UserId::new(1));
        assert_eq!(new.rating.stars(), 5);
        assert_eq!(new.title, "Great");
    }

    #[test]
    fn test_review_form_limits() {
        let long_title = "x".repeat(MAX_TITLE_LENGTH + 1);
        let Err(AppError::Validation(errors)) = form(0, &long_title, "").validate(&user()) else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 3);

        assert!(form(1, &"x".repeat(MAX_TITLE_LENGTH), "ok")
            .validate(&user())
            .is_ok());
    }

    #[test]
    fn test_patch_validation() {
        let update = ReviewPatch {
            rating: Some(4),
            ..ReviewPatch::default()
        }
        .validate()
        .unwrap();
        assert_eq!(update.rating.unwrap().stars(), 4);
        assert!(update.title.is_none());

        let err = ReviewPatch {
            comment: Some("  ".to_string()),
            ..ReviewPatch::default()
        }
        .validate();
        assert!(matches!(err, Err(AppError::Validation(_))));
    }
}
