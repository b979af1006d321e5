//! services/api/src/web/reviews.rs
//!
//! Review endpoints. Eligibility is always checked server-side.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use booking_core::domain::Actor;
use booking_core::ReviewInput;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::dto::{CanReviewResponse, CreateReviewRequest, ReviewResponse};
use crate::web::state::AppState;

/// GET /review/booking/{id}/user/{account_id}/can-review
#[utoipa::path(
    get,
    path = "/review/booking/{id}/user/{account_id}/can-review",
    params(
        ("id" = Uuid, Path, description = "Booking id"),
        ("account_id" = Uuid, Path, description = "Account that wants to review")
    ),
    responses((status = 200, description = "Whether a review may be written", body = CanReviewResponse))
)]
pub async fn can_review_handler(
    State(state): State<Arc<AppState>>,
    Path((booking_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CanReviewResponse>, ApiError> {
    let can_review = state.reviews.can_review(booking_id, account_id).await?;
    Ok(Json(CanReviewResponse {
        booking_id,
        account_id,
        can_review,
    }))
}

/// POST /review - Write a review for a combo the caller has booked
#[utoipa::path(
    post,
    path = "/review",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Invalid rating or content", body = ErrorBody),
        (status = 422, description = "No eligible booking", body = ErrorBody)
    )
)]
pub async fn create_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let review = state
        .reviews
        .create_review(
            actor,
            ReviewInput {
                combo_id: req.combo_id,
                rating: req.rating,
                content: req.content,
                booking_id: req.booking_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

/// GET /combos/{id}/reviews - Reviews of a combo, newest first
#[utoipa::path(
    get,
    path = "/combos/{id}/reviews",
    params(("id" = Uuid, Path, description = "Combo id")),
    responses((status = 200, description = "Reviews of the combo", body = [ReviewResponse]))
)]
pub async fn list_reviews_handler(
    State(state): State<Arc<AppState>>,
    Path(combo_id): Path<Uuid>,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let reviews = state.reviews.list_reviews(combo_id).await?;
    Ok(Json(reviews.into_iter().map(Into::into).collect()))
}
