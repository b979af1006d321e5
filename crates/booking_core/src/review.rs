//! crates/booking_core/src/review.rs
//!
//! Who may review a combo: the owner of a confirmed or completed booking for
//! it, once per booking. Checked again on submission; client-side checks are
//! advisory only.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Actor, Booking, BookingTarget, Review};
use crate::error::{BookingError, BookingResult};
use crate::ports::{DatabaseService, PortError};

#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub combo_id: Uuid,
    pub rating: i16,
    pub content: String,
    pub booking_id: Option<Uuid>,
}

/// Ownership and status half of the rule; the "not yet reviewed" half needs storage.
pub fn is_eligible(booking: &Booking, account_id: Uuid) -> bool {
    booking.account_id == account_id && booking.status.is_reviewable()
}

#[derive(Clone)]
pub struct ReviewService {
    db: Arc<dyn DatabaseService>,
}

impl ReviewService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn can_review(&self, booking_id: Uuid, account_id: Uuid) -> BookingResult<bool> {
        let booking = match self.db.get_booking(booking_id).await {
            Ok(booking) => booking,
            Err(PortError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        if !is_eligible(&booking, account_id) {
            return Ok(false);
        }
        Ok(!self.db.review_exists(booking_id, account_id).await?)
    }

    pub async fn create_review(&self, actor: Actor, input: ReviewInput) -> BookingResult<Review> {
        if !(1..=5).contains(&input.rating) {
            return Err(BookingError::Validation("rating must be between 1 and 5".to_string()));
        }
        if input.content.trim().is_empty() {
            return Err(BookingError::Validation("review content is required".to_string()));
        }

        let booking_id = match input.booking_id {
            Some(booking_id) => {
                if !self.can_review(booking_id, actor.account_id).await? {
                    return Err(BookingError::ReviewNotEligible);
                }
                let booking = self.db.get_booking(booking_id).await?;
                if booking.target != BookingTarget::Combo(input.combo_id) {
                    return Err(BookingError::ReviewNotEligible);
                }
                booking_id
            }
            None => self
                .latest_unreviewed_booking(actor.account_id, input.combo_id)
                .await?
                .ok_or(BookingError::ReviewNotEligible)?,
        };

        let review = self
            .db
            .create_review(Review {
                id: Uuid::new_v4(),
                combo_id: input.combo_id,
                author_id: actor.account_id,
                booking_id: Some(booking_id),
                rating: input.rating,
                content: input.content,
                created_at: Utc::now(),
            })
            .await?;
        info!(review_id = %review.id, %booking_id, "Review created");
        Ok(review)
    }

    pub async fn list_reviews(&self, combo_id: Uuid) -> BookingResult<Vec<Review>> {
        Ok(self.db.list_reviews_for_combo(combo_id).await?)
    }

    async fn latest_unreviewed_booking(
        &self,
        account_id: Uuid,
        combo_id: Uuid,
    ) -> BookingResult<Option<Uuid>> {
        let mut bookings: Vec<Booking> = self
            .db
            .list_bookings_for_account(account_id)
            .await?
            .into_iter()
            .filter(|b| b.target == BookingTarget::Combo(combo_id) && is_eligible(b, account_id))
            .collect();
        bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));

        for booking in bookings {
            if !self.db.review_exists(booking.id, account_id).await? {
                return Ok(Some(booking.id));
            }
        }
        Ok(None)
    }
}
