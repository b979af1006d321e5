//! crates/booking_core/src/payments.rs
//!
//! Payment records against a booking. Settlement happens through an external
//! provider callback; this module only opens `pending` records and lists them.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Actor, BookingStatus, Payment, PaymentStatus};
use crate::error::{BookingError, BookingResult};
use crate::ports::{DatabaseService, PortError};

#[derive(Clone)]
pub struct PaymentService {
    db: Arc<dyn DatabaseService>,
}

impl PaymentService {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn create_payment(
        &self,
        actor: Actor,
        booking_id: Uuid,
        method: String,
    ) -> BookingResult<Payment> {
        if method.trim().is_empty() {
            return Err(BookingError::Validation("payment method is required".to_string()));
        }
        let booking = self.db.get_booking(booking_id).await.map_err(|e| match e {
            PortError::NotFound(_) => BookingError::BookingNotFound(booking_id),
            other => other.into(),
        })?;
        if booking.account_id != actor.account_id {
            return Err(BookingError::Unauthorized);
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(BookingError::BookingCancelled(booking_id));
        }

        let payment = self
            .db
            .create_payment(Payment {
                id: Uuid::new_v4(),
                booking_id,
                amount: booking.total_amount,
                method,
                status: PaymentStatus::Pending,
                created_at: Utc::now(),
                paid_at: None,
            })
            .await?;
        info!(payment_id = %payment.id, %booking_id, amount = %payment.amount, "Payment opened");
        Ok(payment)
    }

    pub async fn list_payments(&self, actor: Actor, booking_id: Uuid) -> BookingResult<Vec<Payment>> {
        let booking = self.db.get_booking(booking_id).await.map_err(|e| match e {
            PortError::NotFound(_) => BookingError::BookingNotFound(booking_id),
            other => other.into(),
        })?;
        if booking.account_id != actor.account_id && !actor.is_admin() {
            return Err(BookingError::Unauthorized);
        }
        Ok(self.db.list_payments(booking_id).await?)
    }
}
