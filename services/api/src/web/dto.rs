//! services/api/src/web/dto.rs
//!
//! JSON payloads of the REST API. The core crate stays serialization-free, so
//! every response type here is built from its domain counterpart.

use booking_core::domain::{
    Booking, BookingCoupon, BookingDetail, BookingTarget, Coupon, Payment, Review, Service,
    ServiceCombo, ServiceComboDetail,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ComboDetailRequest {
    pub service_id: Uuid,
    pub quantity: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateComboRequest {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[schema(value_type = String, example = "200000")]
    pub price: Decimal,
    pub available_slots: i32,
    #[serde(default)]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub cancellation_policy: Option<String>,
    #[serde(default)]
    pub details: Vec<ComboDetailRequest>,
}

#[derive(Deserialize, ToSchema)]
pub struct ComboStatusRequest {
    /// `open`, `closed`, or any host-defined status.
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct ComboDetailResponse {
    pub service_id: Uuid,
    pub quantity: i32,
}

#[derive(Serialize, ToSchema)]
pub struct ComboResponse {
    pub id: Uuid,
    pub host_id: Uuid,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub available_slots: i32,
    pub capacity: Option<i32>,
    pub status: String,
    pub cancellation_policy: Option<String>,
    pub created_at: DateTime<Utc>,
    pub details: Vec<ComboDetailResponse>,
}

impl ComboResponse {
    pub fn new(combo: ServiceCombo, details: Vec<ServiceComboDetail>) -> Self {
        Self {
            id: combo.id,
            host_id: combo.host_id,
            name: combo.name,
            address: combo.address,
            description: combo.description,
            price: combo.price,
            available_slots: combo.available_slots,
            capacity: combo.capacity,
            status: combo.status.as_str().to_string(),
            cancellation_policy: combo.cancellation_policy,
            created_at: combo.created_at,
            details: details
                .into_iter()
                .map(|d| ComboDetailResponse {
                    service_id: d.service_id,
                    quantity: d.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ComboRemovalResponse {
    pub combo_id: Uuid,
    /// `deleted`, or `archived` when the combo still has booking history.
    pub outcome: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub name: String,
    #[schema(value_type = String, example = "150000")]
    pub price: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct ServiceResponse {
    pub id: Uuid,
    pub host_id: Uuid,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
}

impl From<Service> for ServiceResponse {
    fn from(service: Service) -> Self {
        Self {
            id: service.id,
            host_id: service.host_id,
            name: service.name,
            price: service.price,
        }
    }
}

//=========================================================================================
// Coupons
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateCouponRequest {
    pub combo_id: Uuid,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "15")]
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Decimal>,
    pub usage_limit: i32,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct CouponResponse {
    pub id: Uuid,
    pub combo_id: Uuid,
    pub code: String,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub discount_percent: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub discount_amount: Option<Decimal>,
    pub usage_limit: i32,
    pub usage_count: i32,
    pub is_active: bool,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl From<Coupon> for CouponResponse {
    fn from(coupon: Coupon) -> Self {
        Self {
            id: coupon.id,
            combo_id: coupon.combo_id,
            code: coupon.code,
            description: coupon.description,
            discount_percent: coupon.discount_percent,
            discount_amount: coupon.discount_amount,
            usage_limit: coupon.usage_limit,
            usage_count: coupon.usage_count,
            is_active: coupon.is_active,
            expiry_date: coupon.expiry_date,
        }
    }
}

//=========================================================================================
// Bookings
//=========================================================================================

/// Exactly one of `combo_id` / `service_id` must be given.
#[derive(Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub combo_id: Option<Uuid>,
    #[serde(default)]
    pub service_id: Option<Uuid>,
    pub quantity: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub coupon_codes: Vec<String>,
}

impl CreateBookingRequest {
    pub fn target(&self) -> Result<BookingTarget, ApiError> {
        match (self.combo_id, self.service_id) {
            (Some(id), None) => Ok(BookingTarget::Combo(id)),
            (None, Some(id)) => Ok(BookingTarget::Service(id)),
            _ => Err(ApiError::BadRequest(
                "exactly one of combo_id or service_id is required".to_string(),
            )),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AppliedCouponResponse {
    pub coupon_id: Uuid,
    pub code: String,
    /// Order in which the discount was applied, starting at 0.
    pub position: i32,
    pub applied_at: DateTime<Utc>,
}

impl From<BookingCoupon> for AppliedCouponResponse {
    fn from(applied: BookingCoupon) -> Self {
        Self {
            coupon_id: applied.coupon_id,
            code: applied.coupon_code,
            position: applied.position,
            applied_at: applied.applied_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    /// `combo` or `service`.
    pub item_type: String,
    pub combo_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub unit_price: Decimal,
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    pub status: String,
    pub notes: Option<String>,
    pub booking_date: DateTime<Utc>,
    pub confirmed_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub cancelled_date: Option<DateTime<Utc>>,
    /// Present on creation and on the detail endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupons: Option<Vec<AppliedCouponResponse>>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            account_id: booking.account_id,
            item_type: booking.target.item_type().to_string(),
            combo_id: booking.target.combo_id(),
            service_id: booking.target.service_id(),
            quantity: booking.quantity,
            unit_price: booking.unit_price,
            total_amount: booking.total_amount,
            status: booking.status.as_str().to_string(),
            notes: booking.notes,
            booking_date: booking.booking_date,
            confirmed_date: booking.confirmed_date,
            completed_date: booking.completed_date,
            cancelled_date: booking.cancelled_date,
            coupons: None,
        }
    }
}

impl From<BookingDetail> for BookingResponse {
    fn from(detail: BookingDetail) -> Self {
        let mut response = BookingResponse::from(detail.booking);
        response.coupons = Some(detail.coupons.into_iter().map(Into::into).collect());
        response
    }
}

//=========================================================================================
// Payments
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    pub method: String,
}

#[derive(Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub method: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            booking_id: payment.booking_id,
            amount: payment.amount,
            method: payment.method,
            status: payment.status.as_str().to_string(),
            created_at: payment.created_at,
            paid_at: payment.paid_at,
        }
    }
}

//=========================================================================================
// Reviews
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub combo_id: Uuid,
    pub rating: i16,
    pub content: String,
    #[serde(default)]
    pub booking_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub combo_id: Uuid,
    pub author_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub rating: i16,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            combo_id: review.combo_id,
            author_id: review.author_id,
            booking_id: review.booking_id,
            rating: review.rating,
            content: review.content,
            created_at: review.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CanReviewResponse {
    pub booking_id: Uuid,
    pub account_id: Uuid,
    pub can_review: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(combo_id: Option<Uuid>, service_id: Option<Uuid>) -> CreateBookingRequest {
        CreateBookingRequest {
            combo_id,
            service_id,
            quantity: 1,
            notes: None,
            coupon_codes: Vec::new(),
        }
    }

    #[test]
    fn booking_target_needs_exactly_one_id() {
        let id = Uuid::new_v4();
        assert_eq!(request(Some(id), None).target().unwrap(), BookingTarget::Combo(id));
        assert_eq!(request(None, Some(id)).target().unwrap(), BookingTarget::Service(id));
        assert!(request(None, None).target().is_err());
        assert!(request(Some(id), Some(id)).target().is_err());
    }

    #[test]
    fn money_should_accept_numbers_and_strings() {
        let from_number: CreateServiceRequest =
            serde_json::from_str(r#"{"name":"Kayak","price":150000.50}"#).unwrap();
        let from_string: CreateServiceRequest =
            serde_json::from_str(r#"{"name":"Kayak","price":"150000.50"}"#).unwrap();
        assert_eq!(from_number.price, from_string.price);
    }
}
