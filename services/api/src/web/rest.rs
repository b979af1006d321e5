//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the liveness probe.

use axum::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::error::ErrorBody;
use crate::web::{auth, bookings, catalog, dto, reviews};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        catalog::create_combo_handler,
        catalog::get_combo_handler,
        catalog::set_combo_status_handler,
        catalog::delete_combo_handler,
        catalog::create_service_handler,
        catalog::create_coupon_handler,
        catalog::list_coupons_handler,
        catalog::delete_coupon_handler,
        bookings::create_booking_handler,
        bookings::list_bookings_handler,
        bookings::get_booking_handler,
        bookings::confirm_booking_handler,
        bookings::complete_booking_handler,
        bookings::cancel_booking_handler,
        bookings::create_payment_handler,
        bookings::list_payments_handler,
        reviews::can_review_handler,
        reviews::create_review_handler,
        reviews::list_reviews_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            dto::CreateComboRequest,
            dto::ComboDetailRequest,
            dto::ComboStatusRequest,
            dto::ComboResponse,
            dto::ComboDetailResponse,
            dto::ComboRemovalResponse,
            dto::CreateServiceRequest,
            dto::ServiceResponse,
            dto::CreateCouponRequest,
            dto::CouponResponse,
            dto::CreateBookingRequest,
            dto::BookingResponse,
            dto::AppliedCouponResponse,
            dto::CreatePaymentRequest,
            dto::PaymentResponse,
            dto::CreateReviewRequest,
            dto::ReviewResponse,
            dto::CanReviewResponse,
        )
    ),
    tags(
        (name = "Tour Booking API", description = "Combos, coupons, bookings and reviews for hosted tours.")
    )
)]
pub struct ApiDoc;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
}

/// GET /health - Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_should_list_booking_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/booking"));
        assert!(doc.paths.paths.contains_key("/booking/{id}/cancel"));
        assert!(doc
            .paths
            .paths
            .contains_key("/review/booking/{id}/user/{account_id}/can-review"));
    }
}
