//! services/api/src/web/bookings.rs
//!
//! Booking and payment endpoints. All of them sit behind `require_auth`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use booking_core::domain::Actor;
use booking_core::CreateBooking;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::dto::{
    BookingResponse, CreateBookingRequest, CreatePaymentRequest, PaymentResponse,
};
use crate::web::state::AppState;

/// POST /booking - Book a combo or a service, optionally applying coupons
#[utoipa::path(
    post,
    path = "/booking",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 404, description = "Combo, service or coupon not found", body = ErrorBody),
        (status = 409, description = "Lost a race for the same slots or coupon", body = ErrorBody),
        (status = 422, description = "Coupon or slot rule violated", body = ErrorBody)
    )
)]
pub async fn create_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let target = req.target()?;
    let detail = state
        .bookings
        .create_booking(
            actor,
            CreateBooking {
                target,
                quantity: req.quantity,
                notes: req.notes,
                coupon_codes: req.coupon_codes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(detail))))
}

/// GET /booking - The caller's bookings, newest first
#[utoipa::path(
    get,
    path = "/booking",
    responses((status = 200, description = "Bookings of the caller", body = [BookingResponse]))
)]
pub async fn list_bookings_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let bookings = state.bookings.list_bookings(actor).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// GET /booking/{id} - One booking with its applied coupons
#[utoipa::path(
    get,
    path = "/booking/{id}",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking detail", body = BookingResponse),
        (status = 403, description = "Not the owner, the host or an admin", body = ErrorBody),
        (status = 404, description = "Unknown booking", body = ErrorBody)
    )
)]
pub async fn get_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let detail = state.bookings.get_booking(actor, booking_id).await?;
    Ok(Json(detail.into()))
}

/// POST /booking/{id}/confirm - Host or admin confirms a pending booking
#[utoipa::path(
    post,
    path = "/booking/{id}/confirm",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking confirmed", body = BookingResponse),
        (status = 422, description = "Invalid transition", body = ErrorBody)
    )
)]
pub async fn confirm_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    Ok(Json(state.bookings.confirm(actor, booking_id).await?.into()))
}

/// POST /booking/{id}/complete - Host or admin completes a confirmed booking
#[utoipa::path(
    post,
    path = "/booking/{id}/complete",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking completed", body = BookingResponse),
        (status = 422, description = "Invalid transition", body = ErrorBody)
    )
)]
pub async fn complete_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    Ok(Json(state.bookings.complete(actor, booking_id).await?.into()))
}

/// POST /booking/{id}/cancel - Cancel and give the slots back
#[utoipa::path(
    post,
    path = "/booking/{id}/cancel",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingResponse),
        (status = 403, description = "Caller may not cancel this booking", body = ErrorBody),
        (status = 422, description = "Invalid transition", body = ErrorBody)
    )
)]
pub async fn cancel_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    Ok(Json(state.bookings.cancel(actor, booking_id).await?.into()))
}

/// POST /booking/{id}/payments - Record a pending payment for the booking total
#[utoipa::path(
    post,
    path = "/booking/{id}/payments",
    params(("id" = Uuid, Path, description = "Booking id")),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentResponse),
        (status = 422, description = "Booking is cancelled", body = ErrorBody)
    )
)]
pub async fn create_payment_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .payments
        .create_payment(actor, booking_id, req.method)
        .await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::from(payment))))
}

/// GET /booking/{id}/payments - Payments recorded for a booking
#[utoipa::path(
    get,
    path = "/booking/{id}/payments",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses((status = 200, description = "Payments of the booking", body = [PaymentResponse]))
)]
pub async fn list_payments_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state.payments.list_payments(actor, booking_id).await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}
