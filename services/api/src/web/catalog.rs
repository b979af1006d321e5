//! services/api/src/web/catalog.rs
//!
//! Host-facing endpoints: combos, services and coupons.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use booking_core::domain::{Actor, ComboStatus};
use booking_core::{ComboInput, ComboRemoval, CouponInput};
use regex::Regex;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};
use crate::web::dto::{
    ComboRemovalResponse, ComboResponse, ComboStatusRequest, CouponResponse, CreateComboRequest,
    CreateCouponRequest, CreateServiceRequest, ServiceResponse,
};
use crate::web::state::AppState;

/// Letters, digits, `_` and `-`; 3 to 32 characters.
const COUPON_CODE_PATTERN: &str = r"^[A-Za-z0-9_-]{3,32}$";

fn check_coupon_code(code: &str) -> Result<(), ApiError> {
    let pattern = Regex::new(COUPON_CODE_PATTERN).map_err(|e| ApiError::Internal(e.to_string()))?;
    if pattern.is_match(code) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "coupon code '{}' must be 3-32 letters, digits, '_' or '-'",
            code
        )))
    }
}

//=========================================================================================
// Combos
//=========================================================================================

/// POST /combos - A host publishes a new combo
#[utoipa::path(
    post,
    path = "/combos",
    request_body = CreateComboRequest,
    responses(
        (status = 201, description = "Combo created", body = ComboResponse),
        (status = 400, description = "Invalid combo", body = ErrorBody),
        (status = 403, description = "Only hosts and admins create combos", body = ErrorBody)
    )
)]
pub async fn create_combo_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateComboRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = ComboInput {
        name: req.name,
        address: req.address,
        description: req.description,
        price: req.price,
        available_slots: req.available_slots,
        capacity: req.capacity,
        cancellation_policy: req.cancellation_policy,
        details: req
            .details
            .into_iter()
            .map(|d| (d.service_id, d.quantity))
            .collect(),
    };
    let combo = state.catalog.create_combo(actor, input).await?;
    let (combo, details) = state.catalog.get_combo(combo.id).await?;
    Ok((StatusCode::CREATED, Json(ComboResponse::new(combo, details))))
}

/// GET /combos/{id} - Combo with its included services
#[utoipa::path(
    get,
    path = "/combos/{id}",
    params(("id" = Uuid, Path, description = "Combo id")),
    responses(
        (status = 200, description = "Combo detail", body = ComboResponse),
        (status = 404, description = "Unknown combo", body = ErrorBody)
    )
)]
pub async fn get_combo_handler(
    State(state): State<Arc<AppState>>,
    Path(combo_id): Path<Uuid>,
) -> Result<Json<ComboResponse>, ApiError> {
    let (combo, details) = state.catalog.get_combo(combo_id).await?;
    Ok(Json(ComboResponse::new(combo, details)))
}

/// PATCH /combos/{id}/status - Open or close a combo for booking
#[utoipa::path(
    patch,
    path = "/combos/{id}/status",
    params(("id" = Uuid, Path, description = "Combo id")),
    request_body = ComboStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ComboResponse),
        (status = 403, description = "Not the combo's host", body = ErrorBody)
    )
)]
pub async fn set_combo_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(combo_id): Path<Uuid>,
    Json(req): Json<ComboStatusRequest>,
) -> Result<Json<ComboResponse>, ApiError> {
    let status = req.status.trim().to_lowercase();
    if status.is_empty() {
        return Err(ApiError::BadRequest("status is required".to_string()));
    }
    state
        .bookings
        .set_combo_status(actor, combo_id, ComboStatus::from(status.as_str()))
        .await?;
    let (combo, details) = state.catalog.get_combo(combo_id).await?;
    Ok(Json(ComboResponse::new(combo, details)))
}

/// DELETE /combos/{id} - Remove a combo without active bookings
#[utoipa::path(
    delete,
    path = "/combos/{id}",
    params(("id" = Uuid, Path, description = "Combo id")),
    responses(
        (status = 200, description = "Combo deleted or archived", body = ComboRemovalResponse),
        (status = 422, description = "Combo still has pending or confirmed bookings", body = ErrorBody)
    )
)]
pub async fn delete_combo_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(combo_id): Path<Uuid>,
) -> Result<Json<ComboRemovalResponse>, ApiError> {
    let outcome = match state.bookings.delete_combo(actor, combo_id).await? {
        ComboRemoval::Deleted => "deleted",
        ComboRemoval::Archived => "archived",
    };
    Ok(Json(ComboRemovalResponse {
        combo_id,
        outcome: outcome.to_string(),
    }))
}

/// POST /services - A host registers a single bookable service
#[utoipa::path(
    post,
    path = "/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = ServiceResponse),
        (status = 403, description = "Only hosts and admins create services", body = ErrorBody)
    )
)]
pub async fn create_service_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state
        .catalog
        .create_service(actor, req.name, req.price)
        .await?;
    Ok((StatusCode::CREATED, Json(ServiceResponse::from(service))))
}

//=========================================================================================
// Coupons
//=========================================================================================

/// POST /coupons - Create a coupon scoped to one of the host's combos
#[utoipa::path(
    post,
    path = "/coupons",
    request_body = CreateCouponRequest,
    responses(
        (status = 201, description = "Coupon created", body = CouponResponse),
        (status = 400, description = "Invalid coupon", body = ErrorBody),
        (status = 409, description = "Code already taken", body = ErrorBody)
    )
)]
pub async fn create_coupon_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateCouponRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_coupon_code(&req.code)?;
    let coupon = state
        .catalog
        .create_coupon(
            actor,
            CouponInput {
                combo_id: req.combo_id,
                code: req.code,
                description: req.description,
                discount_percent: req.discount_percent,
                discount_amount: req.discount_amount,
                usage_limit: req.usage_limit,
                expiry_date: req.expiry_date,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CouponResponse::from(coupon))))
}

/// GET /combos/{id}/coupons - Coupons of a combo
#[utoipa::path(
    get,
    path = "/combos/{id}/coupons",
    params(("id" = Uuid, Path, description = "Combo id")),
    responses((status = 200, description = "Coupons of the combo", body = [CouponResponse]))
)]
pub async fn list_coupons_handler(
    State(state): State<Arc<AppState>>,
    Path(combo_id): Path<Uuid>,
) -> Result<Json<Vec<CouponResponse>>, ApiError> {
    let coupons = state.catalog.list_coupons(combo_id).await?;
    Ok(Json(coupons.into_iter().map(Into::into).collect()))
}

/// DELETE /coupons/{id} - Remove a coupon (retired instead once it has been used)
#[utoipa::path(
    delete,
    path = "/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon id")),
    responses(
        (status = 204, description = "Coupon removed"),
        (status = 403, description = "Not the coupon's host", body = ErrorBody),
        (status = 404, description = "Unknown coupon", body = ErrorBody)
    )
)]
pub async fn delete_coupon_handler(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(coupon_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_coupon(actor, coupon_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coupon_codes_should_match_the_allowed_shape() {
        assert!(check_coupon_code("SUMMER15").is_ok());
        assert!(check_coupon_code("tet_2025-vip").is_ok());
        assert!(check_coupon_code("AB").is_err());
        assert!(check_coupon_code("HAS SPACE").is_err());
        assert!(check_coupon_code(&"X".repeat(33)).is_err());
    }
}
