//! services/api/src/web/router.rs
//!
//! Assembles the full axum application: public auth routes, session-protected
//! routes, CORS and the Swagger UI.

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::web::{
    auth::{login_handler, logout_handler, signup_handler},
    bookings, catalog,
    middleware::require_auth,
    rest::{health_handler, ApiDoc},
    reviews,
    state::AppState,
};

/// Builds the application router over the given state.
pub fn build_router(state: Arc<AppState>) -> Result<Router, ApiError> {
    let origin = state.config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/combos", post(catalog::create_combo_handler))
        .route(
            "/combos/{id}",
            get(catalog::get_combo_handler).delete(catalog::delete_combo_handler),
        )
        .route("/combos/{id}/status", patch(catalog::set_combo_status_handler))
        .route("/combos/{id}/coupons", get(catalog::list_coupons_handler))
        .route("/combos/{id}/reviews", get(reviews::list_reviews_handler))
        .route("/services", post(catalog::create_service_handler))
        .route("/coupons", post(catalog::create_coupon_handler))
        .route(
            "/coupons/{id}",
            axum::routing::delete(catalog::delete_coupon_handler),
        )
        .route(
            "/booking",
            post(bookings::create_booking_handler).get(bookings::list_bookings_handler),
        )
        .route("/booking/{id}", get(bookings::get_booking_handler))
        .route("/booking/{id}/confirm", post(bookings::confirm_booking_handler))
        .route("/booking/{id}/complete", post(bookings::complete_booking_handler))
        .route("/booking/{id}/cancel", post(bookings::cancel_booking_handler))
        .route(
            "/booking/{id}/payments",
            post(bookings::create_payment_handler).get(bookings::list_payments_handler),
        )
        .route(
            "/review/booking/{id}/user/{account_id}/can-review",
            get(reviews::can_review_handler),
        )
        .route("/review", post(reviews::create_review_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Merge the API router with the Swagger UI router for a complete application.
    Ok(Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())))
}
