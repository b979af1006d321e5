//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how every
//! error reaches the client.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use booking_core::{BookingError, ErrorKind, PortError};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A business-rule or workflow error from the booking core.
    #[error(transparent)]
    Booking(#[from] BookingError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Wrong email or password, or an account that may not log in.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Malformed request input caught before it reaches the core.
    #[error("{0}")]
    BadRequest(String),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ApiError {
    fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Booking(e) => e.kind(),
            ApiError::Port(PortError::NotFound(_)) => ErrorKind::NotFound,
            ApiError::Port(PortError::Conflict(_)) => ErrorKind::Conflict,
            ApiError::Port(PortError::Unauthorized) => ErrorKind::Unauthorized,
            ApiError::InvalidCredentials => ErrorKind::Unauthorized,
            ApiError::BadRequest(_) => ErrorKind::Validation,
            _ => ErrorKind::Internal,
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::BusinessRule => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let message = if kind == ErrorKind::Internal {
            error!("Request failed: {:?}", self);
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            error: kind.as_str().to_string(),
            message,
        };
        let status = match self {
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            _ => status_for(kind),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::{CouponError, SlotError};

    #[test]
    fn business_rules_should_be_unprocessable() {
        let err = ApiError::from(BookingError::from(SlotError::InsufficientSlots {
            requested: 2,
            available: 0,
        }));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = ApiError::from(BookingError::from(CouponError::LimitReached("SUMMER".into())));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn statuses_should_follow_error_kind() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
