//! crates/booking_core/src/error.rs
//!
//! Typed errors for the booking workflow. Every variant maps to exactly one
//! user-facing message and one `ErrorKind`.

use crate::domain::BookingStatus;
use crate::ports::PortError;
use uuid::Uuid;

/// The coarse taxonomy callers map to transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    BusinessRule,
    Conflict,
    Unauthorized,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation_error",
            ErrorKind::BusinessRule => "business_rule_violation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponError {
    #[error("coupon '{0}' does not exist")]
    NotFound(String),
    #[error("coupon '{0}' is no longer active")]
    Inactive(String),
    #[error("coupon '{0}' has expired")]
    Expired(String),
    #[error("coupon '{0}' cannot be applied to this item")]
    NotApplicable(String),
    #[error("coupon '{0}' has reached its usage limit")]
    LimitReached(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("only {available} slot(s) left, {requested} requested")]
    InsufficientSlots { requested: i32, available: i32 },
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("service combo {0} not found")]
    ComboNotFound(Uuid),
    #[error("service {0} not found")]
    ServiceNotFound(Uuid),
    #[error("booking {0} not found")]
    BookingNotFound(Uuid),
    #[error("coupon {0} not found")]
    CouponNotFound(Uuid),
    #[error("service combo {0} is not open for booking")]
    ComboNotOpen(Uuid),
    #[error("coupon '{0}' was submitted more than once")]
    DuplicateCoupon(String),
    #[error(transparent)]
    Coupon(#[from] CouponError),
    #[error(transparent)]
    Slots(#[from] SlotError),
    #[error("cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("booking {0} is cancelled")]
    BookingCancelled(Uuid),
    #[error("booking is not eligible for review")]
    ReviewNotEligible,
    #[error("service combo {0} still has active bookings")]
    ComboHasActiveBookings(Uuid),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not allowed to act on this resource")]
    Unauthorized,
    #[error("concurrent update detected, please retry: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Port(PortError),
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::ComboNotFound(_)
            | BookingError::ServiceNotFound(_)
            | BookingError::BookingNotFound(_)
            | BookingError::CouponNotFound(_) => ErrorKind::NotFound,
            BookingError::Coupon(CouponError::NotFound(_)) => ErrorKind::NotFound,
            BookingError::Validation(_) => ErrorKind::Validation,
            BookingError::ComboNotOpen(_)
            | BookingError::DuplicateCoupon(_)
            | BookingError::Coupon(_)
            | BookingError::Slots(_)
            | BookingError::InvalidTransition { .. }
            | BookingError::BookingCancelled(_)
            | BookingError::ReviewNotEligible
            | BookingError::ComboHasActiveBookings(_) => ErrorKind::BusinessRule,
            BookingError::Conflict(_) => ErrorKind::Conflict,
            BookingError::Unauthorized => ErrorKind::Unauthorized,
            BookingError::Port(PortError::NotFound(_)) => ErrorKind::NotFound,
            BookingError::Port(PortError::Unauthorized) => ErrorKind::Unauthorized,
            BookingError::Port(_) => ErrorKind::Internal,
        }
    }
}

impl From<PortError> for BookingError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::Conflict(msg) => BookingError::Conflict(msg),
            other => BookingError::Port(other),
        }
    }
}

/// A convenience type alias for `Result<T, BookingError>`.
pub type BookingResult<T> = Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_conflict_should_become_booking_conflict() {
        let err: BookingError = PortError::Conflict("serialization failure".into()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn coupon_errors_should_be_business_rules_except_missing() {
        let missing: BookingError = CouponError::NotFound("X".into()).into();
        let expired: BookingError = CouponError::Expired("X".into()).into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(expired.kind(), ErrorKind::BusinessRule);
        assert_eq!(expired.to_string(), "coupon 'X' has expired");
    }
}
