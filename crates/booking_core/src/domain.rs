//! crates/booking_core/src/domain.rs
//!
//! Defines the pure, core data structures for the booking platform.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Accounts
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Tourist,
    Host,
    Agency,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tourist => "tourist",
            Role::Host => "host",
            Role::Agency => "agency",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tourist" => Ok(Role::Tourist),
            "host" => Ok(Role::Host),
            "agency" => Ok(Role::Agency),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A registered identity. Accounts are never hard-deleted; moderation flips
/// `is_active` / `is_banned` instead.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn can_login(&self) -> bool {
        self.is_active && !self.is_banned
    }
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account: Account,
    pub password_hash: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub account_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated caller of a workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub account_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComboStatus {
    Open,
    Closed,
    Other(String),
}

impl ComboStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ComboStatus::Open => "open",
            ComboStatus::Closed => "closed",
            ComboStatus::Other(s) => s,
        }
    }
}

impl From<&str> for ComboStatus {
    fn from(s: &str) -> Self {
        match s {
            "open" => ComboStatus::Open,
            "closed" => ComboStatus::Closed,
            other => ComboStatus::Other(other.to_string()),
        }
    }
}

/// A bookable package owned by a host.
#[derive(Debug, Clone)]
pub struct ServiceCombo {
    pub id: Uuid,
    pub host_id: Uuid,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub available_slots: i32,
    /// Upper bound for `available_slots` when releasing; `None` means untracked.
    pub capacity: Option<i32>,
    pub status: ComboStatus,
    pub cancellation_policy: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A single underlying service, bookable on its own or as part of a combo.
#[derive(Debug, Clone)]
pub struct Service {
    pub id: Uuid,
    pub host_id: Uuid,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone)]
pub struct ServiceComboDetail {
    pub combo_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct Coupon {
    pub id: Uuid,
    pub host_id: Uuid,
    pub combo_id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub usage_limit: i32,
    pub usage_count: i32,
    pub is_active: bool,
    pub expiry_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Bookings
//=========================================================================================

/// What a booking reserves: a whole combo, or a single service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingTarget {
    Combo(Uuid),
    Service(Uuid),
}

impl BookingTarget {
    pub fn item_type(&self) -> &'static str {
        match self {
            BookingTarget::Combo(_) => "combo",
            BookingTarget::Service(_) => "service",
        }
    }

    pub fn combo_id(&self) -> Option<Uuid> {
        match self {
            BookingTarget::Combo(id) => Some(*id),
            BookingTarget::Service(_) => None,
        }
    }

    pub fn service_id(&self) -> Option<Uuid> {
        match self {
            BookingTarget::Combo(_) => None,
            BookingTarget::Service(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// `pending -> confirmed -> completed`, and `pending | confirmed -> cancelled`.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Confirmed, Completed) | (Pending, Cancelled) | (Confirmed, Cancelled)
        )
    }

    /// Bookings that still hold capacity on their target.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_reviewable(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub account_id: Uuid,
    pub target: BookingTarget,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub booking_date: DateTime<Utc>,
    pub confirmed_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub cancelled_date: Option<DateTime<Utc>>,
}

/// Records that a coupon was applied to a booking. `(booking_id, coupon_id)` is unique.
#[derive(Debug, Clone)]
pub struct BookingCoupon {
    pub booking_id: Uuid,
    pub coupon_id: Uuid,
    pub coupon_code: String,
    /// Zero-based submission order; the stored total was priced in this order.
    pub position: i32,
    pub applied_at: DateTime<Utc>,
}

/// A booking together with the coupons that were applied to it.
#[derive(Debug, Clone)]
pub struct BookingDetail {
    pub booking: Booking,
    pub coupons: Vec<BookingCoupon>,
}

//=========================================================================================
// Payments & Reviews
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(format!("unknown payment status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub method: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Review {
    pub id: Uuid,
    pub combo_id: Uuid,
    pub author_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub rating: i16,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_should_follow_lifecycle() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn combo_status_should_keep_unknown_values() {
        assert_eq!(ComboStatus::from("open"), ComboStatus::Open);
        assert_eq!(ComboStatus::from("closed"), ComboStatus::Closed);
        let other = ComboStatus::from("maintenance");
        assert_eq!(other.as_str(), "maintenance");
    }

    #[test]
    fn role_should_parse_case_insensitively() {
        assert_eq!("Host".parse::<Role>().unwrap(), Role::Host);
        assert!("guest".parse::<Role>().is_err());
    }
}
