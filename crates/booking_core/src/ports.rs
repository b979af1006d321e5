//! crates/booking_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the booking core.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of a specific database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Account, AccountCredentials, Booking, BookingCoupon, ComboStatus, Coupon, Payment, Review,
    Role, Service, ServiceCombo, ServiceComboDetail,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A concurrent writer won a race (serialization failure, deadlock, lock timeout
    /// or a uniqueness check that only fails under contention).
    #[error("Conflicting concurrent update: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Input records
//=========================================================================================

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewCombo {
    pub host_id: Uuid,
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub price: rust_decimal::Decimal,
    pub available_slots: i32,
    pub capacity: Option<i32>,
    pub cancellation_policy: Option<String>,
    /// `(service_id, quantity)` line items.
    pub details: Vec<(Uuid, i32)>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Plain reads and single-statement writes, plus the entry point to transactions.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Accounts & Auth ---
    async fn create_account(&self, account: NewAccount) -> PortResult<Account>;

    async fn get_account(&self, account_id: Uuid) -> PortResult<Account>;

    async fn get_account_by_email(&self, email: &str) -> PortResult<AccountCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the owning account of a live (not expired) session.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Account>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Catalog ---
    async fn create_combo(&self, combo: NewCombo) -> PortResult<ServiceCombo>;

    async fn get_combo(&self, combo_id: Uuid) -> PortResult<ServiceCombo>;

    async fn get_combo_details(&self, combo_id: Uuid) -> PortResult<Vec<ServiceComboDetail>>;

    async fn create_service(&self, service: Service) -> PortResult<Service>;

    async fn get_service(&self, service_id: Uuid) -> PortResult<Service>;

    // --- Coupons ---
    async fn create_coupon(&self, coupon: Coupon) -> PortResult<Coupon>;

    async fn get_coupon(&self, coupon_id: Uuid) -> PortResult<Coupon>;

    async fn list_coupons_for_combo(&self, combo_id: Uuid) -> PortResult<Vec<Coupon>>;

    async fn delete_coupon(&self, coupon_id: Uuid) -> PortResult<()>;

    // --- Bookings ---
    async fn get_booking(&self, booking_id: Uuid) -> PortResult<Booking>;

    async fn get_booking_coupons(&self, booking_id: Uuid) -> PortResult<Vec<BookingCoupon>>;

    async fn list_bookings_for_account(&self, account_id: Uuid) -> PortResult<Vec<Booking>>;

    // --- Payments ---
    async fn create_payment(&self, payment: Payment) -> PortResult<Payment>;

    async fn list_payments(&self, booking_id: Uuid) -> PortResult<Vec<Payment>>;

    // --- Reviews ---
    async fn review_exists(&self, booking_id: Uuid, author_id: Uuid) -> PortResult<bool>;

    async fn create_review(&self, review: Review) -> PortResult<Review>;

    async fn list_reviews_for_combo(&self, combo_id: Uuid) -> PortResult<Vec<Review>>;

    // --- Transactions ---
    /// Opens a unit of work. Nothing written through it is visible to other
    /// callers until `commit`; dropping it rolls everything back.
    async fn begin(&self) -> PortResult<Box<dyn UnitOfWork>>;
}

/// One database transaction. The `lock_*` reads hold the row until commit or
/// rollback, serializing read-modify-write per row.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn lock_combo(&mut self, combo_id: Uuid) -> PortResult<Option<ServiceCombo>>;

    async fn get_service(&mut self, service_id: Uuid) -> PortResult<Option<Service>>;

    async fn lock_coupon_by_code(&mut self, code: &str) -> PortResult<Option<Coupon>>;

    async fn lock_booking(&mut self, booking_id: Uuid) -> PortResult<Option<Booking>>;

    async fn save_available_slots(&mut self, combo_id: Uuid, available_slots: i32) -> PortResult<()>;

    async fn insert_booking(&mut self, booking: &Booking) -> PortResult<()>;

    async fn insert_booking_coupon(&mut self, applied: &BookingCoupon) -> PortResult<()>;

    /// Bumps `usage_count` by one; fails with `Conflict` if that would exceed `usage_limit`.
    async fn increment_coupon_usage(&mut self, coupon_id: Uuid) -> PortResult<()>;

    async fn update_booking_status(&mut self, booking: &Booking) -> PortResult<()>;

    /// Counts bookings against a combo; only `pending`/`confirmed` ones when `active_only`.
    async fn count_bookings(&mut self, combo_id: Uuid, active_only: bool) -> PortResult<i64>;

    async fn save_combo_status(&mut self, combo_id: Uuid, status: &ComboStatus) -> PortResult<()>;

    /// Removes a combo and the rows that only exist through it (coupons, details).
    async fn delete_combo(&mut self, combo_id: Uuid) -> PortResult<()>;

    async fn commit(self: Box<Self>) -> PortResult<()>;
}
