//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` and `UnitOfWork` ports from the core crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use booking_core::domain::{
    Account, AccountCredentials, Booking, BookingCoupon, BookingStatus, BookingTarget,
    ComboStatus, Coupon, Payment, PaymentStatus, Review, Role, Service, ServiceCombo,
    ServiceComboDetail,
};
use booking_core::ports::{
    DatabaseService, NewAccount, NewCombo, PortError, PortResult, UnitOfWork,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

/// SQLSTATEs that mean "another transaction got there first".
const CONFLICT_CODES: [&str; 4] = [
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "55P03", // lock_not_available
    "23505", // unique_violation
];

/// Applied coupons in the order they were priced.
const BOOKING_COUPONS_QUERY: &str = "SELECT bc.booking_id, bc.coupon_id, c.code, bc.position, bc.applied_at \
     FROM booking_coupons bc JOIN coupons c ON c.id = bc.coupon_id \
     WHERE bc.booking_id = $1 ORDER BY bc.position ASC";

/// How long a booking transaction waits for a row lock before giving up.
const LOCK_TIMEOUT: &str = "SET LOCAL lock_timeout = '5s'";

macro_rules! account_columns {
    () => {
        "id, email, password_hash, full_name, phone, role, is_active, is_banned, created_at"
    };
}
macro_rules! combo_columns {
    () => {
        "id, host_id, name, address, description, price, available_slots, capacity, status, \
         cancellation_policy, created_at"
    };
}
macro_rules! coupon_columns {
    () => {
        "id, host_id, combo_id, code, description, discount_percent, discount_amount, \
         usage_limit, usage_count, is_active, expiry_date, created_at"
    };
}
macro_rules! booking_columns {
    () => {
        "id, account_id, item_type, combo_id, service_id, quantity, unit_price, total_amount, \
         status, notes, booking_date, confirmed_date, completed_date, cancelled_date"
    };
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Translates driver errors into port errors, surfacing lost races as `Conflict`.
fn db_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound("Row not found".to_string()),
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
            if CONFLICT_CODES.contains(&code.as_str()) {
                PortError::Conflict(db.message().to_string())
            } else {
                PortError::Unexpected(db.to_string())
            }
        }
        other => PortError::Unexpected(other.to_string()),
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> impl FnOnce(sqlx::Error) -> PortError {
    let msg = format!("{} {} not found", what, id);
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(msg),
        other => db_error(other),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct AccountRecord {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: String,
    phone: Option<String>,
    role: String,
    is_active: bool,
    is_banned: bool,
    created_at: DateTime<Utc>,
}
impl AccountRecord {
    fn to_domain(self) -> PortResult<AccountCredentials> {
        let role = self.role.parse::<Role>().map_err(PortError::Unexpected)?;
        Ok(AccountCredentials {
            account: Account {
                id: self.id,
                email: self.email,
                full_name: self.full_name,
                phone: self.phone,
                role,
                is_active: self.is_active,
                is_banned: self.is_banned,
                created_at: self.created_at,
            },
            password_hash: self.password_hash,
        })
    }
}

#[derive(FromRow)]
struct ComboRecord {
    id: Uuid,
    host_id: Uuid,
    name: String,
    address: String,
    description: Option<String>,
    price: Decimal,
    available_slots: i32,
    capacity: Option<i32>,
    status: String,
    cancellation_policy: Option<String>,
    created_at: DateTime<Utc>,
}
impl ComboRecord {
    fn to_domain(self) -> ServiceCombo {
        ServiceCombo {
            id: self.id,
            host_id: self.host_id,
            name: self.name,
            address: self.address,
            description: self.description,
            price: self.price,
            available_slots: self.available_slots,
            capacity: self.capacity,
            status: ComboStatus::from(self.status.as_str()),
            cancellation_policy: self.cancellation_policy,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ServiceRecord {
    id: Uuid,
    host_id: Uuid,
    name: String,
    price: Decimal,
}
impl ServiceRecord {
    fn to_domain(self) -> Service {
        Service {
            id: self.id,
            host_id: self.host_id,
            name: self.name,
            price: self.price,
        }
    }
}

#[derive(FromRow)]
struct DetailRecord {
    combo_id: Uuid,
    service_id: Uuid,
    quantity: i32,
}

#[derive(FromRow)]
struct CouponRecord {
    id: Uuid,
    host_id: Uuid,
    combo_id: Uuid,
    code: String,
    description: Option<String>,
    discount_percent: Option<Decimal>,
    discount_amount: Option<Decimal>,
    usage_limit: i32,
    usage_count: i32,
    is_active: bool,
    expiry_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}
impl CouponRecord {
    fn to_domain(self) -> Coupon {
        Coupon {
            id: self.id,
            host_id: self.host_id,
            combo_id: self.combo_id,
            code: self.code,
            description: self.description,
            discount_percent: self.discount_percent,
            discount_amount: self.discount_amount,
            usage_limit: self.usage_limit,
            usage_count: self.usage_count,
            is_active: self.is_active,
            expiry_date: self.expiry_date,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct BookingRecord {
    id: Uuid,
    account_id: Uuid,
    item_type: String,
    combo_id: Option<Uuid>,
    service_id: Option<Uuid>,
    quantity: i32,
    unit_price: Decimal,
    total_amount: Decimal,
    status: String,
    notes: Option<String>,
    booking_date: DateTime<Utc>,
    confirmed_date: Option<DateTime<Utc>>,
    completed_date: Option<DateTime<Utc>>,
    cancelled_date: Option<DateTime<Utc>>,
}
impl BookingRecord {
    fn to_domain(self) -> PortResult<Booking> {
        let target = match (self.item_type.as_str(), self.combo_id, self.service_id) {
            ("combo", Some(id), None) => BookingTarget::Combo(id),
            ("service", None, Some(id)) => BookingTarget::Service(id),
            (other, _, _) => {
                return Err(PortError::Unexpected(format!(
                    "booking {} has inconsistent target '{}'",
                    self.id, other
                )))
            }
        };
        let status = self
            .status
            .parse::<BookingStatus>()
            .map_err(PortError::Unexpected)?;
        Ok(Booking {
            id: self.id,
            account_id: self.account_id,
            target,
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_amount: self.total_amount,
            status,
            notes: self.notes,
            booking_date: self.booking_date,
            confirmed_date: self.confirmed_date,
            completed_date: self.completed_date,
            cancelled_date: self.cancelled_date,
        })
    }
}

#[derive(FromRow)]
struct BookingCouponRecord {
    booking_id: Uuid,
    coupon_id: Uuid,
    code: String,
    position: i32,
    applied_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct PaymentRecord {
    id: Uuid,
    booking_id: Uuid,
    amount: Decimal,
    method: String,
    status: String,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}
impl PaymentRecord {
    fn to_domain(self) -> PortResult<Payment> {
        Ok(Payment {
            id: self.id,
            booking_id: self.booking_id,
            amount: self.amount,
            method: self.method,
            status: self
                .status
                .parse::<PaymentStatus>()
                .map_err(PortError::Unexpected)?,
            created_at: self.created_at,
            paid_at: self.paid_at,
        })
    }
}

#[derive(FromRow)]
struct ReviewRecord {
    id: Uuid,
    combo_id: Uuid,
    author_id: Uuid,
    booking_id: Option<Uuid>,
    rating: i16,
    content: String,
    created_at: DateTime<Utc>,
}
impl ReviewRecord {
    fn to_domain(self) -> Review {
        Review {
            id: self.id,
            combo_id: self.combo_id,
            author_id: self.author_id,
            booking_id: self.booking_id,
            rating: self.rating,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_account(&self, new: NewAccount) -> PortResult<Account> {
        let record = sqlx::query_as::<_, AccountRecord>(concat!(
            "INSERT INTO accounts (id, email, password_hash, full_name, phone, role) ",
            "VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
            account_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.full_name)
        .bind(&new.phone)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(record.to_domain()?.account)
    }

    async fn get_account(&self, account_id: Uuid) -> PortResult<Account> {
        let record = sqlx::query_as::<_, AccountRecord>(concat!(
            "SELECT ",
            account_columns!(),
            " FROM accounts WHERE id = $1"
        ))
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Account", account_id))?;
        Ok(record.to_domain()?.account)
    }

    async fn get_account_by_email(&self, email: &str) -> PortResult<AccountCredentials> {
        let record = sqlx::query_as::<_, AccountRecord>(concat!(
            "SELECT ",
            account_columns!(),
            " FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Account", email))?;
        record.to_domain()
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, account_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(account_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Account> {
        let record = sqlx::query_as::<_, AccountRecord>(
            "SELECT a.id, a.email, a.password_hash, a.full_name, a.phone, a.role, a.is_active, \
             a.is_banned, a.created_at \
             FROM auth_sessions s JOIN accounts a ON a.id = s.account_id \
             WHERE s.id = $1 AND s.expires_at > now() AND a.is_active AND NOT a.is_banned",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .ok_or(PortError::Unauthorized)?;
        Ok(record.to_domain()?.account)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn create_combo(&self, new: NewCombo) -> PortResult<ServiceCombo> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        let record = sqlx::query_as::<_, ComboRecord>(concat!(
            "INSERT INTO service_combos (id, host_id, name, address, description, price, ",
            "available_slots, capacity, cancellation_policy) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING ",
            combo_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(new.host_id)
        .bind(&new.name)
        .bind(&new.address)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.available_slots)
        .bind(new.capacity)
        .bind(&new.cancellation_policy)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;

        for (service_id, quantity) in &new.details {
            sqlx::query(
                "INSERT INTO service_combo_details (combo_id, service_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(record.id)
            .bind(service_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }
        tx.commit().await.map_err(db_error)?;
        Ok(record.to_domain())
    }

    async fn get_combo(&self, combo_id: Uuid) -> PortResult<ServiceCombo> {
        let record = sqlx::query_as::<_, ComboRecord>(concat!(
            "SELECT ",
            combo_columns!(),
            " FROM service_combos WHERE id = $1"
        ))
        .bind(combo_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Combo", combo_id))?;
        Ok(record.to_domain())
    }

    async fn get_combo_details(&self, combo_id: Uuid) -> PortResult<Vec<ServiceComboDetail>> {
        let records = sqlx::query_as::<_, DetailRecord>(
            "SELECT combo_id, service_id, quantity FROM service_combo_details WHERE combo_id = $1",
        )
        .bind(combo_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records
            .into_iter()
            .map(|r| ServiceComboDetail {
                combo_id: r.combo_id,
                service_id: r.service_id,
                quantity: r.quantity,
            })
            .collect())
    }

    async fn create_service(&self, service: Service) -> PortResult<Service> {
        let record = sqlx::query_as::<_, ServiceRecord>(
            "INSERT INTO services (id, host_id, name, price) VALUES ($1, $2, $3, $4) \
             RETURNING id, host_id, name, price",
        )
        .bind(service.id)
        .bind(service.host_id)
        .bind(&service.name)
        .bind(service.price)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(record.to_domain())
    }

    async fn get_service(&self, service_id: Uuid) -> PortResult<Service> {
        let record = sqlx::query_as::<_, ServiceRecord>(
            "SELECT id, host_id, name, price FROM services WHERE id = $1",
        )
        .bind(service_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Service", service_id))?;
        Ok(record.to_domain())
    }

    async fn create_coupon(&self, coupon: Coupon) -> PortResult<Coupon> {
        let record = sqlx::query_as::<_, CouponRecord>(concat!(
            "INSERT INTO coupons (id, host_id, combo_id, code, description, discount_percent, ",
            "discount_amount, usage_limit, usage_count, is_active, expiry_date, created_at) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING ",
            coupon_columns!()
        ))
        .bind(coupon.id)
        .bind(coupon.host_id)
        .bind(coupon.combo_id)
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.discount_percent)
        .bind(coupon.discount_amount)
        .bind(coupon.usage_limit)
        .bind(coupon.usage_count)
        .bind(coupon.is_active)
        .bind(coupon.expiry_date)
        .bind(coupon.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(record.to_domain())
    }

    async fn get_coupon(&self, coupon_id: Uuid) -> PortResult<Coupon> {
        let record = sqlx::query_as::<_, CouponRecord>(concat!(
            "SELECT ",
            coupon_columns!(),
            " FROM coupons WHERE id = $1"
        ))
        .bind(coupon_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Coupon", coupon_id))?;
        Ok(record.to_domain())
    }

    async fn list_coupons_for_combo(&self, combo_id: Uuid) -> PortResult<Vec<Coupon>> {
        let records = sqlx::query_as::<_, CouponRecord>(concat!(
            "SELECT ",
            coupon_columns!(),
            " FROM coupons WHERE combo_id = $1 ORDER BY created_at ASC"
        ))
        .bind(combo_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_coupon(&self, coupon_id: Uuid) -> PortResult<()> {
        // Coupons already applied to a booking are retired, not removed.
        let result = sqlx::query(
            "DELETE FROM coupons WHERE id = $1 \
             AND NOT EXISTS (SELECT 1 FROM booking_coupons WHERE coupon_id = $1)",
        )
        .bind(coupon_id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        if result.rows_affected() == 0 {
            let retired = sqlx::query("UPDATE coupons SET is_active = FALSE WHERE id = $1")
                .bind(coupon_id)
                .execute(&self.pool)
                .await
                .map_err(db_error)?;
            if retired.rows_affected() == 0 {
                return Err(PortError::NotFound(format!("Coupon {} not found", coupon_id)));
            }
        }
        Ok(())
    }

    async fn get_booking(&self, booking_id: Uuid) -> PortResult<Booking> {
        let record = sqlx::query_as::<_, BookingRecord>(concat!(
            "SELECT ",
            booking_columns!(),
            " FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await
        .map_err(not_found("Booking", booking_id))?;
        record.to_domain()
    }

    async fn get_booking_coupons(&self, booking_id: Uuid) -> PortResult<Vec<BookingCoupon>> {
        let records = sqlx::query_as::<_, BookingCouponRecord>(BOOKING_COUPONS_QUERY)
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records
            .into_iter()
            .map(|r| BookingCoupon {
                booking_id: r.booking_id,
                coupon_id: r.coupon_id,
                coupon_code: r.code,
                position: r.position,
                applied_at: r.applied_at,
            })
            .collect())
    }

    async fn list_bookings_for_account(&self, account_id: Uuid) -> PortResult<Vec<Booking>> {
        let records = sqlx::query_as::<_, BookingRecord>(concat!(
            "SELECT ",
            booking_columns!(),
            " FROM bookings WHERE account_id = $1 ORDER BY booking_date DESC"
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn create_payment(&self, payment: Payment) -> PortResult<Payment> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            "INSERT INTO payments (id, booking_id, amount, method, status, created_at, paid_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, booking_id, amount, method, status, created_at, paid_at",
        )
        .bind(payment.id)
        .bind(payment.booking_id)
        .bind(payment.amount)
        .bind(&payment.method)
        .bind(payment.status.as_str())
        .bind(payment.created_at)
        .bind(payment.paid_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        record.to_domain()
    }

    async fn list_payments(&self, booking_id: Uuid) -> PortResult<Vec<Payment>> {
        let records = sqlx::query_as::<_, PaymentRecord>(
            "SELECT id, booking_id, amount, method, status, created_at, paid_at \
             FROM payments WHERE booking_id = $1 ORDER BY created_at ASC",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn review_exists(&self, booking_id: Uuid, author_id: Uuid) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE booking_id = $1 AND author_id = $2)",
        )
        .bind(booking_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn create_review(&self, review: Review) -> PortResult<Review> {
        let record = sqlx::query_as::<_, ReviewRecord>(
            "INSERT INTO reviews (id, combo_id, author_id, booking_id, rating, content, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, combo_id, author_id, booking_id, rating, content, created_at",
        )
        .bind(review.id)
        .bind(review.combo_id)
        .bind(review.author_id)
        .bind(review.booking_id)
        .bind(review.rating)
        .bind(&review.content)
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(record.to_domain())
    }

    async fn list_reviews_for_combo(&self, combo_id: Uuid) -> PortResult<Vec<Review>> {
        let records = sqlx::query_as::<_, ReviewRecord>(
            "SELECT id, combo_id, author_id, booking_id, rating, content, created_at \
             FROM reviews WHERE combo_id = $1 ORDER BY created_at DESC",
        )
        .bind(combo_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn begin(&self) -> PortResult<Box<dyn UnitOfWork>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;
        sqlx::query(LOCK_TIMEOUT)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

//=========================================================================================
// `UnitOfWork` Trait Implementation
//=========================================================================================

/// One PostgreSQL transaction. Dropping it without `commit` rolls back.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_combo(&mut self, combo_id: Uuid) -> PortResult<Option<ServiceCombo>> {
        let record = sqlx::query_as::<_, ComboRecord>(concat!(
            "SELECT ",
            combo_columns!(),
            " FROM service_combos WHERE id = $1 FOR UPDATE"
        ))
        .bind(combo_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(record.map(ComboRecord::to_domain))
    }

    async fn get_service(&mut self, service_id: Uuid) -> PortResult<Option<Service>> {
        let record = sqlx::query_as::<_, ServiceRecord>(
            "SELECT id, host_id, name, price FROM services WHERE id = $1",
        )
        .bind(service_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(record.map(ServiceRecord::to_domain))
    }

    async fn lock_coupon_by_code(&mut self, code: &str) -> PortResult<Option<Coupon>> {
        let record = sqlx::query_as::<_, CouponRecord>(concat!(
            "SELECT ",
            coupon_columns!(),
            " FROM coupons WHERE code = $1 FOR UPDATE"
        ))
        .bind(code)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(record.map(CouponRecord::to_domain))
    }

    async fn lock_booking(&mut self, booking_id: Uuid) -> PortResult<Option<Booking>> {
        let record = sqlx::query_as::<_, BookingRecord>(concat!(
            "SELECT ",
            booking_columns!(),
            " FROM bookings WHERE id = $1 FOR UPDATE"
        ))
        .bind(booking_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_error)?;
        record.map(BookingRecord::to_domain).transpose()
    }

    async fn save_available_slots(&mut self, combo_id: Uuid, available_slots: i32) -> PortResult<()> {
        sqlx::query("UPDATE service_combos SET available_slots = $1 WHERE id = $2")
            .bind(available_slots)
            .bind(combo_id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn insert_booking(&mut self, booking: &Booking) -> PortResult<()> {
        sqlx::query(concat!(
            "INSERT INTO bookings (",
            booking_columns!(),
            ") VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(booking.id)
        .bind(booking.account_id)
        .bind(booking.target.item_type())
        .bind(booking.target.combo_id())
        .bind(booking.target.service_id())
        .bind(booking.quantity)
        .bind(booking.unit_price)
        .bind(booking.total_amount)
        .bind(booking.status.as_str())
        .bind(&booking.notes)
        .bind(booking.booking_date)
        .bind(booking.confirmed_date)
        .bind(booking.completed_date)
        .bind(booking.cancelled_date)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn insert_booking_coupon(&mut self, applied: &BookingCoupon) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO booking_coupons (booking_id, coupon_id, position, applied_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(applied.booking_id)
        .bind(applied.coupon_id)
        .bind(applied.position)
        .bind(applied.applied_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn increment_coupon_usage(&mut self, coupon_id: Uuid) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE coupons SET usage_count = usage_count + 1 \
             WHERE id = $1 AND usage_count < usage_limit",
        )
        .bind(coupon_id)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::Conflict(format!(
                "coupon {} reached its usage limit concurrently",
                coupon_id
            )));
        }
        Ok(())
    }

    async fn update_booking_status(&mut self, booking: &Booking) -> PortResult<()> {
        sqlx::query(
            "UPDATE bookings SET status = $1, confirmed_date = $2, completed_date = $3, \
             cancelled_date = $4 WHERE id = $5",
        )
        .bind(booking.status.as_str())
        .bind(booking.confirmed_date)
        .bind(booking.completed_date)
        .bind(booking.cancelled_date)
        .bind(booking.id)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn count_bookings(&mut self, combo_id: Uuid, active_only: bool) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings WHERE combo_id = $1 \
             AND (NOT $2 OR status IN ('pending', 'confirmed'))",
        )
        .bind(combo_id)
        .bind(active_only)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error)
    }

    async fn save_combo_status(&mut self, combo_id: Uuid, status: &ComboStatus) -> PortResult<()> {
        sqlx::query("UPDATE service_combos SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(combo_id)
            .execute(&mut *self.tx)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn delete_combo(&mut self, combo_id: Uuid) -> PortResult<()> {
        for statement in [
            "DELETE FROM coupons WHERE combo_id = $1",
            "DELETE FROM service_combo_details WHERE combo_id = $1",
            "DELETE FROM service_combos WHERE id = $1",
        ] {
            sqlx::query(statement)
                .bind(combo_id)
                .execute(&mut *self.tx)
                .await
                .map_err(db_error)?;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> PortResult<()> {
        self.tx.commit().await.map_err(db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_should_map_to_not_found() {
        let err = not_found("Booking", "b-1")(sqlx::Error::RowNotFound);
        assert!(matches!(err, PortError::NotFound(msg) if msg == "Booking b-1 not found"));
    }

    #[test]
    fn applied_coupons_should_come_back_in_pricing_order() {
        assert!(BOOKING_COUPONS_QUERY.ends_with("ORDER BY bc.position ASC"));
    }

    #[test]
    fn pool_errors_should_be_unexpected() {
        assert!(matches!(db_error(sqlx::Error::PoolTimedOut), PortError::Unexpected(_)));
    }

    #[test]
    fn inconsistent_booking_target_should_be_rejected() {
        let record = BookingRecord {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            item_type: "combo".to_string(),
            combo_id: None,
            service_id: Some(Uuid::new_v4()),
            quantity: 1,
            unit_price: Decimal::ONE,
            total_amount: Decimal::ONE,
            status: "pending".to_string(),
            notes: None,
            booking_date: Utc::now(),
            confirmed_date: None,
            completed_date: None,
            cancelled_date: None,
        };
        assert!(matches!(record.to_domain(), Err(PortError::Unexpected(_))));
    }
}
