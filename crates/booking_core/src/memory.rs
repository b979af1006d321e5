//! crates/booking_core/src/memory.rs
//!
//! An in-process implementation of the storage ports. Used by the test suites
//! and by local development (`DATABASE_URL=memory://`).
//!
//! A unit of work takes the single table lock for its whole lifetime and works
//! on a private copy; `commit` publishes the copy, dropping it discards it.
//! Transactions are therefore fully serialized.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::{
    Account, AccountCredentials, AuthSession, Booking, BookingCoupon, BookingTarget, ComboStatus,
    Coupon, Payment, Review, Service, ServiceCombo, ServiceComboDetail,
};
use crate::ports::{DatabaseService, NewAccount, NewCombo, PortError, PortResult, UnitOfWork};

#[derive(Debug, Default, Clone)]
struct Tables {
    accounts: HashMap<Uuid, AccountCredentials>,
    sessions: HashMap<String, AuthSession>,
    combos: HashMap<Uuid, ServiceCombo>,
    combo_details: Vec<ServiceComboDetail>,
    services: HashMap<Uuid, Service>,
    coupons: HashMap<Uuid, Coupon>,
    bookings: HashMap<Uuid, Booking>,
    booking_coupons: Vec<BookingCoupon>,
    payments: Vec<Payment>,
    reviews: Vec<Review>,
}

#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> PortError {
    PortError::NotFound(format!("{} {} not found", what, id))
}

#[async_trait]
impl DatabaseService for MemoryDatabase {
    async fn create_account(&self, new: NewAccount) -> PortResult<Account> {
        let mut t = self.tables.lock().await;
        if t.accounts.values().any(|c| c.account.email == new.email) {
            return Err(PortError::Conflict(format!("email {} already registered", new.email)));
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: new.email,
            full_name: new.full_name,
            phone: new.phone,
            role: new.role,
            is_active: true,
            is_banned: false,
            created_at: Utc::now(),
        };
        t.accounts.insert(
            account.id,
            AccountCredentials {
                account: account.clone(),
                password_hash: new.password_hash,
            },
        );
        Ok(account)
    }

    async fn get_account(&self, account_id: Uuid) -> PortResult<Account> {
        let t = self.tables.lock().await;
        t.accounts
            .get(&account_id)
            .map(|c| c.account.clone())
            .ok_or_else(|| not_found("Account", account_id))
    }

    async fn get_account_by_email(&self, email: &str) -> PortResult<AccountCredentials> {
        let t = self.tables.lock().await;
        t.accounts
            .values()
            .find(|c| c.account.email == email)
            .cloned()
            .ok_or_else(|| not_found("Account", email))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        account_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut t = self.tables.lock().await;
        t.sessions.insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                account_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Account> {
        let t = self.tables.lock().await;
        let session = t
            .sessions
            .get(session_id)
            .filter(|s| s.expires_at > Utc::now())
            .ok_or(PortError::Unauthorized)?;
        t.accounts
            .get(&session.account_id)
            .map(|c| c.account.clone())
            .filter(Account::can_login)
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        let mut t = self.tables.lock().await;
        t.sessions.remove(session_id);
        Ok(())
    }

    async fn create_combo(&self, new: NewCombo) -> PortResult<ServiceCombo> {
        let mut t = self.tables.lock().await;
        let combo = ServiceCombo {
            id: Uuid::new_v4(),
            host_id: new.host_id,
            name: new.name,
            address: new.address,
            description: new.description,
            price: new.price,
            available_slots: new.available_slots,
            capacity: new.capacity,
            status: ComboStatus::Open,
            cancellation_policy: new.cancellation_policy,
            created_at: Utc::now(),
        };
        for (service_id, quantity) in new.details {
            t.combo_details.push(ServiceComboDetail {
                combo_id: combo.id,
                service_id,
                quantity,
            });
        }
        t.combos.insert(combo.id, combo.clone());
        Ok(combo)
    }

    async fn get_combo(&self, combo_id: Uuid) -> PortResult<ServiceCombo> {
        let t = self.tables.lock().await;
        t.combos
            .get(&combo_id)
            .cloned()
            .ok_or_else(|| not_found("Combo", combo_id))
    }

    async fn get_combo_details(&self, combo_id: Uuid) -> PortResult<Vec<ServiceComboDetail>> {
        let t = self.tables.lock().await;
        Ok(t.combo_details
            .iter()
            .filter(|d| d.combo_id == combo_id)
            .cloned()
            .collect())
    }

    async fn create_service(&self, service: Service) -> PortResult<Service> {
        let mut t = self.tables.lock().await;
        t.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn get_service(&self, service_id: Uuid) -> PortResult<Service> {
        let t = self.tables.lock().await;
        t.services
            .get(&service_id)
            .cloned()
            .ok_or_else(|| not_found("Service", service_id))
    }

    async fn create_coupon(&self, coupon: Coupon) -> PortResult<Coupon> {
        let mut t = self.tables.lock().await;
        if t.coupons.values().any(|c| c.code == coupon.code) {
            return Err(PortError::Conflict(format!("coupon code {} already exists", coupon.code)));
        }
        t.coupons.insert(coupon.id, coupon.clone());
        Ok(coupon)
    }

    async fn get_coupon(&self, coupon_id: Uuid) -> PortResult<Coupon> {
        let t = self.tables.lock().await;
        t.coupons
            .get(&coupon_id)
            .cloned()
            .ok_or_else(|| not_found("Coupon", coupon_id))
    }

    async fn list_coupons_for_combo(&self, combo_id: Uuid) -> PortResult<Vec<Coupon>> {
        let t = self.tables.lock().await;
        let mut coupons: Vec<Coupon> = t
            .coupons
            .values()
            .filter(|c| c.combo_id == combo_id)
            .cloned()
            .collect();
        coupons.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(coupons)
    }

    async fn delete_coupon(&self, coupon_id: Uuid) -> PortResult<()> {
        let mut t = self.tables.lock().await;
        if t.booking_coupons.iter().any(|bc| bc.coupon_id == coupon_id) {
            // Applied coupons stay for the booking history; retire them instead.
            if let Some(c) = t.coupons.get_mut(&coupon_id) {
                c.is_active = false;
            }
            return Ok(());
        }
        t.coupons
            .remove(&coupon_id)
            .map(|_| ())
            .ok_or_else(|| not_found("Coupon", coupon_id))
    }

    async fn get_booking(&self, booking_id: Uuid) -> PortResult<Booking> {
        let t = self.tables.lock().await;
        t.bookings
            .get(&booking_id)
            .cloned()
            .ok_or_else(|| not_found("Booking", booking_id))
    }

    async fn get_booking_coupons(&self, booking_id: Uuid) -> PortResult<Vec<BookingCoupon>> {
        let t = self.tables.lock().await;
        let mut applied: Vec<BookingCoupon> = t
            .booking_coupons
            .iter()
            .filter(|bc| bc.booking_id == booking_id)
            .cloned()
            .collect();
        applied.sort_by_key(|bc| bc.position);
        Ok(applied)
    }

    async fn list_bookings_for_account(&self, account_id: Uuid) -> PortResult<Vec<Booking>> {
        let t = self.tables.lock().await;
        let mut bookings: Vec<Booking> = t
            .bookings
            .values()
            .filter(|b| b.account_id == account_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        Ok(bookings)
    }

    async fn create_payment(&self, payment: Payment) -> PortResult<Payment> {
        let mut t = self.tables.lock().await;
        t.payments.push(payment.clone());
        Ok(payment)
    }

    async fn list_payments(&self, booking_id: Uuid) -> PortResult<Vec<Payment>> {
        let t = self.tables.lock().await;
        Ok(t.payments
            .iter()
            .filter(|p| p.booking_id == booking_id)
            .cloned()
            .collect())
    }

    async fn review_exists(&self, booking_id: Uuid, author_id: Uuid) -> PortResult<bool> {
        let t = self.tables.lock().await;
        Ok(t.reviews
            .iter()
            .any(|r| r.booking_id == Some(booking_id) && r.author_id == author_id))
    }

    async fn create_review(&self, review: Review) -> PortResult<Review> {
        let mut t = self.tables.lock().await;
        let duplicate = review.booking_id.is_some()
            && t.reviews
                .iter()
                .any(|r| r.booking_id == review.booking_id && r.author_id == review.author_id);
        if duplicate {
            return Err(PortError::Conflict("booking already reviewed".to_string()));
        }
        t.reviews.push(review.clone());
        Ok(review)
    }

    async fn list_reviews_for_combo(&self, combo_id: Uuid) -> PortResult<Vec<Review>> {
        let t = self.tables.lock().await;
        Ok(t.reviews
            .iter()
            .filter(|r| r.combo_id == combo_id)
            .cloned()
            .collect())
    }

    async fn begin(&self) -> PortResult<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork { guard, staged }))
    }
}

//=========================================================================================
// Unit of work
//=========================================================================================

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_combo(&mut self, combo_id: Uuid) -> PortResult<Option<ServiceCombo>> {
        Ok(self.staged.combos.get(&combo_id).cloned())
    }

    async fn get_service(&mut self, service_id: Uuid) -> PortResult<Option<Service>> {
        Ok(self.staged.services.get(&service_id).cloned())
    }

    async fn lock_coupon_by_code(&mut self, code: &str) -> PortResult<Option<Coupon>> {
        Ok(self.staged.coupons.values().find(|c| c.code == code).cloned())
    }

    async fn lock_booking(&mut self, booking_id: Uuid) -> PortResult<Option<Booking>> {
        Ok(self.staged.bookings.get(&booking_id).cloned())
    }

    async fn save_available_slots(&mut self, combo_id: Uuid, available_slots: i32) -> PortResult<()> {
        if available_slots < 0 {
            return Err(PortError::Conflict("available slots would go negative".to_string()));
        }
        let combo = self
            .staged
            .combos
            .get_mut(&combo_id)
            .ok_or_else(|| not_found("Combo", combo_id))?;
        combo.available_slots = available_slots;
        Ok(())
    }

    async fn insert_booking(&mut self, booking: &Booking) -> PortResult<()> {
        self.staged.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn insert_booking_coupon(&mut self, applied: &BookingCoupon) -> PortResult<()> {
        let exists = self
            .staged
            .booking_coupons
            .iter()
            .any(|bc| bc.booking_id == applied.booking_id && bc.coupon_id == applied.coupon_id);
        if exists {
            return Err(PortError::Conflict("coupon already applied to booking".to_string()));
        }
        self.staged.booking_coupons.push(applied.clone());
        Ok(())
    }

    async fn increment_coupon_usage(&mut self, coupon_id: Uuid) -> PortResult<()> {
        let coupon = self
            .staged
            .coupons
            .get_mut(&coupon_id)
            .ok_or_else(|| not_found("Coupon", coupon_id))?;
        if coupon.usage_count >= coupon.usage_limit {
            return Err(PortError::Conflict(format!("coupon {} exhausted", coupon.code)));
        }
        coupon.usage_count += 1;
        Ok(())
    }

    async fn update_booking_status(&mut self, booking: &Booking) -> PortResult<()> {
        let stored = self
            .staged
            .bookings
            .get_mut(&booking.id)
            .ok_or_else(|| not_found("Booking", booking.id))?;
        stored.status = booking.status;
        stored.confirmed_date = booking.confirmed_date;
        stored.completed_date = booking.completed_date;
        stored.cancelled_date = booking.cancelled_date;
        Ok(())
    }

    async fn count_bookings(&mut self, combo_id: Uuid, active_only: bool) -> PortResult<i64> {
        let count = self
            .staged
            .bookings
            .values()
            .filter(|b| b.target == BookingTarget::Combo(combo_id))
            .filter(|b| !active_only || b.status.is_active())
            .count();
        Ok(count as i64)
    }

    async fn save_combo_status(&mut self, combo_id: Uuid, status: &ComboStatus) -> PortResult<()> {
        let combo = self
            .staged
            .combos
            .get_mut(&combo_id)
            .ok_or_else(|| not_found("Combo", combo_id))?;
        combo.status = status.clone();
        Ok(())
    }

    async fn delete_combo(&mut self, combo_id: Uuid) -> PortResult<()> {
        self.staged.combos.remove(&combo_id);
        self.staged.coupons.retain(|_, c| c.combo_id != combo_id);
        self.staged.combo_details.retain(|d| d.combo_id != combo_id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> PortResult<()> {
        let MemoryUnitOfWork { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}
