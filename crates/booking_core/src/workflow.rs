//! crates/booking_core/src/workflow.rs
//!
//! The booking workflow: creation (coupon validation, pricing, slot
//! reservation) and the status lifecycle. Every operation runs inside a single
//! unit of work, so a failure at any step leaves no partial state behind.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::coupon;
use crate::domain::{
    Actor, Booking, BookingCoupon, BookingDetail, BookingStatus, BookingTarget, ComboStatus,
    Coupon,
};
use crate::error::{BookingError, BookingResult, CouponError};
use crate::ports::{DatabaseService, PortError};
use crate::pricing;
use crate::slots;

/// Input for `BookingWorkflow::create_booking`.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub target: BookingTarget,
    pub quantity: i32,
    pub notes: Option<String>,
    pub coupon_codes: Vec<String>,
}

/// What happened to a combo on `delete_combo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboRemoval {
    Deleted,
    /// The combo has booking history; it was closed and marked archived instead.
    Archived,
}

pub const ARCHIVED_STATUS: &str = "archived";

#[derive(Clone)]
pub struct BookingWorkflow {
    db: Arc<dyn DatabaseService>,
}

impl BookingWorkflow {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    //=====================================================================================
    // Creation
    //=====================================================================================

    #[instrument(skip(self, request), fields(account_id = %actor.account_id, quantity = request.quantity))]
    pub async fn create_booking(
        &self,
        actor: Actor,
        request: CreateBooking,
    ) -> BookingResult<BookingDetail> {
        if request.quantity < 1 {
            return Err(BookingError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }

        let now = Utc::now();
        let mut uow = self.db.begin().await?;

        // 1. Load (and lock) what is being booked.
        let (unit_price, mut combo) = match request.target {
            BookingTarget::Combo(combo_id) => {
                let combo = uow
                    .lock_combo(combo_id)
                    .await?
                    .ok_or(BookingError::ComboNotFound(combo_id))?;
                if combo.status != ComboStatus::Open {
                    return Err(BookingError::ComboNotOpen(combo_id));
                }
                (combo.price, Some(combo))
            }
            BookingTarget::Service(service_id) => {
                let service = uow
                    .get_service(service_id)
                    .await?
                    .ok_or(BookingError::ServiceNotFound(service_id))?;
                (service.price, None)
            }
        };

        // 2-3. Coupons: no duplicates, then each one validated in submission order.
        coupon::ensure_unique_codes(&request.coupon_codes)?;
        let mut coupons: Vec<Coupon> = Vec::with_capacity(request.coupon_codes.len());
        for code in &request.coupon_codes {
            let validated = match request.target {
                BookingTarget::Combo(combo_id) => {
                    coupon::validate(&mut *uow, code, combo_id, now).await??
                }
                BookingTarget::Service(_) => {
                    // Coupons are scoped to combos and never apply to a single service.
                    return Err(match uow.lock_coupon_by_code(code).await? {
                        Some(_) => CouponError::NotApplicable(code.clone()),
                        None => CouponError::NotFound(code.clone()),
                    }
                    .into());
                }
            };
            coupons.push(validated);
        }

        // 4. Price.
        let total_amount = pricing::compute_total(unit_price, request.quantity, &coupons)?;

        // 5. Capacity.
        if let Some(combo) = combo.as_mut() {
            slots::reserve(combo, request.quantity)?;
            uow.save_available_slots(combo.id, combo.available_slots)
                .await?;
        }

        // 6. Persist booking, applied coupons and usage counts.
        let booking = Booking {
            id: Uuid::new_v4(),
            account_id: actor.account_id,
            target: request.target,
            quantity: request.quantity,
            unit_price,
            total_amount,
            status: BookingStatus::Pending,
            notes: request.notes,
            booking_date: now,
            confirmed_date: None,
            completed_date: None,
            cancelled_date: None,
        };
        uow.insert_booking(&booking).await?;

        let mut applied = Vec::with_capacity(coupons.len());
        for (position, c) in coupons.iter().enumerate() {
            let row = BookingCoupon {
                booking_id: booking.id,
                coupon_id: c.id,
                coupon_code: c.code.clone(),
                position: position as i32,
                applied_at: now,
            };
            uow.insert_booking_coupon(&row).await?;
            uow.increment_coupon_usage(c.id).await?;
            applied.push(row);
        }

        uow.commit().await?;
        info!(
            booking_id = %booking.id,
            total = %booking.total_amount,
            coupons = applied.len(),
            "Booking created"
        );

        Ok(BookingDetail {
            booking,
            coupons: applied,
        })
    }

    //=====================================================================================
    // Reads
    //=====================================================================================

    /// Visible to the booking owner, the host of the booked item, and admins.
    pub async fn get_booking(&self, actor: Actor, booking_id: Uuid) -> BookingResult<BookingDetail> {
        let booking = self.load_booking(booking_id).await?;
        if actor.account_id != booking.account_id && !actor.is_admin() {
            let host_id = host_of(self.db.as_ref(), booking.target).await?;
            if host_id != actor.account_id {
                return Err(BookingError::Unauthorized);
            }
        }
        let coupons = self.db.get_booking_coupons(booking_id).await?;
        Ok(BookingDetail { booking, coupons })
    }

    pub async fn list_bookings(&self, actor: Actor) -> BookingResult<Vec<Booking>> {
        Ok(self.db.list_bookings_for_account(actor.account_id).await?)
    }

    //=====================================================================================
    // Lifecycle
    //=====================================================================================

    pub async fn confirm(&self, actor: Actor, booking_id: Uuid) -> BookingResult<Booking> {
        self.transition(actor, booking_id, BookingStatus::Confirmed).await
    }

    pub async fn complete(&self, actor: Actor, booking_id: Uuid) -> BookingResult<Booking> {
        self.transition(actor, booking_id, BookingStatus::Completed).await
    }

    /// Cancels and gives the slots back. Coupon usage stays consumed.
    pub async fn cancel(&self, actor: Actor, booking_id: Uuid) -> BookingResult<Booking> {
        self.transition(actor, booking_id, BookingStatus::Cancelled).await
    }

    #[instrument(skip(self), fields(account_id = %actor.account_id))]
    async fn transition(
        &self,
        actor: Actor,
        booking_id: Uuid,
        next: BookingStatus,
    ) -> BookingResult<Booking> {
        let mut uow = self.db.begin().await?;
        let mut booking = uow
            .lock_booking(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        // Lock order is booking, then combo; creation never locks an existing booking.
        let (host_id, mut combo) = match booking.target {
            BookingTarget::Combo(combo_id) => {
                let combo = uow
                    .lock_combo(combo_id)
                    .await?
                    .ok_or(BookingError::ComboNotFound(combo_id))?;
                (combo.host_id, Some(combo))
            }
            BookingTarget::Service(service_id) => {
                let service = uow
                    .get_service(service_id)
                    .await?
                    .ok_or(BookingError::ServiceNotFound(service_id))?;
                (service.host_id, None)
            }
        };

        let allowed = actor.is_admin()
            || actor.account_id == host_id
            || (next == BookingStatus::Cancelled && actor.account_id == booking.account_id);
        if !allowed {
            warn!(%booking_id, "Rejected status change by non-owner");
            return Err(BookingError::Unauthorized);
        }

        if !booking.status.can_transition_to(next) {
            return Err(BookingError::InvalidTransition {
                from: booking.status,
                to: next,
            });
        }

        let now = Utc::now();
        match next {
            BookingStatus::Confirmed => booking.confirmed_date = Some(now),
            BookingStatus::Completed => booking.completed_date = Some(now),
            BookingStatus::Cancelled => {
                booking.cancelled_date = Some(now);
                if let Some(combo) = combo.as_mut() {
                    slots::release(combo, booking.quantity);
                    uow.save_available_slots(combo.id, combo.available_slots)
                        .await?;
                }
            }
            BookingStatus::Pending => {}
        }
        let previous = booking.status;
        booking.status = next;

        uow.update_booking_status(&booking).await?;
        uow.commit().await?;
        info!(%booking_id, from = %previous, to = %next, "Booking status changed");
        Ok(booking)
    }

    //=====================================================================================
    // Combo lifecycle
    //=====================================================================================

    pub async fn set_combo_status(
        &self,
        actor: Actor,
        combo_id: Uuid,
        status: ComboStatus,
    ) -> BookingResult<()> {
        let mut uow = self.db.begin().await?;
        let combo = uow
            .lock_combo(combo_id)
            .await?
            .ok_or(BookingError::ComboNotFound(combo_id))?;
        if combo.host_id != actor.account_id && !actor.is_admin() {
            return Err(BookingError::Unauthorized);
        }
        uow.save_combo_status(combo_id, &status).await?;
        uow.commit().await?;
        info!(%combo_id, status = status.as_str(), "Combo status changed");
        Ok(())
    }

    /// Deleting a combo with pending or confirmed bookings is rejected. A combo
    /// with only historical bookings is archived so those bookings stay intact.
    pub async fn delete_combo(&self, actor: Actor, combo_id: Uuid) -> BookingResult<ComboRemoval> {
        let mut uow = self.db.begin().await?;
        let combo = uow
            .lock_combo(combo_id)
            .await?
            .ok_or(BookingError::ComboNotFound(combo_id))?;
        if combo.host_id != actor.account_id && !actor.is_admin() {
            return Err(BookingError::Unauthorized);
        }
        if uow.count_bookings(combo_id, true).await? > 0 {
            return Err(BookingError::ComboHasActiveBookings(combo_id));
        }

        let removal = if uow.count_bookings(combo_id, false).await? > 0 {
            uow.save_combo_status(combo_id, &ComboStatus::Other(ARCHIVED_STATUS.to_string()))
                .await?;
            ComboRemoval::Archived
        } else {
            uow.delete_combo(combo_id).await?;
            ComboRemoval::Deleted
        };
        uow.commit().await?;
        info!(%combo_id, ?removal, "Combo removed");
        Ok(removal)
    }

    //=====================================================================================
    // Helpers
    //=====================================================================================

    async fn load_booking(&self, booking_id: Uuid) -> BookingResult<Booking> {
        self.db.get_booking(booking_id).await.map_err(|e| match e {
            PortError::NotFound(_) => BookingError::BookingNotFound(booking_id),
            other => other.into(),
        })
    }
}

/// The account that owns the booked combo or service.
pub(crate) async fn host_of(db: &dyn DatabaseService, target: BookingTarget) -> BookingResult<Uuid> {
    match target {
        BookingTarget::Combo(id) => db.get_combo(id).await.map(|c| c.host_id).map_err(|e| match e {
            PortError::NotFound(_) => BookingError::ComboNotFound(id),
            other => other.into(),
        }),
        BookingTarget::Service(id) => db.get_service(id).await.map(|s| s.host_id).map_err(|e| match e {
            PortError::NotFound(_) => BookingError::ServiceNotFound(id),
            other => other.into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlotError;
    use crate::fixtures::{CouponShape, World};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn combo_request(combo_id: Uuid, quantity: i32, codes: &[&str]) -> CreateBooking {
        CreateBooking {
            target: BookingTarget::Combo(combo_id),
            quantity,
            notes: Some("Vegetarian meals please".to_string()),
            coupon_codes: codes.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn booking_with_coupon_should_price_reserve_and_count_usage() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(200000), 2).await;
        let coupon = world.coupon(combo.id, "SAPA15", CouponShape::percent(dec!(15))).await;

        let detail = workflow
            .create_booking(world.tourist, combo_request(combo.id, 2, &["SAPA15"]))
            .await
            .unwrap();

        assert_eq!(detail.booking.total_amount, dec!(340000));
        assert_eq!(detail.booking.unit_price, dec!(200000));
        assert_eq!(detail.booking.status, BookingStatus::Pending);
        assert_eq!(detail.coupons.len(), 1);
        assert_eq!(detail.coupons[0].coupon_id, coupon.id);
        assert_eq!(world.db.get_combo(combo.id).await.unwrap().available_slots, 0);
        assert_eq!(world.db.get_coupon(coupon.id).await.unwrap().usage_count, 1);

        let err = workflow
            .create_booking(world.tourist, combo_request(combo.id, 1, &[]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::Slots(SlotError::InsufficientSlots { requested: 1, available: 0 })
        ));
    }

    #[tokio::test]
    async fn failing_coupon_should_leave_no_partial_state() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(100), 5).await;
        let good = world.coupon(combo.id, "GOOD10", CouponShape::percent(dec!(10))).await;
        let mut expired = CouponShape::amount(dec!(20));
        expired.expiry = Some(Utc::now() - Duration::seconds(1));
        world.coupon(combo.id, "OLD20", expired).await;

        let err = workflow
            .create_booking(world.tourist, combo_request(combo.id, 1, &["GOOD10", "OLD20"]))
            .await
            .unwrap_err();

        assert!(matches!(err, BookingError::Coupon(CouponError::Expired(code)) if code == "OLD20"));
        assert_eq!(world.db.get_combo(combo.id).await.unwrap().available_slots, 5);
        assert_eq!(world.db.get_coupon(good.id).await.unwrap().usage_count, 0);
        assert!(workflow.list_bookings(world.tourist).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn exhausted_and_inactive_coupons_should_abort_booking() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(100), 5).await;
        world.coupon(combo.id, "FULL", CouponShape::percent(dec!(5)).used(3, 3)).await;
        world.coupon(combo.id, "OFF", CouponShape::percent(dec!(5)).inactive()).await;

        let err = workflow
            .create_booking(world.tourist, combo_request(combo.id, 1, &["FULL"]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Coupon(CouponError::LimitReached(_))));

        let err = workflow
            .create_booking(world.tourist, combo_request(combo.id, 1, &["OFF"]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Coupon(CouponError::Inactive(_))));

        let err = workflow
            .create_booking(world.tourist, combo_request(combo.id, 1, &["MISSING"]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Coupon(CouponError::NotFound(_))));
    }

    #[tokio::test]
    async fn coupon_of_another_combo_should_not_apply() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(100), 5).await;
        let other = world.combo(dec!(100), 5).await;
        world.coupon(other.id, "ELSEWHERE", CouponShape::percent(dec!(10))).await;

        let err = workflow
            .create_booking(world.tourist, combo_request(combo.id, 1, &["ELSEWHERE"]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Coupon(CouponError::NotApplicable(_))));
    }

    #[tokio::test]
    async fn duplicate_codes_should_be_rejected() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(100), 5).await;
        world.coupon(combo.id, "TWICE", CouponShape::percent(dec!(10))).await;

        let err = workflow
            .create_booking(world.tourist, combo_request(combo.id, 1, &["TWICE", "TWICE"]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::DuplicateCoupon(code) if code == "TWICE"));
    }

    #[tokio::test]
    async fn invalid_requests_should_be_rejected() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(100), 5).await;

        let err = workflow
            .create_booking(world.tourist, combo_request(combo.id, 0, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));

        let missing = Uuid::new_v4();
        let err = workflow
            .create_booking(world.tourist, combo_request(missing, 1, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::ComboNotFound(id) if id == missing));

        workflow
            .set_combo_status(world.host, combo.id, ComboStatus::Closed)
            .await
            .unwrap();
        let err = workflow
            .create_booking(world.tourist, combo_request(combo.id, 1, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::ComboNotOpen(_)));
    }

    #[tokio::test]
    async fn service_booking_should_price_without_slots_or_coupons() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let service = world.service(dec!(150000)).await;
        let combo = world.combo(dec!(100), 5).await;
        world.coupon(combo.id, "COMBO10", CouponShape::percent(dec!(10))).await;

        let detail = workflow
            .create_booking(
                world.tourist,
                CreateBooking {
                    target: BookingTarget::Service(service.id),
                    quantity: 2,
                    notes: None,
                    coupon_codes: Vec::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(detail.booking.total_amount, dec!(300000));
        assert_eq!(detail.booking.target.item_type(), "service");

        let err = workflow
            .create_booking(
                world.tourist,
                CreateBooking {
                    target: BookingTarget::Service(service.id),
                    quantity: 1,
                    notes: None,
                    coupon_codes: vec!["COMBO10".to_string()],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Coupon(CouponError::NotApplicable(_))));
    }

    #[tokio::test]
    async fn cancel_confirmed_booking_should_release_slots_but_keep_coupon_usage() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(100), 8).await;
        let coupon = world.coupon(combo.id, "KEEP", CouponShape::amount(dec!(10))).await;

        let detail = workflow
            .create_booking(world.tourist, combo_request(combo.id, 3, &["KEEP"]))
            .await
            .unwrap();
        let booking_id = detail.booking.id;
        assert_eq!(world.db.get_combo(combo.id).await.unwrap().available_slots, 5);

        let confirmed = workflow.confirm(world.host, booking_id).await.unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert!(confirmed.confirmed_date.is_some());

        let cancelled = workflow.cancel(world.tourist, booking_id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(world.db.get_combo(combo.id).await.unwrap().available_slots, 8);
        assert_eq!(world.db.get_coupon(coupon.id).await.unwrap().usage_count, 1);

        let err = workflow.cancel(world.tourist, booking_id).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidTransition { from: BookingStatus::Cancelled, to: BookingStatus::Cancelled }
        ));
    }

    #[tokio::test]
    async fn lifecycle_should_reject_out_of_order_and_foreign_actors() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(100), 5).await;
        let booking_id = workflow
            .create_booking(world.tourist, combo_request(combo.id, 1, &[]))
            .await
            .unwrap()
            .booking
            .id;

        let stranger = world.another_tourist("stranger@example.com").await;
        assert!(matches!(
            workflow.cancel(stranger, booking_id).await.unwrap_err(),
            BookingError::Unauthorized
        ));
        assert!(matches!(
            workflow.confirm(world.tourist, booking_id).await.unwrap_err(),
            BookingError::Unauthorized
        ));
        assert!(matches!(
            workflow.get_booking(stranger, booking_id).await.unwrap_err(),
            BookingError::Unauthorized
        ));
        assert!(matches!(
            workflow.complete(world.host, booking_id).await.unwrap_err(),
            BookingError::InvalidTransition { from: BookingStatus::Pending, to: BookingStatus::Completed }
        ));

        workflow.confirm(world.admin, booking_id).await.unwrap();
        let completed = workflow.complete(world.host, booking_id).await.unwrap();
        assert!(completed.completed_date.is_some());
        assert!(matches!(
            workflow.cancel(world.tourist, booking_id).await.unwrap_err(),
            BookingError::InvalidTransition { from: BookingStatus::Completed, .. }
        ));

        let seen_by_host = workflow.get_booking(world.host, booking_id).await.unwrap();
        assert_eq!(seen_by_host.booking.status, BookingStatus::Completed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_bookings_for_last_slot_should_admit_exactly_one() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(100), 1).await;

        let attempts = (0..8).map(|_| {
            let workflow = workflow.clone();
            let actor = world.tourist;
            let request = combo_request(combo.id, 1, &[]);
            tokio::spawn(async move { workflow.create_booking(actor, request).await })
        });
        let results = futures::future::join_all(attempts).await;

        let mut admitted = 0;
        for result in results {
            match result.unwrap() {
                Ok(_) => admitted += 1,
                Err(BookingError::Slots(SlotError::InsufficientSlots { .. }))
                | Err(BookingError::Conflict(_)) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(world.db.get_combo(combo.id).await.unwrap().available_slots, 0);
    }

    #[tokio::test]
    async fn delete_combo_should_respect_active_bookings() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(100), 5).await;
        let booking_id = workflow
            .create_booking(world.tourist, combo_request(combo.id, 1, &[]))
            .await
            .unwrap()
            .booking
            .id;

        assert!(matches!(
            workflow.delete_combo(world.host, combo.id).await.unwrap_err(),
            BookingError::ComboHasActiveBookings(_)
        ));

        workflow.cancel(world.tourist, booking_id).await.unwrap();
        assert_eq!(
            workflow.delete_combo(world.host, combo.id).await.unwrap(),
            ComboRemoval::Archived
        );
        let archived = world.db.get_combo(combo.id).await.unwrap();
        assert_eq!(archived.status.as_str(), ARCHIVED_STATUS);

        let unused = world.combo(dec!(100), 5).await;
        assert!(matches!(
            workflow.delete_combo(world.tourist, unused.id).await.unwrap_err(),
            BookingError::Unauthorized
        ));
        assert_eq!(
            workflow.delete_combo(world.host, unused.id).await.unwrap(),
            ComboRemoval::Deleted
        );
        assert!(world.db.get_combo(unused.id).await.is_err());
    }

    #[tokio::test]
    async fn applied_coupons_should_read_back_in_submission_order() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(dec!(200000), 4).await;
        let flat = world.coupon(combo.id, "ZFLAT", CouponShape::amount(dec!(20000))).await;
        let pct = world.coupon(combo.id, "APCT", CouponShape::percent(dec!(10))).await;

        let created = workflow
            .create_booking(world.tourist, combo_request(combo.id, 2, &["ZFLAT", "APCT"]))
            .await
            .unwrap();
        // (400000 - 20000) * 0.9, not 400000 * 0.9 - 20000
        assert_eq!(created.booking.total_amount, dec!(342000));

        let detail = workflow.get_booking(world.tourist, created.booking.id).await.unwrap();
        let order: Vec<(Uuid, i32)> = detail.coupons.iter().map(|c| (c.coupon_id, c.position)).collect();
        assert_eq!(order, vec![(flat.id, 0), (pct.id, 1)]);
    }

    #[tokio::test]
    async fn oversized_total_should_be_rejected_without_reserving() {
        let world = World::new().await;
        let workflow = BookingWorkflow::new(world.dyn_db());
        let combo = world.combo(pricing::max_amount(), 5).await;
        let service = world.service(pricing::max_amount()).await;

        let err = workflow
            .create_booking(world.tourist, combo_request(combo.id, 2, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert_eq!(world.db.get_combo(combo.id).await.unwrap().available_slots, 5);

        let err = workflow
            .create_booking(
                world.tourist,
                CreateBooking {
                    target: BookingTarget::Service(service.id),
                    quantity: 2,
                    notes: None,
                    coupon_codes: Vec::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert!(workflow.list_bookings(world.tourist).await.unwrap().is_empty());
    }
}
