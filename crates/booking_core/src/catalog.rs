//! crates/booking_core/src/catalog.rs
//!
//! Host-side management of combos, services and coupons.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Actor, Coupon, Role, Service, ServiceCombo, ServiceComboDetail};
use crate::error::{BookingError, BookingResult};
use crate::ports::{DatabaseService, NewCombo, PortError};
use crate::pricing;

#[derive(Debug, Clone)]
pub struct ComboInput {
    pub name: String,
    pub address: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub available_slots: i32,
    pub capacity: Option<i32>,
    pub cancellation_policy: Option<String>,
    pub details: Vec<(Uuid, i32)>,
}

#[derive(Debug, Clone)]
pub struct CouponInput {
    pub combo_id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_percent: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub usage_limit: i32,
    pub expiry_date: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct Catalog {
    db: Arc<dyn DatabaseService>,
}

impl Catalog {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    pub async fn create_combo(&self, actor: Actor, input: ComboInput) -> BookingResult<ServiceCombo> {
        ensure_host(actor)?;
        if input.name.trim().is_empty() || input.address.trim().is_empty() {
            return Err(invalid("name and address are required"));
        }
        check_price(input.price)?;
        if input.available_slots < 0 {
            return Err(invalid("available slots cannot be negative"));
        }
        if matches!(input.capacity, Some(cap) if cap < input.available_slots) {
            return Err(invalid("capacity cannot be below available slots"));
        }
        for (service_id, quantity) in &input.details {
            if *quantity < 1 {
                return Err(invalid("detail quantity must be at least 1"));
            }
            self.get_service(*service_id).await?;
        }

        let combo = self
            .db
            .create_combo(NewCombo {
                host_id: actor.account_id,
                name: input.name,
                address: input.address,
                description: input.description,
                price: input.price,
                available_slots: input.available_slots,
                capacity: input.capacity,
                cancellation_policy: input.cancellation_policy,
                details: input.details,
            })
            .await?;
        info!(combo_id = %combo.id, host_id = %combo.host_id, "Combo created");
        Ok(combo)
    }

    pub async fn get_combo(&self, combo_id: Uuid) -> BookingResult<(ServiceCombo, Vec<ServiceComboDetail>)> {
        let combo = self.db.get_combo(combo_id).await.map_err(|e| match e {
            PortError::NotFound(_) => BookingError::ComboNotFound(combo_id),
            other => other.into(),
        })?;
        let details = self.db.get_combo_details(combo_id).await?;
        Ok((combo, details))
    }

    pub async fn create_service(&self, actor: Actor, name: String, price: Decimal) -> BookingResult<Service> {
        ensure_host(actor)?;
        if name.trim().is_empty() {
            return Err(invalid("name is required"));
        }
        check_price(price)?;
        let service = self
            .db
            .create_service(Service {
                id: Uuid::new_v4(),
                host_id: actor.account_id,
                name,
                price,
            })
            .await?;
        Ok(service)
    }

    async fn get_service(&self, service_id: Uuid) -> BookingResult<Service> {
        self.db.get_service(service_id).await.map_err(|e| match e {
            PortError::NotFound(_) => BookingError::ServiceNotFound(service_id),
            other => other.into(),
        })
    }

    //=====================================================================================
    // Coupons
    //=====================================================================================

    pub async fn create_coupon(&self, actor: Actor, input: CouponInput) -> BookingResult<Coupon> {
        let (combo, _) = self.get_combo(input.combo_id).await?;
        if combo.host_id != actor.account_id && !actor.is_admin() {
            return Err(BookingError::Unauthorized);
        }
        if input.discount_percent.is_none() && input.discount_amount.is_none() {
            return Err(invalid("a coupon needs a percent or an amount discount"));
        }
        if let Some(percent) = input.discount_percent {
            if percent <= Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                return Err(invalid("discount percent must be in (0, 100]"));
            }
        }
        if matches!(input.discount_amount, Some(amount) if amount <= Decimal::ZERO) {
            return Err(invalid("discount amount must be positive"));
        }
        if input.usage_limit < 1 {
            return Err(invalid("usage limit must be at least 1"));
        }

        let coupon = self
            .db
            .create_coupon(Coupon {
                id: Uuid::new_v4(),
                host_id: combo.host_id,
                combo_id: combo.id,
                code: input.code,
                description: input.description,
                discount_percent: input.discount_percent,
                discount_amount: input.discount_amount,
                usage_limit: input.usage_limit,
                usage_count: 0,
                is_active: true,
                expiry_date: input.expiry_date,
                created_at: Utc::now(),
            })
            .await?;
        info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    pub async fn list_coupons(&self, combo_id: Uuid) -> BookingResult<Vec<Coupon>> {
        Ok(self.db.list_coupons_for_combo(combo_id).await?)
    }

    pub async fn delete_coupon(&self, actor: Actor, coupon_id: Uuid) -> BookingResult<()> {
        let coupon = self.db.get_coupon(coupon_id).await.map_err(|e| match e {
            PortError::NotFound(_) => BookingError::CouponNotFound(coupon_id),
            other => other.into(),
        })?;
        if coupon.host_id != actor.account_id && !actor.is_admin() {
            return Err(BookingError::Unauthorized);
        }
        self.db.delete_coupon(coupon_id).await?;
        Ok(())
    }
}

fn ensure_host(actor: Actor) -> BookingResult<()> {
    match actor.role {
        Role::Host | Role::Admin => Ok(()),
        _ => Err(BookingError::Unauthorized),
    }
}

/// Prices must fit a stored `NUMERIC(18, 2)` amount.
fn check_price(price: Decimal) -> BookingResult<()> {
    if price < Decimal::ZERO {
        return Err(invalid("price cannot be negative"));
    }
    if price > pricing::max_amount() {
        return Err(BookingError::Validation(format!(
            "price cannot exceed {}",
            pricing::max_amount()
        )));
    }
    Ok(())
}

fn invalid(msg: &str) -> BookingError {
    BookingError::Validation(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::World;
    use rust_decimal_macros::dec;

    fn coupon_input(combo_id: Uuid) -> CouponInput {
        CouponInput {
            combo_id,
            code: "TET2025".to_string(),
            description: Some("Lunar new year".to_string()),
            discount_percent: Some(dec!(10)),
            discount_amount: None,
            usage_limit: 100,
            expiry_date: None,
        }
    }

    fn combo_input(details: Vec<(Uuid, i32)>) -> ComboInput {
        ComboInput {
            name: "Mekong delta day trip".to_string(),
            address: "Can Tho".to_string(),
            description: None,
            price: dec!(850000),
            available_slots: 20,
            capacity: Some(20),
            cancellation_policy: None,
            details,
        }
    }

    #[tokio::test]
    async fn hosts_should_create_combos_with_details() {
        let world = World::new().await;
        let catalog = Catalog::new(world.dyn_db());
        let boat = world.service(dec!(300000)).await;

        let combo = catalog
            .create_combo(world.host, combo_input(vec![(boat.id, 2)]))
            .await
            .unwrap();
        let (stored, details) = catalog.get_combo(combo.id).await.unwrap();
        assert_eq!(stored.capacity, Some(20));
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].quantity, 2);

        assert!(matches!(
            catalog.create_combo(world.tourist, combo_input(Vec::new())).await.unwrap_err(),
            BookingError::Unauthorized
        ));
        assert!(matches!(
            catalog
                .create_combo(world.host, combo_input(vec![(Uuid::new_v4(), 1)]))
                .await
                .unwrap_err(),
            BookingError::ServiceNotFound(_)
        ));
    }

    #[tokio::test]
    async fn coupon_rules_should_be_validated_on_create() {
        let world = World::new().await;
        let catalog = Catalog::new(world.dyn_db());
        let combo = world.combo(dec!(100), 5).await;

        let mut no_discount = coupon_input(combo.id);
        no_discount.discount_percent = None;
        assert!(matches!(
            catalog.create_coupon(world.host, no_discount).await.unwrap_err(),
            BookingError::Validation(_)
        ));

        let mut too_much = coupon_input(combo.id);
        too_much.discount_percent = Some(dec!(120));
        assert!(matches!(
            catalog.create_coupon(world.host, too_much).await.unwrap_err(),
            BookingError::Validation(_)
        ));

        assert!(matches!(
            catalog.create_coupon(world.tourist, coupon_input(combo.id)).await.unwrap_err(),
            BookingError::Unauthorized
        ));

        let coupon = catalog.create_coupon(world.host, coupon_input(combo.id)).await.unwrap();
        assert_eq!(coupon.usage_count, 0);
        assert!(coupon.is_active);
        assert!(matches!(
            catalog.create_coupon(world.host, coupon_input(combo.id)).await.unwrap_err(),
            BookingError::Conflict(_)
        ));

        assert_eq!(catalog.list_coupons(combo.id).await.unwrap().len(), 1);
        catalog.delete_coupon(world.admin, coupon.id).await.unwrap();
        assert!(catalog.list_coupons(combo.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn prices_beyond_stored_range_should_be_rejected() {
        let world = World::new().await;
        let catalog = Catalog::new(world.dyn_db());

        let mut huge = combo_input(Vec::new());
        huge.price = Decimal::MAX;
        assert!(matches!(
            catalog.create_combo(world.host, huge).await.unwrap_err(),
            BookingError::Validation(_)
        ));
        assert!(matches!(
            catalog
                .create_service(world.host, "Private yacht".to_string(), Decimal::MAX)
                .await
                .unwrap_err(),
            BookingError::Validation(_)
        ));

        let mut largest = combo_input(Vec::new());
        largest.price = pricing::max_amount();
        assert!(catalog.create_combo(world.host, largest).await.is_ok());
    }
}
