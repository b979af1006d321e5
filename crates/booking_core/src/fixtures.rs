//! Seed helpers shared by the unit tests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Actor, Coupon, Role, Service, ServiceCombo};
use crate::memory::MemoryDatabase;
use crate::ports::{DatabaseService, NewAccount, NewCombo};

pub struct World {
    pub db: Arc<MemoryDatabase>,
    pub host: Actor,
    pub tourist: Actor,
    pub admin: Actor,
}

impl World {
    pub async fn new() -> Self {
        let db = Arc::new(MemoryDatabase::new());
        let host = account(&db, "host@example.com", Role::Host).await;
        let tourist = account(&db, "tourist@example.com", Role::Tourist).await;
        let admin = account(&db, "admin@example.com", Role::Admin).await;
        Self {
            db,
            host,
            tourist,
            admin,
        }
    }

    pub fn dyn_db(&self) -> Arc<dyn DatabaseService> {
        self.db.clone()
    }

    pub async fn another_tourist(&self, email: &str) -> Actor {
        account(&self.db, email, Role::Tourist).await
    }

    pub async fn combo(&self, price: Decimal, slots: i32) -> ServiceCombo {
        self.db
            .create_combo(NewCombo {
                host_id: self.host.account_id,
                name: "Sapa trekking 3D2N".to_string(),
                address: "Sapa, Lao Cai".to_string(),
                description: None,
                price,
                available_slots: slots,
                capacity: None,
                cancellation_policy: Some("Free cancellation 48h before start".to_string()),
                details: Vec::new(),
            })
            .await
            .unwrap()
    }

    pub async fn service(&self, price: Decimal) -> Service {
        self.db
            .create_service(Service {
                id: Uuid::new_v4(),
                host_id: self.host.account_id,
                name: "Airport pickup".to_string(),
                price,
            })
            .await
            .unwrap()
    }

    pub async fn coupon(&self, combo_id: Uuid, code: &str, shape: CouponShape) -> Coupon {
        self.db
            .create_coupon(Coupon {
                id: Uuid::new_v4(),
                host_id: self.host.account_id,
                combo_id,
                code: code.to_string(),
                description: None,
                discount_percent: shape.percent,
                discount_amount: shape.amount,
                usage_limit: shape.limit,
                usage_count: shape.used,
                is_active: shape.active,
                expiry_date: shape.expiry,
                created_at: Utc::now(),
            })
            .await
            .unwrap()
    }
}

pub struct CouponShape {
    pub percent: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub limit: i32,
    pub used: i32,
    pub active: bool,
    pub expiry: Option<DateTime<Utc>>,
}

impl CouponShape {
    pub fn percent(percent: Decimal) -> Self {
        Self {
            percent: Some(percent),
            amount: None,
            limit: 5,
            used: 0,
            active: true,
            expiry: None,
        }
    }

    pub fn amount(amount: Decimal) -> Self {
        Self {
            percent: None,
            amount: Some(amount),
            ..Self::percent(Decimal::ZERO)
        }
    }

    pub fn used(mut self, used: i32, limit: i32) -> Self {
        self.used = used;
        self.limit = limit;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

async fn account(db: &MemoryDatabase, email: &str, role: Role) -> Actor {
    let account = db
        .create_account(NewAccount {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            full_name: "Test Account".to_string(),
            phone: None,
            role,
        })
        .await
        .unwrap();
    Actor {
        account_id: account.id,
        role,
    }
}
