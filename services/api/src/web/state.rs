//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use booking_core::ports::DatabaseService;
use booking_core::{BookingWorkflow, Catalog, PaymentService, ReviewService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub bookings: BookingWorkflow,
    pub catalog: Catalog,
    pub reviews: ReviewService,
    pub payments: PaymentService,
}

impl AppState {
    /// Wires every core service to the same storage.
    pub fn new(db: Arc<dyn DatabaseService>, config: Arc<Config>) -> Self {
        Self {
            bookings: BookingWorkflow::new(db.clone()),
            catalog: Catalog::new(db.clone()),
            reviews: ReviewService::new(db.clone()),
            payments: PaymentService::new(db.clone()),
            db,
            config,
        }
    }
}
