pub mod catalog;
pub mod coupon;
pub mod domain;
pub mod error;
pub mod memory;
pub mod payments;
pub mod ports;
pub mod pricing;
pub mod review;
pub mod slots;
pub mod workflow;

#[cfg(test)]
mod fixtures;

pub use catalog::{Catalog, ComboInput, CouponInput};
pub use domain::{
    Account, AccountCredentials, Actor, AuthSession, Booking, BookingCoupon, BookingDetail,
    BookingStatus, BookingTarget, ComboStatus, Coupon, Payment, PaymentStatus, Review, Role,
    Service, ServiceCombo, ServiceComboDetail,
};
pub use error::{BookingError, BookingResult, CouponError, ErrorKind, SlotError};
pub use memory::MemoryDatabase;
pub use payments::PaymentService;
pub use ports::{DatabaseService, NewAccount, NewCombo, PortError, PortResult, UnitOfWork};
pub use review::{ReviewInput, ReviewService};
pub use workflow::{BookingWorkflow, ComboRemoval, CreateBooking};
