//! crates/booking_core/src/slots.rs
//!
//! Slot bookkeeping on a locked `ServiceCombo`. Callers persist the result in
//! the same transaction that holds the row lock.

use crate::domain::ServiceCombo;
use crate::error::SlotError;

/// Takes `quantity` slots, or leaves the combo untouched.
pub fn reserve(combo: &mut ServiceCombo, quantity: i32) -> Result<(), SlotError> {
    if combo.available_slots < quantity {
        return Err(SlotError::InsufficientSlots {
            requested: quantity,
            available: combo.available_slots,
        });
    }
    combo.available_slots -= quantity;
    Ok(())
}

/// Gives `quantity` slots back, capped at the combo's capacity when one is tracked.
pub fn release(combo: &mut ServiceCombo, quantity: i32) {
    let restored = combo.available_slots.saturating_add(quantity);
    combo.available_slots = match combo.capacity {
        Some(cap) => restored.min(cap.max(combo.available_slots)),
        None => restored,
    };
}
