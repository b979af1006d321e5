//! crates/booking_core/src/pricing.rs
//!
//! Booking totals. Discounts stack sequentially on the running amount in the
//! order the coupons were submitted; stored totals depend on that order.

use rust_decimal::Decimal;

use crate::domain::Coupon;
use crate::error::{BookingError, BookingResult};

/// Monetary scale used for every computed discount.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(18, 2)` column holds: 9999999999999999.99.
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999_999_999, MONEY_SCALE)
}

/// Applies one coupon to a running amount. Percent first, then the flat amount,
/// when a coupon carries both.
pub fn apply_discount(amount: Decimal, coupon: &Coupon) -> Decimal {
    let mut running = amount;
    if let Some(percent) = coupon.discount_percent {
        let cut = (running * percent / Decimal::ONE_HUNDRED).round_dp(MONEY_SCALE);
        running -= cut;
    }
    if let Some(flat) = coupon.discount_amount {
        running -= flat;
    }
    running
}

/// `unit_price * quantity`, minus each coupon in order, floored at zero.
///
/// A base amount that does not fit a stored total is a validation error.
pub fn compute_total(unit_price: Decimal, quantity: i32, coupons: &[Coupon]) -> BookingResult<Decimal> {
    let base = unit_price
        .checked_mul(Decimal::from(quantity))
        .filter(|base| *base <= max_amount())
        .ok_or_else(|| {
            BookingError::Validation(format!(
                "{} x {} exceeds the largest bookable amount",
                unit_price, quantity
            ))
        })?;
    let discounted = coupons.iter().fold(base, apply_discount);
    Ok(discounted.max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn coupon(percent: Option<Decimal>, amount: Option<Decimal>) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            combo_id: Uuid::new_v4(),
            code: "C".into(),
            description: None,
            discount_percent: percent,
            discount_amount: amount,
            usage_limit: 10,
            usage_count: 0,
            is_active: true,
            expiry_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn no_coupons_should_return_base() {
        assert_eq!(compute_total(dec!(200000), 3, &[]).unwrap(), dec!(600000));
        assert_eq!(compute_total(dec!(19.99), 1, &[]).unwrap(), dec!(19.99));
    }

    #[test]
    fn discounts_should_stack_sequentially() {
        let ten_percent = coupon(Some(dec!(10)), None);
        let twenty_flat = coupon(None, Some(dec!(20)));
        assert_eq!(compute_total(dec!(100), 1, &[ten_percent.clone()]).unwrap(), dec!(90));
        assert_eq!(compute_total(dec!(100), 1, &[ten_percent.clone(), twenty_flat.clone()]).unwrap(), dec!(70));
        // Order matters: 100 - 20 = 80, then 10% off = 72.
        assert_eq!(compute_total(dec!(100), 1, &[twenty_flat, ten_percent]).unwrap(), dec!(72));
    }

    #[test]
    fn total_should_never_go_negative() {
        let full = coupon(Some(dec!(100)), None);
        let big_flat = coupon(None, Some(dec!(50)));
        assert_eq!(compute_total(dec!(50), 1, &[big_flat.clone(), big_flat]).unwrap(), Decimal::ZERO);
        assert_eq!(compute_total(dec!(50), 1, &[full.clone(), full]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn percent_then_amount_on_same_coupon() {
        let both = coupon(Some(dec!(50)), Some(dec!(5)));
        assert_eq!(compute_total(dec!(40), 1, &[both]).unwrap(), dec!(15));
    }

    #[test]
    fn percent_discount_should_round_to_cents() {
        let third = coupon(Some(dec!(33.333)), None);
        assert_eq!(compute_total(dec!(10), 1, &[third]).unwrap(), dec!(6.67));
    }

    #[test]
    fn oversized_totals_should_be_rejected_not_panic() {
        let err = compute_total(Decimal::MAX, 2, &[]).unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));

        let err = compute_total(max_amount(), 2, &[]).unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));

        assert_eq!(compute_total(max_amount(), 1, &[]).unwrap(), max_amount());
    }
}
