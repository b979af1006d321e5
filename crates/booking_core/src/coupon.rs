//! crates/booking_core/src/coupon.rs
//!
//! Coupon validation. The checks run in a fixed order and stop at the first
//! failure, so the error a caller sees is deterministic.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::Coupon;
use crate::error::{BookingError, CouponError};
use crate::ports::{PortResult, UnitOfWork};

/// Checks an already loaded coupon against the combo it is being applied to.
///
/// `None` stands for "no coupon with this code".
pub fn check(
    coupon: Option<Coupon>,
    code: &str,
    combo_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Coupon, CouponError> {
    let coupon = coupon.ok_or_else(|| CouponError::NotFound(code.to_string()))?;

    if !coupon.is_active {
        return Err(CouponError::Inactive(coupon.code));
    }
    if matches!(coupon.expiry_date, Some(expiry) if expiry < now) {
        return Err(CouponError::Expired(coupon.code));
    }
    if coupon.combo_id != combo_id {
        return Err(CouponError::NotApplicable(coupon.code));
    }
    if coupon.usage_count >= coupon.usage_limit {
        return Err(CouponError::LimitReached(coupon.code));
    }
    Ok(coupon)
}

/// Looks the code up inside the caller's transaction (row locked) and checks it.
pub async fn validate(
    uow: &mut dyn UnitOfWork,
    code: &str,
    combo_id: Uuid,
    now: DateTime<Utc>,
) -> PortResult<Result<Coupon, CouponError>> {
    let coupon = uow.lock_coupon_by_code(code).await?;
    Ok(check(coupon, code, combo_id, now))
}

/// Rejects a request that names the same code twice.
pub fn ensure_unique_codes(codes: &[String]) -> Result<(), BookingError> {
    let mut seen = HashSet::with_capacity(codes.len());
    for code in codes {
        if !seen.insert(code.as_str()) {
            return Err(BookingError::DuplicateCoupon(code.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn coupon(combo_id: Uuid) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            combo_id,
            code: "SUMMER15".to_string(),
            description: None,
            discount_percent: Some(dec!(15)),
            discount_amount: None,
            usage_limit: 5,
            usage_count: 0,
            is_active: true,
            expiry_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn missing_coupon_should_be_not_found() {
        let err = check(None, "NOPE", Uuid::new_v4(), Utc::now()).unwrap_err();
        assert_eq!(err, CouponError::NotFound("NOPE".into()));
    }

    #[test]
    fn inactive_coupon_should_be_rejected_before_expiry() {
        let combo = Uuid::new_v4();
        let now = Utc::now();
        let mut c = coupon(combo);
        c.is_active = false;
        c.expiry_date = Some(now - Duration::days(1));
        assert_eq!(check(Some(c), "SUMMER15", combo, now).unwrap_err(), CouponError::Inactive("SUMMER15".into()));
    }

    #[test]
    fn expiry_should_be_inclusive_of_now() {
        let combo = Uuid::new_v4();
        let now = Utc::now();

        let mut at_now = coupon(combo);
        at_now.expiry_date = Some(now);
        assert!(check(Some(at_now), "SUMMER15", combo, now).is_ok());

        let mut one_second_ago = coupon(combo);
        one_second_ago.expiry_date = Some(now - Duration::seconds(1));
        assert_eq!(
            check(Some(one_second_ago), "SUMMER15", combo, now).unwrap_err(),
            CouponError::Expired("SUMMER15".into())
        );
    }

    #[test]
    fn coupon_for_other_combo_should_not_apply() {
        let c = coupon(Uuid::new_v4());
        let err = check(Some(c), "SUMMER15", Uuid::new_v4(), Utc::now()).unwrap_err();
        assert_eq!(err, CouponError::NotApplicable("SUMMER15".into()));
    }

    #[test]
    fn usage_limit_should_be_exclusive() {
        let combo = Uuid::new_v4();
        let mut last_use = coupon(combo);
        last_use.usage_count = last_use.usage_limit - 1;
        assert!(check(Some(last_use), "SUMMER15", combo, Utc::now()).is_ok());

        let mut exhausted = coupon(combo);
        exhausted.usage_count = exhausted.usage_limit;
        assert_eq!(
            check(Some(exhausted), "SUMMER15", combo, Utc::now()).unwrap_err(),
            CouponError::LimitReached("SUMMER15".into())
        );
    }

    #[test]
    fn duplicate_codes_should_be_rejected() {
        let codes = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        assert!(matches!(
            ensure_unique_codes(&codes),
            Err(BookingError::DuplicateCoupon(code)) if code == "A"
        ));
        assert!(ensure_unique_codes(&["A".to_string(), "a".to_string()]).is_ok());
    }
}
