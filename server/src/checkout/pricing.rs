//! Pricing
//!
//! Amounts are stored as f64 but every arithmetic step goes through
//! `rust_decimal` and is rounded half-away-from-zero at 2 decimal places.
//! Prices come from the product records read at commit time; client input
//! never contributes a number.

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::db::models::{Coupon, Customer, OrderItem};
use crate::utils::{AppError, AppResult};

pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Round to 2 decimal places, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Server-computed order amounts
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub discount: f64,
    pub shipping_cost: f64,
    pub final_amount: f64,
}

/// subtotal = Σ(price × qty); discount = round(subtotal × pct / 100);
/// final = subtotal − discount + shipping
pub fn compute_totals(items: &[OrderItem], discount_percent: Option<i64>, shipping_cost: f64) -> Totals {
    let subtotal: Decimal = items
        .iter()
        .map(|item| to_decimal(item.unit_price) * Decimal::from(item.quantity))
        .sum();
    let subtotal = round_money(subtotal);

    let discount = match discount_percent {
        Some(pct) => round_money(subtotal * Decimal::from(pct) / Decimal::from(100)),
        None => Decimal::ZERO,
    };

    let shipping = to_decimal(shipping_cost);
    let final_amount = round_money(subtotal - discount + shipping);

    Totals {
        subtotal: to_f64(subtotal),
        discount: to_f64(discount),
        shipping_cost: to_f64(round_money(shipping)),
        final_amount: to_f64(final_amount),
    }
}

/// Coupon eligibility: exists (checked by the caller), unexpired, and not
/// already redeemed by this customer. The in-transaction guard re-checks
/// the used-set; this pre-check just gives a clean error before any write.
pub fn validate_coupon(coupon: &Coupon, customer: Option<&Customer>, now_millis: i64) -> AppResult<()> {
    if coupon.is_expired(now_millis) {
        return Err(AppError::CouponExpired(coupon.code.clone()));
    }
    if let Some(customer) = customer
        && customer.has_used_coupon(&coupon.code)
    {
        return Err(AppError::CouponAlreadyUsed(coupon.code.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::RecordId;

    fn item(price: f64, qty: i64) -> OrderItem {
        OrderItem {
            product: RecordId::from_table_key("product", "p"),
            name: "p".to_string(),
            variant: None,
            unit_price: price,
            quantity: qty,
        }
    }

    #[test]
    fn totals_without_coupon() {
        let totals = compute_totals(&[item(19.99, 3)], None, 5.0);
        assert_eq!(totals.subtotal, 59.97);
        assert_eq!(totals.discount, 0.0);
        assert_eq!(totals.final_amount, 64.97);
    }

    #[test]
    fn discount_is_rounded_half_away_from_zero() {
        // 10% of 33.35 = 3.335, rounds to 3.34
        let totals = compute_totals(&[item(33.35, 1)], Some(10), 0.0);
        assert_eq!(totals.discount, 3.34);
        assert_eq!(totals.final_amount, 30.01);
    }

    #[test]
    fn float_sums_stay_exact() {
        // 0.1 + 0.2 style accumulation must not leak binary noise
        let totals = compute_totals(&[item(0.1, 1), item(0.2, 1)], None, 0.0);
        assert_eq!(totals.subtotal, 0.3);
    }

    #[test]
    fn expired_coupon_is_rejected() {
        let coupon = Coupon {
            id: None,
            code: "SAVE10".to_string(),
            discount_percent: 10,
            expires_at: 1_000,
            total_usage: 0,
            total_discount_given: 0.0,
        };
        let err = validate_coupon(&coupon, None, 2_000).unwrap_err();
        assert!(matches!(err, AppError::CouponExpired(_)));
    }

    #[test]
    fn used_coupon_is_rejected() {
        let coupon = Coupon {
            id: None,
            code: "SAVE10".to_string(),
            discount_percent: 10,
            expires_at: i64::MAX,
            total_usage: 5,
            total_discount_given: 12.5,
        };
        let customer = Customer {
            id: None,
            name: "alice".to_string(),
            used_coupons: vec!["SAVE10".to_string()],
            orders: Vec::new(),
        };
        let err = validate_coupon(&coupon, Some(&customer), 0).unwrap_err();
        assert!(matches!(err, AppError::CouponAlreadyUsed(_)));
    }
}
