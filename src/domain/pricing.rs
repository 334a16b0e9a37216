//! Order pricing: subtotal, coupon discount and the rounded amount payable.
//!
//! Everything here is derived from the cart lines on every call; no stored
//! total is ever trusted.

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::errors::DomainError;

/// A coupon offered in the store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub title: String,
    #[serde(rename = "discount")]
    pub discount_percent: u32,
    #[serde(rename = "minAmount", default = "BigDecimal::zero")]
    pub min_order_amount: BigDecimal,
}

impl Coupon {
    pub fn is_unlocked(&self, subtotal: &BigDecimal) -> bool {
        subtotal >= &self.min_order_amount
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    pub code: String,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub subtotal: BigDecimal,
    pub discount_percent: u32,
    pub discount_amount: BigDecimal,
    pub final_payable: BigDecimal,
    pub applied_code: Option<String>,
}

pub fn subtotal(lines: &[CartLine]) -> BigDecimal {
    lines.iter().map(CartLine::line_total).sum()
}

/// `subtotal * percent / 100`, unrounded.
pub fn discount_amount(subtotal: &BigDecimal, percent: u32) -> BigDecimal {
    subtotal * BigDecimal::from(percent) / BigDecimal::from(100)
}

/// Rounds half away from zero to whole currency units.
pub fn round_to_unit(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(0, RoundingMode::HalfUp)
}

impl PriceBreakdown {
    pub fn compute(lines: &[CartLine], coupon: Option<&AppliedCoupon>) -> Self {
        let subtotal = subtotal(lines);
        let percent = coupon.map_or(0, |c| c.percent);
        let discount_amount = discount_amount(&subtotal, percent);
        let final_payable = round_to_unit(&(&subtotal - &discount_amount));
        PriceBreakdown {
            subtotal,
            discount_percent: percent,
            discount_amount,
            final_payable,
            applied_code: coupon.map(|c| c.code.clone()),
        }
    }
}

/// Applies `code` explicitly, reporting why it cannot be used.
pub fn apply_coupon(
    coupons: &[Coupon],
    code: &str,
    subtotal: &BigDecimal,
) -> Result<AppliedCoupon, DomainError> {
    let coupon = coupons
        .iter()
        .find(|c| c.title == code)
        .ok_or_else(|| DomainError::CouponNotFound(code.to_string()))?;
    if !coupon.is_unlocked(subtotal) {
        return Err(DomainError::CouponBelowMinimum {
            code: code.to_string(),
            shortfall: &coupon.min_order_amount - subtotal,
        });
    }
    Ok(AppliedCoupon {
        code: coupon.title.clone(),
        percent: coupon.discount_percent.min(100),
    })
}

/// Re-evaluates a previously applied coupon against the live subtotal.
///
/// Returns `None` (no discount) once the coupon is gone from the table or the
/// subtotal has dropped below its threshold.
pub fn revalidate(coupons: &[Coupon], code: &str, subtotal: &BigDecimal) -> Option<AppliedCoupon> {
    apply_coupon(coupons, code, subtotal).ok()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::*;
    use crate::domain::cart::fixtures::line;

    fn coupon(title: &str, percent: u32, min: i32) -> Coupon {
        Coupon {
            title: title.to_string(),
            discount_percent: percent,
            min_order_amount: BigDecimal::from(min),
        }
    }

    #[test]
    fn ten_percent_off_two_fifty() {
        let lines = vec![line("a", "Murukku", "250 g", "125", 2)];
        let applied = AppliedCoupon {
            code: "FESTIVE10".to_string(),
            percent: 10,
        };
        let price = PriceBreakdown::compute(&lines, Some(&applied));
        assert_eq!(price.subtotal, BigDecimal::from(250));
        assert_eq!(price.discount_amount, BigDecimal::from(25));
        assert_eq!(price.final_payable, BigDecimal::from(225));
        assert_eq!(price.applied_code.as_deref(), Some("FESTIVE10"));
    }

    #[test]
    fn final_payable_rounds_half_up() {
        // 99.50 * 1 - 0% -> 100
        let lines = vec![line("a", "Murukku", "250 g", "99.50", 1)];
        let price = PriceBreakdown::compute(&lines, None);
        assert_eq!(price.final_payable, BigDecimal::from(100));

        // 105 - 5% = 99.75 -> 100
        let lines = vec![line("a", "Murukku", "250 g", "105", 1)];
        let applied = AppliedCoupon {
            code: "FIVE".to_string(),
            percent: 5,
        };
        let price = PriceBreakdown::compute(&lines, Some(&applied));
        assert_eq!(
            price.discount_amount,
            BigDecimal::from_str("5.25").expect("decimal")
        );
        assert_eq!(price.final_payable, BigDecimal::from(100));
    }

    #[test]
    fn coupon_below_threshold_reports_shortfall() {
        let coupons = vec![coupon("BIG300", 10, 300)];
        let err = apply_coupon(&coupons, "BIG300", &BigDecimal::from(250))
            .expect_err("threshold not met");
        match err {
            DomainError::CouponBelowMinimum { code, shortfall } => {
                assert_eq!(code, "BIG300");
                assert_eq!(shortfall, BigDecimal::from(50));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_coupon_is_rejected() {
        let err = apply_coupon(&[], "NOPE", &BigDecimal::from(1000)).expect_err("unknown");
        assert!(matches!(err, DomainError::CouponNotFound(code) if code == "NOPE"));
    }

    #[test]
    fn coupon_is_dropped_when_subtotal_falls_below_threshold() {
        let coupons = vec![coupon("BIG300", 10, 300)];
        let applied = revalidate(&coupons, "BIG300", &BigDecimal::from(320));
        assert_eq!(
            applied,
            Some(AppliedCoupon {
                code: "BIG300".to_string(),
                percent: 10
            })
        );

        // A line was removed and the cart is now worth 250.
        assert_eq!(revalidate(&coupons, "BIG300", &BigDecimal::from(250)), None);
        let lines = vec![line("a", "Murukku", "250 g", "125", 2)];
        let price = PriceBreakdown::compute(&lines, None);
        assert_eq!(price.discount_amount, BigDecimal::zero());
        assert_eq!(price.final_payable, BigDecimal::from(250));
    }

    #[test]
    fn coupon_percent_is_capped_at_one_hundred() {
        let coupons = vec![coupon("FREE", 150, 0)];
        let applied = apply_coupon(&coupons, "FREE", &BigDecimal::from(10)).expect("unlocked");
        assert_eq!(applied.percent, 100);
    }

    #[test]
    fn coupon_parses_settings_shape() {
        let raw = serde_json::json!({ "title": "DIWALI", "discount": 15, "minAmount": 499 });
        let c: Coupon = serde_json::from_value(raw).expect("coupon json");
        assert_eq!(c.discount_percent, 15);
        assert_eq!(c.min_order_amount, BigDecimal::from(499));
    }

    proptest! {
        #[test]
        fn final_payable_matches_formula(
            price_paise in 1_i64..1_000_000,
            qty in 1_i32..20,
            percent in 0_u32..=100,
        ) {
            let price = BigDecimal::new(price_paise.into(), 2);
            let lines = vec![CartLine {
                price: price.clone(),
                qty,
                ..line("a", "A", "250 g", "1", 1)
            }];
            let applied = AppliedCoupon { code: "P".to_string(), percent };
            let first = PriceBreakdown::compute(&lines, Some(&applied));
            let second = PriceBreakdown::compute(&lines, Some(&applied));
            prop_assert_eq!(&first, &second);

            let subtotal = &price * BigDecimal::from(qty);
            let expected = round_to_unit(
                &(&subtotal - &subtotal * BigDecimal::from(percent) / BigDecimal::from(100)),
            );
            prop_assert_eq!(first.subtotal, subtotal);
            prop_assert_eq!(first.final_payable, expected);
        }

        #[test]
        fn discount_never_exceeds_subtotal(
            price_paise in 0_i64..1_000_000,
            percent in 0_u32..=100,
        ) {
            let subtotal = BigDecimal::new(price_paise.into(), 2);
            let discount = discount_amount(&subtotal, percent);
            prop_assert!(discount <= subtotal);
            prop_assert!(discount >= BigDecimal::zero());
        }
    }
}
