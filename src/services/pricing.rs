//! Checkout pricing computation.
//!
//! Pure and deterministic: given a subtotal, a transport cost, and an
//! optional discount, produces the clamped discount amounts and the final
//! total. No persistence and no side effects, so it can be exercised
//! standalone without an order row.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::entities::discount::{self, DiscountType};

/// Monetary values are stored with two decimal places, rounded half-up.
const DECIMAL_PLACES: u32 = 2;

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Result of a pricing pass over one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingBreakdown {
    pub discount_value: Decimal,
    pub discount_on_transport: Decimal,
    pub total: Decimal,
}

/// Discount amount for a single base figure, clamped so a discount can
/// never exceed what it applies to.
fn discount_against(disc: &discount::Model, base: Decimal) -> Decimal {
    let raw = match disc.discount_type {
        DiscountType::Percentage => base * disc.value / Decimal::from(100),
        DiscountType::Absolute => disc.value,
    };

    round_money(raw.min(base).max(Decimal::ZERO))
}

/// Computes the priced totals for an order.
///
/// Absent monetary inputs default to zero. When a discount is present its
/// amount is computed against the subtotal and, if the code applies to
/// transport, a parallel amount is computed against the transport cost;
/// both are clamped to their base. The final total never goes below zero.
pub fn compute_totals(
    subtotal: Option<Decimal>,
    transport_cost: Option<Decimal>,
    discount: Option<&discount::Model>,
) -> PricingBreakdown {
    let subtotal = round_money(subtotal.unwrap_or_default());
    let transport_cost = round_money(transport_cost.unwrap_or_default());

    let (discount_value, discount_on_transport) = match discount {
        Some(disc) => {
            let on_subtotal = discount_against(disc, subtotal);
            let on_transport = if disc.applicable_to_transport {
                discount_against(disc, transport_cost)
            } else {
                Decimal::ZERO
            };
            (on_subtotal, on_transport)
        }
        None => (Decimal::ZERO, Decimal::ZERO),
    };

    let total = (subtotal + transport_cost - discount_value - discount_on_transport)
        .max(Decimal::ZERO);

    PricingBreakdown {
        discount_value,
        discount_on_transport,
        total: round_money(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn discount(
        discount_type: DiscountType,
        value: Decimal,
        applicable_to_transport: bool,
    ) -> discount::Model {
        discount::Model {
            id: Uuid::new_v4(),
            code: "SAVE10".to_string(),
            discount_type,
            value,
            start_date: Utc::now().date_naive(),
            end_date: Utc::now().date_naive(),
            max_uses_total: None,
            max_uses_per_user: None,
            times_used: 0,
            applicable_to_transport,
            status: discount::DiscountStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn no_discount_sums_subtotal_and_transport() {
        let breakdown = compute_totals(Some(dec!(100000)), Some(dec!(8000)), None);
        assert_eq!(breakdown.discount_value, Decimal::ZERO);
        assert_eq!(breakdown.discount_on_transport, Decimal::ZERO);
        assert_eq!(breakdown.total, dec!(108000));
    }

    #[test]
    fn absent_inputs_default_to_zero() {
        let breakdown = compute_totals(None, None, None);
        assert_eq!(breakdown.total, Decimal::ZERO);
    }

    #[test]
    fn percentage_discount_off_subtotal_only() {
        // subtotal 100000, transport 8000 (BOGOTA), 10% not on transport
        let disc = discount(DiscountType::Percentage, dec!(10), false);
        let breakdown = compute_totals(Some(dec!(100000)), Some(dec!(8000)), Some(&disc));
        assert_eq!(breakdown.discount_value, dec!(10000));
        assert_eq!(breakdown.discount_on_transport, Decimal::ZERO);
        assert_eq!(breakdown.total, dec!(98000));
    }

    #[test]
    fn percentage_discount_applies_to_transport_when_flagged() {
        let disc = discount(DiscountType::Percentage, dec!(50), true);
        let breakdown = compute_totals(Some(dec!(20000)), Some(dec!(5000)), Some(&disc));
        assert_eq!(breakdown.discount_value, dec!(10000));
        assert_eq!(breakdown.discount_on_transport, dec!(2500));
        assert_eq!(breakdown.total, dec!(12500));
    }

    #[test]
    fn absolute_discount_is_clamped_to_subtotal() {
        let disc = discount(DiscountType::Absolute, dec!(50000), false);
        let breakdown = compute_totals(Some(dec!(30000)), Some(dec!(8000)), Some(&disc));
        assert_eq!(breakdown.discount_value, dec!(30000));
        assert_eq!(breakdown.total, dec!(8000));
    }

    #[test]
    fn absolute_transport_discount_is_clamped_to_transport() {
        let disc = discount(DiscountType::Absolute, dec!(50000), true);
        let breakdown = compute_totals(Some(dec!(30000)), Some(dec!(8000)), Some(&disc));
        assert_eq!(breakdown.discount_value, dec!(30000));
        assert_eq!(breakdown.discount_on_transport, dec!(8000));
        assert_eq!(breakdown.total, Decimal::ZERO);
    }

    #[test]
    fn total_never_goes_negative() {
        let disc = discount(DiscountType::Percentage, dec!(100), true);
        let breakdown = compute_totals(Some(dec!(10000)), Some(dec!(5000)), Some(&disc));
        assert_eq!(breakdown.total, Decimal::ZERO);
    }

    #[test]
    fn fractional_cents_round_half_up() {
        // 10.5% of 33.33 = 3.499..; 3.4997 rounds to 3.50
        let disc = discount(DiscountType::Percentage, dec!(10.5), false);
        let breakdown = compute_totals(Some(dec!(33.33)), Some(dec!(0)), Some(&disc));
        assert_eq!(breakdown.discount_value, dec!(3.50));
        assert_eq!(breakdown.total, dec!(29.83));
    }
}
