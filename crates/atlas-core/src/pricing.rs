//! # Pricing Engine
//!
//! Recomputes an order's monetary aggregates from its line items.
//!
//! ## Recompute Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      recompute(lines, voucher, now)                     │
//! │                                                                         │
//! │  For each line:                                                        │
//! │    list price ──► promotion applicable at `now`?                       │
//! │                      │ yes: unit = list × (100 − pct) / 100 (half-up)  │
//! │                      │ no:  unit = list  (silent fallback)             │
//! │                      ▼                                                  │
//! │    original_total += list × qty                                        │
//! │    total_bill     += unit × qty        (post-promotion subtotal)       │
//! │    total_amount   += qty                                               │
//! │                                                                         │
//! │  Voucher applicable (active ∧ in window ∧ subtotal ≥ min)?            │
//! │    discount = min(subtotal × pct / 100, max_discount)                  │
//! │    total_bill = max(total_bill − discount, 0)                          │
//! │                                                                         │
//! │  PROPERTIES: idempotent, 0 ≤ total_bill ≤ original_total,             │
//! │  voucher contribution never exceeds its cap.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! No side effects, no clock reads — callers pass `now`. The same inputs
//! always produce the same totals, which is what makes the defensive
//! re-pricing at checkout safe to run.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::{Order, Promotion, Voucher};

// =============================================================================
// Pricing Inputs & Outputs
// =============================================================================

/// Per-line pricing input: the line's quantity joined with the variant's
/// CURRENT list price and promotion.
///
/// Built by the repository at recompute time, never cached across calls —
/// a variant that lost its promotion mid-session must re-price at list.
#[derive(Debug, Clone)]
pub struct LinePricing {
    pub variant_id: String,
    pub sku: String,
    pub quantity: i64,
    pub list_price: Money,
    pub promotion: Option<Promotion>,
}

impl LinePricing {
    /// The unit price charged for this line at `now`: the promotion price
    /// when the promotion applies, the list price otherwise.
    pub fn unit_price(&self, now: DateTime<Utc>) -> Money {
        match &self.promotion {
            Some(promo) if promo.is_applicable(now) => {
                self.list_price.retain_percent(100 - promo.percent)
            }
            _ => self.list_price,
        }
    }
}

/// The three aggregates the pricing engine owns on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderTotals {
    /// Sum of list prices × quantity (pre-promotion, audit/display).
    pub original_total: Money,
    /// Payable amount after promotion + voucher.
    pub total_bill: Money,
    /// Sum of line quantities.
    pub total_amount: i64,
}

impl OrderTotals {
    /// Writes the aggregates back onto an order.
    pub fn apply_to(&self, order: &mut Order) {
        order.original_total_cents = self.original_total.cents();
        order.total_bill_cents = self.total_bill.cents();
        order.total_amount = self.total_amount;
    }
}

// =============================================================================
// Recompute
// =============================================================================

/// Recomputes order totals from current line pricing and the attached
/// voucher.
///
/// ## Order of Operations
/// Line promotions first, summed into the post-promotion subtotal; the
/// voucher is then evaluated against that subtotal (its `min_subtotal`
/// condition uses the post-promotion, pre-voucher value) and subtracted
/// with its cap, clamped at zero.
///
/// An attached voucher that does not qualify contributes nothing but stays
/// attached to the order for display; it is re-evaluated on every call.
pub fn recompute(lines: &[LinePricing], voucher: Option<&Voucher>, now: DateTime<Utc>) -> OrderTotals {
    let mut original_total = Money::zero();
    let mut total_bill = Money::zero();
    let mut total_amount: i64 = 0;

    for line in lines {
        original_total += line.list_price.multiply_quantity(line.quantity);
        total_bill += line.unit_price(now).multiply_quantity(line.quantity);
        total_amount += line.quantity;
    }

    if let Some(voucher) = voucher {
        if voucher.is_applicable(total_bill, now) {
            let discount = voucher.discount_for(total_bill);
            total_bill = total_bill.saturating_discount(discount);
        }
    }

    OrderTotals {
        original_total,
        total_bill,
        total_amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn active_promotion(percent: u32, now: DateTime<Utc>) -> Promotion {
        Promotion {
            id: "promo".into(),
            name: "Season Sale".into(),
            percent,
            is_active: true,
            starts_at: now - Duration::hours(1),
            ends_at: now + Duration::hours(1),
        }
    }

    fn line(sku: &str, qty: i64, price_cents: i64, promotion: Option<Promotion>) -> LinePricing {
        LinePricing {
            variant_id: format!("var-{sku}"),
            sku: sku.to_string(),
            quantity: qty,
            list_price: Money::from_cents(price_cents),
            promotion,
        }
    }

    fn voucher(min_cents: i64, percent: u32, max_cents: i64, now: DateTime<Utc>) -> Voucher {
        Voucher {
            id: "v1".into(),
            code: "SAVE".into(),
            min_subtotal_cents: min_cents,
            reduced_percent: percent,
            max_discount_cents: max_cents,
            is_active: true,
            starts_at: now - Duration::hours(1),
            ends_at: now + Duration::hours(1),
        }
    }

    /// $100.00 × 2, no promotion, no voucher.
    #[test]
    fn test_plain_line_totals() {
        let now = Utc::now();
        let totals = recompute(&[line("V1", 2, 10_000, None)], None, now);

        assert_eq!(totals.total_bill.cents(), 20_000);
        assert_eq!(totals.original_total.cents(), 20_000);
        assert_eq!(totals.total_amount, 2);
    }

    /// $100.00 with active 10% promotion, × 3.
    #[test]
    fn test_promotion_discounts_line_price() {
        let now = Utc::now();
        let lines = [line("V2", 3, 10_000, Some(active_promotion(10, now)))];
        let totals = recompute(&lines, None, now);

        // line price 90.00 each
        assert_eq!(totals.total_bill.cents(), 27_000);
        assert_eq!(totals.original_total.cents(), 30_000);
        assert_eq!(totals.total_amount, 3);
    }

    /// Bill $270.00; voucher min $200, 20%, cap $40.00.
    #[test]
    fn test_voucher_discount_is_capped() {
        let now = Utc::now();
        let lines = [line("V2", 3, 10_000, Some(active_promotion(10, now)))];
        let totals = recompute(&lines, Some(&voucher(20_000, 20, 4_000, now)), now);

        // uncapped would be 54.00, capped to 40.00
        assert_eq!(totals.total_bill.cents(), 23_000);
        assert_eq!(totals.original_total.cents(), 30_000);
    }

    /// Bill $50.00, below the voucher minimum; unchanged.
    #[test]
    fn test_voucher_below_minimum_not_applied() {
        let now = Utc::now();
        let lines = [line("V1", 1, 5_000, None)];
        let totals = recompute(&lines, Some(&voucher(20_000, 20, 4_000, now)), now);

        assert_eq!(totals.total_bill.cents(), 5_000);
    }

    /// A promotion that expired mid-session falls back to list price
    /// silently.
    #[test]
    fn test_expired_promotion_falls_back_to_list() {
        let now = Utc::now();
        let expired = Promotion {
            ends_at: now - Duration::minutes(1),
            starts_at: now - Duration::hours(2),
            ..active_promotion(10, now)
        };
        let totals = recompute(&[line("V2", 3, 10_000, Some(expired))], None, now);

        assert_eq!(totals.total_bill.cents(), 30_000);
        assert_eq!(totals.original_total.cents(), 30_000);
    }

    /// An expired voucher is ignored, not an error.
    #[test]
    fn test_expired_voucher_ignored() {
        let now = Utc::now();
        let mut expired = voucher(0, 50, 100_000, now);
        expired.ends_at = now - Duration::minutes(1);

        let totals = recompute(&[line("V1", 2, 10_000, None)], Some(&expired), now);
        assert_eq!(totals.total_bill.cents(), 20_000);
    }

    /// Required property: recompute is idempotent — same inputs, same
    /// totals, run twice.
    #[test]
    fn test_recompute_idempotent() {
        let now = Utc::now();
        let lines = [
            line("V1", 2, 10_000, None),
            line("V2", 3, 9_999, Some(active_promotion(15, now))),
        ];
        let v = voucher(10_000, 25, 3_333, now);

        let first = recompute(&lines, Some(&v), now);
        let second = recompute(&lines, Some(&v), now);
        assert_eq!(first, second);
    }

    /// Required property: 0 ≤ total_bill ≤ original_total for every mix of
    /// promotions and vouchers.
    #[test]
    fn test_totals_never_negative_and_never_exceed_original() {
        let now = Utc::now();
        let cases: Vec<(Vec<LinePricing>, Option<Voucher>)> = vec![
            (vec![line("A", 1, 1, None)], Some(voucher(0, 100, 1_000_000, now))),
            (
                vec![line("B", 7, 333, Some(active_promotion(100, now)))],
                Some(voucher(0, 100, 50, now)),
            ),
            (vec![], Some(voucher(0, 50, 100, now))),
            (vec![line("C", 5, 10_000, Some(active_promotion(1, now)))], None),
        ];

        for (lines, v) in cases {
            let totals = recompute(&lines, v.as_ref(), now);
            assert!(totals.total_bill.cents() >= 0);
            assert!(totals.total_bill.cents() <= totals.original_total.cents());
        }
    }

    /// Voucher cap property: the voucher never removes more than
    /// max_discount from the post-promotion subtotal.
    #[test]
    fn test_voucher_contribution_bounded_by_cap() {
        let now = Utc::now();
        let lines = [line("V1", 10, 10_000, None)]; // subtotal 100_000
        let v = voucher(0, 90, 2_500, now);

        let with = recompute(&lines, Some(&v), now);
        let without = recompute(&lines, None, now);
        assert_eq!(without.total_bill.cents() - with.total_bill.cents(), 2_500);
    }

    #[test]
    fn test_apply_to_writes_aggregates() {
        use crate::types::{OrderKind, OrderStatus, PaymentMethod};

        let now = Utc::now();
        let mut order = Order {
            id: "o1".into(),
            customer_id: None,
            employee_id: "e1".into(),
            voucher_id: None,
            order_code: "ORD-TEST0001".into(),
            created_at: now,
            lines: Vec::new(),
            original_total_cents: 0,
            total_bill_cents: 0,
            total_amount: 0,
            payment_method: PaymentMethod::Cash,
            status: OrderStatus::Pending,
            kind: OrderKind::Pos,
        };

        let totals = recompute(&[line("V1", 2, 10_000, None)], None, now);
        totals.apply_to(&mut order);

        assert_eq!(order.total_bill_cents, 20_000);
        assert_eq!(order.original_total_cents, 20_000);
        assert_eq!(order.total_amount, 2);
    }
}
