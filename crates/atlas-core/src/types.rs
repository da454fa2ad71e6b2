//! # Domain Types
//!
//! Core domain types used throughout Atlas POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   OrderLine     │   │ ProductVariant  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  id (UUID)      │──►│  id (UUID)      │       │
//! │  │  order_code     │   │  variant_id     │   │  sku (business) │       │
//! │  │  status         │   │  quantity       │   │  sale_price     │       │
//! │  │  total_bill     │   └─────────────────┘   │  stock          │       │
//! │  └─────────────────┘                         └────────┬────────┘       │
//! │                                                       │                │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │    Voucher      │   │   OrderStatus   │   │   Promotion     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  min_subtotal   │   │  Pending (0/1)  │   │  percent 0-100  │       │
//! │  │  reduced_pct    │   │  Confirmed (2)  │   │  [start, end)   │       │
//! │  │  max_discount   │   │  Completed (5)  │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership Model
//! An `Order` exclusively OWNS its `OrderLine`s (a plain `Vec`, no
//! back-references). A line only REFERENCES its product variant by id; the
//! repository resolves the id to current variant data on demand. This keeps
//! the entity graph acyclic — there is no live `OrderLine → Order` or
//! `OrderLine → ProductVariant` pointer anywhere.
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business key: (order_code, sku, voucher code) - human-readable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays.
///
/// Persisted as the numeric code the original wire format uses:
/// 0 = cash (cash-on-delivery for online orders), 1 = card, 2 = transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash at the counter, or cash-on-delivery online.
    Cash,
    /// Card payment.
    Card,
    /// Bank transfer via the payment gateway.
    BankTransfer,
}

impl PaymentMethod {
    /// Numeric wire code.
    pub const fn code(&self) -> i64 {
        match self {
            PaymentMethod::Cash => 0,
            PaymentMethod::Card => 1,
            PaymentMethod::BankTransfer => 2,
        }
    }

    /// Parses a wire code. Unknown or negative codes are rejected upstream
    /// with `InvalidArgument`.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PaymentMethod::Cash),
            1 => Some(PaymentMethod::Card),
            2 => Some(PaymentMethod::BankTransfer),
            _ => None,
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ## State Machine
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │   Pending ──► Confirmed ──► Shipping ──┬──► Completed   (terminal)     │
/// │      │            │            │       └──► DeliveryFailed             │
/// │      │            │            │                  │                     │
/// │      └────────────┴────────────┴──────────────────┴──► Cancelled       │
/// │                                                        (terminal)      │
/// │                                                                         │
/// │   Transitions are monotonic: no edge ever re-enters an earlier state.  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// ## Wire Codes
/// Pending = 0 or 1 (0 = awaiting confirmation for unpaid online orders,
/// 1 = awaiting payment), Confirmed = 2, Shipping = 3, DeliveryFailed = 4,
/// Completed = 5, Cancelled = -1. Both pending codes collapse to
/// [`OrderStatus::Pending`] when read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting confirmation/payment (items may still be added).
    Pending,
    /// Confirmed by staff, not yet handed to shipping.
    Confirmed,
    /// Handed to the carrier.
    Shipping,
    /// Carrier could not deliver.
    DeliveryFailed,
    /// Paid and finalized. Terminal.
    Completed,
    /// Cancelled before completion. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Canonical numeric code for persistence.
    pub const fn code(&self) -> i64 {
        match self {
            OrderStatus::Pending => 1,
            OrderStatus::Confirmed => 2,
            OrderStatus::Shipping => 3,
            OrderStatus::DeliveryFailed => 4,
            OrderStatus::Completed => 5,
            OrderStatus::Cancelled => -1,
        }
    }

    /// Parses a stored status code. Codes 0 and 1 are both Pending.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 | 1 => Some(OrderStatus::Pending),
            2 => Some(OrderStatus::Confirmed),
            3 => Some(OrderStatus::Shipping),
            4 => Some(OrderStatus::DeliveryFailed),
            5 => Some(OrderStatus::Completed),
            -1 => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Pending sub-code written at order creation: unpaid online orders
    /// start at 0 (awaiting confirmation), everything else at 1.
    pub const fn initial_code(kind: OrderKind, method: PaymentMethod) -> i64 {
        match (kind, method) {
            (OrderKind::Online, PaymentMethod::Cash) => 0,
            _ => 1,
        }
    }

    /// Terminal states freeze the order: no line mutation, no further
    /// transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether `target` is a legal next state from `self`.
    pub fn can_transition(&self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, target) {
            (Pending, Confirmed) => true,
            (Confirmed, Shipping) => true,
            (Shipping, Completed) | (Shipping, DeliveryFailed) => true,
            // Cancellation is allowed from any non-terminal state.
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Validates a transition, returning the target on success.
    pub fn transition(self, target: OrderStatus) -> Result<OrderStatus, CoreError> {
        if self.can_transition(target) {
            Ok(target)
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: target,
            })
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Order Kind
// =============================================================================

/// Where the order originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Rung up at a counter terminal.
    Pos,
    /// Placed through the online storefront.
    Online,
}

impl OrderKind {
    /// Persisted flag: 1 = POS, 0 = online.
    pub const fn code(&self) -> i64 {
        match self {
            OrderKind::Pos => 1,
            OrderKind::Online => 0,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(OrderKind::Pos),
            0 => Some(OrderKind::Online),
            _ => None,
        }
    }
}

// =============================================================================
// Customer & Employee
// =============================================================================

/// A registered customer. Lookup-only in this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub full_name: String,
    /// Whether the account is active (soft delete).
    pub is_active: bool,
}

impl Customer {
    /// The walk-in customer: an anonymous counter sale with no account.
    ///
    /// Orders store `customer_id: None` for walk-ins — never a magic row
    /// id. This constant exists only so display and notification
    /// collaborators have a name to show.
    pub fn walk_in() -> Self {
        Customer {
            id: crate::WALK_IN_CUSTOMER_ID.to_string(),
            full_name: "Walk-in customer".to_string(),
            is_active: true,
        }
    }
}

/// The employee operating the terminal. Lookup-only in this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub full_name: String,
    pub is_active: bool,
}

// =============================================================================
// Promotion
// =============================================================================

/// A percentage discount window attached to a product variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: String,
    pub name: String,
    /// Whole-percent discount, 0-100.
    pub percent: u32,
    pub is_active: bool,
    /// Validity window, half-open: `[starts_at, ends_at)`.
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl Promotion {
    /// Whether this promotion discounts a sale happening at `now`.
    ///
    /// A variant whose promotion is inactive or outside its window sells
    /// at list price silently — never an error.
    pub fn is_applicable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.starts_at <= now && now < self.ends_at
    }
}

// =============================================================================
// Voucher
// =============================================================================

/// An order-level conditional discount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub id: String,
    /// Business code printed on the voucher (unique).
    pub code: String,
    /// Minimum post-promotion subtotal to qualify.
    pub min_subtotal_cents: i64,
    /// Whole-percent reduction, 0-100.
    pub reduced_percent: u32,
    /// Absolute cap on the discount.
    pub max_discount_cents: i64,
    pub is_active: bool,
    /// Validity window, half-open: `[starts_at, ends_at)`.
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl Voucher {
    /// Whether this voucher discounts an order with the given
    /// post-promotion subtotal at `now`.
    ///
    /// The minimum condition is checked against the post-promotion,
    /// pre-voucher subtotal — the value that becomes the bill before the
    /// voucher is subtracted.
    pub fn is_applicable(&self, subtotal: Money, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at <= now
            && now < self.ends_at
            && subtotal.cents() >= self.min_subtotal_cents
    }

    /// The discount amount for a qualifying subtotal: `reduced_percent`%
    /// of the subtotal, capped at `max_discount_cents`.
    pub fn discount_for(&self, subtotal: Money) -> Money {
        let uncapped = subtotal.percent_of(self.reduced_percent);
        Money::from_cents(uncapped.cents().min(self.max_discount_cents))
    }
}

// =============================================================================
// Product Variant
// =============================================================================

/// A sellable SKU: one size/color variant of a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// List price in cents (smallest currency unit).
    pub sale_price_cents: i64,

    /// Current stock level. Never negative; mutated ONLY by the inventory
    /// ledger's commit step, never by pricing or cart logic.
    pub stock: i64,

    /// Active promotion, if one is attached (resolved by join).
    pub promotion: Option<Promotion>,

    /// Whether the variant is sellable (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductVariant {
    /// Returns the list price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Advisory stock check used while building the cart.
    ///
    /// Checks the live stock only — nothing is reserved. The authoritative
    /// check happens atomically at checkout.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Order & Order Line
// =============================================================================

/// One product-variant entry in an order.
///
/// References the variant by id only; the repository resolves current
/// price/promotion/stock on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub variant_id: String,
    /// Always positive; repeated adds merge into this field.
    pub quantity: i64,
}

/// An in-progress or finalized sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,

    /// `None` is the walk-in customer, not a missing reference.
    pub customer_id: Option<String>,

    pub employee_id: String,

    /// Attached voucher. Stays attached for display even when it no longer
    /// qualifies; qualification is re-evaluated on every recompute.
    pub voucher_id: Option<String>,

    /// Human-readable unique code, `ORD-XXXXXXXX`.
    pub order_code: String,

    pub created_at: DateTime<Utc>,

    /// Line items. The order exclusively owns this collection.
    pub lines: Vec<OrderLine>,

    /// Sum of list prices × quantity, before any discount (audit/display).
    pub original_total_cents: i64,

    /// Payable amount after promotion + voucher. Invariant:
    /// `0 <= total_bill_cents <= original_total_cents`.
    pub total_bill_cents: i64,

    /// Sum of line quantities.
    pub total_amount: i64,

    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub kind: OrderKind,
}

impl Order {
    /// Returns the pre-discount total as Money.
    #[inline]
    pub fn original_total(&self) -> Money {
        Money::from_cents(self.original_total_cents)
    }

    /// Returns the payable total as Money.
    #[inline]
    pub fn total_bill(&self) -> Money {
        Money::from_cents(self.total_bill_cents)
    }

    /// Anonymous counter sale?
    #[inline]
    pub fn is_walk_in(&self) -> bool {
        self.customer_id.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
