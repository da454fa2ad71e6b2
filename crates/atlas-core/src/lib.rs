//! # atlas-core: Pure Business Logic for Atlas POS
//!
//! This crate is the **heart** of the Atlas POS order subsystem. It
//! contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Atlas POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Outward collaborators (not in this repo)             │   │
//! │  │    HTTP routing ── payment gateway ── mail ── reporting         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 atlas-db (OrderService + repositories)          │   │
//! │  │    create_order, add_line, transition_status, finalize_payment  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ atlas-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │   cart    │  │   │
//! │  │   │   Order   │  │   Money   │  │ recompute │  │merge_line │  │   │
//! │  │   │  Voucher  │  │ half-up % │  │  totals   │  │  merge    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, OrderLine, ProductVariant, Voucher, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - The pricing engine: recompute order totals
//! - [`cart`] - Line-merge rules for building an order
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Boundary validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same lines + same clock value = same totals
//! 2. **No I/O**: database, network, and even `Utc::now()` are forbidden
//!    here — callers pass `now` in, so pricing is replayable
//! 3. **Integer Money**: all monetary values are cents (i64), percentage
//!    math rounds half-up to the cent
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use atlas_core::Money` instead of
// `use atlas_core::money::Money`

pub use cart::MergeOutcome;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{recompute, LinePricing, OrderTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Identity of the walk-in customer constant.
///
/// ## Why a constant?
/// Anonymous counter sales have no customer account. Orders store
/// `customer_id: None` for them; this id exists only on the constant
/// [`types::Customer::walk_in`] record handed to display/notification
/// collaborators. It is never a database row.
pub const WALK_IN_CUSTOMER_ID: &str = "walk-in";

/// Maximum distinct lines allowed on a single order.
///
/// ## Business Reason
/// Prevents runaway carts and keeps receipts printable.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum merged quantity of a single variant on one order.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
