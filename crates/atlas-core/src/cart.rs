//! # Cart Mutation Rules
//!
//! Pure line-merge logic for building an order.
//!
//! ## Merge Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    add variant V, quantity q                            │
//! │                                                                         │
//! │  Order already has a line for V?                                       │
//! │    yes ──► line.quantity += q        (at most ONE line per variant)    │
//! │    no  ──► push OrderLine { V, q }                                     │
//! │                                                                         │
//! │  Either way the caller re-runs the pricing engine afterwards so the    │
//! │  three aggregates stay consistent with the line set.                   │
//! │                                                                         │
//! │  Stock is NOT touched here: cart building only gets the advisory      │
//! │  check; the authoritative check-and-decrement happens at checkout.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, OrderLine};
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_LINES};

/// What a merge did, so the persistence layer knows whether to UPDATE the
/// existing line row or INSERT a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// An existing line absorbed the quantity.
    Updated { line_id: String, quantity: i64 },
    /// A new line was created.
    Inserted { line_id: String, quantity: i64 },
}

impl Order {
    /// Merges `quantity` of a variant into this order's line set.
    ///
    /// `new_line_id` is the id to use if a new line must be created (ids
    /// are generated by the caller; this crate does no I/O and mints no
    /// identifiers).
    ///
    /// ## Errors
    /// - `InvalidOrderStatus` when the order is frozen (completed or
    ///   cancelled orders never mutate).
    /// - `Validation(OutOfRange)` when the merged quantity would exceed
    ///   [`MAX_LINE_QUANTITY`], or the order already carries
    ///   [`MAX_ORDER_LINES`] distinct lines.
    pub fn merge_line(
        &mut self,
        new_line_id: String,
        variant_id: &str,
        quantity: i64,
    ) -> CoreResult<MergeOutcome> {
        if self.status.is_terminal() {
            return Err(CoreError::InvalidOrderStatus {
                order_code: self.order_code.clone(),
                status: self.status,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.variant_id == variant_id) {
            let merged = line.quantity + quantity;
            if merged > MAX_LINE_QUANTITY {
                return Err(crate::error::ValidationError::OutOfRange {
                    field: "quantity",
                    min: 1,
                    max: MAX_LINE_QUANTITY,
                }
                .into());
            }
            line.quantity = merged;
            return Ok(MergeOutcome::Updated {
                line_id: line.id.clone(),
                quantity: merged,
            });
        }

        if self.lines.len() >= MAX_ORDER_LINES {
            return Err(crate::error::ValidationError::OutOfRange {
                field: "lines",
                min: 1,
                max: MAX_ORDER_LINES as i64,
            }
            .into());
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(crate::error::ValidationError::OutOfRange {
                field: "quantity",
                min: 1,
                max: MAX_LINE_QUANTITY,
            }
            .into());
        }

        self.lines.push(OrderLine {
            id: new_line_id.clone(),
            order_id: self.id.clone(),
            variant_id: variant_id.to_string(),
            quantity,
        });

        Ok(MergeOutcome::Inserted {
            line_id: new_line_id,
            quantity,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
