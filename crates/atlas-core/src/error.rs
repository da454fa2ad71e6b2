//! # Error Types
//!
//! Domain-specific error types for atlas-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  atlas-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  atlas-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── ServiceError     - Core + Db at the service boundary              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → HTTP collaborator  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (sku, order code, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each variant maps to a distinct outward HTTP status (a collaborator
//!    concern: NotFound → 404, AlreadyFinalized → 409, the rest → 400/500)

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-facing messages by the
/// outward API layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity (customer, employee, voucher, order, variant)
    /// does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A request argument is malformed or out of range.
    ///
    /// ## When This Occurs
    /// - Unrecognised or negative payment method code
    /// - Non-positive line quantity
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// Not enough stock to satisfy a requested quantity.
    ///
    /// Raised by the advisory check while building the cart and by the
    /// authoritative check at checkout. Names the offending variant and the
    /// required vs. available quantity so the caller can reduce the line
    /// and retry.
    #[error("insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Requested status change is not an edge of the order state machine.
    #[error("invalid order status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: crate::types::OrderStatus,
        to: crate::types::OrderStatus,
    },

    /// `finalize_payment` called on an order that is already completed.
    ///
    /// Terminal and non-retryable: the first checkout won, stock was
    /// decremented exactly once.
    #[error("order {order_code} is already finalized")]
    AlreadyFinalized { order_code: String },

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Adding lines to a completed or cancelled order
    /// - Finalizing a cancelled order
    #[error("order {order_code} is {status:?}, cannot perform operation")]
    InvalidOrderStatus {
        order_code: String,
        status: crate::types::OrderStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates an InvalidArgument error.
    pub fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when request input doesn't meet format requirements.
/// Used for early validation at the boundary of each operation, before
/// business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Invalid format (e.g., bad characters in a sku).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderStatus;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "TSH-RED-M".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for TSH-RED-M: available 3, requested 5"
        );

        let err = CoreError::AlreadyFinalized {
            order_code: "ORD-1A2B3C4D".to_string(),
        };
        assert_eq!(err.to_string(), "order ORD-1A2B3C4D is already finalized");
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let err = CoreError::InvalidTransition {
            from: OrderStatus::Shipping,
            to: OrderStatus::Pending,
        };
        assert!(err.to_string().contains("Shipping"));
        assert!(err.to_string().contains("Pending"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive { field: "quantity" };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
