//! # Validation Module
//!
//! Input validation at the boundary of each public operation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Outward API collaborator (HTTP routing, not in this repo)    │
//! │  └── Shape checks, deserialization                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE — detected as early as possible, returned        │
//! │  directly; no silent substitution except the documented walk-in        │
//! │  customer default                                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / FOREIGN KEY constraints                       │
//! │  └── CHECK (stock >= 0), CHECK (quantity > 0)                          │
//! │                                                                         │
//! │  Defense in depth: each layer catches a different class of error.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::PaymentMethod;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Quantity
// =============================================================================

/// Validates a requested line quantity.
///
/// ## Rules
/// - Must be positive (zero and negative rejected)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
///
/// ## Example
/// ```rust
/// use atlas_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-3).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive { field: "quantity" });
    }

    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity",
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// SKU
// =============================================================================

/// Validates a variant SKU.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumerics, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required { field: "sku" });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku",
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku",
            reason: "must contain only letters, numbers, hyphens, and underscores",
        });
    }

    Ok(())
}

// =============================================================================
// Payment Method
// =============================================================================

/// Parses and validates a payment method wire code.
///
/// Negative or unrecognised codes are an `InvalidArgument`, reported at
/// the operation boundary before any order is created.
pub fn parse_payment_method(code: i64) -> CoreResult<PaymentMethod> {
    PaymentMethod::from_code(code).ok_or_else(|| {
        CoreError::invalid_argument("payment_method", format!("unrecognised code {code}"))
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_quantity(-5),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_quantity(MAX_LINE_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_sku_rules() {
        assert!(validate_sku("TSH-RED-M").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has spaces").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_payment_method_codes() {
        assert_eq!(parse_payment_method(0).unwrap(), PaymentMethod::Cash);
        assert_eq!(parse_payment_method(1).unwrap(), PaymentMethod::Card);
        assert!(matches!(
            parse_payment_method(-1),
            Err(CoreError::InvalidArgument { .. })
        ));
        assert!(matches!(
            parse_payment_method(42),
            Err(CoreError::InvalidArgument { .. })
        ));
    }
}
