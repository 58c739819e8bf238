//! # Error Types
//!
//! Domain-specific error types for stockpos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockpos-core errors (this file)                                      │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockpos-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP API errors (in app)                                              │
//! │  └── ApiError         - What callers see (serialized, with status)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → JSON          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (sku, id, counts)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations raised by the inventory ledger.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product carries the given business sku.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// No category with the given id exists.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// A product with this sku already exists.
    ///
    /// Distinct from not-found on purpose: duplicate business keys are a
    /// conflict, not a missing resource.
    #[error("Product with sku {0} already exists")]
    DuplicateSku(i64),

    /// A category with this name already exists.
    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),

    /// Requested sale quantity exceeds on-hand stock.
    ///
    /// Raised during batch validation and again if a concurrent sale drains
    /// stock between validation and the conditional decrement.
    #[error("Insufficient stock for product {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: i64,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the request boundary, before business logic runs. The ledger
/// itself assumes well-typed input and only enforces domain invariants.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed {
        field: String,
        allowed: Vec<String>,
    },

    /// A sale batch with no line items.
    #[error("sale batch must contain at least one line item")]
    EmptyBatch,

    /// More line items than a single batch may carry.
    #[error("sale batch cannot have more than {max} line items")]
    BatchTooLarge { max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Helper for the insufficient-stock case.
    pub fn insufficient_stock(sku: i64, available: i64, requested: i64) -> Self {
        CoreError::InsufficientStock {
            sku,
            available,
            requested,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_context() {
        let err = CoreError::insufficient_stock(42, 3, 5);
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 42: available 3, requested 5"
        );

        let err = CoreError::DuplicateSku(7);
        assert_eq!(err.to_string(), "Product with sku 7 already exists");
    }

    #[test]
    fn validation_error_messages() {
        let err = ValidationError::Required {
            field: "productName".to_string(),
        };
        assert_eq!(err.to_string(), "productName is required");

        assert_eq!(
            ValidationError::EmptyBatch.to_string(),
            "sale batch must contain at least one line item"
        );
    }

    #[test]
    fn validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
