//! # Validation Module
//!
//! Boundary validation for incoming requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  └── Type/required checks; wrong shapes never construct a request      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Range/format/business-shape checks before the ledger runs         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL, UNIQUE, FOREIGN KEY, CHECK(quantity >= 0)               │
//! │                                                                         │
//! │  The ledger itself assumes well-typed input and enforces only          │
//! │  domain invariants (existence, stock sufficiency, uniqueness).         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::paging::PageOptions;
use crate::types::SaleLine;
use crate::{MAX_BATCH_LINES, MAX_LINE_QUANTITY, MAX_PAGE_LIMIT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Columns callers may sort products by.
///
/// `sort_by` values are interpolated into ORDER BY clauses, so anything
/// outside this list must be rejected here.
pub const PRODUCT_SORT_COLUMNS: &[&str] = &[
    "sku",
    "product_name",
    "price_cents",
    "quantity",
    "created_at",
    "updated_at",
];

/// Columns callers may sort categories by.
pub const CATEGORY_SORT_COLUMNS: &[&str] = &["name", "created_at", "updated_at"];

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product or category).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    // Characters, not bytes: multibyte names must not hit the cap early.
    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale/restock quantity: positive and within the per-line cap.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level: zero is fine, negative is not.
pub fn validate_stock_level(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a business sku: positive numeric code.
pub fn validate_sku(sku: i64) -> ValidationResult<()> {
    if sku <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "productId".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Sale Batch
// =============================================================================

/// Validates the shape of a whole sale batch.
///
/// Fails fast on the first invalid line, in input order, matching how the
/// ledger later reports stock problems.
pub fn validate_sale_batch(lines: &[SaleLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }

    if lines.len() > MAX_BATCH_LINES {
        return Err(ValidationError::BatchTooLarge {
            max: MAX_BATCH_LINES,
        });
    }

    for line in lines {
        validate_sku(line.sku)?;
        validate_quantity(line.quantity)?;
        validate_price_cents("totalPrice", line.total_price_cents)?;
    }

    Ok(())
}

// =============================================================================
// Page Options
// =============================================================================

/// Validates page window bounds and the sort column against a whitelist.
pub fn validate_page_options(
    options: &PageOptions,
    sort_columns: &[&str],
) -> ValidationResult<()> {
    if options.limit < 1 || options.limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_LIMIT,
        });
    }

    if options.page < 1 {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }

    if let Some(ref sort_by) = options.sort_by {
        validate_sort_column(sort_by, sort_columns)?;
    }

    Ok(())
}

/// Rejects sort columns outside the whitelist.
pub fn validate_sort_column(sort_by: &str, allowed: &[&str]) -> ValidationResult<()> {
    if !allowed.contains(&sort_by) {
        return Err(ValidationError::NotAllowed {
            field: "sortBy".to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
