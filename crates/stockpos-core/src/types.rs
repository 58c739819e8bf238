//! # Domain Types
//!
//! Core domain types for the inventory ledger.
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 string - immutable surrogate key, used for relations
//! - Business key where one exists: `sku` on products, `name` on categories
//!
//! Sale history rows reference the **surrogate** product id so that history
//! survives sku edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Gender Type
// =============================================================================

/// Product audience segment.
///
/// Stored as uppercase TEXT; the wire format uses the same spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum GenderType {
    Male,
    Female,
    Kids,
    Others,
}

impl Default for GenderType {
    fn default() -> Self {
        GenderType::Male
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product with its on-hand stock level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Surrogate key (UUID v4).
    pub id: String,

    /// Business key: the externally visible numeric product code.
    pub sku: i64,

    /// Display name.
    pub product_name: String,

    /// Owning category (surrogate key of `ProductCategory`).
    pub category_id: String,

    /// Audience segment.
    pub gender_type: GenderType,

    /// List price in cents.
    pub price_cents: i64,

    /// On-hand count. Never negative.
    pub quantity: i64,

    /// Purchase cost in cents.
    pub actual_price_cents: i64,

    /// Discounted price in cents.
    pub sale_price_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether `quantity` units can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// Input for creating a [`Product`]. The ledger assigns the surrogate id
/// and timestamps.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: i64,
    pub product_name: String,
    pub category_id: String,
    pub gender_type: GenderType,
    pub price_cents: i64,
    pub quantity: i64,
    pub actual_price_cents: i64,
    pub sale_price_cents: i64,
}

/// Partial change set for [`Product`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub product_name: Option<String>,
    pub gender_type: Option<GenderType>,
    pub price_cents: Option<i64>,
    /// Absolute stock reset (restock), not a delta.
    pub quantity: Option<i64>,
    pub actual_price_cents: Option<i64>,
    pub sale_price_cents: Option<i64>,
}

impl ProductChanges {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none()
            && self.gender_type.is_none()
            && self.price_cents.is_none()
            && self.quantity.is_none()
            && self.actual_price_cents.is_none()
            && self.sale_price_cents.is_none()
    }
}

// =============================================================================
// Product Category
// =============================================================================

/// A product category. Created independently; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductCategory {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The `{id, name}` category projection attached to listed products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Sale History
// =============================================================================

/// One line item of an incoming sale batch, keyed by business sku.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    /// Business product code of the product being sold.
    pub sku: i64,
    /// Units sold. Positive.
    pub quantity: i64,
    /// Amount charged for the whole line, in cents.
    pub total_price_cents: i64,
}

/// An immutable sale-history record: one row per successful sale line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SoldProduct {
    pub id: String,
    /// Surrogate key of the product sold (not the business sku).
    pub product_id: String,
    pub quantity: i64,
    pub total_price_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// A restock audit record, appended once per product update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct NewStockRecord {
    pub id: String,
    pub product_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Listing Projections
// =============================================================================

/// Optional filters for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the product name.
    pub product_name: Option<String>,
    /// Exact match on audience segment.
    pub gender_type: Option<GenderType>,
}

/// Optional filters for category listings.
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Case-insensitive substring match on the category name.
    pub name: Option<String>,
}

/// A listed product, augmented with its category and lifetime sale stats.
///
/// `sales_count` is the number of `SoldProduct` rows for the product - a
/// count of sale-line records, not a sum of their quantities. That matches
/// the historical behavior this system replaces; see DESIGN.md.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub category: CategoryRef,
    pub sales_count: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_type_default_is_male() {
        assert_eq!(GenderType::default(), GenderType::Male);
    }

    #[test]
    fn product_changes_empty_detection() {
        assert!(ProductChanges::default().is_empty());

        let changes = ProductChanges {
            quantity: Some(25),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
