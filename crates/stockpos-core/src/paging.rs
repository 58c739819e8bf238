//! # Paging
//!
//! Page options and the listing envelope shared by every paginated query.
//!
//! ## Semantics
//! - `page` is 1-indexed; the storage offset is `(page - 1) * limit`
//! - `total_pages = ceil(total_items / limit)`
//! - `next_page = page + 1` while `page < total_pages`, else `None`

use serde::{Deserialize, Serialize};

use crate::DEFAULT_PAGE_LIMIT;

// =============================================================================
// Sort Order
// =============================================================================

/// Sort direction for listing queries. Defaults to descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

impl SortOrder {
    /// The SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

// =============================================================================
// Page Options
// =============================================================================

/// Listing options: page window plus optional sort.
///
/// `sort_by` must already be validated against the entity's column
/// whitelist before it reaches a repository (see
/// [`crate::validation::validate_sort_column`]); repositories interpolate
/// it into SQL.
#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Rows per page.
    pub limit: i64,
    /// 1-indexed page number.
    pub page: i64,
    /// Column to order by; `None` keeps storage order.
    pub sort_by: Option<String>,
    /// Direction applied when `sort_by` is set.
    pub sort_order: SortOrder,
}

impl Default for PageOptions {
    fn default() -> Self {
        PageOptions {
            limit: DEFAULT_PAGE_LIMIT,
            page: 1,
            sort_by: None,
            sort_order: SortOrder::Desc,
        }
    }
}

impl PageOptions {
    /// Zero-indexed row offset for this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

// =============================================================================
// Page Envelope
// =============================================================================

/// A page of results with count metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: i64,
    pub current_page: i64,
    pub next_page: Option<i64>,
    pub total_items: i64,
}

impl<T> Page<T> {
    /// Builds the envelope from a fetched window and the filtered row count.
    pub fn new(items: Vec<T>, total_items: i64, options: &PageOptions) -> Self {
        let total_pages = if options.limit > 0 {
            (total_items + options.limit - 1) / options.limit
        } else {
            0
        };
        let next_page = if options.page < total_pages {
            Some(options.page + 1)
        } else {
            None
        };

        Page {
            items,
            total_pages,
            current_page: options.page,
            next_page,
            total_items,
        }
    }

    /// Maps the item type while keeping the count metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_pages: self.total_pages,
            current_page: self.current_page,
            next_page: self.next_page,
            total_items: self.total_items,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
