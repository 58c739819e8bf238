//! # Category Repository
//!
//! Category creation and paginated listings. Categories are created
//! independently of products and are never deleted, so products can
//! always join back to a live category row.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, LedgerError, LedgerResult};
use stockpos_core::validation::{validate_name, validate_page_options, CATEGORY_SORT_COLUMNS};
use stockpos_core::{CategoryFilter, CoreError, Page, PageOptions, ProductCategory};

/// Repository for product category operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a category. Names are trimmed and must be unique.
    pub async fn create(&self, name: &str) -> LedgerResult<ProductCategory> {
        validate_name("name", name).map_err(CoreError::from)?;
        let name = name.trim();

        debug!(name, "Creating category");

        let now = Utc::now();
        let category = ProductCategory {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO product_categories (id, name, created_at, updated_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => {
                LedgerError::Core(CoreError::DuplicateCategory(name.to_string()))
            }
            other => LedgerError::Db(other),
        })?;

        info!(name = %category.name, id = %category.id, "Category created");
        Ok(category)
    }

    /// Lists categories with an optional name filter, returning one page.
    ///
    /// `options.sort_by` is re-checked against the category column
    /// whitelist here because it is interpolated into the SQL text.
    pub async fn list(
        &self,
        filter: CategoryFilter,
        options: PageOptions,
    ) -> LedgerResult<Page<ProductCategory>> {
        validate_page_options(&options, CATEGORY_SORT_COLUMNS).map_err(CoreError::from)?;

        debug!(
            page = options.page,
            limit = options.limit,
            "Listing categories"
        );

        let where_sql = if filter.name.is_some() {
            " WHERE name LIKE ?"
        } else {
            ""
        };
        let order_sql = match options.sort_by.as_deref() {
            Some(column) => format!(" ORDER BY {} {}", column, options.sort_order.as_sql()),
            None => String::new(),
        };

        let select_sql = format!(
            "SELECT id, name, created_at, updated_at FROM product_categories\
             {where_sql}{order_sql} LIMIT ? OFFSET ?"
        );
        let count_sql = format!("SELECT COUNT(*) FROM product_categories{where_sql}");

        let name_pattern = filter.name.map(|name| format!("%{name}%"));

        let mut select = sqlx::query_as::<_, ProductCategory>(&select_sql);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref pattern) = name_pattern {
            select = select.bind(pattern);
            count = count.bind(pattern);
        }

        let items = select
            .bind(options.limit)
            .bind(options.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        let total_items = count.fetch_one(&self.pool).await.map_err(DbError::from)?;

        Ok(Page::new(items, total_items, &options))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
