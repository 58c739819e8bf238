//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Create (category check + duplicate-sku check in one transaction)
//! - Partial update with a restock audit row
//! - Paginated listings with category join and lifetime sale counts
//!
//! ## Listing Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Listed Product Row                               │
//! │                                                                         │
//! │  products p ──┬── JOIN product_categories c ON c.id = p.category_id    │
//! │               │        → category {id, name}                           │
//! │               │                                                         │
//! │               └── (SELECT COUNT(*) FROM sold_products sp               │
//! │                     WHERE sp.product_id = p.id)                        │
//! │                        → sales_count                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult, LedgerError, LedgerResult};
use stockpos_core::validation::{validate_page_options, PRODUCT_SORT_COLUMNS};
use stockpos_core::{
    CategoryRef, CoreError, GenderType, NewProduct, Page, PageOptions, Product, ProductChanges,
    ProductFilter, ProductListing,
};

/// All product columns, as selected for [`Product`] rows.
const PRODUCT_COLUMNS: &str = "id, sku, product_name, category_id, gender_type, price_cents, \
     quantity, actual_price_cents, sale_price_cents, created_at, updated_at";

/// Repository for product catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.create(new_product).await?;
/// let page = repo.list(ProductFilter::default(), PageOptions::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

/// Flat row for the listing query: product columns plus the joined
/// category name and the sale-row count.
#[derive(Debug, sqlx::FromRow)]
struct ProductListingRow {
    id: String,
    sku: i64,
    product_name: String,
    category_id: String,
    gender_type: GenderType,
    price_cents: i64,
    quantity: i64,
    actual_price_cents: i64,
    sale_price_cents: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: String,
    sales_count: i64,
}

impl From<ProductListingRow> for ProductListing {
    fn from(row: ProductListingRow) -> Self {
        ProductListing {
            category: CategoryRef {
                id: row.category_id.clone(),
                name: row.category_name,
            },
            sales_count: row.sales_count,
            product: Product {
                id: row.id,
                sku: row.sku,
                product_name: row.product_name,
                category_id: row.category_id,
                gender_type: row.gender_type,
                price_cents: row.price_cents,
                quantity: row.quantity,
                actual_price_cents: row.actual_price_cents,
                sale_price_cents: row.sale_price_cents,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a product.
    ///
    /// ## Invariants Enforced
    /// 1. The category must already exist (checked before insert so the
    ///    caller gets `CategoryNotFound` instead of a bare FK error)
    /// 2. The sku must be unique; a duplicate yields `DuplicateSku`
    ///
    /// Both checks run inside the insert transaction, so a concurrent
    /// create with the same sku cannot slip between check and insert.
    pub async fn create(&self, new: NewProduct) -> LedgerResult<Product> {
        debug!(sku = new.sku, name = %new.product_name, "Creating product");

        // Write transaction: take the write lock up front so the existence
        // checks and the insert see one consistent state.
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;

        let category: Option<(String,)> =
            sqlx::query_as("SELECT id FROM product_categories WHERE id = ?")
                .bind(&new.category_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(DbError::from)?;

        if category.is_none() {
            return Err(CoreError::CategoryNotFound(new.category_id).into());
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: new.sku,
            product_name: new.product_name,
            category_id: new.category_id,
            gender_type: new.gender_type,
            price_cents: new.price_cents,
            quantity: new.quantity,
            actual_price_cents: new.actual_price_cents,
            sale_price_cents: new.sale_price_cents,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products
                (id, sku, product_name, category_id, gender_type, price_cents,
                 quantity, actual_price_cents, sale_price_cents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(product.sku)
        .bind(&product.product_name)
        .bind(&product.category_id)
        .bind(product.gender_type)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.actual_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => LedgerError::Core(CoreError::DuplicateSku(new.sku)),
            other => LedgerError::Db(other),
        })?;

        tx.commit().await.map_err(DbError::from)?;

        info!(sku = product.sku, id = %product.id, "Product created");
        Ok(product)
    }

    /// Fetches a product by its business sku.
    pub async fn get_by_sku(&self, sku: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Applies a partial update to the product with the given sku and
    /// appends one restock audit row.
    ///
    /// Every successful update writes a `new_stock` record, whether or not
    /// the change touched `quantity`. That keeps the audit trail a
    /// complete edit history rather than a guess at intent.
    ///
    /// Returns the product as it stands after the update.
    pub async fn update(&self, sku: i64, changes: ProductChanges) -> LedgerResult<Product> {
        debug!(sku, "Updating product");

        // Read-modify-write: the write lock must cover the read too.
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?");
        let mut product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::from)?
            .ok_or(CoreError::ProductNotFound(sku))?;

        if let Some(name) = changes.product_name {
            product.product_name = name;
        }
        if let Some(gender) = changes.gender_type {
            product.gender_type = gender;
        }
        if let Some(price) = changes.price_cents {
            product.price_cents = price;
        }
        if let Some(quantity) = changes.quantity {
            product.quantity = quantity;
        }
        if let Some(actual) = changes.actual_price_cents {
            product.actual_price_cents = actual;
        }
        if let Some(sale) = changes.sale_price_cents {
            product.sale_price_cents = sale;
        }
        product.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE products
            SET product_name = ?, gender_type = ?, price_cents = ?, quantity = ?,
                actual_price_cents = ?, sale_price_cents = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.product_name)
        .bind(product.gender_type)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(product.actual_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.updated_at)
        .bind(&product.id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        sqlx::query("INSERT INTO new_stock (id, product_id, created_at) VALUES (?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(&product.id)
            .bind(product.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        tx.commit().await.map_err(DbError::from)?;

        info!(sku, quantity = product.quantity, "Product updated");
        Ok(product)
    }

    /// Lists products with optional filters, returning one page.
    ///
    /// ## Query Shape
    /// Two queries share the same WHERE clause and bind order: a windowed
    /// select (LIMIT/OFFSET) and a `COUNT(*)` over the filtered set for
    /// the page envelope.
    ///
    /// `options.sort_by` is re-checked against the product column
    /// whitelist here because it is interpolated into the SQL text.
    pub async fn list(
        &self,
        filter: ProductFilter,
        options: PageOptions,
    ) -> LedgerResult<Page<ProductListing>> {
        validate_page_options(&options, PRODUCT_SORT_COLUMNS).map_err(CoreError::from)?;

        debug!(
            page = options.page,
            limit = options.limit,
            name_filter = filter.product_name.as_deref().unwrap_or(""),
            "Listing products"
        );

        let mut where_clauses: Vec<&str> = Vec::new();
        if filter.product_name.is_some() {
            where_clauses.push("p.product_name LIKE ?");
        }
        if filter.gender_type.is_some() {
            where_clauses.push("p.gender_type = ?");
        }
        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let order_sql = match options.sort_by.as_deref() {
            Some(column) => format!(" ORDER BY p.{} {}", column, options.sort_order.as_sql()),
            None => String::new(),
        };

        let select_sql = format!(
            r#"
            SELECT
                p.id, p.sku, p.product_name, p.category_id, p.gender_type,
                p.price_cents, p.quantity, p.actual_price_cents, p.sale_price_cents,
                p.created_at, p.updated_at,
                c.name AS category_name,
                (SELECT COUNT(*) FROM sold_products sp WHERE sp.product_id = p.id) AS sales_count
            FROM products p
            JOIN product_categories c ON c.id = p.category_id{where_sql}{order_sql}
            LIMIT ? OFFSET ?
            "#
        );

        let count_sql = format!("SELECT COUNT(*) FROM products p{where_sql}");

        let name_pattern = filter.product_name.map(|name| format!("%{name}%"));

        let mut select = sqlx::query_as::<_, ProductListingRow>(&select_sql);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref pattern) = name_pattern {
            select = select.bind(pattern);
            count = count.bind(pattern);
        }
        if let Some(gender) = filter.gender_type {
            select = select.bind(gender);
            count = count.bind(gender);
        }

        let rows = select
            .bind(options.limit)
            .bind(options.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::from)?;

        let total_items = count.fetch_one(&self.pool).await.map_err(DbError::from)?;

        let items = rows.into_iter().map(ProductListing::from).collect();
        Ok(Page::new(items, total_items, &options))
    }

    /// Counts restock audit rows for a product, by surrogate id.
    pub async fn restock_count(&self, product_id: &str) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM new_stock WHERE product_id = ?",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
