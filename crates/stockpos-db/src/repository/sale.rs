//! # Sale Repository
//!
//! The multi-line sale transaction and sale-history queries.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    sell_batch (one transaction)                         │
//! │                                                                         │
//! │  BEGIN IMMEDIATE      ← concurrent batches serialize here              │
//! │    1. Resolve every referenced sku in one SELECT                        │
//! │    2. Validate lines in input order (unknown sku / stock) - fail fast   │
//! │    3. Per line:                                                         │
//! │         UPDATE products SET quantity = quantity - ?                     │
//! │         WHERE id = ? AND quantity >= ?      ← conditional decrement     │
//! │         INSERT INTO sold_products (...)                                 │
//! │  COMMIT  (any error before this rolls everything back)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional decrement is the real stock guard: step 2 gives good
//! error messages from a snapshot, but only `quantity >= ?` in the UPDATE
//! holds against a concurrent sale draining stock first. It also catches
//! a batch that lists the same sku twice for more than is on hand.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult, LedgerResult};
use stockpos_core::{CoreError, Product, SaleLine, SoldProduct};

/// Repository for sale processing and history.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Sells a batch of products atomically.
    ///
    /// Either every line's stock is decremented and recorded, or nothing
    /// changes. Lines are checked in input order and the first failure
    /// aborts the whole batch:
    ///
    /// - unknown sku → [`CoreError::ProductNotFound`]
    /// - not enough stock → [`CoreError::InsufficientStock`]
    ///
    /// Callers validate batch shape (non-empty, line bounds) before this;
    /// see [`stockpos_core::validation::validate_sale_batch`].
    pub async fn sell_batch(&self, lines: &[SaleLine]) -> LedgerResult<Vec<SoldProduct>> {
        debug!(lines = lines.len(), "Processing sale batch");

        // BEGIN IMMEDIATE takes the write lock before the reads. A deferred
        // BEGIN would hand two concurrent batches the same read snapshot and
        // fail the loser's UPDATE with SQLITE_BUSY; this way the loser waits,
        // re-reads committed stock, and gets a stock error instead.
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;

        // Resolve every referenced product in one lookup. SQLite has no
        // array binds, so the IN list gets one placeholder per line.
        let placeholders = vec!["?"; lines.len()].join(", ");
        let sql = format!(
            "SELECT id, sku, product_name, category_id, gender_type, price_cents, \
             quantity, actual_price_cents, sale_price_cents, created_at, updated_at \
             FROM products WHERE sku IN ({placeholders})"
        );
        let mut query = sqlx::query_as::<_, Product>(&sql);
        for line in lines {
            query = query.bind(line.sku);
        }
        let products = query.fetch_all(&mut *tx).await.map_err(DbError::from)?;
        let by_sku: HashMap<i64, &Product> = products.iter().map(|p| (p.sku, p)).collect();

        // Validate against the snapshot first so the caller gets a precise
        // error before any row is touched.
        for line in lines {
            let product = by_sku
                .get(&line.sku)
                .ok_or(CoreError::ProductNotFound(line.sku))?;
            if !product.can_sell(line.quantity) {
                return Err(CoreError::insufficient_stock(
                    line.sku,
                    product.quantity,
                    line.quantity,
                )
                .into());
            }
        }

        let now = Utc::now();
        let mut sold = Vec::with_capacity(lines.len());

        for line in lines {
            let product = by_sku[&line.sku];

            let result = sqlx::query(
                "UPDATE products SET quantity = quantity - ?, updated_at = ? \
                 WHERE id = ? AND quantity >= ?",
            )
            .bind(line.quantity)
            .bind(now)
            .bind(&product.id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if result.rows_affected() == 0 {
                // This batch drained the stock itself (same sku listed
                // twice). Re-read for an accurate message; dropping the
                // transaction rolls back prior lines.
                let available: i64 =
                    sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?")
                        .bind(&product.id)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(DbError::from)?;

                return Err(
                    CoreError::insufficient_stock(line.sku, available, line.quantity).into(),
                );
            }

            let record = SoldProduct {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                quantity: line.quantity,
                total_price_cents: line.total_price_cents,
                created_at: now,
            };

            sqlx::query(
                "INSERT INTO sold_products (id, product_id, quantity, total_price_cents, created_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&record.id)
            .bind(&record.product_id)
            .bind(record.quantity)
            .bind(record.total_price_cents)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            sold.push(record);
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(lines = sold.len(), "Sale batch committed");
        Ok(sold)
    }

    /// Sale-history rows for one product, newest first.
    pub async fn history_for(&self, product_id: &str) -> DbResult<Vec<SoldProduct>> {
        let records = sqlx::query_as::<_, SoldProduct>(
            "SELECT id, product_id, quantity, total_price_cents, created_at \
             FROM sold_products WHERE product_id = ? ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::pool::{Database, DbConfig};
    use stockpos_core::{GenderType, NewProduct, ProductChanges};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// File-backed database with a multi-connection pool, so concurrent
    /// transactions really run on separate connections (the in-memory
    /// config serializes everything on its single connection).
    async fn file_db() -> (Database, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("stockpos-sale-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(5))
            .await
            .unwrap();
        (db, path)
    }

    fn remove_db_files(path: &std::path::Path) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    async fn seed_product(db: &Database, sku: i64, quantity: i64) -> Product {
        let category = db.categories().create("General").await;
        let category_id = match category {
            Ok(c) => c.id,
            // category already seeded by a previous call in this test
            Err(_) => {
                db.categories()
                    .list(Default::default(), Default::default())
                    .await
                    .unwrap()
                    .items[0]
                    .id
                    .clone()
            }
        };

        db.products()
            .create(NewProduct {
                sku,
                product_name: format!("Product {sku}"),
                category_id,
                gender_type: GenderType::Others,
                price_cents: 2_000,
                quantity,
                actual_price_cents: 1_500,
                sale_price_cents: 1_800,
            })
            .await
            .unwrap()
    }

    fn line(sku: i64, quantity: i64) -> SaleLine {
        SaleLine {
            sku,
            quantity,
            total_price_cents: quantity * 2_000,
        }
    }

    #[tokio::test]
    async fn sell_batch_decrements_stock_and_records_history() {
        let db = test_db().await;
        let product = seed_product(&db, 1001, 10).await;
        seed_product(&db, 1002, 5).await;

        let sold = db
            .sales()
            .sell_batch(&[line(1001, 3), line(1002, 2)])
            .await
            .unwrap();
        assert_eq!(sold.len(), 2);

        let p1 = db.products().get_by_sku(1001).await.unwrap().unwrap();
        let p2 = db.products().get_by_sku(1002).await.unwrap().unwrap();
        assert_eq!(p1.quantity, 7);
        assert_eq!(p2.quantity, 3);

        let history = db.sales().history_for(&product.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quantity, 3);
        assert_eq!(history[0].total_price_cents, 6_000);
    }

    #[tokio::test]
    async fn sell_batch_unknown_sku_rolls_back_everything() {
        let db = test_db().await;
        seed_product(&db, 1001, 10).await;

        let err = db
            .sales()
            .sell_batch(&[line(1001, 3), line(9999, 1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Core(CoreError::ProductNotFound(9999))
        ));

        // first line's stock untouched
        let p1 = db.products().get_by_sku(1001).await.unwrap().unwrap();
        assert_eq!(p1.quantity, 10);
        assert!(db.sales().history_for(&p1.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sell_batch_insufficient_stock_rolls_back_everything() {
        let db = test_db().await;
        seed_product(&db, 1001, 10).await;
        seed_product(&db, 1002, 1).await;

        let err = db
            .sales()
            .sell_batch(&[line(1001, 3), line(1002, 5)])
            .await
            .unwrap_err();

        match err {
            LedgerError::Core(CoreError::InsufficientStock {
                sku,
                available,
                requested,
            }) => {
                assert_eq!(sku, 1002);
                assert_eq!(available, 1);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }

        let p1 = db.products().get_by_sku(1001).await.unwrap().unwrap();
        assert_eq!(p1.quantity, 10);
    }

    #[tokio::test]
    async fn sell_batch_same_sku_twice_counts_cumulatively() {
        let db = test_db().await;
        seed_product(&db, 1001, 5).await;

        // Each line passes the snapshot check (5 >= 3), but the second
        // conditional decrement sees only 2 left.
        let err = db
            .sales()
            .sell_batch(&[line(1001, 3), line(1001, 3)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientStock { sku: 1001, .. })
        ));

        let p1 = db.products().get_by_sku(1001).await.unwrap().unwrap();
        assert_eq!(p1.quantity, 5);
    }

    #[tokio::test]
    async fn concurrent_batches_cannot_oversell() {
        let db = test_db().await;
        seed_product(&db, 1001, 5).await;

        let sales_a = db.sales();
        let sales_b = db.sales();
        let lines_a = [line(1001, 5)];
        let lines_b = [line(1001, 5)];
        let (a, b) = tokio::join!(
            sales_a.sell_batch(&lines_a),
            sales_b.sell_batch(&lines_b),
        );

        // Exactly one batch wins; the other sees insufficient stock.
        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let loser = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert!(matches!(
            loser,
            LedgerError::Core(CoreError::InsufficientStock { .. })
        ));

        let p1 = db.products().get_by_sku(1001).await.unwrap().unwrap();
        assert_eq!(p1.quantity, 0);
    }

    #[tokio::test]
    async fn concurrent_batches_on_multi_connection_pool_lose_with_stock_error() {
        let (db, path) = file_db().await;
        seed_product(&db, 1001, 5).await;

        // Repeated rounds so the two batches actually collide on separate
        // connections. The loser must see a stock error, never a raw
        // database error, and stock must never go negative.
        for round in 0..10 {
            db.products()
                .update(
                    1001,
                    ProductChanges {
                        quantity: Some(5),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();

            let sales_a = db.sales();
            let sales_b = db.sales();
            let lines_a = [line(1001, 5)];
            let lines_b = [line(1001, 5)];
            let (a, b) = tokio::join!(
                sales_a.sell_batch(&lines_a),
                sales_b.sell_batch(&lines_b),
            );

            assert_eq!(
                a.is_ok() as u8 + b.is_ok() as u8,
                1,
                "round {round}: expected exactly one winner"
            );
            let loser = if a.is_err() {
                a.unwrap_err()
            } else {
                b.unwrap_err()
            };
            assert!(
                matches!(
                    loser,
                    LedgerError::Core(CoreError::InsufficientStock { sku: 1001, .. })
                ),
                "round {round}: unexpected loser error: {loser}"
            );

            let product = db.products().get_by_sku(1001).await.unwrap().unwrap();
            assert_eq!(product.quantity, 0, "round {round}");
        }

        db.close().await;
        remove_db_files(&path);
    }

    #[tokio::test]
    async fn sold_quantity_listed_as_row_count_not_unit_sum() {
        let db = test_db().await;
        seed_product(&db, 1001, 50).await;

        db.sales().sell_batch(&[line(1001, 7)]).await.unwrap();
        db.sales().sell_batch(&[line(1001, 4)]).await.unwrap();

        let page = db
            .products()
            .list(Default::default(), Default::default())
            .await
            .unwrap();

        // two sale records, not eleven units
        assert_eq!(page.items[0].sales_count, 2);
        assert_eq!(page.items[0].product.quantity, 39);
    }
}
