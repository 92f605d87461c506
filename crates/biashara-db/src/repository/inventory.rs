//! # Inventory Ledger
//!
//! Per-product available quantity and low-stock threshold.
//!
//! ## Decrement Without Oversell
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two sales for 3 units each, stock = 5                                 │
//! │                                                                         │
//! │  Sale A: BEGIN; INSERT receipt  ← takes the write lock                 │
//! │  Sale B: BEGIN; INSERT receipt  ← waits (busy_timeout)                 │
//! │  Sale A: UPDATE inventory SET quantity = quantity - 3                  │
//! │          WHERE ... AND quantity >= 3        → 1 row, quantity = 2      │
//! │  Sale A: COMMIT                             ← lock released            │
//! │  Sale B: INSERT receipt (proceeds)                                     │
//! │  Sale B: read quantity = 2 < 3              → InsufficientStock        │
//! │  Sale B: ROLLBACK                                                      │
//! │                                                                         │
//! │  The WHERE guard re-checks sufficiency in the same statement that      │
//! │  mutates, so the row can never go below zero whatever the ordering.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::{DbError, DbResult};
use biashara_core::InventoryRecord;

const INVENTORY_COLUMNS: &str =
    "id, owner_id, product_id, quantity, low_stock_threshold, last_updated";

/// Reads the inventory record for (owner, product) inside the caller's
/// transaction.
///
/// SQLite has no row locks; the caller's transaction already holds the
/// database write lock, so the value cannot change before commit.
pub async fn fetch_for_update<'e, E>(
    executor: E,
    owner_id: i64,
    product_id: i64,
) -> DbResult<Option<InventoryRecord>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM inventory WHERE owner_id = ? AND product_id = ?",
        INVENTORY_COLUMNS
    );

    let record = sqlx::query_as::<_, InventoryRecord>(&sql)
        .bind(owner_id)
        .bind(product_id)
        .fetch_optional(executor)
        .await?;

    Ok(record)
}

/// Takes `amount` units from the record, returning the updated record.
///
/// Returns `None` when the record is missing or holds fewer than `amount`
/// units; nothing is changed in that case.
pub async fn decrement<'e, E>(
    executor: E,
    owner_id: i64,
    product_id: i64,
    amount: i64,
    at: DateTime<Utc>,
) -> DbResult<Option<InventoryRecord>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        UPDATE inventory
        SET quantity = quantity - ?, last_updated = ?
        WHERE owner_id = ? AND product_id = ? AND quantity >= ?
        RETURNING {}
        "#,
        INVENTORY_COLUMNS
    );

    let record = sqlx::query_as::<_, InventoryRecord>(&sql)
        .bind(amount)
        .bind(at)
        .bind(owner_id)
        .bind(product_id)
        .bind(amount)
        .fetch_optional(executor)
        .await?;

    Ok(record)
}

/// Creates the inventory record for a product.
pub async fn insert<'e, E>(
    executor: E,
    owner_id: i64,
    product_id: i64,
    quantity: i64,
    low_stock_threshold: i64,
    at: DateTime<Utc>,
) -> DbResult<InventoryRecord>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        INSERT INTO inventory (owner_id, product_id, quantity, low_stock_threshold, last_updated)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        INVENTORY_COLUMNS
    );

    let record = sqlx::query_as::<_, InventoryRecord>(&sql)
        .bind(owner_id)
        .bind(product_id)
        .bind(quantity)
        .bind(low_stock_threshold)
        .bind(at)
        .fetch_one(executor)
        .await?;

    Ok(record)
}

/// Repository for inventory reads outside a sale.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets the inventory record for (owner, product).
    ///
    /// ## Errors
    /// `DbError::NotFound` when the owner has no record for the product.
    pub async fn get(&self, owner_id: i64, product_id: i64) -> DbResult<InventoryRecord> {
        fetch_for_update(&self.pool, owner_id, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Inventory", product_id))
    }

    /// Lists the owner's inventory records by product.
    pub async fn list(&self, owner_id: i64) -> DbResult<Vec<InventoryRecord>> {
        let sql = format!(
            "SELECT {} FROM inventory WHERE owner_id = ? ORDER BY product_id",
            INVENTORY_COLUMNS
        );

        let records = sqlx::query_as::<_, InventoryRecord>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }
}
