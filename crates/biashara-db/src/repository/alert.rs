//! # Low-Stock Alert Emitter
//!
//! Raises an alert when a product's quantity is at or below its threshold.
//! Settlement calls this after commit; a failure here is logged by the caller
//! and never undoes a sale.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use biashara_core::reporting::LowStockAlertView;
use biashara_core::{low_stock_message, InventoryRecord, LowStockAlert};

/// Persists an alert when `record` is at or below its threshold.
///
/// Returns `None` without touching the database when stock is healthy.
pub async fn raise_if_below_threshold<'e, E>(
    executor: E,
    record: &InventoryRecord,
    at: DateTime<Utc>,
) -> DbResult<Option<LowStockAlert>>
where
    E: Executor<'e, Database = Sqlite>,
{
    if !record.is_low_stock() {
        return Ok(None);
    }

    let alert = sqlx::query_as::<_, LowStockAlert>(
        r#"
        INSERT INTO low_stock_alerts (owner_id, product_id, message, resolved, created_at)
        VALUES (?, ?, ?, 0, ?)
        RETURNING id, owner_id, product_id, message, resolved, created_at
        "#,
    )
    .bind(record.owner_id)
    .bind(record.product_id)
    .bind(low_stock_message(record.quantity))
    .bind(at)
    .fetch_one(executor)
    .await?;

    debug!(
        owner_id = record.owner_id,
        product_id = record.product_id,
        quantity = record.quantity,
        threshold = record.low_stock_threshold,
        "Low-stock alert raised"
    );

    Ok(Some(alert))
}

/// Repository for low-stock alerts.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    pool: SqlitePool,
}

impl AlertRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AlertRepository { pool }
    }

    /// Raises an alert for `record` if it is low, using its own connection.
    pub async fn raise_if_below_threshold(
        &self,
        record: &InventoryRecord,
    ) -> DbResult<Option<LowStockAlert>> {
        raise_if_below_threshold(&self.pool, record, Utc::now()).await
    }

    /// The newest unresolved alert per product, with current stock.
    pub async fn latest_unresolved(&self, owner_id: i64) -> DbResult<Vec<LowStockAlertView>> {
        let rows = sqlx::query_as::<_, LowStockAlertView>(
            r#"
            SELECT
                a.id AS alert_id,
                a.product_id,
                p.name AS product_name,
                a.message,
                i.quantity,
                i.low_stock_threshold,
                a.created_at
            FROM low_stock_alerts a
            JOIN products p ON p.id = a.product_id AND p.owner_id = a.owner_id
            JOIN inventory i ON i.product_id = a.product_id AND i.owner_id = a.owner_id
            WHERE a.owner_id = ?
              AND a.resolved = 0
              AND a.id = (
                  SELECT MAX(latest.id)
                  FROM low_stock_alerts latest
                  WHERE latest.owner_id = a.owner_id
                    AND latest.product_id = a.product_id
                    AND latest.resolved = 0
              )
            ORDER BY a.created_at DESC, a.id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Number of alerts ever raised for a product.
    pub async fn count_for_product(&self, owner_id: i64, product_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM low_stock_alerts WHERE owner_id = ? AND product_id = ?",
        )
        .bind(owner_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
