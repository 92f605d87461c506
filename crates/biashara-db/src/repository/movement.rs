//! # Stock Movement Recorder
//!
//! Append-only audit log of quantity changes. Rows are never updated or
//! deleted, and carry no foreign key so history survives product removal.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::DbResult;
use biashara_core::{ChangeType, StockMovement};

const MOVEMENT_COLUMNS: &str =
    "id, owner_id, product_id, change_type, quantity_change, note, created_at";

/// A movement about to be appended.
#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub owner_id: i64,
    pub product_id: i64,
    pub change_type: ChangeType,
    pub quantity_change: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewStockMovement {
    /// Stock leaving through a sale: the change is `-quantity`.
    pub fn sale(
        owner_id: i64,
        product_id: i64,
        quantity: i64,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        NewStockMovement {
            owner_id,
            product_id,
            change_type: ChangeType::Sale,
            quantity_change: -quantity,
            note,
            created_at: at,
        }
    }
}

/// Appends a movement.
pub async fn append<'e, E>(executor: E, movement: &NewStockMovement) -> DbResult<StockMovement>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        INSERT INTO stock_movements (owner_id, product_id, change_type, quantity_change, note, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        MOVEMENT_COLUMNS
    );

    let row = sqlx::query_as::<_, StockMovement>(&sql)
        .bind(movement.owner_id)
        .bind(movement.product_id)
        .bind(movement.change_type)
        .bind(movement.quantity_change)
        .bind(movement.note.as_deref())
        .bind(movement.created_at)
        .fetch_one(executor)
        .await?;

    Ok(row)
}

/// Repository for reading the movement log.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// The owner's movements for one product, oldest first.
    pub async fn list_for_product(
        &self,
        owner_id: i64,
        product_id: i64,
    ) -> DbResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {} FROM stock_movements WHERE owner_id = ? AND product_id = ? ORDER BY id",
            MOVEMENT_COLUMNS
        );

        let rows = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(owner_id)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Net quantity change recorded for a product.
    pub async fn net_change(&self, owner_id: i64, product_id: i64) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity_change), 0) FROM stock_movements WHERE owner_id = ? AND product_id = ?",
        )
        .bind(owner_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
