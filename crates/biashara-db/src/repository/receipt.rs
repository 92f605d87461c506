//! # Receipt Builder and Receipt Reads
//!
//! ## Receipt Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Receipt Lifecycle                                 │
//! │                                                                         │
//! │  1. OPEN (inside the sale transaction)                                 │
//! │     └── ReceiptBuilder::open() → receipts row, total = 0               │
//! │         (fresh receipt number on UNIQUE collision, up to 5 tries)      │
//! │                                                                         │
//! │  2. ADD ITEMS                                                          │
//! │     └── add_item() → receipt_items row, running total += line amount   │
//! │     └── add_item() → ...                                               │
//! │                                                                         │
//! │  3. FINALIZE                                                           │
//! │     └── finalize() → receipts.total_cents = Σ item totals              │
//! │                                                                         │
//! │  4. COMMIT or ROLLBACK (settlement)                                    │
//! │     └── rollback removes the receipt and, by cascade, its items        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use biashara_core::sale::{generate_receipt_number, SaleLine};
use biashara_core::{Money, PaymentMethod, Product, Receipt, ReceiptItem};

/// Attempts at finding an unused receipt number before giving up.
pub const MAX_RECEIPT_NUMBER_ATTEMPTS: usize = 5;

const RECEIPT_NUMBER_COLUMN: &str = "receipts.receipt_number";

const RECEIPT_COLUMNS: &str = r#"
    id, owner_id, receipt_number, customer_name, payment_method, total_cents,
    created_at, updated_at
"#;

const ITEM_COLUMNS: &str =
    "id, receipt_id, product_id, name, quantity, unit_price_cents, total_price_cents";

// =============================================================================
// Receipt Builder
// =============================================================================

/// Accumulates items onto a receipt inside a transaction.
///
/// The receipt total always equals the sum of the items added so far; it is
/// written back by [`ReceiptBuilder::finalize`].
#[derive(Debug)]
pub struct ReceiptBuilder {
    receipt: Receipt,
    running_total: Money,
}

impl ReceiptBuilder {
    /// Inserts an empty receipt.
    ///
    /// When used as the first statement of a transaction this takes the
    /// SQLite write lock for the rest of the transaction.
    pub async fn open(
        conn: &mut SqliteConnection,
        owner_id: i64,
        payment_method: PaymentMethod,
        customer_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> DbResult<Self> {
        Self::open_with(conn, owner_id, payment_method, customer_name, at, || {
            generate_receipt_number(at)
        })
        .await
    }

    /// Like [`ReceiptBuilder::open`], drawing candidate receipt numbers from
    /// `next_number`. A candidate that is already taken is replaced by the
    /// next one, up to [`MAX_RECEIPT_NUMBER_ATTEMPTS`] candidates.
    pub async fn open_with<F>(
        conn: &mut SqliteConnection,
        owner_id: i64,
        payment_method: PaymentMethod,
        customer_name: Option<&str>,
        at: DateTime<Utc>,
        mut next_number: F,
    ) -> DbResult<Self>
    where
        F: FnMut() -> String,
    {
        let sql = format!(
            r#"
            INSERT INTO receipts (
                owner_id, receipt_number, customer_name, payment_method, total_cents,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, 0, ?, ?)
            RETURNING {}
            "#,
            RECEIPT_COLUMNS
        );

        let mut last_err = None;
        for attempt in 1..=MAX_RECEIPT_NUMBER_ATTEMPTS {
            let receipt_number = next_number();

            let inserted = sqlx::query_as::<_, Receipt>(&sql)
                .bind(owner_id)
                .bind(&receipt_number)
                .bind(customer_name)
                .bind(payment_method)
                .bind(at)
                .bind(at)
                .fetch_one(&mut *conn)
                .await
                .map_err(DbError::from);

            match inserted {
                Ok(receipt) => {
                    debug!(receipt_id = receipt.id, receipt_number = %receipt.receipt_number, "Opened receipt");
                    return Ok(ReceiptBuilder {
                        receipt,
                        running_total: Money::zero(),
                    });
                }
                Err(err) if err.is_unique_violation_on(RECEIPT_NUMBER_COLUMN) => {
                    warn!(attempt, receipt_number = %receipt_number, "Receipt number collision, retrying");
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err.unwrap_or_else(|| DbError::duplicate(RECEIPT_NUMBER_COLUMN, "unknown")))
    }

    /// Adds one sold line to the receipt.
    ///
    /// The product name is frozen onto the item. The unit price is derived
    /// from the line amount; the item total is the line amount itself.
    pub async fn add_item(
        &mut self,
        conn: &mut SqliteConnection,
        product: &Product,
        line: &SaleLine,
    ) -> DbResult<&ReceiptItem> {
        let running_total = self.running_total.checked_add(line.amount).ok_or_else(|| {
            DbError::CheckViolation {
                message: format!("receipt {} total overflows", self.receipt.receipt_number),
            }
        })?;

        let sql = format!(
            r#"
            INSERT INTO receipt_items (
                receipt_id, product_id, name, quantity, unit_price_cents, total_price_cents
            ) VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        );

        let item = sqlx::query_as::<_, ReceiptItem>(&sql)
            .bind(self.receipt.id)
            .bind(product.id)
            .bind(&product.name)
            .bind(line.quantity)
            .bind(line.unit_price().cents())
            .bind(line.amount.cents())
            .fetch_one(&mut *conn)
            .await?;

        self.running_total = running_total;
        self.receipt.items.push(item);

        let index = self.receipt.items.len() - 1;
        Ok(&self.receipt.items[index])
    }

    /// Writes the final total and returns the completed receipt.
    pub async fn finalize(
        mut self,
        conn: &mut SqliteConnection,
        at: DateTime<Utc>,
    ) -> DbResult<Receipt> {
        let result = sqlx::query(
            "UPDATE receipts SET total_cents = ?, updated_at = ? WHERE id = ?",
        )
        .bind(self.running_total.cents())
        .bind(at)
        .bind(self.receipt.id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Receipt", self.receipt.id));
        }

        self.receipt.total_cents = self.running_total.cents();
        self.receipt.updated_at = at;
        Ok(self.receipt)
    }

    pub fn receipt_id(&self) -> i64 {
        self.receipt.id
    }

    pub fn receipt_number(&self) -> &str {
        &self.receipt.receipt_number
    }

    /// Sum of the items added so far.
    pub fn total(&self) -> Money {
        self.running_total
    }
}

// =============================================================================
// Receipt Reads
// =============================================================================

/// Repository for reading persisted receipts.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Gets a receipt with its items by receipt number.
    pub async fn get_by_number(
        &self,
        owner_id: i64,
        receipt_number: &str,
    ) -> DbResult<Option<Receipt>> {
        let sql = format!(
            "SELECT {} FROM receipts WHERE owner_id = ? AND receipt_number = ?",
            RECEIPT_COLUMNS
        );

        let receipt = sqlx::query_as::<_, Receipt>(&sql)
            .bind(owner_id)
            .bind(receipt_number)
            .fetch_optional(&self.pool)
            .await?;

        match receipt {
            Some(mut receipt) => {
                receipt.items = self.items_for(receipt.id).await?;
                Ok(Some(receipt))
            }
            None => Ok(None),
        }
    }

    /// Lists receipts with their items, newest first.
    ///
    /// Both bounds are inclusive and optional.
    pub async fn list(
        &self,
        owner_id: i64,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DbResult<Vec<Receipt>> {
        let sql = format!(
            r#"
            SELECT {} FROM receipts
            WHERE owner_id = ?
              AND (? IS NULL OR created_at >= ?)
              AND (? IS NULL OR created_at <= ?)
            ORDER BY created_at DESC, id DESC
            "#,
            RECEIPT_COLUMNS
        );

        let mut receipts = sqlx::query_as::<_, Receipt>(&sql)
            .bind(owner_id)
            .bind(start)
            .bind(start)
            .bind(end)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        for receipt in &mut receipts {
            receipt.items = self.items_for(receipt.id).await?;
        }

        Ok(receipts)
    }

    /// Items of a receipt in the order they were added.
    pub async fn items_for(&self, receipt_id: i64) -> DbResult<Vec<ReceiptItem>> {
        let sql = format!(
            "SELECT {} FROM receipt_items WHERE receipt_id = ? ORDER BY id",
            ITEM_COLUMNS
        );

        let items = sqlx::query_as::<_, ReceiptItem>(&sql)
            .bind(receipt_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Counts the owner's receipts.
    pub async fn count(&self, owner_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipts WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
