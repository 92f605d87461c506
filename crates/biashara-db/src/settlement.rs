//! # Sale Settlement
//!
//! The transaction coordinator: settles a basket as one all-or-nothing unit
//! of work.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        settle(owner, request)                           │
//! │                                                                         │
//! │  validate_sale_request ──✗──► InvalidRequest (no storage touched)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────── timeout(SettlementConfig::timeout) ───────────────┐  │
//! │  │ BEGIN                                                            │  │
//! │  │ ReceiptBuilder::open            ← first write, takes the lock    │  │
//! │  │ for each line, in basket order:                                  │  │
//! │  │   1. product + inventory        ──✗──► NotFound                  │  │
//! │  │   2. quantity >= requested?     ──✗──► InsufficientStock         │  │
//! │  │   3. receipt item               (unit price = amount / qty)      │  │
//! │  │   4. guarded decrement          ──✗──► InsufficientStock         │  │
//! │  │   5. SALE stock movement                                         │  │
//! │  │   6. CREDIT only: PENDING credit entry                           │  │
//! │  │   7. sales transaction snapshot                                  │  │
//! │  │ finalize receipt total                                           │  │
//! │  │ COMMIT                   (any ✗ above: ROLLBACK, nothing kept)   │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  8. low-stock alerts (best-effort; failures are logged only)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleConfirmation { receipt_number, total, ... }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument, Span};

use crate::error::DbError;
use crate::repository::credit::{self, CreditCustomerRef};
use crate::repository::movement::{self, NewStockMovement};
use crate::repository::receipt::ReceiptBuilder;
use crate::repository::{alert, inventory, product, sales};
use biashara_core::sale::{SaleLine, SaleRequest, ValidatedSale};
use biashara_core::validation::validate_sale_request;
use biashara_core::{CoreError, InventoryRecord, Receipt, SaleConfirmation, ValidationError};

/// Default ceiling for one sale's unit of work.
pub const DEFAULT_SALE_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Configuration
// =============================================================================

/// Settlement configuration.
#[derive(Debug, Clone, Copy)]
pub struct SettlementConfig {
    /// Maximum time for the whole unit of work, including waiting for the
    /// database write lock. Exceeding it rolls the sale back.
    pub timeout: Duration,
}

impl SettlementConfig {
    pub fn new(timeout: Duration) -> Self {
        SettlementConfig { timeout }
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        SettlementConfig {
            timeout: DEFAULT_SALE_TIMEOUT,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why a sale was not settled. Every variant means nothing was persisted.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// The request failed validation; storage was never touched.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// Product or inventory record missing, inactive, or owned by someone else.
    #[error("Product {product_id} not found in inventory")]
    NotFound { product_id: i64 },

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    #[error("Sale timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The task running the sale ended before reporting an outcome.
    #[error("Sale was cancelled")]
    Cancelled,
}

impl SettlementError {
    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            SettlementError::InvalidRequest(_) => "INVALID_REQUEST",
            SettlementError::NotFound { .. } => "NOT_FOUND",
            SettlementError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            SettlementError::Storage(_) => "STORAGE_ERROR",
            SettlementError::Timeout(_) => "TIMEOUT",
            SettlementError::Cancelled => "CANCELLED",
        }
    }
}

impl From<CoreError> for SettlementError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound { product_id } => SettlementError::NotFound { product_id },
            CoreError::InsufficientStock {
                product_id,
                requested,
                available,
            } => SettlementError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            CoreError::Validation(err) => SettlementError::InvalidRequest(err),
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// What the unit of work hands back after commit.
struct Committed {
    receipt: Receipt,
    /// Post-decrement record of each line that ended at or below threshold.
    low_stock: Vec<InventoryRecord>,
}

/// Settles sale requests against the database.
///
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct SaleSettlement {
    pool: SqlitePool,
    config: SettlementConfig,
}

impl SaleSettlement {
    pub fn new(pool: SqlitePool, config: SettlementConfig) -> Self {
        SaleSettlement { pool, config }
    }

    /// Validates and settles a sale for `owner_id`.
    pub async fn settle(
        &self,
        owner_id: i64,
        request: &SaleRequest,
    ) -> Result<SaleConfirmation, SettlementError> {
        let sale = validate_sale_request(request).map_err(|err| {
            warn!(owner_id, field = err.field(), error = %err, "Rejected sale request");
            SettlementError::InvalidRequest(err)
        })?;

        self.settle_validated(owner_id, &sale).await
    }

    /// Settles on a separate task so the sale runs to commit or rollback
    /// even if the caller stops waiting.
    pub async fn settle_detached(
        &self,
        owner_id: i64,
        request: SaleRequest,
    ) -> Result<SaleConfirmation, SettlementError> {
        let settlement = self.clone();
        let handle = tokio::spawn(async move { settlement.settle(owner_id, &request).await });

        match handle.await {
            Ok(outcome) => outcome,
            Err(join_err) => {
                error!(owner_id, error = %join_err, "Sale task did not complete");
                Err(SettlementError::Cancelled)
            }
        }
    }

    /// Settles an already-validated sale.
    pub async fn settle_validated(
        &self,
        owner_id: i64,
        sale: &ValidatedSale,
    ) -> Result<SaleConfirmation, SettlementError> {
        let span = info_span!(
            "sale",
            owner_id,
            payment_method = %sale.payment_method,
            receipt_number = tracing::field::Empty,
        );

        async move {
            let committed =
                match tokio::time::timeout(self.config.timeout, self.unit_of_work(owner_id, sale))
                    .await
                {
                    Ok(outcome) => outcome?,
                    Err(_) => {
                        let timeout_ms = self.config.timeout.as_millis() as u64;
                        warn!(timeout_ms, "Sale timed out, rolled back");
                        return Err(SettlementError::Timeout(self.config.timeout));
                    }
                };

            let low_stock_alerts = self.raise_alerts(&committed.low_stock).await;

            info!(
                receipt_id = committed.receipt.id,
                total = %committed.receipt.total(),
                lines = committed.receipt.items.len(),
                low_stock_alerts,
                "Sale settled"
            );

            Ok(SaleConfirmation {
                receipt_id: committed.receipt.id,
                receipt_number: committed.receipt.receipt_number,
                total_cents: committed.receipt.total_cents,
                line_count: committed.receipt.items.len(),
                payment_method: committed.receipt.payment_method,
                low_stock_alerts,
            })
        }
        .instrument(span)
        .await
    }

    /// Runs steps 1-7 for every line inside one transaction.
    ///
    /// If this future is dropped (timeout), the transaction is dropped with
    /// it and rolled back.
    async fn unit_of_work(
        &self,
        owner_id: i64,
        sale: &ValidatedSale,
    ) -> Result<Committed, SettlementError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        match apply_sale(&mut tx, owner_id, sale, now).await {
            Ok((builder, low_stock)) => {
                let receipt = builder.finalize(&mut tx, now).await?;
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
                Ok(Committed { receipt, low_stock })
            }
            Err(err) => {
                match &err {
                    SettlementError::Storage(db_err) => {
                        error!(code = err.code(), error = %db_err, "Sale failed, rolling back")
                    }
                    _ => warn!(code = err.code(), error = %err, "Sale rejected, rolling back"),
                }
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Step 8: best-effort alerts after commit.
    async fn raise_alerts(&self, records: &[InventoryRecord]) -> usize {
        let mut raised = 0;
        for record in records {
            match alert::raise_if_below_threshold(&self.pool, record, Utc::now()).await {
                Ok(Some(_)) => raised += 1,
                Ok(None) => {}
                Err(err) => warn!(
                    product_id = record.product_id,
                    quantity = record.quantity,
                    error = %err,
                    "Failed to record low-stock alert"
                ),
            }
        }
        raised
    }
}

/// Opens the receipt and settles every line, in basket order.
async fn apply_sale(
    conn: &mut SqliteConnection,
    owner_id: i64,
    sale: &ValidatedSale,
    now: DateTime<Utc>,
) -> Result<(ReceiptBuilder, Vec<InventoryRecord>), SettlementError> {
    let credit_customer = credit_customer(sale)?;

    let mut builder = ReceiptBuilder::open(
        conn,
        owner_id,
        sale.payment_method,
        sale.customer_name.as_deref(),
        now,
    )
    .await?;
    Span::current().record("receipt_number", builder.receipt_number());

    // One alert per line that leaves its product at or below threshold
    let mut low_stock = Vec::new();
    for line in &sale.lines {
        let after = apply_line(conn, &mut builder, owner_id, sale, credit_customer.as_ref(), line, now).await?;
        if after.is_low_stock() {
            low_stock.push(after);
        }
    }

    Ok((builder, low_stock))
}

/// Steps 1-7 for one line. Returns the inventory record after decrement.
async fn apply_line(
    conn: &mut SqliteConnection,
    builder: &mut ReceiptBuilder,
    owner_id: i64,
    sale: &ValidatedSale,
    credit_customer: Option<&CreditCustomerRef<'_>>,
    line: &SaleLine,
    now: DateTime<Utc>,
) -> Result<InventoryRecord, SettlementError> {
    let product_id = line.product_id;

    // 1. product and inventory
    let product = product::fetch_sellable(&mut *conn, owner_id, product_id).await?;
    let record = inventory::fetch_for_update(&mut *conn, owner_id, product_id).await?;
    let (product, record) = match (product, record) {
        (Some(product), Some(record)) => (product, record),
        _ => return Err(CoreError::ProductNotFound { product_id }.into()),
    };

    // 2. sufficiency
    if !record.can_supply(line.quantity) {
        return Err(CoreError::InsufficientStock {
            product_id,
            requested: line.quantity,
            available: record.quantity,
        }
        .into());
    }

    // 3. receipt item
    builder.add_item(&mut *conn, &product, line).await?;

    // 4. decrement, re-checked by the UPDATE itself
    let after = inventory::decrement(&mut *conn, owner_id, product_id, line.quantity, now)
        .await?
        .ok_or(CoreError::InsufficientStock {
            product_id,
            requested: line.quantity,
            available: record.quantity,
        })?;

    // 5. audit
    movement::append(
        &mut *conn,
        &NewStockMovement::sale(owner_id, product_id, line.quantity, line.note.clone(), now),
    )
    .await?;

    // 6. receivable
    if let Some(customer) = credit_customer {
        credit::open(
            &mut *conn,
            owner_id,
            customer.clone(),
            product_id,
            line.quantity,
            line.amount,
            sale.balance_due(),
            now,
        )
        .await?;
    }

    // 7. reporting snapshot
    sales::record(&mut *conn, owner_id, sale, line, now).await?;

    Ok(after)
}

/// Customer identity for a credit sale; `None` for other payment methods.
fn credit_customer(sale: &ValidatedSale) -> Result<Option<CreditCustomerRef<'_>>, SettlementError> {
    if !sale.payment_method.is_credit() {
        return Ok(None);
    }

    let product_id = sale.lines.first().map(|line| line.product_id).unwrap_or_default();
    let name = sale.customer_name.as_deref().ok_or_else(|| ValidationError::RequiredForCredit {
        field: "customer_name".to_string(),
        product_id,
    })?;
    let phone = sale.customer_phone.as_deref().ok_or_else(|| ValidationError::RequiredForCredit {
        field: "customer_phone".to_string(),
        product_id,
    })?;

    Ok(Some(CreditCustomerRef { name, phone }))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::NewProduct;
    use crate::{Database, DbConfig};
    use biashara_core::sale::SaleLineRequest;
    use biashara_core::{ChangeType, CreditStatus, PaymentMethod};

    const OWNER: i64 = 1;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn stock(db: &Database, name: &str, quantity: i64, threshold: i64) -> i64 {
        let (product, _) = db
            .products()
            .create_with_stock(OWNER, &NewProduct::new(name, 1_000), quantity, threshold)
            .await
            .unwrap();
        product.id
    }

    fn line(product_id: i64, quantity: i64, amount: f64) -> SaleLineRequest {
        SaleLineRequest {
            product_id,
            quantity,
            note: None,
            amount,
        }
    }

    fn request(method: &str, products: Vec<SaleLineRequest>) -> SaleRequest {
        SaleRequest {
            products,
            payment_method: method.to_string(),
            ..Default::default()
        }
    }

    async fn count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    /// Row counts of everything a sale writes.
    async fn sale_rows(db: &Database) -> [i64; 6] {
        [
            count(db, "receipts").await,
            count(db, "receipt_items").await,
            count(db, "stock_movements WHERE change_type = 'SALE'").await,
            count(db, "credit_transactions").await,
            count(db, "sales_transactions").await,
            count(db, "low_stock_alerts").await,
        ]
    }

    #[tokio::test]
    async fn test_cash_sale_commits() {
        let db = setup().await;
        let product_id = stock(&db, "Sugar 1kg", 10, 1).await;

        let confirmation = db
            .settlement(SettlementConfig::default())
            .settle(OWNER, &request("CASH", vec![line(product_id, 2, 20.0)]))
            .await
            .unwrap();

        assert_eq!(confirmation.total_cents, 2000);
        assert_eq!(confirmation.line_count, 1);
        assert_eq!(confirmation.payment_method, PaymentMethod::Cash);
        assert_eq!(confirmation.low_stock_alerts, 0);

        assert_eq!(db.inventory().get(OWNER, product_id).await.unwrap().quantity, 8);

        let receipt = db
            .receipts()
            .get_by_number(OWNER, &confirmation.receipt_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(receipt.total_cents, 2000);
        assert_eq!(receipt.items.len(), 1);
        assert_eq!(receipt.items[0].unit_price_cents, 1000);
        assert_eq!(receipt.items[0].total_price_cents, 2000);
        assert_eq!(receipt.items_total(), receipt.total());

        let movements = db.movements().list_for_product(OWNER, product_id).await.unwrap();
        let sale_movement = movements.iter().find(|m| m.change_type == ChangeType::Sale).unwrap();
        assert_eq!(sale_movement.quantity_change, -2);

        assert_eq!(count(&db, "credit_transactions").await, 0);
        assert_eq!(db.sales().count(OWNER).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_stock_persists_nothing() {
        let db = setup().await;
        let product_id = stock(&db, "Rice 2kg", 5, 1).await;

        let err = db
            .settlement(SettlementConfig::default())
            .settle(OWNER, &request("CASH", vec![line(product_id, 100, 1000.0)]))
            .await
            .unwrap_err();

        match err {
            SettlementError::InsufficientStock {
                product_id: failed,
                requested,
                available,
            } => {
                assert_eq!(failed, product_id);
                assert_eq!(requested, 100);
                assert_eq!(available, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(db.inventory().get(OWNER, product_id).await.unwrap().quantity, 5);
        assert_eq!(sale_rows(&db).await, [0; 6]);
    }

    #[tokio::test]
    async fn test_credit_without_phone_is_rejected_before_storage() {
        let db = setup().await;
        let product_id = stock(&db, "Cooking oil", 5, 1).await;

        let mut req = request("CREDIT", vec![line(product_id, 1, 350.0)]);
        req.customer_name = Some("Njeri".to_string());

        let err = db
            .settlement(SettlementConfig::default())
            .settle(OWNER, &req)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_REQUEST");
        assert!(matches!(
            err,
            SettlementError::InvalidRequest(ValidationError::RequiredForCredit { ref field, .. })
                if field == "customer_phone"
        ));
        assert_eq!(sale_rows(&db).await, [0; 6]);
    }

    #[tokio::test]
    async fn test_missing_second_line_rolls_back_first() {
        let db = setup().await;
        let product_id = stock(&db, "Bread", 10, 1).await;

        let err = db
            .settlement(SettlementConfig::default())
            .settle(
                OWNER,
                &request("MPESA", vec![line(product_id, 2, 120.0), line(9_999, 1, 10.0)]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SettlementError::NotFound { product_id: 9_999 }));
        assert_eq!(db.inventory().get(OWNER, product_id).await.unwrap().quantity, 10);
        assert_eq!(sale_rows(&db).await, [0; 6]);
    }

    #[tokio::test]
    async fn test_other_owners_products_are_not_found() {
        let db = setup().await;
        let product_id = stock(&db, "Bread", 10, 1).await;

        let err = db
            .settlement(SettlementConfig::default())
            .settle(2, &request("CASH", vec![line(product_id, 1, 60.0)]))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(db.inventory().get(OWNER, product_id).await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn test_inactive_product_is_not_found() {
        let db = setup().await;
        let product_id = stock(&db, "Old stock", 10, 1).await;
        db.products().deactivate(OWNER, product_id).await.unwrap();

        let err = db
            .settlement(SettlementConfig::default())
            .settle(OWNER, &request("CASH", vec![line(product_id, 1, 10.0)]))
            .await
            .unwrap_err();

        assert!(matches!(err, SettlementError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_credit_sale_opens_one_entry_per_line() {
        let db = setup().await;
        let flour = stock(&db, "Flour", 10, 1).await;
        let salt = stock(&db, "Salt", 10, 1).await;

        let mut req = request("credit", vec![line(flour, 2, 400.0), line(salt, 1, 50.0)]);
        req.customer_name = Some("Kamau".to_string());
        req.customer_phone = Some("0700111222".to_string());
        req.amount_paid = Some(100.0);
        req.remaining_balance = Some(350.0);

        let confirmation = db
            .settlement(SettlementConfig::default())
            .settle(OWNER, &req)
            .await
            .unwrap();
        assert_eq!(confirmation.total_cents, 45_000);
        assert_eq!(confirmation.payment_method, PaymentMethod::Credit);

        let entries = db.credits().list(OWNER).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.status == CreditStatus::Pending));
        assert!(entries.iter().all(|e| e.customer_phone == "0700111222"));
        assert!(entries.iter().all(|e| e.balance_due_cents == 35_000));
        let flour_entry = entries.iter().find(|e| e.product_id == flour).unwrap();
        assert_eq!(flour_entry.credit_amount_cents, 40_000);
        assert_eq!(flour_entry.quantity, 2);
    }

    #[tokio::test]
    async fn test_low_stock_alert_only_at_or_below_threshold() {
        let db = setup().await;
        let product_id = stock(&db, "Matches", 5, 2).await;
        let settlement = db.settlement(SettlementConfig::default());

        // 5 → 3: above threshold
        let first = settlement
            .settle(OWNER, &request("CASH", vec![line(product_id, 2, 20.0)]))
            .await
            .unwrap();
        assert_eq!(first.low_stock_alerts, 0);
        assert_eq!(db.alerts().count_for_product(OWNER, product_id).await.unwrap(), 0);

        // 3 → 2: at threshold
        let second = settlement
            .settle(OWNER, &request("CASH", vec![line(product_id, 1, 10.0)]))
            .await
            .unwrap();
        assert_eq!(second.low_stock_alerts, 1);

        let alerts = db.alerts().latest_unresolved(OWNER).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].quantity, 2);
        assert_eq!(alerts[0].message, "Product stock is low. Current quantity: 2");
    }

    #[tokio::test]
    async fn test_same_product_twice_in_basket() {
        let db = setup().await;
        let product_id = stock(&db, "Eggs", 5, 0).await;

        let err = db
            .settlement(SettlementConfig::default())
            .settle(
                OWNER,
                &request("CASH", vec![line(product_id, 3, 30.0), line(product_id, 3, 30.0)]),
            )
            .await
            .unwrap_err();

        // The second line sees the first line's decrement
        assert!(matches!(err, SettlementError::InsufficientStock { available: 2, .. }));
        assert_eq!(db.inventory().get(OWNER, product_id).await.unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_repeated_product_alerts_once_per_line() {
        let db = setup().await;
        let product_id = stock(&db, "Maize flour", 5, 3).await;

        // 5 → 3 → 2, both lines end at or below the threshold
        let confirmation = db
            .settlement(SettlementConfig::default())
            .settle(
                OWNER,
                &request("CASH", vec![line(product_id, 2, 200.0), line(product_id, 1, 100.0)]),
            )
            .await
            .unwrap();

        assert_eq!(confirmation.low_stock_alerts, 2);
        assert_eq!(db.alerts().count_for_product(OWNER, product_id).await.unwrap(), 2);
        assert_eq!(db.inventory().get(OWNER, product_id).await.unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_overflowing_total_is_invalid_request() {
        let db = setup().await;
        let a = stock(&db, "Land title", 5, 0).await;
        let b = stock(&db, "Tractor", 5, 0).await;

        let err = db
            .settlement(SettlementConfig::default())
            .settle_detached(OWNER, request("CASH", vec![line(a, 1, 5e16), line(b, 1, 5e16)]))
            .await
            .unwrap_err();

        assert!(matches!(err, SettlementError::InvalidRequest(_)));
        assert_eq!(err.code(), "INVALID_REQUEST");
        assert_eq!(count(&db, "receipts").await, 0);
        assert_eq!(db.inventory().get(OWNER, a).await.unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_settle_detached_commits() {
        let db = setup().await;
        let product_id = stock(&db, "Juice", 4, 1).await;

        let confirmation = db
            .settlement(SettlementConfig::default())
            .settle_detached(OWNER, request("MPESA", vec![line(product_id, 3, 300.0)]))
            .await
            .unwrap();

        assert_eq!(confirmation.low_stock_alerts, 1);
        assert_eq!(db.inventory().get(OWNER, product_id).await.unwrap().quantity, 1);
    }

    fn temp_db_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("biashara-settle-{}.db", uuid::Uuid::new_v4()))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_sales_never_oversell() {
        let path = temp_db_path();
        let db = Database::new(DbConfig::new(&path).max_connections(4)).await.unwrap();
        let product_id = stock(&db, "Sugar 2kg", 5, 1).await;

        let settlement = db.settlement(SettlementConfig::default());
        let req = request("CASH", vec![line(product_id, 3, 300.0)]);

        let (a, b) = tokio::join!(settlement.settle(OWNER, &req), settlement.settle(OWNER, &req));

        let outcomes = [a, b];
        let successes = outcomes.iter().filter(|o| o.is_ok()).count();
        let shortfalls = outcomes
            .iter()
            .filter(|o| matches!(o, Err(SettlementError::InsufficientStock { .. })))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(shortfalls, 1);

        assert_eq!(db.inventory().get(OWNER, product_id).await.unwrap().quantity, 2);
        assert_eq!(db.receipts().count(OWNER).await.unwrap(), 1);
        assert_eq!(db.movements().net_change(OWNER, product_id).await.unwrap(), 2);

        db.close().await;
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timeout_rolls_back() {
        let path = temp_db_path();
        let db = Database::new(DbConfig::new(&path).max_connections(3)).await.unwrap();
        let product_id = stock(&db, "Candles", 5, 1).await;

        // Another writer holds the lock for longer than the sale may take
        let mut blocker = db.pool().begin().await.unwrap();
        sqlx::query("UPDATE products SET updated_at = updated_at WHERE id = ?")
            .bind(product_id)
            .execute(&mut *blocker)
            .await
            .unwrap();

        let err = db
            .settlement(SettlementConfig::new(Duration::from_millis(200)))
            .settle(OWNER, &request("CASH", vec![line(product_id, 1, 10.0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, SettlementError::Timeout(_)));
        assert_eq!(err.code(), "TIMEOUT");

        blocker.rollback().await.unwrap();

        assert_eq!(db.inventory().get(OWNER, product_id).await.unwrap().quantity, 5);
        assert_eq!(db.receipts().count(OWNER).await.unwrap(), 0);

        db.close().await;
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SettlementError::Cancelled.code(), "CANCELLED");
        assert_eq!(SettlementError::Storage(DbError::PoolExhausted).code(), "STORAGE_ERROR");
        assert_eq!(
            SettlementError::from(CoreError::ProductNotFound { product_id: 3 }).to_string(),
            "Product 3 not found in inventory"
        );
    }
}
