//! # Product Repository
//!
//! Products and their initial stock.
//!
//! Product CRUD belongs to the inventory-management surface; this crate only
//! needs to read products during settlement and to create them when seeding.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::inventory;
use crate::repository::movement::{self, NewStockMovement};
use biashara_core::{ChangeType, InventoryRecord, Product};

const PRODUCT_COLUMNS: &str = r#"
    id, owner_id, name, description, category, price_cents, barcode, active,
    created_at, updated_at
"#;

/// Fields needed to create a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub barcode: Option<String>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price_cents: i64) -> Self {
        NewProduct {
            name: name.into(),
            description: None,
            category: None,
            price_cents,
            barcode: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }
}

/// Loads a product the owner can sell: it exists, belongs to the owner and
/// is active.
pub async fn fetch_sellable<'e, E>(
    executor: E,
    owner_id: i64,
    product_id: i64,
) -> DbResult<Option<Product>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM products WHERE owner_id = ? AND id = ? AND active = 1",
        PRODUCT_COLUMNS
    );

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(owner_id)
        .bind(product_id)
        .fetch_optional(executor)
        .await?;

    Ok(product)
}

/// Inserts a product row.
pub async fn insert<'e, E>(
    executor: E,
    owner_id: i64,
    new: &NewProduct,
    at: DateTime<Utc>,
) -> DbResult<Product>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        INSERT INTO products (
            owner_id, name, description, category, price_cents, barcode, active,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)
        RETURNING {}
        "#,
        PRODUCT_COLUMNS
    );

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(owner_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.price_cents)
        .bind(&new.barcode)
        .bind(at)
        .bind(at)
        .fetch_one(executor)
        .await?;

    Ok(product)
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID, active or not.
    pub async fn get_by_id(&self, owner_id: i64, product_id: i64) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE owner_id = ? AND id = ?",
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(owner_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists the owner's products by name.
    pub async fn list(&self, owner_id: i64) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE owner_id = ? ORDER BY name, id",
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Creates a product with its inventory record in one transaction.
    ///
    /// A non-zero opening quantity is recorded as a PURCHASE movement so the
    /// audit trail accounts for every unit later sold.
    pub async fn create_with_stock(
        &self,
        owner_id: i64,
        new: &NewProduct,
        quantity: i64,
        low_stock_threshold: i64,
    ) -> DbResult<(Product, InventoryRecord)> {
        if quantity < 0 || low_stock_threshold < 0 {
            return Err(DbError::CheckViolation {
                message: "quantity and threshold must not be negative".to_string(),
            });
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let product = insert(&mut *tx, owner_id, new, now).await?;
        let record = inventory::insert(
            &mut *tx,
            owner_id,
            product.id,
            quantity,
            low_stock_threshold,
            now,
        )
        .await?;

        if quantity > 0 {
            movement::append(
                &mut *tx,
                &NewStockMovement {
                    owner_id,
                    product_id: product.id,
                    change_type: ChangeType::Purchase,
                    quantity_change: quantity,
                    note: Some("Opening stock".to_string()),
                    created_at: now,
                },
            )
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(owner_id, product_id = product.id, quantity, "Created product with stock");
        Ok((product, record))
    }

    /// Deactivates a product so it can no longer be sold.
    pub async fn deactivate(&self, owner_id: i64, product_id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET active = 0, updated_at = ? WHERE owner_id = ? AND id = ?",
        )
        .bind(Utc::now())
        .bind(owner_id)
        .bind(product_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }
        Ok(())
    }

    /// Counts the owner's products.
    pub async fn count(&self, owner_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_with_stock_records_purchase() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (product, record) = db
            .products()
            .create_with_stock(1, &NewProduct::new("Unga 2kg", 18_000).category("Flour"), 12, 3)
            .await
            .unwrap();

        assert!(product.active);
        assert_eq!(product.category.as_deref(), Some("Flour"));
        assert_eq!(record.quantity, 12);
        assert_eq!(record.low_stock_threshold, 3);

        let movements = db.movements().list_for_product(1, product.id).await.unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].change_type, ChangeType::Purchase);
        assert_eq!(movements[0].quantity_change, 12);
    }

    #[tokio::test]
    async fn test_products_are_owner_scoped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (product, _) = db
            .products()
            .create_with_stock(1, &NewProduct::new("Sugar 1kg", 16_500), 5, 1)
            .await
            .unwrap();

        assert!(db.products().get_by_id(2, product.id).await.unwrap().is_none());
        assert!(fetch_sellable(db.pool(), 2, product.id).await.unwrap().is_none());
        assert_eq!(db.products().count(1).await.unwrap(), 1);
        assert_eq!(db.products().count(2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_inactive_product_is_not_sellable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (product, _) = db
            .products()
            .create_with_stock(1, &NewProduct::new("Bread", 6_000), 5, 1)
            .await
            .unwrap();

        assert!(fetch_sellable(db.pool(), 1, product.id).await.unwrap().is_some());
        db.products().deactivate(1, product.id).await.unwrap();
        assert!(fetch_sellable(db.pool(), 1, product.id).await.unwrap().is_none());
    }
}
