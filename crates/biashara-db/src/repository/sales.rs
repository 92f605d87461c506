//! # Sales Transactions
//!
//! One denormalized row per sold line, written during settlement and read
//! by the dashboard (history, revenue metrics).

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::DbResult;
use biashara_core::reporting::{
    PaymentBreakdown, PeriodStarts, SalesHistoryEntry, SalesMetrics, TopProduct,
};
use biashara_core::sale::{SaleLine, ValidatedSale};
use biashara_core::SalesTransaction;

const SALES_COLUMNS: &str = r#"
    id, owner_id, product_id, quantity, total_amount_cents, payment_method,
    customer_name, customer_phone, reference_number, created_at, updated_at
"#;

/// Records the reporting snapshot of one sold line.
pub async fn record<'e, E>(
    executor: E,
    owner_id: i64,
    sale: &ValidatedSale,
    line: &SaleLine,
    at: DateTime<Utc>,
) -> DbResult<SalesTransaction>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        INSERT INTO sales_transactions (
            owner_id, product_id, quantity, total_amount_cents, payment_method,
            customer_name, customer_phone, reference_number, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        SALES_COLUMNS
    );

    let row = sqlx::query_as::<_, SalesTransaction>(&sql)
        .bind(owner_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.amount.cents())
        .bind(sale.payment_method)
        .bind(sale.customer_name.as_deref())
        .bind(sale.customer_phone.as_deref())
        .bind(sale.reference_number.as_deref())
        .bind(at)
        .bind(at)
        .fetch_one(executor)
        .await?;

    Ok(row)
}

/// Repository for sales reporting.
#[derive(Debug, Clone)]
pub struct SalesRepository {
    pool: SqlitePool,
}

impl SalesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SalesRepository { pool }
    }

    /// Every sale line of the owner with the product's name, newest first.
    pub async fn history(&self, owner_id: i64) -> DbResult<Vec<SalesHistoryEntry>> {
        let rows = sqlx::query_as::<_, SalesHistoryEntry>(
            r#"
            SELECT
                s.id,
                s.product_id,
                p.name AS product_name,
                s.quantity,
                s.total_amount_cents,
                s.payment_method,
                s.customer_name,
                s.customer_phone,
                s.reference_number,
                s.created_at
            FROM sales_transactions s
            JOIN products p ON p.id = s.product_id AND p.owner_id = s.owner_id
            WHERE s.owner_id = ?
            ORDER BY s.created_at DESC, s.id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Revenue figures for the periods containing `now`.
    pub async fn metrics(&self, owner_id: i64, now: DateTime<Utc>) -> DbResult<SalesMetrics> {
        let starts = PeriodStarts::containing(now);

        let daily = self.revenue_since(owner_id, starts.day).await?;
        let weekly = self.revenue_since(owner_id, starts.week).await?;
        let monthly = self.revenue_since(owner_id, starts.month).await?;

        let payment_breakdown = sqlx::query_as::<_, PaymentBreakdown>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN payment_method = 'CASH' THEN total_amount_cents ELSE 0 END), 0) AS cash_cents,
                COALESCE(SUM(CASE WHEN payment_method = 'MPESA' THEN total_amount_cents ELSE 0 END), 0) AS mpesa_cents,
                COALESCE(SUM(CASE WHEN payment_method = 'CREDIT' THEN total_amount_cents ELSE 0 END), 0) AS credit_cents
            FROM sales_transactions
            WHERE owner_id = ? AND created_at >= ?
            "#,
        )
        .bind(owner_id)
        .bind(starts.month)
        .fetch_one(&self.pool)
        .await?;

        let top_product = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT
                p.id AS product_id,
                p.name AS product_name,
                SUM(s.quantity) AS quantity,
                SUM(s.total_amount_cents) AS revenue_cents
            FROM sales_transactions s
            JOIN products p ON p.id = s.product_id AND p.owner_id = s.owner_id
            WHERE s.owner_id = ? AND s.created_at >= ?
            GROUP BY p.id, p.name
            ORDER BY revenue_cents DESC, p.id
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .bind(starts.month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(SalesMetrics {
            daily_revenue_cents: daily,
            weekly_revenue_cents: weekly,
            monthly_revenue_cents: monthly,
            payment_breakdown,
            top_product,
        })
    }

    async fn revenue_since(&self, owner_id: i64, since: DateTime<Utc>) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount_cents), 0) FROM sales_transactions WHERE owner_id = ? AND created_at >= ?",
        )
        .bind(owner_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Counts the owner's sale lines.
    pub async fn count(&self, owner_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sales_transactions WHERE owner_id = ?")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::NewProduct;
    use crate::{Database, DbConfig};
    use biashara_core::{Money, PaymentMethod};
    use chrono::Duration;

    fn sale(method: PaymentMethod, lines: Vec<SaleLine>) -> ValidatedSale {
        ValidatedSale {
            lines,
            payment_method: method,
            customer_name: None,
            customer_phone: None,
            reference_number: Some("QWE123".to_string()),
            amount_paid: None,
            remaining_balance: None,
        }
    }

    fn line(product_id: i64, quantity: i64, cents: i64) -> SaleLine {
        SaleLine {
            product_id,
            quantity,
            note: None,
            amount: Money::from_cents(cents),
        }
    }

    #[tokio::test]
    async fn test_history_and_metrics() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (bread, _) = db
            .products()
            .create_with_stock(1, &NewProduct::new("Bread", 6_000), 50, 1)
            .await
            .unwrap();
        let (milk, _) = db
            .products()
            .create_with_stock(1, &NewProduct::new("Milk", 6_500), 50, 1)
            .await
            .unwrap();

        let now = Utc::now();
        let cash = sale(PaymentMethod::Cash, vec![line(bread.id, 2, 12_000)]);
        let mpesa = sale(PaymentMethod::Mpesa, vec![line(milk.id, 1, 6_500)]);
        record(db.pool(), 1, &cash, &cash.lines[0], now).await.unwrap();
        record(db.pool(), 1, &mpesa, &mpesa.lines[0], now).await.unwrap();
        // Last year: outside every period
        record(db.pool(), 1, &cash, &cash.lines[0], now - Duration::days(400))
            .await
            .unwrap();

        let history = db.sales().history(1).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().any(|h| h.product_name == "Bread"));
        assert!(history[2].created_at < now - Duration::days(1));

        let metrics = db.sales().metrics(1, now).await.unwrap();
        assert_eq!(metrics.daily_revenue_cents, 18_500);
        assert_eq!(metrics.weekly_revenue_cents, 18_500);
        assert_eq!(metrics.monthly_revenue_cents, 18_500);
        assert_eq!(metrics.payment_breakdown.cash_cents, 12_000);
        assert_eq!(metrics.payment_breakdown.mpesa_cents, 6_500);
        assert_eq!(metrics.payment_breakdown.credit_cents, 0);

        let top = metrics.top_product.unwrap();
        assert_eq!(top.product_name, "Bread");
        assert_eq!(top.quantity, 2);
        assert_eq!(top.revenue_cents, 12_000);
    }

    #[tokio::test]
    async fn test_metrics_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let metrics = db.sales().metrics(1, Utc::now()).await.unwrap();
        assert_eq!(metrics.monthly_revenue_cents, 0);
        assert_eq!(metrics.payment_breakdown, PaymentBreakdown::default());
        assert!(metrics.top_product.is_none());
    }
}
