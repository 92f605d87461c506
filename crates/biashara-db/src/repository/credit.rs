//! # Credit Ledger
//!
//! Receivables opened by credit sales. Entries are created PENDING; status
//! transitions belong to whoever records repayments.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::DbResult;
use biashara_core::credit::{summarize_credit_customers, CreditCustomer};
use biashara_core::{CreditStatus, CreditTransaction, Money};

const CREDIT_COLUMNS: &str = r#"
    id, owner_id, product_id, customer_name, customer_phone, quantity,
    credit_amount_cents, balance_due_cents, status, created_at
"#;

/// Who owes the money.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditCustomerRef<'a> {
    pub name: &'a str,
    pub phone: &'a str,
}

/// Opens a PENDING receivable for one sold line.
#[allow(clippy::too_many_arguments)]
pub async fn open<'e, E>(
    executor: E,
    owner_id: i64,
    customer: CreditCustomerRef<'_>,
    product_id: i64,
    quantity: i64,
    amount: Money,
    balance_due: Money,
    at: DateTime<Utc>,
) -> DbResult<CreditTransaction>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        r#"
        INSERT INTO credit_transactions (
            owner_id, product_id, customer_name, customer_phone, quantity,
            credit_amount_cents, balance_due_cents, status, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {}
        "#,
        CREDIT_COLUMNS
    );

    let row = sqlx::query_as::<_, CreditTransaction>(&sql)
        .bind(owner_id)
        .bind(product_id)
        .bind(customer.name)
        .bind(customer.phone)
        .bind(quantity)
        .bind(amount.cents())
        .bind(balance_due.cents())
        .bind(CreditStatus::Pending)
        .bind(at)
        .fetch_one(executor)
        .await?;

    Ok(row)
}

/// Repository for reading the credit ledger.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    /// The owner's credit entries, oldest first.
    pub async fn list(&self, owner_id: i64) -> DbResult<Vec<CreditTransaction>> {
        let sql = format!(
            "SELECT {} FROM credit_transactions WHERE owner_id = ? ORDER BY created_at, id",
            CREDIT_COLUMNS
        );

        let rows = sqlx::query_as::<_, CreditTransaction>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// The owner's credit entries rolled up per customer.
    pub async fn customers(&self, owner_id: i64) -> DbResult<Vec<CreditCustomer>> {
        let entries = self.list(owner_id).await?;
        Ok(summarize_credit_customers(&entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use biashara_core::credit::CustomerCreditStatus;

    #[tokio::test]
    async fn test_open_creates_pending_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = CreditCustomerRef {
            name: "Otieno",
            phone: "0722000111",
        };

        let entry = open(
            db.pool(),
            1,
            customer.clone(),
            5,
            2,
            Money::from_cents(50_000),
            Money::from_cents(30_000),
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(entry.status, CreditStatus::Pending);
        assert_eq!(entry.credit_amount_cents, 50_000);
        assert_eq!(entry.balance_due_cents, 30_000);

        open(db.pool(), 1, customer, 6, 1, Money::from_cents(1_000), Money::from_cents(1_000), Utc::now())
            .await
            .unwrap();

        let customers = db.credits().customers(1).await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].total_credit_cents, 51_000);
        assert_eq!(customers[0].outstanding_cents, 31_000);
        assert_eq!(customers[0].status, CustomerCreditStatus::Active);

        assert!(db.credits().list(2).await.unwrap().is_empty());
    }
}
