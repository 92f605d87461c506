//! # Credit Customers
//!
//! Rolls credit ledger entries up into one summary per customer.
//!
//! Customers are identified by phone number. The ledger itself is written by
//! the settlement coordinator; status transitions (PAID, CANCELLED) belong to
//! a separate collaborator and are only read here.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CreditStatus, CreditTransaction};

/// Overall standing of a customer across all their credit entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CustomerCreditStatus {
    /// At least one entry is still PENDING.
    Active,
    /// Every entry is PAID.
    Paid,
    /// Every entry is CANCELLED.
    Cancelled,
    /// No PENDING entry, but a mix of PAID and CANCELLED.
    Mixed,
}

/// One customer's credit position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditCustomer {
    pub customer_name: String,
    pub customer_phone: String,
    /// Sum of every credit amount ever sold to this customer.
    pub total_credit_cents: i64,
    /// Sum of balance due on PENDING entries.
    pub outstanding_cents: i64,
    pub transaction_count: usize,
    #[ts(as = "String")]
    pub last_activity: DateTime<Utc>,
    pub status: CustomerCreditStatus,
}

/// Groups credit transactions by customer phone.
///
/// The name shown is the one on the customer's most recent entry. Results
/// are ordered by most recent activity first.
pub fn summarize_credit_customers(transactions: &[CreditTransaction]) -> Vec<CreditCustomer> {
    let mut by_phone: HashMap<&str, Vec<&CreditTransaction>> = HashMap::new();
    for tx in transactions {
        by_phone.entry(tx.customer_phone.as_str()).or_default().push(tx);
    }

    let mut customers: Vec<CreditCustomer> = by_phone
        .into_values()
        .filter_map(|entries| summarize_one(&entries))
        .collect();

    customers.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then_with(|| a.customer_phone.cmp(&b.customer_phone))
    });
    customers
}

fn summarize_one(entries: &[&CreditTransaction]) -> Option<CreditCustomer> {
    let latest = entries.iter().max_by_key(|tx| (tx.created_at, tx.id))?;

    let total_credit: Money = entries
        .iter()
        .map(|tx| Money::from_cents(tx.credit_amount_cents))
        .sum();
    let outstanding: Money = entries
        .iter()
        .filter(|tx| tx.status == CreditStatus::Pending)
        .map(|tx| Money::from_cents(tx.balance_due_cents))
        .sum();

    Some(CreditCustomer {
        customer_name: latest.customer_name.clone(),
        customer_phone: latest.customer_phone.clone(),
        total_credit_cents: total_credit.cents(),
        outstanding_cents: outstanding.cents(),
        transaction_count: entries.len(),
        last_activity: latest.created_at,
        status: rollup_status(entries.iter().map(|tx| tx.status)),
    })
}

fn rollup_status(statuses: impl Iterator<Item = CreditStatus>) -> CustomerCreditStatus {
    let (mut pending, mut paid, mut cancelled) = (false, false, false);
    for status in statuses {
        match status {
            CreditStatus::Pending => pending = true,
            CreditStatus::Paid => paid = true,
            CreditStatus::Cancelled => cancelled = true,
        }
    }

    match (pending, paid, cancelled) {
        (true, _, _) => CustomerCreditStatus::Active,
        (false, true, false) => CustomerCreditStatus::Paid,
        (false, false, true) => CustomerCreditStatus::Cancelled,
        _ => CustomerCreditStatus::Mixed,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
