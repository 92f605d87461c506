//! # Sale Requests
//!
//! The sale request as it arrives over the wire, and the validated form the
//! settlement coordinator consumes.
//!
//! ## Request Lifecycle
//! ```text
//! JSON body
//!    │  serde
//!    ▼
//! SaleRequest (amounts are f64, payment method is a free string)
//!    │  validation::validate_sale_request
//!    ▼
//! ValidatedSale (amounts are Money, payment method is an enum)
//!    │
//!    ▼
//! SaleSettlement::settle (biashara-db)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;
use crate::types::PaymentMethod;

// =============================================================================
// Wire Types
// =============================================================================

/// One requested line of a basket, exactly as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineRequest {
    pub product_id: i64,
    pub quantity: i64,
    /// Free-text note copied onto the stock movement.
    #[serde(default)]
    pub note: Option<String>,
    /// Line amount in shillings (decimal).
    pub amount: f64,
}

/// A sale settlement request, exactly as submitted.
///
/// The acting owner is never part of the body. It comes from the
/// authenticated principal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    #[serde(default)]
    pub products: Vec<SaleLineRequest>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub amount_paid: Option<f64>,
    #[serde(default)]
    pub remaining_balance: Option<f64>,
}

// =============================================================================
// Validated Types
// =============================================================================

/// A basket line after validation. `quantity` is known to be positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    pub product_id: i64,
    pub quantity: i64,
    pub note: Option<String>,
    pub amount: Money,
}

impl SaleLine {
    /// Derived unit price: line amount / quantity, rounded to the cent.
    ///
    /// The line total on the receipt stays `amount`; this value is only
    /// informational.
    pub fn unit_price(&self) -> Money {
        self.amount.split_evenly(self.quantity).unwrap_or_default()
    }
}

/// A sale that passed validation and is ready for settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSale {
    pub lines: Vec<SaleLine>,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub reference_number: Option<String>,
    pub amount_paid: Option<Money>,
    pub remaining_balance: Option<Money>,
}

impl ValidatedSale {
    /// Sum of the line amounts; what the receipt total will be.
    ///
    /// `None` if the sum does not fit in cents.
    pub fn total(&self) -> Option<Money> {
        self.lines
            .iter()
            .try_fold(Money::zero(), |total, line| total.checked_add(line.amount))
    }

    /// Balance due recorded on each credit ledger entry.
    ///
    /// Taken from the request as declared; zero when absent.
    pub fn balance_due(&self) -> Money {
        self.remaining_balance.unwrap_or_default()
    }
}

// =============================================================================
// Receipt Numbers
// =============================================================================

/// Prefix of every receipt number.
pub const RECEIPT_PREFIX: &str = "RCP";

/// Generates a human-readable receipt number.
///
/// Format: `RCP-<yyyymmddHHMMSS>-<8 hex>`. The random suffix comes from a
/// v4 UUID; the database UNIQUE constraint catches the rare collision and
/// the receipt builder retries with a new number.
///
/// ## Example
/// ```rust
/// use biashara_core::sale::generate_receipt_number;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 12).unwrap();
/// let number = generate_receipt_number(at);
/// assert!(number.starts_with("RCP-20261017093012-"));
/// assert_eq!(number.len(), "RCP-20261017093012-".len() + 8);
/// ```
pub fn generate_receipt_number(at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        RECEIPT_PREFIX,
        at.format("%Y%m%d%H%M%S"),
        &suffix[..8]
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
