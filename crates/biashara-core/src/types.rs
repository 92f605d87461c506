//! # Domain Types
//!
//! Core domain types used throughout BiasharaTrack.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ InventoryRecord │   │  StockMovement  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, owner_id   │◄──│  product_id     │   │  change_type    │       │
//! │  │  name, price    │   │  quantity       │   │  quantity_change│       │
//! │  │  active         │   │  threshold      │   │  (append-only)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Receipt      │   │CreditTransaction│   │SalesTransaction │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  receipt_number │   │  customer       │   │  one per line   │       │
//! │  │  total_cents    │   │  balance_due    │   │  (reporting)    │       │
//! │  │  items[]        │   │  status         │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Every entity carries owner_id: rows are never shared across owners.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer settles a sale.
///
/// Stored and serialized in upper case (`CASH`, `MPESA`, `CREDIT`).
/// Parsing from request input is case-insensitive.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// M-Pesa mobile money.
    Mpesa,
    /// Deferred payment; opens a receivable per line item.
    Credit,
}

impl PaymentMethod {
    /// All accepted payment methods, in their canonical spelling.
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Mpesa,
        PaymentMethod::Credit,
    ];

    /// Parses request input, ignoring case and surrounding whitespace.
    ///
    /// ## Example
    /// ```rust
    /// use biashara_core::PaymentMethod;
    ///
    /// assert_eq!(PaymentMethod::parse("credit"), Some(PaymentMethod::Credit));
    /// assert_eq!(PaymentMethod::parse(" MPesa "), Some(PaymentMethod::Mpesa));
    /// assert_eq!(PaymentMethod::parse("card"), None);
    /// ```
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(input))
    }

    /// Canonical upper-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Mpesa => "MPESA",
            PaymentMethod::Credit => "CREDIT",
        }
    }

    /// Whether this method defers payment and opens a credit ledger entry.
    #[inline]
    pub const fn is_credit(&self) -> bool {
        matches!(self, PaymentMethod::Credit)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Stock Movement Change Type
// =============================================================================

/// Why an inventory quantity changed.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    /// Stock left through a sale (negative change).
    Sale,
    /// Stock received from a supplier (positive change).
    Purchase,
    /// Manual correction (either sign).
    Adjustment,
}

// =============================================================================
// Credit Status
// =============================================================================

/// Lifecycle of a receivable. Settlement only ever creates `Pending`.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum CreditStatus {
    Pending,
    Paid,
    Cancelled,
}

impl Default for CreditStatus {
    fn default() -> Self {
        CreditStatus::Pending
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product the owner sells.
///
/// Descriptive fields are managed elsewhere; settlement only reads them.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub owner_id: i64,
    /// Display name, copied onto receipt items at time of sale.
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Catalogue price in cents.
    pub price_cents: i64,
    pub barcode: Option<String>,
    /// Inactive products cannot be sold.
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Inventory Record
// =============================================================================

/// Available quantity of one product for one owner.
///
/// Exactly one record exists per (owner, product). `quantity` is never
/// negative after a committed sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryRecord {
    pub id: i64,
    pub owner_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    #[ts(as = "String")]
    pub last_updated: DateTime<Utc>,
}

impl InventoryRecord {
    /// Low-stock rule: at or below the threshold.
    ///
    /// ## Example
    /// ```text
    /// threshold = 1
    /// quantity 2 → false
    /// quantity 1 → true
    /// quantity 0 → true
    /// ```
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }

    /// Whether `requested` units can be taken from this record.
    #[inline]
    pub fn can_supply(&self, requested: i64) -> bool {
        self.quantity >= requested
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Append-only audit entry for a quantity change.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockMovement {
    pub id: i64,
    pub owner_id: i64,
    pub product_id: i64,
    pub change_type: ChangeType,
    /// Signed: negative for sales.
    pub quantity_change: i64,
    pub note: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Receipt
// =============================================================================

/// A persisted receipt with its line items.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Receipt {
    pub id: i64,
    pub owner_id: i64,
    /// Human-readable, globally unique (e.g. `RCP-20261017093012-1f9c2ab4`).
    pub receipt_number: String,
    pub customer_name: Option<String>,
    pub payment_method: PaymentMethod,
    /// Always equals the sum of `items[].total_price_cents`.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<ReceiptItem>,
}

impl Receipt {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Sum of the item totals.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(ReceiptItem::total).sum()
    }
}

/// A receipt line. Immutable once written.
///
/// Uses the snapshot pattern: the product name is frozen at time of sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptItem {
    pub id: i64,
    pub receipt_id: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub name: String,
    pub quantity: i64,
    /// Derived: line amount / quantity, rounded to the cent.
    pub unit_price_cents: i64,
    /// The submitted line amount.
    pub total_price_cents: i64,
}

impl ReceiptItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

// =============================================================================
// Credit Transaction
// =============================================================================

/// A receivable opened by a credit sale, one per line item.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditTransaction {
    pub id: i64,
    pub owner_id: i64,
    pub product_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub quantity: i64,
    /// Line amount sold on credit.
    pub credit_amount_cents: i64,
    /// Balance the customer still owes, as declared by the request.
    pub balance_due_cents: i64,
    pub status: CreditStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sales Transaction
// =============================================================================

/// Denormalized per-line sale record used for reporting.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesTransaction {
    pub id: i64,
    pub owner_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub total_amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub reference_number: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Low Stock Alert
// =============================================================================

/// Notification raised after a sale leaves a product at or below threshold.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LowStockAlert {
    pub id: i64,
    pub owner_id: i64,
    pub product_id: i64,
    pub message: String,
    pub resolved: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Builds the alert text for a post-sale quantity.
pub fn low_stock_message(quantity: i64) -> String {
    format!("Product stock is low. Current quantity: {}", quantity)
}

// =============================================================================
// Sale Confirmation
// =============================================================================

/// What a committed sale returns to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleConfirmation {
    pub receipt_id: i64,
    pub receipt_number: String,
    pub total_cents: i64,
    pub line_count: usize,
    pub payment_method: PaymentMethod,
    /// Number of low-stock alerts raised after commit.
    pub low_stock_alerts: usize,
}

// =============================================================================
// Unit Tests
// =============================================================================
