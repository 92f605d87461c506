//! # Error Types
//!
//! Domain-specific error types for biashara-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  biashara-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  biashara-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── SettlementError  - What a failed sale reports                     │
//! │                                                                         │
//! │  HTTP errors (in app)                                                  │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SettlementError → ApiError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Raised while settling a basket. Each variant names the offending product
/// so the caller can tell which line item failed.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product or its inventory row does not exist for this owner.
    ///
    /// ## When This Occurs
    /// - Product ID doesn't exist
    /// - Product belongs to another owner
    /// - Product has no inventory record
    /// - Product is inactive
    #[error("Product {product_id} not found in inventory")]
    ProductNotFound { product_id: i64 },

    /// Insufficient stock to complete sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Basket line (qty: 5)
    ///      │
    ///      ▼
    /// Inventory row: quantity=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, requested: 5, available: 3 }
    ///      │
    ///      ▼
    /// Whole basket rolled back
    /// ```
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when request input doesn't meet requirements.
/// Always raised before any storage access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., non-finite amount, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A required field is missing for one line of the basket.
    #[error("{field} is required for credit sales (product {product_id})")]
    RequiredForCredit { field: String, product_id: i64 },
}

impl ValidationError {
    /// Returns the request field this error points at.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::RequiredForCredit { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
