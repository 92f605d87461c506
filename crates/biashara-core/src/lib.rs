//! # biashara-core: Pure Business Logic for BiasharaTrack
//!
//! Domain types and sale-settlement rules with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      BiasharaTrack Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  biashara-api (axum HTTP)                       │   │
//! │  │    POST /record-sale, GET /sales-history, /credit-history      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          biashara-db (SQLite, repositories, settlement)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ biashara-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   sale    │  │ validation│  │   │
//! │  │   │ Inventory │  │   Money   │  │  Request  │  │   Sale    │  │   │
//! │  │   │  Receipt  │  │  (cents)  │  │  Receipt# │  │ Validator │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Product, InventoryRecord, Receipt, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`sale`] - Sale request wire and validated forms, receipt numbers
//! - [`validation`] - The Sale Validator
//! - [`credit`] - Credit customer roll-up
//! - [`reporting`] - Dashboard read models and period boundaries
//! - [`catalog`] - Barcode lookup collaborator
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use biashara_core::sale::{SaleLineRequest, SaleRequest};
//! use biashara_core::validation::validate_sale_request;
//!
//! let request = SaleRequest {
//!     products: vec![SaleLineRequest { product_id: 1, quantity: 3, note: None, amount: 10.0 }],
//!     payment_method: "MPESA".to_string(),
//!     ..Default::default()
//! };
//!
//! let sale = validate_sale_request(&request).unwrap();
//! // 10.00 / 3 → 3.33 per unit, line total stays 10.00
//! assert_eq!(sale.lines[0].unit_price().cents(), 333);
//! assert_eq!(sale.total().unwrap().cents(), 1000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod credit;
pub mod error;
pub mod money;
pub mod reporting;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
