//! # biashara-db: Database Layer for BiasharaTrack
//!
//! SQLite storage for the shop: products, inventory, receipts, the credit
//! ledger, and the sale transaction that ties them together.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      BiasharaTrack Data Flow                            │
//! │                                                                         │
//! │  POST /record-sale (biashara-api)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    biashara-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  settlement   │    │  repository   │    │  migrations  │  │   │
//! │  │   │               │    │               │    │  (embedded)  │  │   │
//! │  │   │ SaleSettlement│───►│ inventory     │    │              │  │   │
//! │  │   │ one tx / sale │    │ receipt       │    │ 001_initial  │  │   │
//! │  │   │               │    │ credit, alert │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │            │                   │                               │   │
//! │  │            └──────── pool (Database, DbConfig) ────────────────│   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Per-table reads and writes
//! - [`settlement`] - The all-or-nothing sale
//!
//! ## Usage
//!
//! ```rust,ignore
//! use biashara_db::{Database, DbConfig, SettlementConfig};
//!
//! let db = Database::new(DbConfig::new("biashara.db")).await?;
//!
//! let confirmation = db
//!     .settlement(SettlementConfig::default())
//!     .settle(owner_id, &request)
//!     .await?;
//!
//! let receipt = db.receipts().get_by_number(owner_id, &confirmation.receipt_number).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod settlement;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use settlement::{SaleSettlement, SettlementConfig, SettlementError};

// Repository re-exports for convenience
pub use repository::alert::AlertRepository;
pub use repository::credit::CreditRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::movement::MovementRepository;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::receipt::ReceiptRepository;
pub use repository::sales::SalesRepository;
