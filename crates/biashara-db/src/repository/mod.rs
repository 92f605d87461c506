//! # Repository Module
//!
//! Database access for BiasharaTrack.
//!
//! ## Two Shapes of Access
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Writes used by settlement: free functions generic over the executor  │
//! │                                                                         │
//! │      inventory::decrement(&mut *tx, owner, product, qty, now)          │
//! │      movement::append(&mut *tx, &movement)                             │
//! │      credit::open(&mut *tx, ...)                                       │
//! │                                                                         │
//! │  They run on a pool or inside a transaction alike, so one sale's       │
//! │  statements all share the caller's transaction.                        │
//! │                                                                         │
//! │  Reads: repository structs holding the pool                            │
//! │                                                                         │
//! │      db.receipts().get_by_number(owner, "RCP-...")                     │
//! │      db.alerts().latest_unresolved(owner)                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`inventory`] - Inventory Ledger
//! - [`movement`] - Stock Movement Recorder
//! - [`receipt`] - Receipt Builder and receipt reads
//! - [`credit`] - Credit Ledger
//! - [`alert`] - Low-Stock Alert Emitter
//! - [`sales`] - Sales transactions and dashboard metrics
//! - [`product`] - Products

pub mod alert;
pub mod credit;
pub mod inventory;
pub mod movement;
pub mod product;
pub mod receipt;
pub mod sales;
