//! # biashara-api
//!
//! HTTP surface of BiasharaTrack.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  POST /record-sale  (Authorization: Bearer <jwt>)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  auth::require_principal ──✗──► 401 UNAUTHORIZED                       │
//! │       │  Principal { owner_id }                                         │
//! │       ▼                                                                 │
//! │  routes::sales::record_sale                                            │
//! │       │  Json<SaleRequest> ──✗──► 400 INVALID_REQUEST                  │
//! │       ▼                                                                 │
//! │  SaleSettlement::settle_detached (own task, timeout)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  200 { message, sale }   or  ApiError { code, message } → status       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;

use biashara_core::catalog::ProductCatalog;
use biashara_db::{Database, SaleSettlement, SettlementConfig};

use crate::auth::JwtVerifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settlement: SaleSettlement,
    pub jwt: Arc<JwtVerifier>,
    pub catalog: Arc<dyn ProductCatalog>,
}

impl AppState {
    pub fn new(
        db: Database,
        settlement: SettlementConfig,
        jwt_secret: &str,
        catalog: Arc<dyn ProductCatalog>,
    ) -> Self {
        AppState {
            settlement: db.settlement(settlement),
            db,
            jwt: Arc::new(JwtVerifier::new(jwt_secret)),
            catalog,
        }
    }
}

/// Builds the application router.
pub fn build_app(state: AppState) -> Router {
    routes::router(state)
}
