//! HTTP routes.
//!
//! Everything except `/health` sits behind [`require_principal`] and is
//! scoped to the caller's owner id.

pub mod credit;
pub mod inventory;
pub mod receipts;
pub mod sales;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::warn;

use crate::auth::require_principal;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/record-sale", post(sales::record_sale))
        .route("/sales-history", get(sales::sales_history))
        .route("/sales-metrics", get(sales::sales_metrics))
        .route("/credit-history", get(credit::credit_history))
        .route("/low-stock-alerts", get(inventory::low_stock_alerts))
        .route("/lookup-barcode/{barcode}", get(inventory::lookup_barcode))
        .route("/stock-movements/{product_id}", get(inventory::stock_movements))
        .route("/receipts", get(receipts::list_receipts))
        .route("/receipts/{receipt_number}", get(receipts::get_receipt))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_principal));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
}

/// Database liveness check.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        warn!("Health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::Value;
    use tower::ServiceExt;

    use biashara_core::catalog::StaticCatalog;
    use biashara_db::{Database, DbConfig, NewProduct, SettlementConfig};

    use crate::auth::Claims;
    use crate::{build_app, AppState};

    pub const SECRET: &str = "route-test-secret";
    pub const OWNER: i64 = 1;

    pub async fn test_app() -> (Router, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(
            db.clone(),
            SettlementConfig::default(),
            SECRET,
            Arc::new(StaticCatalog::with_samples()),
        );
        (build_app(state), db)
    }

    pub async fn stock(db: &Database, owner_id: i64, name: &str, quantity: i64, threshold: i64) -> i64 {
        let (product, _) = db
            .products()
            .create_with_stock(owner_id, &NewProduct::new(name, 1_000), quantity, threshold)
            .await
            .unwrap();
        product.id
    }

    pub fn token(user_id: i64) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: format!("user-{}", user_id),
            user_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
    }

    pub async fn get(app: &Router, uri: &str, user_id: Option<i64>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user_id)));
        }
        send(app, builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_raw(app: &Router, uri: &str, user_id: Option<i64>, body: String) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(user_id) = user_id {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user_id)));
        }
        send(app, builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn post(app: &Router, uri: &str, user_id: Option<i64>, body: Value) -> (StatusCode, Value) {
        post_raw(app, uri, user_id, body.to_string()).await
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let (app, _db) = test_app().await;
        let (status, body) = get(&app, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let (app, _db) = test_app().await;
        for uri in ["/sales-history", "/receipts", "/low-stock-alerts", "/credit-history"] {
            let (status, body) = get(&app, uri, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["code"], "UNAUTHORIZED");
        }
    }
}
