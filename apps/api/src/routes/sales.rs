//! Sale settlement and sales reporting.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use biashara_core::reporting::{SalesHistoryEntry, SalesMetrics};
use biashara_core::sale::SaleRequest;
use biashara_core::SaleConfirmation;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RecordSaleResponse {
    pub message: &'static str,
    pub sale: SaleConfirmation,
}

/// `POST /record-sale`
///
/// The sale runs on its own task, so a client that disconnects mid-request
/// still gets a clean commit or rollback.
pub async fn record_sale(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<SaleRequest>, JsonRejection>,
) -> Result<Json<RecordSaleResponse>, ApiError> {
    let Json(request) = payload?;

    let sale = state
        .settlement
        .settle_detached(principal.owner_id, request)
        .await?;

    info!(
        owner_id = principal.owner_id,
        receipt_number = %sale.receipt_number,
        "Sales recorded"
    );

    Ok(Json(RecordSaleResponse {
        message: "Sales recorded successfully",
        sale,
    }))
}

/// `GET /sales-history`
pub async fn sales_history(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<SalesHistoryEntry>>, ApiError> {
    let history = state.db.sales().history(principal.owner_id).await?;
    Ok(Json(history))
}

/// `GET /sales-metrics`
pub async fn sales_metrics(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<SalesMetrics>, ApiError> {
    let metrics = state.db.sales().metrics(principal.owner_id, Utc::now()).await?;
    Ok(Json(metrics))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_cash_sale_and_history() {
        let (app, db) = test_app().await;
        let product_id = stock(&db, OWNER, "Sugar 1kg", 10, 1).await;

        let (status, body) = post(
            &app,
            "/record-sale",
            Some(OWNER),
            json!({
                "products": [{"product_id": product_id, "quantity": 2, "amount": 320.0}],
                "payment_method": "cash"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["message"], "Sales recorded successfully");
        assert_eq!(body["sale"]["total_cents"], 32_000);
        assert_eq!(body["sale"]["payment_method"], "CASH");
        assert!(body["sale"]["receipt_number"].as_str().unwrap().starts_with("RCP-"));

        let (status, history) = get(&app, "/sales-history", Some(OWNER)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["product_name"], "Sugar 1kg");

        let (_, metrics) = get(&app, "/sales-metrics", Some(OWNER)).await;
        assert_eq!(metrics["daily_revenue_cents"], 32_000);
        assert_eq!(metrics["payment_breakdown"]["cash_cents"], 32_000);
        assert_eq!(metrics["top_product"]["product_name"], "Sugar 1kg");

        // Another owner sees nothing
        let (_, other) = get(&app, "/sales-history", Some(2)).await;
        assert!(other.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_404() {
        let (app, db) = test_app().await;
        let product_id = stock(&db, OWNER, "Rice", 5, 1).await;

        let (status, body) = post(
            &app,
            "/record-sale",
            Some(OWNER),
            json!({
                "products": [{"product_id": product_id, "quantity": 100, "amount": 1000.0}],
                "payment_method": "CASH"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert!(body["message"].as_str().unwrap().contains(&product_id.to_string()));
        assert_eq!(db.inventory().get(OWNER, product_id).await.unwrap().quantity, 5);
        assert_eq!(db.receipts().count(OWNER).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_404() {
        let (app, _db) = test_app().await;

        let (status, body) = post(
            &app,
            "/record-sale",
            Some(OWNER),
            json!({
                "products": [{"product_id": 777, "quantity": 1, "amount": 10.0}],
                "payment_method": "MPESA"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "Product 777 not found in inventory");
    }

    #[tokio::test]
    async fn test_credit_without_phone_is_400() {
        let (app, db) = test_app().await;
        let product_id = stock(&db, OWNER, "Flour", 5, 1).await;

        let (status, body) = post(
            &app,
            "/record-sale",
            Some(OWNER),
            json!({
                "products": [{"product_id": product_id, "quantity": 1, "amount": 195.0}],
                "payment_method": "CREDIT",
                "customer_name": "Achieng"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
        assert_eq!(body["field"], "customer_phone");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (app, _db) = test_app().await;

        let (status, body) = post_raw(&app, "/record-sale", Some(OWNER), "{\"products\": [".to_string()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");

        let (status, body) = post(
            &app,
            "/record-sale",
            Some(OWNER),
            json!({"products": [{"product_id": "one", "quantity": 1, "amount": 1.0}], "payment_method": "CASH"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_missing_token_is_401_before_body() {
        let (app, _db) = test_app().await;
        let (status, body) = post_raw(&app, "/record-sale", None, "not json".to_string()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
}
