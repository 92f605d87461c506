//! Stock-side reads: alerts, movement audit, barcode lookup.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};

use biashara_core::catalog::ProductSummary;
use biashara_core::reporting::LowStockAlertView;
use biashara_core::StockMovement;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::AppState;

/// `GET /low-stock-alerts`
pub async fn low_stock_alerts(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<LowStockAlertView>>, ApiError> {
    let alerts = state.db.alerts().latest_unresolved(principal.owner_id).await?;
    Ok(Json(alerts))
}

/// `GET /stock-movements/{product_id}`, oldest first.
pub async fn stock_movements(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    product_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<StockMovement>>, ApiError> {
    let Path(product_id) = product_id?;
    let movements = state
        .db
        .movements()
        .list_for_product(principal.owner_id, product_id)
        .await?;
    Ok(Json(movements))
}

/// `GET /lookup-barcode/{barcode}`
pub async fn lookup_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<Json<ProductSummary>, ApiError> {
    state
        .catalog
        .lookup(&barcode)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No product found for barcode {}", barcode)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_low_stock_alert_after_sale() {
        let (app, db) = test_app().await;
        let product_id = stock(&db, OWNER, "Matches", 5, 2).await;

        let (_, body) = get(&app, "/low-stock-alerts", Some(OWNER)).await;
        assert!(body.as_array().unwrap().is_empty());

        let (status, sale) = post(
            &app,
            "/record-sale",
            Some(OWNER),
            json!({
                "products": [{"product_id": product_id, "quantity": 3, "amount": 15.0}],
                "payment_method": "CASH"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sale["sale"]["low_stock_alerts"], 1);

        let (status, body) = get(&app, "/low-stock-alerts", Some(OWNER)).await;
        assert_eq!(status, StatusCode::OK);
        let alerts = body.as_array().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["product_name"], "Matches");
        assert_eq!(alerts[0]["quantity"], 2);
        assert_eq!(alerts[0]["low_stock_threshold"], 2);
    }

    #[tokio::test]
    async fn test_stock_movements_audit() {
        let (app, db) = test_app().await;
        let product_id = stock(&db, OWNER, "Candles", 8, 1).await;

        post(
            &app,
            "/record-sale",
            Some(OWNER),
            json!({
                "products": [{"product_id": product_id, "quantity": 2, "amount": 30.0, "note": "evening rush"}],
                "payment_method": "CASH"
            }),
        )
        .await;

        let (status, body) = get(&app, &format!("/stock-movements/{}", product_id), Some(OWNER)).await;
        assert_eq!(status, StatusCode::OK);
        let movements = body.as_array().unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0]["change_type"], "PURCHASE");
        assert_eq!(movements[0]["quantity_change"], 8);
        assert_eq!(movements[1]["change_type"], "SALE");
        assert_eq!(movements[1]["quantity_change"], -2);
        assert_eq!(movements[1]["note"], "evening rush");

        let (status, body) = get(&app, "/stock-movements/abc", Some(OWNER)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_lookup_barcode() {
        let (app, _db) = test_app().await;

        let (status, body) = get(&app, "/lookup-barcode/123456789012", Some(OWNER)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Test Product 1");
        assert_eq!(body["price_cents"], 1999);

        let (status, body) = get(&app, "/lookup-barcode/000000000000", Some(OWNER)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
