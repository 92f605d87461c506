//! Receipt reads.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use biashara_core::{Receipt, ValidationError};

use crate::auth::Principal;
use crate::error::ApiError;
use crate::AppState;

/// Optional inclusive range, RFC 3339.
#[derive(Debug, Default, Deserialize)]
pub struct ReceiptRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ReceiptRange {
    fn parse(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), ValidationError> {
        let start = parse_date("start_date", self.start_date.as_deref())?;
        let end = parse_date("end_date", self.end_date.as_deref())?;

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ValidationError::InvalidFormat {
                    field: "start_date".to_string(),
                    reason: "must not be after end_date".to_string(),
                });
            }
        }

        Ok((start, end))
    }
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ValidationError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// `GET /receipts?start_date=..&end_date=..`, newest first.
pub async fn list_receipts(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    range: Result<Query<ReceiptRange>, QueryRejection>,
) -> Result<Json<Vec<Receipt>>, ApiError> {
    let Query(range) = range?;
    let (start, end) = range.parse()?;

    let receipts = state.db.receipts().list(principal.owner_id, start, end).await?;
    Ok(Json(receipts))
}

/// `GET /receipts/{receipt_number}`
pub async fn get_receipt(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(receipt_number): Path<String>,
) -> Result<Json<Receipt>, ApiError> {
    state
        .db
        .receipts()
        .get_by_number(principal.owner_id, &receipt_number)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Receipt not found"))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_range_parsing() {
        let range = ReceiptRange {
            start_date: Some("2024-03-01T00:00:00Z".to_string()),
            end_date: Some("2024-03-31T23:59:59+03:00".to_string()),
        };
        let (start, end) = range.parse().unwrap();
        assert!(start.unwrap() < end.unwrap());

        let inverted = ReceiptRange {
            start_date: Some("2024-04-01T00:00:00Z".to_string()),
            end_date: Some("2024-03-01T00:00:00Z".to_string()),
        };
        assert!(inverted.parse().is_err());

        let garbage = ReceiptRange {
            start_date: Some("yesterday".to_string()),
            end_date: None,
        };
        assert_eq!(garbage.parse().unwrap_err().field(), "start_date");

        assert_eq!(ReceiptRange::default().parse().unwrap(), (None, None));
    }

    #[tokio::test]
    async fn test_receipt_round_trip_through_api() {
        let (app, db) = test_app().await;
        let bread = stock(&db, OWNER, "Bread", 10, 1).await;
        let milk = stock(&db, OWNER, "Milk", 10, 1).await;

        let (status, sale) = post(
            &app,
            "/record-sale",
            Some(OWNER),
            json!({
                "products": [
                    {"product_id": bread, "quantity": 3, "amount": 100.0},
                    {"product_id": milk, "quantity": 1, "amount": 65.0}
                ],
                "payment_method": "MPESA",
                "customer_name": "Otieno"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let number = sale["sale"]["receipt_number"].as_str().unwrap().to_string();

        let (status, receipt) = get(&app, &format!("/receipts/{}", number), Some(OWNER)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(receipt["total_cents"], 16_500);
        assert_eq!(receipt["customer_name"], "Otieno");

        let items = receipt["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "Bread");
        // 100.00 / 3 rounds to 33.33; the line total stays exact
        assert_eq!(items[0]["unit_price_cents"], 3_333);
        assert_eq!(items[0]["total_price_cents"], 10_000);

        let (status, list) = get(&app, "/receipts", Some(OWNER)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        // Other owners cannot read it
        let (status, body) = get(&app, &format!("/receipts/{}", number), Some(2)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_bad_range_is_400() {
        let (app, _db) = test_app().await;
        let (status, body) = get(&app, "/receipts?start_date=not-a-date", Some(OWNER)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "start_date");
    }
}
