use axum::extract::State;
use axum::{Extension, Json};

use biashara_core::credit::CreditCustomer;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::AppState;

/// `GET /credit-history`: receivables rolled up per customer.
pub async fn credit_history(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<CreditCustomer>>, ApiError> {
    let customers = state.db.credits().customers(principal.owner_id).await?;
    Ok(Json(customers))
}
