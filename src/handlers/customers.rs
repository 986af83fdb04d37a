use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use super::observe;
use crate::{
    error::AppResult,
    extract::JsonBody,
    models::{CreateCustomer, Customer},
    AppState,
};

// ── POST /api/customers ───────────────────────────────────────────────────────

pub async fn create_customer(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCustomer>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let start = Instant::now();
    let result = state.store.create_customer(&payload).await;
    observe(&state, "store:create_customer", start, &result, |_| 1).await;
    let customer = result?;

    info!(
        id = customer.id,
        name = %customer.name,
        elapsed_ms = start.elapsed().as_millis(),
        "Created customer"
    );

    Ok((StatusCode::CREATED, Json(customer)))
}
