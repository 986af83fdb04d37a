use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use tracing::info;

use super::observe;
use crate::{
    error::AppResult,
    extract::{JsonBody, PathParam},
    models::{AssignAttribute, Attribute, CreateAttribute, ProductAttribute},
    AppState,
};

// ── POST /api/customers/:customerId/attributes ───────────────────────────────

pub async fn create_attribute(
    State(state): State<AppState>,
    PathParam(customer_id): PathParam<i32>,
    JsonBody(payload): JsonBody<CreateAttribute>,
) -> AppResult<(StatusCode, Json<Attribute>)> {
    let start = Instant::now();
    let result = state.store.create_attribute(customer_id, &payload).await;
    observe(&state, "store:create_attribute", start, &result, |_| 1).await;
    let attribute = result?;

    info!(
        id = attribute.id,
        customer_id,
        name = %attribute.name,
        kind = %attribute.kind,
        "Defined attribute"
    );

    Ok((StatusCode::CREATED, Json(attribute)))
}

// ── POST /api/products/:productId/attributes ─────────────────────────────────

pub async fn assign_product_attribute(
    State(state): State<AppState>,
    PathParam(product_id): PathParam<i32>,
    JsonBody(payload): JsonBody<AssignAttribute>,
) -> AppResult<(StatusCode, Json<ProductAttribute>)> {
    let start = Instant::now();
    let result = state.store.assign_product_attribute(product_id, &payload).await;
    observe(&state, "store:assign_product_attribute", start, &result, |_| 1).await;
    let assigned = result?;

    info!(
        id = assigned.id,
        product_id,
        attribute_id = assigned.attribute_id,
        elapsed_ms = start.elapsed().as_millis(),
        "Assigned attribute value"
    );

    Ok((StatusCode::CREATED, Json(assigned)))
}
