use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::observe;
use crate::{
    error::AppResult,
    extract::{JsonBody, PathParam},
    models::{CreateProduct, Product, ProductDetail, ProductFilter},
    AppState,
};

// ── POST /api/customers/:customerId/products ─────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    PathParam(customer_id): PathParam<i32>,
    JsonBody(payload): JsonBody<CreateProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let start = Instant::now();
    let result = state.store.create_product(customer_id, &payload).await;
    observe(&state, "store:create_product", start, &result, |_| 1).await;
    let product = result?;

    info!(id = product.id, customer_id, sku = %product.sku, "Created product");

    Ok((StatusCode::CREATED, Json(product)))
}

// ── GET /api/products/:productId ─────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    PathParam(product_id): PathParam<i32>,
) -> AppResult<Json<ProductDetail>> {
    let start = Instant::now();
    let result = state.store.product_detail(product_id).await;
    observe(&state, "store:product_detail", start, &result, |d| {
        d.custom_attributes.len() + 1
    })
    .await;
    let detail = result?;

    info!(
        id = product_id,
        custom_attributes = detail.custom_attributes.len(),
        "Fetched product"
    );

    Ok(Json(detail))
}

// ── GET /api/productsfilter ──────────────────────────────────────────────────

pub async fn filter_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<Product>>> {
    let start = Instant::now();
    let result = state.store.filter_products(&filter).await;
    observe(&state, "store:filter_products", start, &result, |p| p.len()).await;
    let products = result?;

    info!(
        attribute_name = %filter.attribute_name,
        value = %filter.value,
        count = products.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Filtered products"
    );

    Ok(Json(products))
}
