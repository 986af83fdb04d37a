pub mod attributes;
pub mod customers;
pub mod products;

use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use tracing::info;

use crate::{
    error::AppResult,
    metrics::{AggregatedMetric, MetricEntry},
    models::Product,
    seed, AppState,
};

pub async fn index() -> &'static str {
    "Service unavailable"
}

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "service": "catalog-service" })))
}

// ── POST /api/seed ────────────────────────────────────────────────────────────

pub async fn seed_catalog(State(state): State<AppState>) -> AppResult<(StatusCode, Json<Product>)> {
    let start = Instant::now();
    let result = seed::seed_demo_catalog(state.store.as_ref()).await;
    observe(&state, "store:seed_demo_catalog", start, &result, |_| 1).await;
    let product = result?;

    info!(product_id = product.id, "Seeded demo catalog");
    Ok((StatusCode::OK, Json(product)))
}

// ── GET /api/metrics ──────────────────────────────────────────────────────────

pub async fn metrics_report(State(state): State<AppState>) -> Json<Vec<AggregatedMetric>> {
    Json(state.metrics.read().await.aggregated())
}

/// Record how long a store call took and how many rows it produced.
pub(crate) async fn observe<T>(
    state: &AppState,
    operation: &str,
    start: Instant,
    result: &AppResult<T>,
    rows: impl FnOnce(&T) -> usize,
) {
    let elapsed = start.elapsed();
    let (row_count, success) = match result {
        Ok(value) => (rows(value), true),
        Err(_) => (0, false),
    };
    state
        .metrics
        .write()
        .await
        .record(MetricEntry::new(operation, elapsed, row_count, success));
}
