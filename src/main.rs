use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

mod config;
mod db;
mod error;
mod extract;
mod handlers;
mod metrics;
mod middleware;
mod models;
mod seed;
mod store;


use crate::config::{Config, StoreBackend};
use crate::metrics::MetricsStore;
use crate::store::{CatalogStore, MemoryCatalogStore, PgCatalogStore};

/// Shared application state — cheap to clone (all heap behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub metrics: Arc<RwLock<MetricsStore>>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            metrics: Arc::new(RwLock::new(MetricsStore::new())),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,catalog_service=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn CatalogStore> = match &config.backend {
        StoreBackend::Postgres { database_url } => {
            info!(max_connections = config.max_connections, "Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await
                .context("failed to connect to the catalog database")?;
            info!("Database connection pool established.");

            if config.run_migrations {
                info!("Running migrations...");
                sqlx::migrate!("./migrations").run(&pool).await?;
                info!("Migrations complete.");
            }

            Arc::new(PgCatalogStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory catalog store; data is lost on shutdown.");
            Arc::new(MemoryCatalogStore::new())
        }
    };

    let state = AppState::new(store);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))

        // ── Tenants ─────────────────────────────────────────────────────────
        .route("/api/customers", post(handlers::customers::create_customer))
        .route(
            "/api/customers/:customer_id/products",
            post(handlers::products::create_product),
        )
        .route(
            "/api/customers/:customer_id/attributes",
            post(handlers::attributes::create_attribute),
        )

        // ── Products ────────────────────────────────────────────────────────
        .route(
            "/api/products/:product_id",
            get(handlers::products::get_product),
        )
        .route(
            "/api/products/:product_id/attributes",
            post(handlers::attributes::assign_product_attribute),
        )
        .route("/api/productsfilter", get(handlers::products::filter_products))

        // ── Operations ──────────────────────────────────────────────────────
        .route("/api/seed", post(handlers::seed_catalog))
        .route("/api/metrics", get(handlers::metrics_report))

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::request_id))
        .with_state(state)
}
