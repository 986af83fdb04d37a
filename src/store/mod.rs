use async_trait::async_trait;
use sqlx::PgPool;

use crate::db;
use crate::error::AppResult;
use crate::models::*;

mod memory;

pub use memory::MemoryCatalogStore;

/// Everything the request handlers need from persistence. Constructed once at
/// startup and handed to the router through `AppState`.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_customer(&self, payload: &CreateCustomer) -> AppResult<Customer>;

    async fn create_product(&self, customer_id: i32, payload: &CreateProduct) -> AppResult<Product>;

    async fn create_attribute(
        &self,
        customer_id: i32,
        payload: &CreateAttribute,
    ) -> AppResult<Attribute>;

    /// Fails with `NotFound` for an unknown product and `InvalidInput` when the
    /// product's customer never defined `attribute_name`.
    async fn assign_product_attribute(
        &self,
        product_id: i32,
        payload: &AssignAttribute,
    ) -> AppResult<ProductAttribute>;

    async fn product_detail(&self, product_id: i32) -> AppResult<ProductDetail>;

    async fn filter_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>>;
}

pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn create_customer(&self, payload: &CreateCustomer) -> AppResult<Customer> {
        db::insert_customer(&self.pool, payload).await
    }

    async fn create_product(&self, customer_id: i32, payload: &CreateProduct) -> AppResult<Product> {
        db::insert_product(&self.pool, customer_id, payload).await
    }

    async fn create_attribute(
        &self,
        customer_id: i32,
        payload: &CreateAttribute,
    ) -> AppResult<Attribute> {
        db::insert_attribute(&self.pool, customer_id, payload).await
    }

    async fn assign_product_attribute(
        &self,
        product_id: i32,
        payload: &AssignAttribute,
    ) -> AppResult<ProductAttribute> {
        db::assign_product_attribute(&self.pool, product_id, payload).await
    }

    async fn product_detail(&self, product_id: i32) -> AppResult<ProductDetail> {
        db::fetch_product_detail(&self.pool, product_id).await
    }

    async fn filter_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        db::filter_products(&self.pool, filter).await
    }
}
