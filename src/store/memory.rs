use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use super::CatalogStore;
use crate::error::{AppError, AppResult};
use crate::models::*;

/// Rows in insertion order; ids come from the row count since nothing is deleted.
#[derive(Debug, Default)]
struct Tables {
    customers: Vec<Customer>,
    products: Vec<Product>,
    attributes: Vec<Attribute>,
    product_attributes: Vec<ProductAttribute>,
}

impl Tables {
    fn customer_exists(&self, id: i32) -> bool {
        self.customers.iter().any(|c| c.id == id)
    }

    fn product(&self, id: i32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn attribute(&self, id: i32) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.id == id)
    }
}

fn next_id(len: usize) -> AppResult<i32> {
    i32::try_from(len)
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| AppError::Internal(format!("id space exhausted after {} rows", len)))
}

/// Process-local `CatalogStore` with the same referential checks the
/// PostgreSQL schema enforces. Used for tests and database-less runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AppError::Internal("catalog lock poisoned during read".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AppError::Internal("catalog lock poisoned during write".to_string()))
    }
}

fn missing_customer(customer_id: i32) -> AppError {
    AppError::Internal(format!(
        "foreign key violation: customer {} does not exist",
        customer_id
    ))
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn create_customer(&self, payload: &CreateCustomer) -> AppResult<Customer> {
        let mut tables = self.write()?;
        let customer = Customer {
            id: next_id(tables.customers.len())?,
            name: payload.name.clone(),
        };
        tables.customers.push(customer.clone());
        Ok(customer)
    }

    async fn create_product(&self, customer_id: i32, payload: &CreateProduct) -> AppResult<Product> {
        let mut tables = self.write()?;
        if !tables.customer_exists(customer_id) {
            return Err(missing_customer(customer_id));
        }
        let product = Product {
            id: next_id(tables.products.len())?,
            sku: payload.sku.clone(),
            name: payload.name.clone(),
            customer_id,
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn create_attribute(
        &self,
        customer_id: i32,
        payload: &CreateAttribute,
    ) -> AppResult<Attribute> {
        let mut tables = self.write()?;
        if !tables.customer_exists(customer_id) {
            return Err(missing_customer(customer_id));
        }
        let attribute = Attribute {
            id: next_id(tables.attributes.len())?,
            customer_id,
            name: payload.name.clone(),
            kind: payload.kind.clone(),
        };
        tables.attributes.push(attribute.clone());
        Ok(attribute)
    }

    async fn assign_product_attribute(
        &self,
        product_id: i32,
        payload: &AssignAttribute,
    ) -> AppResult<ProductAttribute> {
        // One write guard spans lookup and insert.
        let mut tables = self.write()?;

        let customer_id = tables
            .product(product_id)
            .map(|p| p.customer_id)
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;

        let attribute_id = tables
            .attributes
            .iter()
            .filter(|a| a.customer_id == customer_id && a.name == payload.attribute_name)
            .map(|a| a.id)
            .min()
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Attribute '{}' is not defined for customer {}",
                    payload.attribute_name, customer_id
                ))
            })?;

        let assigned = ProductAttribute {
            id: next_id(tables.product_attributes.len())?,
            product_id,
            attribute_id,
            value: payload.value.clone(),
        };
        tables.product_attributes.push(assigned.clone());
        Ok(assigned)
    }

    async fn product_detail(&self, product_id: i32) -> AppResult<ProductDetail> {
        let tables = self.read()?;
        let product = tables
            .product(product_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;

        let custom_attributes = tables
            .product_attributes
            .iter()
            .filter(|pa| pa.product_id == product_id)
            .filter_map(|pa| {
                tables.attribute(pa.attribute_id).map(|a| AttributeValue {
                    name: a.name.clone(),
                    value: pa.value.clone(),
                })
            })
            .collect();

        Ok(ProductDetail {
            product,
            custom_attributes,
        })
    }

    async fn filter_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        let tables = self.read()?;
        let matches = |product: &Product| {
            tables.product_attributes.iter().any(|pa| {
                pa.product_id == product.id
                    && pa.value == filter.value
                    && tables
                        .attribute(pa.attribute_id)
                        .is_some_and(|a| a.name == filter.attribute_name)
            })
        };

        Ok(tables
            .products
            .iter()
            .filter(|p| matches(*p))
            .cloned()
            .collect())
    }
}
