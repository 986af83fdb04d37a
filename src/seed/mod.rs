use tracing::info;

use crate::error::AppResult;
use crate::models::*;
use crate::store::CatalogStore;

/// (customer, [(attribute, type)]) pairs for the demo tenants.
static DEMO_TENANTS: &[(&str, &[(&str, &str)])] = &[
    ("Fresh Produce Company", &[("color", "string"), ("size", "string")]),
    ("Shoe Manufacturer", &[("size", "string"), ("material", "string")]),
];

/// Create the demo tenants with their attribute schemas and one product for the
/// first tenant. Not idempotent: each call adds another copy.
pub async fn seed_demo_catalog(store: &dyn CatalogStore) -> AppResult<Product> {
    let mut customers = Vec::with_capacity(DEMO_TENANTS.len());

    for (name, attributes) in DEMO_TENANTS {
        let customer = store
            .create_customer(&CreateCustomer {
                name: name.to_string(),
            })
            .await?;

        for (attr_name, kind) in attributes.iter() {
            store
                .create_attribute(
                    customer.id,
                    &CreateAttribute {
                        name: attr_name.to_string(),
                        kind: kind.to_string(),
                    },
                )
                .await?;
        }

        info!(id = customer.id, name = %customer.name, attributes = attributes.len(), "Seeded customer");
        customers.push(customer);
    }

    let product = store
        .create_product(
            customers[0].id,
            &CreateProduct {
                sku: "P001".to_string(),
                name: "Apple".to_string(),
            },
        )
        .await?;

    info!(id = product.id, sku = %product.sku, "Seeded product");
    Ok(product)
}
