use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::*;

// ── Customers ─────────────────────────────────────────────────────────────────

pub async fn insert_customer(pool: &PgPool, payload: &CreateCustomer) -> AppResult<Customer> {
    let customer = sqlx::query_as::<_, Customer>(
        "INSERT INTO customers (name) VALUES ($1) RETURNING id, name",
    )
    .bind(&payload.name)
    .fetch_one(pool)
    .await?;

    Ok(customer)
}

// ── Products ──────────────────────────────────────────────────────────────────

pub async fn insert_product(
    pool: &PgPool,
    customer_id: i32,
    payload: &CreateProduct,
) -> AppResult<Product> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (sku, name, customer_id)
        VALUES ($1, $2, $3)
        RETURNING id, sku, name, customer_id
        "#,
    )
    .bind(&payload.sku)
    .bind(&payload.name)
    .bind(customer_id)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn fetch_product_by_id(pool: &PgPool, id: i32) -> AppResult<Product> {
    sqlx::query_as::<_, Product>("SELECT id, sku, name, customer_id FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
}

pub async fn fetch_product_detail(pool: &PgPool, id: i32) -> AppResult<ProductDetail> {
    let product = fetch_product_by_id(pool, id).await?;

    let custom_attributes = sqlx::query_as::<_, AttributeValue>(
        r#"
        SELECT a.name, pa.value
        FROM product_attributes pa
        JOIN attributes a ON a.id = pa.attribute_id
        WHERE pa.product_id = $1
        ORDER BY pa.id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(ProductDetail {
        product,
        custom_attributes,
    })
}

/// Products carrying `attribute_name = value`, each listed once.
pub async fn filter_products(pool: &PgPool, filter: &ProductFilter) -> AppResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT p.id, p.sku, p.name, p.customer_id
        FROM products p
        WHERE EXISTS (
            SELECT 1
            FROM product_attributes pa
            JOIN attributes a ON a.id = pa.attribute_id
            WHERE pa.product_id = p.id
              AND a.name = $1
              AND pa.value = $2
        )
        ORDER BY p.id
        "#,
    )
    .bind(&filter.attribute_name)
    .bind(&filter.value)
    .fetch_all(pool)
    .await?;

    Ok(products)
}

// ── Attributes ────────────────────────────────────────────────────────────────

pub async fn insert_attribute(
    pool: &PgPool,
    customer_id: i32,
    payload: &CreateAttribute,
) -> AppResult<Attribute> {
    let attribute = sqlx::query_as::<_, Attribute>(
        r#"
        INSERT INTO attributes (customer_id, name, type)
        VALUES ($1, $2, $3)
        RETURNING id, customer_id, name, type
        "#,
    )
    .bind(customer_id)
    .bind(&payload.name)
    .bind(&payload.kind)
    .fetch_one(pool)
    .await?;

    Ok(attribute)
}

/// Resolve the attribute against the product's owner and insert the value in one
/// transaction. Both parent rows are key-share locked until commit so neither can
/// be deleted between the lookup and the insert.
pub async fn assign_product_attribute(
    pool: &PgPool,
    product_id: i32,
    payload: &AssignAttribute,
) -> AppResult<ProductAttribute> {
    let mut tx = pool.begin().await?;

    let customer_id: i32 =
        sqlx::query_scalar("SELECT customer_id FROM products WHERE id = $1 FOR KEY SHARE")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))?;

    // Duplicate names for one customer resolve to the oldest definition.
    let attribute_id: i32 = sqlx::query_scalar(
        r#"
        SELECT id FROM attributes
        WHERE customer_id = $1 AND name = $2
        ORDER BY id
        LIMIT 1
        FOR KEY SHARE
        "#,
    )
    .bind(customer_id)
    .bind(&payload.attribute_name)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Attribute '{}' is not defined for customer {}",
            payload.attribute_name, customer_id
        ))
    })?;

    let assigned = sqlx::query_as::<_, ProductAttribute>(
        r#"
        INSERT INTO product_attributes (product_id, attribute_id, value)
        VALUES ($1, $2, $3)
        RETURNING id, product_id, attribute_id, value
        "#,
    )
    .bind(product_id)
    .bind(attribute_id)
    .bind(&payload.value)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(assigned)
}

// Run with `DATABASE_URL=... cargo test -- --ignored`. Each test works on its
// own tenant and deletes it afterwards.
#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for database tests");
        let pool = PgPool::connect(&url).await.expect("connect to test database");
        sqlx::migrate!("./migrations").run(&pool).await.expect("run migrations");
        pool
    }

    async fn tenant(pool: &PgPool) -> (Customer, Product) {
        let customer = insert_customer(
            pool,
            &CreateCustomer {
                name: format!("tenant-{}", Uuid::new_v4()),
            },
        )
        .await
        .unwrap();
        let product = insert_product(
            pool,
            customer.id,
            &CreateProduct {
                sku: "P001".to_string(),
                name: "Apple".to_string(),
            },
        )
        .await
        .unwrap();
        (customer, product)
    }

    async fn define(pool: &PgPool, customer_id: i32, name: &str) -> Attribute {
        insert_attribute(
            pool,
            customer_id,
            &CreateAttribute {
                name: name.to_string(),
                kind: "string".to_string(),
            },
        )
        .await
        .unwrap()
    }

    fn assign(name: &str, value: &str) -> AssignAttribute {
        AssignAttribute {
            attribute_name: name.to_string(),
            value: value.to_string(),
        }
    }

    async fn drop_customer(pool: &PgPool, id: i32) {
        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn duplicate_attribute_names_resolve_to_lowest_id() {
        let pool = pool().await;
        let (customer, product) = tenant(&pool).await;
        let first = define(&pool, customer.id, "color").await;
        define(&pool, customer.id, "color").await;

        let assigned = assign_product_attribute(&pool, product.id, &assign("color", "red"))
            .await
            .unwrap();
        assert_eq!(assigned.attribute_id, first.id);

        drop_customer(&pool, customer.id).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn assignment_errors_map_to_taxonomy() {
        let pool = pool().await;
        let (customer, product) = tenant(&pool).await;
        let (other, _) = tenant(&pool).await;
        define(&pool, other.id, "material").await;

        let err = assign_product_attribute(&pool, product.id, &assign("material", "leather"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = assign_product_attribute(&pool, i32::MAX, &assign("color", "red"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = insert_product(
            &pool,
            i32::MAX,
            &CreateProduct {
                sku: "X".to_string(),
                name: "Ghost".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        drop_customer(&pool, customer.id).await;
        drop_customer(&pool, other.id).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn filter_lists_each_product_once() {
        let pool = pool().await;
        let (customer, product) = tenant(&pool).await;
        define(&pool, customer.id, "color").await;
        let value = format!("red-{}", Uuid::new_v4());

        assign_product_attribute(&pool, product.id, &assign("color", &value)).await.unwrap();
        assign_product_attribute(&pool, product.id, &assign("color", &value)).await.unwrap();

        let detail = fetch_product_detail(&pool, product.id).await.unwrap();
        assert_eq!(detail.custom_attributes.len(), 2);

        let found = filter_products(
            &pool,
            &ProductFilter {
                attribute_name: "color".to_string(),
                value: value.clone(),
            },
        )
        .await
        .unwrap();
        assert_eq!(found, vec![product]);

        let none = filter_products(
            &pool,
            &ProductFilter {
                attribute_name: "color".to_string(),
                value: value.to_uppercase(),
            },
        )
        .await
        .unwrap();
        assert!(none.is_empty());

        drop_customer(&pool, customer.id).await;
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn deleting_customer_cascades_to_catalog_rows() {
        let pool = pool().await;
        let (customer, product) = tenant(&pool).await;
        let attribute = define(&pool, customer.id, "size").await;
        assign_product_attribute(&pool, product.id, &assign("size", "large")).await.unwrap();

        drop_customer(&pool, customer.id).await;

        let err = fetch_product_by_id(&pool, product.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let (attributes,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attributes WHERE id = $1")
            .bind(attribute.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(attributes, 0);

        let (values,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM product_attributes WHERE product_id = $1")
                .bind(product.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(values, 0);
    }
}
