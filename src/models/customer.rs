use serde::{Deserialize, Serialize};

/// Root tenant. Owns products and attribute definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomer {
    pub name: String,
}
