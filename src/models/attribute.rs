use serde::{Deserialize, Serialize};

/// A custom field a customer allows on its products. `kind` is declarative only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub id: i32,
    pub customer_id: i32,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

/// One value assigned to a product for an attribute definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttribute {
    pub id: i32,
    pub product_id: i32,
    pub attribute_id: i32,
    pub value: String,
}

/// `{name, value}` projection of a product attribute joined with its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttributeValue {
    pub name: String,
    pub value: String,
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignAttribute {
    pub attribute_name: String,
    pub value: String,
}
