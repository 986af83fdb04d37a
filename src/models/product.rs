use serde::{Deserialize, Serialize};

use super::AttributeValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub sku: String,
    pub name: String,
    pub customer_id: i32,
}

/// Product fields merged with every attribute value assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub custom_attributes: Vec<AttributeValue>,
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProduct {
    pub sku: String,
    pub name: String,
}

// ── Query parameters ──────────────────────────────────────────────────────────

/// Missing parameters filter on the empty string.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    #[serde(default)]
    pub attribute_name: String,
    #[serde(default)]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn apple() -> Product {
        Product {
            id: 1,
            sku: "P001".to_string(),
            name: "Apple".to_string(),
            customer_id: 7,
        }
    }

    #[test]
    fn product_serializes_with_camel_case_owner() {
        let value = serde_json::to_value(apple()).unwrap();
        assert_eq!(value, json!({ "id": 1, "sku": "P001", "name": "Apple", "customerId": 7 }));
    }

    #[test]
    fn detail_flattens_product_fields() {
        let detail = ProductDetail {
            product: apple(),
            custom_attributes: vec![AttributeValue {
                name: "color".to_string(),
                value: "red".to_string(),
            }],
        };
        let value = serde_json::to_value(detail).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["customerId"], 7);
        assert_eq!(value["customAttributes"], json!([{ "name": "color", "value": "red" }]));
    }

    #[test]
    fn attribute_kind_is_exposed_as_type() {
        let attr = crate::models::Attribute {
            id: 3,
            customer_id: 7,
            name: "color".to_string(),
            kind: "string".to_string(),
        };
        let value = serde_json::to_value(attr).unwrap();
        assert_eq!(value, json!({ "id": 3, "customerId": 7, "name": "color", "type": "string" }));
    }

    #[test]
    fn filter_defaults_missing_params_to_empty() {
        let filter: ProductFilter = serde_json::from_value(json!({ "attributeName": "color" })).unwrap();
        assert_eq!(filter.attribute_name, "color");
        assert_eq!(filter.value, "");
    }

    #[test]
    fn assign_payload_reads_camel_case() {
        let payload: crate::models::AssignAttribute =
            serde_json::from_value(json!({ "attributeName": "color", "value": "red" })).unwrap();
        assert_eq!(payload.attribute_name, "color");
        assert_eq!(payload.value, "red");
    }
}
