// ABOUTME: Product records exchanged with the deployed catalog service.
// ABOUTME: Only id and name matter for verification; the rest is owned by the service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Payload submitted when creating the verification product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl Default for NewProduct {
    fn default() -> Self {
        Self {
            name: "deployline-verification-product".to_string(),
            description: "Automated deployment verification".to_string(),
            price: 199.99,
        }
    }
}

/// A product as returned by the service.
///
/// The service owns the schema. Only `id` and `name` are checked, so every
/// other field is kept as whatever JSON the service sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// String or numeric ids are both accepted and kept in string form.
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl ProductRecord {
    /// The assigned id, if present and non-empty.
    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_response_with_extra_fields() {
        let body = r#"{
            "id": "4f1c",
            "name": "p1",
            "description": "d",
            "price": 9.99,
            "created_at": "2024-01-01T00:00:00",
            "image_url": null
        }"#;
        let record: ProductRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.identifier(), Some("4f1c"));
        assert_eq!(record.name.as_deref(), Some("p1"));
    }

    #[test]
    fn tolerates_service_specific_field_types() {
        let body = r#"{
            "id": "abc",
            "name": "p1",
            "description": "d",
            "price": "9.99",
            "created_at": 1700000000
        }"#;
        let record: ProductRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.identifier(), Some("abc"));
        assert_eq!(record.price, Some(Value::from("9.99")));
    }

    #[test]
    fn numeric_id_is_an_identifier() {
        let record: ProductRecord = serde_json::from_str(r#"{"id": 42, "name": "p1"}"#).unwrap();
        assert_eq!(record.identifier(), Some("42"));
    }

    #[test]
    fn blank_id_is_not_an_identifier() {
        let record: ProductRecord = serde_json::from_str(r#"{"id": "  ", "name": "p1"}"#).unwrap();
        assert_eq!(record.identifier(), None);

        let record: ProductRecord = serde_json::from_str(r#"{"name": "p1"}"#).unwrap();
        assert_eq!(record.identifier(), None);
    }
}
