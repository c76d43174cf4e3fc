use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A schemaless record: attribute name to JSON value.
///
/// Every record that goes through the key-value store travels in this shape,
/// with its key attributes stored alongside the other attributes.
pub type Item = serde_json::Map<String, serde_json::Value>;

/// Unique identifier for a catalog product.
///
/// Product ids are generated server-side and are opaque to clients. Ids read
/// back from a request path are not validated against any format, so lookups
/// of a malformed id simply find nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Generates a new random product ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<ProductId> for String {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

/// Serializes a value into an [`Item`].
///
/// Fails if the value does not serialize to a JSON object.
pub fn to_item<T: Serialize>(value: &T) -> Result<Item, serde_json::Error> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Deserializes an [`Item`] into a typed value.
pub fn from_item<T: DeserializeOwned>(item: Item) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::Value::Object(item))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let id1 = ProductId::generate();
        let id2 = ProductId::generate();
        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn product_id_serializes_as_plain_string() {
        let id = ProductId::from("p-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p-1\"");
    }

    #[test]
    fn to_item_rejects_non_objects() {
        assert!(to_item(&42).is_err());
        assert!(to_item(&vec![1, 2]).is_err());
    }

    #[test]
    fn item_conversion_keeps_attributes() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Sample {
            name: String,
            price: f64,
        }

        let sample = Sample {
            name: "Widget".to_string(),
            price: 9.99,
        };
        let item = to_item(&sample).unwrap();
        assert_eq!(item["name"], "Widget");

        let back: Sample = from_item(item).unwrap();
        assert_eq!(back, sample);
    }
}
