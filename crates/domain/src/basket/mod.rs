//! Shopping baskets.

mod store;

pub use store::BasketStore;

use common::Item;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A user's basket. There is at most one basket per user name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    pub user_name: String,
    /// Missing and `null` item lists both read as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<BasketItem>,
    #[serde(flatten)]
    pub attributes: Item,
}

impl Basket {
    /// Name of the key attribute.
    pub const KEY_ATTRIBUTE: &'static str = "userName";

    /// Creates a basket with the given items.
    pub fn new(user_name: impl Into<String>, items: Vec<BasketItem>) -> Self {
        Self {
            user_name: user_name.into(),
            items,
            attributes: Item::new(),
        }
    }

    /// Returns true if the basket has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One line of a basket: a value snapshot of a product at the time it was
/// added, not a live reference to the catalog.
///
/// Items are open records kept exactly as the client sent them, so orders
/// copy them verbatim. The accessors read the well-known attributes
/// (`productId`, `productName`, `quantity`, `price`, `color`) when they hold
/// a value of the expected type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketItem(Item);

impl BasketItem {
    /// Creates an item for a product at a given price.
    pub fn new(product_id: impl Into<String>, price: f64) -> Self {
        Self::default()
            .with("productId", product_id.into())
            .with("price", price)
    }

    /// Sets the product name.
    pub fn named(self, name: impl Into<String>) -> Self {
        self.with("productName", name.into())
    }

    /// Sets the quantity.
    pub fn quantity(self, quantity: u32) -> Self {
        self.with("quantity", quantity)
    }

    /// Sets an arbitrary attribute.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn product_id(&self) -> Option<&str> {
        self.0.get("productId").and_then(Value::as_str)
    }

    pub fn product_name(&self) -> Option<&str> {
        self.0.get("productName").and_then(Value::as_str)
    }

    /// The price, if it is a JSON number.
    pub fn price(&self) -> Option<f64> {
        self.0.get("price").and_then(Value::as_f64)
    }

    /// The quantity, if it is a non-negative integer.
    pub fn quantity_value(&self) -> Option<u64> {
        self.0.get("quantity").and_then(Value::as_u64)
    }

    /// All attributes as stored.
    pub fn attributes(&self) -> &Item {
        &self.0
    }
}

impl From<Item> for BasketItem {
    fn from(attributes: Item) -> Self {
        Self(attributes)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
