//! The order record.

use domain::{BasketItem, CheckoutEvent};
use kv_store::{Key, KeySchema};
use serde::{Deserialize, Serialize};

/// A stored order, identified by `(userName, orderDate)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub user_name: String,
    pub order_date: String,
    #[serde(default)]
    pub total_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub items: Vec<BasketItem>,
}

impl Order {
    pub const PARTITION_KEY: &'static str = "userName";
    pub const SORT_KEY: &'static str = "orderDate";

    /// Key schema of the order table.
    pub fn key_schema() -> KeySchema {
        KeySchema::composite(Self::PARTITION_KEY, Self::SORT_KEY)
    }

    /// Builds the order for a checkout event. Items are copied as they were
    /// at checkout.
    pub fn from_checkout(event: CheckoutEvent, order_date: impl Into<String>) -> Self {
        Self {
            user_name: event.user_name,
            order_date: order_date.into(),
            total_price: event.total_price,
            first_name: event.first_name,
            last_name: event.last_name,
            email: event.email,
            address: event.address,
            payment_method: event.payment_method,
            items: event.items,
        }
    }

    /// The order's store key.
    pub fn key(&self) -> Key {
        Key::composite(self.user_name.as_str(), self.order_date.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_copies_checkout_event() {
        let event = CheckoutEvent {
            user_name: "bob".into(),
            first_name: Some("Bob".into()),
            last_name: None,
            email: Some("bob@example.com".into()),
            address: None,
            payment_method: None,
            total_price: 50.0,
            items: vec![BasketItem::new("p1", 50.0)],
        };

        let order = Order::from_checkout(event, "2024-03-01T12:30:00.000Z");
        assert_eq!(order.key(), Key::composite("bob", "2024-03-01T12:30:00.000Z"));
        assert_eq!(order.total_price, 50.0);
        assert_eq!(order.items.len(), 1);

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["userName"], "bob");
        assert_eq!(json["orderDate"], "2024-03-01T12:30:00.000Z");
        assert_eq!(json["email"], "bob@example.com");
    }
}
