//! The checkout event carried from the basket service to ordering.

use serde::{Deserialize, Serialize};

use crate::basket::BasketItem;

/// Payload of a checkout event.
///
/// Produced by checkout and published as the `detail` of a bus event; the
/// only input ordering needs to build an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutEvent {
    pub user_name: String,
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
    pub total_price: f64,
    #[serde(default)]
    pub items: Vec<BasketItem>,
}
