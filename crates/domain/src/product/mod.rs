//! Catalog products.

mod catalog;

pub use catalog::ProductCatalog;

use common::{Item, ProductId};
use serde::{Deserialize, Serialize};

/// A catalog product.
///
/// The well-known attributes are typed; anything else a client sends is kept
/// in `attributes` and round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    #[serde(flatten)]
    pub attributes: Item,
}

impl Product {
    /// Name of the key attribute.
    pub const ID_ATTRIBUTE: &'static str = "id";
}
