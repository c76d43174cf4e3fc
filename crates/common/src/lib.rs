//! Shared types for the storefront backend.

pub mod types;

pub use types::{Item, ProductId, from_item, to_item};
