//! Domain layer for the storefront backend.
//!
//! This crate provides:
//! - [`Product`] records and the [`ProductCatalog`] service
//! - [`Basket`] records and the [`BasketStore`] service
//! - [`CheckoutEvent`], the payload handed from checkout to order ingestion
//! - [`DomainError`] and the [`ErrorKind`] classification shared by callers

pub mod basket;
pub mod checkout_event;
pub mod error;
pub mod product;

pub use basket::{Basket, BasketItem, BasketStore};
pub use checkout_event::CheckoutEvent;
pub use error::{DomainError, ErrorKind, Result};
pub use product::{Product, ProductCatalog};
