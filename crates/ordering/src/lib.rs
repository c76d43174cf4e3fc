//! Order ingestion and order queries.
//!
//! This crate provides the ordering side of the checkout pipeline:
//! - [`OrderIngestor`] turns checkout events into stored [`Order`]s, from a
//!   queue batch or a direct bus delivery
//! - [`OrderQuery`] reads orders back by user and order date
//! - [`Inbound`] tells the three inbound shapes apart once, at the boundary,
//!   and [`OrderingService`] routes each to its handler
//!
//! Delivery is at-least-once and orders are not deduplicated: a redelivered
//! checkout event becomes a second order with its own order date.

pub mod clock;
pub mod error;
pub mod inbound;
pub mod ingestor;
pub mod order;
pub mod query;

pub use clock::OrderClock;
pub use error::{OrderingError, Result};
pub use inbound::{HttpRequest, Inbound, InboundResponse, OrderingService};
pub use ingestor::OrderIngestor;
pub use order::Order;
pub use query::OrderQuery;
