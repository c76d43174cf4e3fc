//! Key-value record store used by every storefront component.
//!
//! Records are schemaless [`Item`]s addressed by a partition key and an
//! optional sort key. Each table declares its [`KeySchema`] up front; the
//! key attributes live inside the item itself.

pub mod error;
pub mod key;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::Item;
pub use error::{Result, StoreError};
pub use key::{Key, KeySchema};
pub use memory::{InMemoryStore, StoreOperation};
pub use postgres::PostgresStore;
pub use query::{Filter, KeyCondition, Page, PageRequest};
pub use store::{KeyValueStore, KeyValueStoreExt};
