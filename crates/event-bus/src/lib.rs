//! Event publishing for the storefront backend.
//!
//! Producers publish events to a named bus through [`EventPublisher`].
//! Delivery downstream is at-least-once: the in-memory bus routes matching
//! events to [`InMemoryQueue`]s, whose consumers acknowledge or release each
//! message individually.

pub mod error;
pub mod event;
pub mod memory;
pub mod publisher;
pub mod queue;

pub use error::{EventBusError, Result};
pub use event::{BusEvent, PublishReceipt, PublishRequest};
pub use memory::{InMemoryEventBus, Rule};
pub use publisher::EventPublisher;
pub use queue::{
    BatchItemFailure, BatchResponse, DEFAULT_DEAD_LETTER_LIMIT, InMemoryQueue, QueueBatch,
    QueueMessage,
};
