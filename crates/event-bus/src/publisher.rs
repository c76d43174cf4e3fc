use async_trait::async_trait;

use crate::{PublishReceipt, PublishRequest, Result};

/// Publishes events to a named event bus.
///
/// A successful return means the bus has durably accepted the event and will
/// deliver it at least once to every matching subscriber. No ordering is
/// guaranteed across events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes a single event.
    async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt>;
}
