//! Order ingestion from checkout events.

use common::to_item;
use domain::CheckoutEvent;
use event_bus::{BatchResponse, BusEvent, QueueBatch, QueueMessage};
use kv_store::KeyValueStore;

use crate::clock::OrderClock;
use crate::error::{OrderingError, Result};
use crate::order::Order;

/// Stores one order per ingested checkout event.
///
/// Queue batches and direct bus deliveries both end up in
/// [`create_order`](Self::create_order).
pub struct OrderIngestor<S: KeyValueStore> {
    store: S,
    table: String,
    clock: OrderClock,
}

impl<S: KeyValueStore> OrderIngestor<S> {
    /// Creates an ingestor writing to the given order table.
    pub fn new(store: S, table: impl Into<String>) -> Self {
        Self::with_clock(store, table, OrderClock::system())
    }

    /// Creates an ingestor with a custom clock.
    pub fn with_clock(store: S, table: impl Into<String>, clock: OrderClock) -> Self {
        Self {
            store,
            table: table.into(),
            clock,
        }
    }

    /// Stores a new order for the checkout event.
    ///
    /// The order date is assigned here, and the write never replaces an
    /// existing order.
    #[tracing::instrument(skip(self, event), fields(user_name = %event.user_name))]
    pub async fn create_order(&self, event: CheckoutEvent) -> Result<Order> {
        if event.user_name.trim().is_empty() {
            return Err(OrderingError::InvalidEvent(
                "userName is required".to_string(),
            ));
        }

        let order = Order::from_checkout(event, self.clock.next_order_date());
        let item = to_item(&order).map_err(OrderingError::CorruptRecord)?;
        self.store.insert(&self.table, item).await?;

        metrics::counter!("orders_ingested_total").increment(1);
        tracing::info!(
            order_date = %order.order_date,
            total_price = order.total_price,
            "order created"
        );
        Ok(order)
    }

    /// Ingests a checkout event delivered straight from the bus.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id))]
    pub async fn handle_bus_event(&self, event: &BusEvent) -> Result<Order> {
        let checkout: CheckoutEvent = event.detail_as()?;
        self.create_order(checkout).await
    }

    /// Ingests every record of a queue batch independently.
    ///
    /// Failed records are listed in the response by message id; the others
    /// count as consumed.
    #[tracing::instrument(skip(self, batch), fields(records = batch.records.len()))]
    pub async fn handle_queue_batch(&self, batch: &QueueBatch) -> BatchResponse {
        let mut response = BatchResponse::default();
        for record in &batch.records {
            if let Err(err) = self.handle_record(record).await {
                metrics::counter!("order_ingestion_failures_total").increment(1);
                tracing::warn!(
                    message_id = %record.message_id,
                    receive_count = record.receive_count,
                    error = %err,
                    "order ingestion failed"
                );
                response.fail(record.message_id.as_str());
            }
        }
        response
    }

    async fn handle_record(&self, record: &QueueMessage) -> Result<Order> {
        let event: BusEvent = serde_json::from_str(&record.body)?;
        self.handle_bus_event(&event).await
    }
}
