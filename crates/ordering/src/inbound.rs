//! Inbound payload dispatch for the ordering service.
//!
//! One entry point receives three payload shapes: HTTP order queries, queue
//! batches of checkout events, and single checkout events straight from the
//! bus. The shape is detected once in [`Inbound::detect`]; each variant then
//! goes to its own typed handler.

use std::collections::HashMap;

use event_bus::{BatchResponse, BusEvent, QueueBatch};
use kv_store::KeyValueStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OrderingError, Result};
use crate::ingestor::OrderIngestor;
use crate::order::Order;
use crate::query::OrderQuery;

/// An HTTP request forwarded to the ordering service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    pub http_method: String,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl HttpRequest {
    fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters.as_ref()?.get(name).map(String::as_str)
    }

    fn query_parameter(&self, name: &str) -> Option<&str> {
        self.query_string_parameters
            .as_ref()?
            .get(name)
            .map(String::as_str)
    }
}

/// The payload shapes the ordering service accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    HttpRequest(HttpRequest),
    QueueBatch(QueueBatch),
    DirectBusEvent(BusEvent),
}

impl Inbound {
    /// Detects the shape of a raw payload.
    ///
    /// Queue batches carry `Records`, bus events carry `detail-type` and HTTP
    /// requests carry `httpMethod`.
    pub fn detect(payload: Value) -> Result<Self> {
        let Some(fields) = payload.as_object() else {
            return Err(OrderingError::UnrecognizedInbound);
        };

        if fields.contains_key("Records") {
            Ok(Inbound::QueueBatch(serde_json::from_value(payload)?))
        } else if fields.contains_key("detail-type") {
            Ok(Inbound::DirectBusEvent(serde_json::from_value(payload)?))
        } else if fields.contains_key("httpMethod") {
            Ok(Inbound::HttpRequest(serde_json::from_value(payload)?))
        } else {
            Err(OrderingError::UnrecognizedInbound)
        }
    }

    /// Returns the shape name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Inbound::HttpRequest(_) => "HttpRequest",
            Inbound::QueueBatch(_) => "QueueBatch",
            Inbound::DirectBusEvent(_) => "DirectBusEvent",
        }
    }
}

/// What a dispatched payload produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InboundResponse {
    /// Orders matching an HTTP query.
    Orders(Vec<Order>),
    /// Per-record outcome of a queue batch.
    Batch(BatchResponse),
    /// The order created from a direct bus event.
    Created(Order),
}

/// Ingestion and queries behind a single entry point.
pub struct OrderingService<S: KeyValueStore> {
    ingestor: OrderIngestor<S>,
    query: OrderQuery<S>,
}

impl<S: KeyValueStore + Clone> OrderingService<S> {
    /// Creates the service over the given order table.
    pub fn new(store: S, table: impl Into<String>) -> Self {
        let table = table.into();
        Self::from_parts(
            OrderIngestor::new(store.clone(), table.as_str()),
            OrderQuery::new(store, table),
        )
    }
}

impl<S: KeyValueStore> OrderingService<S> {
    /// Creates the service from an existing ingestor and query.
    pub fn from_parts(ingestor: OrderIngestor<S>, query: OrderQuery<S>) -> Self {
        Self { ingestor, query }
    }

    pub fn ingestor(&self) -> &OrderIngestor<S> {
        &self.ingestor
    }

    pub fn query(&self) -> &OrderQuery<S> {
        &self.query
    }

    /// Routes an inbound payload to its handler.
    #[tracing::instrument(skip(self, inbound), fields(shape = inbound.as_str()))]
    pub async fn dispatch(&self, inbound: Inbound) -> Result<InboundResponse> {
        match inbound {
            Inbound::HttpRequest(request) => {
                Ok(InboundResponse::Orders(self.handle_http(&request).await?))
            }
            Inbound::QueueBatch(batch) => Ok(InboundResponse::Batch(
                self.ingestor.handle_queue_batch(&batch).await,
            )),
            Inbound::DirectBusEvent(event) => Ok(InboundResponse::Created(
                self.ingestor.handle_bus_event(&event).await?,
            )),
        }
    }

    /// Answers an order query: all orders, a user's orders, or a user's
    /// orders at one exact `orderDate`.
    pub async fn handle_http(&self, request: &HttpRequest) -> Result<Vec<Order>> {
        if !request.http_method.eq_ignore_ascii_case("GET") {
            return Err(OrderingError::UnsupportedMethod(
                request.http_method.clone(),
            ));
        }

        match (
            request.path_parameter(Order::PARTITION_KEY),
            request.query_parameter(Order::SORT_KEY),
        ) {
            (Some(user_name), Some(order_date)) => {
                self.query.get_by_user_and_date(user_name, order_date).await
            }
            (Some(user_name), None) => self.query.get_by_user(user_name).await,
            (None, _) => self.query.get_all().await,
        }
    }
}
