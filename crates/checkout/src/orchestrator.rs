//! Checkout orchestrator.

use domain::{BasketStore, CheckoutEvent};
use event_bus::{EventPublisher, PublishRequest};
use kv_store::KeyValueStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CheckoutError, Result};
use crate::payload::build_checkout_event;
use crate::state::CheckoutState;

/// Where checkout events are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRouting {
    pub bus_name: String,
    pub source: String,
    pub detail_type: String,
}

impl EventRouting {
    /// Creates the routing for checkout events.
    pub fn new(
        bus_name: impl Into<String>,
        source: impl Into<String>,
        detail_type: impl Into<String>,
    ) -> Self {
        Self {
            bus_name: bus_name.into(),
            source: source.into(),
            detail_type: detail_type.into(),
        }
    }
}

/// A checkout request as sent by a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl CheckoutRequest {
    /// Creates a request for the given user with no customer details.
    pub fn for_user(user_name: impl Into<String>) -> Self {
        Self {
            user_name: Some(user_name.into()),
            ..Self::default()
        }
    }
}

/// Something that went wrong after the checkout event was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum CheckoutWarning {
    /// The event was published but the basket could not be deleted.
    BasketNotCleared { reason: String },
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    /// Id the bus assigned to the published event.
    pub event_id: Uuid,
    pub event: CheckoutEvent,
    /// `BasketCleared`, or `EventPublished` when a warning is present.
    pub state: CheckoutState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<CheckoutWarning>,
}

impl CheckoutOutcome {
    /// Returns true if the checkout succeeded with a warning.
    pub fn is_partial(&self) -> bool {
        self.warning.is_some()
    }
}

/// Drives a checkout from request to published event and cleared basket.
pub struct CheckoutOrchestrator<S, P>
where
    S: KeyValueStore,
    P: EventPublisher,
{
    baskets: BasketStore<S>,
    publisher: P,
    routing: EventRouting,
}

impl<S, P> CheckoutOrchestrator<S, P>
where
    S: KeyValueStore,
    P: EventPublisher,
{
    /// Creates an orchestrator over the basket table of `store`.
    pub fn new(
        store: S,
        basket_table: impl Into<String>,
        publisher: P,
        routing: EventRouting,
    ) -> Self {
        Self {
            baskets: BasketStore::new(store, basket_table),
            publisher,
            routing,
        }
    }

    /// Checks out the basket named by the request.
    ///
    /// Fails without side effects until the event is published. Afterwards
    /// the checkout is successful even if the basket cannot be deleted.
    #[tracing::instrument(skip(self, request), fields(user_name = tracing::field::Empty))]
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutOutcome> {
        metrics::counter!("checkout_requests_total").increment(1);
        let started = std::time::Instant::now();

        let result = self.run(request).await;

        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        match &result {
            Ok(outcome) => {
                if outcome.is_partial() {
                    metrics::counter!("checkout_basket_not_cleared_total").increment(1);
                }
            }
            Err(err) => {
                metrics::counter!("checkout_failures_total", "kind" => err.kind().as_str())
                    .increment(1);
                tracing::warn!(error = %err, kind = %err.kind(), "checkout failed");
            }
        }
        result
    }

    async fn run(&self, request: CheckoutRequest) -> Result<CheckoutOutcome> {
        let mut state = CheckoutState::Received;

        // Baskets are keyed by the name exactly as stored, so it is not trimmed.
        let user_name = match request.user_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                return Err(CheckoutError::Validation(
                    "userName is required".to_string(),
                ));
            }
        };
        tracing::Span::current().record("user_name", user_name.as_str());
        state = advance(state);

        let basket = self
            .baskets
            .get(&user_name)
            .await?
            .ok_or_else(|| CheckoutError::BasketNotFound(user_name.clone()))?;
        if basket.is_empty() {
            return Err(CheckoutError::EmptyBasket(user_name));
        }
        state = advance(state);

        let event = build_checkout_event(request, basket);
        let publish = PublishRequest::new(
            self.routing.bus_name.as_str(),
            self.routing.source.as_str(),
            self.routing.detail_type.as_str(),
            &event,
        )?;
        state = advance(state);

        let receipt = self.publisher.publish(publish).await?;
        state = advance(state);
        metrics::counter!("checkout_published_total").increment(1);
        tracing::info!(
            event_id = %receipt.event_id,
            total_price = event.total_price,
            "checkout event published"
        );

        let warning = match self.baskets.delete(&user_name).await {
            Ok(()) => {
                state = advance(state);
                None
            }
            Err(err) => {
                tracing::warn!(
                    event_id = %receipt.event_id,
                    error = %err,
                    "checkout event published but basket was not cleared"
                );
                Some(CheckoutWarning::BasketNotCleared {
                    reason: err.to_string(),
                })
            }
        };

        Ok(CheckoutOutcome {
            event_id: receipt.event_id,
            event,
            state,
            warning,
        })
    }
}

fn advance(state: CheckoutState) -> CheckoutState {
    let next = state.next().unwrap_or(state);
    tracing::debug!(from = %state, to = %next, "checkout state changed");
    next
}

#[cfg(test)]
mod tests {
    use domain::{Basket, BasketItem};
    use event_bus::InMemoryEventBus;
    use kv_store::{InMemoryStore, StoreOperation};

    use super::*;

    const BUS: &str = "SwnEventBus";

    struct Fixture {
        orchestrator: CheckoutOrchestrator<InMemoryStore, InMemoryEventBus>,
        baskets: BasketStore<InMemoryStore>,
        store: InMemoryStore,
        bus: InMemoryEventBus,
    }

    fn fixture() -> Fixture {
        let store =
            InMemoryStore::new().with_table("basket", BasketStore::<InMemoryStore>::key_schema());
        let bus = InMemoryEventBus::new(BUS);
        let routing = EventRouting::new(BUS, "com.swn.basket.checkoutbasket", "CheckoutBasket");
        Fixture {
            orchestrator: CheckoutOrchestrator::new(store.clone(), "basket", bus.clone(), routing),
            baskets: BasketStore::new(store.clone(), "basket"),
            store,
            bus,
        }
    }

    #[tokio::test]
    async fn checkout_publishes_then_clears_basket() {
        let f = fixture();
        f.baskets
            .put(Basket::new("alice", vec![BasketItem::new("p1", 12.5)]))
            .await
            .unwrap();

        let outcome = f
            .orchestrator
            .checkout(CheckoutRequest::for_user("alice"))
            .await
            .unwrap();

        assert_eq!(outcome.state, CheckoutState::BasketCleared);
        assert!(outcome.warning.is_none());
        assert_eq!(outcome.event.total_price, 12.5);

        let published = f.bus.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, outcome.event_id);
        assert_eq!(published[0].detail_type, "CheckoutBasket");
        assert!(f.baskets.get("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_user_name_is_rejected() {
        let f = fixture();
        let result = f.orchestrator.checkout(CheckoutRequest::for_user("   ")).await;
        assert!(matches!(result, Err(CheckoutError::Validation(_))));
        assert_eq!(f.bus.publish_count().await, 0);
    }

    #[tokio::test]
    async fn failed_delete_is_a_warning() {
        let f = fixture();
        f.baskets
            .put(Basket::new("alice", vec![BasketItem::new("p1", 1.0)]))
            .await
            .unwrap();
        f.store.set_fail_on(StoreOperation::Delete, true);

        let outcome = f
            .orchestrator
            .checkout(CheckoutRequest::for_user("alice"))
            .await
            .unwrap();

        assert_eq!(outcome.state, CheckoutState::EventPublished);
        assert!(matches!(
            outcome.warning,
            Some(CheckoutWarning::BasketNotCleared { .. })
        ));
        assert_eq!(f.bus.publish_count().await, 1);
        assert!(f.baskets.get("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn basket_read_failure_is_a_dependency_error() {
        let f = fixture();
        f.store.set_fail_on(StoreOperation::Get, true);

        let err = f
            .orchestrator
            .checkout(CheckoutRequest::for_user("alice"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), domain::ErrorKind::Dependency);
        assert_eq!(f.bus.publish_count().await, 0);
    }
}
