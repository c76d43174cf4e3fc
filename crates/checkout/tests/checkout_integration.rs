//! Integration tests for checkout over the in-memory store and bus.

use checkout::{
    CheckoutError, CheckoutOrchestrator, CheckoutRequest, CheckoutState, EventRouting,
};
use domain::{Basket, BasketItem, BasketStore, CheckoutEvent, ErrorKind};
use event_bus::{InMemoryEventBus, InMemoryQueue, Rule};
use kv_store::InMemoryStore;

const BUS: &str = "SwnEventBus";
const SOURCE: &str = "com.swn.basket.checkoutbasket";
const DETAIL_TYPE: &str = "CheckoutBasket";

struct TestHarness {
    orchestrator: CheckoutOrchestrator<InMemoryStore, InMemoryEventBus>,
    baskets: BasketStore<InMemoryStore>,
    bus: InMemoryEventBus,
    queue: InMemoryQueue,
}

impl TestHarness {
    fn new() -> Self {
        let store =
            InMemoryStore::new().with_table("basket", BasketStore::<InMemoryStore>::key_schema());
        let queue = InMemoryQueue::new("OrderQueue", 3);
        let bus =
            InMemoryEventBus::new(BUS).with_route(Rule::new(SOURCE, DETAIL_TYPE), queue.clone());

        let orchestrator = CheckoutOrchestrator::new(
            store.clone(),
            "basket",
            bus.clone(),
            EventRouting::new(BUS, SOURCE, DETAIL_TYPE),
        );

        Self {
            orchestrator,
            baskets: BasketStore::new(store, "basket"),
            bus,
            queue,
        }
    }

    async fn fill_basket(&self, user_name: &str, items: Vec<BasketItem>) {
        self.baskets
            .put(Basket::new(user_name, items))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_checkout_publishes_order_payload_and_clears_basket() {
    let h = TestHarness::new();
    h.fill_basket(
        "alice",
        vec![
            BasketItem::new("p1", 10.0).named("Widget").quantity(1),
            BasketItem::new("p2", 20.0).named("Gadget").quantity(1),
        ],
    )
    .await;

    let request = CheckoutRequest {
        first_name: Some("Alice".into()),
        last_name: Some("Smith".into()),
        email: Some("alice@example.com".into()),
        address: Some("1 Main St".into()),
        payment_method: Some("card".into()),
        ..CheckoutRequest::for_user("alice")
    };
    let outcome = h.orchestrator.checkout(request).await.unwrap();

    assert_eq!(outcome.state, CheckoutState::BasketCleared);
    assert!(!outcome.is_partial());

    let published = h.bus.published().await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].source, SOURCE);
    assert_eq!(published[0].detail_type, DETAIL_TYPE);

    let event: CheckoutEvent = published[0].detail_as().unwrap();
    assert_eq!(event.user_name, "alice");
    assert_eq!(event.total_price, 30.0);
    assert_eq!(event.items.len(), 2);
    assert_eq!(event.first_name.as_deref(), Some("Alice"));
    assert_eq!(event.payment_method.as_deref(), Some("card"));

    assert!(h.baskets.get("alice").await.unwrap().is_none());
    assert_eq!(h.queue.visible_count().await, 1);
}

#[tokio::test]
async fn test_publish_failure_keeps_basket() {
    let h = TestHarness::new();
    h.fill_basket("alice", vec![BasketItem::new("p1", 10.0)]).await;
    h.bus.set_fail_on_publish(true);

    let err = h
        .orchestrator
        .checkout(CheckoutRequest::for_user("alice"))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Publish(_)));
    assert_eq!(err.kind(), ErrorKind::Dependency);

    let basket = h.baskets.get("alice").await.unwrap().unwrap();
    assert_eq!(basket.items.len(), 1);
    assert_eq!(h.queue.visible_count().await, 0);

    // A retry after the bus recovers goes through.
    h.bus.set_fail_on_publish(false);
    let outcome = h
        .orchestrator
        .checkout(CheckoutRequest::for_user("alice"))
        .await
        .unwrap();
    assert_eq!(outcome.state, CheckoutState::BasketCleared);
}

#[tokio::test]
async fn test_missing_or_empty_basket_publishes_nothing() {
    let h = TestHarness::new();

    let missing = h
        .orchestrator
        .checkout(CheckoutRequest::for_user("nobody"))
        .await
        .unwrap_err();
    assert!(matches!(missing, CheckoutError::BasketNotFound(_)));
    assert_eq!(missing.kind(), ErrorKind::Business);

    h.fill_basket("carol", Vec::new()).await;
    let empty = h
        .orchestrator
        .checkout(CheckoutRequest::for_user("carol"))
        .await
        .unwrap_err();
    assert!(matches!(empty, CheckoutError::EmptyBasket(_)));
    assert_eq!(empty.kind(), ErrorKind::Business);

    assert_eq!(h.bus.publish_count().await, 0);
    assert!(h.baskets.get("carol").await.unwrap().is_some());
}

#[tokio::test]
async fn test_checkout_without_user_name_is_rejected() {
    let h = TestHarness::new();
    h.fill_basket("alice", vec![BasketItem::new("p1", 10.0)]).await;

    let err = h
        .orchestrator
        .checkout(CheckoutRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Validation(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(h.bus.publish_count().await, 0);
    assert!(h.baskets.get("alice").await.unwrap().is_some());
}

#[tokio::test]
async fn test_checkout_uses_user_name_as_stored() {
    let h = TestHarness::new();
    h.fill_basket("alice ", vec![BasketItem::new("p1", 10.0)]).await;

    let outcome = h
        .orchestrator
        .checkout(CheckoutRequest::for_user("alice "))
        .await
        .unwrap();

    assert_eq!(outcome.state, CheckoutState::BasketCleared);
    assert_eq!(outcome.event.user_name, "alice ");
    assert_eq!(outcome.event.total_price, 10.0);
    assert!(h.baskets.get("alice ").await.unwrap().is_none());

    let trimmed = h
        .orchestrator
        .checkout(CheckoutRequest::for_user("alice"))
        .await
        .unwrap_err();
    assert!(matches!(trimmed, CheckoutError::BasketNotFound(_)));
}
