//! HTTP API server with observability for the storefront backend.
//!
//! Provides REST endpoints for the product catalog, baskets, checkout and
//! orders, an entry point accepting raw ordering payloads, and a background
//! worker feeding queued checkout events into order ingestion. Structured
//! logging uses tracing, metrics are exported for Prometheus.

pub mod config;
pub mod error;
pub mod routes;
pub mod worker;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{CheckoutOrchestrator, EventRouting};
use domain::{BasketStore, ProductCatalog};
use event_bus::{EventPublisher, InMemoryEventBus, InMemoryQueue, Rule};
use kv_store::{InMemoryStore, KeySchema, KeyValueStore};
use metrics_exporter_prometheus::PrometheusHandle;
use ordering::{Order, OrderingService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::TableNames;

/// Shared application state accessible from all handlers.
pub struct AppState<S: KeyValueStore, P: EventPublisher> {
    pub catalog: ProductCatalog<S>,
    pub baskets: BasketStore<S>,
    pub checkout: CheckoutOrchestrator<S, P>,
    pub ordering: Arc<OrderingService<S>>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, P>(state: Arc<AppState<S, P>>, metrics_handle: PrometheusHandle) -> Router
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/product",
            get(routes::products::list::<S, P>).post(routes::products::create::<S, P>),
        )
        .route(
            "/product/{id}",
            get(routes::products::get::<S, P>)
                .put(routes::products::update::<S, P>)
                .delete(routes::products::delete::<S, P>),
        )
        .route(
            "/basket",
            get(routes::baskets::list::<S, P>).post(routes::baskets::put::<S, P>),
        )
        .route("/basket/checkout", post(routes::baskets::checkout::<S, P>))
        .route(
            "/basket/{user_name}",
            get(routes::baskets::get::<S, P>).delete(routes::baskets::delete::<S, P>),
        )
        .route("/order", get(routes::orders::list::<S, P>))
        .route("/order/{user_name}", get(routes::orders::by_user::<S, P>))
        .route("/ordering/invoke", post(routes::ordering::invoke::<S, P>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Table names paired with their key schemas.
pub fn table_schemas(tables: &TableNames) -> [(String, KeySchema); 3] {
    [
        (
            tables.product.clone(),
            ProductCatalog::<InMemoryStore>::key_schema(),
        ),
        (
            tables.basket.clone(),
            BasketStore::<InMemoryStore>::key_schema(),
        ),
        (tables.order.clone(), Order::key_schema()),
    ]
}

/// Creates an in-memory store with every table registered.
pub fn create_memory_store(tables: &TableNames) -> InMemoryStore {
    table_schemas(tables)
        .into_iter()
        .fold(InMemoryStore::new(), |store, (name, schema)| {
            store.with_table(name, schema)
        })
}

/// Creates an in-memory bus that routes checkout events to a new ordering
/// queue.
///
/// The bus keeps no log of published events; they are only observable
/// through the queue.
pub fn create_event_bus(
    routing: &EventRouting,
    max_receive_count: u32,
    dead_letter_limit: usize,
) -> (InMemoryEventBus, InMemoryQueue) {
    let queue = InMemoryQueue::new("ordering", max_receive_count)
        .with_dead_letter_limit(dead_letter_limit);
    let bus = InMemoryEventBus::new(routing.bus_name.as_str())
        .with_history_limit(0)
        .with_route(
            Rule::new(routing.source.as_str(), routing.detail_type.as_str()),
            queue.clone(),
        );
    (bus, queue)
}

/// Creates the application state over a store and an event publisher.
pub fn create_state<S, P>(
    store: S,
    publisher: P,
    tables: &TableNames,
    routing: EventRouting,
) -> Arc<AppState<S, P>>
where
    S: KeyValueStore + Clone + 'static,
    P: EventPublisher + 'static,
{
    Arc::new(AppState {
        catalog: ProductCatalog::new(store.clone(), tables.product.as_str()),
        baskets: BasketStore::new(store.clone(), tables.basket.as_str()),
        checkout: CheckoutOrchestrator::new(
            store.clone(),
            tables.basket.as_str(),
            publisher,
            routing,
        ),
        ordering: Arc::new(OrderingService::new(store, tables.order.as_str())),
    })
}
