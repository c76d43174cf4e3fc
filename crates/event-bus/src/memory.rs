use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    BusEvent, EventBusError, EventPublisher, InMemoryQueue, PublishReceipt, PublishRequest, Result,
};

/// Routes events with a given source and detail type to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub source: String,
    pub detail_type: String,
}

impl Rule {
    /// Creates a rule matching one source and one detail type.
    pub fn new(source: impl Into<String>, detail_type: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            detail_type: detail_type.into(),
        }
    }

    /// Returns true if the event matches this rule.
    pub fn matches(&self, event: &BusEvent) -> bool {
        self.source == event.source && self.detail_type == event.detail_type
    }
}

/// Number of recent events an [`InMemoryEventBus`] keeps for inspection.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// In-memory event bus.
///
/// The most recent accepted events are kept in a bounded log for inspection
/// and every accepted event is forwarded to every
/// queue whose rule matches. Publishing can be configured to fail, which
/// simulates an unavailable bus.
#[derive(Debug, Clone)]
pub struct InMemoryEventBus {
    name: Arc<str>,
    routes: Arc<Vec<(Rule, InMemoryQueue)>>,
    recent: Arc<RwLock<VecDeque<BusEvent>>>,
    history_limit: usize,
    published_total: Arc<AtomicUsize>,
    fail_on_publish: Arc<AtomicBool>,
}

impl InMemoryEventBus {
    /// Creates a bus with the given name and no routes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            routes: Arc::default(),
            recent: Arc::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            published_total: Arc::new(AtomicUsize::new(0)),
            fail_on_publish: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Adds a route delivering matching events to `queue`.
    pub fn with_route(mut self, rule: Rule, queue: InMemoryQueue) -> Self {
        Arc::make_mut(&mut self.routes).push((rule, queue));
        self
    }

    /// Sets how many recent events are kept. Zero keeps none.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Returns the bus name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configures the bus to reject every publish call.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.fail_on_publish.store(fail, Ordering::SeqCst);
    }

    /// Returns the most recent accepted events, oldest first.
    pub async fn published(&self) -> Vec<BusEvent> {
        self.recent.read().await.iter().cloned().collect()
    }

    /// Returns the number of events accepted since the bus was created.
    pub async fn publish_count(&self) -> usize {
        self.published_total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    #[tracing::instrument(skip(self, request), fields(source = %request.source, detail_type = %request.detail_type))]
    async fn publish(&self, request: PublishRequest) -> Result<PublishReceipt> {
        if self.fail_on_publish.load(Ordering::SeqCst) {
            return Err(EventBusError::PublishFailed(
                "event bus unavailable".to_string(),
            ));
        }
        if request.bus_name != *self.name {
            return Err(EventBusError::BusNotFound(request.bus_name));
        }

        let event = BusEvent::from_request(&request);
        let body = serde_json::to_string(&event)?;

        for (rule, queue) in self.routes.iter().filter(|(rule, _)| rule.matches(&event)) {
            let message_id = queue.send(body.clone()).await;
            tracing::debug!(
                queue = queue.name(),
                %message_id,
                rule_source = %rule.source,
                "event routed to queue"
            );
        }

        let receipt = PublishReceipt { event_id: event.id };
        self.published_total.fetch_add(1, Ordering::SeqCst);
        if self.history_limit > 0 {
            let mut recent = self.recent.write().await;
            if recent.len() == self.history_limit {
                recent.pop_front();
            }
            recent.push_back(event);
        }
        Ok(receipt)
    }
}
