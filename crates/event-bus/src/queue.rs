use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

/// One message as handed to a queue consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMessage {
    pub message_id: String,
    pub body: String,
    /// How many times the message has been received, including this delivery.
    #[serde(default)]
    pub receive_count: u32,
}

/// A batch of messages delivered to a consumer in one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueBatch {
    #[serde(rename = "Records")]
    pub records: Vec<QueueMessage>,
}

/// Identifies one message of a batch that failed processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

/// Per-record outcome of a batch: only failed messages are listed, and only
/// those are redelivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub batch_item_failures: Vec<BatchItemFailure>,
}

impl BatchResponse {
    /// Records a failed message.
    pub fn fail(&mut self, message_id: impl Into<String>) {
        self.batch_item_failures.push(BatchItemFailure {
            item_identifier: message_id.into(),
        });
    }

    /// Returns true if the message was reported as failed.
    pub fn is_failed(&self, message_id: &str) -> bool {
        self.batch_item_failures
            .iter()
            .any(|f| f.item_identifier == message_id)
    }

    /// Returns true if every message succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.batch_item_failures.is_empty()
    }
}

/// Number of dead letters an [`InMemoryQueue`] keeps before dropping the
/// oldest.
pub const DEFAULT_DEAD_LETTER_LIMIT: usize = 1000;

#[derive(Debug, Default)]
struct QueueState {
    visible: VecDeque<QueueMessage>,
    in_flight: HashMap<String, QueueMessage>,
    dead_letters: VecDeque<QueueMessage>,
}

/// In-memory durable queue with at-least-once delivery.
///
/// Received messages stay in flight until they are acknowledged. Released
/// messages become visible again; a message released after
/// `max_receive_count` deliveries moves to the dead-letter list instead.
/// The dead-letter list is bounded; when full, the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryQueue {
    name: Arc<str>,
    max_receive_count: u32,
    dead_letter_limit: usize,
    state: Arc<Mutex<QueueState>>,
    notify: Arc<Notify>,
}

impl InMemoryQueue {
    /// Creates an empty queue.
    pub fn new(name: impl Into<String>, max_receive_count: u32) -> Self {
        Self {
            name: Arc::from(name.into()),
            max_receive_count: max_receive_count.max(1),
            dead_letter_limit: DEFAULT_DEAD_LETTER_LIMIT,
            state: Arc::default(),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Sets how many dead letters are kept.
    pub fn with_dead_letter_limit(mut self, limit: usize) -> Self {
        self.dead_letter_limit = limit;
        self
    }

    /// Returns the queue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueues a message body and returns the new message id.
    pub async fn send(&self, body: impl Into<String>) -> String {
        let message_id = Uuid::new_v4().to_string();
        self.state.lock().await.visible.push_back(QueueMessage {
            message_id: message_id.clone(),
            body: body.into(),
            receive_count: 0,
        });
        self.notify.notify_one();
        message_id
    }

    /// Receives up to `max` visible messages and marks them in flight.
    pub async fn receive(&self, max: usize) -> QueueBatch {
        let mut state = self.state.lock().await;
        let count = max.min(state.visible.len());
        let drained: Vec<QueueMessage> = state.visible.drain(..count).collect();
        let mut records = Vec::with_capacity(count);
        for mut message in drained {
            message.receive_count += 1;
            state
                .in_flight
                .insert(message.message_id.clone(), message.clone());
            records.push(message);
        }
        QueueBatch { records }
    }

    /// Acknowledges a processed message, removing it for good.
    ///
    /// Returns false if the message was not in flight.
    pub async fn ack(&self, message_id: &str) -> bool {
        self.state.lock().await.in_flight.remove(message_id).is_some()
    }

    /// Returns an in-flight message for redelivery, or dead-letters it once
    /// it has been received `max_receive_count` times.
    ///
    /// Returns false if the message was not in flight.
    pub async fn release(&self, message_id: &str) -> bool {
        let mut state = self.state.lock().await;
        let Some(message) = state.in_flight.remove(message_id) else {
            return false;
        };

        if message.receive_count >= self.max_receive_count {
            tracing::warn!(
                queue = %self.name,
                message_id,
                receive_count = message.receive_count,
                "message moved to dead-letter list"
            );
            if state.dead_letters.len() >= self.dead_letter_limit {
                if let Some(dropped) = state.dead_letters.pop_front() {
                    tracing::error!(
                        queue = %self.name,
                        message_id = %dropped.message_id,
                        "dead-letter list full, oldest message dropped"
                    );
                }
            }
            if self.dead_letter_limit > 0 {
                state.dead_letters.push_back(message);
            }
        } else {
            state.visible.push_back(message);
            self.notify.notify_one();
        }
        true
    }

    /// Waits until a message may be available.
    pub async fn wait_for_messages(&self) {
        if self.visible_count().await > 0 {
            return;
        }
        self.notify.notified().await;
    }

    /// Number of messages waiting to be received.
    pub async fn visible_count(&self) -> usize {
        self.state.lock().await.visible.len()
    }

    /// Number of received but not yet acknowledged messages.
    pub async fn in_flight_count(&self) -> usize {
        self.state.lock().await.in_flight.len()
    }

    /// Messages that exhausted their deliveries, oldest first.
    pub async fn dead_letters(&self) -> Vec<QueueMessage> {
        self.state.lock().await.dead_letters.iter().cloned().collect()
    }
}
