//! Background worker feeding the ordering queue into order ingestion.

use std::sync::Arc;

use event_bus::InMemoryQueue;
use kv_store::KeyValueStore;
use ordering::OrderingService;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Largest batch handed to the ingestor in one call.
pub const MAX_BATCH_SIZE: usize = 10;

/// Drains a queue into an [`OrderingService`].
pub struct QueueWorker<S: KeyValueStore> {
    queue: InMemoryQueue,
    ordering: Arc<OrderingService<S>>,
}

impl<S: KeyValueStore + 'static> QueueWorker<S> {
    pub fn new(queue: InMemoryQueue, ordering: Arc<OrderingService<S>>) -> Self {
        Self { queue, ordering }
    }

    /// Receives and ingests one batch of up to [`MAX_BATCH_SIZE`] messages.
    ///
    /// Successful messages are acknowledged; failed ones are released for
    /// redelivery. Returns the number of messages received.
    pub async fn poll_once(&self) -> usize {
        let batch = self.queue.receive(MAX_BATCH_SIZE).await;
        if batch.records.is_empty() {
            return 0;
        }

        let response = self.ordering.ingestor().handle_queue_batch(&batch).await;
        for record in &batch.records {
            if response.is_failed(&record.message_id) {
                self.queue.release(&record.message_id).await;
            } else {
                self.queue.ack(&record.message_id).await;
            }
        }

        metrics::counter!("queue_messages_received_total").increment(batch.records.len() as u64);
        tracing::debug!(
            queue = self.queue.name(),
            received = batch.records.len(),
            failed = response.batch_item_failures.len(),
            "queue batch processed"
        );
        batch.records.len()
    }

    /// Processes batches until `cancel` turns true or its sender is dropped.
    ///
    /// A batch in progress is finished before the worker stops.
    pub async fn run(self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(queue = self.queue.name(), "queue worker started");
        loop {
            tokio::select! {
                () = self.queue.wait_for_messages() => {
                    self.poll_once().await;
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!(queue = self.queue.name(), "queue worker stopped");
    }

    /// Runs the worker on a new task.
    pub fn spawn(self) -> QueueWorkerHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(cancel_rx));
        QueueWorkerHandle {
            cancel: cancel_tx,
            task,
        }
    }
}

/// Handle to a running queue worker.
pub struct QueueWorkerHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl QueueWorkerHandle {
    /// Signals the worker to stop and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.cancel.send(true);
        if let Err(err) = self.task.await {
            tracing::error!(error = %err, "queue worker task failed");
        }
    }
}
