//! Worker execution loop

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::traits::Operation;

use super::gate::Gate;
use super::stats::WorkerStats;

/// Worker fires the operation in a loop: check stop -> call -> count -> repeat
///
/// Workers are short-lived tokio tasks owned by the LoadGenerator for a single
/// stage. They share the operation via Arc and report through an mpsc channel.
pub struct Worker {
    /// Unique worker identifier
    id: usize,

    /// Operation to fire (shared across workers via Arc)
    operation: Arc<dyn Operation>,

    /// Start barrier, one token per worker
    start: Gate,

    /// Stop barrier, one token per worker
    stop: Gate,

    /// Channel for the final stats message
    results_tx: mpsc::Sender<WorkerStats>,
}

impl Worker {
    /// Create a new worker
    pub fn new(
        id: usize,
        operation: Arc<dyn Operation>,
        start: Gate,
        stop: Gate,
        results_tx: mpsc::Sender<WorkerStats>,
    ) -> Self {
        Self {
            id,
            operation,
            start,
            stop,
            results_tx,
        }
    }

    /// Run the worker loop
    ///
    /// Blocks on the start gate, then saturates the operation until a stop
    /// token is taken, and finally sends exactly one stats message.
    pub async fn run(self) {
        let mut stats = WorkerStats::new(self.id);

        self.start.pass().await;
        tracing::trace!(worker_id = self.id, "Worker started");

        while !self.stop.try_pass() {
            let success = self.operation.call().await;
            stats.record(success);

            // An operation that never suspends would otherwise keep this
            // thread away from the timer driver.
            tokio::task::yield_now().await;
        }

        tracing::trace!(
            worker_id = self.id,
            completed = stats.completed,
            errors = stats.errors,
            "Worker finished"
        );

        if self.results_tx.send(stats).await.is_err() {
            tracing::debug!(worker_id = self.id, "Results channel closed");
        }
    }

    /// Get the worker ID
    pub fn id(&self) -> usize {
        self.id
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("start", &self.start)
            .field("stop", &self.stop)
            .finish()
    }
}
