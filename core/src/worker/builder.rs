//! Builder pattern for Worker construction

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{BenchError, BenchResult};
use crate::traits::Operation;

use super::executor::Worker;
use super::gate::Gate;
use super::stats::WorkerStats;

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .operation(operation)
///     .start_gate(start.clone())
///     .stop_gate(stop.clone())
///     .results_tx(tx.clone())
///     .build()?;
/// ```
#[derive(Default)]
pub struct WorkerBuilder {
    id: usize,
    operation: Option<Arc<dyn Operation>>,
    start: Option<Gate>,
    stop: Option<Gate>,
    results_tx: Option<mpsc::Sender<WorkerStats>>,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Set the operation to fire
    pub fn operation(mut self, operation: Arc<dyn Operation>) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Set the start gate
    pub fn start_gate(mut self, gate: Gate) -> Self {
        self.start = Some(gate);
        self
    }

    /// Set the stop gate
    pub fn stop_gate(mut self, gate: Gate) -> Self {
        self.stop = Some(gate);
        self
    }

    /// Set the results channel sender
    pub fn results_tx(mut self, tx: mpsc::Sender<WorkerStats>) -> Self {
        self.results_tx = Some(tx);
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if any required field is missing.
    pub fn build(self) -> BenchResult<Worker> {
        let operation = self
            .operation
            .ok_or_else(|| BenchError::missing_config("operation"))?;
        let start = self
            .start
            .ok_or_else(|| BenchError::missing_config("start_gate"))?;
        let stop = self
            .stop
            .ok_or_else(|| BenchError::missing_config("stop_gate"))?;
        let results_tx = self
            .results_tx
            .ok_or_else(|| BenchError::missing_config("results_tx"))?;

        Ok(Worker::new(self.id, operation, start, stop, results_tx))
    }
}
