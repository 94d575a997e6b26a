//! LoadGenerator execution logic

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::error::{BenchError, BenchResult};
use crate::traits::Operation;
use crate::worker::{Gate, WorkerBuilder};

use super::aggregator::{aggregate_worker_stats, LoadReport};
use super::builder::LoadGeneratorBuilder;

/// Runs a synchronized pool of workers for a fixed duration
///
/// The worker set is created and torn down inside every call to
/// [`LoadGenerator::run`]; nothing is reused across calls.
pub struct LoadGenerator {
    /// Number of parallel workers (at least 1)
    pub(crate) workers: usize,

    /// Measurement window (non-zero)
    pub(crate) duration: Duration,

    /// Operation fired by every worker
    pub(crate) operation: Arc<dyn Operation>,
}

impl LoadGenerator {
    /// Create a new generator
    ///
    /// Use `LoadGeneratorBuilder` to get parameter validation.
    pub fn new(workers: usize, duration: Duration, operation: Arc<dyn Operation>) -> Self {
        Self {
            workers,
            duration,
            operation,
        }
    }

    /// Number of workers spawned per run
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Length of the measurement window
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Run one measurement window
    ///
    /// Returns once every worker has sent its final count. `exec_time` spans
    /// from the release of the start gate to the duration timer firing; the
    /// time workers take to notice their stop token is not counted.
    pub async fn run(&self) -> BenchResult<LoadReport> {
        let n = self.workers;
        let start = Gate::new();
        let stop = Gate::new();
        let (results_tx, mut results_rx) = mpsc::channel(n);

        let mut handles = Vec::with_capacity(n);
        for worker_id in 0..n {
            let worker = WorkerBuilder::new(worker_id)
                .operation(Arc::clone(&self.operation))
                .start_gate(start.clone())
                .stop_gate(stop.clone())
                .results_tx(results_tx.clone())
                .build()?;
            handles.push(tokio::spawn(worker.run()));
        }
        drop(results_tx);

        start.release(n);
        let window_start = Instant::now();
        tokio::time::sleep_until((window_start + self.duration).into()).await;
        let exec_time = window_start.elapsed();
        stop.release(n);

        let mut stats = Vec::with_capacity(n);
        while let Some(worker_stats) = results_rx.recv().await {
            stats.push(worker_stats);
        }

        let mut worker_failures = 0;
        for (idx, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                worker_failures += 1;
                tracing::error!(worker_id = idx, error = %e, "Worker task panicked");
            }
        }

        let unclaimed = start.pending() + stop.pending();
        if unclaimed != 0 {
            tracing::warn!(unclaimed, "Some gate tokens were never taken by a worker");
        }

        if stats.is_empty() {
            return Err(BenchError::orchestration(format!(
                "all {} workers failed to report",
                worker_failures.max(n)
            )));
        }

        let report = aggregate_worker_stats(&stats, exec_time);
        tracing::debug!(
            workers = report.workers,
            operations = report.operations,
            errors = report.errors,
            exec_time_ms = report.exec_time.as_millis() as u64,
            "Load window completed"
        );

        Ok(report)
    }
}

impl std::fmt::Debug for LoadGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadGenerator")
            .field("workers", &self.workers)
            .field("duration", &self.duration)
            .finish()
    }
}

/// Fire `operation` from `workers` parallel workers for `duration`
///
/// Shorthand for building a [`LoadGenerator`] and running it once.
pub async fn run_load(
    workers: usize,
    duration: Duration,
    operation: Arc<dyn Operation>,
) -> BenchResult<LoadReport> {
    LoadGeneratorBuilder::new()
        .workers(workers)
        .duration(duration)
        .operation(operation)
        .build()?
        .run()
        .await
}
