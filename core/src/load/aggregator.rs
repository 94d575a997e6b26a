//! Result aggregation from multiple workers

use std::time::Duration;

use crate::worker::WorkerStats;

/// Outcome of one load generation window
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Time between releasing the workers and the duration timer firing
    pub exec_time: Duration,

    /// Total successful operations across all workers
    pub operations: u64,

    /// Total failed operations across all workers
    pub errors: u64,

    /// Number of workers that reported
    pub workers: usize,
}

/// Sum the counts reported by each worker
///
/// `exec_time` is measured by the caller; worker clocks are not used since
/// workers may take a little extra time to notice their stop token.
pub fn aggregate_worker_stats(stats: &[WorkerStats], exec_time: Duration) -> LoadReport {
    LoadReport {
        exec_time,
        operations: stats.iter().map(|s| s.completed).sum(),
        errors: stats.iter().map(|s| s.errors).sum(),
        workers: stats.len(),
    }
}
