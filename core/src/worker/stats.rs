//! Worker statistics tracking

/// Counts kept privately by each worker and sent once when it stops
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Worker identifier
    pub worker_id: usize,

    /// Number of operations that reported success
    pub completed: u64,

    /// Number of operations that reported failure
    pub errors: u64,
}

impl WorkerStats {
    /// Create new empty stats for a worker
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    /// Record the outcome of one operation
    pub fn record(&mut self, success: bool) {
        if success {
            self.completed += 1;
        } else {
            self.errors += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_stats_defaults() {
        let stats = WorkerStats::new(3);
        assert_eq!(stats.worker_id, 3);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.errors, 0);
    }

    #[test]
    fn test_worker_stats_record() {
        let mut stats = WorkerStats::new(0);
        stats.record(true);
        stats.record(true);
        stats.record(false);

        assert_eq!(stats.completed, 2);
        assert_eq!(stats.errors, 1);
    }
}
