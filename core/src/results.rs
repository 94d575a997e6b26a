//! Per-stage results and their collection across runs

use std::time::Duration;

use serde::Serialize;

use crate::supervisor::ResourceUsage;

/// Measurement of one retained stage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkResult {
    /// Name of the benchmark config
    pub name: String,

    /// Name of the stage that produced this result
    pub stage: String,

    /// Span between the start release and the duration timer firing
    pub exec_time: Duration,

    /// Successful operations across all workers
    pub operations: u64,

    /// Peak resident memory of the server, back-filled after it exits
    pub max_rss_kb: Option<u64>,
}

impl BenchmarkResult {
    /// Create a result with no memory figure yet
    pub fn new(
        name: impl Into<String>,
        stage: impl Into<String>,
        exec_time: Duration,
        operations: u64,
    ) -> Self {
        Self {
            name: name.into(),
            stage: stage.into(),
            exec_time,
            operations,
            max_rss_kb: None,
        }
    }

    /// Throughput in requests per second
    pub fn requests_per_second(&self) -> f64 {
        let secs = self.exec_time.as_secs_f64();
        if secs > 0.0 {
            self.operations as f64 / secs
        } else {
            0.0
        }
    }

    /// Wall time per request in milliseconds, `None` without any request
    pub fn avg_latency_ms(&self) -> Option<f64> {
        if self.operations == 0 {
            return None;
        }
        Some(self.exec_time.as_secs_f64() * 1000.0 / self.operations as f64)
    }

    /// Peak resident memory in megabytes
    pub fn max_rss_mb(&self) -> Option<f64> {
        self.max_rss_kb.map(|kb| kb as f64 / 1024.0)
    }
}

/// Stamp the single end-of-run memory figure onto every result of that run
pub fn backfill_max_rss(results: &mut [BenchmarkResult], usage: Option<ResourceUsage>) {
    let max_rss_kb = usage.and_then(|u| u.max_rss_kb);
    for result in results.iter_mut() {
        result.max_rss_kb = max_rss_kb;
    }
}

/// Everything one benchmark run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Benchmark config name
    pub name: String,

    /// Whether the server became ready and every stage ran
    pub success: bool,

    /// Retained stage results, in stage order
    pub results: Vec<BenchmarkResult>,

    /// Usage reported when the server exited
    pub usage: Option<ResourceUsage>,
}

impl RunOutcome {
    /// A run that never got to drive load
    pub fn failed(name: impl Into<String>, usage: Option<ResourceUsage>) -> Self {
        Self {
            name: name.into(),
            success: false,
            results: Vec::new(),
            usage,
        }
    }
}

/// Ordered results of every successful run
#[derive(Debug, Default, Clone)]
pub struct ResultCollector {
    results: Vec<BenchmarkResult>,
    failed: Vec<String>,
}

impl ResultCollector {
    /// Empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a run's outcome
    ///
    /// Results of unsuccessful runs are dropped; the run name is remembered.
    pub fn push(&mut self, outcome: RunOutcome) {
        if outcome.success {
            self.results.extend(outcome.results);
        } else {
            tracing::warn!(name = %outcome.name, "Discarding results of failed run");
            self.failed.push(outcome.name);
        }
    }

    /// Retained results, in run then stage order
    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    /// Names of the runs that failed
    pub fn failed_runs(&self) -> &[String] {
        &self.failed
    }

    /// Consume into the merged list
    pub fn into_results(self) -> Vec<BenchmarkResult> {
        self.results
    }

    /// Number of retained results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether no result was retained
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, secs: u64, operations: u64) -> BenchmarkResult {
        BenchmarkResult::new(name, "Load test", Duration::from_secs(secs), operations)
    }

    fn outcome(name: &str, success: bool, results: Vec<BenchmarkResult>) -> RunOutcome {
        RunOutcome {
            name: name.to_string(),
            success,
            results,
            usage: None,
        }
    }

    #[test]
    fn test_derived_metrics() {
        let mut r = result("go-std", 10, 250_000);
        r.max_rss_kb = Some(20_480);

        assert!((r.requests_per_second() - 25_000.0).abs() < 1e-9);
        assert!((r.avg_latency_ms().unwrap() - 0.04).abs() < 1e-9);
        assert_eq!(r.max_rss_mb(), Some(20.0));
    }

    #[test]
    fn test_zero_operations_has_no_latency() {
        let r = result("idle", 10, 0);
        assert_eq!(r.requests_per_second(), 0.0);
        assert_eq!(r.avg_latency_ms(), None);
        assert_eq!(r.max_rss_mb(), None);
    }

    #[test]
    fn test_zero_exec_time_has_no_throughput() {
        let r = BenchmarkResult::new("x", "y", Duration::ZERO, 10);
        assert_eq!(r.requests_per_second(), 0.0);
    }

    #[test]
    fn test_backfill_sets_every_result() {
        let mut results = vec![result("a", 1, 1), result("a", 1, 2)];
        backfill_max_rss(
            &mut results,
            Some(ResourceUsage {
                max_rss_kb: Some(4096),
            }),
        );
        assert!(results.iter().all(|r| r.max_rss_kb == Some(4096)));

        backfill_max_rss(&mut results, None);
        assert!(results.iter().all(|r| r.max_rss_kb.is_none()));
    }

    #[test]
    fn test_collector_keeps_order_and_skips_failures() {
        let mut collector = ResultCollector::new();
        assert!(collector.is_empty());

        collector.push(outcome("first", true, vec![result("first", 1, 10)]));
        collector.push(outcome("broken", false, vec![result("broken", 1, 99)]));
        collector.push(outcome(
            "second",
            true,
            vec![result("second", 1, 20), result("second", 1, 30)],
        ));

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.failed_runs(), ["broken".to_string()]);

        let names: Vec<_> = collector.results().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "second"]);

        let ops: Vec<_> = collector.into_results().iter().map(|r| r.operations).collect();
        assert_eq!(ops, [10, 20, 30]);
    }

    #[test]
    fn test_failed_outcome_is_empty() {
        let outcome = RunOutcome::failed("ghost", None);
        assert!(!outcome.success);
        assert!(outcome.results.is_empty());
    }
}
