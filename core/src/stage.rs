//! Staged benchmark runs against one supervised server
//!
//! A run starts the server, waits until it answers the test case, drives
//! every stage in order through a fresh [`LoadGenerator`], then stops the
//! server and stamps its peak memory onto the retained results.
//!
//! [`LoadGenerator`]: crate::load::LoadGenerator

use std::sync::Arc;
use std::time::Duration;

use crate::config::{BenchmarkConfig, Stage, TestCase};
use crate::error::{BenchError, BenchResult};
use crate::load::LoadGeneratorBuilder;
use crate::results::{backfill_max_rss, BenchmarkResult, RunOutcome};
use crate::supervisor::{
    ServerOutput, ServerSupervisor, DEFAULT_GRACE_PERIOD, READINESS_POLL_INTERVAL,
};
use crate::traits::{Operation, Probe};

/// How long a server gets to serve the expected body after launch
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs an ordered list of stages against a supervised server
#[derive(Debug, Clone)]
pub struct StageRunner {
    stages: Vec<Stage>,
    startup_timeout: Duration,
    grace_period: Duration,
    poll_interval: Duration,
    output: ServerOutput,
}

impl StageRunner {
    /// Create a runner, validating every stage
    pub fn new(stages: Vec<Stage>) -> BenchResult<Self> {
        if stages.is_empty() {
            return Err(BenchError::config("at least one stage is required"));
        }
        for stage in &stages {
            stage.validate()?;
        }
        Ok(Self {
            stages,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            grace_period: DEFAULT_GRACE_PERIOD,
            poll_interval: READINESS_POLL_INTERVAL,
            output: ServerOutput::default(),
        })
    }

    /// Time the server gets to serve the expected body after launch
    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Time the server gets to exit after the interrupt
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Interval between readiness requests
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Where server stdout and stderr go
    pub fn with_output(mut self, output: ServerOutput) -> Self {
        self.output = output;
        self
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage against a fresh instance of `config`'s server
    ///
    /// `target` probes readiness and is the operation fired during stages.
    /// The server is stopped whatever happens, and the outcome carries the
    /// results of the stages marked `keep_results`.
    pub async fn run<T>(
        &self,
        config: &BenchmarkConfig,
        test_case: &TestCase,
        target: Arc<T>,
    ) -> RunOutcome
    where
        T: Probe + Operation + 'static,
    {
        let mut supervisor = ServerSupervisor::new(config.clone())
            .with_grace_period(self.grace_period)
            .with_poll_interval(self.poll_interval)
            .with_output(self.output);

        if let Err(e) = supervisor.start() {
            tracing::error!(error = %e, "Unable to start server");
            return RunOutcome::failed(&config.name, None);
        }

        let ready = supervisor
            .wait_for_readiness(target.as_ref(), &test_case.expected, self.startup_timeout)
            .await;

        let mut results = Vec::new();
        let mut success = ready;
        if ready {
            let operation: Arc<dyn Operation> = target;
            for stage in &self.stages {
                match self.run_stage(&config.name, stage, Arc::clone(&operation)).await {
                    Ok(result) => {
                        if stage.keep_results {
                            results.push(result);
                        }
                    }
                    Err(e) => {
                        tracing::error!(stage = %stage.name, error = %e, "Stage failed");
                        success = false;
                        break;
                    }
                }
            }
        }

        supervisor.stop().await;
        let usage = supervisor.resource_usage();
        backfill_max_rss(&mut results, usage);

        RunOutcome {
            name: config.name.clone(),
            success,
            results,
            usage,
        }
    }

    async fn run_stage(
        &self,
        name: &str,
        stage: &Stage,
        operation: Arc<dyn Operation>,
    ) -> BenchResult<BenchmarkResult> {
        tracing::info!("#################### Starting stage {} ####################", stage.name);
        tracing::info!(
            "Will shoot with {} clients for {:?}",
            stage.parallel_clients,
            stage.duration
        );

        let report = LoadGeneratorBuilder::new()
            .workers(stage.parallel_clients)
            .duration(stage.duration)
            .operation(operation)
            .build()?
            .run()
            .await?;

        let result = BenchmarkResult::new(name, &stage.name, report.exec_time, report.operations);
        tracing::info!(
            errors = report.errors,
            "Results: {} requests processed in {:?} ({:.3} req/s)",
            result.operations,
            result.exec_time,
            result.requests_per_second()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_stages;
    use crate::traits::{ProbeError, ProbeResponse};

    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Always-ready server answering every request after a short delay
    struct MockTarget {
        body: &'static str,
        calls: AtomicU64,
    }

    impl MockTarget {
        fn new(body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                body,
                calls: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl Probe for MockTarget {
        fn endpoint(&self) -> &str {
            "http://127.0.0.1:0/api/hello/Jeremy"
        }

        async fn fetch(&self) -> Result<ProbeResponse, ProbeError> {
            Ok(ProbeResponse::new(200, self.body))
        }
    }

    #[async_trait]
    impl Operation for MockTarget {
        async fn call(&self) -> bool {
            self.calls.fetch_add(1, Ordering::Relaxed);
            tokio::time::sleep(Duration::from_millis(1)).await;
            true
        }
    }

    fn sleeper(name: &str) -> BenchmarkConfig {
        BenchmarkConfig::new(
            name,
            vec!["sh".into(), "-c".into(), "exec sleep 30".into()],
            0,
        )
    }

    fn fast_runner(stages: Vec<Stage>) -> StageRunner {
        StageRunner::new(stages)
            .expect("valid stages")
            .with_poll_interval(Duration::from_millis(20))
            .with_startup_timeout(Duration::from_secs(2))
            .with_grace_period(Duration::from_millis(500))
    }

    #[test]
    fn test_rejects_invalid_stages() {
        assert!(StageRunner::new(vec![]).is_err());
        assert!(StageRunner::new(vec![Stage::load(0, Duration::from_secs(1))]).is_err());
        assert!(StageRunner::new(vec![Stage::warmup(1, Duration::ZERO)]).is_err());
    }

    #[test]
    fn test_defaults() {
        let stages = default_stages(8, Duration::from_secs(10), Duration::from_secs(10));
        let runner = StageRunner::new(stages).expect("valid stages");
        assert_eq!(runner.stages().len(), 2);
        assert_eq!(runner.startup_timeout, DEFAULT_STARTUP_TIMEOUT);
        assert_eq!(runner.grace_period, DEFAULT_GRACE_PERIOD);
        assert_eq!(runner.poll_interval, READINESS_POLL_INTERVAL);
    }

    #[cfg(unix)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_only_kept_stages_are_retained() {
        let duration = Duration::from_millis(200);
        let runner = fast_runner(default_stages(2, duration, duration));
        let target = MockTarget::new(r#"{"message":"Hello Jeremy!"}"#);

        let outcome = runner
            .run(&sleeper("sleepy server"), &TestCase::api_hello(), Arc::clone(&target))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.results.len(), 1);

        let result = &outcome.results[0];
        assert_eq!(result.name, "sleepy server");
        assert_eq!(result.stage, "Load test");
        assert!(result.operations > 0);
        assert!(result.exec_time >= duration);
        assert!(result.exec_time < duration + Duration::from_millis(50));

        // Warmup requests were fired but not retained
        assert!(target.calls.load(Ordering::Relaxed) > result.operations);

        assert!(outcome.usage.is_some());
        assert_eq!(result.max_rss_kb, outcome.usage.and_then(|u| u.max_rss_kb));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unready_server_runs_no_stage() {
        let stage_length = Duration::from_millis(50);
        let runner = fast_runner(default_stages(2, stage_length, stage_length));
        let target = MockTarget::new("Not Found");

        let outcome = runner
            .run(&sleeper("wrong body"), &TestCase::api_hello(), Arc::clone(&target))
            .await;

        assert!(!outcome.success);
        assert!(outcome.results.is_empty());
        assert_eq!(target.calls.load(Ordering::Relaxed), 0);
        // Server was still stopped and reaped
        assert!(outcome.usage.is_some());
    }

    #[tokio::test]
    async fn test_invalid_config_fails_run() {
        let stage_length = Duration::from_millis(50);
        let runner = fast_runner(default_stages(1, stage_length, stage_length));
        let config = BenchmarkConfig::new("empty", vec![], 8080);

        let outcome = runner
            .run(&config, &TestCase::api_hello(), MockTarget::new("{}"))
            .await;

        assert!(!outcome.success);
        assert!(outcome.usage.is_none());
    }
}
