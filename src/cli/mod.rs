//! CLI argument parsing and benchmark session driver

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Instrument;

use http_bench_client::{HttpClientPool, HttpConfig, HttpTarget};
use http_bench_core::{
    default_stages, ResultCollector, ServerOutput, Stage, StageRunner, TestCase,
};
use http_bench_report::{CsvExporter, JsonExporter, ResultTable, SystemInfo};

use crate::discovery;

/// http-bench - Throughput and memory benchmark for HTTP server binaries
#[derive(Parser, Debug)]
#[command(name = "http-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Only run the benchmarks with these names (all when omitted)
    pub names: Vec<String>,

    /// Directory searched for benchmark.yaml files
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Parallel clients per stage
    #[arg(short, long, default_value_t = 8)]
    pub clients: usize,

    /// Warmup stage length, "0s" to skip it
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub warmup: Duration,

    /// Measured stage length
    #[arg(short, long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub duration: Duration,

    /// Time a server gets to answer correctly after launch
    #[arg(long, default_value = "5s", value_parser = humantime::parse_duration)]
    pub startup_timeout: Duration,

    /// Time a server gets to exit after the interrupt before being killed
    #[arg(long, default_value = "3s", value_parser = humantime::parse_duration)]
    pub grace_period: Duration,

    /// Per-request timeout
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub request_timeout: Duration,

    /// Route requested on every server
    #[arg(long, default_value = "/api/hello/Jeremy")]
    pub route: String,

    /// Body every server must answer with
    #[arg(long, default_value = r#"{"message":"Hello Jeremy!"}"#)]
    pub expected: String,

    /// Show server stdout and stderr
    #[arg(long)]
    pub server_output: bool,

    /// Write results to this JSON file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Write results to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Stages run against every server
    pub fn stages(&self) -> Vec<Stage> {
        if self.warmup.is_zero() {
            vec![Stage::load(self.clients, self.duration)]
        } else {
            default_stages(self.clients, self.warmup, self.duration)
        }
    }

    /// Route and expected body
    pub fn test_case(&self) -> TestCase {
        TestCase::new(&self.route, &self.expected)
    }

    fn runner(&self) -> Result<StageRunner> {
        let output = if self.server_output {
            ServerOutput::Inherit
        } else {
            ServerOutput::Null
        };
        Ok(StageRunner::new(self.stages())?
            .with_startup_timeout(self.startup_timeout)
            .with_grace_period(self.grace_period)
            .with_output(output))
    }

    /// Benchmark every discovered server, then print and export the results
    pub async fn run(&self) -> Result<()> {
        let runner = self.runner().context("invalid stage settings")?;
        let pool = HttpClientPool::new(
            &HttpConfig::default().with_request_timeout(self.request_timeout),
        )?;
        let test_case = self.test_case();

        let configs = discovery::discover(&self.root, &self.names)
            .with_context(|| format!("failed to discover benchmarks in {}", self.root.display()))?;

        let mut collector = ResultCollector::new();
        for config in &configs {
            let span = tracing::info_span!("bench", name = %config.name);
            let outcome = async {
                tracing::info!(?config, "Config loaded");
                let target = Arc::new(HttpTarget::for_config(&pool, config, &test_case));
                runner.run(config, &test_case, target).await
            }
            .instrument(span)
            .await;
            collector.push(outcome);
        }

        if !collector.failed_runs().is_empty() {
            tracing::warn!(failed = ?collector.failed_runs(), "Some benchmarks did not complete");
        }

        let table = ResultTable::new(collector.results());
        if table.is_empty() {
            println!("{}", table);
            return Ok(());
        }

        tracing::info!("#################### Global results ####################");
        let system = SystemInfo::collect();
        println!("{}\n", system);
        println!("{}", table);

        if let Some(path) = &self.json {
            JsonExporter::export(collector.results(), &system, path)?;
        }
        if let Some(path) = &self.csv {
            CsvExporter::export(collector.results(), path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["http-bench"]);

        assert!(cli.names.is_empty());
        assert_eq!(cli.clients, 8);
        assert_eq!(cli.startup_timeout, Duration::from_secs(5));
        assert_eq!(cli.grace_period, Duration::from_secs(3));
        assert_eq!(cli.test_case(), TestCase::api_hello());
        assert_eq!(
            cli.stages(),
            default_stages(8, Duration::from_secs(10), Duration::from_secs(10))
        );
    }

    #[test]
    fn test_names_and_durations() {
        let cli = Cli::parse_from([
            "http-bench",
            "go std",
            "rust hyper",
            "--warmup",
            "0s",
            "-d",
            "1m 30s",
            "-c",
            "64",
        ]);

        assert_eq!(cli.names, ["go std", "rust hyper"]);
        assert_eq!(cli.stages(), vec![Stage::load(64, Duration::from_secs(90))]);
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        assert!(Cli::try_parse_from(["http-bench", "--duration", "soon"]).is_err());
    }

    #[test]
    fn test_zero_clients_fail_runner() {
        let cli = Cli::parse_from(["http-bench", "-c", "0"]);
        assert!(cli.runner().is_err());
    }

    #[tokio::test]
    async fn test_empty_root_runs_nothing() {
        let root = tempfile::tempdir().expect("tempdir");
        let cli = Cli::parse_from(["http-bench", "--root", root.path().to_str().expect("utf-8")]);

        cli.run().await.expect("run failed");
    }
}
