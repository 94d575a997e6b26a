//! Benchmark, stage and test case definitions

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A server binary to benchmark
///
/// Usually deserialized from a `benchmark.yaml` entry; `dir` is filled in by
/// discovery with the directory holding that file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Unique name used to label results and log lines
    pub name: String,

    /// Program and arguments used to launch the server
    pub command: Vec<String>,

    /// Port the server listens on (127.0.0.1)
    pub port: u16,

    /// Extra environment entries, `KEY=VALUE`, applied in order
    #[serde(default)]
    pub env: Vec<String>,

    /// Working directory for the server process
    #[serde(default)]
    pub dir: PathBuf,
}

impl BenchmarkConfig {
    /// Create a config with no environment overrides, run from the current directory
    pub fn new(name: impl Into<String>, command: Vec<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            command,
            port,
            env: Vec::new(),
            dir: PathBuf::new(),
        }
    }

    /// Append an environment entry
    pub fn with_env(mut self, entry: impl Into<String>) -> Self {
        self.env.push(entry.into());
        self
    }

    /// Set the working directory
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Parsed environment overrides, in declaration order
    pub fn env_pairs(&self) -> Result<Vec<(String, String)>, ConfigError> {
        self.env.iter().map(|entry| parse_env_entry(entry)).collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.command.first().map_or(true, |program| program.is_empty()) {
            return Err(ConfigError::EmptyCommand(self.name.clone()));
        }
        self.env_pairs()?;
        Ok(())
    }
}

fn parse_env_entry(entry: &str) -> Result<(String, String), ConfigError> {
    let (key, value) = entry
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidEnv(entry.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidEnv(entry.to_string()));
    }
    Ok((key.to_string(), value.to_string()))
}

/// One phase of a benchmark run
///
/// Stages run back to back against the same server instance. Only stages with
/// `keep_results` set produce a retained result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage label ("Warmup", "Load test", ...)
    pub name: String,

    /// Number of concurrent clients
    pub parallel_clients: usize,

    /// How long the clients fire requests
    pub duration: Duration,

    /// Whether the result of this stage is reported
    pub keep_results: bool,
}

impl Stage {
    /// Create a stage
    pub fn new(
        name: impl Into<String>,
        parallel_clients: usize,
        duration: Duration,
        keep_results: bool,
    ) -> Self {
        Self {
            name: name.into(),
            parallel_clients,
            duration,
            keep_results,
        }
    }

    /// Throwaway stage used to warm caches and connection pools
    pub fn warmup(parallel_clients: usize, duration: Duration) -> Self {
        Self::new("Warmup", parallel_clients, duration, false)
    }

    /// Measured stage
    pub fn load(parallel_clients: usize, duration: Duration) -> Self {
        Self::new("Load test", parallel_clients, duration, true)
    }

    /// Validate the stage
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel_clients == 0 {
            return Err(ConfigError::InvalidParallelism(self.name.clone()));
        }
        if self.duration.is_zero() {
            return Err(ConfigError::InvalidDuration(self.name.clone()));
        }
        Ok(())
    }
}

/// The stock protocol: one warmup stage then one measured stage
pub fn default_stages(parallel_clients: usize, warmup: Duration, load: Duration) -> Vec<Stage> {
    vec![
        Stage::warmup(parallel_clients, warmup),
        Stage::load(parallel_clients, load),
    ]
}

/// Route to hit and the body the server must answer with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Request path, starting with `/`
    pub route: String,

    /// Exact response body, compared after trimming whitespace
    pub expected: String,
}

impl TestCase {
    /// Create a test case
    pub fn new(route: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            expected: expected.into(),
        }
    }

    /// JSON greeting endpoint every benchmarked server implements
    pub fn api_hello() -> Self {
        Self::new("/api/hello/Jeremy", r#"{"message":"Hello Jeremy!"}"#)
    }

    /// Whether a response body satisfies this test case
    pub fn matches(&self, body: &str) -> bool {
        body.trim() == self.expected
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Benchmark name is blank
    #[error("benchmark name must not be empty")]
    EmptyName,

    /// No program to launch
    #[error("benchmark `{0}` has an empty command")]
    EmptyCommand(String),

    /// Environment entry without `KEY=`
    #[error("invalid environment entry `{0}`: expected KEY=VALUE")]
    InvalidEnv(String),

    /// Stage with zero clients
    #[error("stage `{0}` needs at least one parallel client")]
    InvalidParallelism(String),

    /// Stage with zero duration
    #[error("stage `{0}` needs a non-zero duration")]
    InvalidDuration(String),
}
