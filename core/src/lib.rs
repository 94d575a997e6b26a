//! http-bench-core: engine for benchmarking HTTP server binaries
//!
//! This crate holds everything needed to measure one server, with no
//! dependency on a particular HTTP client:
//!
//! - Benchmark, stage and test case definitions
//! - The server supervisor (launch, readiness, shutdown, peak memory)
//! - The load generator and its gated workers
//! - The stage runner and result collection
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod load;
pub mod results;
pub mod stage;
pub mod supervisor;
pub mod traits;
pub mod worker;

pub use config::{default_stages, BenchmarkConfig, ConfigError, Stage, TestCase};
pub use error::*;
pub use load::{run_load, LoadGenerator, LoadGeneratorBuilder, LoadReport};
pub use results::{backfill_max_rss, BenchmarkResult, ResultCollector, RunOutcome};
pub use stage::{StageRunner, DEFAULT_STARTUP_TIMEOUT};
pub use supervisor::{
    poll_until_ready, Readiness, ResourceUsage, ServerOutput, ServerSupervisor, SupervisorState,
    DEFAULT_GRACE_PERIOD, READINESS_POLL_INTERVAL,
};
pub use traits::*;
pub use worker::{Gate, Worker, WorkerBuilder, WorkerStats};
