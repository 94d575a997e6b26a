//! Load generation for a single stage
//!
//! The LoadGenerator drives one stage of a benchmark:
//! - Spawning one worker task per client
//! - Releasing every worker at once through the start gate
//! - Timing the measurement window
//! - Stopping every worker through the stop gate
//! - Summing the per-worker counts sent back over a channel
//!
//! # Example
//!
//! ```ignore
//! use http_bench_core::LoadGeneratorBuilder;
//!
//! let generator = LoadGeneratorBuilder::new()
//!     .workers(8)
//!     .duration(Duration::from_secs(10))
//!     .operation(operation)
//!     .build()?;
//!
//! let report = generator.run().await?;
//! println!("{} ops in {:?}", report.operations, report.exec_time);
//! ```

mod aggregator;
mod builder;
mod executor;

pub use aggregator::{aggregate_worker_stats, LoadReport};
pub use builder::LoadGeneratorBuilder;
pub use executor::{run_load, LoadGenerator};
