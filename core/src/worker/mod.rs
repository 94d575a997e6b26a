//! Worker module for firing load at the benchmarked server
//!
//! A Worker is the execution unit of a stage, responsible for one tight loop:
//! **check stop -> call operation -> count -> repeat**.
//!
//! Each Worker is a tokio task that:
//!
//! 1. Waits for exactly one token from the start gate
//! 2. Checks the stop gate without blocking; leaves the loop if a token is there
//! 3. Calls the shared operation and bumps its private success or error count
//! 4. Repeats, with no pacing delay, until stopped
//! 5. Sends its final stats once over the results channel
//!
//! Workers never share mutable state. The only things they touch in common are
//! the two gates and the results sender.
//!
//! # Example
//!
//! ```ignore
//! use http_bench_core::worker::{Gate, WorkerBuilder};
//!
//! let worker = WorkerBuilder::new(0)
//!     .operation(operation)
//!     .start_gate(start.clone())
//!     .stop_gate(stop.clone())
//!     .results_tx(tx.clone())
//!     .build()?;
//!
//! tokio::spawn(worker.run());
//! start.release(1);
//! ```

mod builder;
mod executor;
mod gate;
mod stats;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use gate::Gate;
pub use stats::WorkerStats;
