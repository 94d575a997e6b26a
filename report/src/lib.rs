//! Report generation for benchmark results
//!
//! This crate turns the merged results of a benchmark session into:
//!
//! - A host inventory header
//! - An aligned plain-text table
//! - JSON and CSV files

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod export;
pub mod system;
pub mod table;

pub use export::{CsvExporter, JsonExporter};
pub use system::SystemInfo;
pub use table::ResultTable;
