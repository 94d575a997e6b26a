//! JSON export functionality

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use http_bench_core::BenchmarkResult;
use serde_json::{json, Value};

use crate::system::SystemInfo;

/// Writes results with the machine inventory as one JSON document
pub struct JsonExporter;

impl JsonExporter {
    /// Build the JSON document for `results`
    pub fn document(results: &[BenchmarkResult], system: &SystemInfo) -> Value {
        let entries: Vec<_> = results
            .iter()
            .map(|r| {
                json!({
                    "name": r.name,
                    "stage": r.stage,
                    "exec_time_secs": r.exec_time.as_secs_f64(),
                    "operations": r.operations,
                    "requests_per_second": r.requests_per_second(),
                    "avg_latency_ms": r.avg_latency_ms(),
                    "max_rss_kb": r.max_rss_kb,
                    "max_rss_mb": r.max_rss_mb(),
                })
            })
            .collect();

        json!({
            "generated_at": Utc::now().to_rfc3339(),
            "system": system.to_json(),
            "results": entries,
        })
    }

    /// Export results to a pretty-printed JSON file
    pub fn export(results: &[BenchmarkResult], system: &SystemInfo, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &Self::document(results, system))?;
        writer.flush()?;

        tracing::info!(path = %path.display(), results = results.len(), "JSON report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn system() -> SystemInfo {
        SystemInfo {
            os_name: "Linux".into(),
            os_version: "1".into(),
            kernel_version: "6".into(),
            cpu_model: "cpu".into(),
            cpu_count: 4,
            total_memory_bytes: 8 * 1024 * 1024 * 1024,
        }
    }

    #[test]
    fn test_export_writes_results() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("results.json");

        let mut result = BenchmarkResult::new("go std", "Load test", Duration::from_secs(2), 1000);
        result.max_rss_kb = Some(2048);

        JsonExporter::export(&[result], &system(), &path).expect("export failed");

        let value: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert!(value["generated_at"].is_string());
        assert_eq!(value["system"]["cpu_count"], 4);

        let entry = &value["results"][0];
        assert_eq!(entry["name"], "go std");
        assert_eq!(entry["operations"], 1000);
        assert_eq!(entry["requests_per_second"], 500.0);
        assert_eq!(entry["max_rss_mb"], 2.0);
    }

    #[test]
    fn test_missing_values_are_null() {
        let result = BenchmarkResult::new("idle", "Load test", Duration::from_secs(1), 0);
        let value = JsonExporter::document(&[result], &system());

        assert!(value["results"][0]["avg_latency_ms"].is_null());
        assert!(value["results"][0]["max_rss_kb"].is_null());
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("results.json");

        let err = JsonExporter::export(&[], &system(), &path).unwrap_err();
        assert!(err.to_string().contains("failed to create"));
    }
}
