//! CSV export functionality

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use http_bench_core::BenchmarkResult;

/// Writes one CSV row per result
pub struct CsvExporter;

impl CsvExporter {
    /// Export one row per result to a CSV file
    pub fn export(results: &[BenchmarkResult], path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut wtr = Writer::from_writer(file);

        // Write headers
        wtr.write_record([
            "name",
            "stage",
            "exec_time_secs",
            "operations",
            "requests_per_second",
            "avg_latency_ms",
            "max_rss_kb",
        ])?;

        for r in results {
            wtr.write_record(&[
                r.name.clone(),
                r.stage.clone(),
                format!("{:.6}", r.exec_time.as_secs_f64()),
                r.operations.to_string(),
                format!("{:.3}", r.requests_per_second()),
                r.avg_latency_ms().map(|v| format!("{:.3}", v)).unwrap_or_default(),
                r.max_rss_kb.map(|v| v.to_string()).unwrap_or_default(),
            ])?;
        }

        wtr.flush()?;
        tracing::info!(path = %path.display(), results = results.len(), "CSV report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_export_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("results.csv");

        let mut kept = BenchmarkResult::new("go std", "Load test", Duration::from_secs(2), 1000);
        kept.max_rss_kb = Some(2048);
        let idle = BenchmarkResult::new("idle", "Load test", Duration::from_secs(1), 0);

        CsvExporter::export(&[kept, idle], &path).expect("export failed");

        let text = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "name,stage,exec_time_secs,operations,requests_per_second,avg_latency_ms,max_rss_kb"
        );
        assert_eq!(lines[1], "go std,Load test,2.000000,1000,500.000,2.000,2048");
        assert_eq!(lines[2], "idle,Load test,1.000000,0,0.000,,");
    }
}
