//! Plain-text results table

use std::fmt;

use http_bench_core::BenchmarkResult;

const MISSING: &str = "n/a";

/// Aligned table of retained results, one row each
///
/// ```text
/// go-std        25012.300 req/s    0.040 ms/req    RSS:  9.125 MB
/// rust_hyper    61802.900 req/s    0.016 ms/req    RSS:  3.441 MB
/// ```
#[derive(Debug, Clone)]
pub struct ResultTable {
    rows: Vec<[String; 4]>,
}

impl ResultTable {
    /// Build the table from merged results
    pub fn new(results: &[BenchmarkResult]) -> Self {
        let rows = results
            .iter()
            .map(|r| {
                [
                    r.name.replace(' ', "_"),
                    format!("{:.3}", r.requests_per_second()),
                    fmt_opt(r.avg_latency_ms()),
                    fmt_opt(r.max_rss_mb()),
                ]
            })
            .collect();
        Self { rows }
    }

    /// Whether there is no row to print
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> [usize; 4] {
        let mut widths = [0; 4];
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }
        widths
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{:.3}", v))
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "No benchmark found");
        }

        let [w0, w1, w2, w3] = self.widths();
        for (idx, [name, rps, latency, rss]) in self.rows.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "{:<w0$}    {:>w1$} req/s    {:>w2$} ms/req    RSS: {:>w3$} MB",
                name, rps, latency, rss
            )?;
        }
        Ok(())
    }
}
