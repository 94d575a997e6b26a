//! Discovery of `benchmark.yaml` files under a root directory

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use http_bench_core::BenchmarkConfig;
use serde::Deserialize;

/// File name looked up in every directory below the root
pub const CONFIG_FILE_NAME: &str = "benchmark.yaml";

#[derive(Debug, Deserialize)]
struct BenchmarkFile {
    #[serde(default)]
    benchmarks: Vec<BenchmarkConfig>,
}

/// Parse one `benchmark.yaml`, running each server from the file's directory
pub fn load_file(path: &Path) -> Result<Vec<BenchmarkConfig>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: BenchmarkFile = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(file
        .benchmarks
        .into_iter()
        .map(|config| config.with_dir(dir.clone()))
        .collect())
}

/// Every config file below `root`, in path order
pub fn config_files(root: &Path) -> Result<Vec<PathBuf>> {
    let root = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = Path::new(&root).join("**").join(CONFIG_FILE_NAME);
    let pattern = pattern.to_string_lossy();

    let mut files = Vec::new();
    for entry in glob::glob(&pattern).with_context(|| format!("invalid pattern {}", pattern))? {
        files.push(entry.context("failed to read directory entry")?);
    }
    files.sort();
    Ok(files)
}

/// Load the configs below `root`, keeping only `only` when it is not empty
///
/// Names must be unique among the selected configs. A duplicate that the
/// name filter leaves out is only logged.
pub fn discover(root: &Path, only: &[String]) -> Result<Vec<BenchmarkConfig>> {
    if only.is_empty() {
        tracing::info!("No benchmark named, will run all");
    } else {
        tracing::info!(names = ?only, "Only the named benchmarks will run");
    }
    let wanted: HashSet<&str> = only.iter().map(String::as_str).collect();

    let mut configs = Vec::new();
    let mut seen = HashSet::new();
    for path in config_files(root)? {
        for config in load_file(&path)? {
            let duplicate = !seen.insert(config.name.clone());
            let selected = wanted.is_empty() || wanted.contains(config.name.as_str());
            match (duplicate, selected) {
                (true, true) => bail!(
                    "benchmark `{}` is defined more than once (again in {})",
                    config.name,
                    path.display()
                ),
                (true, false) => tracing::warn!(
                    name = %config.name,
                    path = %path.display(),
                    "Benchmark defined more than once, not selected"
                ),
                (false, true) => configs.push(config),
                (false, false) => {}
            }
        }
    }

    for name in &wanted {
        if !seen.contains(*name) {
            tracing::warn!(name = %name, "No benchmark with this name");
        }
    }

    tracing::debug!(count = configs.len(), "Benchmarks discovered");
    Ok(configs)
}
