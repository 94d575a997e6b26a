//! Host inventory printed above the results

use std::fmt;

use serde_json::{json, Value};
use sysinfo::System;

const GIB: u64 = 1024 * 1024 * 1024;

/// Machine the benchmark ran on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    /// Distribution or OS name
    pub os_name: String,
    /// Distribution or OS version
    pub os_version: String,
    /// Kernel version
    pub kernel_version: String,
    /// CPU brand string of the first core
    pub cpu_model: String,
    /// Logical cores
    pub cpu_count: usize,
    /// Installed memory in bytes
    pub total_memory_bytes: u64,
}

impl SystemInfo {
    /// Query the current host
    pub fn collect() -> Self {
        let sys = System::new_all();
        let unknown = || "unknown".to_string();

        Self {
            os_name: System::name().unwrap_or_else(unknown),
            os_version: System::os_version().unwrap_or_else(unknown),
            kernel_version: System::kernel_version().unwrap_or_else(unknown),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .filter(|brand| !brand.is_empty())
                .unwrap_or_else(unknown),
            cpu_count: sys.cpus().len(),
            total_memory_bytes: sys.total_memory(),
        }
    }

    /// Installed memory in whole gigabytes
    pub fn total_memory_gb(&self) -> u64 {
        self.total_memory_bytes / GIB
    }

    /// JSON form used by the exporters
    pub fn to_json(&self) -> Value {
        json!({
            "os": self.os_name,
            "os_version": self.os_version,
            "kernel_version": self.kernel_version,
            "cpu_model": self.cpu_model,
            "cpu_count": self.cpu_count,
            "total_memory_gb": self.total_memory_gb(),
        })
    }
}

impl fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "System information:")?;
        writeln!(
            f,
            "OS:  {} {} Kernel {}",
            self.os_name, self.os_version, self.kernel_version
        )?;
        writeln!(f, "CPU: {} X {}", self.cpu_count, self.cpu_model)?;
        write!(f, "RAM: {} GB", self.total_memory_gb())
    }
}
