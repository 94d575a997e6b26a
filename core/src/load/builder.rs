//! Builder pattern for LoadGenerator construction

use std::sync::Arc;
use std::time::Duration;

use crate::error::{BenchError, BenchResult};
use crate::traits::Operation;

use super::executor::LoadGenerator;

/// Builder for creating a LoadGenerator with validated parameters
///
/// # Example
///
/// ```ignore
/// let generator = LoadGeneratorBuilder::new()
///     .workers(8)
///     .duration(Duration::from_secs(10))
///     .operation(operation)
///     .build()?;
/// ```
#[derive(Default)]
pub struct LoadGeneratorBuilder {
    workers: Option<usize>,
    duration: Option<Duration>,
    operation: Option<Arc<dyn Operation>>,
}

impl LoadGeneratorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of parallel workers
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Set the measurement window
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set the operation fired by every worker
    pub fn operation(mut self, operation: Arc<dyn Operation>) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Build the generator
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a field is missing, if `workers` is
    /// zero or if `duration` is zero.
    pub fn build(self) -> BenchResult<LoadGenerator> {
        let workers = self
            .workers
            .ok_or_else(|| BenchError::missing_config("workers"))?;
        let duration = self
            .duration
            .ok_or_else(|| BenchError::missing_config("duration"))?;
        let operation = self
            .operation
            .ok_or_else(|| BenchError::missing_config("operation"))?;

        if workers == 0 {
            return Err(BenchError::config("workers must be at least 1"));
        }
        if duration.is_zero() {
            return Err(BenchError::config("duration must be greater than zero"));
        }

        Ok(LoadGenerator::new(workers, duration, operation))
    }
}
