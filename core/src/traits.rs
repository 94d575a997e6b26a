//! Core traits for request operations and readiness probes
//!
//! These traits are defined in core so the load generator and supervisor can
//! be exercised without a network. The HTTP implementations live in the
//! client crate.

use std::future::Future;

use async_trait::async_trait;

// ============================================================================
// Operation Trait
// ============================================================================

/// A single unit of load, fired repeatedly by workers
///
/// Returns `true` when the operation counts as a success. Failures are never
/// propagated; they are simply not counted.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Perform one operation
    async fn call(&self) -> bool;
}

#[async_trait]
impl<F, Fut> Operation for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send + 'static,
{
    async fn call(&self) -> bool {
        (self)().await
    }
}

// ============================================================================
// Probe Trait
// ============================================================================

/// Reply to one completed request, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl ProbeResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches the body served at the benchmarked route
#[async_trait]
pub trait Probe: Send + Sync {
    /// URL being probed, for logging
    fn endpoint(&self) -> &str;

    /// Issue one request
    ///
    /// Any reply the server completes is `Ok`, including 4xx and 5xx.
    async fn fetch(&self) -> Result<ProbeResponse, ProbeError>;
}

/// Transport failures, where no reply was received
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Connection refused, reset, timed out...
    #[error("connection failed: {0}")]
    Connection(String),

    /// Response body could not be read
    #[error("failed to read body: {0}")]
    Body(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_closure_is_an_operation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let op = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { n % 2 == 0 }
        };

        assert!(op.call().await);
        assert!(!op.call().await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_response_success_range() {
        assert!(ProbeResponse::new(200, "").is_success());
        assert!(ProbeResponse::new(204, "").is_success());
        assert!(!ProbeResponse::new(404, "404 page not found").is_success());
        assert!(!ProbeResponse::new(500, "").is_success());
    }

    #[test]
    fn test_error_display() {
        assert!(ProbeError::Connection("refused".into())
            .to_string()
            .contains("refused"));
    }
}
