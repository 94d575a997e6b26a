//! HTTP side of http-bench
//!
//! This crate provides the reqwest-backed pieces the core engine is generic
//! over:
//!
//! - A shared client pool without an idle-connection cap
//! - `HttpTarget`, implementing both `Probe` and `Operation`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod pool;
pub mod target;

pub use pool::{ConfigValidationError, HttpClientPool, HttpConfig, PoolError};
pub use target::HttpTarget;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use http_bench_core::{run_load, TestCase};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_load_against_mock_server() {
        let server = MockServer::start().await;
        let hello = ResponseTemplate::new(200).set_body_string(r#"{"message":"Hello Jeremy!"}"#);
        Mock::given(path("/api/hello/Jeremy"))
            .respond_with(hello)
            .mount(&server)
            .await;

        let pool = HttpClientPool::new(&HttpConfig::default()).expect("pool");
        let target = HttpTarget::new(&pool, server.address().port(), &TestCase::api_hello());

        let report = run_load(4, Duration::from_millis(200), Arc::new(target))
            .await
            .expect("Run failed");

        assert!(report.operations > 0);
        assert_eq!(report.errors, 0);

        let received = server.received_requests().await.unwrap_or_default();
        assert_eq!(received.len() as u64, report.operations);
    }
}
