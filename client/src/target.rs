//! HTTP implementation of the readiness probe and request operation

use async_trait::async_trait;
use reqwest::Client;

use http_bench_core::{BenchmarkConfig, Operation, Probe, ProbeError, ProbeResponse, TestCase};

use crate::pool::HttpClientPool;

/// GET target on the local server under test
///
/// Used both to check readiness and as the operation every worker fires.
/// Readiness accepts any completed reply and leaves the body check to the
/// caller. A request only counts as a success when the status is 2xx and the
/// test case matches the body.
#[derive(Debug, Clone)]
pub struct HttpTarget {
    client: Client,
    url: String,
    test_case: TestCase,
}

impl HttpTarget {
    /// Target `test_case.route` on `127.0.0.1:port`
    pub fn new(pool: &HttpClientPool, port: u16, test_case: &TestCase) -> Self {
        Self::with_url(
            pool,
            format!("http://127.0.0.1:{}{}", port, test_case.route),
            test_case,
        )
    }

    /// Target the route of `test_case` on the server described by `config`
    pub fn for_config(
        pool: &HttpClientPool,
        config: &BenchmarkConfig,
        test_case: &TestCase,
    ) -> Self {
        Self::new(pool, config.port, test_case)
    }

    /// Target an arbitrary URL, judging replies with `test_case`
    pub fn with_url(pool: &HttpClientPool, url: impl Into<String>, test_case: &TestCase) -> Self {
        Self {
            client: pool.client().clone(),
            url: url.into(),
            test_case: test_case.clone(),
        }
    }

    /// Full URL requested
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Probe for HttpTarget {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<ProbeResponse, ProbeError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProbeError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::Body(e.to_string()))?;
        Ok(ProbeResponse::new(status, body))
    }
}

#[async_trait]
impl Operation for HttpTarget {
    async fn call(&self) -> bool {
        match self.fetch().await {
            Ok(response) => response.is_success() && self.test_case.matches(&response.body),
            Err(e) => {
                tracing::trace!(url = %self.url, error = %e, "Request failed");
                false
            }
        }
    }
}
