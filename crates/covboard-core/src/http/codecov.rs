//! Codecov v2 REST API client for repository coverage totals

use crate::error::{Error, Result};
use crate::traits::CoverageSource;
use crate::types::{CoverageReport, CoverageService};
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::future::Future;

/// JSON pointer to the coverage percentage in a repository details response
const COVERAGE_POINTER: &str = "/totals/coverage";

/// Codecov API client
pub struct CodecovClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for CodecovClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecovClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl CodecovClient {
    /// Create a new Codecov client
    ///
    /// `base_url` is the API root, e.g. `https://api.codecov.io`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("covboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Repository details endpoint
    ///
    /// Endpoint: GET /api/v2/{service}/{owner}/repos/{repo}/
    pub fn repo_url(&self, service: CoverageService, owner: &str, repo: &str) -> String {
        format!(
            "{}/api/v2/{}/{}/repos/{}/",
            self.base_url, service, owner, repo
        )
    }

    async fn repo_coverage(
        &self,
        service: CoverageService,
        owner: &str,
        repo: &str,
    ) -> Result<CoverageReport> {
        let url = self.repo_url(service, owner, repo);
        tracing::debug!(%url, "requesting repository totals from Codecov");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.token)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(Error::from_codecov)?;

        let body = response.bytes().await.map_err(Error::from_codecov)?;
        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(error = %e, "Codecov response is not JSON");
            Error::CodecovUnknown
        })?;

        extract_coverage(&value)
    }
}

impl CoverageSource for CodecovClient {
    fn fetch_coverage<'a>(
        &'a self,
        service: CoverageService,
        owner: &'a str,
        repo: &'a str,
    ) -> impl Future<Output = Result<CoverageReport>> + Send + 'a {
        self.repo_coverage(service, owner, repo)
    }
}

/// Read `totals.coverage` from a repository details response
///
/// Only a JSON number is accepted; `0` is a valid coverage.
pub fn extract_coverage(body: &Value) -> Result<CoverageReport> {
    body.pointer(COVERAGE_POINTER)
        .and_then(Value::as_f64)
        .map(|coverage_percentage| CoverageReport {
            coverage_percentage,
        })
        .ok_or(Error::CoverageMissing)
}
