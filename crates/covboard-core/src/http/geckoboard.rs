//! Geckoboard Datasets API client

use crate::error::Result;
use crate::traits::DatasetSink;
use crate::types::{DataPayload, DataPoint, DatasetSchema};
use std::future::Future;

/// Suffix of every coverage dataset id
pub const DATASET_SUFFIX: &str = ".by_day";

/// Derive the dataset id for a repository
///
/// Separators and any other non-alphanumeric characters are dropped, the
/// remaining word characters are merged and lowercased, then the suffix is
/// appended: `My-Org/Cool-Repo` becomes `myorgcoolrepo.by_day`.
pub fn dataset_id(repo_with_owner: &str) -> String {
    let mut id = String::with_capacity(repo_with_owner.len() + DATASET_SUFFIX.len());
    id.extend(
        repo_with_owner
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase()),
    );
    id.push_str(DATASET_SUFFIX);
    id
}

/// Geckoboard API client
///
/// Authenticates with the API key as basic-auth user name and an empty password.
pub struct GeckoboardClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for GeckoboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeckoboardClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl GeckoboardClient {
    /// Create a new Geckoboard client
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

    /// Dataset endpoint: /datasets/{id}
    pub fn dataset_url(&self, dataset_id: &str) -> String {
        format!("{}/datasets/{}", self.base_url, dataset_id)
    }

    /// Data endpoint: /datasets/{id}/data
    pub fn data_url(&self, dataset_id: &str) -> String {
        format!("{}/data", self.dataset_url(dataset_id))
    }
}

impl DatasetSink for GeckoboardClient {
    fn put_schema<'a>(
        &'a self,
        dataset_id: &'a str,
        schema: &'a DatasetSchema,
    ) -> impl Future<Output = Result<()>> + Send + 'a {
        async move {
            let url = self.dataset_url(dataset_id);
            tracing::debug!(%url, "creating or updating dataset");

            self.client
                .put(&url)
                .basic_auth(&self.token, Some(""))
                .json(schema)
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        }
    }

    fn append<'a>(
        &'a self,
        dataset_id: &'a str,
        point: &'a DataPoint,
    ) -> impl Future<Output = Result<()>> + Send + 'a {
        async move {
            let url = self.data_url(dataset_id);
            tracing::debug!(%url, coverage = point.coverage, "appending data point");

            self.client
                .post(&url)
                .basic_auth(&self.token, Some(""))
                .json(&DataPayload::single(point))
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        }
    }
}
