//! Run orchestration: resolve, fetch, publish, report
//!
//! Every step is awaited before the next one starts. The first failure ends
//! the run; nothing already written to the dashboard is rolled back.

use crate::config::{ActionInputs, Endpoints, RunConfig};
use crate::error::Result;
use crate::http::{dataset_id, CodecovClient, GeckoboardClient};
use crate::traits::{CoverageSource, DatasetSink, EnvSource};
use crate::types::{CoverageReport, CoverageService, DataPoint, DatasetSchema};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Message reported when a run fails without a structured error
pub const UNKNOWN_ERROR: &str = "Unknown error while executing";

/// Hosting service this deployment reports coverage for
pub const SERVICE: CoverageService = CoverageService::GitHub;

/// Progress of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing done yet
    Start,
    /// Configuration resolved
    ConfigResolved,
    /// Coverage read from Codecov
    CoverageFetched,
    /// Dataset schema created or updated
    SchemaEnsured,
    /// Data point appended
    DataPublished,
    /// Run finished successfully
    Succeeded,
    /// Run aborted
    Failed,
}

impl RunState {
    /// Get string representation
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ConfigResolved => "config_resolved",
            Self::CoverageFetched => "coverage_fetched",
            Self::SchemaEnsured => "schema_ensured",
            Self::DataPublished => "data_published",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    fn advance(&mut self, next: RunState) {
        tracing::debug!(from = self.as_str(), to = next.as_str(), "run state");
        *self = next;
    }
}

/// Final result of a run; exactly one of these is reported
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Everything published
    Succeeded {
        /// Coverage percentage that was published
        coverage: f64,
    },
    /// A step failed
    Failed {
        /// Human-readable failure message
        message: String,
        /// Last state reached before the failure
        stage: RunState,
    },
}

impl RunOutcome {
    /// Whether the run succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Published coverage, if the run succeeded
    pub fn coverage(&self) -> Option<f64> {
        match self {
            Self::Succeeded { coverage } => Some(*coverage),
            Self::Failed { .. } => None,
        }
    }

    /// Failure message, if the run failed
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Succeeded { .. } => None,
            Self::Failed { message, .. } => Some(message),
        }
    }
}

/// Fetch coverage for the configured repository and publish it
///
/// Advances `state` as each step completes.
pub async fn execute<C, D>(
    config: &RunConfig,
    coverage: &C,
    datasets: &D,
    state: &mut RunState,
) -> Result<CoverageReport>
where
    C: CoverageSource,
    D: DatasetSink,
{
    let report = coverage
        .fetch_coverage(SERVICE, &config.hosting_owner, config.repo_name())
        .await?;
    tracing::info!(
        repository = %config.hosting_repo_with_owner,
        coverage = report.coverage_percentage,
        "fetched coverage from Codecov"
    );
    state.advance(RunState::CoverageFetched);

    let id = dataset_id(&config.hosting_repo_with_owner);
    datasets.put_schema(&id, &DatasetSchema::coverage()).await?;
    state.advance(RunState::SchemaEnsured);

    let point = DataPoint::now(report);
    datasets.append(&id, &point).await?;
    tracing::info!(dataset = %id, "published coverage to Geckoboard");
    state.advance(RunState::DataPublished);

    Ok(report)
}

/// Run with already-resolved configuration and injected collaborators
pub async fn run_with<C, D>(config: &RunConfig, coverage: &C, datasets: &D) -> RunOutcome
where
    C: CoverageSource,
    D: DatasetSink,
{
    let mut state = RunState::ConfigResolved;
    let result = AssertUnwindSafe(execute(config, coverage, datasets, &mut state))
        .catch_unwind()
        .await;
    conclude(result, state)
}

/// Full run: resolve configuration from `env`, then fetch and publish over HTTP
///
/// Never fails; every error becomes a [`RunOutcome::Failed`].
pub async fn run_action(env: &impl EnvSource, inputs: &ActionInputs) -> RunOutcome {
    let mut state = RunState::Start;
    let result = AssertUnwindSafe(async {
        let config = RunConfig::resolve(env, inputs)?;
        state.advance(RunState::ConfigResolved);
        tracing::debug!(?config, "resolved configuration");

        let endpoints = Endpoints::from_env(env);
        let codecov = CodecovClient::new(
            endpoints.codecov_api_url,
            config.coverage_service_token.as_str(),
        );
        let geckoboard = GeckoboardClient::new(
            endpoints.geckoboard_api_url,
            config.dashboard_service_token.as_str(),
        );

        execute(&config, &codecov, &geckoboard, &mut state).await
    })
    .catch_unwind()
    .await;
    conclude(result, state)
}

fn conclude(
    result: std::thread::Result<Result<CoverageReport>>,
    stage: RunState,
) -> RunOutcome {
    match result {
        Ok(Ok(report)) => {
            tracing::debug!(to = RunState::Succeeded.as_str(), "run state");
            RunOutcome::Succeeded {
                coverage: report.coverage_percentage,
            }
        }
        Ok(Err(e)) => {
            tracing::debug!(stage = stage.as_str(), kind = ?e.kind(), "run failed");
            RunOutcome::Failed {
                message: e.to_string(),
                stage,
            }
        }
        Err(_) => {
            tracing::debug!(stage = stage.as_str(), "run panicked");
            RunOutcome::Failed {
                message: UNKNOWN_ERROR.to_string(),
                stage,
            }
        }
    }
}
