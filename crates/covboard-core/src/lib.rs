//! # covboard core
//!
//! Republishes a repository's Codecov coverage into a Geckoboard dataset
//! from a CI job.
//!
//! One pass, strictly sequential:
//! - **Resolve** repository identity and tokens from the environment
//! - **Fetch** `totals.coverage` from the Codecov v2 API
//! - **Publish** by upserting the dataset schema, then appending one point
//! - **Report** the `coverage` step output, or exactly one failure message
//!
//! ## Example
//!
//! ```no_run
//! use covboard_core::{run_action, ActionInputs, ProcessEnv};
//!
//! # async fn example() {
//! let outcome = run_action(&ProcessEnv, &ActionInputs::default()).await;
//! match outcome.coverage() {
//!     Some(coverage) => println!("published {coverage}%"),
//!     None => eprintln!("{}", outcome.message().unwrap_or_default()),
//! }
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod http;
pub mod output;
pub mod run;
pub mod traits;
pub mod types;

pub use config::{ActionInputs, Endpoints, RunConfig};
pub use error::{Error, ErrorKind, Result};
pub use run::{run_action, run_with, RunOutcome, RunState};
pub use traits::{CoverageSource, DatasetSink, EnvSource, ProcessEnv};
pub use types::{CoverageReport, CoverageService, DataPoint, DatasetSchema};

/// Synchronous variant of [`run_action`]
///
/// Builds a current-thread Tokio runtime and blocks on the async version.
/// Prefer the async version if you're already in an async context.
pub fn run_action_sync(env: &impl EnvSource, inputs: &ActionInputs) -> RunOutcome {
    match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt.block_on(run_action(env, inputs)),
        Err(e) => RunOutcome::Failed {
            message: format!("failed to create runtime: {e}"),
            stage: RunState::Start,
        },
    }
}
