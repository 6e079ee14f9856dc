//! Trait seams between the orchestrator and its collaborators
//!
//! Static dispatch throughout: the orchestrator is generic over these traits,
//! production code plugs in the HTTP clients and tests plug in fakes.

use crate::error::Result;
use crate::types::{CoverageReport, CoverageService, DataPoint, DatasetSchema};
use std::collections::HashMap;
use std::future::Future;

/// Read-only source of environment values
pub trait EnvSource {
    /// Look up a variable; `None` when unset or not valid unicode
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}

/// Coverage service read side
pub trait CoverageSource {
    /// Fetch the current coverage for `owner/repo` on the given hosting service
    fn fetch_coverage<'a>(
        &'a self,
        service: CoverageService,
        owner: &'a str,
        repo: &'a str,
    ) -> impl Future<Output = Result<CoverageReport>> + Send + 'a;
}

/// Dashboard service write side
pub trait DatasetSink {
    /// Create or update a dataset's schema; must be safe to repeat
    fn put_schema<'a>(
        &'a self,
        dataset_id: &'a str,
        schema: &'a DatasetSchema,
    ) -> impl Future<Output = Result<()>> + Send + 'a;

    /// Append one record to an existing dataset
    fn append<'a>(
        &'a self,
        dataset_id: &'a str,
        point: &'a DataPoint,
    ) -> impl Future<Output = Result<()>> + Send + 'a;
}
