//! Run configuration resolved from the environment

use crate::error::{Error, Result};
use crate::traits::EnvSource;
use std::fmt;
use std::path::{Path, PathBuf};

/// Repository in `owner/repo` form
pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
/// Repository owner
pub const GITHUB_REPOSITORY_OWNER: &str = "GITHUB_REPOSITORY_OWNER";
/// Fallback variable for the Codecov token
pub const CODECOV_TOKEN: &str = "CODECOV_TOKEN";
/// Fallback variable for the Geckoboard token
pub const GECKOBOARD_TOKEN: &str = "GECKOBOARD_TOKEN";
/// Path of an env file to load before any lookup
pub const DOTENV_CONFIG_PATH: &str = "DOTENV_CONFIG_PATH";
/// Codecov API base URL override
pub const CODECOV_API_URL: &str = "CODECOV_API_URL";
/// Geckoboard API base URL override
pub const GECKOBOARD_API_URL: &str = "GECKOBOARD_API_URL";

/// Action input carrying the Codecov token
pub const CODECOV_TOKEN_INPUT: &str = "codecov-token";
/// Action input carrying the Geckoboard token
pub const GECKOBOARD_TOKEN_INPUT: &str = "geckoboard-token";

/// Default Codecov API base URL
pub const DEFAULT_CODECOV_API_URL: &str = "https://api.codecov.io";
/// Default Geckoboard API base URL
pub const DEFAULT_GECKOBOARD_API_URL: &str = "https://api.geckoboard.com";

/// Everything one run needs; immutable once resolved
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Repository owner, e.g. `my-org`
    pub hosting_owner: String,
    /// Repository with owner, e.g. `my-org/my-repo`
    pub hosting_repo_with_owner: String,
    /// Codecov API token (bearer)
    pub coverage_service_token: String,
    /// Geckoboard API key (basic auth user name)
    pub dashboard_service_token: String,
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("hosting_owner", &self.hosting_owner)
            .field("hosting_repo_with_owner", &self.hosting_repo_with_owner)
            .field("coverage_service_token", &"<redacted>")
            .field("dashboard_service_token", &"<redacted>")
            .finish()
    }
}

impl RunConfig {
    /// Repository name with the `owner/` prefix removed
    ///
    /// Falls back to the full string when it does not start with the owner.
    pub fn repo_name(&self) -> &str {
        self.hosting_repo_with_owner
            .strip_prefix(self.hosting_owner.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(&self.hosting_repo_with_owner)
    }

    /// Resolve from environment values, preferring explicit overrides
    ///
    /// Fails before any network activity if a required value is missing.
    pub fn resolve(env: &impl EnvSource, inputs: &ActionInputs) -> Result<Self> {
        let hosting_repo_with_owner = non_empty(env.var(GITHUB_REPOSITORY))
            .ok_or_else(|| Error::missing_env(GITHUB_REPOSITORY))?;

        let hosting_owner = non_empty(env.var(GITHUB_REPOSITORY_OWNER))
            .ok_or_else(|| Error::missing_env(GITHUB_REPOSITORY_OWNER))?;

        let coverage_service_token = resolve_token(
            env,
            inputs.codecov_token.as_deref(),
            CODECOV_TOKEN_INPUT,
            CODECOV_TOKEN,
        )?;

        let dashboard_service_token = resolve_token(
            env,
            inputs.geckoboard_token.as_deref(),
            GECKOBOARD_TOKEN_INPUT,
            GECKOBOARD_TOKEN,
        )?;

        Ok(Self {
            hosting_owner,
            hosting_repo_with_owner,
            coverage_service_token,
            dashboard_service_token,
        })
    }
}

/// Explicit overrides, typically from command-line flags
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ActionInputs {
    /// Codecov token override
    pub codecov_token: Option<String>,
    /// Geckoboard token override
    pub geckoboard_token: Option<String>,
}

impl fmt::Debug for ActionInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionInputs")
            .field("codecov_token", &self.codecov_token.as_ref().map(|_| "<redacted>"))
            .field(
                "geckoboard_token",
                &self.geckoboard_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Service base URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Codecov API base, without trailing slash
    pub codecov_api_url: String,
    /// Geckoboard API base, without trailing slash
    pub geckoboard_api_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            codecov_api_url: DEFAULT_CODECOV_API_URL.to_string(),
            geckoboard_api_url: DEFAULT_GECKOBOARD_API_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Read overrides from the environment, defaulting to the public APIs
    pub fn from_env(env: &impl EnvSource) -> Self {
        let base = |key: &str, default: &str| {
            non_empty(env.var(key))
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            codecov_api_url: base(CODECOV_API_URL, DEFAULT_CODECOV_API_URL),
            geckoboard_api_url: base(GECKOBOARD_API_URL, DEFAULT_GECKOBOARD_API_URL),
        }
    }
}

/// Environment variable through which the runner exposes an action input
///
/// `codecov-token` becomes `INPUT_CODECOV-TOKEN`; spaces map to underscores.
pub fn input_env_name(input: &str) -> String {
    format!("INPUT_{}", input.replace(' ', "_").to_uppercase())
}

/// Read an action input, trimmed; empty counts as unset
pub fn get_input(env: &impl EnvSource, input: &str) -> Option<String> {
    non_empty(env.var(&input_env_name(input)).map(|v| v.trim().to_string()))
}

/// First candidate that is present and non-empty
pub fn first_non_empty<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates.into_iter().flatten().find(|v| !v.is_empty())
}

fn resolve_token(
    env: &impl EnvSource,
    explicit: Option<&str>,
    input: &str,
    env_name: &str,
) -> Result<String> {
    first_non_empty([
        explicit.map(str::to_string),
        get_input(env, input),
        env.var(env_name),
    ])
    .ok_or_else(|| Error::missing_input(input, env_name))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Load variables from an env file into the process environment
///
/// Uses the file named by `DOTENV_CONFIG_PATH` when set, otherwise `.env`
/// in the working directory. Existing variables are never overridden. A
/// missing default file is silent; any other failure is logged and the run
/// continues. Returns the path that was loaded.
pub fn load_env_file(env: &impl EnvSource) -> Option<PathBuf> {
    let dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!(error = %e, "could not read working directory");
            return None;
        }
    };
    load_env_file_in(env, &dir)
}

/// Like [`load_env_file`], with `.env` looked up in `dir` only
pub fn load_env_file_in(env: &impl EnvSource, dir: &Path) -> Option<PathBuf> {
    if let Some(path) = non_empty(env.var(DOTENV_CONFIG_PATH)) {
        let path = PathBuf::from(path);
        return match dotenvy::from_path(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "loaded env file");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not load env file");
                None
            }
        };
    }

    // Parent directories are not searched
    let path = dir.join(".env");
    match dotenvy::from_path(&path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "loaded env file");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not load .env");
            None
        }
    }
}
