//! Error types for covboard-core

/// Result type alias for covboard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for covboard operations
///
/// The `Display` text of each variant is exactly what a failing run reports
/// to the CI platform.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required environment value or input is missing
    #[error("{0}")]
    Config(String),

    /// Transport-level failure talking to Codecov
    #[error("Error from Codecov: {code} {message}")]
    Codecov {
        /// HTTP status code, or a symbolic code for network failures
        code: String,
        /// Underlying error description
        message: String,
    },

    /// Codecov answered but the response carried no numeric coverage
    #[error("Failed to get current coverage from Codecov")]
    CoverageMissing,

    /// Codecov failure of an unrecognized shape
    #[error("Unknown error while getting data from Codecov")]
    CodecovUnknown,

    /// Geckoboard request failed; passed through unwrapped
    #[error(transparent)]
    Geckoboard(#[from] reqwest::Error),

    /// Step output could not be written
    #[error("Failed to write step output: {0}")]
    Output(#[from] std::io::Error),
}

/// Fieldless error category for pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorKind {
    /// Missing configuration
    Config,
    /// Coverage service transport failure
    Codecov,
    /// Coverage value absent from the response
    CoverageMissing,
    /// Unrecognized coverage service failure
    CodecovUnknown,
    /// Dashboard service failure
    Geckoboard,
    /// Output write failure
    Output,
}

impl Error {
    /// Get the error kind
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Codecov { .. } => ErrorKind::Codecov,
            Error::CoverageMissing => ErrorKind::CoverageMissing,
            Error::CodecovUnknown => ErrorKind::CodecovUnknown,
            Error::Geckoboard(_) => ErrorKind::Geckoboard,
            Error::Output(_) => ErrorKind::Output,
        }
    }

    /// Build a missing-configuration error for an environment variable
    pub(crate) fn missing_env(name: &str) -> Self {
        Error::Config(format!("Failed to get {name} from environment"))
    }

    /// Build a missing-configuration error for an action input
    pub(crate) fn missing_input(input: &str, env_name: &str) -> Self {
        Error::Config(format!(
            "Failed to get input \"{input}\" (or {env_name} from environment)"
        ))
    }

    /// Map a reqwest failure from the coverage service into the Codecov taxonomy
    pub(crate) fn from_codecov(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Error::Codecov {
                code: status.as_u16().to_string(),
                message: format!("Request failed with status code {}", status.as_u16()),
            };
        }

        let code = if err.is_timeout() {
            "ETIMEDOUT"
        } else if err.is_connect() {
            "ECONNECT"
        } else if err.is_body() || err.is_decode() {
            "ECONNRESET"
        } else if err.is_request() {
            "EREQUEST"
        } else {
            return Error::CodecovUnknown;
        };

        Error::Codecov {
            code: code.to_string(),
            // reqwest's Display carries the URL, never the bearer header
            message: err.to_string(),
        }
    }
}
