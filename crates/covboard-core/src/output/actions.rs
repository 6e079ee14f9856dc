//! GitHub Actions workflow commands: step outputs and failure annotations

use crate::error::Result;
use crate::run::RunOutcome;
use crate::traits::EnvSource;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Name of the step output carrying the coverage percentage
pub const COVERAGE_OUTPUT: &str = "coverage";

/// Heredoc delimiter for multi-line values in `$GITHUB_OUTPUT`
const DELIMITER: &str = "COVBOARD_EOF";

/// Escape a command message (percent-encoding of `%`, CR and LF)
pub fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a command property value; also encodes `:` and `,`
pub fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

/// Writer for step outputs and failure annotations
#[derive(Debug, Clone, Default)]
pub struct ActionOutput {
    output_file: Option<PathBuf>,
}

impl ActionOutput {
    /// Target an explicit output file, or stdout commands when `None`
    pub fn new(output_file: Option<PathBuf>) -> Self {
        Self { output_file }
    }

    /// Use `$GITHUB_OUTPUT` when the runner provides it
    pub fn from_env(env: &impl EnvSource) -> Self {
        Self::new(
            env.var("GITHUB_OUTPUT")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        )
    }

    /// File outputs are appended to, if any
    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    /// Set a step output
    ///
    /// Appends `name=value` to the output file, using the heredoc form for
    /// multi-line values. Without an output file the legacy `::set-output`
    /// command is written to `stdout`.
    pub fn set_output(&self, name: &str, value: &str, stdout: &mut impl Write) -> Result<()> {
        let Some(path) = &self.output_file else {
            writeln!(
                stdout,
                "::set-output name={}::{}",
                escape_property(name),
                escape_data(value)
            )?;
            return Ok(());
        };

        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)?;

        if value.contains('\n') || value.contains('\r') {
            if value.contains(DELIMITER) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("value of output '{name}' contains the delimiter {DELIMITER}"),
                )
                .into());
            }
            writeln!(f, "{name}<<{DELIMITER}")?;
            writeln!(f, "{value}")?;
            writeln!(f, "{DELIMITER}")?;
        } else {
            writeln!(f, "{name}={value}")?;
        }
        Ok(())
    }

    /// Emit an error annotation marking the step as failed
    ///
    /// The caller is responsible for exiting with a non-zero code.
    pub fn set_failed(&self, message: &str, stdout: &mut impl Write) -> Result<()> {
        writeln!(stdout, "::error::{}", escape_data(message))?;
        Ok(())
    }

    /// Report a finished run: the `coverage` output on success, one error otherwise
    pub fn report(&self, outcome: &RunOutcome, stdout: &mut impl Write) -> Result<()> {
        match outcome {
            RunOutcome::Succeeded { coverage } => {
                self.set_output(COVERAGE_OUTPUT, &coverage.to_string(), stdout)
            }
            RunOutcome::Failed { message, .. } => self.set_failed(message, stdout),
        }
    }
}
