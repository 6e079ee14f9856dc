#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use covboard_core::config::load_env_file;
use covboard_core::output::ActionOutput;
use covboard_core::{run_action, ActionInputs, EnvSource, ProcessEnv, RunOutcome};
use std::io::Write;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "covboard",
    version,
    about = "Publish the current Codecov coverage to a Geckoboard dataset"
)]
struct Cli {
    /// Codecov API token (default: input `codecov-token`, then CODECOV_TOKEN)
    #[arg(long)]
    codecov_token: Option<String>,

    /// Geckoboard API key (default: input `geckoboard-token`, then GECKOBOARD_TOKEN)
    #[arg(long)]
    geckoboard_token: Option<String>,

    /// Output format: gha, json, text (default: auto-detect)
    #[arg(long, env = "COVBOARD_OUTPUT_FORMAT")]
    output_format: Option<String>,
}

/// Output format for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// GitHub Actions: `coverage` to $GITHUB_OUTPUT, failures as `::error::`
    Gha,
    /// Single JSON object to stdout
    Json,
    /// Human-readable text
    Text,
}

impl OutputFormat {
    fn detect(explicit: Option<&str>, env: &impl EnvSource) -> Self {
        match explicit {
            Some("gha") => OutputFormat::Gha,
            Some("json") => OutputFormat::Json,
            Some("text") => OutputFormat::Text,
            _ => {
                if env.var("GITHUB_ACTIONS").is_some() {
                    OutputFormat::Gha
                } else {
                    OutputFormat::Text
                }
            }
        }
    }
}

fn main() {
    // Before argument parsing so the env file can supply env-backed flags
    load_env_file_logged(|| load_env_file(&ProcessEnv));
    subscriber().init();

    let cli = Cli::parse();
    std::process::exit(run(cli));
}

/// Load the env file under a scoped subscriber, so its own warnings are
/// shown while a RUST_LOG it sets still reaches the global subscriber
fn load_env_file_logged<T>(load: impl FnOnce() -> T) -> T {
    tracing::subscriber::with_default(subscriber(), load)
}

/// Logs go to stderr; stdout is reserved for workflow commands and results
fn subscriber() -> impl tracing::Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish()
}

/// Filter empty string from Option (GHA passes "" for unset optional inputs)
fn clean_opt(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

fn run(cli: Cli) -> i32 {
    let output_format = OutputFormat::detect(clean_opt(cli.output_format).as_deref(), &ProcessEnv);
    let inputs = ActionInputs {
        codecov_token: clean_opt(cli.codecov_token),
        geckoboard_token: clean_opt(cli.geckoboard_token),
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build();
    let rt = match rt {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {e}");
            return 1;
        }
    };

    let outcome = rt.block_on(run_action(&ProcessEnv, &inputs));
    if let RunOutcome::Failed { message, stage } = &outcome {
        tracing::debug!(stage = stage.as_str(), "{message}");
    }

    let reported = match output_format {
        OutputFormat::Gha => write_gha_output(&outcome),
        OutputFormat::Json => write_json_output(&outcome),
        OutputFormat::Text => write_text_output(&outcome),
    };

    match (reported, outcome.is_success()) {
        (true, true) => 0,
        _ => 1,
    }
}

/// Write the step output or a single error annotation
fn write_gha_output(outcome: &RunOutcome) -> bool {
    let output = ActionOutput::from_env(&ProcessEnv);
    if output.output_file().is_none() {
        tracing::warn!("GITHUB_OUTPUT not set, falling back to stdout");
    }

    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    match output.report(outcome, &mut lock) {
        Ok(()) => true,
        Err(e) => {
            let _ = output.set_failed(&e.to_string(), &mut lock);
            false
        }
    }
}

fn json_value(outcome: &RunOutcome) -> serde_json::Value {
    match outcome {
        RunOutcome::Succeeded { coverage } => serde_json::json!({ "coverage": coverage }),
        RunOutcome::Failed { message, stage } => serde_json::json!({
            "error": message,
            "stage": stage.as_str(),
        }),
    }
}

/// Write one JSON object to stdout
fn write_json_output(outcome: &RunOutcome) -> bool {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer(&mut lock, &json_value(outcome)).is_ok() && writeln!(lock).is_ok()
}

/// Write human-readable text; failures go to stderr
fn write_text_output(outcome: &RunOutcome) -> bool {
    match outcome {
        RunOutcome::Succeeded { coverage } => {
            let stdout = std::io::stdout();
            let mut w = stdout.lock();
            writeln!(w, "Coverage published: {coverage}%").is_ok()
        }
        RunOutcome::Failed { message, .. } => {
            eprintln!("Error: {message}");
            true
        }
    }
}
