//! API replay CLI
//!
//! Replays recorded request fixtures against a live service and diffs each
//! live response body against the recorded baseline.
//!
//! # Usage
//!
//! ```bash
//! api-replay                                   # every fixture in ./requests
//! api-replay requests/leads.json other/        # files and directories
//! api-replay --strict-status --ignore meta.generated_at
//! api-replay --ignore '["x.request-id"]'       # top-level key containing a dot
//! RUST_LOG=debug api-replay --report-json report.json
//! ```
//!
//! Exits non-zero unless every fixture fully matched.

use anyhow::{Context, Result};
use clap::Parser;
use replay_compare::JsonPath;
use replay_core::{load_fixtures, Credential};
use replay_runner::{ConsoleReporter, Formatter, HttpTransport, Runner, RunnerConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "api-replay", version, about)]
struct Args {
    /// Fixture files or directories of fixtures
    #[arg(default_value = "requests")]
    fixtures: Vec<PathBuf>,

    /// JSON file holding `{"authorization": "..."}`
    #[arg(long, env = "REPLAY_TOKEN_FILE", default_value = "data/token.json")]
    token_file: PathBuf,

    /// Require the live status to equal the recorded one instead of any 2xx
    #[arg(long)]
    strict_status: bool,

    /// Timeout for each request, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Don't print live response bodies
    #[arg(long)]
    skip_body_logging: bool,

    /// Number of fixtures replayed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Path to leave out of the comparison, e.g. `meta.generated_at` or
    /// `["key.with.dots"]` (repeatable)
    #[arg(long = "ignore", value_name = "PATH")]
    ignore: Vec<JsonPath>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Write a JSON report of the run to this file
    #[arg(long, value_name = "PATH")]
    report_json: Option<PathBuf>,
}

impl Args {
    /// Environment configuration with command line flags applied on top
    fn runner_config(&self) -> RunnerConfig {
        let mut config = RunnerConfig::from_env();

        if self.strict_status {
            config = config.with_strict_status(true);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if self.skip_body_logging {
            config = config.with_skip_body_logging(true);
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        for path in &self.ignore {
            config = config.ignore_path(path.clone());
        }

        config
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so they don't interleave with the report
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = args.runner_config();

    let credential = Credential::load(&args.token_file)
        .await
        .context("cannot authorize replayed requests")?;

    let fixtures = load_fixtures(&args.fixtures).await;
    if fixtures.is_empty() {
        warn!("No fixtures found in {:?}", args.fixtures);
    }

    let transport = HttpTransport::new(config.request_timeout)?;
    let reporter = ConsoleReporter::new(Formatter::new(!args.no_color))
        .skip_body_logging(config.skip_body_logging);
    let runner = Runner::new(config, transport, credential, reporter);

    let summary = runner.run(fixtures).await;

    if let Some(path) = &args.report_json {
        let json = serde_json::to_vec_pretty(&summary)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!("Wrote report to {}", path.display());
    }

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
