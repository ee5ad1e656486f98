//! Heart disease risk assessment CLI
//!
//! Fills in the assessment form, sends it to the prediction server and
//! shows the resulting risk level. Also prints the risk factor guide and
//! the server's health.

mod client;
mod commands;
mod config;
mod form;
mod output;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{assess, guide, status};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Heart disease risk assessment CLI
#[derive(Parser)]
#[command(name = "heart-risk")]
#[command(author, version, about = "Heart Disease Risk Assessment", long_about = None)]
pub struct Cli {
    /// Prediction server URL (can also be set via HEART_RISK_API_URL env var)
    #[arg(long, env = "HEART_RISK_API_URL")]
    pub api_url: Option<String>,

    /// Give up on the server after this many seconds (waits indefinitely when unset)
    #[arg(long, env = "HEART_RISK_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in the form and check heart disease risk
    Assess(assess::AssessArgs),

    /// Show the heart disease risk factors guide
    Guide,

    /// Show prediction server health and readiness
    Status,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("heart_risk=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<bool> {
    let config = config::Config::load()?;
    let format = config.resolve_format(cli.format);
    let api_url = config.resolve_api_url(cli.api_url.as_deref());
    let timeout = cli
        .timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    match cli.command {
        Commands::Guide => {
            guide::show_guide(format)?;
            Ok(true)
        }
        Commands::Assess(args) => {
            info!(api_url = %api_url, "Using prediction server");
            let client = client::ApiClient::with_timeout(&api_url, timeout)?;
            assess::run_assessment(&client, args, format).await
        }
        Commands::Status => {
            let client = client::ApiClient::with_timeout(&api_url, timeout)?;
            status::show_status(&client, format).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
