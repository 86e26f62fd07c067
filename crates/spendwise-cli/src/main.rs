//! SpendWise CLI - Expense analytics
//!
//! Usage:
//!   spendwise summary --file expenses.json    Summarize a snapshot
//!   spendwise summary --api-url URL           Summarize backend data
//!   spendwise week-key 2024-01-01             Show a date's week bucket
//!   spendwise config                          Show effective configuration

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use spendwise_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = log_filter(rust_log.as_deref(), cli.verbose, &config.log_level)?;

    // stderr keeps `--format json` output on stdout parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Summary {
            file,
            api_url,
            user,
            format,
        } => {
            let args = commands::SummaryArgs {
                file,
                api_url,
                user,
                format,
            };
            commands::cmd_summary(&config, &args).await
        }
        Commands::WeekKey { date } => commands::cmd_week_key(&date),
        Commands::MonthKey { date } => commands::cmd_month_key(&date),
        Commands::Config { path } => commands::cmd_config(&config, path),
    }
}

/// Build the log filter
///
/// Priority: RUST_LOG env var > --verbose flag > config level. The config
/// level is checked even when it is overridden.
fn log_filter(rust_log: Option<&str>, verbose: bool, level: &str) -> Result<EnvFilter> {
    let configured = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid logging.level {:?}", level))?;

    match rust_log {
        Some(directives) => {
            EnvFilter::try_new(directives).with_context(|| format!("Invalid RUST_LOG {:?}", directives))
        }
        None if verbose => Ok(EnvFilter::new("debug")),
        None => Ok(configured),
    }
}
