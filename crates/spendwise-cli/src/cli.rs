//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SpendWise - See where your money goes
#[derive(Parser)]
#[command(name = "spendwise")]
#[command(about = "Expense analytics and budget recommendations", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.local/share/spendwise/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize expenses: totals by category, week and month, plus recommendations
    Summary {
        /// JSON snapshot of expense records (as returned by GET /get_expenses)
        #[arg(short, long, conflicts_with = "api_url")]
        file: Option<PathBuf>,

        /// Expense backend base URL (overrides config and SPENDWISE_API_URL)
        #[arg(long)]
        api_url: Option<String>,

        /// Only include expenses owned by this user
        #[arg(short, long)]
        user: Option<String>,

        /// Output format: text, json (defaults to config)
        #[arg(long)]
        format: Option<String>,
    },

    /// Show the week bucket for a date (YYYY-MM-DD)
    ///
    /// Weeks start on Sunday and week 1 contains January 1. This is not
    /// ISO-8601 week numbering.
    WeekKey {
        /// Date in YYYY-MM-DD form
        date: String,
    },

    /// Show the month bucket for a date (YYYY-MM-DD)
    MonthKey {
        /// Date in YYYY-MM-DD form
        date: String,
    },

    /// Show the effective configuration
    Config {
        /// Only print the config file path
        #[arg(long)]
        path: bool,
    },
}
