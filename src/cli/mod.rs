//! Command-line parsing for the stock forecast client.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the adapter/pipeline code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{Horizon, PayloadEncoding, WeekendPolicy};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "stockcast", version, about = "Stock price forecasting client for managed endpoints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Request a forecast and print the summary, table, and optional plot/exports.
    Forecast(ForecastArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `stockcast forecast`, but
    /// renders results in a terminal UI using Ratatui.
    Tui(ForecastArgs),
    /// Print the horizon -> deployment mapping.
    Endpoints,
}

/// Common options for forecasting.
#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// History CSV to forecast from (the CLI prompts for one when omitted).
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Inline JSON payload posted instead of a file.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,

    /// Use a synthetic demo history instead of a file.
    #[arg(long, conflicts_with_all = ["file", "data"])]
    pub sample: bool,

    /// Random seed for the demo history.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Demo history length in days.
    #[arg(long, default_value_t = 365)]
    pub sample_days: usize,

    /// Forecast horizon.
    #[arg(short = 't', long, value_enum, default_value_t = Horizon::ShortTerm)]
    pub horizon: Horizon,

    /// Request body encoding expected by the deployment.
    #[arg(long, value_enum, default_value_t = PayloadEncoding::Json)]
    pub encoding: PayloadEncoding,

    /// Weekend handling for forecast rows.
    #[arg(long, value_enum, default_value_t = WeekendPolicy::Mask)]
    pub weekend: WeekendPolicy,

    /// Maximum number of table rows to print.
    #[arg(long, default_value_t = 14)]
    pub limit: usize,

    /// Print every row (overrides --limit).
    #[arg(long)]
    pub all: bool,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the forecast to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the forecast (horizon + rows) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}
