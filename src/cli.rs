use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use epicast_arima::ArimaOrder;

/// Epicast ARIMA case-count forecaster.
#[derive(Parser)]
#[command(
    name = "epicast",
    version,
    about = "ARIMA order selection and forecasting for daily case counts"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Fit a model to daily new cases and forecast ahead.
    Forecast(ForecastArgs),
    /// Fit a model and check whether its residuals look like white noise.
    Diagnose(DiagnoseArgs),
}

/// Arguments shared by every subcommand.
#[derive(clap::Args)]
pub struct DataArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "epicast.toml")]
    pub config: PathBuf,

    /// Override the case-count CSV path from config.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override the region from config.
    #[arg(short, long)]
    pub region: Option<String>,

    /// First date to use (YYYY-MM-DD, inclusive).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last date to use (YYYY-MM-DD, inclusive).
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Fit this order instead of searching, as `p,d,q`.
    #[arg(long, value_parser = parse_order)]
    pub order: Option<ArimaOrder>,
}

/// Arguments for the `forecast` subcommand.
#[derive(clap::Args)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Override the forecast horizon in days.
    #[arg(long)]
    pub horizon: Option<usize>,

    /// Prediction interval level in (0, 1); repeat for several.
    #[arg(long = "level")]
    pub levels: Vec<f64>,

    /// Path for the JSON forecast report.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path for the CSV forecast table.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Arguments for the `diagnose` subcommand.
#[derive(clap::Args)]
pub struct DiagnoseArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Override the largest residual autocorrelation lag.
    #[arg(long)]
    pub max_lag: Option<usize>,

    /// Path for the JSON diagnostics report.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Parses `p,d,q` into an order.
pub fn parse_order(s: &str) -> Result<ArimaOrder, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [p, d, q] = parts.as_slice() else {
        return Err(format!("expected p,d,q, got {s:?}"));
    };
    let parse = |name: &str, v: &str| {
        v.parse::<usize>()
            .map_err(|e| format!("invalid {name} in {s:?}: {e}"))
    };
    Ok(ArimaOrder::new(parse("p", p)?, parse("d", d)?, parse("q", q)?))
}
