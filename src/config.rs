use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use epicast_arima::{InformationCriterion, StationarityCheck};
use serde::Deserialize;

use crate::cli::DataArgs;

/// Top-level Epicast configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EpicastConfig {
    /// Input data settings.
    #[serde(default)]
    pub data: DataToml,

    /// Model fitting and order selection settings.
    #[serde(default)]
    pub model: ModelToml,

    /// Forecast settings.
    #[serde(default)]
    pub forecast: ForecastToml,

    /// Residual diagnostics settings.
    #[serde(default)]
    pub diagnostics: DiagnosticsToml,
}

impl EpicastConfig {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }

    /// Applies command-line overrides shared by every subcommand.
    pub fn apply_data_args(&mut self, args: &DataArgs) {
        if let Some(ref input) = args.input {
            self.data.input = Some(input.clone());
        }
        if let Some(ref region) = args.region {
            self.data.region = Some(region.clone());
        }
        if args.start.is_some() {
            self.data.start = args.start;
        }
        if args.end.is_some() {
            self.data.end = args.end;
        }
        if let Some(order) = args.order {
            self.model.order = Some([order.p, order.d, order.q]);
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataToml {
    pub input: Option<PathBuf>,
    pub region: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub smoothing_window: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    #[serde(default = "default_max_p")]
    pub max_p: usize,
    #[serde(default = "default_max_d")]
    pub max_d: usize,
    #[serde(default = "default_max_q")]
    pub max_q: usize,
    /// `"aic"`, `"aicc"` or `"bic"`.
    #[serde(default)]
    pub criterion: InformationCriterion,
    /// `"kpss"`, `"variance"` or `"none"`.
    #[serde(default)]
    pub stationarity: StationarityCheck,
    #[serde(default)]
    pub time_budget_secs: Option<f64>,
    #[serde(default = "default_true")]
    pub parallel: bool,
    #[serde(default = "default_max_iters")]
    pub max_iters: u64,
    #[serde(default)]
    pub order: Option<[usize; 3]>,
}

impl Default for ModelToml {
    fn default() -> Self {
        Self {
            max_p: default_max_p(),
            max_d: default_max_d(),
            max_q: default_max_q(),
            criterion: InformationCriterion::default(),
            stationarity: StationarityCheck::default(),
            time_budget_secs: None,
            parallel: true,
            max_iters: default_max_iters(),
            order: None,
        }
    }
}

fn default_max_p() -> usize {
    3
}
fn default_max_d() -> usize {
    2
}
fn default_max_q() -> usize {
    3
}
fn default_true() -> bool {
    true
}
fn default_max_iters() -> u64 {
    epicast_arima::DEFAULT_MAX_ITERS
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastToml {
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    #[serde(default = "default_levels")]
    pub levels: Vec<f64>,
}

impl Default for ForecastToml {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            levels: default_levels(),
        }
    }
}

fn default_horizon() -> usize {
    14
}
fn default_levels() -> Vec<f64> {
    vec![0.80, 0.95]
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsToml {
    #[serde(default = "default_max_lag")]
    pub max_lag: usize,
}

impl Default for DiagnosticsToml {
    fn default() -> Self {
        Self {
            max_lag: default_max_lag(),
        }
    }
}

fn default_max_lag() -> usize {
    20
}
