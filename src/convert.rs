//! Pure conversion functions: TOML config structs -> crate API config types.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::*;

use epicast_arima::{ArimaOrder, SelectionConfig};
use epicast_io::ReaderConfig;

/// Resolves the input CSV path.
pub fn input_path(data: &DataToml) -> Result<PathBuf> {
    data.input
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no input path: set [data].input in config or use --input"))
}

/// Builds a [`ReaderConfig`] from the TOML data configuration.
pub fn build_reader_config(data: &DataToml) -> Result<ReaderConfig> {
    let region = data
        .region
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("no region: set [data].region in config or use --region"))?;
    let cfg = ReaderConfig::new(region)
        .with_start(data.start)
        .with_end(data.end);
    cfg.validate().context("invalid [data] settings")?;
    Ok(cfg)
}

/// Builds a [`SelectionConfig`] from the TOML model configuration.
pub fn build_selection_config(model: &ModelToml) -> Result<SelectionConfig> {
    let mut cfg = SelectionConfig::new(model.max_p, model.max_d, model.max_q)
        .with_criterion(model.criterion)
        .with_stationarity(model.stationarity)
        .with_parallel(model.parallel)
        .with_max_iters(model.max_iters);
    if let Some(secs) = model.time_budget_secs {
        let budget = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("invalid time_budget_secs: {secs}"))?;
        cfg = cfg.with_time_budget(budget);
    }
    cfg.validate().context("invalid [model] settings")?;
    Ok(cfg)
}

/// Returns the fixed order, if one is configured.
pub fn fixed_order(model: &ModelToml) -> Option<ArimaOrder> {
    model.order.map(|[p, d, q]| ArimaOrder::new(p, d, q))
}
