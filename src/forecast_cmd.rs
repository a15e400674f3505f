//! Forecast command: fit or select a model, forecast, report.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use epicast_arima::forecast;
use epicast_io::write_forecast_csv;

use crate::cli::ForecastArgs;
use crate::config::EpicastConfig;
use crate::pipeline;
use crate::report::{self, ForecastReport, ModelSummary};

/// Run the forecast pipeline.
pub fn run(args: ForecastArgs) -> Result<()> {
    let _cmd = info_span!("forecast").entered();

    // 1. Load config and apply overrides
    let mut config = EpicastConfig::load(&args.data.config)?;
    config.apply_data_args(&args.data);
    if let Some(horizon) = args.horizon {
        config.forecast.horizon = horizon;
    }
    if !args.levels.is_empty() {
        config.forecast.levels = args.levels.clone();
    }
    let criterion = config.model.criterion;

    // 2. Daily new cases
    let daily = pipeline::load_daily(&config)?;
    let last_observed = daily
        .last_date()
        .context("daily series has no dates")?;

    // 3. Model
    let fitted = pipeline::fit_model(&config, daily.values())?;

    // 4. Forecast
    let horizon = config.forecast.horizon;
    let levels = &config.forecast.levels;
    let result = forecast(&fitted.fit, horizon, levels).context("forecast failed")?;
    info!(horizon, levels = ?levels, "forecast complete");

    // 5. Report
    let region = config.data.region.as_deref().unwrap_or_default();
    let model = ModelSummary::new(region, &fitted.fit, criterion, fitted.search);
    let forecast_report = ForecastReport::new(model, last_observed, &result)?;

    print!("{}", report::render_model(&forecast_report.model));
    println!();
    print!("{}", report::render_forecast(&forecast_report));

    if let Some(ref path) = args.output {
        report::write_json(path, &forecast_report)?;
    }
    if let Some(ref path) = args.csv {
        write_forecast_csv(path, &forecast_report.to_table(levels))
            .with_context(|| format!("failed to write forecast CSV: {}", path.display()))?;
    }

    Ok(())
}
