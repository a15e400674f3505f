//! Diagnose command: residual whiteness checks for the fitted model.

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use epicast_arima::adequacy;

use crate::cli::DiagnoseArgs;
use crate::config::EpicastConfig;
use crate::pipeline;
use crate::report::{self, DiagnoseReport, ModelSummary};

/// Run the residual diagnostics pipeline.
pub fn run(args: DiagnoseArgs) -> Result<()> {
    let _cmd = info_span!("diagnose").entered();

    let mut config = EpicastConfig::load(&args.data.config)?;
    config.apply_data_args(&args.data);
    if let Some(max_lag) = args.max_lag {
        config.diagnostics.max_lag = max_lag;
    }
    let criterion = config.model.criterion;

    let daily = pipeline::load_daily(&config)?;
    let fitted = pipeline::fit_model(&config, daily.values())?;

    let order = fitted.fit.order();
    let residual_offset = order.p.max(order.q);
    let n_resid = fitted.fit.differenced().len().saturating_sub(residual_offset);
    let max_lag = clamp_max_lag(config.diagnostics.max_lag, n_resid)?;
    if max_lag < config.diagnostics.max_lag {
        warn!(
            requested = config.diagnostics.max_lag,
            max_lag, n_resid, "max_lag clamped to the residual count"
        );
    }

    let adequacy = adequacy(&fitted.fit, max_lag)
        .with_context(|| format!("residual diagnostics failed for ARIMA{order}"))?;
    info!(
        exceedances = adequacy.exceedances.len(),
        p_value = adequacy.ljung_box.p_value,
        "diagnostics complete"
    );

    let region = config.data.region.as_deref().unwrap_or_default();
    let diagnose_report = DiagnoseReport {
        model: ModelSummary::new(region, &fitted.fit, criterion, fitted.search),
        residual_offset,
        adequacy,
    };

    print!("{}", report::render_model(&diagnose_report.model));
    println!();
    print!("{}", report::render_adequacy(&diagnose_report));

    if let Some(ref path) = args.output {
        report::write_json(path, &diagnose_report)?;
    }

    Ok(())
}

/// Largest usable lag given `n_resid` residuals.
fn clamp_max_lag(requested: usize, n_resid: usize) -> Result<usize> {
    if requested == 0 {
        bail!("[diagnostics].max_lag must be at least 1");
    }
    if n_resid < 2 {
        bail!("only {n_resid} residual(s); at least 2 are needed for diagnostics");
    }
    Ok(requested.min(n_resid - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lag_is_clamped_to_residuals() {
        assert_eq!(clamp_max_lag(20, 100).unwrap(), 20);
        assert_eq!(clamp_max_lag(20, 8).unwrap(), 7);
    }

    #[test]
    fn zero_lag_is_rejected() {
        assert!(clamp_max_lag(0, 100).is_err());
    }

    #[test]
    fn too_few_residuals_are_rejected() {
        assert!(clamp_max_lag(5, 1).is_err());
    }
}
