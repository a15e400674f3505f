//! Report assembly, plain-text rendering and JSON output.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::info;

use epicast_arima::{AdequacyReport, ArimaFit, ArimaOrder, ForecastResult, InformationCriterion};
use epicast_io::{ForecastRow, ForecastTable, level_label};

use crate::pipeline::SearchSummary;

/// Fitted model parameters and fit statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub region: String,
    pub order: ArimaOrder,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub sigma2: f64,
    pub mean: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub aicc: f64,
    pub bic: f64,
    pub criterion: InformationCriterion,
    pub search: Option<SearchSummary>,
}

impl ModelSummary {
    pub fn new(
        region: &str,
        fit: &ArimaFit<'_>,
        criterion: InformationCriterion,
        search: Option<SearchSummary>,
    ) -> Self {
        Self {
            region: region.to_string(),
            order: fit.order(),
            ar: fit.ar().to_vec(),
            ma: fit.ma().to_vec(),
            sigma2: fit.sigma2(),
            mean: fit.mean(),
            log_likelihood: fit.log_likelihood(),
            aic: fit.aic(),
            aicc: fit.aicc(),
            bic: fit.bic(),
            criterion,
            search,
        }
    }

    /// Value of the ranking criterion.
    pub fn score(&self) -> f64 {
        match self.criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Aicc => self.aicc,
            InformationCriterion::Bic => self.bic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalReport {
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub date: NaiveDate,
    pub step: usize,
    pub point: f64,
    pub std_error: f64,
    pub intervals: Vec<IntervalReport>,
}

/// Everything the `forecast` subcommand produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub model: ModelSummary,
    pub last_observed: NaiveDate,
    pub steps: Vec<StepReport>,
}

impl ForecastReport {
    /// Dates each step one day past `last_observed`.
    pub fn new(
        model: ModelSummary,
        last_observed: NaiveDate,
        forecast: &ForecastResult,
    ) -> Result<Self> {
        let dates = forecast_dates(last_observed, forecast.horizon())?;
        let steps = dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| StepReport {
                date,
                step: i + 1,
                point: forecast.points()[i],
                std_error: forecast.std_errors()[i],
                intervals: forecast
                    .bands()
                    .iter()
                    .map(|band| IntervalReport {
                        level: band.level(),
                        lower: band.lower()[i],
                        upper: band.upper()[i],
                    })
                    .collect(),
            })
            .collect();
        Ok(Self {
            model,
            last_observed,
            steps,
        })
    }

    /// The same steps as a CSV forecast table.
    pub fn to_table(&self, levels: &[f64]) -> ForecastTable {
        let mut table = ForecastTable::new(levels.to_vec());
        for step in &self.steps {
            table.push(ForecastRow {
                date: step.date,
                step: step.step,
                point: step.point,
                std_error: step.std_error,
                bounds: step.intervals.iter().map(|b| (b.lower, b.upper)).collect(),
            });
        }
        table
    }
}

/// Everything the `diagnose` subcommand produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnoseReport {
    pub model: ModelSummary,
    pub residual_offset: usize,
    pub adequacy: AdequacyReport,
}

/// Calendar dates for steps `1..=horizon` after `last`.
pub fn forecast_dates(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as u64)
        .map(|h| {
            last.checked_add_days(Days::new(h))
                .with_context(|| format!("forecast date {h} days after {last} is out of range"))
        })
        .collect()
}

/// Plain-text model summary.
pub fn render_model(model: &ModelSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Region:         {}", model.region);
    let _ = writeln!(out, "Model:          ARIMA{}", model.order);
    if let Some(ref search) = model.search {
        let _ = writeln!(
            out,
            "Search:         {} scored, {} failed, {} skipped; admissible d = {:?}",
            search.scored, search.failed, search.skipped, search.admissible_d
        );
    }
    for (i, phi) in model.ar.iter().enumerate() {
        let _ = writeln!(out, "  ar{:<12}{phi:>12.6}", i + 1);
    }
    for (i, theta) in model.ma.iter().enumerate() {
        let _ = writeln!(out, "  ma{:<12}{theta:>12.6}", i + 1);
    }
    let _ = writeln!(out, "  {:<14}{:>12.6}", "mean", model.mean);
    let _ = writeln!(out, "  {:<14}{:>12.6}", "sigma2", model.sigma2);
    let _ = writeln!(out, "  {:<14}{:>12.4}", "log-lik", model.log_likelihood);
    let _ = writeln!(
        out,
        "  {:<14}{:>12.4}",
        model.criterion.to_string(),
        model.score()
    );
    out
}

/// Plain-text forecast table.
pub fn render_forecast(report: &ForecastReport) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<12}{:>6}{:>14}{:>12}", "date", "step", "point", "se");
    if let Some(first) = report.steps.first() {
        for interval in &first.intervals {
            let label = level_label(interval.level);
            let _ = write!(out, "{:>14}{:>14}", format!("lo{label}"), format!("hi{label}"));
        }
    }
    out.push('\n');
    for step in &report.steps {
        let _ = write!(
            out,
            "{:<12}{:>6}{:>14.3}{:>12.3}",
            step.date.to_string(),
            step.step,
            step.point,
            step.std_error
        );
        for interval in &step.intervals {
            let _ = write!(out, "{:>14.3}{:>14.3}", interval.lower, interval.upper);
        }
        out.push('\n');
    }
    out
}

/// Plain-text residual diagnostics.
pub fn render_adequacy(report: &DiagnoseReport) -> String {
    let adequacy = &report.adequacy;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Residuals from t = {}; band ±{:.4}",
        report.residual_offset, adequacy.band
    );
    let _ = writeln!(out, "{:>5}{:>10}", "lag", "acf");
    for point in adequacy.acf.iter().skip(1) {
        let flag = if adequacy.exceedances.contains(&point.lag) {
            " *"
        } else {
            ""
        };
        let _ = writeln!(out, "{:>5}{:>10.4}{flag}", point.lag, point.rho);
    }
    let lb = &adequacy.ljung_box;
    let _ = writeln!(
        out,
        "Lags outside band: {} of {}",
        adequacy.exceedances.len(),
        adequacy.acf.len().saturating_sub(1)
    );
    let _ = writeln!(
        out,
        "Ljung-Box Q = {:.4} on {} dof (lags = {}), p = {:.4}: {}",
        lb.statistic,
        lb.dof,
        lb.lags,
        lb.p_value,
        if adequacy.looks_white() {
            "residuals look white"
        } else {
            "residual autocorrelation remains"
        }
    );
    out
}

/// Writes a serializable report as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report: {}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(())
}
