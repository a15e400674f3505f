//! Steps shared by every subcommand: load the daily series, then fit or
//! select a model.

use anyhow::{Context, Result, bail};
use tracing::info;

use epicast_arima::{ArimaFit, CandidateStatus, Selection, select_order_with};
use epicast_io::{DailySeries, read_cases};

use crate::config::EpicastConfig;
use crate::convert;

/// Candidate outcome counts from a grid search.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SearchSummary {
    pub admissible_d: Vec<usize>,
    pub scored: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SearchSummary {
    fn from_selection(selection: &Selection<'_>) -> Self {
        let mut summary = Self {
            admissible_d: selection.admissible_d().to_vec(),
            scored: 0,
            failed: 0,
            skipped: 0,
        };
        for candidate in selection.candidates() {
            match candidate.status {
                CandidateStatus::Scored(_) => summary.scored += 1,
                CandidateStatus::Failed(_) => summary.failed += 1,
                CandidateStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

/// A fitted model plus how it was chosen.
pub struct Fitted<'a> {
    pub fit: ArimaFit<'a>,
    pub search: Option<SearchSummary>,
}

/// Reads the configured region and returns (optionally smoothed) daily new
/// cases.
pub fn load_daily(config: &EpicastConfig) -> Result<DailySeries> {
    let input = convert::input_path(&config.data)?;
    let reader_cfg = convert::build_reader_config(&config.data)?;

    info!(path = %input.display(), region = reader_cfg.region(), "reading case counts");
    let cases = read_cases(&input, &reader_cfg)
        .with_context(|| format!("failed to read case counts: {}", input.display()))?;

    let daily = cases.daily_new_cases();
    if daily.is_empty() {
        bail!(
            "region {:?} has a single day of data; at least two are needed",
            cases.region()
        );
    }

    match config.data.smoothing_window {
        Some(window) => {
            info!(window, "smoothing daily new cases");
            daily
                .smoothed(window)
                .context("invalid [data].smoothing_window")
        }
        None => Ok(daily),
    }
}

/// Fits the configured fixed order, or runs the order search.
pub fn fit_model<'a>(config: &EpicastConfig, series: &'a [f64]) -> Result<Fitted<'a>> {
    if let Some(order) = convert::fixed_order(&config.model) {
        info!(%order, "fitting fixed order");
        let fit = order
            .fit_with_max_iters(series, config.model.max_iters)
            .with_context(|| format!("failed to fit ARIMA{order}"))?;
        return Ok(Fitted { fit, search: None });
    }

    let selection_cfg = convert::build_selection_config(&config.model)?;
    let selection = select_order_with(series, &selection_cfg).context("order selection failed")?;
    let search = SearchSummary::from_selection(&selection);
    info!(
        order = %selection.best().order(),
        criterion = %selection.criterion(),
        score = selection.score(),
        scored = search.scored,
        "selected order"
    );
    Ok(Fitted {
        fit: selection.into_best(),
        search: Some(search),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use epicast_arima::{ArimaOrder, StationarityCheck};
    use tempfile::NamedTempFile;

    fn case_file(counts: &[f64]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "date,region,cumulative").unwrap();
        let start = chrono::NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        for (i, c) in counts.iter().enumerate() {
            let date = start + chrono::Days::new(i as u64);
            writeln!(file, "{date},Ontario,{c}").unwrap();
            writeln!(file, "{date},Quebec,0").unwrap();
        }
        file
    }

    fn config_for(path: &std::path::Path) -> EpicastConfig {
        let mut config = EpicastConfig::default();
        config.data.input = Some(path.to_path_buf());
        config.data.region = Some("Ontario".to_string());
        config
    }

    #[test]
    fn load_daily_differences_cumulative() {
        let file = case_file(&[0.0, 2.0, 5.0, 9.0]);
        let daily = load_daily(&config_for(file.path())).unwrap();
        assert_eq!(daily.values(), &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn load_daily_applies_smoothing() {
        let file = case_file(&[0.0, 2.0, 6.0, 12.0]);
        let mut config = config_for(file.path());
        config.data.smoothing_window = Some(2);
        let daily = load_daily(&config).unwrap();
        assert_eq!(daily.values(), &[2.0, 3.0, 5.0]);
    }

    #[test]
    fn load_daily_rejects_single_day() {
        let file = case_file(&[4.0]);
        let err = load_daily(&config_for(file.path())).unwrap_err();
        assert!(err.to_string().contains("single day"));
    }

    #[test]
    fn fixed_order_skips_search() {
        let series = [3.0, 5.0, 4.0, 6.0, 8.0, 7.0, 9.0, 12.0, 10.0, 11.0, 14.0, 13.0];
        let mut config = EpicastConfig::default();
        config.model.order = Some([0, 1, 0]);
        let fitted = fit_model(&config, &series).unwrap();
        assert_eq!(fitted.fit.order(), ArimaOrder::new(0, 1, 0));
        assert!(fitted.search.is_none());
    }

    #[test]
    fn search_reports_candidate_counts() {
        let series = [3.0, 5.0, 4.0, 6.0, 8.0, 7.0, 9.0, 12.0, 10.0, 11.0, 14.0, 13.0];
        let mut config = EpicastConfig::default();
        config.model.max_p = 1;
        config.model.max_d = 1;
        config.model.max_q = 1;
        config.model.stationarity = StationarityCheck::None;
        config.model.parallel = false;
        let fitted = fit_model(&config, &series).unwrap();
        let search = fitted.search.unwrap();
        assert_eq!(search.admissible_d, vec![0, 1]);
        assert_eq!(search.scored + search.failed + search.skipped, 8);
        assert!(search.scored >= 1);
    }
}
