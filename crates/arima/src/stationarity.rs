//! Stationarity checks used by the order selector to decide which
//! differencing orders are admissible.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::difference::difference;

/// KPSS level-stationarity critical value at the 5% significance level.
pub const KPSS_CRITICAL_5PCT: f64 = 0.463;

/// Outcome of a KPSS level-stationarity test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KpssResult {
    /// Test statistic `Σ Sₜ² / (n² · σ̂²_LR)`.
    pub statistic: f64,
    /// Bartlett truncation lag used for the long-run variance.
    pub lags: usize,
}

impl KpssResult {
    /// True when the statistic is below the 5% critical value, i.e. level
    /// stationarity is not rejected.
    pub fn is_stationary(&self) -> bool {
        self.statistic < KPSS_CRITICAL_5PCT
    }
}

/// Runs the KPSS level-stationarity test.
///
/// The truncation lag is `floor(4 · (n/100)^¼)`, clamped to `[1, n/2]`.
/// Returns `None` for fewer than 4 observations. A series with zero
/// long-run variance (e.g. constant) yields a statistic of `0.0`.
pub fn kpss(series: &[f64]) -> Option<KpssResult> {
    let n = series.len();
    if n < 4 {
        return None;
    }

    let lags = (4.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize;
    let lags = lags.min(n / 2).max(1);

    let mean = epicast_stats::mean(series);
    let resid: Vec<f64> = series.iter().map(|x| x - mean).collect();

    let mut partial = 0.0;
    let mut numerator = 0.0;
    for r in &resid {
        partial += r;
        numerator += partial * partial;
    }
    numerator /= (n * n) as f64;

    let nf = n as f64;
    let mut long_run = resid.iter().map(|r| r * r).sum::<f64>() / nf;
    for j in 1..=lags {
        let weight = 1.0 - j as f64 / (lags + 1) as f64;
        let gamma: f64 = resid
            .iter()
            .skip(j)
            .zip(resid.iter())
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / nf;
        long_run += 2.0 * weight * gamma;
    }

    let statistic = if long_run > 0.0 {
        numerator / long_run
    } else {
        0.0
    };
    Some(KpssResult { statistic, lags })
}

/// Predicate deciding whether the `d`-th difference of a series is
/// stationary enough to model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationarityCheck {
    /// KPSS level-stationarity test at the 5% level.
    #[default]
    Kpss,
    /// Accept `d` when differencing once more would not reduce the sample
    /// variance (for `d = 0`), or when `Δ^d` has smaller variance than
    /// `Δ^(d-1)` (for `d ≥ 1`).
    #[serde(rename = "variance")]
    VarianceRatio,
    /// Accept every differencing order.
    None,
}

impl StationarityCheck {
    /// Returns true when `d` differences of `series` pass this check.
    pub fn accepts(self, series: &[f64], d: usize) -> bool {
        match self {
            StationarityCheck::None => series.len() > d,
            StationarityCheck::Kpss => difference(series, d)
                .ok()
                .and_then(|w| kpss(&w))
                .is_some_and(|r| r.is_stationary()),
            StationarityCheck::VarianceRatio => {
                // Needs at least two points at the deeper level.
                let (shallow, deep) = if d == 0 { (0, 1) } else { (d - 1, d) };
                let (Ok(a), Ok(b)) = (difference(series, shallow), difference(series, deep)) else {
                    return false;
                };
                if b.len() < 2 {
                    return false;
                }
                let (var_a, var_b) = (epicast_stats::variance(&a), epicast_stats::variance(&b));
                if d == 0 { var_b >= var_a } else { var_b < var_a }
            }
        }
    }
}

impl fmt::Display for StationarityCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StationarityCheck::Kpss => "kpss",
            StationarityCheck::VarianceRatio => "variance",
            StationarityCheck::None => "none",
        };
        f.write_str(name)
    }
}
