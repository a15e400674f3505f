//! Residual diagnostics: exact one-step residuals, sample autocorrelation
//! and the Ljung-Box portmanteau test.
//!
//! Nothing here enforces a verdict. Callers compare the ACF against
//! [`significance_band()`] or read the Ljung-Box p-value.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::ArimaError;
use crate::kalman;
use crate::model::ArimaFit;
use crate::state_space::StateSpace;

/// Two-sided 95% normal quantile used for the white-noise band.
const BAND_Z: f64 = 1.96;

/// One-step-ahead prediction errors of a fitted model on its differenced
/// series.
///
/// The first `offset = max(p, q)` points lack a full history and are not
/// reported, so `values[i]` belongs to differenced index `offset + i`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResidualSeries {
    offset: usize,
    values: Vec<f64>,
}

impl ResidualSeries {
    /// Index into the differenced series of the first residual.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Residual values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of residuals.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no point had enough history.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Sample autocorrelation at one lag.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AcfPoint {
    /// Lag `h`.
    pub lag: usize,
    /// `ρ(h) = γ(h) / γ(0)`.
    pub rho: f64,
}

/// Computes the one-step-ahead residuals of `model` on its differenced
/// series.
///
/// Each residual is the exact prediction error from the Kalman filter that
/// the likelihood is built on, so MA terms carry no zero pre-sample start.
///
/// # Errors
///
/// [`ArimaError::MalformedModel`] when the model fails
/// [`ArimaFit::validate()`]; filter failures as in fitting.
pub fn residuals(model: &ArimaFit<'_>) -> Result<ResidualSeries, ArimaError> {
    model.validate()?;
    let mean = model.mean();
    let centered: Vec<f64> = model.differenced().iter().map(|x| x - mean).collect();
    let ss = StateSpace::new(model.ar(), model.ma());
    let eps = kalman::one_step_errors(&ss, &centered)?;
    let offset = model.order().p.max(model.order().q).min(eps.len());
    Ok(ResidualSeries {
        offset,
        values: eps[offset..].to_vec(),
    })
}

/// Sample autocovariances `γ(0..=max_lag)` with denominator `n`.
pub(crate) fn autocovariances(data: &[f64], max_lag: usize) -> Vec<f64> {
    let n = data.len() as f64;
    let mean = epicast_stats::mean(data);
    let centered: Vec<f64> = data.iter().map(|x| x - mean).collect();
    (0..=max_lag)
        .map(|h| {
            centered
                .iter()
                .skip(h)
                .zip(centered.iter())
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / n
        })
        .collect()
}

/// Sample autocorrelation function for lags `0..=max_lag`.
///
/// `ρ(0)` is exactly `1.0`.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`ArimaError::EmptyData`] | `series` is empty |
/// | [`ArimaError::NonFiniteData`] | any element is NaN or infinite |
/// | [`ArimaError::InsufficientLength`] | `max_lag >= series.len()` |
/// | [`ArimaError::ConstantData`] | `γ(0) = 0` |
///
/// # Example
///
/// ```
/// use epicast_arima::autocorrelation;
///
/// let acf = autocorrelation(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0], 1).unwrap();
/// assert_eq!(acf[0].rho, 1.0);
/// assert!(acf[1].rho < 0.0);
/// ```
pub fn autocorrelation(series: &[f64], max_lag: usize) -> Result<Vec<AcfPoint>, ArimaError> {
    if series.is_empty() {
        return Err(ArimaError::EmptyData);
    }
    if series.iter().any(|x| !x.is_finite()) {
        return Err(ArimaError::NonFiniteData);
    }
    if max_lag >= series.len() {
        return Err(ArimaError::InsufficientLength {
            n: series.len(),
            min: max_lag + 1,
        });
    }

    let gamma = autocovariances(series, max_lag);
    if gamma[0] <= 0.0 {
        return Err(ArimaError::ConstantData);
    }

    Ok(gamma
        .iter()
        .enumerate()
        .map(|(lag, g)| AcfPoint {
            lag,
            rho: if lag == 0 { 1.0 } else { g / gamma[0] },
        })
        .collect())
}

/// Half-width of the approximate 95% white-noise band, `1.96 / √n`.
pub fn significance_band(n: usize) -> f64 {
    BAND_Z / (n as f64).sqrt()
}

/// Ljung-Box portmanteau test result.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LjungBox {
    /// `Q = n(n+2) Σ ρ(k)² / (n-k)` over `k = 1..=lags`.
    pub statistic: f64,
    /// Number of lags summed.
    pub lags: usize,
    /// Chi-squared degrees of freedom, `lags - fitted_params` (at least 1).
    pub dof: usize,
    /// Upper-tail probability of `statistic`.
    pub p_value: f64,
}

/// Ljung-Box test on `residuals` over `lags` lags, with the degrees of
/// freedom reduced by the number of fitted ARMA coefficients.
///
/// # Errors
///
/// As [`autocorrelation()`]; `lags = 0` is reported as
/// [`ArimaError::InvalidConfig`].
pub fn ljung_box(
    residuals: &[f64],
    lags: usize,
    fitted_params: usize,
) -> Result<LjungBox, ArimaError> {
    if lags == 0 {
        return Err(ArimaError::InvalidConfig {
            reason: "Ljung-Box needs at least one lag".to_string(),
        });
    }
    let acf = autocorrelation(residuals, lags)?;
    let n = residuals.len() as f64;
    let statistic = n
        * (n + 2.0)
        * acf
            .iter()
            .skip(1)
            .map(|pt| pt.rho * pt.rho / (n - pt.lag as f64))
            .sum::<f64>();

    let dof = lags.saturating_sub(fitted_params).max(1);
    let chi2 = ChiSquared::new(dof as f64).map_err(|e| ArimaError::InvalidConfig {
        reason: e.to_string(),
    })?;
    Ok(LjungBox {
        statistic,
        lags,
        dof,
        p_value: chi2.sf(statistic),
    })
}

/// Residual adequacy summary for a fitted model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdequacyReport {
    /// Residual ACF for lags `0..=max_lag`.
    pub acf: Vec<AcfPoint>,
    /// Half-width of the white-noise band.
    pub band: f64,
    /// Lags `≥ 1` whose autocorrelation falls outside the band.
    pub exceedances: Vec<usize>,
    /// Portmanteau test over the same lags.
    pub ljung_box: LjungBox,
}

impl AdequacyReport {
    /// True when Ljung-Box does not reject whiteness at the 5% level.
    pub fn looks_white(&self) -> bool {
        self.ljung_box.p_value >= 0.05
    }
}

/// Computes residuals, their ACF up to `max_lag`, band exceedances and the
/// Ljung-Box test in one pass.
///
/// # Errors
///
/// Propagates errors from [`residuals()`], [`autocorrelation()`] and
/// [`ljung_box()`].
pub fn adequacy(model: &ArimaFit<'_>, max_lag: usize) -> Result<AdequacyReport, ArimaError> {
    let resid = residuals(model)?;
    let acf = autocorrelation(resid.values(), max_lag)?;
    let band = significance_band(resid.len());
    let exceedances = acf
        .iter()
        .skip(1)
        .filter(|pt| pt.rho.abs() > band)
        .map(|pt| pt.lag)
        .collect();
    let fitted = model.order().p + model.order().q;
    let ljung_box = ljung_box(resid.values(), max_lag, fitted)?;
    Ok(AdequacyReport {
        acf,
        band,
        exceedances,
        ljung_box,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ArimaOrder;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ar1_residuals_match_the_recursion() {
        let series = [1.0, 2.0, 0.5, -1.0];
        let fit = ArimaFit::from_parts(
            ArimaOrder::new(1, 0, 0),
            vec![0.5],
            vec![],
            1.0,
            0.0,
            0.0,
            &series,
        );
        let resid = residuals(&fit).unwrap();
        assert_eq!(resid.offset(), 1);
        assert_abs_diff_eq!(resid.values()[0], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(resid.values()[1], -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(resid.values()[2], -1.25, epsilon = 1e-12);
    }

    #[test]
    fn ma1_residuals_use_the_exact_filter() {
        let series = [1.0, 1.0, 1.0];
        let fit = ArimaFit::from_parts(
            ArimaOrder::new(0, 0, 1),
            vec![],
            vec![0.5],
            1.0,
            0.0,
            0.0,
            &series,
        );
        let resid = residuals(&fit).unwrap();
        assert_eq!(resid.offset(), 1);
        // A zero pre-sample error would give 1.0 and 0.5 here.
        assert_abs_diff_eq!(resid.values()[0], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(resid.values()[1], 1.0 - 0.3 / 1.05, epsilon = 1e-12);
    }

    #[test]
    fn acf_lag_zero_is_one() {
        let acf = autocorrelation(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0], 3).unwrap();
        assert_eq!(acf.len(), 4);
        assert_eq!(acf[0].rho, 1.0);
        for (i, pt) in acf.iter().enumerate() {
            assert_eq!(pt.lag, i);
            assert!(pt.rho.abs() <= 1.0);
        }
    }

    #[test]
    fn acf_alternating_series() {
        let acf = autocorrelation(&[1.0, -1.0, 1.0, -1.0], 2).unwrap();
        // gamma0 = 1, gamma1 = -3/4, gamma2 = 2/4
        assert_abs_diff_eq!(acf[1].rho, -0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(acf[2].rho, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn acf_errors() {
        assert_eq!(autocorrelation(&[], 0).unwrap_err(), ArimaError::EmptyData);
        assert_eq!(
            autocorrelation(&[2.0, 2.0, 2.0], 1).unwrap_err(),
            ArimaError::ConstantData
        );
        assert_eq!(
            autocorrelation(&[1.0, 2.0, 3.0], 3).unwrap_err(),
            ArimaError::InsufficientLength { n: 3, min: 4 }
        );
        assert_eq!(
            autocorrelation(&[1.0, f64::NAN], 0).unwrap_err(),
            ArimaError::NonFiniteData
        );
    }

    #[test]
    fn band_width() {
        assert_abs_diff_eq!(significance_band(100), 0.196, epsilon = 1e-12);
    }

    #[test]
    fn ljung_box_by_hand() {
        let resid = [1.0, -1.0, 1.0, -1.0];
        let lb = ljung_box(&resid, 1, 0).unwrap();
        // Q = 4·6·(0.75²/3) = 4.5
        assert_abs_diff_eq!(lb.statistic, 4.5, epsilon = 1e-12);
        assert_eq!(lb.dof, 1);
        assert!(lb.p_value > 0.03 && lb.p_value < 0.04);
    }

    #[test]
    fn ljung_box_dof_floor() {
        let resid = [0.3, -0.1, 0.4, -0.6, 0.2, 0.1, -0.3, 0.5];
        let lb = ljung_box(&resid, 2, 5).unwrap();
        assert_eq!(lb.dof, 1);
    }

    #[test]
    fn ljung_box_zero_lags() {
        assert!(matches!(
            ljung_box(&[1.0, 2.0, 3.0], 0, 0),
            Err(ArimaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn residuals_of_white_noise_model_are_centred_differences() {
        let series = [0.0, 1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0, 5.0];
        let fit = ArimaOrder::new(0, 1, 0).fit(&series).unwrap();
        let resid = residuals(&fit).unwrap();
        assert_eq!(resid.offset(), 0);
        assert_eq!(resid.len(), 9);
        let mean = 5.0 / 9.0;
        for (r, w) in resid.values().iter().zip(fit.differenced()) {
            assert_abs_diff_eq!(*r, w - mean, epsilon = 1e-12);
        }
    }

    #[test]
    fn residual_offset_is_max_order() {
        let series = [0.0, 1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0, 5.0];
        let fit = ArimaFit::from_parts(
            ArimaOrder::new(2, 1, 1),
            vec![0.2, 0.1],
            vec![0.3],
            1.0,
            0.5,
            0.0,
            &series,
        );
        let resid = residuals(&fit).unwrap();
        assert_eq!(resid.offset(), 2);
        assert_eq!(resid.len(), 7);
    }

    #[test]
    fn residuals_reject_malformed_model() {
        let series = [1.0, 2.0, 3.0, 5.0];
        let fit = ArimaFit::from_parts(ArimaOrder::new(1, 0, 0), vec![], vec![], 1.0, 0.0, 0.0, &series);
        assert!(matches!(
            residuals(&fit),
            Err(ArimaError::MalformedModel { .. })
        ));
    }

    #[test]
    fn adequacy_report_consistent() {
        let series = [0.0, 1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0, 5.0];
        let fit = ArimaOrder::new(0, 1, 0).fit(&series).unwrap();
        let report = adequacy(&fit, 3).unwrap();
        assert_eq!(report.acf.len(), 4);
        assert_abs_diff_eq!(report.band, 1.96 / 3.0, epsilon = 1e-12);
        for lag in &report.exceedances {
            assert!(report.acf[*lag].rho.abs() > report.band);
        }
        assert_eq!(report.ljung_box.lags, 3);
        assert!(report.ljung_box.p_value >= 0.0 && report.ljung_box.p_value <= 1.0);
    }
}
