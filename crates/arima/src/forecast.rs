//! Multi-step forecasts with prediction intervals on the original scale.

use serde::Serialize;

use crate::difference::{difference_polynomial, integrate_from_tail};
use crate::error::ArimaError;
use crate::kalman;
use crate::model::ArimaFit;
use crate::spec::ArimaOrder;
use crate::state_space::StateSpace;

/// Prediction interval at one confidence level.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionBand {
    level: f64,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl PredictionBand {
    /// Confidence level in `(0, 1)`.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Lower bounds, one per step.
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper bounds, one per step.
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }
}

/// Point forecasts, standard errors and one [`PredictionBand`] per
/// requested level, for steps `1..=horizon`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastResult {
    order: ArimaOrder,
    points: Vec<f64>,
    std_errors: Vec<f64>,
    bands: Vec<PredictionBand>,
}

impl ForecastResult {
    /// Order of the model that produced the forecast.
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Forecast horizon.
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    /// True for a zero-step forecast.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point forecasts on the original scale.
    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Forecast standard errors on the original scale.
    pub fn std_errors(&self) -> &[f64] {
        &self.std_errors
    }

    /// Bands in the order the levels were requested.
    pub fn bands(&self) -> &[PredictionBand] {
        &self.bands
    }

    /// `(point, lower, upper)` per step for the band at `level`, or `None`
    /// when that level was not requested.
    pub fn triples(&self, level: f64) -> Option<Vec<(f64, f64, f64)>> {
        let band = self.bands.iter().find(|b| b.level == level)?;
        Some(
            self.points
                .iter()
                .zip(&band.lower)
                .zip(&band.upper)
                .map(|((&p, &l), &u)| (p, l, u))
                .collect(),
        )
    }
}

/// Forecasts `horizon` steps past the end of the model's series.
///
/// The ARMA recursion runs on the centred differenced series with future
/// innovations set to zero, then the result is integrated onto the
/// original scale from the last `d` observations. The h-step variance is
/// `σ²·Σψⱼ²` over the ψ-weights of `θ(B) / (φ(B)(1−B)^d)`, so interval
/// width never shrinks with the horizon.
///
/// Levels must lie in the open interval `(0, 1)`: a level of `1.0` would
/// need infinite bounds and is rejected. Levels are checked before the
/// horizon, so a zero horizon with valid levels returns an empty result.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`ArimaError::MalformedModel`] | the model fails [`ArimaFit::validate()`] |
/// | [`ArimaError::InvalidConfidenceLevel`] | a level is NaN or outside `(0, 1)` |
/// | [`ArimaError::NonStationaryFit`], [`ArimaError::NumericalDivergence`] | the Kalman pass over the differenced series fails |
///
/// # Example
///
/// ```
/// use epicast_arima::{ArimaOrder, forecast};
///
/// let series = [0.0, 1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0, 5.0];
/// let fit = ArimaOrder::new(0, 1, 0).fit(&series).unwrap();
/// let fc = forecast(&fit, 3, &[0.8, 0.95]).unwrap();
/// assert_eq!(fc.horizon(), 3);
/// assert!(fc.bands()[1].upper()[0] > fc.bands()[0].upper()[0]);
/// ```
pub fn forecast(
    model: &ArimaFit<'_>,
    horizon: usize,
    levels: &[f64],
) -> Result<ForecastResult, ArimaError> {
    model.validate()?;
    let quantiles = levels
        .iter()
        .map(|&level| {
            epicast_stats::normal_two_sided_quantile(level)
                .ok_or(ArimaError::InvalidConfidenceLevel { level })
        })
        .collect::<Result<Vec<f64>, ArimaError>>()?;

    let order = model.order();
    let diffed_points = arma_point_forecast(model, horizon)?;
    let series = model.series();
    let tail = &series[series.len() - order.d..];
    let points = integrate_from_tail(&diffed_points, order.d, tail)?;

    let psi = psi_weights(model.ar(), model.ma(), order.d, horizon);
    let sigma2 = model.sigma2();
    let mut acc = 0.0;
    let std_errors: Vec<f64> = psi
        .iter()
        .map(|w| {
            acc += w * w;
            (sigma2 * acc).sqrt()
        })
        .collect();

    let bands = levels
        .iter()
        .zip(&quantiles)
        .map(|(&level, &z)| PredictionBand {
            level,
            lower: points
                .iter()
                .zip(&std_errors)
                .map(|(p, se)| p - z * se)
                .collect(),
            upper: points
                .iter()
                .zip(&std_errors)
                .map(|(p, se)| p + z * se)
                .collect(),
        })
        .collect();

    tracing::debug!(order = %order, horizon, levels = levels.len(), "forecast computed");

    Ok(ForecastResult {
        order,
        points,
        std_errors,
        bands,
    })
}

/// Point forecasts of the differenced series (mean added back), projected
/// from the Kalman state after the last observation.
fn arma_point_forecast(model: &ArimaFit<'_>, horizon: usize) -> Result<Vec<f64>, ArimaError> {
    let mean = model.mean();
    let centered: Vec<f64> = model.differenced().iter().map(|x| x - mean).collect();
    let ss = StateSpace::new(model.ar(), model.ma());
    let points = kalman::predict(&ss, &centered, horizon)?;
    Ok(points.into_iter().map(|x| x + mean).collect())
}

/// First `horizon` ψ-weights of `θ(B) / (φ(B)(1−B)^d)`, with `ψ₀ = 1`.
pub(crate) fn psi_weights(ar: &[f64], ma: &[f64], d: usize, horizon: usize) -> Vec<f64> {
    // φ(B) = 1 − Σ φᵢBⁱ, multiplied by (1−B)^d.
    let mut phi_poly = vec![1.0];
    phi_poly.extend(ar.iter().map(|c| -c));
    let diff_poly = difference_polynomial(d);
    let mut full = vec![0.0; phi_poly.len() + diff_poly.len() - 1];
    for (i, a) in phi_poly.iter().enumerate() {
        for (j, b) in diff_poly.iter().enumerate() {
            full[i + j] += a * b;
        }
    }
    // Recursion coefficients: ψⱼ = θⱼ + Σ φ*ᵢ ψⱼ₋ᵢ with φ*ᵢ = −full[i].
    let phi_star: Vec<f64> = full.iter().skip(1).map(|c| -c).collect();

    let mut psi = Vec::with_capacity(horizon);
    for j in 0..horizon {
        let mut value = if j == 0 {
            1.0
        } else {
            ma.get(j - 1).copied().unwrap_or(0.0)
        };
        for (i, phi) in phi_star.iter().enumerate() {
            let lag = i + 1;
            if lag > j {
                break;
            }
            value += phi * psi[j - lag];
        }
        psi.push(value);
    }
    psi
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SERIES: [f64; 10] = [0.0, 1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0, 5.0];

    #[test]
    fn psi_white_noise() {
        assert_eq!(psi_weights(&[], &[], 0, 3), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn psi_random_walk() {
        assert_eq!(psi_weights(&[], &[], 1, 4), vec![1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn psi_ar1_geometric() {
        let psi = psi_weights(&[0.5], &[], 0, 4);
        for (j, w) in psi.iter().enumerate() {
            assert_abs_diff_eq!(*w, 0.5f64.powi(j as i32), epsilon = 1e-12);
        }
    }

    #[test]
    fn psi_ma1_truncates() {
        assert_eq!(psi_weights(&[], &[0.4], 0, 4), vec![1.0, 0.4, 0.0, 0.0]);
    }

    #[test]
    fn psi_arima111() {
        // (1 − 0.5B)(1 − B) = 1 − 1.5B + 0.5B²
        let psi = psi_weights(&[0.5], &[0.2], 1, 4);
        assert_abs_diff_eq!(psi[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(psi[1], 0.2 + 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(psi[2], 1.5 * 1.7 - 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(psi[3], 1.5 * psi[2] - 0.5 * 1.7, epsilon = 1e-12);
    }

    #[test]
    fn horizon_zero_is_empty() {
        let fit = ArimaOrder::new(0, 1, 0).fit(&SERIES).unwrap();
        let fc = forecast(&fit, 0, &[0.95]).unwrap();
        assert!(fc.is_empty());
        assert!(fc.std_errors().is_empty());
        assert_eq!(fc.bands().len(), 1);
        assert!(fc.bands()[0].lower().is_empty());
    }

    #[test]
    fn level_one_fails_fast() {
        let fit = ArimaOrder::new(0, 1, 0).fit(&SERIES).unwrap();
        assert_eq!(
            forecast(&fit, 5, &[0.8, 1.0]).unwrap_err(),
            ArimaError::InvalidConfidenceLevel { level: 1.0 }
        );
        assert!(matches!(
            forecast(&fit, 5, &[0.0]),
            Err(ArimaError::InvalidConfidenceLevel { .. })
        ));
        assert!(matches!(
            forecast(&fit, 5, &[f64::NAN]),
            Err(ArimaError::InvalidConfidenceLevel { .. })
        ));
    }

    #[test]
    fn random_walk_with_drift() {
        let fit = ArimaOrder::new(0, 1, 0).fit(&SERIES).unwrap();
        let drift = 5.0 / 9.0;
        let fc = forecast(&fit, 3, &[0.95]).unwrap();
        for (h, p) in fc.points().iter().enumerate() {
            assert_abs_diff_eq!(*p, 5.0 + drift * (h + 1) as f64, epsilon = 1e-10);
        }
        let sigma = fit.sigma2().sqrt();
        for (h, se) in fc.std_errors().iter().enumerate() {
            assert_abs_diff_eq!(*se, sigma * ((h + 1) as f64).sqrt(), epsilon = 1e-10);
        }
    }

    #[test]
    fn ar1_forecast_decays_to_mean() {
        let series: Vec<f64> = (0..40).map(|t| 10.0 + (0.9 * t as f64).sin()).collect();
        let fit = ArimaFit::from_parts(
            ArimaOrder::new(1, 0, 0),
            vec![0.5],
            vec![],
            1.0,
            10.0,
            0.0,
            &series,
        );
        let fc = forecast(&fit, 30, &[0.9]).unwrap();
        let last = series[series.len() - 1] - 10.0;
        assert_abs_diff_eq!(fc.points()[0], 10.0 + 0.5 * last, epsilon = 1e-12);
        assert_abs_diff_eq!(fc.points()[29], 10.0, epsilon = 1e-6);
        // Stationary AR(1): variance converges to σ²/(1−φ²).
        assert_abs_diff_eq!(fc.std_errors()[29], (1.0f64 / 0.75).sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn ma1_forecast_matches_exact_filter() {
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
        let fc = forecast(&fit, 2, &[0.9]).unwrap();
        // Zero pre-sample errors would give θ·0.5 = 0.25 for the first step.
        let f3 = 1.25 - 0.25 / 1.05;
        let v3 = 1.0 - 0.3 / 1.05;
        assert_abs_diff_eq!(fc.points()[0], 0.5 * v3 / f3, epsilon = 1e-12);
        assert_abs_diff_eq!(fc.points()[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn bands_are_symmetric_and_nested() {
        let fit = ArimaFit::from_parts(
            ArimaOrder::new(1, 1, 1),
            vec![0.4],
            vec![0.3],
            0.5,
            0.2,
            0.0,
            &SERIES,
        );
        let fc = forecast(&fit, 6, &[0.8, 0.95]).unwrap();
        let (narrow, wide) = (&fc.bands()[0], &fc.bands()[1]);
        for h in 0..6 {
            let p = fc.points()[h];
            assert_abs_diff_eq!(p - narrow.lower()[h], narrow.upper()[h] - p, epsilon = 1e-9);
            assert!(wide.lower()[h] < narrow.lower()[h]);
            assert!(wide.upper()[h] > narrow.upper()[h]);
            if h > 0 {
                let w0 = narrow.upper()[h - 1] - narrow.lower()[h - 1];
                let w1 = narrow.upper()[h] - narrow.lower()[h];
                assert!(w1 >= w0);
            }
        }
        let triples = fc.triples(0.95).unwrap();
        assert_eq!(triples.len(), 6);
        assert_eq!(triples[0].0, fc.points()[0]);
        assert!(fc.triples(0.5).is_none());
    }

    #[test]
    fn malformed_model_is_fatal() {
        let fit = ArimaFit::from_parts(
            ArimaOrder::new(0, 0, 0),
            vec![],
            vec![],
            f64::NAN,
            0.0,
            0.0,
            &SERIES,
        );
        assert!(matches!(
            forecast(&fit, 3, &[0.95]),
            Err(ArimaError::MalformedModel { .. })
        ));
    }
}
