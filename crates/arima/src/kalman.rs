//! Kalman filter for ARMA likelihood evaluation.
//!
//! Implements a univariate Kalman filter operating on the state-space
//! representation from [`crate::state_space`]. Used internally by
//! [`ArmaSpec::fit()`](crate::ArmaSpec::fit) to evaluate the exact
//! Gaussian log-likelihood via prediction error decomposition, and by the
//! diagnostics and forecaster for exact one-step errors and the final
//! predicted state. The filter runs with unit innovation variance; `sigma2`
//! is concentrated out.
//!
//! **Not part of the public API.**

use std::f64::consts::PI;

use ndarray::{Array1, Axis};

use crate::error::ArimaError;
use crate::state_space::StateSpace;

/// Result of a full filter pass.
#[derive(Clone, Debug)]
pub(crate) struct KalmanOutput {
    /// Maximum-likelihood innovation variance.
    pub(crate) sigma2: f64,
    /// Exact Gaussian log-likelihood at `sigma2`.
    pub(crate) log_likelihood: f64,
}

/// Sufficient statistics of the prediction error decomposition.
struct Innovations {
    /// `Σ vₜ² / Fₜ`
    weighted_ss: f64,
    /// `Σ ln Fₜ`
    log_det: f64,
    /// Predicted state after the last observation.
    next_state: Array1<f64>,
}

/// Runs the filter over `data`, handing each innovation `vₜ` to `record`.
fn filter<F>(ss: &StateSpace, data: &[f64], mut record: F) -> Result<Innovations, ArimaError>
where
    F: FnMut(f64),
{
    let t = ss.transition();
    let rrt = ss.noise_outer();
    let mut a = Array1::<f64>::zeros(ss.dim());
    let mut p = ss
        .stationary_covariance()
        .ok_or(ArimaError::NonStationaryFit)?;

    let mut weighted_ss = 0.0;
    let mut log_det = 0.0;

    for &y in data {
        let v = y - a[0];
        let f = p[[0, 0]];
        if !f.is_finite() || f <= 0.0 {
            return Err(ArimaError::NumericalDivergence);
        }
        weighted_ss += v * v / f;
        log_det += f.ln();
        record(v);

        // Measurement update, then time update.
        let pz = p.column(0).to_owned();
        let a_filt = &a + &(&pz * (v / f));
        let pz_col = pz.view().insert_axis(Axis(1));
        let pz_row = pz.view().insert_axis(Axis(0));
        let p_filt = &p - &(pz_col.dot(&pz_row) / f);

        a = t.dot(&a_filt);
        p = t.dot(&p_filt).dot(&t.t()) + rrt;
    }

    Ok(Innovations {
        weighted_ss,
        log_det,
        next_state: a,
    })
}

fn concentrate(innov: &Innovations, n: usize) -> KalmanOutput {
    let nf = n as f64;
    let sigma2 = innov.weighted_ss / nf;
    let log_likelihood = -0.5 * nf * ((2.0 * PI).ln() + sigma2.ln() + 1.0) - 0.5 * innov.log_det;
    KalmanOutput {
        sigma2,
        log_likelihood,
    }
}

/// Concentrated log-likelihood of centred `data` under `ss`.
pub(crate) fn kalman_concentrated_loglik(ss: &StateSpace, data: &[f64]) -> Result<f64, ArimaError> {
    let innov = filter(ss, data, |_| {})?;
    Ok(concentrate(&innov, data.len()).log_likelihood)
}

/// Full pass returning the ML innovation variance and log-likelihood.
pub(crate) fn kalman_full(ss: &StateSpace, data: &[f64]) -> Result<KalmanOutput, ArimaError> {
    let innov = filter(ss, data, |_| {})?;
    let output = concentrate(&innov, data.len());
    if !output.log_likelihood.is_finite() || !output.sigma2.is_finite() || output.sigma2 <= 0.0 {
        return Err(ArimaError::NumericalDivergence);
    }
    Ok(output)
}

/// Exact one-step-ahead prediction errors `yₜ − E[yₜ | y₁ … yₜ₋₁]` of
/// centred `data`, starting from the stationary state distribution.
pub(crate) fn one_step_errors(ss: &StateSpace, data: &[f64]) -> Result<Vec<f64>, ArimaError> {
    let mut errors = Vec::with_capacity(data.len());
    filter(ss, data, |v| errors.push(v))?;
    Ok(errors)
}

/// Point forecasts of centred `data` for steps `1..=horizon`.
pub(crate) fn predict(
    ss: &StateSpace,
    data: &[f64],
    horizon: usize,
) -> Result<Vec<f64>, ArimaError> {
    let mut state = filter(ss, data, |_| {})?.next_state;
    let mut points = Vec::with_capacity(horizon);
    for _ in 0..horizon {
        points.push(state[0]);
        state = ss.transition().dot(&state);
    }
    Ok(points)
}
