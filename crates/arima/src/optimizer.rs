//! Nelder-Mead optimizer for ARMA maximum-likelihood estimation.
//!
//! Wraps the `argmin` crate to minimize the negative concentrated
//! log-likelihood over unconstrained PACF parameters.
//!
//! **Not part of the public API.**

use argmin::core::{CostFunction, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use tracing::debug;

use crate::diagnostics::autocovariances;
use crate::error::ArimaError;
use crate::fit::ArmaFit;
use crate::kalman;
use crate::params;
use crate::spec::ArmaSpec;
use crate::state_space::StateSpace;

/// Ridge weight on the unconstrained parameters for the boundary retry.
const RIDGE_PENALTY: f64 = 0.5;

/// Bound on unconstrained starting values, `atanh(0.95)`.
const START_BOUND: f64 = 1.83;

/// Fits an ARMA(p,q) model to data via exact MLE.
///
/// This is the full pipeline:
/// 1. Validate data
/// 2. Center (subtract mean)
/// 3. Optimize concentrated log-likelihood via Nelder-Mead, starting from
///    Yule-Walker estimates for the AR part
/// 4. Reject solutions with a root within 1% of the unit circle (one
///    ridge-penalised retry first)
/// 5. Extract final parameters via full Kalman pass
#[tracing::instrument(level = "debug", skip(data), fields(n = data.len()))]
pub(crate) fn fit_arma(
    p: usize,
    q: usize,
    data: &[f64],
    max_iters: u64,
) -> Result<ArmaFit, ArimaError> {
    if data.is_empty() {
        return Err(ArimaError::EmptyData);
    }
    if data.iter().any(|x| !x.is_finite()) {
        return Err(ArimaError::NonFiniteData);
    }
    let min_len = p.max(q).max(1) + 1;
    if data.len() < min_len {
        return Err(ArimaError::InsufficientLength {
            n: data.len(),
            min: min_len,
        });
    }
    let min_val = data.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_val = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if (max_val - min_val).abs() < f64::EPSILON {
        return Err(ArimaError::ConstantData);
    }

    let mean = epicast_stats::mean(data);
    let centered: Vec<f64> = data.iter().map(|x| x - mean).collect();
    let spec = ArmaSpec::new(p, q).with_max_iters(max_iters);

    // White noise: closed form, no optimisation.
    if p == 0 && q == 0 {
        let n = data.len() as f64;
        let sigma2 = epicast_stats::population_variance(data);
        let log_likelihood = -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + sigma2.ln() + 1.0);
        return Ok(ArmaFit::new(
            spec,
            vec![],
            vec![],
            sigma2,
            log_likelihood,
            mean,
            data.len(),
        ));
    }

    let start = starting_values(&centered, p, q);

    let (ar, ma) = estimate_inside_margin(p, |penalty| {
        minimize(&centered, p, &start, penalty, max_iters)
    })?;

    let ss = StateSpace::new(&ar, &ma);
    let output = kalman::kalman_full(&ss, &centered)?;
    debug!(
        p,
        q,
        sigma2 = output.sigma2,
        log_likelihood = output.log_likelihood,
        "ARMA fit converged"
    );

    Ok(ArmaFit::new(
        spec,
        ar,
        ma,
        output.sigma2,
        output.log_likelihood,
        mean,
        data.len(),
    ))
}

/// Runs `solve` unpenalised, then once more with the ridge penalty if the
/// estimate has a root within [`params::ROOT_MARGIN`] of the origin.
fn estimate_inside_margin<F>(p: usize, mut solve: F) -> Result<(Vec<f64>, Vec<f64>), ArimaError>
where
    F: FnMut(f64) -> Result<Vec<f64>, ArimaError>,
{
    let (ar, ma) = unpack(&solve(0.0)?, p);
    if params::clears_unit_circle(&ar, &ma) {
        return Ok((ar, ma));
    }
    debug!(?ar, ?ma, "boundary estimate, retrying with ridge penalty");
    let (ar, ma) = unpack(&solve(RIDGE_PENALTY)?, p);
    if params::clears_unit_circle(&ar, &ma) {
        Ok((ar, ma))
    } else {
        debug!(?ar, ?ma, "ridge retry still on the boundary");
        Err(ArimaError::NonStationaryFit)
    }
}

fn unpack(params: &[f64], p: usize) -> (Vec<f64>, Vec<f64>) {
    let (alpha, beta) = params.split_at(p);
    (
        params::unconstrained_to_coeffs(alpha),
        params::unconstrained_to_ma(beta),
    )
}

/// Unconstrained starting point: Yule-Walker estimates for the AR block,
/// zeros for the MA block.
fn starting_values(centered: &[f64], p: usize, q: usize) -> Vec<f64> {
    let mut start = vec![0.0; p + q];
    if let Some(alpha) = params::ar_to_unconstrained(&yule_walker(centered, p)) {
        for (slot, a) in start.iter_mut().zip(alpha) {
            *slot = a.clamp(-START_BOUND, START_BOUND);
        }
    }
    start
}

/// Yule-Walker AR(p) coefficients, solved by the Durbin-Levinson recursion
/// on the sample autocorrelations.
pub(crate) fn yule_walker(data: &[f64], p: usize) -> Vec<f64> {
    if p == 0 {
        return Vec::new();
    }
    let gamma = autocovariances(data, p);
    if gamma[0] <= 0.0 {
        return vec![0.0; p];
    }
    let rho: Vec<f64> = gamma.iter().map(|g| g / gamma[0]).collect();

    let mut phi: Vec<f64> = Vec::with_capacity(p);
    for k in 1..=p {
        let num = rho[k] - (1..k).map(|j| phi[j - 1] * rho[k - j]).sum::<f64>();
        let den = 1.0 - (1..k).map(|j| phi[j - 1] * rho[j]).sum::<f64>();
        let r = if den.abs() > f64::EPSILON { num / den } else { 0.0 };
        let prev = phi.clone();
        for j in 1..k {
            phi[j - 1] = prev[j - 1] - r * prev[k - j - 1];
        }
        phi.push(r);
    }
    phi
}

fn minimize(
    centered: &[f64],
    p: usize,
    start: &[f64],
    penalty: f64,
    max_iters: u64,
) -> Result<Vec<f64>, ArimaError> {
    let dim = start.len();
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(dim + 1);
    simplex.push(start.to_vec());
    for i in 0..dim {
        let mut vertex = start.to_vec();
        vertex[i] += 0.5;
        simplex.push(vertex);
    }

    let cost = ArmaCost {
        data: centered,
        p,
        penalty,
    };

    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(1e-8)
        .map_err(|_| ArimaError::NumericalDivergence)?;
    let result = Executor::new(cost, solver)
        .configure(|state| state.max_iters(max_iters))
        .run()
        .map_err(|_| ArimaError::NumericalDivergence)?;

    let state = result.state();
    if let Some(TerminationReason::MaxItersReached) = state.get_termination_reason() {
        debug!(max_iters, "Nelder-Mead hit its iteration budget");
        return Err(ArimaError::NumericalDivergence);
    }
    if !state.best_cost.is_finite() || state.best_cost >= f64::MAX {
        return Err(ArimaError::NumericalDivergence);
    }

    state
        .best_param
        .clone()
        .ok_or(ArimaError::NumericalDivergence)
}

/// Cost function for argmin: negative concentrated log-likelihood, plus an
/// optional ridge term on the unconstrained parameters.
struct ArmaCost<'a> {
    data: &'a [f64],
    p: usize,
    penalty: f64,
}

impl CostFunction for ArmaCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let (ar, ma) = unpack(params, self.p);
        let ss = StateSpace::new(&ar, &ma);

        let ridge = self.penalty * params.iter().map(|x| x * x).sum::<f64>();
        match kalman::kalman_concentrated_loglik(&ss, self.data) {
            Ok(loglik) if loglik.is_finite() => Ok(-loglik + ridge),
            _ => Ok(f64::MAX),
        }
    }
}
