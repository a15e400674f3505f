//! Fitted ARMA model results.

use crate::spec::ArmaSpec;

/// A fitted ARMA(p,q) model produced by [`ArmaSpec::fit()`].
///
/// Contains estimated AR (`phi`) and MA (`theta`) coefficients, the
/// innovation variance (`sigma2`), the sample mean the data were centred
/// on, and the maximised exact log-likelihood.
#[derive(Clone, Debug)]
pub struct ArmaFit {
    spec: ArmaSpec,
    ar: Vec<f64>,
    ma: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    mean: f64,
    n_obs: usize,
}

impl ArmaFit {
    /// Creates a new `ArmaFit` (crate-internal constructor).
    pub(crate) fn new(
        spec: ArmaSpec,
        ar: Vec<f64>,
        ma: Vec<f64>,
        sigma2: f64,
        log_likelihood: f64,
        mean: f64,
        n_obs: usize,
    ) -> Self {
        Self {
            spec,
            ar,
            ma,
            sigma2,
            log_likelihood,
            mean,
            n_obs,
        }
    }

    /// Returns the [`ArmaSpec`] that produced this fit.
    pub fn spec(&self) -> ArmaSpec {
        self.spec
    }

    /// Returns the `(p, q)` order of the fitted model.
    pub fn order(&self) -> (usize, usize) {
        (self.spec.p(), self.spec.q())
    }

    /// Returns the AR coefficients (`phi`).
    pub fn ar(&self) -> &[f64] {
        &self.ar
    }

    /// Returns the MA coefficients (`theta`).
    pub fn ma(&self) -> &[f64] {
        &self.ma
    }

    /// Returns the innovation variance (`sigma2`).
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Returns the maximised log-likelihood.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Returns the sample mean the model was centred on.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Returns the number of observations the model was fitted to.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Number of estimated parameters counted by the information
    /// criteria: `p + q + 1` (coefficients plus the innovation variance).
    pub fn n_params(&self) -> usize {
        self.spec.p() + self.spec.q() + 1
    }

    /// Akaike Information Criterion, `-2·logL + 2k`.
    ///
    /// Lower AIC indicates a better trade-off between fit and complexity.
    pub fn aic(&self) -> f64 {
        let k = self.n_params() as f64;
        2.0 * k - 2.0 * self.log_likelihood
    }

    /// Small-sample corrected AIC, `AIC + 2k(k+1)/(n-k-1)`.
    ///
    /// Infinite when `n <= k + 1`.
    pub fn aicc(&self) -> f64 {
        let k = self.n_params() as f64;
        let n = self.n_obs as f64;
        if n - k - 1.0 <= 0.0 {
            return f64::INFINITY;
        }
        self.aic() + 2.0 * k * (k + 1.0) / (n - k - 1.0)
    }

    /// Bayesian Information Criterion, `-2·logL + k·ln(n)`.
    pub fn bic(&self) -> f64 {
        let k = self.n_params() as f64;
        let n = self.n_obs as f64;
        k * n.ln() - 2.0 * self.log_likelihood
    }
}
