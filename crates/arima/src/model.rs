//! Fitted ARIMA models.

use crate::difference::difference;
use crate::error::ArimaError;
use crate::fit::ArmaFit;
use crate::params;
use crate::spec::{ArimaOrder, ArmaSpec};

/// A fitted ARIMA(p,d,q) model.
///
/// Pairs the ARMA fit of the differenced series with the original series it
/// was estimated on. The series is borrowed, never copied, so a fit cannot
/// outlive its data.
///
/// ```mermaid
/// graph LR
///     A["ArimaOrder::fit(&series)?"] --> B["ArimaFit"]
///     B --> C["forecast(&fit, h, &levels)?"]
///     B --> D["residuals(&fit)?"]
/// ```
#[derive(Clone, Debug)]
pub struct ArimaFit<'a> {
    order: ArimaOrder,
    arma: ArmaFit,
    series: &'a [f64],
    differenced: Vec<f64>,
}

impl<'a> ArimaFit<'a> {
    pub(crate) fn new(
        order: ArimaOrder,
        arma: ArmaFit,
        series: &'a [f64],
        differenced: Vec<f64>,
    ) -> Self {
        Self {
            order,
            arma,
            series,
            differenced,
        }
    }

    /// Reassembles a model from stored parameters, e.g. ones read back from
    /// a report.
    ///
    /// Nothing is checked here; [`ArimaFit::validate()`] (run by the
    /// forecaster and diagnostics) rejects inconsistent parts.
    pub fn from_parts(
        order: ArimaOrder,
        ar: Vec<f64>,
        ma: Vec<f64>,
        sigma2: f64,
        mean: f64,
        log_likelihood: f64,
        series: &'a [f64],
    ) -> Self {
        let differenced = difference(series, order.d).unwrap_or_default();
        let spec = ArmaSpec::new(order.p, order.q);
        let arma = ArmaFit::new(
            spec,
            ar,
            ma,
            sigma2,
            log_likelihood,
            mean,
            differenced.len(),
        );
        Self {
            order,
            arma,
            series,
            differenced,
        }
    }

    /// Returns the `(p, d, q)` order.
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Returns the AR coefficients (`phi`).
    pub fn ar(&self) -> &[f64] {
        self.arma.ar()
    }

    /// Returns the MA coefficients (`theta`).
    pub fn ma(&self) -> &[f64] {
        self.arma.ma()
    }

    /// Returns the innovation variance (`sigma2`).
    pub fn sigma2(&self) -> f64 {
        self.arma.sigma2()
    }

    /// Returns the mean of the differenced series.
    pub fn mean(&self) -> f64 {
        self.arma.mean()
    }

    /// Returns the maximised log-likelihood.
    pub fn log_likelihood(&self) -> f64 {
        self.arma.log_likelihood()
    }

    /// Akaike Information Criterion.
    pub fn aic(&self) -> f64 {
        self.arma.aic()
    }

    /// Small-sample corrected AIC.
    pub fn aicc(&self) -> f64 {
        self.arma.aicc()
    }

    /// Bayesian Information Criterion.
    pub fn bic(&self) -> f64 {
        self.arma.bic()
    }

    /// Returns the original-scale series the model was fitted on.
    pub fn series(&self) -> &'a [f64] {
        self.series
    }

    /// Returns the series after `d` differences.
    pub fn differenced(&self) -> &[f64] {
        &self.differenced
    }

    /// Returns the underlying ARMA fit.
    pub fn arma(&self) -> &ArmaFit {
        &self.arma
    }

    /// Checks that the parts of the model are mutually consistent and
    /// usable for forecasting.
    ///
    /// # Errors
    ///
    /// [`ArimaError::MalformedModel`] naming the first violated condition.
    pub fn validate(&self) -> Result<(), ArimaError> {
        let malformed = |reason: &str| {
            Err(ArimaError::MalformedModel {
                reason: reason.to_string(),
            })
        };

        if self.ar().len() != self.order.p {
            return malformed("AR coefficient count does not match p");
        }
        if self.ma().len() != self.order.q {
            return malformed("MA coefficient count does not match q");
        }
        if !self.sigma2().is_finite() || self.sigma2() <= 0.0 {
            return malformed("innovation variance must be finite and positive");
        }
        if self
            .ar()
            .iter()
            .chain(self.ma())
            .any(|c| !c.is_finite())
            || !self.mean().is_finite()
        {
            return malformed("non-finite coefficient or mean");
        }
        if !params::is_stationary(self.ar()) {
            return malformed("AR polynomial has a root inside the unit circle");
        }
        if !params::is_invertible(self.ma()) {
            return malformed("MA polynomial has a root inside the unit circle");
        }
        if self.series.len() <= self.order.d
            || self.differenced.len() != self.series.len() - self.order.d
        {
            return malformed("series too short for the differencing order");
        }
        if self.series.iter().any(|x| !x.is_finite()) {
            return malformed("series contains non-finite values");
        }
        Ok(())
    }
}
