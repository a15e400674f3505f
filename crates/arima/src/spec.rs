//! Model specifications (unfitted).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::difference::difference;
use crate::error::ArimaError;
use crate::fit::ArmaFit;
use crate::model::ArimaFit;

/// Default Nelder-Mead iteration budget per fit.
pub const DEFAULT_MAX_ITERS: u64 = 2000;

/// An unfitted ARMA(p,q) model specification.
///
/// This is the entry point of the estimator. Create a spec with
/// [`ArmaSpec::new()`], then call [`ArmaSpec::fit()`] on an (already
/// differenced) series to obtain an [`ArmaFit`].
///
/// ```mermaid
/// graph LR
///     A["ArmaSpec::new(p, q)"] -->|".fit(&data)?"| B["ArmaFit"]
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmaSpec {
    p: usize,
    q: usize,
    max_iters: u64,
}

impl ArmaSpec {
    /// Creates a new ARMA(p,q) specification with AR order `p` and MA order `q`.
    ///
    /// # Example
    ///
    /// ```
    /// use epicast_arima::ArmaSpec;
    ///
    /// let spec = ArmaSpec::new(2, 1);
    /// assert_eq!(spec.p(), 2);
    /// assert_eq!(spec.q(), 1);
    /// ```
    pub fn new(p: usize, q: usize) -> Self {
        Self {
            p,
            q,
            max_iters: DEFAULT_MAX_ITERS,
        }
    }

    /// Sets the optimiser iteration budget.
    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Returns the AR order (`p`).
    pub fn p(&self) -> usize {
        self.p
    }

    /// Returns the MA order (`q`).
    pub fn q(&self) -> usize {
        self.q
    }

    /// Returns the optimiser iteration budget.
    pub fn max_iters(&self) -> u64 {
        self.max_iters
    }

    /// Fits this ARMA(p,q) specification to a stationary series via exact
    /// maximum likelihood (Kalman filter).
    ///
    /// The series is centred on its sample mean first; the mean is kept on
    /// the fit. No state is shared between calls.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ArimaError::EmptyData`] | `data` is empty |
    /// | [`ArimaError::InsufficientLength`] | `data.len() < max(p, q, 1) + 1` |
    /// | [`ArimaError::NonFiniteData`] | any element is NaN or infinite |
    /// | [`ArimaError::ConstantData`] | all elements are identical |
    /// | [`ArimaError::NonStationaryFit`] | estimate sits on the stationarity/invertibility boundary |
    /// | [`ArimaError::NumericalDivergence`] | optimiser exhausts its budget or the likelihood is non-finite |
    pub fn fit(&self, data: &[f64]) -> Result<ArmaFit, ArimaError> {
        crate::optimizer::fit_arma(self.p, self.q, data, self.max_iters)
    }
}

/// ARIMA model order `(p, d, q)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// Moving-average order.
    pub q: usize,
}

impl ArimaOrder {
    /// Creates a new `(p, d, q)` order.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of ARMA coefficients, `p + q`.
    pub fn n_coefficients(&self) -> usize {
        self.p + self.q
    }

    /// Differences `series` `d` times and fits ARMA(p,q) to the result.
    ///
    /// The returned [`ArimaFit`] borrows `series` so that forecasts can be
    /// integrated back onto the original scale.
    ///
    /// # Errors
    ///
    /// [`ArimaError::InsufficientLength`] when `series.len() <= d`, plus any
    /// error from [`ArmaSpec::fit()`].
    ///
    /// # Example
    ///
    /// ```
    /// use epicast_arima::ArimaOrder;
    ///
    /// let series = [0.0, 1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0, 5.0];
    /// let fit = ArimaOrder::new(0, 1, 0).fit(&series).unwrap();
    /// assert_eq!(fit.order(), ArimaOrder::new(0, 1, 0));
    /// ```
    pub fn fit<'a>(&self, series: &'a [f64]) -> Result<ArimaFit<'a>, ArimaError> {
        self.fit_with(series, ArmaSpec::new(self.p, self.q))
    }

    /// Like [`ArimaOrder::fit()`] with an explicit Nelder-Mead iteration
    /// budget.
    ///
    /// # Errors
    ///
    /// As [`ArimaOrder::fit()`].
    pub fn fit_with_max_iters<'a>(
        &self,
        series: &'a [f64],
        max_iters: u64,
    ) -> Result<ArimaFit<'a>, ArimaError> {
        self.fit_with(
            series,
            ArmaSpec::new(self.p, self.q).with_max_iters(max_iters),
        )
    }

    /// Like [`ArimaOrder::fit()`] but with a custom estimator spec; the
    /// spec's orders must match `self`.
    pub(crate) fn fit_with<'a>(
        &self,
        series: &'a [f64],
        spec: ArmaSpec,
    ) -> Result<ArimaFit<'a>, ArimaError> {
        debug_assert_eq!((spec.p(), spec.q()), (self.p, self.q));
        let differenced = difference(series, self.d)?;
        let arma = spec.fit(&differenced)?;
        Ok(ArimaFit::new(*self, arma, series, differenced))
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}
