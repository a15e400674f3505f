//! # epicast-arima
//!
//! ARIMA(p,d,q) estimation, order selection, forecasting and residual
//! diagnostics via state-space maximum likelihood (Kalman filter).
//!
//! ## Workflow
//!
//! ```mermaid
//! graph LR
//!     S["series"] --> D["difference(&series, d)?"]
//!     S --> O["select_order_with(&series, &config)?"]
//!     O -->|"grid search"| F["ArimaFit"]
//!     S -->|"ArimaOrder::fit(&series)?"| F
//!     F --> FC["forecast(&fit, h, &levels)?"]
//!     F --> R["residuals(&fit)?"]
//!     R --> A["autocorrelation(&resid, max_lag)?"]
//! ```
//!
//! ## Two Usage Paths
//!
//! **Direct fit** (known order):
//! ```ignore
//! let fit = ArimaOrder::new(1, 1, 0).fit(&series)?;
//! ```
//!
//! **Grid search** (unknown order):
//! ```ignore
//! let selection = select_order_with(&series, &SelectionConfig::new(3, 2, 3))?;
//! let fit = selection.best();
//! ```
//!
//! ## Mathematical Glossary
//!
//! | Symbol | Accessor | Meaning |
//! |--------|----------|---------|
//! | phi | [`ArimaFit::ar()`] | AR coefficients: weights on past (differenced) observations |
//! | theta | [`ArimaFit::ma()`] | MA coefficients: weights on past forecast errors |
//! | sigma2 | [`ArimaFit::sigma2()`] | Innovation (white-noise) variance |
//! | mu | [`ArimaFit::mean()`] | Mean of the differenced series |
//! | AIC | [`ArimaFit::aic()`] | Akaike Information Criterion (lower = better) |
//! | psi | [`ForecastResult::std_errors()`] | MA(∞) weights driving forecast variance |

mod diagnostics;
mod difference;
mod error;
mod fit;
mod forecast;
mod model;
mod selection;
mod spec;
mod stationarity;

pub(crate) mod kalman;
pub(crate) mod optimizer;
pub(crate) mod params;
pub(crate) mod small_linalg;
pub(crate) mod state_space;

pub use diagnostics::{
    AcfPoint, AdequacyReport, LjungBox, ResidualSeries, adequacy, autocorrelation, ljung_box,
    residuals, significance_band,
};
pub use difference::{difference, integrate};
pub use error::ArimaError;
pub use fit::ArmaFit;
pub use forecast::{ForecastResult, PredictionBand, forecast};
pub use model::ArimaFit;
pub use selection::{
    Candidate, CandidateStatus, InformationCriterion, Selection, SelectionConfig, select_order,
    select_order_with,
};
pub use spec::{ArimaOrder, ArmaSpec, DEFAULT_MAX_ITERS};
pub use stationarity::{KPSS_CRITICAL_5PCT, KpssResult, StationarityCheck, kpss};
