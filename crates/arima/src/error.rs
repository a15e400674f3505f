//! Error types for the epicast-arima crate.

/// Error type for all fallible operations in the epicast-arima crate.
///
/// Every error is local to a single call: a failed fit never mutates the
/// input series or any other shared state, so the order selector can skip a
/// failing candidate and carry on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArimaError {
    /// Returned when the input data is empty.
    #[error("input data is empty")]
    EmptyData,

    /// Returned when the series is too short for the requested differencing
    /// order or model order.
    #[error("insufficient length: got {n} observations, need at least {min}")]
    InsufficientLength {
        /// Number of observations provided.
        n: usize,
        /// Minimum number of observations required.
        min: usize,
    },

    /// Returned when the input data contains non-finite values (NaN or infinity).
    #[error("input data contains non-finite values")]
    NonFiniteData,

    /// Returned when the input data has zero variance.
    #[error("input data is constant (zero variance)")]
    ConstantData,

    /// Returned when estimated coefficients put a root of the AR or MA
    /// polynomial on or inside the unit circle.
    #[error("fitted model is non-stationary or non-invertible")]
    NonStationaryFit,

    /// Returned when the likelihood optimisation does not converge within
    /// its iteration budget or produces a non-finite likelihood.
    #[error("likelihood optimisation diverged")]
    NumericalDivergence,

    /// Returned when every candidate in the order grid failed to fit.
    #[error("no feasible ARIMA order (max_p={max_p}, max_d={max_d}, max_q={max_q})")]
    NoFeasibleOrder {
        /// Maximum AR order attempted.
        max_p: usize,
        /// Maximum differencing order attempted.
        max_d: usize,
        /// Maximum MA order attempted.
        max_q: usize,
    },

    /// Returned when a confidence level lies outside the open interval (0, 1).
    #[error("confidence level must lie strictly between 0 and 1, got {level}")]
    InvalidConfidenceLevel {
        /// The rejected level.
        level: f64,
    },

    /// Returned when integration is given the wrong number of seed values.
    #[error("integration needs {expected} seed values, got {got}")]
    SeedLength {
        /// Number of seed values required (the differencing order).
        expected: usize,
        /// Number of seed values supplied.
        got: usize,
    },

    /// Returned when a fitted model's parts are inconsistent with its order.
    #[error("malformed model: {reason}")]
    MalformedModel {
        /// Description of the inconsistency.
        reason: String,
    },

    /// Returned when a selection or estimation setting is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
}
