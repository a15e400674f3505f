//! Information-criterion based ARIMA order selection.

use std::fmt;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ArimaError;
use crate::fit::ArmaFit;
use crate::model::ArimaFit;
use crate::spec::{ArimaOrder, ArmaSpec, DEFAULT_MAX_ITERS};
use crate::stationarity::StationarityCheck;

/// Relative tolerance under which two scores count as tied.
const TIE_TOL: f64 = 1e-9;

/// Penalised-likelihood score used to rank candidate orders.
///
/// All criteria count `k = p + q + 1` parameters; lower is better.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    /// `-2·logL + 2k`
    #[default]
    Aic,
    /// AIC with the small-sample correction `2k(k+1)/(n-k-1)`.
    Aicc,
    /// `-2·logL + k·ln(n)`
    Bic,
}

impl InformationCriterion {
    /// Scores a fitted ARMA model.
    pub fn score(self, fit: &ArmaFit) -> f64 {
        match self {
            InformationCriterion::Aic => fit.aic(),
            InformationCriterion::Aicc => fit.aicc(),
            InformationCriterion::Bic => fit.bic(),
        }
    }
}

impl fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InformationCriterion::Aic => "AIC",
            InformationCriterion::Aicc => "AICc",
            InformationCriterion::Bic => "BIC",
        };
        f.write_str(name)
    }
}

/// Configuration for the order grid search.
///
/// # Example
///
/// ```
/// use epicast_arima::{InformationCriterion, SelectionConfig, StationarityCheck};
///
/// let config = SelectionConfig::new(2, 1, 2)
///     .with_criterion(InformationCriterion::Bic)
///     .with_stationarity(StationarityCheck::VarianceRatio)
///     .with_parallel(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionConfig {
    max_p: usize,
    max_d: usize,
    max_q: usize,
    criterion: InformationCriterion,
    stationarity: StationarityCheck,
    time_budget: Option<Duration>,
    parallel: bool,
    max_iters: u64,
}

impl SelectionConfig {
    /// Creates a configuration searching `p ∈ 0..=max_p`, `d ∈ 0..=max_d`,
    /// `q ∈ 0..=max_q`.
    ///
    /// Defaults: AIC, KPSS stationarity check, no time budget, parallel
    /// evaluation, 2000 optimiser iterations per fit.
    pub fn new(max_p: usize, max_d: usize, max_q: usize) -> Self {
        Self {
            max_p,
            max_d,
            max_q,
            criterion: InformationCriterion::default(),
            stationarity: StationarityCheck::default(),
            time_budget: None,
            parallel: true,
            max_iters: DEFAULT_MAX_ITERS,
        }
    }

    /// Sets the ranking criterion.
    pub fn with_criterion(mut self, criterion: InformationCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Sets the per-`d` stationarity check.
    pub fn with_stationarity(mut self, stationarity: StationarityCheck) -> Self {
        self.stationarity = stationarity;
        self
    }

    /// Sets a wall-clock budget; candidates not yet started when it runs
    /// out are skipped.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Enables or disables parallel candidate evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the optimiser iteration budget per candidate fit.
    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    // --- Accessors ---

    /// Returns the maximum AR order.
    pub fn max_p(&self) -> usize {
        self.max_p
    }

    /// Returns the maximum differencing order.
    pub fn max_d(&self) -> usize {
        self.max_d
    }

    /// Returns the maximum MA order.
    pub fn max_q(&self) -> usize {
        self.max_q
    }

    /// Returns the ranking criterion.
    pub fn criterion(&self) -> InformationCriterion {
        self.criterion
    }

    /// Returns the stationarity check.
    pub fn stationarity(&self) -> StationarityCheck {
        self.stationarity
    }

    /// Returns the wall-clock budget, if any.
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget
    }

    /// Returns whether candidates are evaluated in parallel.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Returns the optimiser iteration budget per fit.
    pub fn max_iters(&self) -> u64 {
        self.max_iters
    }

    /// Validates this configuration.
    ///
    /// Checks that the iteration budget and the time budget (when set) are
    /// non-zero.
    pub fn validate(&self) -> Result<(), ArimaError> {
        if self.max_iters == 0 {
            return Err(ArimaError::InvalidConfig {
                reason: "max_iters must be positive".to_string(),
            });
        }
        if self.time_budget.is_some_and(|b| b.is_zero()) {
            return Err(ArimaError::InvalidConfig {
                reason: "time budget must be positive".to_string(),
            });
        }
        Ok(())
    }

    fn grid(&self, admissible_d: &[usize]) -> Vec<ArimaOrder> {
        let mut orders = Vec::new();
        for &d in admissible_d {
            for p in 0..=self.max_p {
                for q in 0..=self.max_q {
                    orders.push(ArimaOrder::new(p, d, q));
                }
            }
        }
        orders
    }
}

/// Outcome of one grid candidate.
#[derive(Clone, Debug, PartialEq)]
pub enum CandidateStatus {
    /// The fit converged with this criterion value.
    Scored(f64),
    /// The fit failed; the candidate was skipped.
    Failed(ArimaError),
    /// The time budget ran out before the candidate started.
    Skipped,
}

/// One row of the selection table.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Candidate order.
    pub order: ArimaOrder,
    /// What happened when it was fitted.
    pub status: CandidateStatus,
}

impl Candidate {
    /// Criterion value when the candidate was scored with a finite value.
    pub fn score(&self) -> Option<f64> {
        match self.status {
            CandidateStatus::Scored(s) if s.is_finite() => Some(s),
            _ => None,
        }
    }
}

/// Result of a grid search: the winning fit plus every candidate's outcome
/// in grid order (`d`, then `p`, then `q`).
#[derive(Clone, Debug)]
pub struct Selection<'a> {
    best: ArimaFit<'a>,
    score: f64,
    criterion: InformationCriterion,
    admissible_d: Vec<usize>,
    candidates: Vec<Candidate>,
}

impl<'a> Selection<'a> {
    /// Returns the winning model.
    pub fn best(&self) -> &ArimaFit<'a> {
        &self.best
    }

    /// Consumes the selection, returning the winning model.
    pub fn into_best(self) -> ArimaFit<'a> {
        self.best
    }

    /// Returns the winning criterion value.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns the criterion used for ranking.
    pub fn criterion(&self) -> InformationCriterion {
        self.criterion
    }

    /// Returns the differencing orders that passed the stationarity check
    /// (or the fallback `[max_d]`).
    pub fn admissible_d(&self) -> &[usize] {
        &self.admissible_d
    }

    /// Returns every candidate's outcome.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

/// Selects the ARIMA order minimising AIC over `p ∈ 0..=max_p`,
/// `d ∈ 0..=max_d`, `q ∈ 0..=max_q`.
///
/// Shorthand for [`select_order_with()`] with
/// [`SelectionConfig::new(max_p, max_d, max_q)`](SelectionConfig::new).
///
/// # Example
///
/// ```
/// use epicast_arima::select_order;
///
/// let series = [0.0, 1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0, 5.0];
/// let order = select_order(&series, 2, 1, 2).unwrap();
/// assert!(order.p <= 2 && order.d <= 1 && order.q <= 2);
/// ```
pub fn select_order(
    series: &[f64],
    max_p: usize,
    max_d: usize,
    max_q: usize,
) -> Result<ArimaOrder, ArimaError> {
    select_order_with(series, &SelectionConfig::new(max_p, max_d, max_q))
        .map(|selection| selection.best().order())
}

/// Grid search over ARIMA orders.
///
/// For each `d` that passes the configured stationarity check (all `d`
/// failing falls back to `max_d`), every `(p, q)` is fitted and scored.
/// Failed candidates are recorded and skipped. The winner has the lowest
/// score; near-ties (relative difference below 1e-9) go to the smaller
/// `p + q`, then the smaller `d`, then the smaller `p`.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`ArimaError::InvalidConfig`] | `config.validate()` fails |
/// | [`ArimaError::EmptyData`] | `series` is empty |
/// | [`ArimaError::NonFiniteData`] | any element is NaN or infinite |
/// | [`ArimaError::NoFeasibleOrder`] | no candidate produced a finite score |
#[tracing::instrument(
    level = "info",
    skip(series, config),
    fields(n = series.len(), max_p = config.max_p(), max_d = config.max_d(), max_q = config.max_q())
)]
pub fn select_order_with<'a>(
    series: &'a [f64],
    config: &SelectionConfig,
) -> Result<Selection<'a>, ArimaError> {
    config.validate()?;
    if series.is_empty() {
        return Err(ArimaError::EmptyData);
    }
    if series.iter().any(|x| !x.is_finite()) {
        return Err(ArimaError::NonFiniteData);
    }

    let mut admissible_d: Vec<usize> = (0..=config.max_d)
        .filter(|&d| config.stationarity.accepts(series, d))
        .collect();
    if admissible_d.is_empty() {
        warn!(
            check = %config.stationarity,
            max_d = config.max_d,
            "no differencing order passed the stationarity check, falling back to max_d"
        );
        admissible_d.push(config.max_d);
    }
    debug!(?admissible_d, "admissible differencing orders");

    let orders = config.grid(&admissible_d);
    let started = Instant::now();
    let evaluate = |order: &ArimaOrder| evaluate_candidate(series, *order, config, started);

    let outcomes: Vec<(Candidate, Option<ArimaFit<'a>>)> = if config.parallel {
        orders.par_iter().map(evaluate).collect()
    } else {
        orders.iter().map(evaluate).collect()
    };

    let skipped = outcomes
        .iter()
        .filter(|(c, _)| c.status == CandidateStatus::Skipped)
        .count();
    if skipped > 0 {
        warn!(
            skipped,
            total = outcomes.len(),
            "time budget exhausted, remaining candidates skipped"
        );
    }

    let mut best: Option<(ArimaOrder, f64)> = None;
    for (candidate, _) in &outcomes {
        if let Some(score) = candidate.score() {
            let replace = match best {
                None => true,
                Some((order, incumbent)) => {
                    is_better((candidate.order, score), (order, incumbent))
                }
            };
            if replace {
                best = Some((candidate.order, score));
            }
        }
    }

    let Some((best_order, best_score)) = best else {
        return Err(ArimaError::NoFeasibleOrder {
            max_p: config.max_p,
            max_d: config.max_d,
            max_q: config.max_q,
        });
    };

    let mut candidates = Vec::with_capacity(outcomes.len());
    let mut best_fit = None;
    for (candidate, fit) in outcomes {
        if candidate.order == best_order {
            best_fit = fit;
        }
        candidates.push(candidate);
    }
    let best_fit = best_fit.ok_or(ArimaError::NoFeasibleOrder {
        max_p: config.max_p,
        max_d: config.max_d,
        max_q: config.max_q,
    })?;

    info!(
        order = %best_order,
        criterion = %config.criterion,
        score = best_score,
        "selected ARIMA order"
    );

    Ok(Selection {
        best: best_fit,
        score: best_score,
        criterion: config.criterion,
        admissible_d,
        candidates,
    })
}

fn evaluate_candidate<'a>(
    series: &'a [f64],
    order: ArimaOrder,
    config: &SelectionConfig,
    started: Instant,
) -> (Candidate, Option<ArimaFit<'a>>) {
    if config.time_budget.is_some_and(|b| started.elapsed() >= b) {
        let candidate = Candidate {
            order,
            status: CandidateStatus::Skipped,
        };
        return (candidate, None);
    }

    let spec = ArmaSpec::new(order.p, order.q).with_max_iters(config.max_iters);
    match order.fit_with(series, spec) {
        Ok(fit) => {
            let score = config.criterion.score(fit.arma());
            debug!(order = %order, score, "candidate fitted");
            let candidate = Candidate {
                order,
                status: CandidateStatus::Scored(score),
            };
            (candidate, Some(fit))
        }
        Err(err) => {
            debug!(order = %order, error = %err, "candidate failed");
            let candidate = Candidate {
                order,
                status: CandidateStatus::Failed(err),
            };
            (candidate, None)
        }
    }
}

/// True when `a` should replace the incumbent `b`.
fn is_better(a: (ArimaOrder, f64), b: (ArimaOrder, f64)) -> bool {
    let (oa, sa) = a;
    let (ob, sb) = b;
    let scale = sa.abs().max(sb.abs()).max(1.0);
    if (sa - sb).abs() > TIE_TOL * scale {
        return sa < sb;
    }
    let key = |o: ArimaOrder| (o.p + o.q, o.d, o.p, o.q);
    key(oa) < key(ob)
}
