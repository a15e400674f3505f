//! Order selection integration tests.

use std::time::Duration;

use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use epicast_arima::{
    ArimaError, ArimaOrder, CandidateStatus, InformationCriterion, SelectionConfig,
    StationarityCheck, select_order, select_order_with,
};

const EXAMPLE: [f64; 10] = [0.0, 1.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 4.0, 5.0];

fn generate_ar1(phi: f64, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let mut data = vec![0.0; n];
    for t in 1..n {
        data[t] = phi * data[t - 1] + normal.sample(&mut rng);
    }
    data
}

#[test]
fn example_series_returns_valid_order() {
    let order = select_order(&EXAMPLE, 2, 1, 2).unwrap();
    assert!(order.p <= 2 && order.d <= 1 && order.q <= 2);
}

#[test]
fn example_series_compares_small_and_large_orders() {
    let config = SelectionConfig::new(2, 1, 2)
        .with_stationarity(StationarityCheck::None)
        .with_parallel(false);
    let selection = select_order_with(&EXAMPLE, &config).unwrap();
    let orders: Vec<ArimaOrder> = selection.candidates().iter().map(|c| c.order).collect();
    assert!(orders.contains(&ArimaOrder::new(0, 1, 0)));
    assert!(orders.contains(&ArimaOrder::new(2, 1, 2)));
    // The white-noise model on the differences always fits.
    let rw = selection
        .candidates()
        .iter()
        .find(|c| c.order == ArimaOrder::new(0, 1, 0))
        .unwrap();
    assert!(rw.score().is_some());
    assert!(selection.score() <= rw.score().unwrap() + 1e-9);
}

#[test]
fn aic_selects_ar1() {
    let data = generate_ar1(0.7, 1000, 400);
    let config = SelectionConfig::new(2, 0, 2);
    let best = select_order_with(&data, &config).unwrap();
    let order = best.best().order();
    assert!(
        order.p == 1 && (order.q == 0 || order.q == 1),
        "Expected AR(1) or ARMA(1,1) to be selected, got {order}"
    );
}

#[test]
fn bic_prefers_no_larger_model_than_aic() {
    let data = generate_ar1(0.6, 600, 41);
    let aic = select_order_with(&data, &SelectionConfig::new(2, 0, 2)).unwrap();
    let bic = select_order_with(
        &data,
        &SelectionConfig::new(2, 0, 2).with_criterion(InformationCriterion::Bic),
    )
    .unwrap();
    let size = |o: ArimaOrder| o.p + o.q;
    assert!(size(bic.best().order()) <= size(aic.best().order()));
    assert_eq!(bic.criterion(), InformationCriterion::Bic);
}

#[test]
fn random_walk_is_differenced() {
    let increments = generate_ar1(0.0, 500, 77);
    let mut acc = 0.0;
    let walk: Vec<f64> = increments
        .iter()
        .map(|e| {
            acc += e;
            acc
        })
        .collect();
    let config = SelectionConfig::new(1, 2, 1).with_stationarity(StationarityCheck::VarianceRatio);
    let selection = select_order_with(&walk, &config).unwrap();
    assert!(!selection.admissible_d().contains(&0));
    assert!(selection.best().order().d >= 1);
}

#[test]
fn exhausted_budget_skips_candidates() {
    let data = generate_ar1(0.5, 300, 3);
    let config = SelectionConfig::new(3, 0, 3)
        .with_parallel(false)
        .with_time_budget(Duration::from_nanos(1));
    // The first candidate may or may not start before the budget lapses.
    match select_order_with(&data, &config) {
        Ok(selection) => assert!(
            selection
                .candidates()
                .iter()
                .any(|c| c.status == CandidateStatus::Skipped)
        ),
        Err(err) => assert!(matches!(err, ArimaError::NoFeasibleOrder { .. })),
    }
}

#[test]
fn failing_candidates_are_recorded() {
    // Too short for an AR(4).
    let short = [1.0, 3.0, 2.0, 4.0];
    let config = SelectionConfig::new(4, 0, 0)
        .with_stationarity(StationarityCheck::None)
        .with_parallel(false);
    let selection = select_order_with(&short, &config).unwrap();
    let ar4 = selection
        .candidates()
        .iter()
        .find(|c| c.order == ArimaOrder::new(4, 0, 0))
        .unwrap();
    assert_eq!(
        ar4.status,
        CandidateStatus::Failed(ArimaError::InsufficientLength { n: 4, min: 5 })
    );
}
