//! Statistical helper functions shared by the epicast crates.

use statrs::distribution::{ContinuousCDF, Normal};

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sample variance with N-1 denominator (matching R's `var()`).
/// Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0)
}

/// Variance with N denominator, the maximum-likelihood estimate under a
/// Gaussian model. Returns 0.0 if empty.
pub fn population_variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let nf = data.len() as f64;
    let mean = data.iter().sum::<f64>() / nf;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / nf
}

/// Trailing moving average with a window clamped at the series start.
///
/// Element `i` is the mean of `data[max(0, i + 1 - window)..=i]`, so the
/// first `window - 1` outputs average over a growing window rather than
/// being dropped. Output has the same length as the input.
///
/// # Panics
///
/// Panics if `window` is zero.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<f64> {
    assert!(window > 0, "rolling_mean: window must be positive");
    let mut out = Vec::with_capacity(data.len());
    let mut sum = 0.0;
    for (i, &x) in data.iter().enumerate() {
        sum += x;
        if i >= window {
            sum -= data[i - window];
        }
        let len = (i + 1).min(window);
        out.push(sum / len as f64);
    }
    out
}

/// Two-sided standard normal quantile for a central coverage `level`.
///
/// Returns `z` such that `P(|Z| <= z) = level`, e.g. 1.95996 for 0.95.
/// Returns `None` unless `level` lies strictly inside (0, 1).
pub fn normal_two_sided_quantile(level: f64) -> Option<f64> {
    if !(level > 0.0 && level < 1.0) {
        return None;
    }
    let standard = Normal::standard();
    Some(standard.inverse_cdf(0.5 + level / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_variance_basic() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(variance(&data), 4.571429, epsilon = 1e-4);
    }

    #[test]
    fn test_variance_two() {
        // [3.0, 7.0]: mean=5, sum_sq=8, var=8/1=8
        assert_relative_eq!(variance(&[3.0, 7.0]), 8.0, epsilon = 1e-10);
    }

    #[test]
    fn test_population_variance() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(population_variance(&data), 4.0, epsilon = 1e-12);
        assert_eq!(population_variance(&[]), 0.0);
    }

    #[test]
    fn test_rolling_mean_clamped_start() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = rolling_mean(&data, 3);
        assert_eq!(out.len(), 5);
        assert_relative_eq!(out[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(out[1], 1.5, epsilon = 1e-12);
        assert_relative_eq!(out[2], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[3], 3.0, epsilon = 1e-12);
        assert_relative_eq!(out[4], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rolling_mean_window_one_is_identity() {
        let data = [3.0, -1.0, 7.5];
        assert_eq!(rolling_mean(&data, 1), data.to_vec());
    }

    #[test]
    fn test_rolling_mean_window_longer_than_data() {
        let out = rolling_mean(&[2.0, 4.0], 7);
        assert_relative_eq!(out[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "rolling_mean: window must be positive")]
    fn test_rolling_mean_zero_window_panics() {
        rolling_mean(&[1.0], 0);
    }

    #[test]
    fn test_normal_quantile_known_values() {
        assert_relative_eq!(
            normal_two_sided_quantile(0.95).unwrap(),
            1.959964,
            epsilon = 1e-5
        );
        assert_relative_eq!(
            normal_two_sided_quantile(0.80).unwrap(),
            1.281552,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_normal_quantile_rejects_boundaries() {
        assert!(normal_two_sided_quantile(1.0).is_none());
        assert!(normal_two_sided_quantile(0.0).is_none());
        assert!(normal_two_sided_quantile(f64::NAN).is_none());
        assert!(normal_two_sided_quantile(1.5).is_none());
    }
}
