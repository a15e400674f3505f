//! Discrete differencing and its inverse.

use crate::error::ArimaError;

/// Applies the first-difference operator `d` times.
///
/// Each pass replaces element `i` with `x[i] - x[i-1]` and drops the
/// undefined leading element, so the output has length `n - d`. `d = 0`
/// returns a copy of the input.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`ArimaError::InsufficientLength`] | `series.len() <= d` |
///
/// # Example
///
/// ```
/// use epicast_arima::difference;
///
/// let diffed = difference(&[1.0, 4.0, 9.0, 16.0], 1).unwrap();
/// assert_eq!(diffed, vec![3.0, 5.0, 7.0]);
/// ```
pub fn difference(series: &[f64], d: usize) -> Result<Vec<f64>, ArimaError> {
    if series.len() <= d {
        return Err(ArimaError::InsufficientLength {
            n: series.len(),
            min: d + 1,
        });
    }
    Ok(difference_unchecked(series, d))
}

pub(crate) fn difference_unchecked(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Reverses [`difference`] by repeated cumulative summation.
///
/// `seed` holds the first `d` original-scale values lost during
/// differencing. The output is the full original-scale series of length
/// `differenced.len() + d`, starting with the seed itself, so that
/// `integrate(&difference(x, d)?, d, &x[..d])? == x`.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`ArimaError::SeedLength`] | `seed.len() != d` |
pub fn integrate(differenced: &[f64], d: usize, seed: &[f64]) -> Result<Vec<f64>, ArimaError> {
    if seed.len() != d {
        return Err(ArimaError::SeedLength {
            expected: d,
            got: seed.len(),
        });
    }

    let mut current = differenced.to_vec();
    for level in (0..d).rev() {
        // First element of the level-th difference of the seed anchors this pass.
        let anchor = difference_unchecked(seed, level)[0];
        let mut restored = Vec::with_capacity(current.len() + 1);
        restored.push(anchor);
        let mut acc = anchor;
        for v in current {
            acc += v;
            restored.push(acc);
        }
        current = restored;
    }
    Ok(current)
}

/// Integrates a continuation of a differenced series forward from the
/// last `d` original-scale observations in `tail`.
///
/// Returns only the new values (same length as `future`).
pub(crate) fn integrate_from_tail(
    future: &[f64],
    d: usize,
    tail: &[f64],
) -> Result<Vec<f64>, ArimaError> {
    if tail.len() != d {
        return Err(ArimaError::SeedLength {
            expected: d,
            got: tail.len(),
        });
    }

    let mut current = future.to_vec();
    for level in (0..d).rev() {
        let diffs = difference_unchecked(tail, level);
        let mut acc = diffs[diffs.len() - 1];
        for v in current.iter_mut() {
            acc += *v;
            *v = acc;
        }
    }
    Ok(current)
}

/// Coefficients of `(1 - B)^d` in ascending powers of the backshift `B`.
pub(crate) fn difference_polynomial(d: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, &c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }
    poly
}
