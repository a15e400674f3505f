//! Reparametrisation between unconstrained optimiser space and
//! stationary/invertible ARMA coefficients.
//!
//! **Not part of the public API.**

/// Reflection coefficients at or beyond this magnitude count as a unit root.
const UNIT_ROOT_TOL: f64 = 1e-6;

/// Smallest root modulus accepted for a fitted AR or MA polynomial.
pub(crate) const ROOT_MARGIN: f64 = 1.01;

/// Maps unconstrained parameters to the coefficients `c` of a stable
/// polynomial `1 - c₁z - … - c_k zᵏ` via partial autocorrelations
/// (Jones 1980, Monahan 1984).
///
/// `r_k = tanh(alpha_k)` places each partial autocorrelation in (-1, 1);
/// the Levinson-Durbin recursion then builds the polynomial, whose roots
/// all lie outside the unit circle.
pub(crate) fn unconstrained_to_coeffs(alpha: &[f64]) -> Vec<f64> {
    let k = alpha.len();
    if k == 0 {
        return Vec::new();
    }

    let r: Vec<f64> = alpha.iter().map(|a| a.tanh()).collect();

    let mut phi = vec![0.0; k];
    let mut prev = vec![0.0; k];
    phi[0] = r[0];

    for m in 1..k {
        prev.copy_from_slice(&phi);
        phi[m] = r[m];
        for j in 0..m {
            phi[j] = prev[j] - r[m] * prev[m - 1 - j];
        }
    }

    phi
}

/// Inverse of the Levinson-Durbin step: recovers the partial
/// autocorrelations of `1 - c₁z - … - c_k zᵏ`.
///
/// Returns `None` as soon as a reflection coefficient reaches magnitude 1,
/// which happens exactly when the polynomial has a root on or inside the
/// unit circle.
pub(crate) fn coeffs_to_pacf(coeffs: &[f64]) -> Option<Vec<f64>> {
    let k = coeffs.len();
    let mut r = vec![0.0; k];
    let mut phi = coeffs.to_vec();

    for m in (0..k).rev() {
        let rm = phi[m];
        if !rm.is_finite() || rm.abs() >= 1.0 - UNIT_ROOT_TOL {
            return None;
        }
        r[m] = rm;
        let denom = 1.0 - rm * rm;
        let prev: Vec<f64> = (0..m)
            .map(|j| (phi[j] + rm * phi[m - 1 - j]) / denom)
            .collect();
        phi.truncate(m);
        phi.copy_from_slice(&prev);
    }

    Some(r)
}

/// Returns `true` when all roots of `1 - φ₁z - … - φ_p zᵖ` lie outside the
/// unit circle.
pub(crate) fn is_stationary(ar: &[f64]) -> bool {
    coeffs_to_pacf(ar).is_some()
}

/// Returns `true` when all roots of `1 + θ₁z + … + θ_q z^q` lie outside the
/// unit circle.
pub(crate) fn is_invertible(ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|t| -t).collect();
    coeffs_to_pacf(&negated).is_some()
}

/// Returns `true` when every root of `1 - c₁z - … - c_k zᵏ` has modulus
/// greater than `radius`.
///
/// The roots of `c(radius·w)` are those of `c(z)` divided by `radius`, so
/// the scaled polynomial is stable exactly when the original clears the
/// circle of that radius.
fn roots_beyond(coeffs: &[f64], radius: f64) -> bool {
    let mut scale = 1.0;
    let scaled: Vec<f64> = coeffs
        .iter()
        .map(|c| {
            scale *= radius;
            c * scale
        })
        .collect();
    coeffs_to_pacf(&scaled).is_some()
}

/// Returns `true` when both polynomials keep every root at least
/// [`ROOT_MARGIN`] from the origin. Fitted estimates must pass this.
pub(crate) fn clears_unit_circle(ar: &[f64], ma: &[f64]) -> bool {
    let negated: Vec<f64> = ma.iter().map(|t| -t).collect();
    roots_beyond(ar, ROOT_MARGIN) && roots_beyond(&negated, ROOT_MARGIN)
}

/// Maps unconstrained parameters to invertible MA coefficients.
///
/// The MA polynomial carries a `+` sign, so the stable coefficients are
/// negated.
pub(crate) fn unconstrained_to_ma(beta: &[f64]) -> Vec<f64> {
    unconstrained_to_coeffs(beta).iter().map(|c| -c).collect()
}

/// Maps stationary AR coefficients back to unconstrained space.
///
/// Returns `None` for non-stationary input.
pub(crate) fn ar_to_unconstrained(ar: &[f64]) -> Option<Vec<f64>> {
    coeffs_to_pacf(ar).map(|r| r.iter().map(|x| x.atanh()).collect())
}
