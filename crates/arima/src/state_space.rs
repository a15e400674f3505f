//! Companion-form state-space model of a zero-mean ARMA(p,q) process.
//!
//! With state dimension `r = max(p, q + 1)`:
//!
//! ```text
//! x[t+1] = T·x[t] + R·e[t],   R = [1, θ₁, …, θ_q, 0, …]ᵀ
//! y[t]   = x[t][0]
//! ```
//!
//! `T` carries `φ` down its first column and ones on the super-diagonal.
//! Only `T` and `R·Rᵀ` are stored; the filter never needs `R` itself.

use ndarray::{Array1, Array2, Axis};

use crate::small_linalg;

#[derive(Clone, Debug)]
pub(crate) struct StateSpace {
    dim: usize,
    transition: Array2<f64>,
    noise_outer: Array2<f64>,
}

impl StateSpace {
    pub(crate) fn new(ar: &[f64], ma: &[f64]) -> Self {
        let dim = ar.len().max(ma.len() + 1);

        let mut transition = Array2::zeros((dim, dim));
        for (i, &phi) in ar.iter().enumerate() {
            transition[[i, 0]] = phi;
        }
        for i in 1..dim {
            transition[[i - 1, i]] = 1.0;
        }

        let noise: Array1<f64> = std::iter::once(1.0)
            .chain(ma.iter().copied())
            .chain(std::iter::repeat(0.0))
            .take(dim)
            .collect();
        let noise_outer = noise
            .view()
            .insert_axis(Axis(1))
            .dot(&noise.view().insert_axis(Axis(0)));

        Self {
            dim,
            transition,
            noise_outer,
        }
    }

    /// State dimension `r`.
    pub(crate) fn dim(&self) -> usize {
        self.dim
    }

    pub(crate) fn transition(&self) -> &Array2<f64> {
        &self.transition
    }

    /// `R·Rᵀ`, rank one.
    pub(crate) fn noise_outer(&self) -> &Array2<f64> {
        &self.noise_outer
    }

    /// Unconditional state covariance in units of `σ²`, solving
    /// `P = T·P·Tᵀ + R·Rᵀ`. `None` when the AR part has a unit root.
    pub(crate) fn stationary_covariance(&self) -> Option<Array2<f64>> {
        small_linalg::solve_lyapunov(&self.transition, &self.noise_outer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn white_noise_is_one_dimensional() {
        let ss = StateSpace::new(&[], &[]);
        assert_eq!(ss.dim(), 1);
        assert_abs_diff_eq!(ss.transition()[[0, 0]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ss.noise_outer()[[0, 0]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn ar2_companion_matrix() {
        let ss = StateSpace::new(&[0.6, -0.2], &[]);
        assert_eq!(ss.dim(), 2);
        let t = ss.transition();
        assert_abs_diff_eq!(t[[0, 0]], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(t[[1, 0]], -0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(t[[0, 1]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(t[[1, 1]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ss.noise_outer()[[1, 1]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn ma_order_sets_dimension() {
        let ss = StateSpace::new(&[0.5], &[0.4, 0.2]);
        assert_eq!(ss.dim(), 3);
        assert_abs_diff_eq!(ss.transition()[[1, 2]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ss.noise_outer()[[0, 2]], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn noise_outer_is_rank_one() {
        let ss = StateSpace::new(&[0.5, -0.3], &[0.4]);
        let r = [1.0, 0.4];
        for i in 0..ss.dim() {
            for j in 0..ss.dim() {
                assert_abs_diff_eq!(ss.noise_outer()[[i, j]], r[i] * r[j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn stationary_variance_of_ar1() {
        // Var(y) = 1 / (1 - φ²)
        let ss = StateSpace::new(&[0.8], &[]);
        let p0 = ss.stationary_covariance().unwrap();
        assert_abs_diff_eq!(p0[[0, 0]], 1.0 / 0.36, epsilon = 1e-10);
    }

    #[test]
    fn stationary_variance_of_ma1() {
        // Var(y) = 1 + θ²
        let ss = StateSpace::new(&[], &[0.6]);
        let p0 = ss.stationary_covariance().unwrap();
        assert_abs_diff_eq!(p0[[0, 0]], 1.36, epsilon = 1e-10);
    }

    #[test]
    fn stationary_variance_of_arma11() {
        // Var(y) = (1 + 2φθ + θ²) / (1 - φ²)
        let (phi, theta) = (0.7, 0.3);
        let ss = StateSpace::new(&[phi], &[theta]);
        let p0 = ss.stationary_covariance().unwrap();
        let expected = (1.0 + 2.0 * phi * theta + theta * theta) / (1.0 - phi * phi);
        assert_abs_diff_eq!(p0[[0, 0]], expected, epsilon = 1e-10);
    }

    #[test]
    fn unit_root_has_no_stationary_covariance() {
        assert!(StateSpace::new(&[1.0], &[]).stationary_covariance().is_none());
    }
}
