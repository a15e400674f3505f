//! Dense linear solves for the small systems the Kalman filter needs.
//!
//! **Not part of the public API.**

use ndarray::{Array1, Array2};

/// Pivots smaller than this are treated as singular.
const PIVOT_EPS: f64 = 1e-12;

/// Solves `a · x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` if `a` is (numerically) singular.
pub(crate) fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    debug_assert_eq!(a.shape(), &[n, n]);

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        if a[[pivot, col]].abs() < PIVOT_EPS {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([pivot, k], [col, k]);
            }
            b.swap(pivot, col);
        }

        let diag = a[[col, col]];
        for row in col + 1..n {
            let factor = a[[row, col]] / diag;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::zeros(n);
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in row + 1..n {
            sum -= a[[row, k]] * x[k];
        }
        x[row] = sum / a[[row, row]];
    }
    Some(x)
}

/// Solves the discrete Lyapunov equation `P = T·P·Tᵀ + Q` for `P`.
///
/// Uses the vectorised form `(I - T ⊗ T) vec(P) = vec(Q)`, which is cheap
/// for the state dimensions ARMA models produce. Returns `None` when `T`
/// has an eigenvalue on the unit circle.
pub(crate) fn solve_lyapunov(t: &Array2<f64>, q: &Array2<f64>) -> Option<Array2<f64>> {
    let r = t.nrows();
    let n = r * r;
    let mut lhs = Array2::zeros((n, n));
    for i in 0..r {
        for j in 0..r {
            for k in 0..r {
                for l in 0..r {
                    // Row-major vec: P[i, j] -> i * r + j
                    lhs[[i * r + j, k * r + l]] = -t[[i, k]] * t[[j, l]];
                }
            }
        }
    }
    for i in 0..n {
        lhs[[i, i]] += 1.0;
    }
    let rhs = Array1::from_iter(q.iter().copied());

    let vec_p = solve(lhs, rhs)?;
    let mut p = Array2::zeros((r, r));
    for i in 0..r {
        for j in 0..r {
            // Symmetrise to wash out rounding.
            p[[i, j]] = 0.5 * (vec_p[i * r + j] + vec_p[j * r + i]);
        }
    }
    Some(p)
}
