//! Moment-conserving factorization of the self-energy

extern crate nalgebra as na;

use na::{DMatrix, DVector};

use crate::linalg::{eigh, scale_columns};

/// Eigenvalues of `V` below this fraction of the largest (or of one, when
/// that is larger) are treated as numerically zero.
const RANK_TOL: f64 = 1e-14;

/// Find poles `(e, C)` with `C Cᵀ = V` and `C diag(e) Cᵀ = VE` on the range of
/// the positive semi-definite matrix `V`.
///
/// `V` is orthogonalized by its eigendecomposition, `VE` is projected into
/// the resulting orthonormal basis and diagonalized there. At most `V.nrows()`
/// poles are returned; a zero `V` yields none.
pub fn factorize_moments(v: &DMatrix<f64>, ve: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let n = v.nrows();
    let (w, q) = eigh(0.5 * (v + v.transpose()));

    let wmax = w.iter().copied().fold(0.0, f64::max);
    let cutoff = RANK_TOL * wmax.max(1.0);
    let keep: Vec<usize> = (0..w.len()).filter(|&k| w[k] > cutoff).collect();
    if keep.is_empty() {
        return (DVector::zeros(0), DMatrix::zeros(n, 0));
    }

    let qk = q.select_columns(&keep);
    let sqrt_w = DVector::from_fn(keep.len(), |k, _| w[keep[k]].sqrt());
    let inv_sqrt_w = sqrt_w.map(|x| 1.0 / x);

    let ortho = scale_columns(&qk, &inv_sqrt_w);
    let m = ortho.transpose() * ve * &ortho;
    let (e, u) = eigh(0.5 * (&m + m.transpose()));

    let coupling = scale_columns(&qk, &sqrt_w) * u;
    (e, coupling)
}
