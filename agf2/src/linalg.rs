//! Small dense linear-algebra helpers shared by the solvers.

extern crate nalgebra as na;

use na::{DMatrix, DVector};
use std::cmp::Ordering;

/// Diagonalize a real symmetric matrix, returning eigenvalues in ascending
/// order together with the matching eigenvector columns.
pub fn eigh(matrix: DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let n = matrix.nrows();
    if n == 0 {
        return (DVector::zeros(0), DMatrix::zeros(0, 0));
    }

    let eig = matrix.symmetric_eigen();

    let mut indices: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    indices.sort_by(|&a, &b| {
        eig.eigenvalues[a]
            .partial_cmp(&eig.eigenvalues[b])
            .unwrap_or(Ordering::Equal)
    });
    let sorted_eigenvalues =
        DVector::from_fn(eig.eigenvalues.len(), |i, _| eig.eigenvalues[indices[i]]);
    let sorted_eigenvectors = eig.eigenvectors.select_columns(&indices);

    (sorted_eigenvalues, sorted_eigenvectors)
}

/// Scale column `k` of `matrix` by `factors[k]`.
pub fn scale_columns(matrix: &DMatrix<f64>, factors: &DVector<f64>) -> DMatrix<f64> {
    let mut scaled = matrix.clone();
    for (k, mut col) in scaled.column_iter_mut().enumerate() {
        col *= factors[k];
    }
    scaled
}

/// Largest elementwise absolute difference between two equally shaped matrices.
pub fn max_abs_diff(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eigh_sorted_and_orthonormal() {
        let m = DMatrix::from_row_slice(3, 3, &[2.0, 1.0, 0.0, 1.0, -1.0, 0.5, 0.0, 0.5, 3.0]);
        let (w, v) = eigh(m.clone());

        for k in 1..w.len() {
            assert!(w[k - 1] <= w[k]);
        }
        let recon = &v * DMatrix::from_diagonal(&w) * v.transpose();
        assert!(max_abs_diff(&recon, &m) < 1e-12);
        let overlap = v.transpose() * &v;
        assert!(max_abs_diff(&overlap, &DMatrix::identity(3, 3)) < 1e-12);
    }

    #[test]
    fn test_eigh_empty() {
        let (w, v) = eigh(DMatrix::zeros(0, 0));
        assert_eq!(w.len(), 0);
        assert_eq!(v.ncols(), 0);
    }
}
