//! DIIS extrapolation of the spin-stacked Fock matrices

extern crate nalgebra as na;

use na::{DMatrix, DVector};
use tracing::debug;

use crate::linalg::eigh;

/// Eigenvalues of the DIIS matrix below this magnitude are dropped when it
/// is inverted.
const SINGULAR_TOL: f64 = 1e-14;

/// DIIS (Direct Inversion in the Iterative Subspace) over pairs of α and β
/// Fock matrices.
///
/// The error of a vector is its difference to the previously returned one.
/// Extrapolation minimizes `||Σ c_i e_i||²` subject to `Σ c_i = 1`, with the
/// inner product summed over both spins.
#[derive(Debug, Clone)]
pub struct FockDiis {
    fock_matrices: Vec<[DMatrix<f64>; 2]>,
    error_matrices: Vec<[DMatrix<f64>; 2]>,
    previous: Option<[DMatrix<f64>; 2]>,
    space: usize,
    min_space: usize,
}

impl FockDiis {
    pub fn new(space: usize, min_space: usize) -> Self {
        FockDiis {
            fock_matrices: Vec::new(),
            error_matrices: Vec::new(),
            previous: None,
            space: space.max(1),
            min_space,
        }
    }

    /// Number of vectors currently in the subspace.
    pub fn size(&self) -> usize {
        self.fock_matrices.len()
    }

    /// Add `fock` to the subspace and return the extrapolated matrices.
    ///
    /// The first call only records its input. Until `min_space` vectors are
    /// held, the input is returned unchanged.
    pub fn update(&mut self, fock: [DMatrix<f64>; 2]) -> [DMatrix<f64>; 2] {
        let previous = match self.previous.take() {
            Some(previous) => previous,
            None => {
                self.previous = Some(fock.clone());
                return fock;
            }
        };
        let error = [&fock[0] - &previous[0], &fock[1] - &previous[1]];

        if self.size() >= self.space {
            self.fock_matrices.remove(0);
            self.error_matrices.remove(0);
        }
        self.fock_matrices.push(fock.clone());
        self.error_matrices.push(error);

        if self.size() < self.min_space {
            self.previous = Some(previous);
            return fock;
        }

        let extrapolated = self.extrapolate();
        self.previous = Some(extrapolated.clone());
        extrapolated
    }

    fn extrapolate(&self) -> [DMatrix<f64>; 2] {
        let n = self.size();

        // [B  -1] [c]   [ 0]
        // [-1  0] [λ] = [-1]
        let mut b = DMatrix::zeros(n + 1, n + 1);
        for i in 0..n {
            for j in 0..=i {
                let overlap: f64 = (0..2)
                    .map(|s| self.error_matrices[i][s].dot(&self.error_matrices[j][s]))
                    .sum();
                b[(i, j)] = overlap;
                b[(j, i)] = overlap;
            }
            b[(i, n)] = -1.0;
            b[(n, i)] = -1.0;
        }
        let mut rhs = DVector::zeros(n + 1);
        rhs[n] = -1.0;

        let (w, v) = eigh(b);
        let mut coeffs = DVector::zeros(n + 1);
        for k in 0..w.len() {
            if w[k].abs() > SINGULAR_TOL {
                let col = v.column(k);
                coeffs += col * (col.dot(&rhs) / w[k]);
            }
        }

        let mut fock = [
            DMatrix::zeros(self.fock_matrices[0][0].nrows(), self.fock_matrices[0][0].ncols()),
            DMatrix::zeros(self.fock_matrices[0][1].nrows(), self.fock_matrices[0][1].ncols()),
        ];
        for i in 0..n {
            for s in 0..2 {
                fock[s] += &self.fock_matrices[i][s] * coeffs[i];
            }
        }

        debug!("DIIS extrapolation with {} vectors", n);
        fock
    }
}
