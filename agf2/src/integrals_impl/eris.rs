//! Spin-resolved integral container and the mean-field Fock builder

extern crate nalgebra as na;

use na::DMatrix;
use rayon::prelude::*;
use tracing::{info, warn};

use super::Tensor4;
use crate::energy_impl::one_body_energy;
use crate::error::{Agf2Error, Result};
use crate::linalg::eigh;

/// Gaps between the reference HOMO and LUMO below this trigger a warning.
const HOMO_LUMO_GAP_WARN: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    Alpha,
    Beta,
}

impl Spin {
    pub const BOTH: [Spin; 2] = [Spin::Alpha, Spin::Beta];

    pub fn index(self) -> usize {
        match self {
            Spin::Alpha => 0,
            Spin::Beta => 1,
        }
    }

    pub fn other(self) -> Spin {
        match self {
            Spin::Alpha => Spin::Beta,
            Spin::Beta => Spin::Alpha,
        }
    }

    /// Single-letter tag used in dataset keys.
    pub fn tag(self) -> char {
        match self {
            Spin::Alpha => 'a',
            Spin::Beta => 'b',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Spin::Alpha => "alpha",
            Spin::Beta => "beta",
        }
    }
}

/// Molecular-orbital integrals of an unrestricted reference.
///
/// The αβ block is stored as `(p_α q_α | r_β s_β)`; the βα block is its pair
/// transpose. Nothing in the container changes after construction.
#[derive(Debug, Clone)]
pub struct Eris {
    pub nmo: [usize; 2],
    pub nocc: [usize; 2],
    pub h1e: [DMatrix<f64>; 2],
    pub fock: [DMatrix<f64>; 2],
    pub eri_aa: Tensor4,
    pub eri_ab: Tensor4,
    pub eri_ba: Tensor4,
    pub eri_bb: Tensor4,
    pub e_hf: f64,
    pub e_nuc: f64,
}

impl Eris {
    pub fn new(
        h1e: [DMatrix<f64>; 2],
        eri_aa: Tensor4,
        eri_ab: Tensor4,
        eri_bb: Tensor4,
        nocc: [usize; 2],
        e_nuc: f64,
    ) -> Result<Self> {
        let nmo = [h1e[0].nrows(), h1e[1].nrows()];

        for spin in Spin::BOTH {
            let s = spin.index();
            let h = &h1e[s];
            if h.ncols() != nmo[s] {
                return Err(Agf2Error::shape(
                    format!("h1e ({})", spin.label()),
                    &[nmo[s], nmo[s]],
                    &[h.nrows(), h.ncols()],
                ));
            }
            if nocc[s] > nmo[s] {
                return Err(Agf2Error::shape(
                    format!("occupied orbitals ({})", spin.label()),
                    &[nmo[s]],
                    &[nocc[s]],
                ));
            }
        }

        let (na, nb) = (nmo[0], nmo[1]);
        for (what, tensor, expected) in [
            ("eri_aa", &eri_aa, [na, na, na, na]),
            ("eri_ab", &eri_ab, [na, na, nb, nb]),
            ("eri_bb", &eri_bb, [nb, nb, nb, nb]),
        ] {
            if tensor.dims() != expected {
                return Err(Agf2Error::shape(what, &expected, &tensor.dims()));
            }
        }

        let eri_ba = eri_ab.transpose_pairs();

        let mut eris = Eris {
            nmo,
            nocc,
            fock: [DMatrix::zeros(na, na), DMatrix::zeros(nb, nb)],
            h1e,
            eri_aa,
            eri_ab,
            eri_ba,
            eri_bb,
            e_hf: 0.0,
            e_nuc,
        };

        let rdm1 = eris.reference_rdm1();
        eris.fock = eris.get_fock(&rdm1);
        eris.e_hf = one_body_energy(&eris.h1e, &eris.fock, &rdm1, e_nuc);
        info!("Reference energy: {:.10} au", eris.e_hf);

        if let Some(gap) = eris.homo_lumo_gap() {
            if gap < HOMO_LUMO_GAP_WARN {
                warn!("HOMO-LUMO gap {:.3e} may be too small for AGF2", gap);
            }
        }

        Ok(eris)
    }

    /// Integrals `(p_a q_a | r_b s_b)` for the spin pair `(a, b)`.
    pub fn eri(&self, a: Spin, b: Spin) -> &Tensor4 {
        match (a, b) {
            (Spin::Alpha, Spin::Alpha) => &self.eri_aa,
            (Spin::Alpha, Spin::Beta) => &self.eri_ab,
            (Spin::Beta, Spin::Alpha) => &self.eri_ba,
            (Spin::Beta, Spin::Beta) => &self.eri_bb,
        }
    }

    /// Density with the first `nocc` orbitals of each spin singly occupied.
    pub fn reference_rdm1(&self) -> [DMatrix<f64>; 2] {
        Spin::BOTH.map(|spin| {
            let s = spin.index();
            DMatrix::from_fn(self.nmo[s], self.nmo[s], |i, j| {
                if i == j && i < self.nocc[s] {
                    1.0
                } else {
                    0.0
                }
            })
        })
    }

    /// Smallest gap between the highest occupied and lowest virtual
    /// eigenvalue of the reference Fock matrices over both spins, or `None`
    /// if no spin has both.
    pub fn homo_lumo_gap(&self) -> Option<f64> {
        Spin::BOTH
            .iter()
            .filter_map(|&spin| {
                let s = spin.index();
                let (nocc, nmo) = (self.nocc[s], self.nmo[s]);
                if nocc == 0 || nocc == nmo {
                    return None;
                }
                let (w, _) = eigh(self.fock[s].clone());
                Some(w[nocc] - w[nocc - 1])
            })
            .reduce(f64::min)
    }

    /// Unrestricted Fock matrices for the spin densities `rdm1`.
    pub fn get_fock(&self, rdm1: &[DMatrix<f64>; 2]) -> [DMatrix<f64>; 2] {
        Spin::BOTH.map(|spin| {
            let s = spin.index();
            let o = spin.other().index();
            let (j_same, k_same) = get_jk(self.eri(spin, spin), &rdm1[s], true);
            let (j_cross, _) = get_jk(self.eri(spin, spin.other()), &rdm1[o], false);
            let mut fock = &self.h1e[s] + j_same + j_cross;
            if let Some(k) = k_same {
                fock -= k;
            }
            fock
        })
    }
}

/// Coulomb and (optionally) exchange contractions of `eri` with `rdm1`.
///
/// `J_pq = Σ_rs (pq|rs) D_rs` and `K_pq = Σ_rs (pr|qs) D_rs`. The exchange
/// term needs all four indices over the same orbital space.
pub fn get_jk(
    eri: &Tensor4,
    rdm1: &DMatrix<f64>,
    with_k: bool,
) -> (DMatrix<f64>, Option<DMatrix<f64>>) {
    let [n0, n1, n2, n3] = eri.dims();
    debug_assert_eq!((rdm1.nrows(), rdm1.ncols()), (n2, n3));

    let pq_pairs: Vec<(usize, usize)> = (0..n0)
        .flat_map(|p| (0..n1).map(move |q| (p, q)))
        .collect();

    let j_values: Vec<f64> = pq_pairs
        .par_iter()
        .map(|&(p, q)| {
            let slab = eri.pair_slice(p, q);
            let mut j_pq = 0.0;
            for r in 0..n2 {
                for s in 0..n3 {
                    j_pq += slab[r * n3 + s] * rdm1[(r, s)];
                }
            }
            j_pq
        })
        .collect();
    let j = DMatrix::from_row_slice(n0, n1, &j_values);

    if !with_k {
        return (j, None);
    }

    debug_assert_eq!((n0, n1), (n2, n3));
    let pq_pairs: Vec<(usize, usize)> = (0..n0)
        .flat_map(|p| (0..n2).map(move |q| (p, q)))
        .collect();
    let k_values: Vec<f64> = pq_pairs
        .par_iter()
        .map(|&(p, q)| {
            let mut k_pq = 0.0;
            for r in 0..n1 {
                let slab = eri.pair_slice(p, r);
                for s in 0..n3 {
                    k_pq += slab[q * n3 + s] * rdm1[(r, s)];
                }
            }
            k_pq
        })
        .collect();
    let k = DMatrix::from_row_slice(n0, n2, &k_values);

    (j, Some(k))
}
