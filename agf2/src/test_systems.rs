//! Small model Hamiltonians shared by the unit tests

extern crate nalgebra as na;

use na::DMatrix;

use crate::integrals_impl::{Eris, Tensor4};

/// Two orbitals per spin, one electron per spin, constant integrals
/// (0.3 within a spin, 0.25 between spins).
pub fn two_orbital_eris() -> Eris {
    let h = DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, 0.5]);
    let same = Tensor4::from_fn([2; 4], |_, _, _, _| 0.3);
    let cross = Tensor4::from_fn([2; 4], |_, _, _, _| 0.25);
    Eris::new([h.clone(), h], same.clone(), cross, same, [1, 1], 0.0)
        .expect("valid two-orbital integrals")
}

/// Three orbitals per spin with two α and one β electron. The integrals are
/// a sum of two symmetric rank-one pair products, so they carry the full
/// eightfold permutational symmetry.
pub fn open_shell_eris() -> Eris {
    let h = DMatrix::from_row_slice(
        3,
        3,
        &[-1.2, 0.1, 0.0, 0.1, -0.6, 0.05, 0.0, 0.05, 0.8],
    );
    let b0 = |p: usize, q: usize| 0.5 / (1.0 + p as f64 + q as f64);
    let b1 = |p: usize, q: usize| if p == q { 0.2 } else { 0.05 };
    let eri = Tensor4::from_fn([3; 4], |p, q, r, s| b0(p, q) * b0(r, s) + b1(p, q) * b1(r, s));
    Eris::new([h.clone(), h], eri.clone(), eri.clone(), eri, [2, 1], 0.0)
        .expect("valid open-shell integrals")
}
