//! One-body and Galitskii-Migdal two-body energies

extern crate nalgebra as na;

use na::DMatrix;

use crate::aux_impl::{GreensFunction, SelfEnergy};
use crate::integrals_impl::Eris;

/// `Σ_σ ½ Σ_pq D_pq (h_pq + F_pq) + e_nuc`.
pub fn one_body_energy(
    h1e: &[DMatrix<f64>; 2],
    fock: &[DMatrix<f64>; 2],
    rdm1: &[DMatrix<f64>; 2],
    e_nuc: f64,
) -> f64 {
    let electronic: f64 = (0..2)
        .map(|s| 0.5 * rdm1[s].dot(&(&h1e[s] + &fock[s])))
        .sum();
    electronic + e_nuc
}

/// One-body energy of the Green's functions, with the Fock matrix rebuilt
/// from their density.
pub fn energy_1body(eris: &Eris, gf: &[GreensFunction; 2]) -> f64 {
    let rdm1 = [gf[0].make_rdm1(), gf[1].make_rdm1()];
    let fock = eris.get_fock(&rdm1);
    one_body_energy(&eris.h1e, &fock, &rdm1, eris.e_nuc)
}

/// Galitskii-Migdal contraction for one spin,
/// `2 Σ_{l ∈ occ(G)} Σ_{k ∈ vir(Σ)} (c_l · v_k)² / (ε_l - ε_k)`.
pub fn galitskii_migdal(gf: &GreensFunction, se: &SelfEnergy) -> f64 {
    let gf_occ = gf.get_occupied();
    let se_vir = se.get_virtual();
    let overlap = gf_occ.coupling().transpose() * se_vir.coupling();

    let mut e2b = 0.0;
    for l in 0..gf_occ.naux() {
        for k in 0..se_vir.naux() {
            let v = overlap[(l, k)];
            e2b += v * v / (gf_occ.energy()[l] - se_vir.energy()[k]);
        }
    }
    2.0 * e2b
}

/// Two-body energy, half the sum of the per-spin contractions.
pub fn energy_2body(gf: &[GreensFunction; 2], se: &[SelfEnergy; 2]) -> f64 {
    let e2b_a = galitskii_migdal(&gf[0], &se[0]);
    let e2b_b = galitskii_migdal(&gf[1], &se[1]);
    (e2b_a + e2b_b) * 0.5
}

/// Seed energy of a second-order self-energy built on a mean-field Green's
/// function; the one-/two-body partition makes it half of `energy_2body`.
pub fn energy_mp2(gf: &[GreensFunction; 2], se: &[SelfEnergy; 2]) -> f64 {
    let emp2_a = galitskii_migdal(&gf[0], &se[0]) * 0.5;
    let emp2_b = galitskii_migdal(&gf[1], &se[1]) * 0.5;
    (emp2_a + emp2_b) * 0.5
}
