//! Second-order self-energy from Green's-function poles

extern crate nalgebra as na;

use na::{DMatrix, DVector};
use tracing::debug;

use super::moments::factorize_moments;
use crate::aux_impl::{GreensFunction, SelfEnergy};
use crate::error::Result;
use crate::integrals_impl::{Eris, Spin, TensorStore};
use crate::linalg::scale_columns;
use crate::options::Agf2Options;
use crate::qmo_impl::{make_qmo_eris, plan_for_spin, MemoryProbe};

/// Pole energies `ε_i + ε_j - ε_a` over the flattened `(j, a)` index.
fn pole_energies(e_i: f64, e_j: &DVector<f64>, e_a: &DVector<f64>) -> DVector<f64> {
    let na = e_a.len();
    DVector::from_fn(e_j.len() * na, |ja, _| e_i + e_j[ja / na] - e_a[ja % na])
}

/// Occupied-derived (or, with the arguments swapped, virtual-derived)
/// self-energy for each spin.
///
/// The zeroth and first moments
///
/// `V  = Σ_i X_i (X_i - Y_i)ᵀ + Z_i Z_iᵀ`
/// `VE = Σ_i (X_i∘E_i) (X_i - Y_i)ᵀ + (Z_i∘E'_i) Z_iᵀ`
///
/// are accumulated hole by hole from the same-spin (`X`, `Y`) and cross-spin
/// (`Z`) quasi-particle integrals and factorized into poles. Poles with
/// spectral weight below `weight_tol` are dropped. Each result carries the
/// chemical potential of the corresponding `gf_occ`.
pub fn build_se_part(
    eris: &Eris,
    gf_occ: &[GreensFunction; 2],
    gf_vir: &[GreensFunction; 2],
    options: &Agf2Options,
    probe: &dyn MemoryProbe,
    store: &mut TensorStore,
) -> Result<[SelfEnergy; 2]> {
    Ok([
        build_se_spin(eris, gf_occ, gf_vir, Spin::Alpha, options, probe, store)?,
        build_se_spin(eris, gf_occ, gf_vir, Spin::Beta, options, probe, store)?,
    ])
}

fn build_se_spin(
    eris: &Eris,
    gf_occ: &[GreensFunction; 2],
    gf_vir: &[GreensFunction; 2],
    spin: Spin,
    options: &Agf2Options,
    probe: &dyn MemoryProbe,
    store: &mut TensorStore,
) -> Result<SelfEnergy> {
    let s = spin.index();
    let o = spin.other().index();
    let nmo = eris.nmo[s];

    let strategy = plan_for_spin(
        eris,
        gf_occ,
        gf_vir,
        spin,
        options.max_memory,
        options.blkmin,
        probe,
    );
    let (same, cross) = make_qmo_eris(eris, gf_occ, gf_vir, spin, strategy, store)?;

    let e_occ = gf_occ[s].energy();
    let e_vir = gf_vir[s].energy();
    let e_occ_other = gf_occ[o].energy();
    let e_vir_other = gf_vir[o].energy();

    let mut vv = DMatrix::zeros(nmo, nmo);
    let mut vev = DMatrix::zeros(nmo, nmo);

    for i in 0..gf_occ[s].naux() {
        let x = same.hole_slice(i, store)?;
        let y = same.exchange_slice(i, store)?;
        let z = cross.hole_slice(i, store)?;

        let e_same = pole_energies(e_occ[i], e_occ, e_vir);
        let e_cross = pole_energies(e_occ[i], e_occ_other, e_vir_other);

        let antisym = (&x - &y).transpose();
        let z_t = z.transpose();

        vv += &x * &antisym + &z * &z_t;
        vev += scale_columns(&x, &e_same) * &antisym + scale_columns(&z, &e_cross) * &z_t;
    }

    let (e, c) = factorize_moments(&vv, &vev);
    let se = SelfEnergy::new(e, c, gf_occ[s].chempot).remove_uncoupled(options.weight_tol);
    debug!(
        "Built {} self-energy part with {} poles from {} holes",
        spin.label(),
        se.naux(),
        gf_occ[s].naux()
    );
    Ok(se)
}

/// Full self-energy: occupied-derived poles followed by virtual-derived
/// poles for each spin.
pub fn build_se(
    eris: &Eris,
    gf: &[GreensFunction; 2],
    options: &Agf2Options,
    probe: &dyn MemoryProbe,
    store: &mut TensorStore,
) -> Result<[SelfEnergy; 2]> {
    let gf_occ = [gf[0].get_occupied(), gf[1].get_occupied()];
    let gf_vir = [gf[0].get_virtual(), gf[1].get_virtual()];

    let se_occ = build_se_part(eris, &gf_occ, &gf_vir, options, probe, store)?;
    let se_vir = build_se_part(eris, &gf_vir, &gf_occ, options, probe, store)?;

    Ok([
        se_occ[0].combine(&se_vir[0]),
        se_occ[1].combine(&se_vir[1]),
    ])
}
