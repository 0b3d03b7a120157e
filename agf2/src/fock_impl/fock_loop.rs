//! Self-consistent Fock loop for a fixed self-energy

extern crate nalgebra as na;

use na::DMatrix;
use tracing::{debug, info, warn};

use super::diis::FockDiis;
use crate::aux_impl::{binsearch_chempot, minimize_chempot, GreensFunction, SelfEnergy};
use crate::integrals_impl::{Eris, Spin};
use crate::linalg::max_abs_diff;
use crate::options::Agf2Options;

/// Result of a Fock loop. `nerr` is the electron-count error of the spin
/// with the larger error, `derr` the last change in the density.
#[derive(Debug, Clone)]
pub struct FockLoopOutput {
    pub gf: [GreensFunction; 2],
    pub se: [SelfEnergy; 2],
    pub converged: bool,
    pub cycles_outer: usize,
    pub nerr: f64,
    pub derr: f64,
}

fn make_rdm1(gf: &[GreensFunction; 2]) -> [DMatrix<f64>; 2] {
    [gf[0].make_rdm1(), gf[1].make_rdm1()]
}

/// Relax the Fock matrix and the chemical potentials of both spins in the
/// presence of the self-energy `se`.
///
/// Each outer cycle first shifts the self-energy poles so that the electron
/// count is met for the current Fock matrix. The inner cycles then solve the
/// Dyson equation, rebuild the Fock matrix from the new density and
/// extrapolate it with DIIS, until the density stops changing. The loop
/// is converged once the density change and the electron-count error are
/// both below tolerance; running out of cycles is reported, not an error.
pub fn fock_loop(
    eris: &Eris,
    gf: [GreensFunction; 2],
    se: [SelfEnergy; 2],
    options: &Agf2Options,
) -> FockLoopOutput {
    let nelec = [eris.nocc[0] as f64, eris.nocc[1] as f64];
    let mut gf = gf;
    let mut se = se;

    let mut rdm1 = make_rdm1(&gf);
    let mut fock = eris.get_fock(&rdm1);
    let mut diis = FockDiis::new(options.diis_space, options.diis_min_space);

    let mut nerr = f64::INFINITY;
    let mut derr = f64::INFINITY;
    let mut errors = [f64::INFINITY; 2];
    let mut converged = false;
    let mut cycles_outer = 0;

    for niter1 in 1..=options.max_cycle_outer {
        cycles_outer = niter1;

        for spin in Spin::BOTH {
            let s = spin.index();
            minimize_chempot(
                &mut se[s],
                &fock[s],
                nelec[s],
                options.conv_tol_nelec,
                options.max_cycle_inner,
            );
        }

        let mut cycles_inner = 0;
        for niter2 in 1..=options.max_cycle_inner {
            cycles_inner = niter2;

            for spin in Spin::BOTH {
                let s = spin.index();
                let nphys = eris.nmo[s];
                let (w, v) = se[s].eig(&fock[s], 0.0);
                let search = binsearch_chempot(&w, &v, nphys, nelec[s]);
                se[s].chempot = search.chempot;
                errors[s] = search.error;
                gf[s] = GreensFunction::from_eigen(w, &v, nphys, search.chempot);
            }
            nerr = if errors[0].abs() > errors[1].abs() {
                errors[0]
            } else {
                errors[1]
            };

            let rdm1_prev = rdm1;
            rdm1 = make_rdm1(&gf);
            fock = diis.update(eris.get_fock(&rdm1));

            if niter2 > 1 {
                derr = max_abs_diff(&rdm1[0], &rdm1_prev[0])
                    .max(max_abs_diff(&rdm1[1], &rdm1_prev[1]));
                if derr < options.conv_tol_rdm1 {
                    break;
                }
            }
        }

        debug!(
            "Fock loop cycle {}: {} inner iterations, dN = {:.3e}, |ddm| = {:.3e}",
            niter1, cycles_inner, nerr, derr
        );

        if derr < options.conv_tol_rdm1 && nerr.abs() < options.conv_tol_nelec {
            converged = true;
            break;
        }
    }

    if converged {
        info!("Fock loop converged in {} cycles", cycles_outer);
    } else {
        warn!("Fock loop did not converge in {} cycles", cycles_outer);
    }
    for spin in Spin::BOTH {
        let s = spin.index();
        info!(
            "  {:>5}: chempot = {:.9}  dN = {:.3e}",
            spin.label(),
            se[s].chempot,
            errors[s]
        );
    }
    info!("  |ddm| = {:.3e}", derr);

    FockLoopOutput {
        gf,
        se,
        converged,
        cycles_outer,
        nerr,
        derr,
    }
}
