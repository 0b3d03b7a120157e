//! Chemical-potential searches on auxiliary spaces
//!
//! `binsearch_chempot` places the chemical potential between the eigenstates
//! of an extended Hamiltonian so that the physical weight below it is as
//! close as possible to the target electron count. `minimize_chempot` then
//! shifts the self-energy poles relative to the physical space until that
//! count is met to within a tolerance.

extern crate nalgebra as na;

use na::{DMatrix, DVector};
use std::cmp::Ordering;
use tracing::debug;

use super::aux::SelfEnergy;

/// Offset used to place the chemical potential outside the spectrum when
/// every state, or none, is occupied.
const EDGE_OFFSET: f64 = 1e-6;

/// Points in the initial scan of the shift interval.
const SCAN_POINTS: usize = 65;

/// Bisection stops once a bracket is narrower than this.
const MIN_BRACKET: f64 = 1e-14;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChempotSearch {
    pub chempot: f64,
    /// Target electron count minus the weight below the chemical potential.
    pub error: f64,
}

/// Bisect the cumulative physical weight of the eigenstates `(w, v)` for the
/// chemical potential that best holds `nelec` electrons with unit occupancy.
///
/// The eigenvalues must be in ascending order; only the first `nphys` rows of
/// `v` contribute to the weight.
pub fn binsearch_chempot(
    w: &DVector<f64>,
    v: &DMatrix<f64>,
    nphys: usize,
    nelec: f64,
) -> ChempotSearch {
    let nmo = w.len();
    if nmo == 0 {
        return ChempotSearch {
            chempot: 0.0,
            error: nelec,
        };
    }

    let cumulative: Vec<f64> = (0..nmo)
        .scan(0.0, |sum, k| {
            *sum += v.view((0, k), (nphys, 1)).norm_squared();
            Some(*sum)
        })
        .collect();

    // First state whose cumulative weight reaches the target.
    let first = cumulative.partition_point(|&n| n < nelec);

    // Candidate HOMOs are `first - 1` and `first`; `None` means no state is
    // occupied.
    let homo = if first == nmo {
        Some(nmo - 1)
    } else {
        let below = if first == 0 {
            0.0
        } else {
            cumulative[first - 1]
        };
        if (nelec - below).abs() < (cumulative[first] - nelec).abs() {
            first.checked_sub(1)
        } else {
            Some(first)
        }
    };

    match homo {
        None => ChempotSearch {
            chempot: w[0] - EDGE_OFFSET,
            error: nelec,
        },
        Some(h) if h + 1 == nmo => ChempotSearch {
            chempot: w[h] + EDGE_OFFSET,
            error: nelec - cumulative[h],
        },
        Some(h) => ChempotSearch {
            chempot: 0.5 * (w[h] + w[h + 1]),
            error: nelec - cumulative[h],
        },
    }
}

/// Shift the self-energy poles so that the Green's function of `fock`
/// coupled to `se` holds `nelec` electrons to within `tol`.
///
/// The error is a piecewise-continuous function of the shift. The shift
/// interval is scanned once, then each sign change is bisected with a budget
/// of `maxiter` evaluations, most promising bracket first. The best shift
/// found is applied to `se` and its chemical potential is reset.
pub fn minimize_chempot(
    se: &mut SelfEnergy,
    fock: &DMatrix<f64>,
    nelec: f64,
    tol: f64,
    maxiter: usize,
) -> ChempotSearch {
    let nphys = se.nphys();
    let unshifted_se: &SelfEnergy = se;
    let error_at = |se: &SelfEnergy, shift: f64| -> f64 {
        let (w, v) = se.eig(fock, shift);
        binsearch_chempot(&w, &v, nphys, nelec).error
    };

    let (w0, v0) = unshifted_se.eig(fock, 0.0);
    let unshifted = binsearch_chempot(&w0, &v0, nphys, nelec);
    if unshifted.error.abs() < tol {
        se.chempot = unshifted.chempot;
        return unshifted;
    }

    let radius = w0.amax() + 1.0;
    let target = tol * 1e-3;

    let mut best = (0.0, unshifted.error);

    let scan: Vec<(f64, f64)> = (0..SCAN_POINTS)
        .map(|k| {
            let x = -radius + 2.0 * radius * k as f64 / (SCAN_POINTS - 1) as f64;
            (x, error_at(unshifted_se, x))
        })
        .collect();
    for &(x, f) in &scan {
        track(x, f, &mut best);
    }

    let mut brackets: Vec<((f64, f64), (f64, f64))> = scan
        .windows(2)
        .filter(|pair| pair[0].1.signum() != pair[1].1.signum())
        .map(|pair| (pair[0], pair[1]))
        .collect();
    brackets.sort_by(|a, b| {
        let fa = a.0 .1.abs().min(a.1 .1.abs());
        let fb = b.0 .1.abs().min(b.1 .1.abs());
        fa.partial_cmp(&fb).unwrap_or(Ordering::Equal)
    });

    for ((mut lo, mut f_lo), (mut hi, _)) in brackets {
        for _ in 0..maxiter {
            if best.1.abs() < target || hi - lo < MIN_BRACKET {
                break;
            }
            let mid = 0.5 * (lo + hi);
            let f_mid = error_at(unshifted_se, mid);
            track(mid, f_mid, &mut best);
            if f_mid.signum() == f_lo.signum() {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }
        if best.1.abs() < target {
            break;
        }
    }

    let (shift, error) = best;
    debug!(
        "Chemical potential minimization: shift = {:.6e}, dN = {:.3e}",
        shift, error
    );

    se.shift_energies(shift);
    let (w, v) = se.eig(fock, 0.0);
    let search = binsearch_chempot(&w, &v, nphys, nelec);
    se.chempot = search.chempot;
    search
}

fn track(x: f64, f: f64, best: &mut (f64, f64)) {
    if f.abs() < best.1.abs() {
        *best = (x, f);
    }
}
