//! Quasi-particle transformation of the two-electron integrals
//!
//! `qmo[x, i, j, a] = Σ_{qrs} (xq|rs) C_{qi} C'_{rj} C''_{sa}`, where the
//! physical index `x` is left untransformed. Each physical row is
//! transformed independently, so the resident and streamed paths share the
//! same row kernel and agree to rounding.

extern crate nalgebra as na;

use na::DMatrix;
use rayon::prelude::*;
use tracing::debug;

use super::memory::MemoryProbe;
use crate::aux_impl::GreensFunction;
use crate::error::Result;
use crate::integrals_impl::{Eris, Spin, Tensor4, TensorStore};

const F64_MB: f64 = 8e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStrategy {
    /// Materialize the whole tensor in memory.
    InCore,
    /// Transform `blksize` physical rows at a time into the tensor store.
    OutCore { blksize: usize },
}

/// Dimensions of one contraction `(xq|rs) -> [x, i, j, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractionDims {
    pub nphys: usize,
    pub nq: usize,
    pub nr: usize,
    pub ns: usize,
    pub ni: usize,
    pub nj: usize,
    pub na: usize,
}

impl ContractionDims {
    fn output_elements(&self) -> usize {
        self.nphys * self.ni * self.nj * self.na
    }

    /// Elements alive while transforming a single physical row.
    fn row_peak_elements(&self) -> usize {
        self.nq * self.nr * self.ns
            + self.nq * self.nr * self.na
            + self.nq * self.nj * self.na
            + self.ni * self.nj * self.na
    }
}

/// Decide between the resident and the streamed transform for the
/// same-spin and cross-spin contractions of one spin.
///
/// Streaming is chosen when the current usage plus the resident output
/// would exceed `max_memory` (MB). The block size is then the number of
/// physical rows whose working set fits the remaining budget, clamped to
/// `[blkmin, nphys]`.
pub fn plan_strategy(
    same: &ContractionDims,
    cross: &ContractionDims,
    max_memory: f64,
    blkmin: usize,
    probe: &dyn MemoryProbe,
) -> TransformStrategy {
    let mem_incore = (same.output_elements() + cross.output_elements()) as f64 * F64_MB;
    let mem_now = probe.current_mb();

    if mem_now + mem_incore < max_memory {
        debug!(
            "In-core transform: {:.2} MB required, {:.2} MB in use, {:.2} MB allowed",
            mem_incore, mem_now, max_memory
        );
        return TransformStrategy::InCore;
    }

    let nphys = same.nphys.max(1);
    let peak = same.row_peak_elements().max(cross.row_peak_elements()).max(1);
    let available = ((max_memory - mem_now) / F64_MB).max(0.0);
    let lower = blkmin.max(1).min(nphys);
    let blksize = ((available / peak as f64).floor() as usize).clamp(lower, nphys);
    debug!(
        "Out-of-core transform: {:.2} MB required, {:.2} MB in use, {:.2} MB allowed, block size {}",
        mem_incore, mem_now, max_memory, blksize
    );
    TransformStrategy::OutCore { blksize }
}

/// Transform the physical rows `p0..p1` of `eri`.
///
/// `c_q`, `c_r`, `c_s` map the second, third and fourth integral indices onto
/// `i`, `j` and `a` respectively.
pub fn transform_rows(
    eri: &Tensor4,
    p0: usize,
    p1: usize,
    c_q: &DMatrix<f64>,
    c_r: &DMatrix<f64>,
    c_s: &DMatrix<f64>,
) -> Result<Tensor4> {
    let [_, nq, nr, ns] = eri.dims();
    let (ni, nj, na) = (c_q.ncols(), c_r.ncols(), c_s.ncols());
    debug_assert_eq!((c_q.nrows(), c_r.nrows(), c_s.nrows()), (nq, nr, ns));

    let c_r_t = c_r.transpose();
    let c_q_t = c_q.transpose();

    let rows: Vec<Vec<f64>> = (p0..p1)
        .into_par_iter()
        .map(|x| {
            // (q r) x s  ->  (q r) x a
            let slab = DMatrix::from_row_slice(nq * nr, ns, eri.row(x));
            let half = slab * c_s;

            // q x (j a)
            let mut quarter = DMatrix::zeros(nq, nj * na);
            for q in 0..nq {
                let block = &c_r_t * half.rows(q * nr, nr);
                for j in 0..nj {
                    for a in 0..na {
                        quarter[(q, j * na + a)] = block[(j, a)];
                    }
                }
            }

            // i x (j a), flattened row-major
            let full = &c_q_t * quarter;
            full.transpose().as_slice().to_vec()
        })
        .collect();

    let data: Vec<f64> = rows.into_iter().flatten().collect();
    Tensor4::from_vec([p1 - p0, ni, nj, na], data)
}

/// Quasi-particle integrals held either in memory or in the tensor store.
#[derive(Debug, Clone)]
pub enum QmoTensor {
    Resident(Tensor4),
    Stored { key: String, dims: [usize; 4] },
}

impl QmoTensor {
    pub fn dims(&self) -> [usize; 4] {
        match self {
            QmoTensor::Resident(tensor) => tensor.dims(),
            QmoTensor::Stored { dims, .. } => *dims,
        }
    }

    /// Matrix `X[x, (j, a)] = qmo[x, i, j, a]`.
    pub fn hole_slice(&self, i: usize, store: &TensorStore) -> Result<DMatrix<f64>> {
        let [nx, ni, nj, na] = self.dims();
        let width = nj * na;
        let mut slice = DMatrix::zeros(nx, width);
        for x in 0..nx {
            let row = match self {
                QmoTensor::Resident(tensor) => {
                    tensor.row(x)[i * width..(i + 1) * width].to_vec()
                }
                QmoTensor::Stored { key, .. } => {
                    store.read_range(key, (x * ni + i) * width, width)?
                }
            };
            for (ja, value) in row.into_iter().enumerate() {
                slice[(x, ja)] = value;
            }
        }
        Ok(slice)
    }

    /// Matrix `Y[x, (j, a)] = qmo[x, j, i, a]`; needs `nocc == nocc'`.
    pub fn exchange_slice(&self, i: usize, store: &TensorStore) -> Result<DMatrix<f64>> {
        let [nx, ni, nj, na] = self.dims();
        debug_assert_eq!(ni, nj);
        let stride = ni * nj * na;
        let mut slice = DMatrix::zeros(nx, ni * na);
        for x in 0..nx {
            let row = match self {
                QmoTensor::Resident(tensor) => tensor.row(x).to_vec(),
                QmoTensor::Stored { key, .. } => store.read_range(key, x * stride, stride)?,
            };
            for j in 0..ni {
                let offset = (j * nj + i) * na;
                for a in 0..na {
                    slice[(x, j * na + a)] = row[offset + a];
                }
            }
        }
        Ok(slice)
    }
}

fn contraction_dims(
    eri: &Tensor4,
    c_q: &DMatrix<f64>,
    c_r: &DMatrix<f64>,
    c_s: &DMatrix<f64>,
) -> ContractionDims {
    let [nphys, nq, nr, ns] = eri.dims();
    ContractionDims {
        nphys,
        nq,
        nr,
        ns,
        ni: c_q.ncols(),
        nj: c_r.ncols(),
        na: c_s.ncols(),
    }
}

/// Transform the integrals of the spin pair `(hole, partner)` with the
/// coefficients `[c_q, c_r, c_s]`, resident or streamed per `strategy`.
fn transform_pair(
    eris: &Eris,
    (hole, partner): (Spin, Spin),
    [c_q, c_r, c_s]: [&DMatrix<f64>; 3],
    strategy: TransformStrategy,
    store: &mut TensorStore,
) -> Result<QmoTensor> {
    let eri = eris.eri(hole, partner);
    let dims = contraction_dims(eri, c_q, c_r, c_s);
    match strategy {
        TransformStrategy::InCore => Ok(QmoTensor::Resident(transform_rows(
            eri, 0, dims.nphys, c_q, c_r, c_s,
        )?)),
        TransformStrategy::OutCore { blksize } => {
            let key = format!("qmo/{}{}", hole.tag(), partner.tag());
            let shape = [dims.nphys, dims.ni, dims.nj, dims.na];
            let blksize = blksize.max(1);
            store.create(&key, shape)?;
            for p0 in (0..dims.nphys).step_by(blksize) {
                let p1 = (p0 + blksize).min(dims.nphys);
                let block = transform_rows(eri, p0, p1, c_q, c_r, c_s)?;
                store.write_block(&key, p0, &block)?;
                debug!("Wrote rows {}..{} of {}", p0, p1, key);
            }
            Ok(QmoTensor::Stored { key, dims: shape })
        }
    }
}

/// Same-spin and cross-spin quasi-particle integrals for the hole spin
/// `spin`.
///
/// The same-spin tensor contracts `(xq|rs)_{σσ}` with `(occ_σ, occ_σ,
/// vir_σ)`; the cross-spin tensor contracts `(xq|rs)_{σσ'}` with `(occ_σ,
/// occ_σ', vir_σ')`. Streamed tensors are written under `qmo/<σ><σ'>`.
pub fn make_qmo_eris(
    eris: &Eris,
    gf_occ: &[GreensFunction; 2],
    gf_vir: &[GreensFunction; 2],
    spin: Spin,
    strategy: TransformStrategy,
    store: &mut TensorStore,
) -> Result<(QmoTensor, QmoTensor)> {
    let s = spin.index();
    let o = spin.other().index();

    let c_q = gf_occ[s].coupling();
    let same = transform_pair(
        eris,
        (spin, spin),
        [c_q, gf_occ[s].coupling(), gf_vir[s].coupling()],
        strategy,
        store,
    )?;
    let cross = transform_pair(
        eris,
        (spin, spin.other()),
        [c_q, gf_occ[o].coupling(), gf_vir[o].coupling()],
        strategy,
        store,
    )?;
    Ok((same, cross))
}

/// Plan the strategy for the hole spin `spin` from the memory budget.
pub fn plan_for_spin(
    eris: &Eris,
    gf_occ: &[GreensFunction; 2],
    gf_vir: &[GreensFunction; 2],
    spin: Spin,
    max_memory: f64,
    blkmin: usize,
    probe: &dyn MemoryProbe,
) -> TransformStrategy {
    let s = spin.index();
    let o = spin.other().index();
    let same = contraction_dims(
        eris.eri(spin, spin),
        gf_occ[s].coupling(),
        gf_occ[s].coupling(),
        gf_vir[s].coupling(),
    );
    let cross = contraction_dims(
        eris.eri(spin, spin.other()),
        gf_occ[s].coupling(),
        gf_occ[o].coupling(),
        gf_vir[o].coupling(),
    );
    plan_strategy(&same, &cross, max_memory, blkmin, probe)
}
