//! YAML integral files
//!
//! ```yaml
//! nocc: [2, 1]
//! e_nuc: 0.0
//! h1e:
//!   alpha: [[-1.0, 0.0], [0.0, 0.5]]
//!   beta:  [[-1.0, 0.0], [0.0, 0.5]]
//! eri:
//!   aa: [...]   # nmo_a^4 values, row-major (pq|rs)
//!   ab: [...]   # nmo_a^2 * nmo_b^2 values
//!   bb: [...]   # nmo_b^4 values
//! ```

extern crate nalgebra as na;

use na::DMatrix;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use super::eris::Eris;
use super::tensor::Tensor4;
use crate::error::{Agf2Error, Result};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpinMatrices {
    pub alpha: Vec<Vec<f64>>,
    pub beta: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EriBlocks {
    pub aa: Vec<f64>,
    pub ab: Vec<f64>,
    pub bb: Vec<f64>,
}

/// Serialized form of the molecular-orbital integrals.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntegralFile {
    pub nocc: [usize; 2],
    #[serde(default)]
    pub e_nuc: f64,
    pub h1e: SpinMatrices,
    pub eri: EriBlocks,
}

fn square_matrix(what: &str, rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let n = rows.len();
    if let Some(bad) = rows.iter().find(|row| row.len() != n) {
        return Err(Agf2Error::shape(what, &[n, n], &[n, bad.len()]));
    }
    Ok(DMatrix::from_fn(n, n, |p, q| rows[p][q]))
}

impl IntegralFile {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yml::from_str(text)?)
    }

    /// Validate the blocks and build the integral set.
    pub fn into_eris(self) -> Result<Eris> {
        let h_a = square_matrix("h1e (alpha)", &self.h1e.alpha)?;
        let h_b = square_matrix("h1e (beta)", &self.h1e.beta)?;
        let (na, nb) = (h_a.nrows(), h_b.nrows());

        let eri_aa = Tensor4::from_vec([na, na, na, na], self.eri.aa)?;
        let eri_ab = Tensor4::from_vec([na, na, nb, nb], self.eri.ab)?;
        let eri_bb = Tensor4::from_vec([nb, nb, nb, nb], self.eri.bb)?;

        Eris::new([h_a, h_b], eri_aa, eri_ab, eri_bb, self.nocc, self.e_nuc)
    }
}

/// Read an [`IntegralFile`] from `path` and build the integral set.
pub fn load_integrals(path: impl AsRef<Path>) -> Result<Eris> {
    let path = path.as_ref();
    info!("Reading integrals from {}", path.display());
    let text = fs::read_to_string(path)?;
    IntegralFile::from_yaml_str(&text)?.into_eris()
}
