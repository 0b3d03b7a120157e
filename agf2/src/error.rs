//! Error type shared by the AGF2 library.
//!
//! Ordinary control flow (non-converged Fock loops, small HOMO-LUMO gaps,
//! switching to the streamed transform) never produces an error; these
//! variants cover malformed input and scratch-storage failures only.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Agf2Error {
    /// Tensor or matrix dimensions disagree with the declared orbital counts.
    #[error("shape mismatch for {what}: expected {expected:?}, found {found:?}")]
    Shape {
        what: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Reading or writing the scratch tensor store failed.
    #[error("tensor store I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The integral file could not be deserialized.
    #[error("failed to parse integral file: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("dataset `{0}` does not exist in the tensor store")]
    MissingDataset(String),
}

impl Agf2Error {
    pub(crate) fn shape(what: impl Into<String>, expected: &[usize], found: &[usize]) -> Self {
        Agf2Error::Shape {
            what: what.into(),
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Agf2Error>;
