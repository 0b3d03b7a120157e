//! Self-energy construction
//!
//! The second-order self-energy is never stored as a frequency-dependent
//! object. Instead its zeroth and first spectral moments are accumulated
//! from the quasi-particle integrals and factorized into a compact set of
//! poles that reproduces both moments exactly.

mod build;
mod moments;

pub use build::{build_se, build_se_part};
pub use moments::factorize_moments;
