//! Integral storage for unrestricted AGF2
//!
//! This module holds the spin-resolved molecular-orbital integrals, the
//! Coulomb/exchange contractions that build the mean-field Fock matrix, and
//! a file-backed scratch store used when quasi-particle tensors are streamed
//! block by block instead of being held in memory. Integrals are read from
//! YAML files with [`load_integrals`].
//!
//! Two-electron integrals use chemists' notation `(pq|rs)`. For the mixed
//! spin block `(p_α q_α | r_β s_β)` the βα counterpart is derived by swapping
//! the bra and ket pairs.

mod eris;
mod file;
mod store;
mod tensor;
#[cfg(test)]
mod tests;

pub use eris::{get_jk, Eris, Spin};
pub use file::{load_integrals, EriBlocks, IntegralFile, SpinMatrices};
pub use store::TensorStore;
pub use tensor::Tensor4;
