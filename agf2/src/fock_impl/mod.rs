//! Dyson/Fock solver
//!
//! For a fixed self-energy, the Fock matrix and the chemical potential of
//! each spin are relaxed together: chemical potentials are placed by
//! bisection on the spectrum of the extended Hamiltonian, the density is
//! rebuilt from the resulting Green's function and the Fock matrices are
//! extrapolated with DIIS.

mod diis;
mod fock_loop;

pub use diis::FockDiis;
pub use fock_loop::{fock_loop, FockLoopOutput};
