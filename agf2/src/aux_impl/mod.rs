//! Auxiliary spaces: Green's functions and self-energies as sets of poles
//!
//! Both kinds share one representation, `AuxSpace<K>`, parametrized by a
//! zero-sized marker so that a self-energy can never be passed where a
//! Green's function is expected (and vice versa). The chemical-potential
//! searches used by the Dyson solver live alongside.

mod aux;
mod chempot;
#[cfg(test)]
mod tests;

pub use aux::{AuxKind, AuxSpace, GfKind, GreensFunction, SeKind, SelfEnergy};
pub use chempot::{binsearch_chempot, minimize_chempot, ChempotSearch};
