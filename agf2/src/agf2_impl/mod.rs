//! AGF2 macro-iterations
//!
//! `Uagf2` ties the pieces together: starting from the mean-field Green's
//! function it alternates between building the second-order self-energy and
//! relaxing the Green's function in its presence, until the total energy is
//! stationary. Ionization potentials and electron affinities are read off
//! the final Green's function.

mod uagf2;

pub use uagf2::{Agf2Results, Excitation, Uagf2};
