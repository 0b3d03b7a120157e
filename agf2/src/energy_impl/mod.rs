//! Energy evaluation for a (Green's function, self-energy) pair
//!
//! The one-body energy uses the density of the Green's function. The
//! two-body energy is the analytically integrated Galitskii-Migdal formula,
//! which only needs the occupied Green's-function poles and the virtual
//! self-energy poles.

mod energy;
#[cfg(test)]
mod tests;

pub use energy::{energy_1body, energy_2body, energy_mp2, galitskii_migdal, one_body_energy};
