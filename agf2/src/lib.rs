// Main library file for unrestricted AGF2 calculations

pub mod agf2_impl;
pub mod aux_impl;
pub mod energy_impl;
pub mod error;
pub mod fock_impl;
pub mod integrals_impl;
pub mod linalg;
pub mod options;
pub mod qmo_impl;
pub mod se_impl;

#[cfg(test)]
mod test_systems;

pub use agf2_impl::{Agf2Results, Excitation, Uagf2};
pub use aux_impl::{GreensFunction, SelfEnergy};
pub use error::{Agf2Error, Result};
pub use integrals_impl::{load_integrals, Eris, Spin};
pub use options::Agf2Options;
