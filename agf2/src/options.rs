//! Numerical settings for an AGF2 calculation

/// Fully resolved settings threaded through the library.
///
/// Tolerances are absolute. `max_memory` is in MB and bounds the resident
/// quasi-particle tensors; beyond it the transform is streamed in blocks of
/// at least `blkmin` physical rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Agf2Options {
    pub conv_tol: f64,
    pub conv_tol_rdm1: f64,
    pub conv_tol_nelec: f64,
    pub max_cycle: usize,
    pub max_cycle_outer: usize,
    pub max_cycle_inner: usize,
    pub weight_tol: f64,
    pub diis_space: usize,
    pub diis_min_space: usize,
    pub max_memory: f64,
    pub blkmin: usize,
}

impl Default for Agf2Options {
    fn default() -> Self {
        Agf2Options {
            conv_tol: 1e-7,
            conv_tol_rdm1: 1e-6,
            conv_tol_nelec: 1e-6,
            max_cycle: 50,
            max_cycle_outer: 20,
            max_cycle_inner: 50,
            weight_tol: 1e-11,
            diis_space: 6,
            diis_min_space: 1,
            max_memory: 4000.0,
            blkmin: 1,
        }
    }
}
