//! Configuration management for AGF2 calculations
//!
//! This module handles the YAML run configuration and its defaults. Every
//! numerical setting is optional in the file; missing values are filled in
//! from [`Agf2Options::default`].

mod args;

pub use args::Args;

use agf2::Agf2Options;
use serde::{Deserialize, Serialize};

/// Main configuration structure for AGF2 calculations
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Path to the integral file, relative to the configuration file.
    pub integrals: String,
    #[serde(default)]
    pub agf2_params: Agf2Params,
    /// Number of ionization energies and electron affinities to report.
    pub nroots: Option<usize>,
}

/// AGF2-specific parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Agf2Params {
    pub conv_tol: Option<f64>,
    pub conv_tol_rdm1: Option<f64>,
    pub conv_tol_nelec: Option<f64>,
    pub max_cycle: Option<usize>,
    pub max_cycle_outer: Option<usize>,
    pub max_cycle_inner: Option<usize>,
    pub weight_tol: Option<f64>,
    pub diis_space: Option<usize>,
    pub diis_min_space: Option<usize>,
    pub max_memory: Option<f64>,
    pub blkmin: Option<usize>,
}

impl Default for Agf2Params {
    fn default() -> Self {
        let options = Agf2Options::default();
        Agf2Params {
            conv_tol: Some(options.conv_tol),
            conv_tol_rdm1: Some(options.conv_tol_rdm1),
            conv_tol_nelec: Some(options.conv_tol_nelec),
            max_cycle: Some(options.max_cycle),
            max_cycle_outer: Some(options.max_cycle_outer),
            max_cycle_inner: Some(options.max_cycle_inner),
            weight_tol: Some(options.weight_tol),
            diis_space: Some(options.diis_space),
            diis_min_space: Some(options.diis_min_space),
            max_memory: Some(options.max_memory),
            blkmin: Some(options.blkmin),
        }
    }
}

impl Agf2Params {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.conv_tol.is_none() {
            self.conv_tol = defaults.conv_tol;
        }
        if self.conv_tol_rdm1.is_none() {
            self.conv_tol_rdm1 = defaults.conv_tol_rdm1;
        }
        if self.conv_tol_nelec.is_none() {
            self.conv_tol_nelec = defaults.conv_tol_nelec;
        }
        if self.max_cycle.is_none() {
            self.max_cycle = defaults.max_cycle;
        }
        if self.max_cycle_outer.is_none() {
            self.max_cycle_outer = defaults.max_cycle_outer;
        }
        if self.max_cycle_inner.is_none() {
            self.max_cycle_inner = defaults.max_cycle_inner;
        }
        if self.weight_tol.is_none() {
            self.weight_tol = defaults.weight_tol;
        }
        if self.diis_space.is_none() {
            self.diis_space = defaults.diis_space;
        }
        if self.diis_min_space.is_none() {
            self.diis_min_space = defaults.diis_min_space;
        }
        if self.max_memory.is_none() {
            self.max_memory = defaults.max_memory;
        }
        if self.blkmin.is_none() {
            self.blkmin = defaults.blkmin;
        }
        self
    }

    /// Resolve into the settings consumed by the library.
    pub fn to_options(&self) -> Agf2Options {
        let defaults = Agf2Options::default();
        Agf2Options {
            conv_tol: self.conv_tol.unwrap_or(defaults.conv_tol),
            conv_tol_rdm1: self.conv_tol_rdm1.unwrap_or(defaults.conv_tol_rdm1),
            conv_tol_nelec: self.conv_tol_nelec.unwrap_or(defaults.conv_tol_nelec),
            max_cycle: self.max_cycle.unwrap_or(defaults.max_cycle),
            max_cycle_outer: self.max_cycle_outer.unwrap_or(defaults.max_cycle_outer),
            max_cycle_inner: self.max_cycle_inner.unwrap_or(defaults.max_cycle_inner),
            weight_tol: self.weight_tol.unwrap_or(defaults.weight_tol),
            diis_space: self.diis_space.unwrap_or(defaults.diis_space),
            diis_min_space: self.diis_min_space.unwrap_or(defaults.diis_min_space),
            max_memory: self.max_memory.unwrap_or(defaults.max_memory),
            blkmin: self.blkmin.unwrap_or(defaults.blkmin),
        }
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.agf2_params = self.agf2_params.with_defaults();
        if self.nroots.is_none() {
            self.nroots = Some(DEFAULT_NROOTS);
        }
        self
    }

    pub fn nroots(&self) -> usize {
        self.nroots.unwrap_or(DEFAULT_NROOTS)
    }
}

const DEFAULT_NROOTS: usize = 5;
