//! Unrestricted AGF2 driver

extern crate nalgebra as na;

use na::DVector;
use std::cmp::Ordering;
use tracing::{info, warn};

use crate::aux_impl::{GreensFunction, SelfEnergy};
use crate::energy_impl;
use crate::error::Result;
use crate::fock_impl::{self, FockLoopOutput};
use crate::integrals_impl::{Eris, Spin, TensorStore};
use crate::options::Agf2Options;
use crate::qmo_impl::{MemoryProbe, ProcessMemory};
use crate::se_impl;

/// A quasi-particle state: an ionization (energy negated) or an attachment.
#[derive(Debug, Clone)]
pub struct Excitation {
    pub spin: Spin,
    pub energy: f64,
    pub coupling: DVector<f64>,
}

/// Outcome of [`Uagf2::kernel`].
#[derive(Debug, Clone)]
pub struct Agf2Results {
    pub converged: bool,
    pub cycles: usize,
    pub e_hf: f64,
    pub e_mp2: f64,
    pub e_1b: f64,
    pub e_2b: f64,
    pub e_tot: f64,
    pub e_corr: f64,
    pub gf: [GreensFunction; 2],
    pub se: [SelfEnergy; 2],
}

/// Unrestricted AGF2 on a fixed set of molecular-orbital integrals.
///
/// Owns the scratch store used by the streamed transform and the probe that
/// decides when to stream.
pub struct Uagf2 {
    pub eris: Eris,
    pub options: Agf2Options,
    probe: Box<dyn MemoryProbe>,
    store: TensorStore,
}

impl Uagf2 {
    pub fn new(eris: Eris, options: Agf2Options) -> Result<Self> {
        Ok(Uagf2 {
            eris,
            options,
            probe: Box::new(ProcessMemory),
            store: TensorStore::new()?,
        })
    }

    /// Replace the probe that reports current memory usage.
    pub fn with_memory_probe(mut self, probe: impl MemoryProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    fn nelec(&self, spin: Spin) -> f64 {
        self.eris.nocc[spin.index()] as f64
    }

    /// Mean-field Green's functions of the reference Fock matrices.
    pub fn init_aux(&self) -> [GreensFunction; 2] {
        Spin::BOTH.map(|spin| {
            GreensFunction::from_fock(&self.eris.fock[spin.index()], self.nelec(spin))
        })
    }

    pub fn build_se(&mut self, gf: &[GreensFunction; 2]) -> Result<[SelfEnergy; 2]> {
        se_impl::build_se(
            &self.eris,
            gf,
            &self.options,
            self.probe.as_ref(),
            &mut self.store,
        )
    }

    /// Green's functions from the Dyson equation with the Fock matrix of
    /// `gf` and the self-energy `se`.
    pub fn build_gf(&self, gf: &[GreensFunction; 2], se: &[SelfEnergy; 2]) -> [GreensFunction; 2] {
        let rdm1 = [gf[0].make_rdm1(), gf[1].make_rdm1()];
        let fock = self.eris.get_fock(&rdm1);
        Spin::BOTH.map(|spin| {
            let s = spin.index();
            se[s].get_greens_function(&fock[s], self.nelec(spin))
        })
    }

    pub fn fock_loop(&self, gf: [GreensFunction; 2], se: [SelfEnergy; 2]) -> FockLoopOutput {
        fock_impl::fock_loop(&self.eris, gf, se, &self.options)
    }

    pub fn energy_1body(&self, gf: &[GreensFunction; 2]) -> f64 {
        energy_impl::energy_1body(&self.eris, gf)
    }

    pub fn energy_2body(&self, gf: &[GreensFunction; 2], se: &[SelfEnergy; 2]) -> f64 {
        energy_impl::energy_2body(gf, se)
    }

    pub fn energy_mp2(&self, gf: &[GreensFunction; 2], se: &[SelfEnergy; 2]) -> f64 {
        energy_impl::energy_mp2(gf, se)
    }

    /// Run the AGF2 macro-iterations until the total energy changes by less
    /// than `conv_tol` between cycles.
    pub fn kernel(&mut self) -> Result<Agf2Results> {
        let e_hf = self.eris.e_hf;
        let mut gf = self.init_aux();
        let mut se = self.build_se(&gf)?;
        let e_mp2 = self.energy_mp2(&gf, &se);
        info!("E(MP2) = {:.12}  E_corr(MP2) = {:.12}", e_hf + e_mp2, e_mp2);

        let mut converged = false;
        let mut cycles = 0;
        let mut e_1b = e_hf;
        let mut e_2b = 0.0;
        let mut e_prev = 0.0;

        for niter in 1..=self.options.max_cycle {
            cycles = niter;
            info!("AGF2 iteration {}", niter);

            let out = self.fock_loop(gf, se);
            gf = out.gf;
            e_1b = self.energy_1body(&gf);

            se = self.build_se(&gf)?;
            e_2b = self.energy_2body(&gf, &se);

            let e_tot = e_1b + e_2b;
            info!(
                "  E(AGF2) = {:.12}  E_corr(AGF2) = {:.12}  dE = {:.3e}",
                e_tot,
                e_tot - e_hf,
                e_tot - e_prev
            );
            if let Some(ip) = self.get_ip(&gf, 1).first() {
                info!("  IP = {:.8}  ({})", ip.energy, ip.spin.label());
            }
            if let Some(ea) = self.get_ea(&gf, 1).first() {
                info!("  EA = {:.8}  ({})", ea.energy, ea.spin.label());
            }

            if (e_tot - e_prev).abs() < self.options.conv_tol {
                converged = true;
                break;
            }
            e_prev = e_tot;
        }

        let e_tot = e_1b + e_2b;
        if converged {
            info!("AGF2 converged in {} iterations", cycles);
        } else {
            warn!("AGF2 did not converge in {} iterations", cycles);
        }
        info!("E(AGF2) = {:.12}  E_corr(AGF2) = {:.12}", e_tot, e_tot - e_hf);

        Ok(Agf2Results {
            converged,
            cycles,
            e_hf,
            e_mp2,
            e_1b,
            e_2b,
            e_tot,
            e_corr: e_tot - e_hf,
            gf,
            se,
        })
    }

    /// The `nroots` lowest ionization energies over both spins.
    pub fn get_ip(&self, gf: &[GreensFunction; 2], nroots: usize) -> Vec<Excitation> {
        let mut states = excitations(gf, |g| g.get_occupied(), -1.0);
        states.truncate(nroots);
        states
    }

    /// The `nroots` lowest electron affinities over both spins.
    pub fn get_ea(&self, gf: &[GreensFunction; 2], nroots: usize) -> Vec<Excitation> {
        let mut states = excitations(gf, |g| g.get_virtual(), 1.0);
        states.truncate(nroots);
        states
    }
}

fn excitations<F>(gf: &[GreensFunction; 2], part: F, sign: f64) -> Vec<Excitation>
where
    F: Fn(&GreensFunction) -> GreensFunction,
{
    let mut states: Vec<Excitation> = Spin::BOTH
        .iter()
        .flat_map(|&spin| {
            let poles = part(&gf[spin.index()]);
            (0..poles.naux())
                .map(|k| Excitation {
                    spin,
                    energy: sign * poles.energy()[k],
                    coupling: poles.coupling().column(k).into_owned(),
                })
                .collect::<Vec<_>>()
        })
        .collect();
    states.sort_by(|a, b| a.energy.partial_cmp(&b.energy).unwrap_or(Ordering::Equal));
    states
}
