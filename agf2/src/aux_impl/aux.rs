//! Auxiliary pole representation shared by Green's functions and self-energies

extern crate nalgebra as na;

use na::{DMatrix, DVector};
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::debug;

use super::chempot::binsearch_chempot;
use crate::linalg::{eigh, scale_columns};

/// Marker distinguishing the two kinds of auxiliary space at the type level.
pub trait AuxKind: Debug + Clone + Copy + Default + Send + Sync + 'static {
    const NAME: &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GfKind;

#[derive(Debug, Clone, Copy, Default)]
pub struct SeKind;

impl AuxKind for GfKind {
    const NAME: &'static str = "Green's function";
}

impl AuxKind for SeKind {
    const NAME: &'static str = "self-energy";
}

/// A set of poles with energies `energy[k]`, couplings `coupling[:, k]` to
/// the physical orbitals and a chemical potential.
#[derive(Debug, Clone)]
pub struct AuxSpace<K: AuxKind> {
    energy: DVector<f64>,
    coupling: DMatrix<f64>,
    pub chempot: f64,
    _kind: PhantomData<K>,
}

pub type GreensFunction = AuxSpace<GfKind>;
pub type SelfEnergy = AuxSpace<SeKind>;

impl<K: AuxKind> AuxSpace<K> {
    pub fn new(energy: DVector<f64>, coupling: DMatrix<f64>, chempot: f64) -> Self {
        debug_assert_eq!(energy.len(), coupling.ncols());
        AuxSpace {
            energy,
            coupling,
            chempot,
            _kind: PhantomData,
        }
    }

    /// A space with no poles over `nphys` physical orbitals.
    pub fn empty(nphys: usize, chempot: f64) -> Self {
        Self::new(DVector::zeros(0), DMatrix::zeros(nphys, 0), chempot)
    }

    pub fn energy(&self) -> &DVector<f64> {
        &self.energy
    }

    pub fn coupling(&self) -> &DMatrix<f64> {
        &self.coupling
    }

    pub fn nphys(&self) -> usize {
        self.coupling.nrows()
    }

    pub fn naux(&self) -> usize {
        self.energy.len()
    }

    /// Sub-space made of the poles listed in `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        let energy = DVector::from_fn(indices.len(), |k, _| self.energy[indices[k]]);
        Self::new(energy, self.coupling.select_columns(indices), self.chempot)
    }

    pub fn get_occupied(&self) -> Self {
        let indices: Vec<usize> = (0..self.naux())
            .filter(|&k| self.energy[k] <= self.chempot)
            .collect();
        self.select(&indices)
    }

    pub fn get_virtual(&self) -> Self {
        let indices: Vec<usize> = (0..self.naux())
            .filter(|&k| self.energy[k] > self.chempot)
            .collect();
        self.select(&indices)
    }

    /// Spectral weight `Σ_x c_xk²` of each pole.
    pub fn weights(&self) -> DVector<f64> {
        DVector::from_fn(self.naux(), |k, _| self.coupling.column(k).norm_squared())
    }

    /// Drop poles whose spectral weight is below `tol`.
    pub fn remove_uncoupled(&self, tol: f64) -> Self {
        let weights = self.weights();
        let indices: Vec<usize> = (0..self.naux()).filter(|&k| weights[k] >= tol).collect();
        if indices.len() < self.naux() {
            debug!(
                "Removed {} uncoupled {} poles",
                self.naux() - indices.len(),
                K::NAME
            );
        }
        self.select(&indices)
    }

    /// Spectral moment `Σ_k c_k ε_k^n c_kᵀ`.
    pub fn moment(&self, n: i32) -> DMatrix<f64> {
        let factors = self.energy.map(|e| e.powi(n));
        scale_columns(&self.coupling, &factors) * self.coupling.transpose()
    }

    /// Poles of `self` followed by those of `other`; keeps `self`'s
    /// chemical potential.
    pub fn combine(&self, other: &Self) -> Self {
        debug_assert_eq!(self.nphys(), other.nphys());
        let naux = self.naux() + other.naux();
        let mut energy = DVector::zeros(naux);
        energy.rows_mut(0, self.naux()).copy_from(&self.energy);
        energy.rows_mut(self.naux(), other.naux()).copy_from(&other.energy);

        let mut coupling = DMatrix::zeros(self.nphys(), naux);
        coupling.columns_mut(0, self.naux()).copy_from(&self.coupling);
        coupling
            .columns_mut(self.naux(), other.naux())
            .copy_from(&other.coupling);

        Self::new(energy, coupling, self.chempot)
    }

    /// Extended Hamiltonian `[[phys, C], [Cᵀ, diag(ε - shift)]]`.
    pub fn get_array(&self, phys: &DMatrix<f64>, shift: f64) -> DMatrix<f64> {
        let nphys = self.nphys();
        let naux = self.naux();
        debug_assert_eq!((phys.nrows(), phys.ncols()), (nphys, nphys));

        let mut array = DMatrix::zeros(nphys + naux, nphys + naux);
        array.view_mut((0, 0), (nphys, nphys)).copy_from(phys);
        array.view_mut((0, nphys), (nphys, naux)).copy_from(&self.coupling);
        array
            .view_mut((nphys, 0), (naux, nphys))
            .copy_from(&self.coupling.transpose());
        for k in 0..naux {
            array[(nphys + k, nphys + k)] = self.energy[k] - shift;
        }
        array
    }

    /// Eigenpairs of the extended Hamiltonian with pole energies shifted by
    /// `-shift`, in ascending order.
    pub fn eig(&self, phys: &DMatrix<f64>, shift: f64) -> (DVector<f64>, DMatrix<f64>) {
        eigh(self.get_array(phys, shift))
    }

    /// Move every pole energy by `-shift`.
    pub fn shift_energies(&mut self, shift: f64) {
        self.energy.add_scalar_mut(-shift);
    }
}

impl GreensFunction {
    /// Mean-field Green's function: eigenpairs of `fock` with the chemical
    /// potential placed for `nelec` electrons.
    pub fn from_fock(fock: &DMatrix<f64>, nelec: f64) -> Self {
        let nphys = fock.nrows();
        let (w, v) = eigh(fock.clone());
        let search = binsearch_chempot(&w, &v, nphys, nelec);
        GreensFunction::new(w, v, search.chempot)
    }

    /// Green's function from eigenpairs of an extended Hamiltonian, keeping
    /// only the physical rows of the eigenvectors.
    pub fn from_eigen(w: DVector<f64>, v: &DMatrix<f64>, nphys: usize, chempot: f64) -> Self {
        let coupling = v.rows(0, nphys).into_owned();
        GreensFunction::new(w, coupling, chempot)
    }

    /// One-particle density matrix `Σ_{k occ} c_k c_kᵀ` with unit occupancy.
    pub fn make_rdm1(&self) -> DMatrix<f64> {
        let occ = self.get_occupied();
        &occ.coupling * occ.coupling.transpose()
    }
}

impl SelfEnergy {
    /// Solve the Dyson equation for the Green's function of `fock` coupled
    /// to this self-energy, placing its chemical potential so that it holds
    /// `nelec` electrons.
    pub fn get_greens_function(&self, fock: &DMatrix<f64>, nelec: f64) -> GreensFunction {
        let nphys = self.nphys();
        let (w, v) = self.eig(fock, 0.0);
        let search = binsearch_chempot(&w, &v, nphys, nelec);
        GreensFunction::from_eigen(w, &v, nphys, search.chempot)
    }
}
