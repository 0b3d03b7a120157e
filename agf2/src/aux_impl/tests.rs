//! Tests for auxiliary spaces and chemical-potential searches

#[cfg(test)]
mod tests {
    use super::super::{
        binsearch_chempot, minimize_chempot, GreensFunction, SelfEnergy,
    };
    use crate::linalg::max_abs_diff;
    use nalgebra::{DMatrix, DVector};
    use proptest::prelude::*;

    fn sample_gf() -> GreensFunction {
        let energy = DVector::from_vec(vec![-2.0, -0.5, 0.3, 1.7]);
        let coupling = DMatrix::from_row_slice(
            2,
            4,
            &[0.9, 0.1, 0.3, 0.0, 0.2, 0.8, 0.1, 0.5],
        );
        GreensFunction::new(energy, coupling, 0.0)
    }

    #[test]
    fn test_occupied_virtual_split() {
        let gf = sample_gf();
        let occ = gf.get_occupied();
        let vir = gf.get_virtual();
        assert_eq!(occ.naux(), 2);
        assert_eq!(vir.naux(), 2);
        assert_eq!(occ.energy().as_slice(), &[-2.0, -0.5]);
        assert_eq!(vir.energy().as_slice(), &[0.3, 1.7]);
        assert_eq!(occ.coupling().column(1), gf.coupling().column(1));
        assert_eq!(vir.chempot, gf.chempot);
    }

    #[test]
    fn test_combine_keeps_order_and_first_chempot() {
        let gf = sample_gf();
        let mut vir = gf.get_virtual();
        vir.chempot = 5.0;
        let joined = vir.combine(&gf.get_occupied());
        assert_eq!(joined.energy().as_slice(), &[0.3, 1.7, -2.0, -0.5]);
        assert_eq!(joined.chempot, 5.0);
        assert_eq!(joined.coupling().column(2), gf.coupling().column(0));
    }

    #[test]
    fn test_remove_uncoupled_drops_small_weights() {
        let energy = DVector::from_vec(vec![-1.0, 0.5, 2.0]);
        let coupling = DMatrix::from_row_slice(2, 3, &[0.5, 1e-7, 0.0, 0.5, 0.0, 0.3]);
        let se = SelfEnergy::new(energy, coupling, 0.0);
        let kept = se.remove_uncoupled(1e-11);
        assert_eq!(kept.naux(), 2);
        assert_eq!(kept.energy().as_slice(), &[-1.0, 2.0]);
        assert!(kept.weights().iter().all(|&w| w >= 1e-11));
    }

    #[test]
    fn test_moments() {
        let gf = sample_gf();
        let c = gf.coupling();
        let zeroth = gf.moment(0);
        assert!(max_abs_diff(&zeroth, &(c * c.transpose())) < 1e-14);

        let first = gf.moment(1);
        let mut expected = DMatrix::zeros(2, 2);
        for k in 0..gf.naux() {
            let col = c.column(k);
            expected += (col * col.transpose()) * gf.energy()[k];
        }
        assert!(max_abs_diff(&first, &expected) < 1e-14);
    }

    #[test]
    fn test_extended_hamiltonian_layout() {
        let fock = DMatrix::from_row_slice(2, 2, &[-1.0, 0.1, 0.1, 0.5]);
        let se = SelfEnergy::new(
            DVector::from_vec(vec![-3.0, 2.0]),
            DMatrix::from_row_slice(2, 2, &[0.1, 0.2, 0.3, 0.4]),
            0.0,
        );
        let array = se.get_array(&fock, 0.5);
        assert_eq!(array.nrows(), 4);
        assert_eq!(array[(0, 1)], 0.1);
        assert_eq!(array[(1, 3)], 0.4);
        assert_eq!(array[(3, 1)], 0.4);
        assert_eq!(array[(2, 2)], -3.5);
        assert_eq!(array[(3, 3)], 1.5);
        assert_eq!(array[(2, 3)], 0.0);
    }

    #[test]
    fn test_binsearch_between_states() {
        let w = DVector::from_vec(vec![-2.0, -1.0, 1.0, 2.0]);
        let v = DMatrix::identity(4, 4);
        let search = binsearch_chempot(&w, &v, 4, 2.0);
        assert_eq!(search.chempot, 0.0);
        assert_eq!(search.error, 0.0);

        let full = binsearch_chempot(&w, &v, 4, 4.0);
        assert!((full.chempot - (2.0 + 1e-6)).abs() < 1e-15);
        assert_eq!(full.error, 0.0);

        let empty = binsearch_chempot(&w, &v, 4, 0.0);
        assert!((empty.chempot - (-2.0 - 1e-6)).abs() < 1e-15);
        assert_eq!(empty.error, 0.0);
    }

    #[test]
    fn test_binsearch_picks_nearest_count() {
        // Physical weights 0.6, 0.3, 0.1 for a single physical orbital.
        let w = DVector::from_vec(vec![-1.0, 0.0, 1.0]);
        let v = DMatrix::from_row_slice(
            2,
            3,
            &[0.6f64.sqrt(), 0.3f64.sqrt(), 0.1f64.sqrt(), 0.0, 0.0, 0.0],
        );
        let search = binsearch_chempot(&w, &v, 1, 0.8);
        // 0.9 is closer to 0.8 than 0.6 is.
        assert!((search.chempot - 0.5).abs() < 1e-14);
        assert!((search.error - (0.8 - 0.9)).abs() < 1e-12);
    }

    #[test]
    fn test_minimize_chempot_reaches_target() {
        let fock = DMatrix::from_element(1, 1, 0.0);
        let mut se = SelfEnergy::new(
            DVector::from_vec(vec![-1.0, 1.0]),
            DMatrix::from_row_slice(1, 2, &[0.3, 0.3]),
            0.0,
        );
        let before = se.energy().clone();
        let search = minimize_chempot(&mut se, &fock, 0.5, 1e-6, 100);
        assert!(search.error.abs() < 1e-6);
        assert_eq!(se.chempot, search.chempot);

        // The shift is uniform over the poles.
        let shift = before[0] - se.energy()[0];
        assert!((before[1] - se.energy()[1] - shift).abs() < 1e-14);

        let (w, v) = se.eig(&fock, 0.0);
        let check = binsearch_chempot(&w, &v, 1, 0.5);
        assert!(check.error.abs() < 1e-6);
    }

    #[test]
    fn test_minimize_chempot_noop_when_converged() {
        let fock = DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, 1.0]);
        let mut se = SelfEnergy::new(
            DVector::from_vec(vec![-4.0, 4.0]),
            DMatrix::from_row_slice(2, 2, &[1e-4, 0.0, 0.0, 1e-4]),
            0.0,
        );
        let before = se.energy().clone();
        // Poles far from the physical states carry negligible weight, so
        // one electron already sits below zero.
        let search = minimize_chempot(&mut se, &fock, 1.0, 1e-6, 50);
        assert!(search.error.abs() < 1e-6);
        assert_eq!(se.energy(), &before);
    }

    #[test]
    fn test_greens_function_from_self_energy() {
        let fock = DMatrix::from_row_slice(2, 2, &[-0.75, 0.25, 0.25, 0.75]);
        let se = SelfEnergy::new(
            DVector::from_vec(vec![-2.4, 2.4]),
            DMatrix::from_row_slice(2, 2, &[0.1, 0.05, 0.05, 0.1]),
            0.0,
        );
        let gf = se.get_greens_function(&fock, 1.0);
        assert_eq!(gf.naux(), 4);
        assert_eq!(gf.nphys(), 2);

        // The physical rows of a complete eigenbasis resolve the identity.
        let total = gf.coupling() * gf.coupling().transpose();
        assert!(max_abs_diff(&total, &DMatrix::identity(2, 2)) < 1e-12);

        let rdm1 = gf.make_rdm1();
        assert!((rdm1.trace() - 1.0).abs() < 0.05);
        assert!(max_abs_diff(&rdm1, &rdm1.transpose()) < 1e-14);
    }

    proptest! {
        #[test]
        fn prop_occupied_and_virtual_partition(
            energies in prop::collection::vec(-5.0f64..5.0, 0..12),
            chempot in -5.0f64..5.0,
        ) {
            let n = energies.len();
            let coupling = DMatrix::from_fn(3, n, |x, k| (x + k) as f64 * 0.1);
            let gf = GreensFunction::new(DVector::from_vec(energies.clone()), coupling, chempot);
            let occ = gf.get_occupied();
            let vir = gf.get_virtual();

            prop_assert_eq!(occ.naux() + vir.naux(), n);
            prop_assert!(occ.energy().iter().all(|&e| e <= chempot));
            prop_assert!(vir.energy().iter().all(|&e| e > chempot));

            let mut joined: Vec<f64> = occ.combine(&vir).energy().iter().copied().collect();
            let mut sorted = energies;
            joined.sort_by(|a, b| a.partial_cmp(b).unwrap());
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            prop_assert_eq!(joined, sorted);
        }
    }
}
