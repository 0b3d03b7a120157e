//! Tests for the energy evaluator

#[cfg(test)]
mod tests {
    use super::super::{energy_1body, energy_2body, energy_mp2, galitskii_migdal};
    use crate::aux_impl::{GreensFunction, SelfEnergy};
    use crate::integrals_impl::{Eris, Spin, Tensor4, TensorStore};
    use crate::options::Agf2Options;
    use crate::qmo_impl::FixedMemory;
    use crate::se_impl::build_se;
    use crate::test_systems::{open_shell_eris, two_orbital_eris};
    use nalgebra::{DMatrix, DVector};

    fn seed(eris: &Eris) -> ([GreensFunction; 2], [SelfEnergy; 2]) {
        let gf = Spin::BOTH.map(|spin| {
            let s = spin.index();
            GreensFunction::from_fock(&eris.fock[s], eris.nocc[s] as f64)
        });
        let mut store = TensorStore::new().unwrap();
        let se = build_se(eris, &gf, &Agf2Options::default(), &FixedMemory(0.0), &mut store)
            .unwrap();
        (gf, se)
    }

    #[test]
    fn test_seed_energy_is_half_two_body() {
        for eris in [two_orbital_eris(), open_shell_eris()] {
            let (gf, se) = seed(&eris);
            let e2b = energy_2body(&gf, &se);
            let emp2 = energy_mp2(&gf, &se);
            assert_eq!(emp2, e2b * 0.5);
            assert!(emp2 < 0.0);
        }
    }

    #[test]
    fn test_two_orbital_seed_energy() {
        let eris = two_orbital_eris();
        let (gf, se) = seed(&eris);
        assert!((energy_mp2(&gf, &se) - (-0.01600903065)).abs() < 1e-9);
    }

    #[test]
    fn test_galitskii_migdal_by_hand() {
        let gf = GreensFunction::new(
            DVector::from_vec(vec![-1.0, 0.5]),
            DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]),
            0.0,
        );
        let se = SelfEnergy::new(
            DVector::from_vec(vec![-3.0, 2.0]),
            DMatrix::from_row_slice(2, 2, &[0.4, 0.2, 0.1, 0.3]),
            0.0,
        );
        // Only the occupied pole at -1 and the virtual pole at 2 contribute.
        let expected = 2.0 * 0.2 * 0.2 / (-1.0 - 2.0);
        assert!((galitskii_migdal(&gf, &se) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_one_body_energy_includes_nuclear_repulsion() {
        let h = DMatrix::from_row_slice(2, 2, &[-1.0, 0.0, 0.0, 0.5]);
        let same = Tensor4::from_fn([2; 4], |_, _, _, _| 0.3);
        let cross = Tensor4::from_fn([2; 4], |_, _, _, _| 0.25);
        let shifted = Eris::new(
            [h.clone(), h],
            same.clone(),
            cross,
            same,
            [1, 1],
            1.5,
        )
        .unwrap();
        let plain = two_orbital_eris();

        let (gf, _) = seed(&plain);
        let diff = energy_1body(&shifted, &gf) - energy_1body(&plain, &gf);
        assert!((diff - 1.5).abs() < 1e-12);
        assert!((shifted.e_hf - plain.e_hf - 1.5).abs() < 1e-12);
    }
}
