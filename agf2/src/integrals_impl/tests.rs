//! Tests for the integral container, Fock builder and tensor store

#[cfg(test)]
mod tests {
    use super::super::{get_jk, load_integrals, Eris, IntegralFile, Spin, Tensor4, TensorStore};
    use crate::error::Agf2Error;
    use crate::linalg::max_abs_diff;
    use crate::test_systems::{open_shell_eris, two_orbital_eris};
    use nalgebra::DMatrix;

    #[test]
    fn test_reference_fock_two_orbital() {
        let eris = two_orbital_eris();
        let expected = DMatrix::from_row_slice(2, 2, &[-0.75, 0.25, 0.25, 0.75]);
        for spin in Spin::BOTH {
            assert!(max_abs_diff(&eris.fock[spin.index()], &expected) < 1e-12);
        }
        assert!((eris.e_hf - (-1.75)).abs() < 1e-12);
    }

    #[test]
    fn test_cross_block_is_pair_transpose() {
        let eris = open_shell_eris();
        let [n0, n1, n2, n3] = eris.eri_ab.dims();
        for p in 0..n0 {
            for q in 0..n1 {
                for r in 0..n2 {
                    for s in 0..n3 {
                        assert_eq!(eris.eri_ab.get(p, q, r, s), eris.eri_ba.get(r, s, p, q));
                    }
                }
            }
        }
        assert!(std::ptr::eq(eris.eri(Spin::Beta, Spin::Alpha), &eris.eri_ba));
    }

    #[test]
    fn test_get_jk_matches_direct_sum() {
        let eris = open_shell_eris();
        let dm = DMatrix::from_row_slice(3, 3, &[0.9, 0.1, 0.0, 0.1, 0.5, 0.2, 0.0, 0.2, 0.1]);
        let (j, k) = get_jk(&eris.eri_aa, &dm, true);
        let k = k.expect("exchange requested");

        for p in 0..3 {
            for q in 0..3 {
                let mut j_ref = 0.0;
                let mut k_ref = 0.0;
                for r in 0..3 {
                    for s in 0..3 {
                        j_ref += eris.eri_aa.get(p, q, r, s) * dm[(r, s)];
                        k_ref += eris.eri_aa.get(p, r, q, s) * dm[(r, s)];
                    }
                }
                assert!((j[(p, q)] - j_ref).abs() < 1e-12);
                assert!((k[(p, q)] - k_ref).abs() < 1e-12);
            }
        }
        assert!(max_abs_diff(&j, &j.transpose()) < 1e-12);
    }

    #[test]
    fn test_open_shell_fock_is_symmetric() {
        let eris = open_shell_eris();
        for fock in &eris.fock {
            assert!(max_abs_diff(fock, &fock.transpose()) < 1e-12);
        }
        // The α and β densities differ, so do the Fock matrices.
        assert!(max_abs_diff(&eris.fock[0], &eris.fock[1]) > 1e-3);
        assert!(eris.homo_lumo_gap().is_some());
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let h = DMatrix::<f64>::zeros(2, 2);
        let good = Tensor4::zeros([2; 4]);
        let bad = Tensor4::zeros([2, 2, 3, 3]);
        let err = Eris::new([h.clone(), h], good.clone(), bad, good, [1, 1], 0.0).unwrap_err();
        match err {
            Agf2Error::Shape { what, .. } => assert_eq!(what, "eri_ab"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_too_many_electrons_rejected() {
        let h = DMatrix::<f64>::zeros(2, 2);
        let eri = Tensor4::zeros([2; 4]);
        let result = Eris::new([h.clone(), h], eri.clone(), eri.clone(), eri, [3, 1], 0.0);
        assert!(result.is_err());
    }

    #[test]
    fn test_homo_lumo_gap_uses_fock_eigenvalues() {
        // Reference Fock [[-0.75, 0.25], [0.25, 0.75]], eigenvalues ±sqrt(0.625).
        let eris = two_orbital_eris();
        let gap = eris.homo_lumo_gap().unwrap();
        assert!((gap - 2.0 * 0.625f64.sqrt()).abs() < 1e-12);

        // With h = 0 every Fock element is 0.25: a zero diagonal gap, but
        // eigenvalues 0 and 0.5.
        let h = DMatrix::<f64>::zeros(2, 2);
        let same = Tensor4::from_fn([2; 4], |_, _, _, _| 0.3);
        let cross = Tensor4::from_fn([2; 4], |_, _, _, _| 0.25);
        let eris = Eris::new([h.clone(), h], same.clone(), cross, same, [1, 1], 0.0).unwrap();
        assert!((eris.fock[0][(0, 0)] - eris.fock[0][(1, 1)]).abs() < 1e-12);
        assert!((eris.homo_lumo_gap().unwrap() - 0.5).abs() < 1e-12);

        // No virtual orbitals, no gap.
        let h = DMatrix::<f64>::zeros(2, 2);
        let eri = Tensor4::zeros([2; 4]);
        let full = Eris::new([h.clone(), h], eri.clone(), eri.clone(), eri, [2, 2], 0.0).unwrap();
        assert!(full.homo_lumo_gap().is_none());
    }

    #[test]
    fn test_store_blocks_roundtrip() {
        let mut store = TensorStore::new().unwrap();
        let full = Tensor4::from_fn([5, 2, 3, 2], |p, q, r, s| {
            (p * 100 + q * 10 + r) as f64 + 0.5 * s as f64
        });
        store.create("qmo/ab", full.dims()).unwrap();
        store.write_block("qmo/ab", 0, &full.leading_block(0, 2)).unwrap();
        store.write_block("qmo/ab", 2, &full.leading_block(2, 5)).unwrap();

        assert_eq!(store.read_all("qmo/ab").unwrap(), full);
        assert_eq!(store.read_block("qmo/ab", 1, 4).unwrap(), full.leading_block(1, 4));

        let stride = full.row_stride();
        let range = store.read_range("qmo/ab", 3 * stride + 2, 4).unwrap();
        assert_eq!(range, full.as_slice()[3 * stride + 2..3 * stride + 6].to_vec());
    }

    #[test]
    fn test_store_recreate_truncates_and_missing_key() {
        let mut store = TensorStore::new().unwrap();
        let ones = Tensor4::from_fn([2, 1, 1, 2], |_, _, _, _| 1.0);
        store.create("qmo/aa", ones.dims()).unwrap();
        store.write_block("qmo/aa", 0, &ones).unwrap();
        store.create("qmo/aa", [3, 1, 1, 1]).unwrap();
        assert_eq!(store.read_all("qmo/aa").unwrap(), Tensor4::zeros([3, 1, 1, 1]));

        assert!(matches!(
            store.read_all("qmo/bb"),
            Err(Agf2Error::MissingDataset(_))
        ));
        let wrong = Tensor4::zeros([1, 2, 2, 2]);
        assert!(store.write_block("qmo/aa", 0, &wrong).is_err());
    }

    const TWO_ORBITAL_YAML: &str = "
nocc: [1, 1]
e_nuc: 0.5
h1e:
  alpha: [[-1.0, 0.0], [0.0, 0.5]]
  beta: [[-1.0, 0.0], [0.0, 0.5]]
eri:
  aa: [0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3]
  ab: [0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25, 0.25]
  bb: [0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3]
";

    #[test]
    fn test_integral_file_matches_model() {
        let eris = IntegralFile::from_yaml_str(TWO_ORBITAL_YAML)
            .unwrap()
            .into_eris()
            .unwrap();
        let model = two_orbital_eris();
        assert_eq!(eris.nmo, [2, 2]);
        assert_eq!(eris.nocc, [1, 1]);
        assert!(eris.eri_ab.max_abs_diff(&model.eri_ab) < 1e-15);
        assert!((eris.e_hf - (model.e_hf + 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_load_integrals_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h2.yaml");
        std::fs::write(&path, TWO_ORBITAL_YAML).unwrap();
        let eris = load_integrals(&path).unwrap();
        assert!((eris.e_hf - (-1.25)).abs() < 1e-12);

        assert!(matches!(
            load_integrals(dir.path().join("missing.yaml")),
            Err(Agf2Error::Io(_))
        ));
    }

    #[test]
    fn test_integral_file_errors() {
        let truncated = TWO_ORBITAL_YAML.replace("bb: [0.3, 0.3,", "bb: [");
        let err = IntegralFile::from_yaml_str(&truncated)
            .unwrap()
            .into_eris()
            .unwrap_err();
        assert!(matches!(err, Agf2Error::Shape { .. }));

        let ragged = TWO_ORBITAL_YAML.replace(
            "alpha: [[-1.0, 0.0], [0.0, 0.5]]",
            "alpha: [[-1.0], [0.0, 0.5]]",
        );
        let err = IntegralFile::from_yaml_str(&ragged).unwrap().into_eris().unwrap_err();
        assert!(err.to_string().contains("h1e (alpha)"));

        assert!(matches!(
            IntegralFile::from_yaml_str("nocc: not-a-list"),
            Err(Agf2Error::Parse(_))
        ));
    }
}
