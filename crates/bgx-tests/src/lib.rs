//! Integration tests for bgx-rs crates.
//!
//! End-to-end checks of the translation pipeline across the math,
//! primaries, transfer and color crates.

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use bgx_color::cam02::{jmh_to_xyz, rgb_to_xyz, xyz_to_jmh};
    use bgx_color::{
        Background, ColorError, Encoding, GamutMapOptions, Jmh, Method, ViewingConditions,
        from_uniform, lookup_conditions, map_batch_to_gamut, map_to_gamut, to_uniform, translate,
        translate_batch,
    };
    use bgx_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn presets() -> Vec<ViewingConditions> {
        Background::ALL.iter().map(|bg| bg.conditions().unwrap()).collect()
    }

    fn random_colors(seed: u64, n: usize, lo: f64, hi: f64) -> Vec<Vec3> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Vec3::new(rng.gen_range(lo..=hi), rng.gen_range(lo..=hi), rng.gen_range(lo..=hi)))
            .collect()
    }

    fn assert_close(a: Vec3, b: Vec3, tol: f64, what: &str) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < tol, "{}: {:?} vs {:?}", what, a, b);
        }
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    #[test]
    fn test_transfer_roundtrip() {
        let enc = Encoding::srgb().unwrap();
        for c in random_colors(1, 500, 0.0, 1.0) {
            assert_close(enc.decode(enc.encode(c)), c, 1e-6, "decode(encode)");
            assert_close(enc.encode(enc.decode(c)), c, 1e-6, "encode(decode)");
        }
    }

    #[test]
    fn test_matrix_roundtrip() {
        let enc = Encoding::srgb().unwrap();
        for c in random_colors(2, 500, 0.0, 1.0) {
            assert_close(enc.xyz_to_rgb(enc.rgb_to_xyz(c)), c, 1e-6, "xyz_to_rgb(rgb_to_xyz)");
        }
    }

    #[test]
    fn test_matrix_matches_derived_primaries() {
        let enc = Encoding::srgb().unwrap();
        let derived = bgx_primaries::rgb_to_xyz_matrix(&bgx_primaries::SRGB).unwrap();
        assert_eq!(enc.rgb_to_xyz_matrix(), derived);
    }

    // ========================================================================
    // Appearance model and uniform space
    // ========================================================================

    #[test]
    fn test_appearance_roundtrip_all_presets() {
        for vc in presets() {
            for rgb in random_colors(3, 300, 0.0, 1.0) {
                let xyz = rgb_to_xyz(rgb, &vc);
                let back = jmh_to_xyz(xyz_to_jmh(xyz, &vc), &vc);
                for i in 0..3 {
                    let tol = 1e-4 * xyz[i].abs().max(1e-3);
                    assert!(
                        (back[i] - xyz[i]).abs() <= tol,
                        "Y_b={} rgb={:?}: {:?} vs {:?}",
                        vc.y_b,
                        rgb,
                        xyz,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn test_uniform_roundtrip() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1000 {
            let jmh = Jmh::new(
                rng.gen_range(0.0..=100.0),
                rng.gen_range(0.0..=50.0),
                rng.gen_range(0.0..360.0),
            );
            let back = from_uniform(to_uniform(jmh));
            assert_abs_diff_eq!(back.j, jmh.j, epsilon = 1e-9);
            assert_abs_diff_eq!(back.m, jmh.m, epsilon = 1e-9);
            let dh = (back.h - jmh.h + 180.0).rem_euclid(360.0) - 180.0;
            assert!(dh.abs() < 1e-6 || jmh.m < 1e-9, "{:?} -> {:?}", jmh, back);
        }
    }

    #[test]
    fn test_correlate_ranges() {
        for vc in presets() {
            for rgb in random_colors(5, 200, 0.0, 1.0) {
                let jmh = xyz_to_jmh(rgb_to_xyz(rgb, &vc), &vc);
                assert!(jmh.j >= 0.0 && jmh.j <= 100.0 + 1e-9, "J = {}", jmh.j);
                assert!(jmh.m >= 0.0, "M = {}", jmh.m);
                assert!((0.0..360.0).contains(&jmh.h), "h = {}", jmh.h);
            }
        }
    }

    // ========================================================================
    // Gamut mapping
    // ========================================================================

    #[test]
    fn test_gamut_fast_path() {
        let vc = lookup_conditions("neutral").unwrap();
        for c in random_colors(6, 200, 0.0, 1.0) {
            assert_eq!(map_to_gamut(c, &vc).unwrap(), c);
        }
    }

    #[test]
    fn test_gamut_invariant_and_idempotence() {
        for vc in presets() {
            let mut colors = random_colors(7, 24, -10.0, 10.0);
            colors.push(Vec3::new(-5.0, 10.0, 0.3));
            for c in colors {
                let once = map_to_gamut(c, &vc).unwrap();
                assert!(once.in_unit_cube(), "{:?} -> {:?}", c, once);
                assert_eq!(map_to_gamut(once, &vc).unwrap(), once);
            }
        }
    }

    #[test]
    fn test_gamut_methods_agree_on_easy_case() {
        let vc = lookup_conditions("neutral").unwrap();
        let rgb = Vec3::new(1.05, 0.5, 0.3);
        let reference = map_to_gamut(rgb, &vc).unwrap();
        for method in Method::ALL {
            let options = GamutMapOptions::for_method(method);
            let out = bgx_color::map_to_gamut_with(rgb, &vc, &options).unwrap();
            assert!(out.rgb.in_unit_cube());
            assert_close(out.rgb, reference, 0.05, method.name());
        }
    }

    #[test]
    fn test_gamut_keeps_blue_with_negative_channels() {
        for vc in presets() {
            let out = map_to_gamut(Vec3::new(-0.3, -0.3, 1.0), &vc).unwrap();
            assert!(out.z > 0.9 && out.x < 0.1 && out.y < 0.1, "Y_b={}: {:?}", vc.y_b, out);
        }
    }

    #[test]
    fn test_gamut_batch_isolates_failures() {
        let vc = lookup_conditions("light").unwrap();
        let colors = vec![Vec3::new(1.5, 0.2, 0.2), Vec3::new(f64::NAN, 0.0, 0.0), Vec3::splat(0.5)];
        let out = map_batch_to_gamut(&colors, &vc, &GamutMapOptions::default());
        assert_eq!(out.len(), 3);
        assert!(out[0].as_ref().unwrap().in_unit_cube());
        assert!(matches!(out[1], Err(ColorError::InvalidValue(_))));
        assert_eq!(out[2].as_ref().unwrap(), &Vec3::splat(0.5));
    }

    // ========================================================================
    // Translation
    // ========================================================================

    #[test]
    fn test_translate_identity() {
        for vc in presets() {
            for c in [Vec3::splat(0.5), Vec3::new(0.2, 0.7, 0.9)] {
                let out = translate(c, &vc, &vc, 1.0, 1.0).unwrap();
                assert_close(out, c, 1e-3, "identity");
            }
        }
    }

    #[test]
    fn test_translate_white_neutral() {
        let neutral = lookup_conditions("neutral").unwrap();
        let out = translate(Vec3::ONE, &neutral, &neutral, 1.0, 1.0).unwrap();
        assert_close(out, Vec3::ONE, 1e-3, "white");
    }

    #[test]
    fn test_translate_black_dark_to_light() {
        let dark = lookup_conditions("dark").unwrap();
        let light = lookup_conditions("light").unwrap();
        let out = translate(Vec3::ZERO, &dark, &light, 1.0, 1.0).unwrap();
        assert!(out.is_finite());
        assert!(out.in_unit_cube());
    }

    #[test]
    fn test_translate_achromatic_preserved() {
        let all = presets();
        for src in &all {
            for dst in &all {
                for v in [0.05, 0.3, 0.6, 0.95] {
                    let out = translate(Vec3::splat(v), src, dst, 1.0, 1.0).unwrap();
                    let spread = out.max_element() - out.min_element();
                    assert!(spread < 1e-3, "{} {}->{}: {:?}", v, src.y_b, dst.y_b, out);
                }
            }
        }
    }

    #[test]
    fn test_translate_batch_matches_single() {
        let dark = lookup_conditions("dark").unwrap();
        let light = lookup_conditions("light").unwrap();
        let colors = random_colors(8, 32, 0.0, 1.0);
        let batch = translate_batch(&colors, &dark, &light, 1.1, 0.9);
        assert_eq!(batch.len(), colors.len());
        for (c, out) in colors.iter().zip(&batch) {
            let single = translate(*c, &dark, &light, 1.1, 0.9).unwrap();
            assert_eq!(out.as_ref().unwrap(), &single);
        }
    }

    #[test]
    fn test_translate_outputs_in_gamut() {
        let all = presets();
        for src in &all {
            for dst in &all {
                for c in random_colors(9, 12, 0.0, 1.0) {
                    let out = translate(c, src, dst, 1.0, 1.3).unwrap();
                    assert!(out.in_unit_cube(), "{:?} -> {:?}", c, out);
                }
            }
        }
    }

    #[test]
    fn test_colourfulness_boost_keeps_hue_family() {
        let all = presets();
        for src in &all {
            for dst in &all {
                for fg in [Vec3::new(0.1, 0.1, 0.9), Vec3::new(0.0, 0.0, 1.0)] {
                    let out = translate(fg, src, dst, 1.0, 1.5).unwrap();
                    assert!(out.in_unit_cube());
                    assert!(out.z > out.x.max(out.y) + 0.3, "{}->{}: {:?}", src.y_b, dst.y_b, out);
                }
            }
        }
    }

    #[test]
    fn test_unknown_conditions() {
        assert!(matches!(lookup_conditions("sepia"), Err(ColorError::UnknownConditions(_))));
    }
}
