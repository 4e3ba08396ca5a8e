use num_complex::Complex64;
use serde::Deserialize;
use sht_core::{
    ExecutionMode, GridOptions, Sampling, ShTransform, ShtConfig, ShtErrorKind, TransformSpec,
    load_transform_spec, nlm_calc,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

#[derive(Debug, Deserialize)]
struct RoundTripFixtures {
    cases: Vec<RoundTripCase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoundTripCase {
    id: String,
    spec: TransformSpec,
    abs_tol: f64,
}

fn load_fixtures() -> RoundTripFixtures {
    let path = fixtures_dir().join("round_trip_cases.json");
    let source = fs::read_to_string(&path)
        .unwrap_or_else(|error| panic!("failed to read '{}': {}", path.display(), error));
    serde_json::from_str(&source)
        .unwrap_or_else(|error| panic!("failed to parse '{}': {}", path.display(), error))
}

fn build(spec: &TransformSpec) -> ShTransform {
    ShTransform::with_grid(spec.config, spec.grid.unwrap_or_default())
        .unwrap_or_else(|error| panic!("transform should build: {error}"))
}

/// Deterministic coefficients: real at `m = 0`, optionally zero at `l = 0`.
fn test_spectrum(transform: &ShTransform, seed: u64, skip_degree_zero: bool) -> Vec<Complex64> {
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 11) as f64 / (1_u64 << 53) as f64) * 2.0 - 1.0
    };
    transform
        .index()
        .pairs()
        .map(|(l, m)| {
            let re = next();
            let im = next();
            if skip_degree_zero && l == 0 {
                Complex64::new(0.0, 0.0)
            } else if m == 0 {
                Complex64::new(re, 0.0)
            } else {
                Complex64::new(re, im)
            }
        })
        .collect()
}

fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
    let abs_diff = (actual - expected).abs();
    let rel_diff = abs_diff / expected.abs().max(1.0);

    assert!(
        abs_diff <= abs_tol || rel_diff <= rel_tol,
        "{} expected={:.15e} actual={:.15e} abs_diff={:.15e} rel_diff={:.15e} abs_tol={:.15e} rel_tol={:.15e}",
        label,
        expected,
        actual,
        abs_diff,
        rel_diff,
        abs_tol,
        rel_tol
    );
}

fn assert_complex_vector_close(
    label: &str,
    expected: &[Complex64],
    actual: &[Complex64],
    abs_tol: f64,
) {
    assert_eq!(expected.len(), actual.len(), "{label} length mismatch");
    for (index, (lhs, rhs)) in expected.iter().zip(actual).enumerate() {
        let abs_diff = (lhs - rhs).norm();
        assert!(
            abs_diff <= abs_tol,
            "{label}[{index}] expected=({:.15e},{:.15e}) actual=({:.15e},{:.15e}) abs_diff={:.15e}",
            lhs.re,
            lhs.im,
            rhs.re,
            rhs.im,
            abs_diff
        );
    }
}

#[test]
fn fixture_configurations_round_trip_scalar_and_vector_fields() {
    let fixtures = load_fixtures();
    assert!(!fixtures.cases.is_empty());

    for case in &fixtures.cases {
        let transform = build(&case.spec);

        let scalar = test_spectrum(&transform, 11, false);
        let spatial = transform.synthesize(&scalar).expect("scalar synthesis");
        assert_eq!(spatial.dim(), transform.spat_shape().expect("grid"));
        let recovered = transform.analyze(spatial.view()).expect("scalar analysis");
        assert_complex_vector_close(&format!("{} scalar", case.id), &scalar, &recovered, case.abs_tol);

        let spheroidal = test_spectrum(&transform, 23, true);
        let toroidal = test_spectrum(&transform, 37, true);
        let (v_theta, v_phi) = transform
            .synthesize_vector(&spheroidal, &toroidal)
            .expect("vector synthesis");
        let (s_back, t_back) = transform
            .analyze_vector(v_theta.view(), v_phi.view())
            .expect("vector analysis");
        assert_complex_vector_close(&format!("{} spheroidal", case.id), &spheroidal, &s_back, case.abs_tol);
        assert_complex_vector_close(&format!("{} toroidal", case.id), &toroidal, &t_back, case.abs_tol);
    }
}

#[test]
fn synthesis_is_linear_and_execution_mode_independent() {
    let config = ShtConfig::new(18, 12, 1);
    let serial = ShTransform::with_grid(config, GridOptions::default()).expect("transform");
    let parallel = ShTransform::with_grid(
        config.with_execution(ExecutionMode::Parallel),
        GridOptions::default(),
    )
    .expect("transform");

    let a = test_spectrum(&serial, 1, false);
    let b = test_spectrum(&serial, 2, false);
    let (alpha, beta) = (0.3, -2.1);
    let combined: Vec<Complex64> = a.iter().zip(&b).map(|(x, y)| x * alpha + y * beta).collect();

    let field_a = serial.synthesize(&a).expect("synthesis");
    let field_b = serial.synthesize(&b).expect("synthesis");
    let field_combined = serial.synthesize(&combined).expect("synthesis");
    for ((x, y), z) in field_a.iter().zip(field_b.iter()).zip(field_combined.iter()) {
        assert_scalar_close("linearity", alpha * x + beta * y, *z, 1.0e-12, 1.0e-12);
    }

    assert_eq!(field_combined, parallel.synthesize(&combined).expect("synthesis"));
    let s = test_spectrum(&serial, 3, true);
    let t = test_spectrum(&serial, 4, true);
    assert_eq!(
        serial.synthesize_vector(&s, &t).expect("vector"),
        parallel.synthesize_vector(&s, &t).expect("vector")
    );
}

#[test]
fn index_map_matches_the_documented_order() {
    assert_eq!(nlm_calc(2, 2, 1), 6);
    let transform = ShTransform::new(ShtConfig::triangular(2)).expect("transform");
    let pairs: Vec<(usize, usize)> = transform.index().pairs().collect();
    assert_eq!(pairs, vec![(0, 0), (1, 0), (2, 0), (1, 1), (2, 1), (2, 2)]);
    for (position, (l, m)) in pairs.iter().enumerate() {
        assert_eq!(transform.linear_index(*l, *m).expect("stored"), position);
    }

    let transform = ShTransform::new(ShtConfig::new(20, 5, 4)).expect("transform");
    assert_eq!(transform.nlm(), nlm_calc(20, 5, 4));
    let mut seen = vec![false; transform.nlm()];
    for (l, m) in transform.index().pairs() {
        let position = transform.linear_index(l, m).expect("stored");
        assert!(!seen[position]);
        seen[position] = true;
    }
    assert!(seen.into_iter().all(|hit| hit));
}

#[test]
fn under_resolved_gauss_grid_is_rejected() {
    let error = ShTransform::with_grid(ShtConfig::triangular(2), GridOptions::gauss(2, 8))
        .expect_err("nlat = 2 cannot resolve lmax = 2");
    assert_eq!(error.kind(), ShtErrorKind::AliasingError);
    assert_eq!(error.exit_code(), 5);
    assert!(error.diagnostic_line().starts_with("ERROR: [AliasingError]"));
}

#[test]
fn rotated_fields_equal_the_original_at_inverse_rotated_points() {
    let transform = ShTransform::new(ShtConfig::triangular(10)).expect("transform");
    let values = test_spectrum(&transform, 5, false);
    let (alpha, beta, gamma) = (0.8_f64, 1.3_f64, -0.6_f64);

    let rotated_z = transform.rotate_z(&values, alpha).expect("z");
    let rotated_y = transform.rotate_y(&values, beta).expect("y");
    let rotated_x = transform.rotate_x(&values, gamma).expect("x");

    let points = [(0.3_f64, 0.4_f64), (-0.75, 2.9), (0.95, -1.2), (0.0, 4.0)];
    for (cos_theta, phi) in points {
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let (x, y, z) = (sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        let original_at = |px: f64, py: f64, pz: f64| {
            transform
                .evaluate_at_point(&values, pz.clamp(-1.0, 1.0), py.atan2(px))
                .expect("point")
        };

        let g_z = transform.evaluate_at_point(&rotated_z, cos_theta, phi).expect("point");
        let f_z = transform.evaluate_at_point(&values, cos_theta, phi - alpha).expect("point");
        assert_scalar_close("rotate_z", f_z, g_z, 1.0e-11, 1.0e-11);

        let (c, s) = (beta.cos(), beta.sin());
        let g_y = transform.evaluate_at_point(&rotated_y, cos_theta, phi).expect("point");
        let f_y = original_at(c * x - s * z, y, s * x + c * z);
        assert_scalar_close("rotate_y", f_y, g_y, 1.0e-11, 1.0e-11);

        let (c, s) = (gamma.cos(), gamma.sin());
        let g_x = transform.evaluate_at_point(&rotated_x, cos_theta, phi).expect("point");
        let f_x = original_at(x, c * y + s * z, -s * y + c * z);
        assert_scalar_close("rotate_x", f_x, g_x, 1.0e-11, 1.0e-11);
    }
}

#[test]
fn quarter_turns_preserve_degree_power() {
    let transform = ShTransform::new(ShtConfig::triangular(16)).expect("transform");
    let values = test_spectrum(&transform, 9, false);
    let reference = transform.degree_power(&values).expect("power");
    let mut turned = values.clone();
    for _ in 0..4 {
        turned = transform.rotate_x90(&turned).expect("x90");
    }
    assert_complex_vector_close("four quarter turns", &values, &turned, 1.0e-11);
    let power = transform
        .degree_power(&transform.rotate_y90(&values).expect("y90"))
        .expect("power");
    for (degree, (expected, actual)) in reference.iter().zip(&power).enumerate() {
        assert_scalar_close(&format!("power l={degree}"), *expected, *actual, 1.0e-11, 1.0e-11);
    }
}

#[test]
fn toroidal_fields_stay_finite_at_the_poles_with_zero_radial_part() {
    let transform = ShTransform::with_grid(
        ShtConfig::triangular(12),
        GridOptions::new(0, 0, Sampling::RegularWithPoles),
    )
    .expect("transform");
    let grid = transform.grid().expect("grid");
    assert_eq!(grid.cos_theta()[0], 1.0);

    let q = transform.spec_array();
    let s = transform.spec_array();
    let t = test_spectrum(&transform, 17, true);
    let (v_r, v_theta, v_phi) = transform.synthesize_vector_3d(&q, &s, &t).expect("synthesis");
    assert!(v_r.iter().all(|value| *value == 0.0));
    assert!(v_theta.iter().chain(v_phi.iter()).all(|value| value.is_finite()));

    for j in 0..grid.nphi() {
        let (r, th, ph) = transform
            .evaluate_vector_at_point(&q, &s, &t, 1.0, grid.phi(j))
            .expect("pole");
        assert_eq!(r, 0.0);
        assert_scalar_close("v_theta at pole", th, v_theta[[0, j]], 1.0e-12, 1.0e-12);
        assert_scalar_close("v_phi at pole", ph, v_phi[[0, j]], 1.0e-12, 1.0e-12);

        let (_, th, ph) = transform
            .evaluate_vector_at_point(&q, &s, &t, -1.0 + 1.0e-12, grid.phi(j))
            .expect("near south pole");
        assert!(th.is_finite() && ph.is_finite());
    }
}

#[test]
fn transform_spec_files_drive_transform_construction() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = temp.path().join("spec.json");
    fs::write(
        &path,
        r#"{ "lmax": 9, "mmax": 3, "mres": 3, "grid": { "sampling": "regularNoPoles" } }"#,
    )
    .expect("spec should be written");

    let spec = load_transform_spec(&path).expect("spec should load");
    let transform = build(&spec);
    let grid = transform.grid().expect("grid");
    assert_eq!(grid.sampling(), Sampling::RegularNoPoles);
    assert_eq!(grid.nlat(), 19);
    assert_eq!(transform.nlm(), nlm_calc(9, 3, 3));

    let values = test_spectrum(&transform, 21, false);
    let field = transform.synthesize(&values).expect("synthesis");
    let recovered = transform.analyze(field.view()).expect("analysis");
    assert_complex_vector_close("spec file", &values, &recovered, 1.0e-11);
}
