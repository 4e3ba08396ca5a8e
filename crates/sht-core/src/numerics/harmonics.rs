//! Closed-form spherical harmonics, compiled for tests only.
//!
//! Values come from the unnormalized Legendre recurrence and an explicit
//! factorial ratio. They serve as an independent reference for the
//! table-driven kernels and are only accurate at low degrees.

use crate::common::config::ShtConfig;
use crate::common::constants::FOUR_PI;
use num_complex::Complex64;

/// Orthonormal, Condon-Shortley phased `Y_l^m(theta, phi)`. Orders with
/// `|order| > degree` evaluate to zero.
pub fn y_lm(degree: usize, order: i64, theta: f64, phi: f64) -> Complex64 {
    let m = order.unsigned_abs() as usize;
    if m > degree {
        return Complex64::new(0.0, 0.0);
    }

    let span: f64 = ((degree - m + 1)..=(degree + m)).map(|term| term as f64).product();
    let norm = ((2 * degree + 1) as f64 / (FOUR_PI * span)).sqrt();
    let legendre = unnormalized_legendre(degree, m, theta.cos());
    let value = Complex64::from_polar(norm * legendre, m as f64 * phi);

    match (order < 0, m % 2 == 1) {
        (false, _) => value,
        (true, false) => value.conj(),
        (true, true) => -value.conj(),
    }
}

/// Basis function `B_lm = P_lm(cos theta) e^{i m phi}` in the convention of
/// `config` (normalization, phase and real-field order scaling).
pub fn basis_function(
    config: &ShtConfig,
    degree: usize,
    order: usize,
    theta: f64,
    phi: f64,
) -> Complex64 {
    let scale = config.normalization.degree_scale(degree)
        * config.order_phase(order)
        * config.order_norm_scale(order).sqrt();
    y_lm(degree, order as i64, theta, phi) * scale
}

/// `P_l^m(x)` with the Condon-Shortley phase, from `P_m^m = (-1)^m (2m-1)!! sin^m`
/// and the upward recurrence in degree.
fn unnormalized_legendre(degree: usize, order: usize, x: f64) -> f64 {
    let sin_theta = (1.0 - x * x).max(0.0).sqrt();
    let seed = (1..=order).fold(1.0, |acc, k| -acc * (2 * k - 1) as f64 * sin_theta);

    let (mut below, mut current) = (0.0, seed);
    for l in order + 1..=degree {
        let next = ((2 * l - 1) as f64 * x * current - (l + order - 1) as f64 * below)
            / (l - order) as f64;
        below = current;
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::{basis_function, y_lm};
    use crate::common::config::{Normalization, ShtConfig};
    use crate::common::constants::{FOUR_PI, PI};
    use num_complex::Complex64;

    #[test]
    fn y_lm_matches_representative_known_values() {
        let y00 = y_lm(0, 0, 1.2, -0.8);
        assert_complex_close(
            "Y_0^0",
            Complex64::new((1.0 / FOUR_PI).sqrt(), 0.0),
            y00,
            1.0e-14,
            1.0e-13,
        );

        let theta = PI / 3.0;
        let y10 = y_lm(1, 0, theta, 0.4);
        assert_complex_close(
            "Y_1^0",
            Complex64::new((3.0 / FOUR_PI).sqrt() * theta.cos(), 0.0),
            y10,
            1.0e-14,
            1.0e-13,
        );

        let y11 = y_lm(1, 1, PI / 2.0, 0.0);
        assert_complex_close(
            "Y_1^1",
            Complex64::new(-(3.0 / (8.0 * PI)).sqrt(), 0.0),
            y11,
            1.0e-14,
            1.0e-13,
        );

        assert_eq!(y_lm(2, 3, 0.5, 0.5), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn y_lm_satisfies_negative_order_symmetry_identity() {
        let theta = 1.1;
        let phi = -0.7;

        for degree in 1..=6_usize {
            for order in 1..=degree as i64 {
                let positive = y_lm(degree, order, theta, phi);
                let expected_negative = if order % 2 == 0 {
                    positive.conj()
                } else {
                    -positive.conj()
                };
                let actual_negative = y_lm(degree, -order, theta, phi);

                assert_complex_close(
                    &format!("l={degree} m={order}"),
                    expected_negative,
                    actual_negative,
                    1.0e-13,
                    1.0e-12,
                );
            }
        }
    }

    #[test]
    fn y_lm_satisfies_addition_theorem_sum_rule() {
        let samples = [(0.3, -1.2), (1.1, 0.4), (2.4, 2.2)];

        for degree in [0_usize, 1, 2, 4, 6] {
            let expected_power = (2 * degree + 1) as f64 / FOUR_PI;
            for (theta, phi) in samples {
                let mut accumulated = 0.0;
                for order in -(degree as i64)..=degree as i64 {
                    accumulated += y_lm(degree, order, theta, phi).norm_sqr();
                }

                assert_scalar_close(
                    &format!("l={degree} theta={theta} phi={phi}"),
                    expected_power,
                    accumulated,
                    5.0e-12,
                    5.0e-11,
                );
            }
        }
    }

    #[test]
    fn basis_function_applies_normalization_phase_and_real_norm() {
        let theta = 0.7;
        let phi = 0.3;
        let reference = y_lm(3, 1, theta, phi);

        let schmidt = ShtConfig::triangular(3).with_normalization(Normalization::Schmidt);
        assert_complex_close(
            "schmidt",
            reference * (FOUR_PI / 7.0).sqrt(),
            basis_function(&schmidt, 3, 1, theta, phi),
            1.0e-14,
            1.0e-13,
        );

        let no_phase = ShtConfig::triangular(3).with_condon_shortley(false);
        assert_complex_close(
            "no Condon-Shortley phase",
            -reference,
            basis_function(&no_phase, 3, 1, theta, phi),
            1.0e-14,
            1.0e-13,
        );

        let real = ShtConfig::triangular(3).with_real_norm(true);
        assert_complex_close(
            "real norm",
            reference * 0.5_f64.sqrt(),
            basis_function(&real, 3, 1, theta, phi),
            1.0e-14,
            1.0e-13,
        );
        assert_complex_close(
            "real norm leaves m=0",
            y_lm(3, 0, theta, phi),
            basis_function(&real, 3, 0, theta, phi),
            1.0e-14,
            1.0e-13,
        );
    }

    fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
        let abs_diff = (actual - expected).abs();
        let rel_diff = abs_diff / expected.abs().max(1.0);
        assert!(
            abs_diff <= abs_tol || rel_diff <= rel_tol,
            "{label} expected={expected:.15e} actual={actual:.15e} abs_diff={abs_diff:.15e} rel_diff={rel_diff:.15e} abs_tol={abs_tol:.15e} rel_tol={rel_tol:.15e}"
        );
    }

    fn assert_complex_close(
        label: &str,
        expected: Complex64,
        actual: Complex64,
        abs_tol: f64,
        rel_tol: f64,
    ) {
        let abs_diff = (actual - expected).norm();
        let rel_diff = abs_diff / expected.norm().max(1.0);
        assert!(
            abs_diff <= abs_tol || rel_diff <= rel_tol,
            "{label} expected=({:.15e},{:.15e}) actual=({:.15e},{:.15e}) abs_diff={:.15e} rel_diff={:.15e} abs_tol={:.15e} rel_tol={:.15e}",
            expected.re,
            expected.im,
            actual.re,
            actual.im,
            abs_diff,
            rel_diff,
            abs_tol,
            rel_tol
        );
    }
}
