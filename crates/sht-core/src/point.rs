//! Evaluation of spectral fields at a single point, without a grid.

use crate::domain::{ShtError, ShtResult};
use crate::transform::ShTransform;
use num_complex::Complex64;

impl ShTransform {
    /// Value of the real field at `(cos_theta, phi)`.
    pub fn evaluate_at_point(&self, spectral: &[Complex64], cos_theta: f64, phi: f64) -> ShtResult<f64> {
        check_cos_theta(cos_theta)?;
        self.check_spectral("spectral", spectral)?;

        let recurrence = self.recurrence();
        let mut values = vec![0.0; self.lmax() + 1];
        let mut total = 0.0;
        for im in 0..=self.mmax() {
            let order = recurrence.order(im);
            let coefficients = &spectral[self.index().order_range(im)];
            recurrence.values(im, self.lmax(), cos_theta, &mut values);
            let sum = coefficients
                .iter()
                .zip(&values)
                .fold(Complex64::new(0.0, 0.0), |sum, (q, p)| sum + q * p);
            total += real_part(sum, order, phi);
        }
        Ok(total)
    }

    /// Horizontal gradient `(v_theta, v_phi)` of the spheroidal potential at
    /// `(cos_theta, phi)`.
    pub fn evaluate_gradient_at_point(
        &self,
        spheroidal: &[Complex64],
        cos_theta: f64,
        phi: f64,
    ) -> ShtResult<(f64, f64)> {
        check_cos_theta(cos_theta)?;
        self.check_spectral("spheroidal", spheroidal)?;
        Ok(self.tangent_at_point(Some(spheroidal), None, cos_theta, phi))
    }

    /// `(v_r, v_theta, v_phi)` of the radial, spheroidal and toroidal
    /// expansions at `(cos_theta, phi)`.
    pub fn evaluate_vector_at_point(
        &self,
        radial: &[Complex64],
        spheroidal: &[Complex64],
        toroidal: &[Complex64],
        cos_theta: f64,
        phi: f64,
    ) -> ShtResult<(f64, f64, f64)> {
        check_cos_theta(cos_theta)?;
        self.check_spectral("spheroidal", spheroidal)?;
        self.check_spectral("toroidal", toroidal)?;
        let v_r = self.evaluate_at_point(radial, cos_theta, phi)?;
        let (v_theta, v_phi) = self.tangent_at_point(Some(spheroidal), Some(toroidal), cos_theta, phi);
        Ok((v_r, v_theta, v_phi))
    }

    fn tangent_at_point(
        &self,
        spheroidal: Option<&[Complex64]>,
        toroidal: Option<&[Complex64]>,
        cos_theta: f64,
        phi: f64,
    ) -> (f64, f64) {
        let recurrence = self.recurrence();
        let mut scaled = vec![0.0; self.lmax() + 1];
        let mut dtheta = vec![0.0; self.lmax() + 1];
        let (mut v_theta, mut v_phi) = (0.0, 0.0);

        for im in 0..=self.mmax() {
            let order = recurrence.order(im);
            let range = self.index().order_range(im);
            recurrence.values_and_derivatives(im, self.lmax(), cos_theta, &mut scaled, &mut dtheta);
            let i_m = Complex64::new(0.0, order as f64);

            let mut theta_sum = Complex64::new(0.0, 0.0);
            let mut phi_sum = Complex64::new(0.0, 0.0);
            for (k, position) in range.enumerate() {
                if let Some(s) = spheroidal {
                    theta_sum += s[position] * dtheta[k];
                    phi_sum += i_m * s[position] * scaled[k];
                }
                if let Some(t) = toroidal {
                    theta_sum += i_m * t[position] * scaled[k];
                    phi_sum -= t[position] * dtheta[k];
                }
            }
            v_theta += real_part(theta_sum, order, phi);
            v_phi += real_part(phi_sum, order, phi);
        }
        (v_theta, v_phi)
    }
}

/// Contribution of one order to a real field: `Re F_0` or `2 Re(F_m e^{i m phi})`.
fn real_part(sum: Complex64, order: usize, phi: f64) -> f64 {
    if order == 0 {
        sum.re
    } else {
        2.0 * (sum * Complex64::from_polar(1.0, order as f64 * phi)).re
    }
}

fn check_cos_theta(cos_theta: f64) -> ShtResult<()> {
    if cos_theta.is_finite() && cos_theta.abs() <= 1.0 {
        return Ok(());
    }
    Err(ShtError::configuration(format!(
        "cos_theta must lie in [-1, 1], got {cos_theta}"
    )))
}
