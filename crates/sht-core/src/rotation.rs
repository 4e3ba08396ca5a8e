//! Active rotations of real-field spectra and the rotation-invariant power
//! spectrum.
//!
//! A rotation `R` maps a field `f` to `g(r) = f(R^-1 r)`. Rotations about z
//! are diagonal; rotations about y mix orders within a degree through the
//! Wigner small-d matrices, and rotations about x are conjugated y rotations.

use crate::common::constants::PI;
use crate::domain::{ShtError, ShtResult};
use crate::numerics::wigner::WignerSmallD;
use crate::transform::ShTransform;
use num_complex::Complex64;

impl ShTransform {
    /// Rotation by `angle` about the polar axis; exact.
    pub fn rotate_z(&self, spectral: &[Complex64], angle: f64) -> ShtResult<Vec<Complex64>> {
        self.check_spectral("spectral", spectral)?;
        Ok(self
            .index()
            .pairs()
            .zip(spectral)
            .map(|((_, order), value)| {
                if order == 0 || angle == 0.0 {
                    *value
                } else {
                    value * Complex64::from_polar(1.0, -(order as f64) * angle)
                }
            })
            .collect())
    }

    /// Rotation by `angle` about the y axis.
    pub fn rotate_y(&self, spectral: &[Complex64], angle: f64) -> ShtResult<Vec<Complex64>> {
        self.require_full_rotation()?;
        self.check_spectral("spectral", spectral)?;
        let wigner = WignerSmallD::new(self.lmax(), angle);
        tracing::debug!(lmax = self.lmax(), beta = angle, "wigner small-d matrices built");
        Ok(self.apply_wigner(spectral, &wigner))
    }

    /// Rotation by `angle` about the x axis.
    pub fn rotate_x(&self, spectral: &[Complex64], angle: f64) -> ShtResult<Vec<Complex64>> {
        self.require_full_rotation()?;
        let turned = self.rotate_z(spectral, 0.5 * PI)?;
        let rotated = self.rotate_y(&turned, angle)?;
        self.rotate_z(&rotated, -0.5 * PI)
    }

    /// Quarter turn about the y axis.
    pub fn rotate_y90(&self, spectral: &[Complex64]) -> ShtResult<Vec<Complex64>> {
        self.rotate_y(spectral, 0.5 * PI)
    }

    /// Quarter turn about the x axis.
    pub fn rotate_x90(&self, spectral: &[Complex64]) -> ShtResult<Vec<Complex64>> {
        self.rotate_x(spectral, 0.5 * PI)
    }

    /// `int f_l^2 dOmega` for each degree `l`, where `f_l` is the degree-`l`
    /// part of the real field; negative orders are counted through the
    /// stored positive ones.
    pub fn degree_power(&self, spectral: &[Complex64]) -> ShtResult<Vec<f64>> {
        self.check_spectral("spectral", spectral)?;
        let config = self.config();
        let mut power = vec![0.0; self.lmax() + 1];
        for ((degree, order), value) in self.index().pairs().zip(spectral) {
            let weight = if order == 0 {
                value.re * value.re
            } else {
                2.0 * value.norm_sqr()
            };
            power[degree] += weight * config.basis_norm(degree, order);
        }
        Ok(power)
    }

    /// Applies `a'_lm = sum_m' d^l_{m m'} a_lm'` on standard complex
    /// coefficients `a_lm = k_m Q_lm`, with `a_{l,-m} = (-1)^m conj(a_lm)`.
    fn apply_wigner(&self, spectral: &[Complex64], wigner: &WignerSmallD) -> Vec<Complex64> {
        let config = self.config();
        let index = self.index();
        let lmax = self.lmax();
        let factors: Vec<f64> = (0..=lmax)
            .map(|order| config.order_norm_scale(order).sqrt() * config.order_phase(order))
            .collect();

        let mut rotated = self.spec_array();
        let mut standard = vec![Complex64::new(0.0, 0.0); 2 * lmax + 1];
        for degree in 0..=lmax {
            let offset = degree as i64;
            for order in 0..=degree {
                let position = index.order_range(order).start + degree - order;
                let value = spectral[position] * factors[order];
                let value = if order == 0 { Complex64::new(value.re, 0.0) } else { value };
                standard[(offset + order as i64) as usize] = value;
                if order > 0 {
                    let sign = if order % 2 == 1 { -1.0 } else { 1.0 };
                    standard[(offset - order as i64) as usize] = value.conj() * sign;
                }
            }

            let matrix = wigner.degree(degree);
            for order in 0..=degree {
                let row = degree + order;
                let mut sum = Complex64::new(0.0, 0.0);
                for (column, value) in standard[..2 * degree + 1].iter().enumerate() {
                    sum += value * matrix[(row, column)];
                }
                let position = index.order_range(order).start + degree - order;
                rotated[position] = if order == 0 {
                    Complex64::new(sum.re, 0.0)
                } else {
                    sum / factors[order]
                };
            }
        }
        rotated
    }

    fn require_full_rotation(&self) -> ShtResult<()> {
        if self.config().has_full_orders() {
            return Ok(());
        }
        Err(ShtError::configuration(format!(
            "rotations off the polar axis need mres = 1 and mmax = lmax, got lmax={}, mmax={}, mres={}",
            self.lmax(),
            self.mmax(),
            self.mres()
        )))
    }
}
