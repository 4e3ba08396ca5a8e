//! Spectral operators acting within an order: multiplication by `cos(theta)`
//! and `sin(theta) d/dtheta`, plus coefficients of a few elementary fields.

use crate::common::constants::{FOUR_PI, PI2};
use crate::domain::{ShtError, ShtResult};
use crate::transform::ShTransform;
use num_complex::Complex64;

/// Per-coefficient `[lower, upper]` weights of degrees `l-1` and `l+1`.
pub type Coupling = Vec<[f64; 2]>;

/// `sqrt((l^2 - m^2) / ((2l+1)(2l-1)))`, the orthonormal `cos(theta)` coupling
/// between degrees `l-1` and `l`.
fn alpha(degree: usize, order: usize) -> f64 {
    if degree <= order {
        return 0.0;
    }
    let (l, m) = (degree as f64, order as f64);
    ((l * l - m * m) / ((2.0 * l + 1.0) * (2.0 * l - 1.0))).sqrt()
}

impl ShTransform {
    /// Coupling such that `apply_coupling` multiplies the field by `cos(theta)`.
    pub fn cos_theta_coupling(&self) -> Coupling {
        self.coupling(|degree, order| {
            let lower = alpha(degree, order);
            let upper = alpha(degree + 1, order);
            (lower, upper)
        })
    }

    /// Coupling such that `apply_coupling` applies `sin(theta) d/dtheta`.
    pub fn sin_dtheta_coupling(&self) -> Coupling {
        self.coupling(|degree, order| {
            let l = degree as f64;
            let lower = if degree > order {
                (l - 1.0) * alpha(degree, order)
            } else {
                0.0
            };
            let upper = -(l + 2.0) * alpha(degree + 1, order);
            (lower, upper)
        })
    }

    /// `R_lm = lower * Q_{l-1,m} + upper * Q_{l+1,m}`; terms outside the
    /// truncation are dropped.
    pub fn apply_coupling(&self, coupling: &[[f64; 2]], spectral: &[Complex64]) -> ShtResult<Vec<Complex64>> {
        self.check_spectral("spectral", spectral)?;
        if coupling.len() != self.nlm() {
            return Err(ShtError::SizeMismatch {
                field: "coupling",
                expected: self.nlm(),
                actual: coupling.len(),
            });
        }

        let mut result = self.spec_array();
        for im in 0..=self.mmax() {
            let range = self.index().order_range(im);
            for position in range.clone() {
                let [lower, upper] = coupling[position];
                let mut value = Complex64::new(0.0, 0.0);
                if position > range.start {
                    value += spectral[position - 1] * lower;
                }
                if position + 1 < range.end {
                    value += spectral[position + 1] * upper;
                }
                result[position] = value;
            }
        }
        Ok(result)
    }

    /// `Q_00` of the constant field 1.
    pub fn sh00_1(&self) -> f64 {
        let mut value = [0.0];
        self.recurrence().values(0, 0, 1.0, &mut value);
        1.0 / value[0]
    }

    /// `Q_10` of the field `cos(theta)`.
    pub fn sh10_ct(&self) -> ShtResult<f64> {
        if self.lmax() < 1 {
            return Err(ShtError::configuration("cos(theta) needs lmax >= 1"));
        }
        let mut values = [0.0; 2];
        self.recurrence().values(0, 1, 1.0, &mut values);
        Ok(1.0 / values[1])
    }

    /// `Q_11` of the field `sin(theta) cos(phi)`.
    pub fn sh11_st(&self) -> ShtResult<f64> {
        if self.lmax() < 1 || self.mmax() < 1 || self.mres() != 1 {
            return Err(ShtError::configuration(
                "sin(theta) cos(phi) needs order 1, i.e. lmax >= 1, mmax >= 1 and mres = 1",
            ));
        }
        let mut value = [0.0];
        self.recurrence().values(1, 1, 0.0, &mut value);
        Ok(1.0 / (2.0 * value[0]))
    }

    /// Real coefficient of `(degree, order)` whose field has unit mean square
    /// over the sphere.
    pub fn unit_energy_coefficient(&self, degree: usize, order: usize) -> ShtResult<f64> {
        self.linear_index(degree, order)?;
        let norm = self.config().basis_norm(degree, order);
        Ok(if order == 0 {
            (FOUR_PI / norm).sqrt()
        } else {
            (PI2 / norm).sqrt()
        })
    }

    fn coupling(&self, weights: impl Fn(usize, usize) -> (f64, f64)) -> Coupling {
        let normalization = self.config().normalization;
        self.index()
            .pairs()
            .map(|(degree, order)| {
                let (lower, upper) = weights(degree, order);
                let scale = normalization.degree_scale(degree);
                let lower = if degree > order {
                    lower * normalization.degree_scale(degree - 1) / scale
                } else {
                    0.0
                };
                let upper = upper * normalization.degree_scale(degree + 1) / scale;
                [lower, upper]
            })
            .collect()
    }
}
