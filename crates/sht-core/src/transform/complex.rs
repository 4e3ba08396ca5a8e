//! Transforms of complex-valued fields.
//!
//! Coefficients cover orders `-l..=l` at position `l*(l+1) + m`. Negative
//! orders use `B_{l,-m} = s_m conj(B_lm)` with `s_m = (-1)^m` under the
//! Condon-Shortley convention and `1` otherwise.

use super::ShTransform;
use super::spatial::{complex_field_to_spectra, spectra_to_complex_field};
use crate::domain::{ShtError, ShtResult};
use crate::grid::Grid;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

impl ShTransform {
    pub fn synthesize_complex(&self, spectral: &[Complex64]) -> ShtResult<Array2<Complex64>> {
        self.require_complex_layout()?;
        let grid = self.grid()?;
        self.check_complex_len(spectral)?;

        let fft = grid.fft();
        let spectra = self.execution().map(grid.nlat(), |it| {
            let mut spectrum = vec![Complex64::new(0.0, 0.0); grid.nphi()];
            for im in 0..=self.mmax() {
                if !grid.active_latitudes(im).contains(&it) {
                    continue;
                }
                let sign = self.negative_order_sign(im);
                let values = grid.values(im, it);
                let mut positive = Complex64::new(0.0, 0.0);
                let mut negative = Complex64::new(0.0, 0.0);
                for (k, p) in values.iter().enumerate() {
                    let degree = im + k;
                    let base = degree * (degree + 1);
                    positive += spectral[base + im] * p;
                    if im > 0 {
                        negative += spectral[base - im] * p;
                    }
                }
                spectrum[fft.bin(im as i64)] += positive;
                if im > 0 {
                    spectrum[fft.bin(-(im as i64))] += negative * sign;
                }
            }
            spectrum
        });
        Ok(spectra_to_complex_field(grid, self.execution(), spectra))
    }

    pub fn analyze_complex(&self, spatial: ArrayView2<'_, Complex64>) -> ShtResult<Vec<Complex64>> {
        self.require_complex_layout()?;
        let grid = self.grid()?;
        let spectra = complex_field_to_spectra(grid, self.execution(), "spatial", spatial)?;

        let blocks = self.execution().map(self.mmax() + 1, |im| {
            self.complex_order_projection(grid, &spectra, im)
        });

        let mut spectral = vec![Complex64::new(0.0, 0.0); self.index().complex_len()];
        for (im, (positive, negative)) in blocks.into_iter().enumerate() {
            for (k, (plus, minus)) in positive.into_iter().zip(negative).enumerate() {
                let degree = im + k;
                let base = degree * (degree + 1);
                spectral[base + im] = plus;
                if im > 0 {
                    spectral[base - im] = minus;
                }
            }
        }
        Ok(spectral)
    }

    /// Coefficients of orders `+m` and `-m` for every degree `l >= m`.
    fn complex_order_projection(
        &self,
        grid: &Grid,
        spectra: &[Vec<Complex64>],
        im: usize,
    ) -> (Vec<Complex64>, Vec<Complex64>) {
        let width = self.lmax() + 1 - im;
        let mut positive = vec![Complex64::new(0.0, 0.0); width];
        let mut negative = vec![Complex64::new(0.0, 0.0); width];
        let positive_bin = grid.fft().bin(im as i64);
        let negative_bin = grid.fft().bin(-(im as i64));

        for it in grid.active_latitudes(im) {
            let weight = grid.internal_weight(it);
            let plus = spectra[it][positive_bin] * weight;
            let minus = spectra[it][negative_bin] * weight;
            for (k, p) in grid.values(im, it).iter().enumerate() {
                positive[k] += plus * p;
                negative[k] += minus * p;
            }
        }

        let sign = self.negative_order_sign(im);
        for k in 0..width {
            let scale = self.analysis_scale(im + k, im);
            positive[k] *= scale;
            negative[k] *= scale * sign;
        }
        if im == 0 {
            negative.iter_mut().for_each(|value| *value = Complex64::new(0.0, 0.0));
        }
        (positive, negative)
    }

    fn negative_order_sign(&self, order: usize) -> f64 {
        if self.config().condon_shortley && order % 2 == 1 {
            -1.0
        } else {
            1.0
        }
    }

    fn require_complex_layout(&self) -> ShtResult<()> {
        if self.config().has_full_orders() {
            return Ok(());
        }
        Err(ShtError::configuration(format!(
            "complex-field transforms need mres = 1 and mmax = lmax, got lmax={}, mmax={}, mres={}",
            self.lmax(),
            self.mmax(),
            self.mres()
        )))
    }

    fn check_complex_len(&self, spectral: &[Complex64]) -> ShtResult<()> {
        let expected = self.index().complex_len();
        if spectral.len() != expected {
            return Err(ShtError::SizeMismatch {
                field: "complex spectral",
                expected,
                actual: spectral.len(),
            });
        }
        Ok(())
    }
}
