//! Scalar analysis and synthesis of real fields.
//!
//! A field is `f = sum_l Q_l0 B_l0 + 2 Re sum_{m>0} Q_lm B_lm`. Synthesis
//! evaluates the Legendre sums per order and inverts the longitude FFT per
//! latitude; analysis runs the same stages in reverse with the quadrature
//! weights.

use super::ShTransform;
use super::spatial::{modes_to_real_field, real_field_to_modes};
use crate::domain::ShtResult;
use crate::grid::Grid;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

impl ShTransform {
    pub fn synthesize(&self, spectral: &[Complex64]) -> ShtResult<Array2<f64>> {
        self.synthesize_truncated(spectral, self.lmax())
    }

    /// Synthesis using only degrees `l <= ltr`.
    pub fn synthesize_truncated(&self, spectral: &[Complex64], ltr: usize) -> ShtResult<Array2<f64>> {
        let grid = self.grid()?;
        self.check_spectral("spectral", spectral)?;
        self.check_truncation(ltr)?;

        let columns = self.legendre_synthesis(grid, spectral, ltr);
        Ok(modes_to_real_field(grid, self.execution(), &columns))
    }

    pub fn analyze(&self, spatial: ArrayView2<'_, f64>) -> ShtResult<Vec<Complex64>> {
        self.analyze_truncated(spatial, self.lmax())
    }

    /// Analysis computing only degrees `l <= ltr`; the rest are zero.
    pub fn analyze_truncated(&self, spatial: ArrayView2<'_, f64>, ltr: usize) -> ShtResult<Vec<Complex64>> {
        let grid = self.grid()?;
        self.check_truncation(ltr)?;
        let modes = real_field_to_modes(grid, self.execution(), "spatial", spatial, self.mmax() + 1)?;
        Ok(self.legendre_analysis(grid, &modes, ltr))
    }

    /// Per-order latitude columns `F_m(theta_it) = sum_l Q_lm P_lm(theta_it)`.
    pub(crate) fn legendre_synthesis(
        &self,
        grid: &Grid,
        spectral: &[Complex64],
        ltr: usize,
    ) -> Vec<Vec<Complex64>> {
        let index = self.index();
        self.execution().map(self.mmax() + 1, |im| {
            let mut column = vec![Complex64::new(0.0, 0.0); grid.nlat()];
            let order = im * self.mres();
            if order > ltr {
                return column;
            }
            let coefficients = &spectral[index.order_range(im)][..=ltr - order];
            for it in grid.active_latitudes(im) {
                let values = grid.values(im, it);
                column[it] = coefficients
                    .iter()
                    .zip(values)
                    .fold(Complex64::new(0.0, 0.0), |sum, (q, p)| sum + q * p);
            }
            column
        })
    }

    /// Quadrature projection of per-latitude modes onto the stored basis.
    pub(crate) fn legendre_analysis(
        &self,
        grid: &Grid,
        modes: &[Vec<Complex64>],
        ltr: usize,
    ) -> Vec<Complex64> {
        let index = self.index();
        let blocks = self.execution().map(self.mmax() + 1, |im| {
            let order = im * self.mres();
            let mut block = vec![Complex64::new(0.0, 0.0); index.order_range(im).len()];
            if order > ltr {
                return block;
            }
            for it in grid.active_latitudes(im) {
                let weighted = modes[it][im] * grid.internal_weight(it);
                let values = grid.values(im, it);
                for (q, p) in block[..=ltr - order].iter_mut().zip(values) {
                    *q += weighted * p;
                }
            }
            for (offset, q) in block[..=ltr - order].iter_mut().enumerate() {
                *q *= self.analysis_scale(order + offset, order);
            }
            block
        });
        blocks.concat()
    }
}

#[cfg(test)]
mod tests {
    use crate::common::config::{GridOptions, Normalization, Sampling, ShtConfig, SpatialLayout};
    use crate::domain::{ExecutionMode, ShtErrorKind};
    use crate::numerics::harmonics::basis_function;
    use crate::transform::ShTransform;
    use num_complex::Complex64;

    fn test_spectrum(transform: &ShTransform) -> Vec<Complex64> {
        transform
            .index()
            .pairs()
            .map(|(l, m)| {
                let re = ((3 * l + 7 * m) as f64 * 0.37).sin();
                let im = if m == 0 { 0.0 } else { ((5 * l + 2 * m) as f64 * 0.61).cos() };
                Complex64::new(re, im)
            })
            .collect()
    }

    fn max_error(expected: &[Complex64], actual: &[Complex64]) -> f64 {
        expected
            .iter()
            .zip(actual)
            .map(|(lhs, rhs)| (lhs - rhs).norm())
            .fold(0.0, f64::max)
    }

    #[test]
    fn gauss_round_trip_recovers_coefficients_for_every_convention() {
        for normalization in [
            Normalization::Orthonormal,
            Normalization::FourPi,
            Normalization::Schmidt,
        ] {
            for condon_shortley in [true, false] {
                for real_norm in [false, true] {
                    let config = ShtConfig::triangular(20)
                        .with_normalization(normalization)
                        .with_condon_shortley(condon_shortley)
                        .with_real_norm(real_norm);
                    let transform = ShTransform::with_grid(config, GridOptions::default())
                        .expect("transform");
                    let spectrum = test_spectrum(&transform);
                    let spatial = transform.synthesize(&spectrum).expect("synthesis");
                    let recovered = transform.analyze(spatial.view()).expect("analysis");
                    let error = max_error(&spectrum, &recovered);
                    assert!(
                        error <= 1.0e-12,
                        "{normalization} cs={condon_shortley} real={real_norm} error={error:e}"
                    );
                }
            }
        }
    }

    #[test]
    fn round_trip_covers_mres_layouts_and_regular_grids() {
        let cases = [
            (ShtConfig::new(18, 6, 3), GridOptions::gauss(20, 24)),
            (
                ShtConfig::new(12, 12, 1),
                GridOptions::gauss(14, 27)
                    .with_layout(SpatialLayout::ThetaContiguous)
                    .with_south_pole_first(true),
            ),
            (
                ShtConfig::new(10, 8, 1),
                GridOptions::new(21, 18, Sampling::RegularNoPoles),
            ),
            (
                ShtConfig::new(10, 10, 1),
                GridOptions::new(24, 22, Sampling::RegularWithPoles),
            ),
            (
                ShtConfig::new(16, 16, 1).with_execution(ExecutionMode::Parallel),
                GridOptions::new(40, 36, Sampling::RegularNoPoles).with_polar_threshold(1.0e-14),
            ),
        ];

        for (config, options) in cases {
            let transform = ShTransform::with_grid(config, options).expect("transform");
            let spectrum = test_spectrum(&transform);
            let spatial = transform.synthesize(&spectrum).expect("synthesis");
            assert_eq!(spatial.dim(), transform.spat_shape().expect("grid"));
            let recovered = transform.analyze(spatial.view()).expect("analysis");
            let error = max_error(&spectrum, &recovered);
            assert!(error <= 1.0e-11, "{config:?} {options:?} error={error:e}");
        }
    }

    #[test]
    fn synthesis_matches_closed_form_basis_on_grid_points() {
        let config = ShtConfig::new(6, 3, 2).with_normalization(Normalization::Schmidt);
        let transform =
            ShTransform::with_grid(config, GridOptions::gauss(8, 10)).expect("transform");
        let mut spectrum = transform.spec_array();
        let position = transform.linear_index(5, 4).expect("stored");
        spectrum[position] = Complex64::new(0.3, -0.8);

        let spatial = transform.synthesize(&spectrum).expect("synthesis");
        let grid = transform.grid().expect("grid");
        for (row, x) in grid.cos_theta().iter().enumerate() {
            for j in 0..grid.nphi() {
                let theta = x.acos();
                let expected =
                    2.0 * (spectrum[position] * basis_function(&config, 5, 4, theta, grid.phi(j))).re;
                let actual = spatial[[row, j]];
                assert!(
                    (expected - actual).abs() <= 1.0e-12,
                    "row={row} j={j} expected={expected} actual={actual}"
                );
            }
        }
    }

    #[test]
    fn synthesis_is_linear() {
        let transform =
            ShTransform::with_grid(ShtConfig::triangular(9), GridOptions::default()).expect("transform");
        let a = test_spectrum(&transform);
        let b: Vec<Complex64> = a.iter().rev().map(|value| value * 0.5).collect();
        let (alpha, beta) = (1.7, -0.4);
        let combined: Vec<Complex64> = a
            .iter()
            .zip(&b)
            .map(|(lhs, rhs)| lhs * alpha + rhs * beta)
            .collect();

        let lhs = transform.synthesize(&combined).expect("synthesis");
        let rhs = transform.synthesize(&a).expect("synthesis") * alpha
            + transform.synthesize(&b).expect("synthesis") * beta;
        for (left, right) in lhs.iter().zip(rhs.iter()) {
            assert!((left - right).abs() <= 1.0e-12);
        }
    }

    #[test]
    fn truncated_transforms_ignore_and_zero_high_degrees() {
        let transform =
            ShTransform::with_grid(ShtConfig::triangular(12), GridOptions::default()).expect("transform");
        let spectrum = test_spectrum(&transform);
        let ltr = 7;
        let low: Vec<Complex64> = transform
            .index()
            .pairs()
            .zip(&spectrum)
            .map(|((l, _), value)| if l <= ltr { *value } else { Complex64::new(0.0, 0.0) })
            .collect();

        let truncated = transform.synthesize_truncated(&spectrum, ltr).expect("synthesis");
        let reference = transform.synthesize(&low).expect("synthesis");
        for (lhs, rhs) in truncated.iter().zip(reference.iter()) {
            assert!((lhs - rhs).abs() <= 1.0e-13);
        }

        let full_field = transform.synthesize(&spectrum).expect("synthesis");
        let recovered = transform
            .analyze_truncated(full_field.view(), ltr)
            .expect("analysis");
        assert!(max_error(&low, &recovered) <= 1.0e-12);

        let error = transform
            .synthesize_truncated(&spectrum, 13)
            .expect_err("ltr above lmax");
        assert_eq!(error.kind(), ShtErrorKind::OutOfRange);
    }

    #[test]
    fn shape_and_size_are_validated() {
        let transform =
            ShTransform::with_grid(ShtConfig::triangular(4), GridOptions::gauss(6, 10)).expect("transform");
        let wrong = ndarray::Array2::<f64>::zeros((10, 6));
        let error = transform.analyze(wrong.view()).expect_err("shape mismatch");
        assert_eq!(error.kind(), ShtErrorKind::ShapeMismatch);

        let error = transform
            .synthesize(&vec![Complex64::new(0.0, 0.0); 14])
            .expect_err("size mismatch");
        assert_eq!(error.kind(), ShtErrorKind::SizeMismatch);
    }

    #[test]
    fn strided_input_views_are_accepted() {
        let transform =
            ShTransform::with_grid(ShtConfig::triangular(8), GridOptions::gauss(10, 18)).expect("transform");
        let spectrum = test_spectrum(&transform);
        let spatial = transform.synthesize(&spectrum).expect("synthesis");
        let transposed = spatial.t().to_owned();
        let recovered = transform.analyze(transposed.t()).expect("analysis of a transposed view");
        assert!(max_error(&spectrum, &recovered) <= 1.0e-12);
    }

    #[test]
    fn serial_and_parallel_execution_agree() {
        let serial = ShTransform::with_grid(ShtConfig::triangular(15), GridOptions::default())
            .expect("transform");
        let parallel = ShTransform::with_grid(
            ShtConfig::triangular(15).with_execution(ExecutionMode::Parallel),
            GridOptions::default(),
        )
        .expect("transform");
        let spectrum = test_spectrum(&serial);
        let lhs = serial.synthesize(&spectrum).expect("synthesis");
        let rhs = parallel.synthesize(&spectrum).expect("synthesis");
        assert_eq!(lhs, rhs);
        assert_eq!(
            serial.analyze(lhs.view()).expect("analysis"),
            parallel.analyze(rhs.view()).expect("analysis")
        );
    }
}
