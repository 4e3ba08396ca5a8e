//! Tangent vector fields through spheroidal/toroidal potentials.
//!
//! `V = grad S + curl(T r)`, so on the sphere
//! `v_theta = dS/dtheta + (1/sin theta) dT/dphi` and
//! `v_phi = (1/sin theta) dS/dphi - dT/dtheta`.
//! The `l = 0` coefficients carry no tangent field: they are ignored on input
//! and zero on output.

use super::ShTransform;
use super::spatial::{modes_to_real_field, real_field_to_modes};
use crate::domain::ShtResult;
use crate::grid::Grid;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

type Columns = Vec<Vec<Complex64>>;

impl ShTransform {
    /// Spatial `(v_theta, v_phi)` of spheroidal `s` and toroidal `t` potentials.
    pub fn synthesize_vector(
        &self,
        spheroidal: &[Complex64],
        toroidal: &[Complex64],
    ) -> ShtResult<(Array2<f64>, Array2<f64>)> {
        self.synthesize_vector_truncated(spheroidal, toroidal, self.lmax())
    }

    pub fn synthesize_vector_truncated(
        &self,
        spheroidal: &[Complex64],
        toroidal: &[Complex64],
        ltr: usize,
    ) -> ShtResult<(Array2<f64>, Array2<f64>)> {
        let grid = self.grid()?;
        grid.require_vector_tables()?;
        self.check_spectral("spheroidal", spheroidal)?;
        self.check_spectral("toroidal", toroidal)?;
        self.check_truncation(ltr)?;

        let (theta_columns, phi_columns) =
            self.vector_legendre_synthesis(grid, Some(spheroidal), Some(toroidal), ltr);
        Ok((
            modes_to_real_field(grid, self.execution(), &theta_columns),
            modes_to_real_field(grid, self.execution(), &phi_columns),
        ))
    }

    /// Horizontal gradient of `s`; equivalent to a zero toroidal potential.
    pub fn synthesize_gradient(&self, spheroidal: &[Complex64]) -> ShtResult<(Array2<f64>, Array2<f64>)> {
        let grid = self.grid()?;
        grid.require_vector_tables()?;
        self.check_spectral("spheroidal", spheroidal)?;

        let (theta_columns, phi_columns) =
            self.vector_legendre_synthesis(grid, Some(spheroidal), None, self.lmax());
        Ok((
            modes_to_real_field(grid, self.execution(), &theta_columns),
            modes_to_real_field(grid, self.execution(), &phi_columns),
        ))
    }

    /// Purely toroidal (divergence free) field of `t`.
    pub fn synthesize_toroidal(&self, toroidal: &[Complex64]) -> ShtResult<(Array2<f64>, Array2<f64>)> {
        let grid = self.grid()?;
        grid.require_vector_tables()?;
        self.check_spectral("toroidal", toroidal)?;

        let (theta_columns, phi_columns) =
            self.vector_legendre_synthesis(grid, None, Some(toroidal), self.lmax());
        Ok((
            modes_to_real_field(grid, self.execution(), &theta_columns),
            modes_to_real_field(grid, self.execution(), &phi_columns),
        ))
    }

    /// Spheroidal and toroidal coefficients of `(v_theta, v_phi)`.
    pub fn analyze_vector(
        &self,
        v_theta: ArrayView2<'_, f64>,
        v_phi: ArrayView2<'_, f64>,
    ) -> ShtResult<(Vec<Complex64>, Vec<Complex64>)> {
        self.analyze_vector_truncated(v_theta, v_phi, self.lmax())
    }

    pub fn analyze_vector_truncated(
        &self,
        v_theta: ArrayView2<'_, f64>,
        v_phi: ArrayView2<'_, f64>,
        ltr: usize,
    ) -> ShtResult<(Vec<Complex64>, Vec<Complex64>)> {
        let grid = self.grid()?;
        grid.require_vector_tables()?;
        self.check_truncation(ltr)?;
        let modes = self.mmax() + 1;
        let theta_modes = real_field_to_modes(grid, self.execution(), "v_theta", v_theta, modes)?;
        let phi_modes = real_field_to_modes(grid, self.execution(), "v_phi", v_phi, modes)?;
        Ok(self.vector_legendre_analysis(grid, &theta_modes, &phi_modes, ltr))
    }

    /// `(v_r, v_theta, v_phi)` with `v_r` synthesized from `q` as a scalar.
    pub fn synthesize_vector_3d(
        &self,
        radial: &[Complex64],
        spheroidal: &[Complex64],
        toroidal: &[Complex64],
    ) -> ShtResult<(Array2<f64>, Array2<f64>, Array2<f64>)> {
        self.check_spectral("radial", radial)?;
        let (v_theta, v_phi) = self.synthesize_vector(spheroidal, toroidal)?;
        let v_r = self.synthesize(radial)?;
        Ok((v_r, v_theta, v_phi))
    }

    pub fn analyze_vector_3d(
        &self,
        v_r: ArrayView2<'_, f64>,
        v_theta: ArrayView2<'_, f64>,
        v_phi: ArrayView2<'_, f64>,
    ) -> ShtResult<(Vec<Complex64>, Vec<Complex64>, Vec<Complex64>)> {
        let (spheroidal, toroidal) = self.analyze_vector(v_theta, v_phi)?;
        let radial = self.analyze(v_r)?;
        Ok((radial, spheroidal, toroidal))
    }

    fn vector_legendre_synthesis(
        &self,
        grid: &Grid,
        spheroidal: Option<&[Complex64]>,
        toroidal: Option<&[Complex64]>,
        ltr: usize,
    ) -> (Columns, Columns) {
        let index = self.index();
        let zero = Complex64::new(0.0, 0.0);
        self.execution()
            .map(self.mmax() + 1, |im| {
                let mut theta_column = vec![zero; grid.nlat()];
                let mut phi_column = vec![zero; grid.nlat()];
                let order = im * self.mres();
                if order > ltr {
                    return (theta_column, phi_column);
                }
                let range = index.order_range(im);
                let width = ltr - order + 1;
                let s = spheroidal.map(|s| &s[range.clone()][..width]);
                let t = toroidal.map(|t| &t[range.clone()][..width]);
                let i_m = Complex64::new(0.0, order as f64);

                for it in grid.active_latitudes(im) {
                    let scaled = grid.scaled(im, it);
                    let dtheta = grid.dtheta(im, it);
                    let mut v_theta = zero;
                    let mut v_phi = zero;
                    for k in 0..width {
                        if let Some(s) = s {
                            v_theta += s[k] * dtheta[k];
                            v_phi += i_m * s[k] * scaled[k];
                        }
                        if let Some(t) = t {
                            v_theta += i_m * t[k] * scaled[k];
                            v_phi -= t[k] * dtheta[k];
                        }
                    }
                    theta_column[it] = v_theta;
                    phi_column[it] = v_phi;
                }
                (theta_column, phi_column)
            })
            .into_iter()
            .unzip()
    }

    fn vector_legendre_analysis(
        &self,
        grid: &Grid,
        theta_modes: &[Vec<Complex64>],
        phi_modes: &[Vec<Complex64>],
        ltr: usize,
    ) -> (Vec<Complex64>, Vec<Complex64>) {
        let index = self.index();
        let zero = Complex64::new(0.0, 0.0);
        let blocks = self.execution().map(self.mmax() + 1, |im| {
            let len = index.order_range(im).len();
            let mut spheroidal = vec![zero; len];
            let mut toroidal = vec![zero; len];
            let order = im * self.mres();
            if order > ltr {
                return (spheroidal, toroidal);
            }
            let width = ltr - order + 1;
            let i_m = Complex64::new(0.0, order as f64);

            for it in grid.active_latitudes(im) {
                let weight = grid.internal_weight(it);
                let v_theta = theta_modes[it][im] * weight;
                let v_phi = phi_modes[it][im] * weight;
                let scaled = grid.scaled(im, it);
                let dtheta = grid.dtheta(im, it);
                for k in 0..width {
                    spheroidal[k] += v_theta * dtheta[k] - i_m * v_phi * scaled[k];
                    toroidal[k] += -i_m * v_theta * scaled[k] - v_phi * dtheta[k];
                }
            }

            for k in 0..width {
                let degree = order + k;
                if degree == 0 {
                    spheroidal[k] = zero;
                    toroidal[k] = zero;
                    continue;
                }
                let scale = self.analysis_scale(degree, order) / (degree * (degree + 1)) as f64;
                spheroidal[k] *= scale;
                toroidal[k] *= scale;
            }
            (spheroidal, toroidal)
        });

        let mut spheroidal = Vec::with_capacity(self.nlm());
        let mut toroidal = Vec::with_capacity(self.nlm());
        for (s, t) in blocks {
            spheroidal.extend(s);
            toroidal.extend(t);
        }
        (spheroidal, toroidal)
    }
}
