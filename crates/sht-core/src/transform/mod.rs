//! The transform object: immutable truncation plus a replaceable spatial grid.
//!
//! Every transform method takes `&self`; only [`ShTransform::set_grid`] needs
//! `&mut self`, so a grid is never observed half built.

pub mod complex;
pub mod fields;
pub mod scalar;
mod spatial;
pub mod vector;

pub use fields::{SpatialFields, SpectralFields, TransformKind};

use crate::common::config::{GridOptions, Normalization, Sampling, ShtConfig, SpatialLayout};
use crate::common::constants::PI2;
use crate::domain::{ExecutionMode, ShtError, ShtResult};
use crate::grid::Grid;
use crate::numerics::legendre::LegendreRecurrence;
use crate::spectral::SpectralIndex;
use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone)]
pub struct ShTransform {
    config: ShtConfig,
    index: SpectralIndex,
    recurrence: LegendreRecurrence,
    grid: Option<Grid>,
}

impl ShTransform {
    pub fn new(config: ShtConfig) -> ShtResult<Self> {
        config.validate()?;
        let index = SpectralIndex::new(config.lmax, config.mmax, config.mres);
        let recurrence = LegendreRecurrence::new(&config);
        tracing::debug!(
            lmax = config.lmax,
            mmax = config.mmax,
            mres = config.mres,
            nlm = index.nlm(),
            normalization = %config.normalization,
            "spherical harmonic transform configured"
        );
        Ok(Self {
            config,
            index,
            recurrence,
            grid: None,
        })
    }

    /// Builds a transform and its grid in one step.
    pub fn with_grid(config: ShtConfig, options: GridOptions) -> ShtResult<Self> {
        let mut transform = Self::new(config)?;
        transform.set_grid(options)?;
        Ok(transform)
    }

    pub fn config(&self) -> &ShtConfig {
        &self.config
    }

    pub fn index(&self) -> &SpectralIndex {
        &self.index
    }

    pub fn lmax(&self) -> usize {
        self.config.lmax
    }

    pub fn mmax(&self) -> usize {
        self.config.mmax
    }

    pub fn mres(&self) -> usize {
        self.config.mres
    }

    pub fn nlm(&self) -> usize {
        self.index.nlm()
    }

    pub fn degrees(&self) -> &[usize] {
        self.index.degrees()
    }

    pub fn orders(&self) -> &[usize] {
        self.index.orders()
    }

    pub fn linear_index(&self, degree: usize, order: usize) -> ShtResult<usize> {
        self.index.linear_index(degree, order)
    }

    pub(crate) fn recurrence(&self) -> &LegendreRecurrence {
        &self.recurrence
    }

    pub(crate) fn execution(&self) -> ExecutionMode {
        self.config.execution
    }

    /// Replaces the spatial grid. On failure the previous grid stays active.
    pub fn set_grid(&mut self, options: GridOptions) -> ShtResult<&Grid> {
        let grid = Grid::build(&self.config, &self.recurrence, options)?;
        let grid: &Grid = self.grid.insert(grid);
        Ok(grid)
    }

    pub fn grid(&self) -> ShtResult<&Grid> {
        self.grid.as_ref().ok_or(ShtError::NotConfigured)
    }

    pub fn is_grid_configured(&self) -> bool {
        self.grid.is_some()
    }

    pub fn spat_shape(&self) -> ShtResult<(usize, usize)> {
        Ok(self.grid()?.spat_shape())
    }

    pub fn cos_theta(&self) -> ShtResult<&[f64]> {
        Ok(self.grid()?.cos_theta())
    }

    pub fn gauss_weights(&self) -> ShtResult<Option<&[f64]>> {
        Ok(self.grid()?.gauss_weights())
    }

    /// Zeroed spectral array of length `nlm`.
    pub fn spec_array(&self) -> Vec<Complex64> {
        vec![Complex64::new(0.0, 0.0); self.nlm()]
    }

    /// Zeroed spatial array of the grid's shape.
    pub fn spat_array(&self) -> ShtResult<Array2<f64>> {
        Ok(Array2::zeros(self.spat_shape()?))
    }

    /// Zeroed complex spatial array of the grid's shape.
    pub fn spat_array_complex(&self) -> ShtResult<Array2<Complex64>> {
        Ok(Array2::zeros(self.spat_shape()?))
    }

    pub fn describe(&self) -> TransformSummary {
        TransformSummary {
            lmax: self.config.lmax,
            mmax: self.config.mmax,
            mres: self.config.mres,
            nlm: self.nlm(),
            normalization: self.config.normalization,
            condon_shortley: self.config.condon_shortley,
            real_norm: self.config.real_norm,
            execution: self.config.execution,
            grid: self.grid.as_ref().map(|grid| GridSummary {
                nlat: grid.nlat(),
                nphi: grid.nphi(),
                sampling: grid.sampling(),
                layout: grid.layout(),
                south_pole_first: grid.south_pole_first(),
                polar_threshold: grid.options().polar_threshold,
                vector_tables: grid.has_vector_tables(),
            }),
        }
    }

    pub(crate) fn check_spectral(&self, field: &'static str, data: &[Complex64]) -> ShtResult<()> {
        if data.len() != self.nlm() {
            return Err(ShtError::SizeMismatch {
                field,
                expected: self.nlm(),
                actual: data.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_truncation(&self, ltr: usize) -> ShtResult<()> {
        if ltr > self.config.lmax {
            return Err(ShtError::OutOfRange {
                degree: ltr as i64,
                order: 0,
                limit: format!("lmax={}", self.config.lmax),
            });
        }
        Ok(())
    }

    /// `2*pi / G_lm`, the analysis factor of a stored coefficient.
    pub(crate) fn analysis_scale(&self, degree: usize, order: usize) -> f64 {
        PI2 / self.config.basis_norm(degree, order)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSummary {
    pub nlat: usize,
    pub nphi: usize,
    pub sampling: Sampling,
    pub layout: SpatialLayout,
    pub south_pole_first: bool,
    pub polar_threshold: f64,
    pub vector_tables: bool,
}

/// Printable overview of a transform and its grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformSummary {
    pub lmax: usize,
    pub mmax: usize,
    pub mres: usize,
    pub nlm: usize,
    pub normalization: Normalization,
    pub condon_shortley: bool,
    pub real_norm: bool,
    pub execution: ExecutionMode,
    pub grid: Option<GridSummary>,
}

impl Display for TransformSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Lmax={}, Mmax*Mres={}*{}, Nlm={}",
            self.lmax, self.mmax, self.mres, self.nlm
        )?;
        writeln!(
            f,
            "normalization={}, condon-shortley={}, real-norm={}, execution={}",
            self.normalization,
            if self.condon_shortley { "yes" } else { "no" },
            if self.real_norm { "yes" } else { "no" },
            self.execution
        )?;
        match &self.grid {
            Some(grid) => write!(
                f,
                "grid: nlat={}, nphi={}, sampling={}, layout={}, south-pole-first={}, polar-threshold={:e}, vector-tables={}",
                grid.nlat,
                grid.nphi,
                grid.sampling,
                grid.layout,
                grid.south_pole_first,
                grid.polar_threshold,
                grid.vector_tables
            ),
            None => write!(f, "grid: not configured"),
        }
    }
}
