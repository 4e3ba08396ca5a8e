//! Transform and grid configuration types plus JSON loading.
//!
//! `ShtConfig` fixes the spectral truncation and basis convention for the
//! lifetime of a transform; `GridOptions` describes the spatial sampling passed
//! to `ShTransform::set_grid`.

use super::constants::{DEFAULT_NL_ORDER, DEFAULT_POLAR_THRESHOLD, FOUR_PI, REAL_NORM_ORDER_SCALE};
use crate::domain::{ExecutionMode, ShtError, ShtResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Normalization of the real-valued Legendre part of each basis function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Normalization {
    /// Integral of |Y_lm|^2 over the sphere is 1.
    #[default]
    Orthonormal,
    /// Integral of |Y_lm|^2 over the sphere is 4*pi.
    FourPi,
    /// Schmidt semi-normalized: integral is 4*pi/(2l+1).
    Schmidt,
}

impl Normalization {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Orthonormal => "orthonormal",
            Self::FourPi => "four-pi",
            Self::Schmidt => "schmidt",
        }
    }

    /// Factor converting an orthonormal basis function of degree `degree`
    /// into this normalization.
    pub fn degree_scale(self, degree: usize) -> f64 {
        match self {
            Self::Orthonormal => 1.0,
            Self::FourPi => FOUR_PI.sqrt(),
            Self::Schmidt => (FOUR_PI / (2 * degree + 1) as f64).sqrt(),
        }
    }

    /// Integral of |Y_l0|^2 over the sphere.
    pub fn degree_norm(self, degree: usize) -> f64 {
        let scale = self.degree_scale(degree);
        scale * scale
    }
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Spectral truncation and basis convention of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShtConfig {
    pub lmax: usize,
    pub mmax: usize,
    #[serde(default = "default_mres")]
    pub mres: usize,
    #[serde(default)]
    pub normalization: Normalization,
    #[serde(default = "default_condon_shortley")]
    pub condon_shortley: bool,
    /// Scale m > 0 basis functions by sqrt(1/2) so that plain coefficient
    /// power sums equal the field energy.
    #[serde(default)]
    pub real_norm: bool,
    #[serde(default)]
    pub execution: ExecutionMode,
}

fn default_mres() -> usize {
    1
}

fn default_condon_shortley() -> bool {
    true
}

impl ShtConfig {
    pub fn new(lmax: usize, mmax: usize, mres: usize) -> Self {
        Self {
            lmax,
            mmax,
            mres,
            normalization: Normalization::Orthonormal,
            condon_shortley: true,
            real_norm: false,
            execution: ExecutionMode::Serial,
        }
    }

    /// Full triangular truncation `mmax = lmax`, `mres = 1`.
    pub fn triangular(lmax: usize) -> Self {
        Self::new(lmax, lmax, 1)
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_condon_shortley(mut self, condon_shortley: bool) -> Self {
        self.condon_shortley = condon_shortley;
        self
    }

    pub fn with_real_norm(mut self, real_norm: bool) -> Self {
        self.real_norm = real_norm;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    pub fn validate(&self) -> ShtResult<()> {
        if self.mres == 0 {
            return Err(ShtError::configuration("mres must be >= 1"));
        }

        let highest_order = self.mmax.checked_mul(self.mres).ok_or_else(|| {
            ShtError::configuration(format!(
                "mmax*mres overflows (mmax={}, mres={})",
                self.mmax, self.mres
            ))
        })?;
        if highest_order > self.lmax {
            return Err(ShtError::configuration(format!(
                "mmax*mres must not exceed lmax (mmax={}, mres={}, lmax={})",
                self.mmax, self.mres, self.lmax
            )));
        }

        Ok(())
    }

    /// Highest order `mmax * mres` actually stored.
    pub fn highest_order(&self) -> usize {
        self.mmax * self.mres
    }

    /// Whether every order 0..=lmax is present.
    pub fn has_full_orders(&self) -> bool {
        self.mres == 1 && self.mmax == self.lmax
    }

    /// Ratio of |B_lm|^2 to |B_l0|^2 coming from the order convention.
    pub fn order_norm_scale(&self, order: usize) -> f64 {
        if self.real_norm && order > 0 {
            REAL_NORM_ORDER_SCALE
        } else {
            1.0
        }
    }

    /// Sign relating the stored basis to the Condon-Shortley-phased one.
    pub fn order_phase(&self, order: usize) -> f64 {
        if self.condon_shortley || order % 2 == 0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Integral of |B_lm|^2 over the sphere.
    pub fn basis_norm(&self, degree: usize, order: usize) -> f64 {
        self.normalization.degree_norm(degree) * self.order_norm_scale(order)
    }
}

/// Colatitude sampling of the spatial grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Sampling {
    /// Gauss-Legendre nodes; exact with nlat > lmax.
    #[default]
    Gauss,
    /// Equally spaced colatitudes including both poles (Clenshaw-Curtis weights).
    RegularWithPoles,
    /// Equally spaced colatitudes offset by half a step (Fejer weights).
    RegularNoPoles,
}

impl Sampling {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gauss => "gauss",
            Self::RegularWithPoles => "regular-poles",
            Self::RegularNoPoles => "regular",
        }
    }

    pub const fn is_regular(self) -> bool {
        !matches!(self, Self::Gauss)
    }
}

impl std::fmt::Display for Sampling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Memory layout of spatial arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SpatialLayout {
    /// Shape `(nlat, nphi)`: longitude varies fastest.
    #[default]
    PhiContiguous,
    /// Shape `(nphi, nlat)`: colatitude varies fastest.
    ThetaContiguous,
}

impl SpatialLayout {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PhiContiguous => "phi-contiguous",
            Self::ThetaContiguous => "theta-contiguous",
        }
    }

    pub const fn shape(self, nlat: usize, nphi: usize) -> (usize, usize) {
        match self {
            Self::PhiContiguous => (nlat, nphi),
            Self::ThetaContiguous => (nphi, nlat),
        }
    }
}

impl std::fmt::Display for SpatialLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Requested spatial sampling. Zero sizes are chosen automatically from the
/// truncation and `nl_order`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridOptions {
    pub nlat: usize,
    pub nphi: usize,
    pub sampling: Sampling,
    pub layout: SpatialLayout,
    pub south_pole_first: bool,
    pub polar_threshold: f64,
    pub nl_order: usize,
    pub allow_aliasing: bool,
    /// Skip the derivative tables needed by vector transforms.
    pub scalar_only: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            nlat: 0,
            nphi: 0,
            sampling: Sampling::Gauss,
            layout: SpatialLayout::PhiContiguous,
            south_pole_first: false,
            polar_threshold: DEFAULT_POLAR_THRESHOLD,
            nl_order: DEFAULT_NL_ORDER,
            allow_aliasing: false,
            scalar_only: false,
        }
    }
}

impl GridOptions {
    pub fn new(nlat: usize, nphi: usize, sampling: Sampling) -> Self {
        Self {
            nlat,
            nphi,
            sampling,
            ..Self::default()
        }
    }

    pub fn gauss(nlat: usize, nphi: usize) -> Self {
        Self::new(nlat, nphi, Sampling::Gauss)
    }

    pub fn with_layout(mut self, layout: SpatialLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_south_pole_first(mut self, south_pole_first: bool) -> Self {
        self.south_pole_first = south_pole_first;
        self
    }

    pub fn with_polar_threshold(mut self, polar_threshold: f64) -> Self {
        self.polar_threshold = polar_threshold;
        self
    }

    pub fn with_nl_order(mut self, nl_order: usize) -> Self {
        self.nl_order = nl_order;
        self
    }

    pub fn with_allow_aliasing(mut self, allow_aliasing: bool) -> Self {
        self.allow_aliasing = allow_aliasing;
        self
    }

    pub fn with_scalar_only(mut self, scalar_only: bool) -> Self {
        self.scalar_only = scalar_only;
        self
    }
}

/// On-disk description of a transform: the configuration plus an optional
/// grid request.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformSpec {
    #[serde(flatten)]
    pub config: ShtConfig,
    #[serde(default)]
    pub grid: Option<GridOptions>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("failed to read transform configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse transform configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_transform_spec(path: impl AsRef<Path>) -> Result<TransformSpec, ConfigFileError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ConfigFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
