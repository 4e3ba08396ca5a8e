//! Spatial grid descriptor: colatitude nodes and weights, longitude FFT plans
//! and the per-order Legendre tables evaluated on the nodes.
//!
//! Internally latitudes run from north to south; `row_of` maps an internal
//! latitude to its row in the caller's spatial arrays.

use crate::common::config::{GridOptions, Sampling, ShtConfig, SpatialLayout};
use crate::common::constants::PI2;
use crate::domain::{ShtError, ShtResult};
use crate::numerics::fourier::{LongitudeFft, fft_friendly_size};
use crate::numerics::legendre::LegendreRecurrence;
use crate::numerics::quadrature::quadrature_rule;
use std::ops::Range;

#[derive(Debug, Clone)]
struct OrderTables {
    width: usize,
    values: Vec<f64>,
    scaled: Vec<f64>,
    dtheta: Vec<f64>,
    polar_start: usize,
}

#[derive(Debug, Clone)]
pub struct Grid {
    nlat: usize,
    nphi: usize,
    mres: usize,
    options: GridOptions,
    cos_theta: Vec<f64>,
    weights: Vec<f64>,
    internal_cos: Vec<f64>,
    internal_weights: Vec<f64>,
    tables: Vec<OrderTables>,
    fft: LongitudeFft,
}

impl Grid {
    pub(crate) fn build(
        config: &ShtConfig,
        recurrence: &LegendreRecurrence,
        options: GridOptions,
    ) -> ShtResult<Self> {
        validate_options(&options)?;
        let (nlat, nphi) = resolve_sizes(config, &options);
        check_resolution(config, &options, nlat, nphi)?;

        let rule = quadrature_rule(options.sampling, nlat)?;
        let lmax = config.lmax;
        let vector_tables = !options.scalar_only;
        let internal_cos = rule.cos_theta;

        let tables = config.execution.map(recurrence.order_count(), |im| {
            let order = recurrence.order(im);
            let width = lmax + 1 - order;
            let mut values = vec![0.0; nlat * width];
            let (mut scaled, mut dtheta) = if vector_tables {
                (vec![0.0; nlat * width], vec![0.0; nlat * width])
            } else {
                (Vec::new(), Vec::new())
            };

            for (it, x) in internal_cos.iter().enumerate() {
                let row = it * width..(it + 1) * width;
                recurrence.values(im, lmax, *x, &mut values[row.clone()]);
                if vector_tables {
                    recurrence.values_and_derivatives(
                        im,
                        lmax,
                        *x,
                        &mut scaled[row.clone()],
                        &mut dtheta[row],
                    );
                }
            }

            let polar_start = polar_start(&values, width, nlat, options.polar_threshold);
            OrderTables {
                width,
                values,
                scaled,
                dtheta,
                polar_start,
            }
        });

        let row_order = |values: &[f64]| -> Vec<f64> {
            if options.south_pole_first {
                values.iter().rev().copied().collect()
            } else {
                values.to_vec()
            }
        };
        let cos_theta = row_order(&internal_cos);
        let weights = row_order(&rule.weights);

        tracing::debug!(
            nlat,
            nphi,
            sampling = %options.sampling,
            layout = %options.layout,
            south_pole_first = options.south_pole_first,
            polar_threshold = options.polar_threshold,
            vector_tables,
            "spatial grid built"
        );

        Ok(Self {
            nlat,
            nphi,
            mres: config.mres,
            options: GridOptions {
                nlat,
                nphi,
                ..options
            },
            cos_theta,
            weights,
            internal_cos,
            internal_weights: rule.weights,
            tables,
            fft: LongitudeFft::new(nphi),
        })
    }

    pub fn nlat(&self) -> usize {
        self.nlat
    }

    pub fn nphi(&self) -> usize {
        self.nphi
    }

    pub fn sampling(&self) -> Sampling {
        self.options.sampling
    }

    pub fn layout(&self) -> SpatialLayout {
        self.options.layout
    }

    pub fn south_pole_first(&self) -> bool {
        self.options.south_pole_first
    }

    /// Options as resolved, with automatic sizes filled in.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Shape every spatial array must have.
    pub fn spat_shape(&self) -> (usize, usize) {
        self.options.layout.shape(self.nlat, self.nphi)
    }

    /// `cos(theta)` of each spatial row, in row order.
    pub fn cos_theta(&self) -> &[f64] {
        &self.cos_theta
    }

    /// Quadrature weights on `x = cos(theta)` in row order; they sum to 2.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Gauss-Legendre weights, only defined for Gauss sampling.
    pub fn gauss_weights(&self) -> Option<&[f64]> {
        matches!(self.options.sampling, Sampling::Gauss).then_some(self.weights.as_slice())
    }

    /// Longitude of column `j`; samples cover `[0, 2*pi/mres)`.
    pub fn phi(&self, j: usize) -> f64 {
        PI2 * j as f64 / (self.nphi * self.mres) as f64
    }

    pub fn has_vector_tables(&self) -> bool {
        !self.options.scalar_only
    }

    /// First internal latitude used for order index `im`.
    pub fn polar_start(&self, im: usize) -> usize {
        self.tables[im].polar_start
    }

    pub(crate) fn active_latitudes(&self, im: usize) -> Range<usize> {
        let start = self.tables[im].polar_start;
        start..self.nlat - start
    }

    pub(crate) fn row_of(&self, it: usize) -> usize {
        if self.options.south_pole_first {
            self.nlat - 1 - it
        } else {
            it
        }
    }

    pub(crate) fn internal_cos(&self, it: usize) -> f64 {
        self.internal_cos[it]
    }

    pub(crate) fn internal_weight(&self, it: usize) -> f64 {
        self.internal_weights[it]
    }

    pub(crate) fn values(&self, im: usize, it: usize) -> &[f64] {
        let tables = &self.tables[im];
        &tables.values[it * tables.width..(it + 1) * tables.width]
    }

    pub(crate) fn scaled(&self, im: usize, it: usize) -> &[f64] {
        let tables = &self.tables[im];
        &tables.scaled[it * tables.width..(it + 1) * tables.width]
    }

    pub(crate) fn dtheta(&self, im: usize, it: usize) -> &[f64] {
        let tables = &self.tables[im];
        &tables.dtheta[it * tables.width..(it + 1) * tables.width]
    }

    pub(crate) fn fft(&self) -> &LongitudeFft {
        &self.fft
    }

    pub(crate) fn require_vector_tables(&self) -> ShtResult<()> {
        if self.has_vector_tables() {
            Ok(())
        } else {
            Err(ShtError::configuration(
                "grid was built with scalar_only; vector transforms are unavailable",
            ))
        }
    }
}

fn validate_options(options: &GridOptions) -> ShtResult<()> {
    if options.nl_order == 0 {
        return Err(ShtError::configuration("nl_order must be >= 1"));
    }
    if !options.polar_threshold.is_finite()
        || options.polar_threshold < 0.0
        || options.polar_threshold >= 1.0
    {
        return Err(ShtError::configuration(format!(
            "polar_threshold must lie in [0, 1), got {}",
            options.polar_threshold
        )));
    }
    if options.polar_threshold > 0.0 && !options.sampling.is_regular() {
        return Err(ShtError::configuration(
            "polar optimization is only available on regular grids",
        ));
    }
    Ok(())
}

fn resolve_sizes(config: &ShtConfig, options: &GridOptions) -> (usize, usize) {
    let order_factor = options.nl_order + 1;
    let nlat = if options.nlat > 0 {
        options.nlat
    } else {
        match options.sampling {
            Sampling::Gauss => {
                let nlat = order_factor * config.lmax / 2 + 1;
                nlat + nlat % 2
            }
            Sampling::RegularWithPoles => (order_factor * config.lmax + 1).max(2),
            Sampling::RegularNoPoles => order_factor * config.lmax + 1,
        }
    };
    let nphi = if options.nphi > 0 {
        options.nphi
    } else {
        fft_friendly_size(order_factor * config.mmax + 1)
    };
    (nlat, nphi)
}

fn check_resolution(
    config: &ShtConfig,
    options: &GridOptions,
    nlat: usize,
    nphi: usize,
) -> ShtResult<()> {
    let required_nlat = match options.sampling {
        Sampling::Gauss => config.lmax + 1,
        Sampling::RegularWithPoles | Sampling::RegularNoPoles => 2 * config.lmax + 1,
    };
    let checks = [
        ("nlat", nlat, required_nlat),
        ("nphi", nphi, 2 * config.mmax + 1),
    ];

    for (axis, actual, required) in checks {
        if actual >= required {
            continue;
        }
        if options.allow_aliasing {
            tracing::warn!(
                axis,
                actual,
                required,
                sampling = %options.sampling,
                "grid below exact-quadrature resolution; transforms will alias"
            );
        } else {
            return Err(ShtError::Aliasing {
                axis,
                actual,
                required,
            });
        }
    }
    Ok(())
}

/// Number of latitudes skipped at each pole: the leading rows where every
/// degree stays below `threshold` times the order's peak magnitude.
fn polar_start(values: &[f64], width: usize, nlat: usize, threshold: f64) -> usize {
    if threshold <= 0.0 {
        return 0;
    }
    let row_peak = |it: usize| {
        values[it * width..(it + 1) * width]
            .iter()
            .fold(0.0_f64, |peak, value| peak.max(value.abs()))
    };
    let peak = (0..nlat).map(row_peak).fold(0.0_f64, f64::max);
    let cutoff = threshold * peak;

    (0..nlat / 2)
        .find(|&it| row_peak(it) > cutoff || row_peak(nlat - 1 - it) > cutoff)
        .unwrap_or(nlat / 2)
}
