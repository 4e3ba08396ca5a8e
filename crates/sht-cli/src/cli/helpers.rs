use super::CliError;
use anyhow::Context;
use num_complex::Complex64;
use serde::Serialize;
use sht_core::numerics::{ErrorNorms, complex_error_norms};
use sht_core::{
    ExecutionMode, GridOptions, Normalization, Sampling, ShTransform, ShtConfig, SpatialFields,
    SpatialLayout, SpectralFields, TransformKind, TransformSpec, TransformSummary,
    load_transform_spec,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Seed of the deterministic bench spectrum.
pub(super) const BENCH_SEED: u64 = 0x5eed_5147;

/// Truncation and grid values given on the command line. `None` keeps the
/// value from the configuration file, or the library default.
#[derive(Debug, Clone, Default)]
pub(super) struct SpecOverrides {
    pub(super) config: Option<PathBuf>,
    pub(super) lmax: Option<usize>,
    pub(super) mmax: Option<usize>,
    pub(super) mres: Option<usize>,
    pub(super) nlat: Option<usize>,
    pub(super) nphi: Option<usize>,
    pub(super) sampling: Option<Sampling>,
    pub(super) layout: Option<SpatialLayout>,
    pub(super) normalization: Option<Normalization>,
    pub(super) no_condon_shortley: bool,
    pub(super) real_norm: bool,
    pub(super) parallel: bool,
    pub(super) polar_threshold: Option<f64>,
    pub(super) nl_order: Option<usize>,
    pub(super) south_pole_first: bool,
    pub(super) allow_aliasing: bool,
}

pub(super) fn resolve_transform_spec(overrides: &SpecOverrides) -> Result<TransformSpec, CliError> {
    let mut spec = match (&overrides.config, overrides.lmax) {
        (Some(path), _) => load_transform_spec(path)?,
        (None, Some(lmax)) => {
            let mres = overrides.mres.unwrap_or(1);
            TransformSpec {
                config: ShtConfig::new(lmax, lmax / mres.max(1), mres),
                grid: None,
            }
        }
        (None, None) => {
            return Err(CliError::Usage(
                "either --config FILE or --lmax N is required".to_string(),
            ));
        }
    };

    let config = &mut spec.config;
    if let Some(lmax) = overrides.lmax {
        config.lmax = lmax;
    }
    if let Some(mres) = overrides.mres {
        config.mres = mres;
    }
    if let Some(mmax) = overrides.mmax {
        config.mmax = mmax;
    } else if overrides.config.is_some() && (overrides.lmax.is_some() || overrides.mres.is_some()) {
        config.mmax = config.lmax / config.mres.max(1);
    }
    if let Some(normalization) = overrides.normalization {
        config.normalization = normalization;
    }
    if overrides.no_condon_shortley {
        config.condon_shortley = false;
    }
    if overrides.real_norm {
        config.real_norm = true;
    }
    if overrides.parallel {
        config.execution = ExecutionMode::Parallel;
    }

    let grid = spec.grid.get_or_insert_with(GridOptions::default);
    if let Some(nlat) = overrides.nlat {
        grid.nlat = nlat;
    }
    if let Some(nphi) = overrides.nphi {
        grid.nphi = nphi;
    }
    if let Some(sampling) = overrides.sampling {
        grid.sampling = sampling;
    }
    if let Some(layout) = overrides.layout {
        grid.layout = layout;
    }
    if let Some(threshold) = overrides.polar_threshold {
        grid.polar_threshold = threshold;
    }
    if let Some(nl_order) = overrides.nl_order {
        grid.nl_order = nl_order;
    }
    if overrides.south_pole_first {
        grid.south_pole_first = true;
    }
    if overrides.allow_aliasing {
        grid.allow_aliasing = true;
    }

    tracing::debug!(
        lmax = spec.config.lmax,
        mmax = spec.config.mmax,
        mres = spec.config.mres,
        "resolved transform spec"
    );
    Ok(spec)
}

pub(super) fn build_transform(spec: &TransformSpec) -> Result<ShTransform, CliError> {
    let options = spec.grid.unwrap_or_default();
    Ok(ShTransform::with_grid(spec.config, options)?)
}

/// Reproducible coefficients with values in `[-1, 1)`. Coefficients a real
/// field cannot carry are left at zero: imaginary parts at order 0, and
/// degree 0 of the tangential potentials.
pub(super) fn deterministic_spectrum(
    transform: &ShTransform,
    seed: u64,
    skip_degree_zero: bool,
) -> Vec<Complex64> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 11) as f64 / (1_u64 << 53) as f64) * 2.0 - 1.0
    };

    transform
        .index()
        .pairs()
        .map(|(degree, order)| {
            let re = next();
            let im = next();
            if skip_degree_zero && degree == 0 {
                Complex64::new(0.0, 0.0)
            } else if order == 0 {
                Complex64::new(re, 0.0)
            } else {
                Complex64::new(re, im)
            }
        })
        .collect()
}

pub(super) fn bench_spectrum(transform: &ShTransform, kind: TransformKind) -> SpectralFields {
    match kind {
        TransformKind::Scalar => {
            SpectralFields::Scalar(deterministic_spectrum(transform, BENCH_SEED, false))
        }
        TransformKind::Vector2D => SpectralFields::Vector2D {
            spheroidal: deterministic_spectrum(transform, BENCH_SEED + 1, true),
            toroidal: deterministic_spectrum(transform, BENCH_SEED + 2, true),
        },
        TransformKind::Vector3D => SpectralFields::Vector3D {
            radial: deterministic_spectrum(transform, BENCH_SEED, false),
            spheroidal: deterministic_spectrum(transform, BENCH_SEED + 1, true),
            toroidal: deterministic_spectrum(transform, BENCH_SEED + 2, true),
        },
    }
}

/// Norms over every component, as if the components were one array.
pub(super) fn error_norms(expected: &SpectralFields, actual: &SpectralFields) -> ErrorNorms {
    let mut norms = ErrorNorms::default();
    let mut count = 0;
    for (lhs, rhs) in expected.components().into_iter().zip(actual.components()) {
        if let Some(component) = complex_error_norms(lhs, rhs) {
            norms = norms.combine(component, count, lhs.len());
            count += lhs.len();
        }
    }
    norms
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BenchResult {
    pub(super) kind: TransformKind,
    pub(super) iterations: u32,
    pub(super) synthesis_ms: f64,
    pub(super) analysis_ms: f64,
    pub(super) errors: ErrorNorms,
    pub(super) passed: bool,
}

impl BenchResult {
    pub(super) fn render_line(&self) -> String {
        format!(
            "{:<9} synth {:>10.3} ms  analys {:>10.3} ms  max-err {:.3e}  rms-err {:.3e}  {}",
            self.kind.as_str(),
            self.synthesis_ms,
            self.analysis_ms,
            self.errors.max_abs,
            self.errors.rms,
            if self.passed { "ok" } else { "FAIL" }
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BenchReport {
    pub(super) transform: TransformSummary,
    pub(super) tolerance: f64,
    pub(super) passed: bool,
    pub(super) results: Vec<BenchResult>,
}

/// Mean wall time per iteration of synthesis and analysis, followed by the
/// round-trip error of the last iteration.
pub(super) fn run_bench_kind(
    transform: &ShTransform,
    kind: TransformKind,
    iterations: u32,
    tolerance: f64,
) -> Result<BenchResult, CliError> {
    let spectral = bench_spectrum(transform, kind);
    let mut synthesis_total = 0.0;
    let mut analysis_total = 0.0;
    let mut recovered = None;

    for _ in 0..iterations {
        let start = Instant::now();
        let spatial: SpatialFields = transform.synth(&spectral)?;
        synthesis_total += start.elapsed().as_secs_f64();

        let start = Instant::now();
        recovered = Some(transform.analys(&spatial)?);
        analysis_total += start.elapsed().as_secs_f64();
    }

    let errors = match &recovered {
        Some(recovered) => error_norms(&spectral, recovered),
        None => ErrorNorms::default(),
    };
    let scale = 1.0e3 / f64::from(iterations.max(1));
    tracing::info!(kind = kind.as_str(), max_error = errors.max_abs, "bench kind finished");

    Ok(BenchResult {
        kind,
        iterations,
        synthesis_ms: synthesis_total * scale,
        analysis_ms: analysis_total * scale,
        errors,
        passed: errors.max_abs <= tolerance,
    })
}

pub(super) fn write_bench_report(path: &Path, report: &BenchReport) -> Result<(), CliError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed to create report directory '{}'", parent.display())
        })?;
    }
    let json = serde_json::to_string_pretty(report).context("failed to serialize bench report")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write bench report '{}'", path.display()))?;
    Ok(())
}
