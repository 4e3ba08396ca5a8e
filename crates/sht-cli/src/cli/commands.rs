use super::CliError;
use super::helpers::*;
use anyhow::Context;
use sht_core::common::constants::SUGGESTED_POLAR_THRESHOLD;
use sht_core::{Normalization, Sampling, SpatialLayout, TransformKind};
use std::path::PathBuf;

#[derive(Clone, Copy, clap::ValueEnum)]
pub(super) enum SamplingArg {
    /// Gauss-Legendre colatitudes
    Gauss,
    /// Equispaced colatitudes including both poles
    RegularPoles,
    /// Equispaced colatitudes offset by half a step
    Regular,
}

impl From<SamplingArg> for Sampling {
    fn from(value: SamplingArg) -> Self {
        match value {
            SamplingArg::Gauss => Self::Gauss,
            SamplingArg::RegularPoles => Self::RegularWithPoles,
            SamplingArg::Regular => Self::RegularNoPoles,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub(super) enum LayoutArg {
    /// Arrays of shape (nlat, nphi)
    PhiContiguous,
    /// Arrays of shape (nphi, nlat)
    ThetaContiguous,
}

impl From<LayoutArg> for SpatialLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::PhiContiguous => Self::PhiContiguous,
            LayoutArg::ThetaContiguous => Self::ThetaContiguous,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub(super) enum NormArg {
    Orthonormal,
    FourPi,
    Schmidt,
}

impl From<NormArg> for Normalization {
    fn from(value: NormArg) -> Self {
        match value {
            NormArg::Orthonormal => Self::Orthonormal,
            NormArg::FourPi => Self::FourPi,
            NormArg::Schmidt => Self::Schmidt,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum KindArg {
    Scalar,
    Vector,
    Vector3d,
    All,
}

impl KindArg {
    fn kinds(self) -> Vec<TransformKind> {
        match self {
            Self::Scalar => vec![TransformKind::Scalar],
            Self::Vector => vec![TransformKind::Vector2D],
            Self::Vector3d => vec![TransformKind::Vector3D],
            Self::All => TransformKind::ALL.to_vec(),
        }
    }
}

#[derive(clap::Args)]
pub(super) struct TransformFlags {
    /// JSON transform configuration; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum degree
    #[arg(long)]
    lmax: Option<usize>,

    /// Maximum order index (highest order is mmax*mres)
    #[arg(long)]
    mmax: Option<usize>,

    /// Order step
    #[arg(long)]
    mres: Option<usize>,

    /// Number of colatitudes (0 chooses automatically)
    #[arg(long)]
    nlat: Option<usize>,

    /// Number of longitudes (0 chooses automatically)
    #[arg(long)]
    nphi: Option<usize>,

    /// Colatitude sampling
    #[arg(long, value_enum)]
    sampling: Option<SamplingArg>,

    /// Spatial array layout
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Basis normalization
    #[arg(long, value_enum)]
    norm: Option<NormArg>,

    /// Drop the Condon-Shortley phase
    #[arg(long)]
    no_cs: bool,

    /// Scale m > 0 basis functions by sqrt(1/2)
    #[arg(long)]
    real_norm: bool,

    /// Run per-order work on the rayon pool
    #[arg(long)]
    parallel: bool,

    /// Skip near-pole values below THRESHOLD; regular sampling only, bare flag uses 1e-10
    #[arg(long, num_args = 0..=1, value_name = "THRESHOLD")]
    polar_opt: Option<Option<f64>>,

    /// Nonlinear order used to size automatic grids
    #[arg(long)]
    nl_order: Option<usize>,

    /// Store the south pole in the first spatial row
    #[arg(long)]
    south_pole_first: bool,

    /// Accept grids too coarse for exact transforms
    #[arg(long)]
    allow_aliasing: bool,
}

impl TransformFlags {
    fn overrides(&self) -> SpecOverrides {
        SpecOverrides {
            config: self.config.clone(),
            lmax: self.lmax,
            mmax: self.mmax,
            mres: self.mres,
            nlat: self.nlat,
            nphi: self.nphi,
            sampling: self.sampling.map(Into::into),
            layout: self.layout.map(Into::into),
            normalization: self.norm.map(Into::into),
            no_condon_shortley: self.no_cs,
            real_norm: self.real_norm,
            parallel: self.parallel,
            polar_threshold: self
                .polar_opt
                .map(|threshold| threshold.unwrap_or(SUGGESTED_POLAR_THRESHOLD)),
            nl_order: self.nl_order,
            south_pole_first: self.south_pole_first,
            allow_aliasing: self.allow_aliasing,
        }
    }
}

#[derive(clap::Args)]
pub(super) struct InfoArgs {
    #[command(flatten)]
    transform: TransformFlags,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct BenchArgs {
    #[command(flatten)]
    transform: TransformFlags,

    /// Round trips per transform kind
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    iterations: u32,

    /// Transform kinds to run
    #[arg(long, value_enum, default_value = "all")]
    kind: KindArg,

    /// JSON report output path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Largest accepted round-trip coefficient error
    #[arg(long, default_value_t = 1.0e-10)]
    tolerance: f64,
}

pub(super) fn run_info_command(args: InfoArgs) -> Result<i32, CliError> {
    let spec = resolve_transform_spec(&args.transform.overrides())?;
    let transform = build_transform(&spec)?;
    let summary = transform.describe();

    if args.json {
        let json =
            serde_json::to_string_pretty(&summary).context("failed to serialize transform summary")?;
        println!("{json}");
    } else {
        println!("{summary}");
    }
    Ok(0)
}

pub(super) fn run_bench_command(args: BenchArgs) -> Result<i32, CliError> {
    if !args.tolerance.is_finite() || args.tolerance < 0.0 {
        return Err(CliError::Usage(format!(
            "--tolerance must be a finite non-negative number, got {}",
            args.tolerance
        )));
    }

    let spec = resolve_transform_spec(&args.transform.overrides())?;
    let transform = build_transform(&spec)?;
    let summary = transform.describe();
    println!("{summary}");

    let mut results = Vec::new();
    for kind in args.kind.kinds() {
        let result = run_bench_kind(&transform, kind, args.iterations, args.tolerance)?;
        println!("{}", result.render_line());
        results.push(result);
    }

    let passed = results.iter().all(|result| result.passed);
    let report = BenchReport {
        transform: summary,
        tolerance: args.tolerance,
        passed,
        results,
    };
    if let Some(path) = &args.report {
        write_bench_report(path, &report)?;
        println!("Report written to {}", path.display());
    }

    if passed {
        Ok(0)
    } else {
        eprintln!(
            "Round-trip error exceeded tolerance {:e}",
            args.tolerance
        );
        Ok(1)
    }
}
