//! Spherical harmonic transforms of scalar and vector fields on the sphere.
//!
//! An [`ShTransform`] fixes the spectral truncation and basis convention; a
//! spatial [`Grid`] is attached with [`ShTransform::set_grid`] and may be
//! replaced later. Point evaluation, rotations and spectral operators work
//! without a grid.

pub mod common;
pub mod domain;
pub mod grid;
pub mod numerics;
pub mod operators;
pub mod point;
pub mod rotation;
pub mod spectral;
pub mod transform;

pub use common::config::{
    GridOptions, Normalization, Sampling, ShtConfig, SpatialLayout, TransformSpec,
    load_transform_spec,
};
pub use domain::{ExecutionMode, ShtError, ShtErrorKind, ShtResult};
pub use grid::Grid;
pub use operators::Coupling;
pub use spectral::{SpectralIndex, nlm_calc};
pub use transform::{
    GridSummary, ShTransform, SpatialFields, SpectralFields, TransformKind, TransformSummary,
};
