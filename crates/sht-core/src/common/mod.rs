pub mod config;
pub mod constants;

pub use config::{
    ConfigFileError, GridOptions, Normalization, Sampling, ShtConfig, SpatialLayout,
    TransformSpec, load_transform_spec,
};
