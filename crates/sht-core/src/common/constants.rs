//! Shared numeric constants and engine defaults.
//!
//! Kernels pull their literals from here so that normalization factors and
//! grid defaults stay consistent between the transform, rotation and point
//! evaluation paths.

pub const PI: f64 = std::f64::consts::PI;
pub const PI2: f64 = 2.0 * PI;
pub const FOUR_PI: f64 = 4.0 * PI;

/// Value of the orthonormal Y_0^0.
pub const Y00_ORTHONORMAL: f64 = 0.282_094_791_773_878_143_474_039_725_780_4_f64;

/// Scale applied to |Y_lm|^2 for m > 0 under the real-field normalization.
pub const REAL_NORM_ORDER_SCALE: f64 = 0.5;

/// Default truncation product order used when grid sizes are chosen
/// automatically (1 = linear transforms).
pub const DEFAULT_NL_ORDER: usize = 1;

/// Polar optimization is off unless explicitly requested.
pub const DEFAULT_POLAR_THRESHOLD: f64 = 0.0;

/// Threshold used by the CLI when polar optimization is requested without a
/// value.
pub const SUGGESTED_POLAR_THRESHOLD: f64 = 1.0e-10;

pub const GAUSS_NEWTON_TOLERANCE: f64 = 1.0e-14;
pub const GAUSS_NEWTON_MAX_ITERATIONS: usize = 100;
