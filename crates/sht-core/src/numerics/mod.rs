pub mod fourier;
#[cfg(test)]
pub(crate) mod harmonics;
pub mod legendre;
pub mod quadrature;
pub mod wigner;

pub use fourier::{LongitudeFft, fft_friendly_size};
pub use legendre::LegendreRecurrence;
pub use quadrature::{QuadratureError, QuadratureRule, quadrature_rule};
pub use wigner::{DenseRealMatrix, WignerSmallD, wigner_small_d};

use num_complex::Complex64;
use serde::Serialize;

fn kahan_add(sum: &mut f64, correction: &mut f64, value: f64) {
    let corrected = value - *correction;
    let next = *sum + corrected;
    *correction = (next - *sum) - corrected;
    *sum = next;
}

pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut correction = 0.0;

    for &value in values {
        kahan_add(&mut sum, &mut correction, value);
    }

    sum
}

/// Maximum and root-mean-square deviation between two arrays.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ErrorNorms {
    #[serde(rename = "maxAbs")]
    pub max_abs: f64,
    pub rms: f64,
}

impl ErrorNorms {
    pub fn combine(self, other: Self, self_count: usize, other_count: usize) -> Self {
        let total = (self_count + other_count).max(1) as f64;
        let squares =
            self.rms * self.rms * self_count as f64 + other.rms * other.rms * other_count as f64;
        Self {
            max_abs: self.max_abs.max(other.max_abs),
            rms: (squares / total).sqrt(),
        }
    }
}

pub fn complex_error_norms(expected: &[Complex64], actual: &[Complex64]) -> Option<ErrorNorms> {
    if expected.len() != actual.len() {
        return None;
    }
    let squares: Vec<f64> = expected
        .iter()
        .zip(actual)
        .map(|(lhs, rhs)| (lhs - rhs).norm_sqr())
        .collect();
    Some(norms_from_squares(&squares))
}

pub fn real_error_norms(expected: &[f64], actual: &[f64]) -> Option<ErrorNorms> {
    if expected.len() != actual.len() {
        return None;
    }
    let squares: Vec<f64> = expected
        .iter()
        .zip(actual)
        .map(|(lhs, rhs)| (lhs - rhs) * (lhs - rhs))
        .collect();
    Some(norms_from_squares(&squares))
}

fn norms_from_squares(squares: &[f64]) -> ErrorNorms {
    if squares.is_empty() {
        return ErrorNorms::default();
    }
    let max_sq = squares.iter().copied().fold(0.0, f64::max);
    ErrorNorms {
        max_abs: max_sq.sqrt(),
        rms: (stable_sum(squares) / squares.len() as f64).sqrt(),
    }
}
