//! Longitude FFTs between grid rows and azimuthal modes.

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

/// Forward/inverse plans for one longitude count, shared by every row.
#[derive(Clone)]
pub struct LongitudeFft {
    nphi: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for LongitudeFft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LongitudeFft")
            .field("nphi", &self.nphi)
            .finish_non_exhaustive()
    }
}

impl LongitudeFft {
    pub fn new(nphi: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            nphi,
            forward: planner.plan_fft_forward(nphi),
            inverse: planner.plan_fft_inverse(nphi),
        }
    }

    pub fn nphi(&self) -> usize {
        self.nphi
    }

    /// Mode amplitudes `F_k = (1/nphi) sum_j f_j e^{-i k phi_j}` for
    /// `k = 0..modes.len()` of a real row.
    pub fn real_to_modes(&self, row: &[f64], modes: &mut [Complex64]) {
        let mut buffer: Vec<Complex64> = row.iter().map(|value| Complex64::new(*value, 0.0)).collect();
        self.forward.process(&mut buffer);
        let scale = 1.0 / self.nphi as f64;
        for (k, mode) in modes.iter_mut().enumerate() {
            *mode = buffer[k % self.nphi] * scale;
        }
    }

    /// Real row `f_j = Re F_0 + 2 Re sum_{k>0} F_k e^{i k phi_j}`.
    ///
    /// Modes at or beyond the Nyquist frequency fold onto the bins they alias.
    pub fn modes_to_real(&self, modes: &[Complex64], row: &mut [f64]) {
        let mut buffer = vec![Complex64::new(0.0, 0.0); self.nphi];
        for (k, mode) in modes.iter().enumerate() {
            if k == 0 {
                buffer[0] += Complex64::new(mode.re, 0.0);
            } else {
                buffer[self.bin(k as i64)] += mode;
                buffer[self.bin(-(k as i64))] += mode.conj();
            }
        }
        self.inverse.process(&mut buffer);
        for (value, sample) in row.iter_mut().zip(&buffer) {
            *value = sample.re;
        }
    }

    /// In-place forward transform of a complex row, scaled by `1/nphi`.
    pub fn complex_forward(&self, buffer: &mut [Complex64]) {
        self.forward.process(buffer);
        let scale = 1.0 / self.nphi as f64;
        for value in buffer.iter_mut() {
            *value *= scale;
        }
    }

    /// In-place unscaled inverse transform of a complex row.
    pub fn complex_inverse(&self, buffer: &mut [Complex64]) {
        self.inverse.process(buffer);
    }

    /// FFT bin holding azimuthal order `order` (negative orders wrap).
    pub fn bin(&self, order: i64) -> usize {
        order.rem_euclid(self.nphi as i64) as usize
    }
}

/// Smallest `n >= minimum` whose only prime factors are 2, 3 and 5.
pub fn fft_friendly_size(minimum: usize) -> usize {
    let mut candidate = minimum.max(1);
    loop {
        let mut reduced = candidate;
        for factor in [2, 3, 5] {
            while reduced % factor == 0 {
                reduced /= factor;
            }
        }
        if reduced == 1 {
            return candidate;
        }
        candidate += 1;
    }
}
