//! Wigner small-d rotation matrices.
//!
//! `d^l_{m m'}(beta)` follows the active, right-handed convention in which a
//! rotation by `beta` about the y axis maps complex coefficients as
//! `a'_{lm} = sum_{m'} d^l_{m m'}(beta) a_{lm'}`. Matrices are seeded at
//! `l = max(|m|, |m'|)` from the closed form and extended upward with the
//! three-term recurrence in degree.

use faer::Mat;

pub type DenseRealMatrix = Mat<f64>;

#[derive(Debug, Clone)]
pub struct WignerSmallD {
    beta: f64,
    matrices: Vec<DenseRealMatrix>,
}

impl WignerSmallD {
    pub fn new(lmax: usize, beta: f64) -> Self {
        let mut matrices: Vec<DenseRealMatrix> = (0..=lmax)
            .map(|degree| Mat::zeros(2 * degree + 1, 2 * degree + 1))
            .collect();
        let mut log_factorial = LogFactorial::new();
        let cos_beta = beta.cos();
        let top = lmax as i64;

        for m1 in -top..=top {
            for m2 in -top..=top {
                let seed_degree = m1.unsigned_abs().max(m2.unsigned_abs()) as usize;
                let seed = closed_form(&mut log_factorial, seed_degree, m1, m2, beta);
                store(&mut matrices, seed_degree, m1, m2, seed);
                if seed_degree == lmax {
                    continue;
                }

                let (mut degree, mut previous, mut current) = if seed_degree == 0 {
                    store(&mut matrices, 1, 0, 0, cos_beta);
                    (1_usize, seed, cos_beta)
                } else {
                    (seed_degree, 0.0, seed)
                };

                while degree < lmax {
                    let j = degree as f64;
                    let (a, b) = (m1 as f64, m2 as f64);
                    let lower = ((j * j - a * a) * (j * j - b * b)).max(0.0).sqrt();
                    let upper = (((j + 1.0) * (j + 1.0) - a * a) * ((j + 1.0) * (j + 1.0) - b * b))
                        .sqrt();
                    let next = ((2.0 * j + 1.0) * (j * (j + 1.0) * cos_beta - a * b) * current
                        - (j + 1.0) * lower * previous)
                        / (j * upper);
                    degree += 1;
                    store(&mut matrices, degree, m1, m2, next);
                    previous = current;
                    current = next;
                }
            }
        }

        Self { beta, matrices }
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn lmax(&self) -> usize {
        self.matrices.len() - 1
    }

    /// Matrix of degree `degree`, indexed `[(m + l, m' + l)]`.
    pub fn degree(&self, degree: usize) -> &DenseRealMatrix {
        &self.matrices[degree]
    }

    pub fn element(&self, degree: usize, m: i64, m_prime: i64) -> f64 {
        let offset = degree as i64;
        self.matrices[degree][((m + offset) as usize, (m_prime + offset) as usize)]
    }
}

fn store(matrices: &mut [DenseRealMatrix], degree: usize, m1: i64, m2: i64, value: f64) {
    let offset = degree as i64;
    matrices[degree][((m1 + offset) as usize, (m2 + offset) as usize)] = value;
}

/// Closed-form sum for a single `d^l_{m m'}(beta)`.
pub fn wigner_small_d(degree: usize, m: i64, m_prime: i64, beta: f64) -> f64 {
    if m.unsigned_abs() as usize > degree || m_prime.unsigned_abs() as usize > degree {
        return 0.0;
    }
    let mut log_factorial = LogFactorial::new();
    closed_form(&mut log_factorial, degree, m, m_prime, beta)
}

fn closed_form(log_factorial: &mut LogFactorial, degree: usize, m: i64, m_prime: i64, beta: f64) -> f64 {
    let j = degree as i64;
    let half_cos = (0.5 * beta).cos();
    let half_sin = (0.5 * beta).sin();
    let prefactor = 0.5
        * (log_factorial.value((j + m) as usize)
            + log_factorial.value((j - m) as usize)
            + log_factorial.value((j + m_prime) as usize)
            + log_factorial.value((j - m_prime) as usize));

    let lowest = 0.max(m_prime - m);
    let highest = (j - m).min(j + m_prime);
    let mut result = 0.0;
    for s in lowest..=highest {
        let cos_power = 2 * j - m + m_prime - 2 * s;
        let sin_power = m - m_prime + 2 * s;
        if (cos_power > 0 && half_cos == 0.0) || (sin_power > 0 && half_sin == 0.0) {
            continue;
        }

        let mut log_term = prefactor
            - log_factorial.value((j - m - s) as usize)
            - log_factorial.value(s as usize)
            - log_factorial.value((m - m_prime + s) as usize)
            - log_factorial.value((j + m_prime - s) as usize);
        let mut sign = if (m - m_prime + s).rem_euclid(2) == 0 {
            1.0
        } else {
            -1.0
        };
        if cos_power > 0 {
            log_term += cos_power as f64 * half_cos.abs().ln();
            if half_cos < 0.0 && cos_power % 2 == 1 {
                sign = -sign;
            }
        }
        if sin_power > 0 {
            log_term += sin_power as f64 * half_sin.abs().ln();
            if half_sin < 0.0 && sin_power % 2 == 1 {
                sign = -sign;
            }
        }
        result += sign * log_term.exp();
    }

    result
}

#[derive(Default)]
struct LogFactorial {
    values: Vec<f64>,
}

impl LogFactorial {
    fn new() -> Self {
        Self { values: vec![0.0] }
    }

    /// `ln(n!)`
    fn value(&mut self, n: usize) -> f64 {
        while self.values.len() <= n {
            let next_index = self.values.len();
            let next_value = self.values[next_index - 1] + (next_index as f64).ln();
            self.values.push(next_value);
        }

        self.values[n]
    }
}

#[cfg(test)]
mod tests {
    use super::{WignerSmallD, wigner_small_d};
    use std::f64::consts::{FRAC_1_SQRT_2, PI};

    #[test]
    fn degree_one_matches_tabulated_elements() {
        let beta = 0.83;
        let (c, s) = (f64::cos(beta), f64::sin(beta));
        let d = WignerSmallD::new(1, beta);

        let expected = [
            (1, 1, 0.5 * (1.0 + c)),
            (1, 0, -s * FRAC_1_SQRT_2),
            (1, -1, 0.5 * (1.0 - c)),
            (0, 1, s * FRAC_1_SQRT_2),
            (0, 0, c),
            (0, -1, -s * FRAC_1_SQRT_2),
            (-1, 1, 0.5 * (1.0 - c)),
            (-1, 0, s * FRAC_1_SQRT_2),
            (-1, -1, 0.5 * (1.0 + c)),
        ];
        for (m, m_prime, value) in expected {
            let actual = d.element(1, m, m_prime);
            assert!(
                (actual - value).abs() <= 1.0e-15,
                "d^1_({m},{m_prime}) expected={value:.15e} actual={actual:.15e}"
            );
        }
    }

    #[test]
    fn recurrence_agrees_with_closed_form() {
        for beta in [0.0, 0.4, PI / 2.0, 2.2, PI] {
            let d = WignerSmallD::new(8, beta);
            for degree in 0..=8_usize {
                let top = degree as i64;
                for m in -top..=top {
                    for m_prime in -top..=top {
                        let expected = wigner_small_d(degree, m, m_prime, beta);
                        let actual = d.element(degree, m, m_prime);
                        assert!(
                            (actual - expected).abs() <= 1.0e-12,
                            "beta={beta} l={degree} m={m} m'={m_prime} expected={expected:.15e} actual={actual:.15e}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn matrices_are_orthogonal() {
        let d = WignerSmallD::new(12, 1.3);
        for degree in [0_usize, 3, 12] {
            let matrix = d.degree(degree);
            let size = matrix.nrows();
            for row in 0..size {
                for col in 0..size {
                    let mut dot = 0.0;
                    for k in 0..size {
                        dot += matrix[(row, k)] * matrix[(col, k)];
                    }
                    let expected = if row == col { 1.0 } else { 0.0 };
                    assert!(
                        (dot - expected).abs() <= 1.0e-12,
                        "l={degree} ({row},{col}) dot={dot:.15e}"
                    );
                }
            }
        }
    }

    #[test]
    fn zero_angle_is_identity() {
        let d = WignerSmallD::new(5, 0.0);
        assert_eq!(d.lmax(), 5);
        assert_eq!(d.beta(), 0.0);
        for degree in 0..=5_usize {
            let top = degree as i64;
            for m in -top..=top {
                for m_prime in -top..=top {
                    let expected = if m == m_prime { 1.0 } else { 0.0 };
                    assert!((d.element(degree, m, m_prime) - expected).abs() <= 1.0e-14);
                }
            }
        }
    }
}
