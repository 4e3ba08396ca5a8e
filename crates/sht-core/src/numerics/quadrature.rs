//! Colatitude quadrature rules on `x = cos(theta)`.
//!
//! Every rule returns nodes ordered from the north pole (`x` near 1) to the
//! south pole, with weights normalized so that they integrate `f(x)` over
//! `[-1, 1]`.

use crate::common::config::Sampling;
use crate::common::constants::{GAUSS_NEWTON_MAX_ITERATIONS, GAUSS_NEWTON_TOLERANCE, PI};

#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule {
    pub cos_theta: Vec<f64>,
    pub weights: Vec<f64>,
}

impl QuadratureRule {
    pub fn len(&self) -> usize {
        self.cos_theta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cos_theta.is_empty()
    }

    /// Highest polynomial degree in `x` integrated exactly.
    pub fn exact_degree(sampling: Sampling, nodes: usize) -> usize {
        match sampling {
            Sampling::Gauss => (2 * nodes).saturating_sub(1),
            Sampling::RegularWithPoles | Sampling::RegularNoPoles => nodes.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuadratureError {
    #[error("{rule} quadrature requires at least {minimum} nodes, got {actual}")]
    TooFewNodes {
        rule: &'static str,
        minimum: usize,
        actual: usize,
    },
    #[error("gauss-legendre node {index} of {nodes} did not converge after {iterations} newton steps")]
    NonConvergence {
        index: usize,
        nodes: usize,
        iterations: usize,
    },
}

pub fn quadrature_rule(sampling: Sampling, nodes: usize) -> Result<QuadratureRule, QuadratureError> {
    match sampling {
        Sampling::Gauss => gauss_legendre(nodes),
        Sampling::RegularWithPoles => clenshaw_curtis(nodes),
        Sampling::RegularNoPoles => fejer_first(nodes),
    }
}

/// Gauss-Legendre nodes and weights by Newton iteration on `P_n`.
pub fn gauss_legendre(nodes: usize) -> Result<QuadratureRule, QuadratureError> {
    if nodes == 0 {
        return Err(QuadratureError::TooFewNodes {
            rule: "gauss-legendre",
            minimum: 1,
            actual: nodes,
        });
    }

    let mut cos_theta = vec![0.0; nodes];
    let mut weights = vec![0.0; nodes];
    let n = nodes as f64;

    for index in 0..nodes.div_ceil(2) {
        let mut z = (PI * (index as f64 + 0.75) / (n + 0.5)).cos();
        let mut converged = false;
        for _ in 0..GAUSS_NEWTON_MAX_ITERATIONS {
            let (value, derivative) = legendre_with_derivative(nodes, z);
            let step = value / derivative;
            z -= step;
            if step.abs() <= GAUSS_NEWTON_TOLERANCE {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(QuadratureError::NonConvergence {
                index,
                nodes,
                iterations: GAUSS_NEWTON_MAX_ITERATIONS,
            });
        }

        // one polishing step once inside the tolerance
        let (value, derivative) = legendre_with_derivative(nodes, z);
        z -= value / derivative;
        let (_, derivative) = legendre_with_derivative(nodes, z);
        let weight = 2.0 / ((1.0 - z * z) * derivative * derivative);

        cos_theta[nodes - 1 - index] = -z;
        weights[nodes - 1 - index] = weight;
        cos_theta[index] = z;
        weights[index] = weight;
    }

    Ok(QuadratureRule { cos_theta, weights })
}

fn legendre_with_derivative(degree: usize, x: f64) -> (f64, f64) {
    let mut current = 1.0;
    let mut previous = 0.0;
    for l in 1..=degree {
        let older = previous;
        previous = current;
        current = ((2 * l - 1) as f64 * x * previous - (l - 1) as f64 * older) / l as f64;
    }
    let derivative = degree as f64 * (x * current - previous) / (x * x - 1.0);
    (current, derivative)
}

/// Fejer's first rule: `theta_k = (k + 1/2) pi / n`, poles excluded.
pub fn fejer_first(nodes: usize) -> Result<QuadratureRule, QuadratureError> {
    if nodes == 0 {
        return Err(QuadratureError::TooFewNodes {
            rule: "fejer",
            minimum: 1,
            actual: nodes,
        });
    }

    let n = nodes as f64;
    let mut cos_theta = Vec::with_capacity(nodes);
    let mut weights = Vec::with_capacity(nodes);
    for k in 0..nodes {
        let theta = PI * (k as f64 + 0.5) / n;
        let mut series = 0.0;
        for j in 1..=nodes / 2 {
            let jf = j as f64;
            series += (2.0 * jf * theta).cos() / (4.0 * jf * jf - 1.0);
        }
        cos_theta.push(theta.cos());
        weights.push(2.0 / n * (1.0 - 2.0 * series));
    }

    Ok(QuadratureRule { cos_theta, weights })
}

/// Clenshaw-Curtis rule: `theta_k = k pi / (n - 1)`, both poles included.
pub fn clenshaw_curtis(nodes: usize) -> Result<QuadratureRule, QuadratureError> {
    if nodes < 2 {
        return Err(QuadratureError::TooFewNodes {
            rule: "clenshaw-curtis",
            minimum: 2,
            actual: nodes,
        });
    }

    let intervals = nodes - 1;
    let n = intervals as f64;
    let mut cos_theta = Vec::with_capacity(nodes);
    let mut weights = Vec::with_capacity(nodes);
    for k in 0..nodes {
        let theta = PI * k as f64 / n;
        let mut series = 0.0;
        for j in 1..=intervals / 2 {
            let jf = j as f64;
            let b = if 2 * j == intervals { 1.0 } else { 2.0 };
            series += b * (2.0 * jf * theta).cos() / (4.0 * jf * jf - 1.0);
        }
        let c = if k == 0 || k == intervals { 1.0 } else { 2.0 };
        let x = if k == 0 {
            1.0
        } else if k == intervals {
            -1.0
        } else {
            theta.cos()
        };
        cos_theta.push(x);
        weights.push(c / n * (1.0 - series));
    }

    Ok(QuadratureRule { cos_theta, weights })
}
