//! Normalized associated Legendre functions by three-term recurrence in degree.
//!
//! Coefficients are generated for the orthonormal basis and rescaled per degree
//! and per order, so one recurrence serves all supported normalizations.
//! The derivative form evaluates `P_lm / sin(theta)` (for `m > 0`) and
//! `dP_lm / dtheta` without dividing by `sin(theta)`, which keeps both finite at
//! the poles.

use crate::common::config::ShtConfig;
use crate::common::constants::Y00_ORTHONORMAL;

#[derive(Debug, Clone, PartialEq)]
struct OrderRecurrence {
    order: usize,
    start: f64,
    alpha: Vec<f64>,
    beta: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendreRecurrence {
    lmax: usize,
    orders: Vec<OrderRecurrence>,
    degree_scale: Vec<f64>,
}

impl LegendreRecurrence {
    pub fn new(config: &ShtConfig) -> Self {
        let lmax = config.lmax;
        let mut orders = Vec::with_capacity(config.mmax + 1);
        let mut start_product = 1.0;
        let mut previous_order = 0;

        for im in 0..=config.mmax {
            let order = im * config.mres;
            for k in (previous_order + 1)..=order {
                start_product *= (2 * k + 1) as f64 / (2 * k) as f64;
            }
            previous_order = order;

            let cs_sign = if order % 2 == 0 { 1.0 } else { -1.0 };
            let start = Y00_ORTHONORMAL
                * start_product.sqrt()
                * cs_sign
                * config.order_phase(order)
                * config.order_norm_scale(order).sqrt();

            let mut alpha = Vec::with_capacity(lmax - order);
            let mut beta = Vec::with_capacity(lmax - order);
            for degree in (order + 1)..=lmax {
                let l = degree as f64;
                let m = order as f64;
                let denominator = (l + m) * (l - m);
                alpha.push(((2.0 * l + 1.0) * (2.0 * l - 1.0) / denominator).sqrt());
                let lower = (l - 1.0 + m) * (l - 1.0 - m);
                beta.push(if lower == 0.0 {
                    0.0
                } else {
                    -((2.0 * l + 1.0) / (2.0 * l - 3.0) * lower / denominator).sqrt()
                });
            }

            orders.push(OrderRecurrence {
                order,
                start,
                alpha,
                beta,
            });
        }

        let degree_scale = (0..=lmax)
            .map(|degree| config.normalization.degree_scale(degree))
            .collect();

        Self {
            lmax,
            orders,
            degree_scale,
        }
    }

    pub fn lmax(&self) -> usize {
        self.lmax
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    pub fn order(&self, im: usize) -> usize {
        self.orders[im].order
    }

    /// Writes `P_lm(x)` for `l = m..=ltr` into `out[l - m]`.
    pub fn values(&self, im: usize, ltr: usize, x: f64, out: &mut [f64]) {
        let recurrence = &self.orders[im];
        let m = recurrence.order;
        if ltr < m {
            return;
        }
        let sin_theta = ((1.0 - x) * (1.0 + x)).max(0.0).sqrt();

        let mut y0 = recurrence.start * sin_theta.powi(m as i32);
        out[0] = y0 * self.degree_scale[m];
        if ltr == m {
            return;
        }
        let mut y1 = recurrence.alpha[0] * x * y0;
        out[1] = y1 * self.degree_scale[m + 1];

        for degree in (m + 2)..=ltr {
            let k = degree - m - 1;
            let y = recurrence.alpha[k] * x * y1 + recurrence.beta[k] * y0;
            out[degree - m] = y * self.degree_scale[degree];
            y0 = y1;
            y1 = y;
        }
    }

    /// Writes `P_lm / sin(theta)` (`P_l0` itself for `m = 0`) into `scaled`
    /// and `dP_lm / dtheta` into `dtheta`, for `l = m..=ltr`.
    pub fn values_and_derivatives(
        &self,
        im: usize,
        ltr: usize,
        x: f64,
        scaled: &mut [f64],
        dtheta: &mut [f64],
    ) {
        let recurrence = &self.orders[im];
        let m = recurrence.order;
        if ltr < m {
            return;
        }
        let sin_theta = ((1.0 - x) * (1.0 + x)).max(0.0).sqrt();

        let (mut y0, mut dy0, st) = if m == 0 {
            (recurrence.start, 0.0, sin_theta)
        } else {
            let y0 = recurrence.start * sin_theta.powi(m as i32 - 1);
            (y0, m as f64 * x * y0, sin_theta * sin_theta)
        };
        scaled[0] = y0 * self.degree_scale[m];
        dtheta[0] = dy0 * self.degree_scale[m];
        if ltr == m {
            return;
        }

        let a = recurrence.alpha[0];
        let mut y1 = a * x * y0;
        let mut dy1 = a * (x * dy0 - st * y0);
        scaled[1] = y1 * self.degree_scale[m + 1];
        dtheta[1] = dy1 * self.degree_scale[m + 1];

        for degree in (m + 2)..=ltr {
            let k = degree - m - 1;
            let a = recurrence.alpha[k];
            let b = recurrence.beta[k];
            let y = a * x * y1 + b * y0;
            let dy = a * (x * dy1 - st * y1) + b * dy0;
            let scale = self.degree_scale[degree];
            scaled[degree - m] = y * scale;
            dtheta[degree - m] = dy * scale;
            y0 = y1;
            dy0 = dy1;
            y1 = y;
            dy1 = dy;
        }
    }
}
