//! Enumeration of stored `(l, m)` pairs.
//!
//! Coefficients are stored order-major: for each order
//! `m = 0, mres, ..., mmax*mres`, the degrees `l = m..=lmax` follow
//! contiguously.

use crate::domain::{ShtError, ShtResult};
use std::ops::Range;

/// Number of stored coefficients for a truncation. `mmax` is clamped to
/// `lmax / mres` and `mres = 0` is read as 1.
pub fn nlm_calc(lmax: usize, mmax: usize, mres: usize) -> usize {
    let mres = mres.max(1);
    let mmax = mmax.min(lmax / mres);
    (mmax + 1) * (lmax + 1) - mres * mmax * (mmax + 1) / 2
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectralIndex {
    lmax: usize,
    mmax: usize,
    mres: usize,
    offsets: Vec<usize>,
    degrees: Vec<usize>,
    orders: Vec<usize>,
}

impl SpectralIndex {
    /// Builds the map for an already validated truncation.
    pub fn new(lmax: usize, mmax: usize, mres: usize) -> Self {
        let nlm = nlm_calc(lmax, mmax, mres);
        let mut offsets = Vec::with_capacity(mmax + 2);
        let mut degrees = Vec::with_capacity(nlm);
        let mut orders = Vec::with_capacity(nlm);

        for im in 0..=mmax {
            offsets.push(degrees.len());
            let order = im * mres;
            for degree in order..=lmax {
                degrees.push(degree);
                orders.push(order);
            }
        }
        offsets.push(degrees.len());

        Self {
            lmax,
            mmax,
            mres,
            offsets,
            degrees,
            orders,
        }
    }

    pub fn lmax(&self) -> usize {
        self.lmax
    }

    pub fn mmax(&self) -> usize {
        self.mmax
    }

    pub fn mres(&self) -> usize {
        self.mres
    }

    pub fn nlm(&self) -> usize {
        self.degrees.len()
    }

    pub fn degrees(&self) -> &[usize] {
        &self.degrees
    }

    pub fn orders(&self) -> &[usize] {
        &self.orders
    }

    /// Linear position of `(degree, order)`.
    pub fn linear_index(&self, degree: usize, order: usize) -> ShtResult<usize> {
        if order % self.mres != 0 || order > self.mmax * self.mres || degree < order || degree > self.lmax
        {
            return Err(self.out_of_range(degree as i64, order as i64));
        }
        Ok(self.offsets[order / self.mres] + degree - order)
    }

    /// Index range holding every degree of the `im`-th stored order.
    pub fn order_range(&self, im: usize) -> Range<usize> {
        self.offsets[im]..self.offsets[im + 1]
    }

    /// `(l, m)` pairs in storage order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.degrees.iter().copied().zip(self.orders.iter().copied())
    }

    /// Length of the complex-field layout covering orders `-l..=l`.
    pub fn complex_len(&self) -> usize {
        (self.lmax + 1) * (self.lmax + 1)
    }

    /// Position of `(degree, order)` in the complex-field layout
    /// `l*(l+1) + m`.
    pub fn complex_index(&self, degree: usize, order: i64) -> ShtResult<usize> {
        if degree > self.lmax || order.unsigned_abs() as usize > degree {
            return Err(self.out_of_range(degree as i64, order));
        }
        Ok(((degree * (degree + 1)) as i64 + order) as usize)
    }

    fn out_of_range(&self, degree: i64, order: i64) -> ShtError {
        ShtError::OutOfRange {
            degree,
            order,
            limit: format!(
                "lmax={}, mmax={}, mres={}",
                self.lmax, self.mmax, self.mres
            ),
        }
    }
}
