//! Conversions between caller spatial arrays and per-latitude Fourier modes.

use crate::common::config::SpatialLayout;
use crate::domain::{ExecutionMode, ShtError, ShtResult};
use crate::grid::Grid;
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

pub(crate) fn check_shape<T>(grid: &Grid, field: &'static str, view: &ArrayView2<'_, T>) -> ShtResult<()> {
    let expected = grid.spat_shape();
    let actual = view.dim();
    if actual != expected {
        return Err(ShtError::ShapeMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Samples of internal latitude `it`, in longitude order.
fn gather_row<T: Copy>(grid: &Grid, standard: &ArrayView2<'_, T>, it: usize) -> Vec<T> {
    let row = grid.row_of(it);
    match grid.layout() {
        SpatialLayout::PhiContiguous => standard.row(row).to_vec(),
        SpatialLayout::ThetaContiguous => standard.column(row).to_vec(),
    }
}

/// Places per-latitude rows back into the caller's layout.
fn assemble<T: Copy>(grid: &Grid, rows: &[Vec<T>]) -> Array2<T> {
    match grid.layout() {
        SpatialLayout::PhiContiguous => {
            Array2::from_shape_fn(grid.spat_shape(), |(row, j)| rows[grid.row_of(row)][j])
        }
        SpatialLayout::ThetaContiguous => {
            Array2::from_shape_fn(grid.spat_shape(), |(j, row)| rows[grid.row_of(row)][j])
        }
    }
}

/// Fourier modes `0..modes` of a real field, indexed `[it][im]`.
pub(crate) fn real_field_to_modes(
    grid: &Grid,
    execution: ExecutionMode,
    field: &'static str,
    view: ArrayView2<'_, f64>,
    modes: usize,
) -> ShtResult<Vec<Vec<Complex64>>> {
    check_shape(grid, field, &view)?;
    let standard = view.as_standard_layout();
    let standard = standard.view();
    Ok(execution.map(grid.nlat(), |it| {
        let samples = gather_row(grid, &standard, it);
        let mut row_modes = vec![Complex64::new(0.0, 0.0); modes];
        grid.fft().real_to_modes(&samples, &mut row_modes);
        row_modes
    }))
}

/// Real field from per-order latitude columns indexed `[im][it]`.
pub(crate) fn modes_to_real_field(
    grid: &Grid,
    execution: ExecutionMode,
    columns: &[Vec<Complex64>],
) -> Array2<f64> {
    let rows = execution.map(grid.nlat(), |it| {
        let row_modes: Vec<Complex64> = columns.iter().map(|column| column[it]).collect();
        let mut samples = vec![0.0; grid.nphi()];
        grid.fft().modes_to_real(&row_modes, &mut samples);
        samples
    });
    assemble(grid, &rows)
}

/// Full complex spectrum of every latitude row, indexed `[it][bin]`.
pub(crate) fn complex_field_to_spectra(
    grid: &Grid,
    execution: ExecutionMode,
    field: &'static str,
    view: ArrayView2<'_, Complex64>,
) -> ShtResult<Vec<Vec<Complex64>>> {
    check_shape(grid, field, &view)?;
    let standard = view.as_standard_layout();
    let standard = standard.view();
    Ok(execution.map(grid.nlat(), |it| {
        let mut samples = gather_row(grid, &standard, it);
        grid.fft().complex_forward(&mut samples);
        samples
    }))
}

/// Complex field from per-latitude spectra indexed `[it][bin]`.
pub(crate) fn spectra_to_complex_field(
    grid: &Grid,
    execution: ExecutionMode,
    mut spectra: Vec<Vec<Complex64>>,
) -> Array2<Complex64> {
    if execution.is_parallel() {
        use rayon::prelude::*;
        spectra
            .par_iter_mut()
            .for_each(|spectrum| grid.fft().complex_inverse(spectrum));
    } else {
        for spectrum in spectra.iter_mut() {
            grid.fft().complex_inverse(spectrum);
        }
    }
    assemble(grid, &spectra)
}
