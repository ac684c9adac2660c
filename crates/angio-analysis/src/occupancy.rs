// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Ellipsoid occupancy - organ volume per sampling-grid cell.

Cells fully inside the ellipsoid get the exact cuboid volume, cells fully
outside get zero, and cells straddling the surface are integrated with a 2D
composite trapezoidal quadrature of the clamped surface height
`z(x, y) = z_radius * sqrt(1 - (x/x_radius)^2 - (y/y_radius)^2)`.
*/

use ndarray::Array1;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use angio_structures::{AngioError, AngioResult, EllipsoidShape, SamplingGrid};

/// Organ volume held by each sampling-grid cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridOccupancy {
    /// Ellipsoid-interior volume per cell, `0 <= value <= cell volume`
    pub volume_in_cell: Array1<f64>,
    /// Indices of cells holding nonzero organ volume, ascending
    pub non_empty_cells: Vec<usize>,
    /// Sum of `volume_in_cell`
    pub total_volume: f64,
}

/// Compute the ellipsoid-interior volume inside every grid cell.
///
/// `resolution` is the number of quadrature sample points per axis used for
/// cells straddling the ellipsoid surface; accuracy (and runtime) scale with
/// it. Interior and exterior cells are exact.
///
/// # Errors
///
/// Returns [`AngioError::Configuration`] if `resolution < 2`.
pub fn ellipsoid_volume_in_grid(
    grid: &SamplingGrid,
    shape: &EllipsoidShape,
    resolution: usize,
) -> AngioResult<GridOccupancy> {
    if resolution < 2 {
        return Err(AngioError::Configuration(format!(
            "quadrature resolution must be at least 2, got {}",
            resolution
        )));
    }
    let total_cells = grid.total_cells();

    #[cfg(feature = "parallel")]
    let volumes: Vec<f64> = (0..total_cells)
        .into_par_iter()
        .map(|cell| occupied_volume(grid, shape, resolution, cell))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let volumes: Vec<f64> = (0..total_cells)
        .map(|cell| occupied_volume(grid, shape, resolution, cell))
        .collect();

    let non_empty_cells: Vec<usize> = volumes
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > 0.0)
        .map(|(cell, _)| cell)
        .collect();
    let volume_in_cell = Array1::from_vec(volumes);
    let total_volume = volume_in_cell.sum();

    info!(
        non_empty = non_empty_cells.len(),
        total_cells, total_volume, "ellipsoid occupancy computed"
    );

    Ok(GridOccupancy {
        volume_in_cell,
        non_empty_cells,
        total_volume,
    })
}

/// Ellipsoid-interior volume within one cell.
fn occupied_volume(
    grid: &SamplingGrid,
    shape: &EllipsoidShape,
    resolution: usize,
    cell: usize,
) -> f64 {
    let corners = grid.cell_corners(cell);
    let inside = corners
        .iter()
        .filter(|&&corner| shape.contains_or_on(corner))
        .count();

    if inside == 8 {
        return grid.cell_volume();
    }
    let (min, max) = grid.cell_bounds(cell);
    if inside == 0 && !overlaps_bounding_box(min, max, shape) {
        return 0.0;
    }

    // Straddling cell: integrate the clamped dome height over the x/y
    // footprint. The dome is symmetric in z, so a cell below the equatorial
    // plane mirrors into the upper half-space, and a cell spanning z = 0
    // splits into the two half-slabs.
    let footprint = [min[0], max[0], min[1], max[1]];
    let (z_min, z_max) = (min[2], max[2]);
    if z_max <= 0.0 {
        dome_slab_volume(shape, footprint, -z_max, -z_min, resolution)
    } else if z_min >= 0.0 {
        dome_slab_volume(shape, footprint, z_min, z_max, resolution)
    } else {
        dome_slab_volume(shape, footprint, 0.0, -z_min, resolution)
            + dome_slab_volume(shape, footprint, 0.0, z_max, resolution)
    }
}

fn overlaps_bounding_box(min: [f64; 3], max: [f64; 3], shape: &EllipsoidShape) -> bool {
    let (bb_min, bb_max) = shape.bounding_box();
    (0..3).all(|axis| min[axis] < bb_max[axis] && max[axis] > bb_min[axis])
}

/// Volume between the planes `z = z_lo` and `z = z_hi` (`0 <= z_lo <= z_hi`)
/// that lies under the upper ellipsoid dome, within the given x/y footprint.
///
/// Integrates `clamp(z(x, y), z_lo, z_hi) - z_lo` with an n x n composite
/// trapezoidal rule. Negative radicands clamp to zero height.
fn dome_slab_volume(
    shape: &EllipsoidShape,
    [x0, x1, y0, y1]: [f64; 4],
    z_lo: f64,
    z_hi: f64,
    resolution: usize,
) -> f64 {
    let dx = (x1 - x0) / (resolution - 1) as f64;
    let dy = (y1 - y0) / (resolution - 1) as f64;

    let mut row_integrals = vec![0.0; resolution];
    let mut heights = vec![0.0; resolution];
    for (j, row) in row_integrals.iter_mut().enumerate() {
        let y = y0 + j as f64 * dy;
        for (i, height) in heights.iter_mut().enumerate() {
            let x = x0 + i as f64 * dx;
            let radicand = 1.0 - (x / shape.x_radius).powi(2) - (y / shape.y_radius).powi(2);
            let dome = shape.z_radius * radicand.max(0.0).sqrt();
            *height = dome.clamp(z_lo, z_hi);
        }
        *row = trapz(&heights, dx);
    }
    let dome_volume = trapz(&row_integrals, dy);

    dome_volume - z_lo * (x1 - x0) * (y1 - y0)
}

/// Composite trapezoidal rule over uniformly spaced samples.
fn trapz(values: &[f64], dx: f64) -> f64 {
    match values {
        [] | [_] => 0.0,
        [first, .., last] => dx * (values.iter().sum::<f64>() - 0.5 * (first + last)),
    }
}
