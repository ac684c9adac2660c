// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Branch volume rasterization - vessel volume per sampling-grid cell.

Each element is modeled as a cylinder of nominal radius between its endpoint
nodes. A canonical x-axis-aligned point cloud filling the cylinder is rotated
onto the element's direction (Rodrigues' axis-angle formula), translated into
place and binned into grid cells; the fraction of points landing in a cell
times the cylinder's true volume estimates that cell's share.
*/

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;

use angio_structures::geometry::{self, Point3};
use angio_structures::{AngioError, AngioResult, EllipsoidShape, SamplingGrid, VesselTree};

use crate::occupancy::GridOccupancy;

/// Sampling density of the canonical cylinder point cloud
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CylinderSampling {
    /// Nominal vessel radius
    pub radius: f64,
    /// Sample points per axis across the cross-section square (points outside
    /// the disc are discarded)
    pub cross_points: usize,
    /// Sample stations along the cylinder axis
    pub layers: usize,
}

impl Default for CylinderSampling {
    fn default() -> Self {
        CylinderSampling {
            radius: 0.1,
            cross_points: 8,
            layers: 10,
        }
    }
}

impl CylinderSampling {
    fn validate(&self) -> AngioResult<()> {
        if !(self.radius > 0.0) || !self.radius.is_finite() {
            return Err(AngioError::Configuration(format!(
                "cylinder radius must be positive and finite, got {}",
                self.radius
            )));
        }
        if self.cross_points < 2 {
            return Err(AngioError::Configuration(format!(
                "cross-section needs at least 2 points per axis, got {}",
                self.cross_points
            )));
        }
        if self.layers == 0 {
            return Err(AngioError::Configuration(
                "cylinder needs at least one axial layer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Vessel volume distributed over the sampling grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchVolumes {
    /// Total vessel volume per cell
    pub volume_in_cell: Array1<f64>,
    /// Diameter-weighted volume accumulator per cell (volume share x 2r)
    pub weighted_diameter_in_cell: Array1<f64>,
    /// Number of distinct elements contributing volume to each cell
    pub branches_in_cell: Array1<u32>,
    /// Cylinder volume of each element
    pub branch_volume: Array1<f64>,
    /// Sum of all element volumes
    pub total_volume: f64,
}

/// Rasterize every tree element into the sampling grid.
///
/// Both endpoints of every element must lie inside or on the organ
/// ellipsoid, and no cell may receive vessel volume without holding organ
/// volume in `occupancy`; either situation is a hard geometry error.
///
/// # Errors
///
/// - [`AngioError::Configuration`] for invalid sampling parameters or an
///   `occupancy` not sized to the grid.
/// - [`AngioError::InvalidGeometry`] for endpoints outside the organ,
///   zero-length elements, sample points outside the grid, or vessel volume
///   in a cell with zero organ volume.
pub fn branch_volume_in_grid(
    grid: &SamplingGrid,
    tree: &VesselTree,
    shape: &EllipsoidShape,
    occupancy: &GridOccupancy,
    sampling: &CylinderSampling,
) -> AngioResult<BranchVolumes> {
    sampling.validate()?;
    let total_cells = grid.total_cells();
    if occupancy.volume_in_cell.len() != total_cells {
        return Err(AngioError::Configuration(format!(
            "occupancy covers {} cells, grid has {}",
            occupancy.volume_in_cell.len(),
            total_cells
        )));
    }

    let num_elems = tree.element_count();
    let disc = cross_section_offsets(sampling);

    let mut volume_in_cell = Array1::<f64>::zeros(total_cells);
    let mut weighted_diameter_in_cell = Array1::<f64>::zeros(total_cells);
    let mut branches_in_cell = Array1::<u32>::zeros(total_cells);
    let mut branch_volume = Array1::<f64>::zeros(num_elems);

    // Scratch reused across elements; only touched cells are reset.
    let mut points_in_cell = vec![0u32; total_cells];
    let mut touched = Vec::new();

    for ne in 0..num_elems {
        let (start, end) = tree.element_endpoints(ne);
        if !shape.contains_or_on(start) || !shape.contains_or_on(end) {
            return Err(AngioError::geometry(format!(
                "element {} lies outside the organ ellipsoid (whole or partial)",
                ne
            )));
        }

        let axis = geometry::subtract(end, start);
        let length = geometry::norm(axis);
        let Some(direction) = geometry::normalize(axis) else {
            return Err(AngioError::geometry(format!(
                "element {} has zero length",
                ne
            )));
        };
        let rotation = rotation_from_x_axis(direction);

        touched.clear();
        let mut total_points = 0u32;
        for layer in 0..sampling.layers {
            let station = (layer as f64 + 0.5) * length / sampling.layers as f64;
            for &[dy, dz] in &disc {
                let rotated = apply_rotation(&rotation, [station, dy, dz]);
                let point = [
                    rotated[0] + start[0],
                    rotated[1] + start[1],
                    rotated[2] + start[2],
                ];
                let cell = grid.cell_index(point).map_err(|_| {
                    AngioError::geometry(format!(
                        "sample point of element {} lies outside the sampling grid",
                        ne
                    ))
                })?;
                if points_in_cell[cell] == 0 {
                    touched.push(cell);
                }
                points_in_cell[cell] += 1;
                total_points += 1;
            }
        }

        let cylinder_volume =
            std::f64::consts::PI * sampling.radius * sampling.radius * length;
        branch_volume[ne] = cylinder_volume;

        for &cell in &touched {
            let share = points_in_cell[cell] as f64 / total_points as f64 * cylinder_volume;
            volume_in_cell[cell] += share;
            weighted_diameter_in_cell[cell] += share * 2.0 * sampling.radius;
            branches_in_cell[cell] += 1;
            points_in_cell[cell] = 0;
        }
    }

    // Vessel material must stay within the modeled organ.
    for cell in 0..total_cells {
        if volume_in_cell[cell] > 0.0 && occupancy.volume_in_cell[cell] == 0.0 {
            return Err(AngioError::geometry(format!(
                "cell {} accrued vessel volume but holds no organ volume",
                cell
            )));
        }
    }

    let total_volume = branch_volume.sum();
    info!(
        elements = num_elems,
        total_volume, "branch volumes rasterized"
    );

    Ok(BranchVolumes {
        volume_in_cell,
        weighted_diameter_in_cell,
        branches_in_cell,
        branch_volume,
        total_volume,
    })
}

/// (y, z) offsets filling the cylinder cross-section disc.
fn cross_section_offsets(sampling: &CylinderSampling) -> Vec<[f64; 2]> {
    let n = sampling.cross_points;
    let r = sampling.radius;
    let step = 2.0 * r / (n - 1) as f64;
    let mut disc = Vec::new();
    for a in 0..n {
        let dy = -r + a as f64 * step;
        for b in 0..n {
            let dz = -r + b as f64 * step;
            if (dy * dy + dz * dz).sqrt() <= r {
                disc.push([dy, dz]);
            }
        }
    }
    disc
}

/// Rotation matrix mapping the +x axis onto `direction` (Rodrigues' formula).
fn rotation_from_x_axis(direction: Point3) -> [[f64; 3]; 3] {
    let cos_angle = direction[0]; // dot with the x unit vector
    if cos_angle >= 1.0 - 1e-12 {
        return [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    }
    if cos_angle <= -1.0 + 1e-12 {
        // Half-turn about y; the cross-section disc is rotationally symmetric,
        // so the choice of perpendicular axis does not matter.
        return [[-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]];
    }

    let Some(k) = geometry::normalize(geometry::cross([1.0, 0.0, 0.0], direction)) else {
        // cross product cannot vanish for a direction off the x axis
        return [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    };
    let sin_angle = (1.0 - cos_angle * cos_angle).sqrt();
    let skew = [
        [0.0, -k[2], k[1]],
        [k[2], 0.0, -k[0]],
        [-k[1], k[0], 0.0],
    ];
    let mut rotation = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let identity = if i == j { 1.0 } else { 0.0 };
            rotation[i][j] = identity * cos_angle
                + skew[i][j] * sin_angle
                + k[i] * k[j] * (1.0 - cos_angle);
        }
    }
    rotation
}

fn apply_rotation(rotation: &[[f64; 3]; 3], v: Point3) -> Point3 {
    [
        rotation[0][0] * v[0] + rotation[0][1] * v[1] + rotation[0][2] * v[2],
        rotation[1][0] * v[0] + rotation[1][1] * v[1] + rotation[1][2] * v[2],
        rotation[2][0] * v[0] + rotation[2][1] * v[1] + rotation[2][2] * v[2],
    ]
}
