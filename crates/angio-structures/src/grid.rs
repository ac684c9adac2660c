// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
SamplingGrid - axis-aligned uniform rectangular sampling mesh.

Partitions a bounding box into cuboid cells of uniform per-axis size and maps
3D coordinates to linear cell indices. Cells are linearized as
`ix + iy * nx + iz * nx * ny`.
*/

use serde::{Deserialize, Serialize};

use crate::error::{AngioError, AngioResult};
use crate::geometry::Point3;

/// Axis-aligned uniform rectangular sampling grid
///
/// Described by its min corner, per-axis cell size and per-axis cell counts.
/// Cell corner nodes follow the hexahedral convention: corner 0 is the cell's
/// min corner and corner 7 its max corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingGrid {
    origin: Point3,
    cell_size: [f64; 3],
    cell_counts: [usize; 3],
}

impl SamplingGrid {
    /// Create a grid from its min corner, per-axis cell size and cell counts.
    ///
    /// # Errors
    ///
    /// Returns [`AngioError::Configuration`] for non-positive cell sizes or
    /// zero cell counts.
    pub fn new(origin: Point3, cell_size: [f64; 3], cell_counts: [usize; 3]) -> AngioResult<Self> {
        for axis in 0..3 {
            if !(cell_size[axis] > 0.0) || !cell_size[axis].is_finite() {
                return Err(AngioError::Configuration(format!(
                    "cell size must be positive and finite, got {} on axis {}",
                    cell_size[axis], axis
                )));
            }
            if cell_counts[axis] == 0 {
                return Err(AngioError::Configuration(format!(
                    "cell count must be nonzero on axis {}",
                    axis
                )));
            }
        }
        Ok(SamplingGrid {
            origin,
            cell_size,
            cell_counts,
        })
    }

    /// Create a grid spanning `[min, max]` with the given per-axis cell counts.
    ///
    /// # Errors
    ///
    /// Returns [`AngioError::Configuration`] if `max` does not strictly
    /// exceed `min` on every axis, or any cell count is zero.
    pub fn covering(min: Point3, max: Point3, cell_counts: [usize; 3]) -> AngioResult<Self> {
        let mut cell_size = [0.0; 3];
        for axis in 0..3 {
            let extent = max[axis] - min[axis];
            if !(extent > 0.0) {
                return Err(AngioError::Configuration(format!(
                    "bounding box extent must be positive, got {} on axis {}",
                    extent, axis
                )));
            }
            if cell_counts[axis] == 0 {
                return Err(AngioError::Configuration(format!(
                    "cell count must be nonzero on axis {}",
                    axis
                )));
            }
            cell_size[axis] = extent / cell_counts[axis] as f64;
        }
        SamplingGrid::new(min, cell_size, cell_counts)
    }

    /// Min corner of the grid.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Per-axis cell size.
    pub fn cell_size(&self) -> [f64; 3] {
        self.cell_size
    }

    /// Per-axis cell counts (nx, ny, nz).
    pub fn cell_counts(&self) -> [usize; 3] {
        self.cell_counts
    }

    /// Total number of cells.
    pub fn total_cells(&self) -> usize {
        self.cell_counts[0] * self.cell_counts[1] * self.cell_counts[2]
    }

    /// Volume of one cell (uniform across the grid).
    pub fn cell_volume(&self) -> f64 {
        self.cell_size[0] * self.cell_size[1] * self.cell_size[2]
    }

    /// Map a coordinate to its linear cell index.
    ///
    /// Containment is half-open: a coordinate on the grid's max face is out
    /// of range.
    ///
    /// # Errors
    ///
    /// Returns [`AngioError::InvalidGeometry`] for coordinates outside
    /// `[origin, origin + extent)` on any axis.
    pub fn cell_index(&self, point: Point3) -> AngioResult<usize> {
        let mut index = [0usize; 3];
        for axis in 0..3 {
            let offset = (point[axis] - self.origin[axis]) / self.cell_size[axis];
            if offset < 0.0 || offset >= self.cell_counts[axis] as f64 {
                return Err(AngioError::geometry(format!(
                    "coordinate ({}, {}, {}) lies outside the sampling grid",
                    point[0], point[1], point[2]
                )));
            }
            index[axis] = offset as usize;
        }
        let [nx, ny, _] = self.cell_counts;
        Ok(index[0] + index[1] * nx + index[2] * nx * ny)
    }

    /// (min corner, max corner) of a cell.
    pub fn cell_bounds(&self, cell: usize) -> (Point3, Point3) {
        let [nx, ny, _] = self.cell_counts;
        let ix = cell % nx;
        let iy = (cell / nx) % ny;
        let iz = cell / (nx * ny);
        let min = [
            self.origin[0] + ix as f64 * self.cell_size[0],
            self.origin[1] + iy as f64 * self.cell_size[1],
            self.origin[2] + iz as f64 * self.cell_size[2],
        ];
        let max = [
            min[0] + self.cell_size[0],
            min[1] + self.cell_size[1],
            min[2] + self.cell_size[2],
        ];
        (min, max)
    }

    /// Centroid of a cell.
    pub fn cell_centroid(&self, cell: usize) -> Point3 {
        let (min, max) = self.cell_bounds(cell);
        [
            0.5 * (min[0] + max[0]),
            0.5 * (min[1] + max[1]),
            0.5 * (min[2] + max[2]),
        ]
    }

    /// Coordinates of every grid corner node, x fastest, then y, then z.
    ///
    /// `(nx + 1) * (ny + 1) * (nz + 1)` points; together with
    /// [`cell_corner_nodes`](Self::cell_corner_nodes) this is the mesh view
    /// of the grid (a node array plus per-cell corner references).
    pub fn node_coordinates(&self) -> Vec<Point3> {
        let [nx, ny, nz] = self.cell_counts;
        let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for iz in 0..=nz {
            for iy in 0..=ny {
                for ix in 0..=nx {
                    nodes.push([
                        self.origin[0] + ix as f64 * self.cell_size[0],
                        self.origin[1] + iy as f64 * self.cell_size[1],
                        self.origin[2] + iz as f64 * self.cell_size[2],
                    ]);
                }
            }
        }
        nodes
    }

    /// Indices into [`node_coordinates`](Self::node_coordinates) of a cell's
    /// 8 corners, min corner first, max corner last.
    pub fn cell_corner_nodes(&self, cell: usize) -> [usize; 8] {
        let [nx, ny, _] = self.cell_counts;
        let ix = cell % nx;
        let iy = (cell / nx) % ny;
        let iz = cell / (nx * ny);
        let node_index = |dx: usize, dy: usize, dz: usize| {
            (ix + dx) + (iy + dy) * (nx + 1) + (iz + dz) * (nx + 1) * (ny + 1)
        };
        let mut corners = [0usize; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = node_index(i & 1, (i >> 1) & 1, (i >> 2) & 1);
        }
        corners
    }

    /// The 8 corner coordinates of a cell, min corner first, max corner last.
    pub fn cell_corners(&self, cell: usize) -> [Point3; 8] {
        let (min, max) = self.cell_bounds(cell);
        let mut corners = [[0.0; 3]; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            *corner = [
                if i & 1 == 0 { min[0] } else { max[0] },
                if i & 2 == 0 { min[1] } else { max[1] },
                if i & 4 == 0 { min[2] } else { max[2] },
            ];
        }
        corners
    }
}
