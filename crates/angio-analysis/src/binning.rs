// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Terminal binning - terminals per sampling-grid cell.

Two variants: a fast path computing each terminal's cell index directly from
the grid geometry, and a membership scan over the occupied cells for use when
only part of the grid is of interest.
*/

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;

use angio_structures::{AngioResult, SamplingGrid, VesselTree};

use crate::occupancy::GridOccupancy;
use crate::terminals::TerminalSet;

/// Terminal counts per sampling-grid cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalDensity {
    /// Number of terminals per cell
    pub terminals_in_cell: Array1<u32>,
    /// Cell holding each terminal, parallel to the terminal set; `None` if
    /// the terminal matched no scanned cell
    pub terminal_cell: Vec<Option<usize>>,
    /// Total number of terminals considered
    pub total_terminals: usize,
}

/// Bin terminals into grid cells by direct index computation.
///
/// # Errors
///
/// Returns [`AngioError::InvalidGeometry`](angio_structures::AngioError) if
/// a terminal node lies outside the sampling grid.
pub fn terminals_in_grid_fast(
    grid: &SamplingGrid,
    terminals: &TerminalSet,
    tree: &VesselTree,
) -> AngioResult<TerminalDensity> {
    let mut terminals_in_cell = Array1::<u32>::zeros(grid.total_cells());
    let mut terminal_cell = Vec::with_capacity(terminals.count());
    for &node in &terminals.nodes {
        let cell = grid.cell_index(tree.node(node))?;
        terminals_in_cell[cell] += 1;
        terminal_cell.push(Some(cell));
    }
    Ok(TerminalDensity {
        terminals_in_cell,
        terminal_cell,
        total_terminals: terminals.count(),
    })
}

/// Bin terminals by scanning the occupied cells' bounding boxes.
///
/// Only cells listed as non-empty in `occupancy` are searched; each terminal
/// maps to at most one cell (containment is half-open, `[min, max)` per
/// axis). Terminals outside every occupied cell are left unmapped.
pub fn terminals_in_grid_scan(
    grid: &SamplingGrid,
    occupancy: &GridOccupancy,
    terminals: &TerminalSet,
    tree: &VesselTree,
) -> TerminalDensity {
    let num_terminals = terminals.count();
    let mut terminals_in_cell = Array1::<u32>::zeros(grid.total_cells());
    let mut terminal_cell: Vec<Option<usize>> = vec![None; num_terminals];

    for &cell in &occupancy.non_empty_cells {
        let (min, max) = grid.cell_bounds(cell);
        for (nt, &node) in terminals.nodes.iter().enumerate() {
            if terminal_cell[nt].is_some() {
                continue;
            }
            let coord = tree.node(node);
            let in_cell = (0..3).all(|axis| coord[axis] >= min[axis] && coord[axis] < max[axis]);
            if in_cell {
                terminals_in_cell[cell] += 1;
                terminal_cell[nt] = Some(cell);
            }
        }
    }

    let mapped = terminal_cell.iter().filter(|c| c.is_some()).count();
    info!(
        mapped,
        total_terminals = num_terminals,
        "terminals binned by occupied-cell scan"
    );

    TerminalDensity {
        terminals_in_cell,
        terminal_cell,
        total_terminals: num_terminals,
    }
}
