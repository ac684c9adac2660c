// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Grid Volume Integration Tests

Covers the spatial half of the pipeline:
- Ellipsoid occupancy against the closed-form ellipsoid volume
- Terminal binning variants agreeing on occupied grids
- Branch rasterization conservation and organ-consistency checks
*/

use angio_analysis::{
    branch_volume_in_grid, ellipsoid_volume_in_grid, find_terminals, terminals_in_grid_fast,
    terminals_in_grid_scan, CylinderSampling,
};
use angio_structures::{Connectivity, EllipsoidShape, SamplingGrid, VesselTree};

/// Organ-scale ellipsoid with distinct radii.
fn organ() -> EllipsoidShape {
    EllipsoidShape::from_organ(427.0, 24.8, 1.26).unwrap()
}

#[test]
fn test_occupancy_sum_matches_closed_form() {
    let shape = organ();
    let (min, max) = shape.bounding_box();
    let grid = SamplingGrid::covering(min, max, [8, 8, 4]).unwrap();

    let occupancy = ellipsoid_volume_in_grid(&grid, &shape, 50).unwrap();
    let expected = shape.volume();
    let relative_error = (occupancy.total_volume - expected).abs() / expected;
    assert!(
        relative_error < 0.015,
        "occupancy sum {} vs closed form {} (relative error {})",
        occupancy.total_volume,
        expected,
        relative_error
    );

    // no cell may exceed its own cuboid volume
    for &cell in &occupancy.non_empty_cells {
        assert!(occupancy.volume_in_cell[cell] <= grid.cell_volume() + 1e-9);
        assert!(occupancy.volume_in_cell[cell] > 0.0);
    }
}

#[test]
fn test_degenerate_grid_captures_whole_organ() {
    let shape = organ();
    let (min, max) = shape.bounding_box();
    let grid = SamplingGrid::covering(min, max, [1, 1, 1]).unwrap();

    let occupancy = ellipsoid_volume_in_grid(&grid, &shape, 200).unwrap();
    assert_eq!(occupancy.non_empty_cells, vec![0]);
    let expected = shape.volume();
    assert!((occupancy.total_volume - expected).abs() / expected < 0.015);
}

/// A small tree tucked inside the organ, around the grid center.
fn inner_tree() -> (VesselTree, Connectivity) {
    let tree = VesselTree::new(
        vec![
            [0.3, 0.3, -2.0],
            [0.3, 0.3, 0.4],
            [-1.5, 0.3, 1.5],
            [1.5, 0.3, 1.5],
        ],
        vec![[0, 1], [1, 2], [1, 3]],
    )
    .unwrap();
    let cnct = Connectivity::build(&tree);
    (tree, cnct)
}

#[test]
fn test_terminal_binning_variants_agree() {
    let shape = organ();
    let (min, max) = shape.bounding_box();
    let grid = SamplingGrid::covering(min, max, [6, 6, 6]).unwrap();
    let occupancy = ellipsoid_volume_in_grid(&grid, &shape, 50).unwrap();

    let (tree, cnct) = inner_tree();
    let terminals = find_terminals(&tree, &cnct);

    let fast = terminals_in_grid_fast(&grid, &terminals, &tree).unwrap();
    let scan = terminals_in_grid_scan(&grid, &occupancy, &terminals, &tree);

    assert_eq!(fast.total_terminals, terminals.count());
    assert_eq!(fast.terminals_in_cell.sum() as usize, terminals.count());
    assert_eq!(fast.terminal_cell, scan.terminal_cell);
    assert_eq!(fast.terminals_in_cell, scan.terminals_in_cell);
}

#[test]
fn test_branch_volumes_conserve_cylinder_volume() {
    let shape = organ();
    let (min, max) = shape.bounding_box();
    let grid = SamplingGrid::covering(min, max, [6, 6, 6]).unwrap();
    let occupancy = ellipsoid_volume_in_grid(&grid, &shape, 50).unwrap();

    let (tree, _) = inner_tree();
    let sampling = CylinderSampling::default();
    let volumes = branch_volume_in_grid(&grid, &tree, &shape, &occupancy, &sampling).unwrap();

    // every element's volume is pi r^2 l, and the per-cell shares add back up
    let mut expected_total = 0.0;
    for ne in 0..tree.element_count() {
        let expected =
            std::f64::consts::PI * sampling.radius * sampling.radius * tree.element_length(ne);
        assert!((volumes.branch_volume[ne] - expected).abs() < 1e-12);
        expected_total += expected;
    }
    assert!((volumes.total_volume - expected_total).abs() < 1e-12);
    assert!((volumes.volume_in_cell.sum() - expected_total).abs() < 1e-9);

    // vessel volume only where the organ is
    for cell in 0..grid.total_cells() {
        if volumes.volume_in_cell[cell] > 0.0 {
            assert!(occupancy.volume_in_cell[cell] > 0.0);
        }
    }

    // diameter weighting is share * 2r, so the cell sums scale by 2r
    let weighted_sum: f64 = volumes.weighted_diameter_in_cell.sum();
    assert!((weighted_sum - expected_total * 2.0 * sampling.radius).abs() < 1e-9);
}

#[test]
fn test_branch_outside_organ_aborts() {
    let shape = EllipsoidShape::from_radii(3.0, 3.0, 3.0).unwrap();
    let grid = SamplingGrid::covering([-10.0; 3], [10.0; 3], [4, 4, 4]).unwrap();
    let occupancy = ellipsoid_volume_in_grid(&grid, &shape, 20).unwrap();

    // second element pokes out of the ellipsoid
    let tree = VesselTree::new(
        vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [8.0, 0.0, 0.0]],
        vec![[0, 1], [1, 2]],
    )
    .unwrap();

    let result = branch_volume_in_grid(
        &grid,
        &tree,
        &shape,
        &occupancy,
        &CylinderSampling::default(),
    );
    assert!(result.is_err());
}
