// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Full Pipeline Integration Tests

Runs the whole analysis chain against one organ: connectivity, orders,
radii, statistics, occupancy, terminal binning and branch rasterization,
then checks the results stay mutually consistent and serialize cleanly.
*/

use angio::prelude::*;

/// Symmetric two-level tree inside the organ: an inlet trunk that splits
/// into two limbs, each of which splits again into two terminals.
fn build_tree() -> VesselTree {
    VesselTree::new(
        vec![
            [0.2, 0.2, -3.0],
            [0.2, 0.2, 0.2],
            [-1.2, 0.2, 1.2],
            [1.6, 0.2, 1.2],
            [-1.7, 0.2, 2.6],
            [-0.7, 0.2, 2.6],
            [1.1, 0.2, 2.6],
            [2.1, 0.2, 2.6],
        ],
        vec![
            [0, 1],
            [1, 2],
            [1, 3],
            [2, 4],
            [2, 5],
            [3, 6],
            [3, 7],
        ],
    )
    .unwrap()
}

#[test]
fn test_analysis_chain_is_consistent() {
    let tree = build_tree();
    let connectivity = Connectivity::build(&tree);

    let orders = evaluate_orders(&connectivity).unwrap();
    assert_eq!(orders.strahler[0], 3);
    assert_eq!(orders.generation[0], 1);

    let terminals = find_terminals(&tree, &connectivity);
    assert_eq!(terminals.count(), 4);

    let radius = radius_by_order(&orders, OrderSystem::Strahler, 0, 1.2, 1.5).unwrap();
    let stats = tree_statistics(&tree, &connectivity, &radius, &orders).unwrap();
    // 1 inlet + 2 limbs + 4 terminal branches
    assert_eq!(stats.branches.len(), 7);

    // big enough organ that the whole tree fits comfortably
    let shape = EllipsoidShape::from_organ(2000.0, 14.0, 1.1).unwrap();
    let (min, max) = shape.bounding_box();
    let grid = SamplingGrid::covering(min, max, [6, 6, 4]).unwrap();

    let occupancy = ellipsoid_volume_in_grid(&grid, &shape, 50).unwrap();
    let expected = shape.volume();
    assert!((occupancy.total_volume - expected).abs() / expected < 0.02);

    let fast = terminals_in_grid_fast(&grid, &terminals, &tree).unwrap();
    let scan = terminals_in_grid_scan(&grid, &occupancy, &terminals, &tree);
    assert_eq!(fast.terminal_cell, scan.terminal_cell);
    assert_eq!(fast.terminals_in_cell.sum(), 4);

    let sampling = CylinderSampling::default();
    let volumes = branch_volume_in_grid(&grid, &tree, &shape, &occupancy, &sampling).unwrap();
    assert!((volumes.volume_in_cell.sum() - volumes.total_volume).abs() < 1e-9);
    for cell in 0..grid.total_cells() {
        if volumes.volume_in_cell[cell] > 0.0 {
            assert!(occupancy.volume_in_cell[cell] > 0.0);
        }
    }
}

#[test]
fn test_results_serialize() {
    let tree = build_tree();
    let connectivity = Connectivity::build(&tree);
    let orders = evaluate_orders(&connectivity).unwrap();

    let json = serde_json::to_string(&orders).unwrap();
    let restored: angio::TreeOrders = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.strahler, orders.strahler);

    let terminals = find_terminals(&tree, &connectivity);
    let json = serde_json::to_string(&terminals).unwrap();
    let restored: angio::TerminalSet = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.elements, terminals.elements);
}

#[test]
fn test_malformed_topology_aborts_early() {
    // two disjoint inlets
    let tree = VesselTree::new(
        vec![
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [4.0, 0.0, 0.0],
            [4.0, 0.0, 1.0],
        ],
        vec![[0, 1], [2, 3]],
    )
    .unwrap();
    let connectivity = Connectivity::build(&tree);
    assert!(matches!(
        evaluate_orders(&connectivity),
        Err(AngioError::InvalidTopology { .. })
    ));
}
