// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# angio-analysis

This crate implements the analysis passes over a vascular tree and its
surrounding organ envelope:

- Order classification (generation, Horsfield, Strahler)
- Terminal finding and terminal-to-grid binning
- Power-law radius assignment
- Branch statistics (per-branch length/diameter, per-order ratios)
- Ellipsoid occupancy of a rectangular sampling grid
- Branch volume rasterization into the sampling grid

All computation is synchronous and consumes read-only snapshots; results are
complete value objects. The per-cell occupancy loop parallelizes via rayon
behind the `parallel` feature (sequential fallback for WASM).
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod binning;
pub mod occupancy;
pub mod orders;
pub mod radius;
pub mod rasterize;
pub mod statistics;
pub mod terminals;

pub use binning::{terminals_in_grid_fast, terminals_in_grid_scan, TerminalDensity};
pub use occupancy::{ellipsoid_volume_in_grid, GridOccupancy};
pub use orders::{evaluate_orders, OrderSystem, TreeOrders};
pub use radius::radius_by_order;
pub use rasterize::{branch_volume_in_grid, BranchVolumes, CylinderSampling};
pub use statistics::{
    tree_statistics, BranchSummary, OrderLevelStats, OrderRatios, OrderSystemStats,
    TreeStatistics,
};
pub use terminals::{find_terminals, TerminalSet};
