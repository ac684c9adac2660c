// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # angio - Vascular Tree and Organ-Volume Analysis
//!
//! angio analyzes tree-structured vascular geometries (for example placental
//! vessel networks) represented as connected 1D line elements in 3D space,
//! and relates that geometry to a surrounding ellipsoidal organ volume
//! discretized into a regular sampling grid.
//!
//! ## Components
//!
//! - **Structures** (always available): [`VesselTree`], [`Connectivity`],
//!   [`SamplingGrid`], [`EllipsoidShape`], shared error types.
//! - **Analysis** (feature `analysis`, default): order classification,
//!   terminal finding, radius assignment, branch statistics, terminal
//!   binning, ellipsoid occupancy and branch volume rasterization.
//!
//! ## Feature Flags
//!
//! - **`analysis`** (default): the algorithm layer
//! - **`parallel`** (default): rayon-parallel per-cell loops (disable for WASM)
//!
//! ## Usage
//!
//! ```rust
//! use angio::prelude::*;
//!
//! // a Y-shaped tree: inlet, then two terminals
//! let tree = VesselTree::new(
//!     vec![
//!         [0.0, 0.0, 0.0],
//!         [0.0, 0.0, 1.0],
//!         [0.0, -1.0, 2.0],
//!         [0.0, 1.0, 2.0],
//!     ],
//!     vec![[0, 1], [1, 2], [1, 3]],
//! )
//! .unwrap();
//! let connectivity = Connectivity::build(&tree);
//!
//! let orders = evaluate_orders(&connectivity).unwrap();
//! assert_eq!(orders.strahler[0], 2);
//!
//! let terminals = find_terminals(&tree, &connectivity);
//! assert_eq!(terminals.count(), 2);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export the foundation layer (single source of truth for core types)
pub use angio_structures::{
    geometry, AngioError, AngioResult, Connectivity, ElementId, EllipsoidShape, NodeId, Point3,
    SamplingGrid, VesselTree,
};

// Re-export the algorithm layer
#[cfg(feature = "analysis")]
pub use angio_analysis::{
    branch_volume_in_grid, ellipsoid_volume_in_grid, evaluate_orders, find_terminals,
    radius_by_order, terminals_in_grid_fast, terminals_in_grid_scan, tree_statistics,
    BranchSummary, BranchVolumes, CylinderSampling, GridOccupancy, OrderLevelStats, OrderRatios,
    OrderSystem, OrderSystemStats, TerminalDensity, TerminalSet, TreeOrders, TreeStatistics,
};

pub mod prelude {
    pub use crate::{
        AngioError, AngioResult, Connectivity, EllipsoidShape, SamplingGrid, VesselTree,
    };

    #[cfg(feature = "analysis")]
    pub use crate::{
        branch_volume_in_grid, ellipsoid_volume_in_grid, evaluate_orders, find_terminals,
        radius_by_order, terminals_in_grid_fast, terminals_in_grid_scan, tree_statistics,
        CylinderSampling, OrderSystem,
    };
}
