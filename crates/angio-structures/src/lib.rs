// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The foundation crate for angio. Defines the data structures shared by
//! every analysis stage: the 1D vascular tree and its element connectivity,
//! the rectangular sampling grid, and the ellipsoidal organ envelope.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod ellipsoid;
mod error;
pub mod geometry;
mod grid;
mod tree;

pub use ellipsoid::EllipsoidShape;
pub use error::{AngioError, AngioResult};
pub use geometry::Point3;
pub use grid::SamplingGrid;
pub use tree::{Connectivity, ElementId, NodeId, VesselTree};
