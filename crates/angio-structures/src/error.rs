// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Error types for angio operations.
*/

/// Result type for angio operations
pub type AngioResult<T> = Result<T, AngioError>;

/// Errors that can occur during vascular analysis
///
/// Structural violations are fatal for the whole analysis run: order and
/// volume values computed on inconsistent topology are meaningless, so no
/// partial recovery is attempted. Every fatal error names the offending
/// element or cell.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AngioError {
    /// Malformed tree connectivity: multiple inlets or reconverging elements
    #[error("Invalid topology at element {element}: {reason}")]
    InvalidTopology { element: usize, reason: String },

    /// Geometry inconsistency: dangling node references, coordinates outside
    /// the sampling grid, or vessel material outside the modeled organ
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// Non-positive shape parameters, degenerate grid cells, or mismatched
    /// input array sizes
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl AngioError {
    /// Shorthand for an [`AngioError::InvalidGeometry`] with a formatted reason.
    pub fn geometry(reason: impl Into<String>) -> Self {
        AngioError::InvalidGeometry {
            reason: reason.into(),
        }
    }
}
