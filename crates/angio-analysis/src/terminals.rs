// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Terminal finder - leaf elements and their outlet nodes.
*/

use serde::{Deserialize, Serialize};
use tracing::info;

use angio_structures::{Connectivity, ElementId, NodeId, VesselTree};

/// Terminal (leaf) elements of a tree and the nodes they drain into
///
/// Compacted and ordered by element traversal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalSet {
    /// Terminal element ids
    pub elements: Vec<ElementId>,
    /// End node of each terminal element, parallel to `elements`
    pub nodes: Vec<NodeId>,
}

impl TerminalSet {
    /// Total number of terminals.
    pub fn count(&self) -> usize {
        self.elements.len()
    }
}

/// Collect the terminal elements of a tree.
///
/// An element is terminal iff it has no downstream element.
pub fn find_terminals(tree: &VesselTree, connectivity: &Connectivity) -> TerminalSet {
    let mut elements = Vec::new();
    let mut nodes = Vec::new();
    for ne in 0..tree.element_count() {
        if connectivity.downstream(ne).is_empty() {
            elements.push(ne);
            nodes.push(tree.element(ne)[1]);
        }
    }
    let set = TerminalSet { elements, nodes };
    info!(total_terminals = set.count(), "terminal elements identified");
    set
}
