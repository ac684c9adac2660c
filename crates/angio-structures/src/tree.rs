// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
VesselTree - 1D branching geometry and its element connectivity.

A tree is a set of nodes embedded in 3D space joined by directed line
elements (start node -> end node, in the direction of flow). Connectivity
derives, per element, the upstream and downstream element lists that every
downstream analysis consumes.
*/

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{AngioError, AngioResult};
use crate::geometry::{self, Point3};

/// Node identifier (index into the tree's node array)
pub type NodeId = usize;

/// Element identifier (index into the tree's element array)
pub type ElementId = usize;

/// Directed 1D branching geometry embedded in 3D space
///
/// Nodes and elements are immutable once constructed; all analysis results
/// are derived, read-only artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselTree {
    /// Node coordinates, indexed by [`NodeId`]
    nodes: Vec<Point3>,
    /// Per element: (start node, end node) in the direction of flow
    elements: Vec<[NodeId; 2]>,
}

impl VesselTree {
    /// Create a tree from node coordinates and directed elements.
    ///
    /// # Errors
    ///
    /// Returns [`AngioError::InvalidGeometry`] if an element references a
    /// node that does not exist.
    pub fn new(nodes: Vec<Point3>, elements: Vec<[NodeId; 2]>) -> AngioResult<Self> {
        for (ne, element) in elements.iter().enumerate() {
            for &node in element {
                if node >= nodes.len() {
                    return Err(AngioError::geometry(format!(
                        "element {} references missing node {}",
                        ne, node
                    )));
                }
            }
        }
        Ok(VesselTree { nodes, elements })
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements in the tree.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Coordinate of a node.
    pub fn node(&self, node: NodeId) -> Point3 {
        self.nodes[node]
    }

    /// All node coordinates.
    pub fn nodes(&self) -> &[Point3] {
        &self.nodes
    }

    /// (start node, end node) of an element.
    pub fn element(&self, element: ElementId) -> [NodeId; 2] {
        self.elements[element]
    }

    /// All elements.
    pub fn elements(&self) -> &[[NodeId; 2]] {
        &self.elements
    }

    /// Coordinates of an element's two endpoints.
    pub fn element_endpoints(&self, element: ElementId) -> (Point3, Point3) {
        let [start, end] = self.elements[element];
        (self.nodes[start], self.nodes[end])
    }

    /// Euclidean length of one element.
    pub fn element_length(&self, element: ElementId) -> f64 {
        let (start, end) = self.element_endpoints(element);
        geometry::distance(start, end)
    }

    /// Euclidean lengths of all elements.
    pub fn element_lengths(&self) -> Array1<f64> {
        Array1::from_iter((0..self.elements.len()).map(|ne| self.element_length(ne)))
    }
}

/// Per-element upstream/downstream adjacency of a [`VesselTree`]
///
/// For a diverging tree every element has 0 or 1 upstream elements and 0
/// (terminal), 1 (continuation) or >=2 (bifurcation) downstream elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connectivity {
    upstream: Vec<Vec<ElementId>>,
    downstream: Vec<Vec<ElementId>>,
}

impl Connectivity {
    /// Derive element connectivity from the tree's node sharing.
    ///
    /// An element's upstream elements are those ending at its start node;
    /// its downstream elements are those starting at its end node.
    pub fn build(tree: &VesselTree) -> Self {
        let mut entering: Vec<Vec<ElementId>> = vec![Vec::new(); tree.node_count()];
        let mut leaving: Vec<Vec<ElementId>> = vec![Vec::new(); tree.node_count()];
        for (ne, &[start, end]) in tree.elements().iter().enumerate() {
            leaving[start].push(ne);
            entering[end].push(ne);
        }

        let mut upstream = Vec::with_capacity(tree.element_count());
        let mut downstream = Vec::with_capacity(tree.element_count());
        for &[start, end] in tree.elements() {
            upstream.push(entering[start].clone());
            downstream.push(leaving[end].clone());
        }

        Connectivity {
            upstream,
            downstream,
        }
    }

    /// Number of elements covered by this record.
    pub fn element_count(&self) -> usize {
        self.upstream.len()
    }

    /// Elements immediately upstream of `element` (0 or 1 for a tree).
    pub fn upstream(&self, element: ElementId) -> &[ElementId] {
        &self.upstream[element]
    }

    /// Elements immediately downstream of `element`.
    pub fn downstream(&self, element: ElementId) -> &[ElementId] {
        &self.downstream[element]
    }

    /// Elements with no upstream element (tree inlets).
    pub fn root_elements(&self) -> Vec<ElementId> {
        (0..self.element_count())
            .filter(|&ne| self.upstream[ne].is_empty())
            .collect()
    }

    /// Check that the record describes a single-inlet diverging tree.
    ///
    /// # Errors
    ///
    /// Returns [`AngioError::InvalidTopology`] if more than one element has
    /// no upstream element, or if any element has more than one upstream
    /// element (reconverging input).
    pub fn validate_diverging(&self) -> AngioResult<()> {
        let roots = self.root_elements();
        if roots.len() > 1 {
            return Err(AngioError::InvalidTopology {
                element: roots[1],
                reason: format!("{} inlet elements, expected exactly one", roots.len()),
            });
        }
        for ne in 0..self.element_count() {
            if self.upstream[ne].len() > 1 {
                return Err(AngioError::InvalidTopology {
                    element: ne,
                    reason: format!(
                        "{} upstream elements, tree must be diverging",
                        self.upstream[ne].len()
                    ),
                });
            }
        }
        Ok(())
    }
}
