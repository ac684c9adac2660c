// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Tree statistics - per-branch aggregates and per-order ratios.

A branch is a maximal run of continuation elements between branch points (or
between the inlet/a terminal and the nearest branch point). Aggregating per
branch decouples the reported anatomy from the discretization granularity of
the element array.
*/

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use angio_structures::{AngioError, AngioResult, Connectivity, ElementId, VesselTree};

use crate::orders::{OrderSystem, TreeOrders};

/// One logical branch: a maximal run of continuation elements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSummary {
    /// First element of the run (the one just after a branch point, or the inlet)
    pub first_element: ElementId,
    /// Number of elements in the run
    pub segment_count: u32,
    /// Sum of Euclidean segment lengths along the run
    pub length: f64,
    /// Mean of the per-element diameters (2 x radius) along the run
    pub mean_diameter: f64,
    /// Generation of the branch
    pub generation: u32,
    /// Horsfield order of the branch
    pub horsfield: u32,
    /// Strahler order of the branch
    pub strahler: u32,
    /// Strahler order of the parent element, `None` at the inlet
    pub parent_strahler: Option<u32>,
}

/// Aggregates for one populated order value within one order system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLevelStats {
    pub order: u32,
    pub branch_count: u32,
    pub mean_length: f64,
    pub mean_diameter: f64,
}

/// Ratios between order `order` and order `order + 1` within one system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRatios {
    pub order: u32,
    /// Branch count ratio `N(order) / N(order + 1)`
    pub branching: f64,
    /// Mean length ratio `L(order) / L(order + 1)`
    pub length: f64,
    /// Mean diameter ratio `D(order) / D(order + 1)`
    pub diameter: f64,
}

/// Per-order tallies and ratios for one order system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSystemStats {
    pub system: OrderSystem,
    /// Populated order values, ascending
    pub levels: Vec<OrderLevelStats>,
    /// Ratios for consecutive populated order pairs
    pub ratios: Vec<OrderRatios>,
}

/// Branch-level aggregates and per-order statistics for all three systems
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeStatistics {
    pub branches: Vec<BranchSummary>,
    pub systems: Vec<OrderSystemStats>,
}

impl TreeStatistics {
    /// The statistics block for one order system.
    pub fn system(&self, system: OrderSystem) -> &OrderSystemStats {
        // systems is always built as [Generation, Horsfield, Strahler]
        &self.systems[match system {
            OrderSystem::Generation => 0,
            OrderSystem::Horsfield => 1,
            OrderSystem::Strahler => 2,
        }]
    }
}

/// Aggregate per-branch length and diameter, and per-order ratios.
///
/// An element opens a new branch when it has no upstream element or when its
/// generation differs from its parent's; the branch then extends downstream
/// through every pure continuation (exactly one downstream element).
///
/// # Errors
///
/// Returns [`AngioError::Configuration`] if `radius` is not sized to the
/// element count.
pub fn tree_statistics(
    tree: &VesselTree,
    connectivity: &Connectivity,
    radius: &Array1<f64>,
    orders: &TreeOrders,
) -> AngioResult<TreeStatistics> {
    let num_elems = tree.element_count();
    if radius.len() != num_elems {
        return Err(AngioError::Configuration(format!(
            "radius array has {} entries for {} elements",
            radius.len(),
            num_elems
        )));
    }

    let lengths = tree.element_lengths();
    // Diameters must be derived from radius before any use.
    let diameters = radius.mapv(|r| 2.0 * r);
    let generation = &orders.generation;

    let mut branches = Vec::new();
    for ne in 0..num_elems {
        if generation[ne] == 0 {
            continue;
        }
        let up = connectivity.upstream(ne);
        let starts_branch = up.is_empty() || generation[up[0]] != generation[ne];
        if !starts_branch {
            continue;
        }

        let mut current = ne;
        let mut length = lengths[ne];
        let mut diameter_sum = diameters[ne];
        let mut segment_count = 1u32;
        while connectivity.downstream(current).len() == 1 {
            let next = connectivity.downstream(current)[0];
            if generation[next] == 0 {
                break;
            }
            current = next;
            length += lengths[current];
            diameter_sum += diameters[current];
            segment_count += 1;
        }

        branches.push(BranchSummary {
            first_element: ne,
            segment_count,
            length,
            mean_diameter: diameter_sum / segment_count as f64,
            generation: generation[ne],
            horsfield: orders.horsfield[ne],
            strahler: orders.strahler[ne],
            parent_strahler: up.first().map(|&parent| orders.strahler[parent]),
        });
    }

    let systems = vec![
        system_stats(OrderSystem::Generation, &branches),
        system_stats(OrderSystem::Horsfield, &branches),
        system_stats(OrderSystem::Strahler, &branches),
    ];
    debug!(branches = branches.len(), "tree statistics aggregated");

    Ok(TreeStatistics { branches, systems })
}

fn branch_order(branch: &BranchSummary, system: OrderSystem) -> u32 {
    match system {
        OrderSystem::Generation => branch.generation,
        OrderSystem::Horsfield => branch.horsfield,
        OrderSystem::Strahler => branch.strahler,
    }
}

fn system_stats(system: OrderSystem, branches: &[BranchSummary]) -> OrderSystemStats {
    let max_order = branches
        .iter()
        .map(|b| branch_order(b, system))
        .max()
        .unwrap_or(0) as usize;

    let mut count = vec![0u32; max_order + 1];
    let mut length_sum = vec![0.0f64; max_order + 1];
    let mut diameter_sum = vec![0.0f64; max_order + 1];
    for branch in branches {
        let order = branch_order(branch, system) as usize;
        count[order] += 1;
        length_sum[order] += branch.length;
        diameter_sum[order] += branch.mean_diameter;
    }

    let levels: Vec<OrderLevelStats> = (1..=max_order)
        .filter(|&o| count[o] > 0)
        .map(|o| OrderLevelStats {
            order: o as u32,
            branch_count: count[o],
            mean_length: length_sum[o] / count[o] as f64,
            mean_diameter: diameter_sum[o] / count[o] as f64,
        })
        .collect();

    let ratios: Vec<OrderRatios> = levels
        .windows(2)
        .filter(|pair| pair[1].order == pair[0].order + 1)
        .map(|pair| OrderRatios {
            order: pair[0].order,
            branching: pair[0].branch_count as f64 / pair[1].branch_count as f64,
            length: pair[0].mean_length / pair[1].mean_length,
            diameter: pair[0].mean_diameter / pair[1].mean_diameter,
        })
        .collect();

    OrderSystemStats {
        system,
        levels,
        ratios,
    }
}
