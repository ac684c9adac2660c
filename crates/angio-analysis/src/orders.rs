// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Order classification - generation, Horsfield and Strahler orders.

Two passes over an explicit topological traversal of the tree: a root-to-leaf
pass assigns generations, a leaf-to-root pass assigns Horsfield and Strahler
orders. Works for diverging trees only.
*/

use std::collections::VecDeque;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use angio_structures::{AngioResult, Connectivity};

/// Which order system indexes a per-order quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSystem {
    /// Distance from the inlet in bifurcation count, increasing downstream
    Generation,
    /// Bottom-up order increasing by at least one at every merge
    Horsfield,
    /// Bottom-up order increasing only where equal-order subtrees merge
    Strahler,
}

/// Per-element generation, Horsfield and Strahler orders
///
/// Elements not reachable from the inlet keep order 0 in all three systems
/// and are ignored by downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeOrders {
    /// Generation per element (1 at the inlet)
    pub generation: Array1<u32>,
    /// Horsfield order per element (1 at terminals)
    pub horsfield: Array1<u32>,
    /// Strahler order per element (1 at terminals)
    pub strahler: Array1<u32>,
}

impl TreeOrders {
    /// The order column for one system.
    pub fn system(&self, system: OrderSystem) -> &Array1<u32> {
        match system {
            OrderSystem::Generation => &self.generation,
            OrderSystem::Horsfield => &self.horsfield,
            OrderSystem::Strahler => &self.strahler,
        }
    }

    /// Highest order present in one system.
    pub fn max_order(&self, system: OrderSystem) -> u32 {
        self.system(system).iter().copied().max().unwrap_or(0)
    }
}

/// Classify every element by generation, Horsfield and Strahler order.
///
/// The traversal order is built from the connectivity record itself, so the
/// element array may be in any order.
///
/// # Errors
///
/// Returns [`AngioError::InvalidTopology`](angio_structures::AngioError) for
/// trees with more than one inlet or with reconverging elements.
pub fn evaluate_orders(connectivity: &Connectivity) -> AngioResult<TreeOrders> {
    connectivity.validate_diverging()?;
    let num_elems = connectivity.element_count();

    // Root-out traversal; every reachable element appears after its parent.
    let mut traversal = Vec::with_capacity(num_elems);
    let mut queue: VecDeque<usize> = connectivity.root_elements().into();
    while let Some(ne) = queue.pop_front() {
        traversal.push(ne);
        queue.extend(connectivity.downstream(ne).iter().copied());
    }

    let mut generation = Array1::<u32>::zeros(num_elems);
    let mut horsfield = Array1::<u32>::zeros(num_elems);
    let mut strahler = Array1::<u32>::zeros(num_elems);

    // Generation pass: inherit through continuations, increment at branch points.
    for &ne in &traversal {
        let up = connectivity.upstream(ne);
        generation[ne] = if up.is_empty() {
            1
        } else if connectivity.downstream(up[0]).len() == 1 {
            generation[up[0]]
        } else {
            generation[up[0]] + 1
        };
    }

    // Horsfield/Strahler pass, leaves to root. A downstream reference with
    // generation 0 marks a non-existent branch and contributes to neither order.
    for &ne in traversal.iter().rev() {
        let children: Vec<usize> = connectivity
            .downstream(ne)
            .iter()
            .copied()
            .filter(|&child| generation[child] != 0)
            .collect();
        match children.as_slice() {
            [] => {
                horsfield[ne] = 1;
                strahler[ne] = 1;
            }
            [child] => {
                horsfield[ne] = horsfield[*child];
                strahler[ne] = strahler[*child];
            }
            _ => {
                let max_horsfield = children
                    .iter()
                    .map(|&child| horsfield[child])
                    .max()
                    .unwrap_or(0);
                horsfield[ne] = max_horsfield + 1;

                let max_strahler = children
                    .iter()
                    .map(|&child| strahler[child])
                    .max()
                    .unwrap_or(0);
                let at_max = children
                    .iter()
                    .filter(|&&child| strahler[child] == max_strahler)
                    .count();
                strahler[ne] = if at_max >= 2 {
                    max_strahler + 1
                } else {
                    max_strahler
                };
            }
        }
    }

    let orders = TreeOrders {
        generation,
        horsfield,
        strahler,
    };
    debug!(
        elements = num_elems,
        max_generation = orders.max_order(OrderSystem::Generation),
        max_strahler = orders.max_order(OrderSystem::Strahler),
        "orders evaluated"
    );
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use angio_structures::VesselTree;

    fn orders_of(nodes: Vec<[f64; 3]>, elems: Vec<[usize; 2]>) -> TreeOrders {
        let tree = VesselTree::new(nodes, elems).unwrap();
        let cnct = Connectivity::build(&tree);
        evaluate_orders(&cnct).unwrap()
    }

    /// Straight chain of nodes along z
    fn chain_nodes(n: usize) -> Vec<[f64; 3]> {
        (0..n).map(|i| [0.0, 0.0, i as f64]).collect()
    }

    #[test]
    fn test_unbranched_path_is_all_ones() {
        let orders = orders_of(chain_nodes(5), vec![[0, 1], [1, 2], [2, 3], [3, 4]]);
        for ne in 0..4 {
            assert_eq!(orders.generation[ne], 1);
            assert_eq!(orders.horsfield[ne], 1);
            assert_eq!(orders.strahler[ne], 1);
        }
    }

    #[test]
    fn test_y_tree_orders() {
        // R: 0->1, A: 1->2, then A bifurcates into B: 2->3 and C: 2->4
        let orders = orders_of(
            vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, 2.0],
                [-1.0, 0.0, 3.0],
                [1.0, 0.0, 3.0],
            ],
            vec![[0, 1], [1, 2], [2, 3], [2, 4]],
        );
        assert_eq!(orders.generation.to_vec(), vec![1, 1, 2, 2]);
        assert_eq!(orders.horsfield.to_vec(), vec![2, 2, 1, 1]);
        // children tie at strahler 1, so the parent run gets 2
        assert_eq!(orders.strahler.to_vec(), vec![2, 2, 1, 1]);
    }

    #[test]
    fn test_strahler_no_increment_when_one_child_dominates() {
        // inlet 0->1; at node 1: a bare terminal (1->2) and a deeper subtree
        // (1->3, splitting into 3->4 and 3->5)
        let orders = orders_of(
            vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [2.0, 0.0, 2.0],
                [-1.0, 0.0, 2.0],
                [-2.0, 0.0, 3.0],
                [0.0, 0.0, 3.0],
            ],
            vec![[0, 1], [1, 2], [1, 3], [3, 4], [3, 5]],
        );
        // element 2 (the deep limb) carries strahler 2; the bare terminal has 1
        assert_eq!(orders.strahler[2], 2);
        assert_eq!(orders.strahler[1], 1);
        // one child strictly dominates: no increment at the inlet
        assert_eq!(orders.strahler[0], 2);
        // horsfield always increments at the merge
        assert_eq!(orders.horsfield[0], 3);
    }

    #[test]
    fn test_strahler_trifurcation_tie_found_late() {
        // node 1 trifurcates: one bare terminal and two equal deep limbs; the
        // shared maximum is only discovered after the first child.
        let orders = orders_of(
            vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [3.0, 0.0, 2.0],
                [-1.0, 0.0, 2.0],
                [-2.0, 0.0, 3.0],
                [-1.0, 0.0, 3.0],
                [1.0, 0.0, 2.0],
                [0.5, 0.0, 3.0],
                [1.5, 0.0, 3.0],
            ],
            vec![
                [0, 1], // inlet
                [1, 2], // bare terminal, strahler 1
                [1, 3], // deep limb, strahler 2
                [3, 4],
                [3, 5],
                [1, 6], // second deep limb, strahler 2
                [6, 7],
                [6, 8],
            ],
        );
        assert_eq!(orders.strahler[2], 2);
        assert_eq!(orders.strahler[5], 2);
        // two children share the maximum: increment
        assert_eq!(orders.strahler[0], 3);
    }

    #[test]
    fn test_traversal_does_not_assume_sorted_elements() {
        // same Y tree as above but with the element array shuffled
        let orders = orders_of(
            vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, 2.0],
                [-1.0, 0.0, 3.0],
                [1.0, 0.0, 3.0],
            ],
            vec![[2, 4], [0, 1], [2, 3], [1, 2]],
        );
        assert_eq!(orders.generation.to_vec(), vec![2, 1, 2, 1]);
        assert_eq!(orders.horsfield.to_vec(), vec![1, 2, 1, 2]);
        assert_eq!(orders.strahler.to_vec(), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_strahler_bounded_by_horsfield() {
        let orders = orders_of(
            vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 2.0],
                [-1.0, 0.0, 2.0],
                [-2.0, 0.0, 3.0],
                [0.0, 0.0, 3.0],
                [-2.5, 0.0, 4.0],
                [-1.5, 0.0, 4.0],
            ],
            vec![
                [0, 1],
                [1, 2],
                [1, 3],
                [3, 4],
                [3, 5],
                [4, 6],
                [4, 7],
            ],
        );
        for ne in 0..7 {
            assert!(orders.strahler[ne] <= orders.horsfield[ne]);
        }
    }
}
