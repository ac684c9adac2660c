// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Radius assignment - power-law radii from vessel order.

Radii follow `log10(radius)` linear in order: each step down in order scales
the radius by `1 / radius_ratio`, anchored at the inlet element's radius.
*/

use ndarray::Array1;

use angio_structures::{AngioError, AngioResult, ElementId};

use crate::orders::{OrderSystem, TreeOrders};

/// Assign a radius to every element from its order.
///
/// `radius[ne] = 10 ^ (log10(radius_ratio) * (order[ne] - order[inlet])
///                     + log10(inlet_radius))`
///
/// Elements with order 0 (unreachable from the inlet) receive the value the
/// formula yields for order 0; they carry no anatomical meaning.
///
/// # Errors
///
/// Returns [`AngioError::Configuration`] for non-positive `inlet_radius` or
/// `radius_ratio`, and [`AngioError::InvalidGeometry`] for an out-of-range
/// `inlet_element`.
pub fn radius_by_order(
    orders: &TreeOrders,
    system: OrderSystem,
    inlet_element: ElementId,
    inlet_radius: f64,
    radius_ratio: f64,
) -> AngioResult<Array1<f64>> {
    if !(inlet_radius > 0.0) || !inlet_radius.is_finite() {
        return Err(AngioError::Configuration(format!(
            "inlet radius must be positive and finite, got {}",
            inlet_radius
        )));
    }
    if !(radius_ratio > 0.0) || !radius_ratio.is_finite() {
        return Err(AngioError::Configuration(format!(
            "radius ratio must be positive and finite, got {}",
            radius_ratio
        )));
    }
    let order = orders.system(system);
    if inlet_element >= order.len() {
        return Err(AngioError::geometry(format!(
            "inlet element {} does not exist ({} elements)",
            inlet_element,
            order.len()
        )));
    }

    let inlet_order = order[inlet_element] as f64;
    let radius = order.mapv(|o| {
        10f64.powf(radius_ratio.log10() * (o as f64 - inlet_order) + inlet_radius.log10())
    });
    Ok(radius)
}
