// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
EllipsoidShape - the organ envelope.

An axis-aligned ellipsoid centered on the origin, either given directly by
its three semi-axis radii or derived from organ volume, thickness and
ellipticity.
*/

use serde::{Deserialize, Serialize};

use crate::error::{AngioError, AngioResult};
use crate::geometry::Point3;

/// Tolerance used to decide whether a point sits on the ellipsoid surface
const SURFACE_TOLERANCE: f64 = 1e-6;

/// Axis-aligned ellipsoid centered at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipsoidShape {
    /// Semi-axis radius along x
    pub x_radius: f64,
    /// Semi-axis radius along y
    pub y_radius: f64,
    /// Semi-axis radius along z
    pub z_radius: f64,
}

impl EllipsoidShape {
    /// Create an ellipsoid from its three semi-axis radii.
    ///
    /// # Errors
    ///
    /// Returns [`AngioError::Configuration`] unless all radii are positive
    /// and finite.
    pub fn from_radii(x_radius: f64, y_radius: f64, z_radius: f64) -> AngioResult<Self> {
        for (radius, axis) in [(x_radius, "x"), (y_radius, "y"), (z_radius, "z")] {
            if !(radius > 0.0) || !radius.is_finite() {
                return Err(AngioError::Configuration(format!(
                    "{}_radius must be positive and finite, got {}",
                    axis, radius
                )));
            }
        }
        Ok(EllipsoidShape {
            x_radius,
            y_radius,
            z_radius,
        })
    }

    /// Derive the ellipsoid from organ volume, thickness and ellipticity.
    ///
    /// Thickness spans the z axis (`z_radius = thickness / 2`), ellipticity
    /// is the y/x radius ratio, and the x radius follows from the volume:
    /// `volume = 4/3 * pi * x_radius * y_radius * z_radius`.
    ///
    /// # Errors
    ///
    /// Returns [`AngioError::Configuration`] if volume, thickness or
    /// ellipticity is non-positive.
    pub fn from_organ(volume: f64, thickness: f64, ellipticity: f64) -> AngioResult<Self> {
        for (value, name) in [
            (volume, "volume"),
            (thickness, "thickness"),
            (ellipticity, "ellipticity"),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(AngioError::Configuration(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        let z_radius = thickness / 2.0;
        let x_radius = (volume * 3.0 / (4.0 * std::f64::consts::PI * ellipticity * z_radius)).sqrt();
        let y_radius = ellipticity * x_radius;
        EllipsoidShape::from_radii(x_radius, y_radius, z_radius)
    }

    /// Normalized ellipsoid coordinate: < 1 inside, 1 on the surface.
    fn surface_coordinate(&self, point: Point3) -> f64 {
        let [x, y, z] = point;
        (x / self.x_radius).powi(2) + (y / self.y_radius).powi(2) + (z / self.z_radius).powi(2)
    }

    /// Whether a point lies strictly inside the ellipsoid.
    pub fn contains(&self, point: Point3) -> bool {
        self.surface_coordinate(point) < 1.0
    }

    /// Whether a point lies on the ellipsoid surface (within tolerance).
    pub fn on_surface(&self, point: Point3) -> bool {
        (self.surface_coordinate(point) - 1.0).abs() <= SURFACE_TOLERANCE
    }

    /// Whether a point lies inside or on the ellipsoid.
    pub fn contains_or_on(&self, point: Point3) -> bool {
        self.contains(point) || self.on_surface(point)
    }

    /// Closed-form ellipsoid volume `4/3 * pi * rx * ry * rz`.
    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * std::f64::consts::PI * self.x_radius * self.y_radius * self.z_radius
    }

    /// Axis-aligned bounding box (min corner, max corner).
    pub fn bounding_box(&self) -> (Point3, Point3) {
        (
            [-self.x_radius, -self.y_radius, -self.z_radius],
            [self.x_radius, self.y_radius, self.z_radius],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_organ_recovers_volume() {
        let shape = EllipsoidShape::from_organ(427.0, 24.8, 1.26).unwrap();
        assert!((shape.volume() - 427.0).abs() < 1e-9);
        assert!((shape.z_radius - 12.4).abs() < 1e-12);
        assert!((shape.y_radius / shape.x_radius - 1.26).abs() < 1e-12);
    }

    #[test]
    fn test_from_organ_rejects_nonpositive() {
        assert!(EllipsoidShape::from_organ(0.0, 1.0, 1.0).is_err());
        assert!(EllipsoidShape::from_organ(1.0, -2.0, 1.0).is_err());
        assert!(EllipsoidShape::from_organ(1.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_containment_predicates() {
        let shape = EllipsoidShape::from_radii(2.0, 1.0, 1.0).unwrap();
        assert!(shape.contains([0.0, 0.0, 0.0]));
        assert!(!shape.contains([2.0, 0.0, 0.0]));
        assert!(shape.on_surface([2.0, 0.0, 0.0]));
        assert!(shape.on_surface([0.0, 0.0, -1.0]));
        assert!(!shape.contains_or_on([2.0, 0.1, 0.0]));
    }
}
