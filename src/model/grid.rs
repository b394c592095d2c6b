//! Reference grid entries

use super::core::Guid;
use nalgebra::{Point3, Vector3};
use std::fmt;

/// Principal axis of a reference plane group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Longitudinal
    X,
    /// Transversal
    Y,
    /// Vertical
    Z,
}

impl Axis {
    /// Unit vector along the axis
    pub fn unit(&self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// One plane of the reference grid
///
/// The plane is perpendicular to its axis and passes through
/// `position` on that axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceGridEntry {
    /// GUID of the reference plane
    pub guid: Guid,
    /// Axis the plane is perpendicular to
    pub axis: Axis,
    /// Location along the axis
    pub position: f64,
}

impl ReferenceGridEntry {
    /// Point of the plane on its axis
    pub fn origin(&self) -> Point3<f64> {
        Point3::from(self.axis.unit() * self.position)
    }

    /// Unit plane normal, along the axis
    pub fn normal(&self) -> Vector3<f64> {
        self.axis.unit()
    }
}
