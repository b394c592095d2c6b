//! The B-rep kernel capability set consumed by geometry construction

use super::external::ExchangeFormat;
use nalgebra::{Point3, Vector3};
use std::path::Path;
use thiserror::Error;

/// Failure reported by a kernel operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// The operation ran but did not complete
    #[error("{operation} not done: {reason}")]
    NotDone {
        /// Kernel operation name
        operation: &'static str,
        /// What went wrong
        reason: String,
    },

    /// A handle does not belong to this kernel instance
    #[error("unknown {kind} handle {id}")]
    UnknownHandle {
        /// Handle category
        kind: &'static str,
        /// Handle value
        id: usize,
    },

    /// The kernel does not implement the operation
    #[error("{0} is not supported by this kernel")]
    NotSupported(&'static str),
}

impl KernelError {
    /// Shorthand for [`KernelError::NotDone`]
    pub fn not_done(operation: &'static str, reason: impl Into<String>) -> Self {
        KernelError::NotDone {
            operation,
            reason: reason.into(),
        }
    }
}

/// Operations a boundary-representation kernel provides
///
/// Handles are opaque to this crate. Constructors return
/// [`KernelError`] when the kernel reports that a step did not complete;
/// predicates answer plainly.
pub trait GeometryKernel {
    /// Edge handle
    type Edge: Clone;
    /// Wire handle
    type Wire: Clone;
    /// Face handle
    type Face: Clone;
    /// Solid handle
    type Solid;
    /// Handle of a shape read from an exchange file
    type Shape;

    /// Straight edge between two points
    fn make_edge(&mut self, p1: &Point3<f64>, p2: &Point3<f64>) -> Result<Self::Edge, KernelError>;

    /// Circular arc edge through start, intermediate and end points
    fn make_arc(
        &mut self,
        start: &Point3<f64>,
        intermediate: &Point3<f64>,
        end: &Point3<f64>,
    ) -> Result<Self::Edge, KernelError>;

    /// Closed circular wire from center, plane normal and radius
    fn make_circle(
        &mut self,
        center: &Point3<f64>,
        normal: &Vector3<f64>,
        radius: f64,
    ) -> Result<Self::Wire, KernelError>;

    /// Closed circular wire through three points
    fn make_circle_through(
        &mut self,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
        p3: &Point3<f64>,
    ) -> Result<Self::Wire, KernelError>;

    /// B-spline edge from poles, unique knots with multiplicities and degree
    fn make_bspline(
        &mut self,
        poles: &[Point3<f64>],
        knots: &[f64],
        multiplicities: &[u32],
        degree: u32,
        periodic: bool,
    ) -> Result<Self::Edge, KernelError>;

    /// Join edges, in the given order, into one wire
    fn make_wire(&mut self, edges: &[Self::Edge]) -> Result<Self::Wire, KernelError>;

    /// Whether the wire's end meets its start
    fn wire_is_closed(&self, wire: &Self::Wire) -> bool;

    /// Planar face bounded by a closed wire
    fn make_face(&mut self, wire: &Self::Wire) -> Result<Self::Face, KernelError>;

    /// Boolean cut of `tool` out of `face`
    fn cut(&mut self, face: &Self::Face, tool: &Self::Face) -> Result<Self::Face, KernelError>;

    /// Whether the face lies in a plane
    fn is_planar(&self, face: &Self::Face) -> bool;

    /// Prism of a planar face along a vector
    fn extrude(&mut self, face: &Self::Face, vector: &Vector3<f64>)
    -> Result<Self::Solid, KernelError>;

    /// Read an exchange-format file
    fn read_external(
        &mut self,
        path: &Path,
        format: ExchangeFormat,
    ) -> Result<Self::Shape, KernelError>;
}
