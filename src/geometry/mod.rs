//! Geometry intent resolution
//!
//! Parts declare their shape as contours of curve elements plus an
//! unbounded surface that orients them. This module reads those
//! declarations into closed variant types ([`ContourPrimitive`],
//! [`UnboundedGeometry`]) and drives a [`GeometryKernel`] to turn them into
//! wires, faces and solids. The crate ships [`RecordingKernel`], which
//! checks and logs requests; a B-rep kernel plugs in by implementing the
//! trait.

mod builder;
mod contour;
mod external;
mod kernel;
mod nurbs;
mod primitive;
mod recording;

pub use builder::{BuildOptions, GeometryBuilder, PartShape};
pub use contour::{ContourResolver, parse_contour, parse_curve};
pub use external::{AssemblyGroup, ExchangeFormat, ExternalGeometry, ExternalGeometryRef};
pub use kernel::{GeometryKernel, KernelError};
pub use nurbs::{expand as expand_knots, multiplicities};
pub use primitive::{ContourPrimitive, GeometryIntent, NurbsCurve, UnboundedGeometry, flatten};
pub use recording::{
    DEFAULT_TOLERANCE, EdgeId, FaceId, RecordingKernel, Request, ShapeId, SolidId, WireId,
};
