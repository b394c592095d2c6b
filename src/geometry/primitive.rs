//! Closed variant types for contour curves and part geometry declarations

use super::nurbs;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::model::Guid;
use crate::parser::{Element, point3d, vector3d};
use crate::schema::{CurveKind, SurfaceKind, Tags};
use nalgebra::{Point3, Vector3};

/// NURBS curve data as declared in the model
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsCurve {
    /// Control points in declaration order
    pub control_points: Vec<Point3<f64>>,
    /// Full knot sequence, repeated values included
    pub knots: Vec<f64>,
    /// Polynomial degree
    pub degree: u32,
    /// True unless the declared form is `Open`
    pub periodic: bool,
}

impl NurbsCurve {
    /// Unique knots and multiplicities for the kernel constructor
    pub fn knot_multiplicities(&self) -> (Vec<f64>, Vec<u32>) {
        nurbs::multiplicities(&self.knots)
    }
}

/// One curve of a contour
#[derive(Debug, Clone, PartialEq)]
pub enum ContourPrimitive {
    /// Straight segment
    Line {
        /// Start point
        p1: Point3<f64>,
        /// End point
        p2: Point3<f64>,
    },
    /// Circular arc through three points
    Arc {
        /// Start point
        start: Point3<f64>,
        /// End point
        end: Point3<f64>,
        /// Point on the arc between start and end
        intermediate: Point3<f64>,
    },
    /// Full circle
    Circle {
        /// Center
        center: Point3<f64>,
        /// Normal of the circle plane
        normal: Vector3<f64>,
        /// Radius, half the declared diameter
        radius: f64,
    },
    /// Full circle through three points
    CircleBy3Points {
        /// First point
        p1: Point3<f64>,
        /// Second point
        p2: Point3<f64>,
        /// Third point
        p3: Point3<f64>,
    },
    /// NURBS curve
    NurbsCurve(NurbsCurve),
    /// Nested curves, in order
    CompositeCurve(Vec<ContourPrimitive>),
}

impl ContourPrimitive {
    /// Kind of the primitive
    pub fn kind(&self) -> CurveKind {
        match self {
            ContourPrimitive::Line { .. } => CurveKind::Line,
            ContourPrimitive::Arc { .. } => CurveKind::Arc,
            ContourPrimitive::Circle { .. } => CurveKind::Circle,
            ContourPrimitive::CircleBy3Points { .. } => CurveKind::CircleBy3Points,
            ContourPrimitive::NurbsCurve(_) => CurveKind::Nurbs,
            ContourPrimitive::CompositeCurve(_) => CurveKind::Composite,
        }
    }

    /// True for curves that form a closed wire on their own
    pub fn is_closed_curve(&self) -> bool {
        match self {
            ContourPrimitive::Circle { .. } | ContourPrimitive::CircleBy3Points { .. } => true,
            ContourPrimitive::NurbsCurve(curve) => curve.periodic,
            _ => false,
        }
    }

    /// Append the primitive to `out`, composites replaced by their
    /// flattened children in order
    pub fn flatten_into<'a>(&'a self, out: &mut Vec<&'a ContourPrimitive>) {
        match self {
            ContourPrimitive::CompositeCurve(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }
}

/// Flatten a contour into its edge-level primitives
pub fn flatten(primitives: &[ContourPrimitive]) -> Vec<&ContourPrimitive> {
    let mut out = Vec::with_capacity(primitives.len());
    for primitive in primitives {
        primitive.flatten_into(&mut out);
    }
    out
}

/// Surface that orients a part
#[derive(Debug, Clone, PartialEq)]
pub enum UnboundedGeometry {
    /// Analytic plane
    Plane {
        /// Point on the plane
        origin: Point3<f64>,
        /// Plane normal as declared
        normal: Vector3<f64>,
    },
    /// Reference-grid plane, by GUID
    GridReference(Guid),
}

impl UnboundedGeometry {
    /// Read the unbounded geometry declared directly on `owner`
    ///
    /// `None` when the owner declares none. A declaration naming an
    /// unsupported or malformed surface is reported and also yields `None`.
    pub fn of(owner: Element<'_>, tags: &Tags, diagnostics: &mut Diagnostics) -> Option<Self> {
        let declaration = owner.child(&tags.unboundedgeometry)?;
        let Some(surface) = declaration.children().next() else {
            diagnostics.warn(
                DiagnosticKind::MissingOptionalElement,
                &owner,
                "unbounded geometry declares no surface",
            );
            return None;
        };

        let read = match tags.surface_kind(surface.name()) {
            Some(SurfaceKind::Plane) => read_plane(surface, tags),
            Some(SurfaceKind::GridRef) => surface
                .attribute(&tags.guidref)
                .map(|g| UnboundedGeometry::GridReference(Guid::new(g)))
                .ok_or_else(|| "grid reference has no GUID".to_string()),
            None => Err(format!("unsupported surface {}", surface.local_name())),
        };
        match read {
            Ok(geometry) => Some(geometry),
            Err(reason) => {
                diagnostics.warn(DiagnosticKind::GeometryConstructionFailure, &owner, reason);
                None
            }
        }
    }
}

fn read_plane(plane: Element<'_>, tags: &Tags) -> Result<UnboundedGeometry, String> {
    let origin = plane
        .child(&tags.origin)
        .ok_or_else(|| "plane has no origin".to_string())?;
    let normal = plane
        .child(&tags.normal)
        .ok_or_else(|| "plane has no normal".to_string())?;
    Ok(UnboundedGeometry::Plane {
        origin: point3d(origin, tags).map_err(|e| e.to_string())?,
        normal: vector3d(normal).map_err(|e| e.to_string())?,
    })
}

/// Geometry declarations of one part
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryIntent {
    /// Outer boundary, `None` when the part declares no outer contour
    pub outer_contour: Option<Vec<ContourPrimitive>>,
    /// Holes in document order, each one closed contour
    pub inner_contours: Vec<Vec<ContourPrimitive>>,
    /// Orientation declared on the part itself
    pub unbounded_geometry: Option<UnboundedGeometry>,
}

impl GeometryIntent {
    /// Read the outer contour, inner contours and unbounded geometry of a part
    pub fn read(part: Element<'_>, tags: &Tags, diagnostics: &mut Diagnostics) -> Self {
        let outer_contour = part
            .child(&tags.outercontour)
            .map(|outer| super::contour::parse_contour(outer, tags, diagnostics));
        let inner_contours = match part.child(&tags.innercontours) {
            Some(inner) => inner
                .children()
                .filter_map(|hole| super::contour::parse_curve(hole, tags, diagnostics))
                .map(|hole| vec![hole])
                .collect(),
            None => Vec::new(),
        };
        Self {
            outer_contour,
            inner_contours,
            unbounded_geometry: UnboundedGeometry::of(part, tags, diagnostics),
        }
    }
}
