//! Contour resolution: curve elements to primitives, primitives to wires

use super::kernel::{GeometryKernel, KernelError};
use super::primitive::{ContourPrimitive, NurbsCurve, flatten};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::error::{Error, GeometryError, Result};
use crate::parser::{Element, get_local_name, numeric_value, parse_f64_list, point3d, vector3d};
use crate::schema::{CurveKind, Tags};
use nalgebra::Point3;

/// Parse the ordered curve children of a contour element
///
/// Children whose tag is not a known curve, and curves that cannot be
/// read, are reported and skipped; the rest keep their document order.
pub fn parse_contour(
    contour: Element<'_>,
    tags: &Tags,
    diagnostics: &mut Diagnostics,
) -> Vec<ContourPrimitive> {
    contour
        .children()
        .filter_map(|child| parse_curve(child, tags, diagnostics))
        .collect()
}

/// Parse one curve element
pub fn parse_curve(
    curve: Element<'_>,
    tags: &Tags,
    diagnostics: &mut Diagnostics,
) -> Option<ContourPrimitive> {
    let Some(kind) = tags.curve_kind(curve.name()) else {
        diagnostics.warn(
            DiagnosticKind::UnknownContourChild,
            &curve,
            format!("unknown contour child {}, skipped", curve.local_name()),
        );
        return None;
    };

    let parsed = match kind {
        CurveKind::Line => read_line(curve, tags),
        CurveKind::Arc => read_three_points(curve, tags).map(|(start, intermediate, end)| {
            ContourPrimitive::Arc {
                start,
                end,
                intermediate,
            }
        }),
        CurveKind::Circle => read_circle(curve, tags),
        CurveKind::CircleBy3Points => {
            read_three_points(curve, tags).map(|(p1, p2, p3)| ContourPrimitive::CircleBy3Points {
                p1,
                p2,
                p3,
            })
        }
        CurveKind::Nurbs => read_nurbs(curve, tags, diagnostics),
        CurveKind::Composite => Ok(ContourPrimitive::CompositeCurve(parse_contour(
            curve,
            tags,
            diagnostics,
        ))),
    };

    match parsed {
        Ok(primitive) => Some(primitive),
        Err(e) => {
            diagnostics.warn(
                DiagnosticKind::GeometryConstructionFailure,
                &curve,
                format!("malformed curve skipped: {}", e),
            );
            None
        }
    }
}

fn point(curve: Element<'_>, tag: &str, tags: &Tags) -> Result<Point3<f64>> {
    let element = curve.child(tag).ok_or_else(|| {
        Error::InvalidModel(format!("{} has no {}", curve.describe(), get_local_name(tag)))
    })?;
    point3d(element, tags)
}

fn read_line(curve: Element<'_>, tags: &Tags) -> Result<ContourPrimitive> {
    Ok(ContourPrimitive::Line {
        p1: point(curve, &tags.startpoint, tags)?,
        p2: point(curve, &tags.endpoint, tags)?,
    })
}

fn read_three_points(
    curve: Element<'_>,
    tags: &Tags,
) -> Result<(Point3<f64>, Point3<f64>, Point3<f64>)> {
    Ok((
        point(curve, &tags.startpoint, tags)?,
        point(curve, &tags.intermediatepoint, tags)?,
        point(curve, &tags.endpoint, tags)?,
    ))
}

fn read_circle(curve: Element<'_>, tags: &Tags) -> Result<ContourPrimitive> {
    let diameter = curve
        .child(&tags.diameter)
        .ok_or_else(|| Error::InvalidModel(format!("{} has no diameter", curve.describe())))?;
    let normal = curve
        .child(&tags.normal)
        .ok_or_else(|| Error::InvalidModel(format!("{} has no normal", curve.describe())))?;
    Ok(ContourPrimitive::Circle {
        center: point(curve, &tags.center, tags)?,
        normal: vector3d(normal)?,
        radius: numeric_value(diameter)? / 2.0,
    })
}

fn read_nurbs(
    curve: Element<'_>,
    tags: &Tags,
    diagnostics: &mut Diagnostics,
) -> Result<ContourPrimitive> {
    let properties = curve.child(&tags.nurbsproperties).ok_or_else(|| {
        Error::InvalidModel(format!("{} has no NURBS properties", curve.describe()))
    })?;
    let degree: u32 = properties
        .attribute("degree")
        .ok_or_else(|| Error::missing_attribute(properties.name(), "degree"))?
        .trim()
        .parse()?;
    let periodic = properties.attribute("form") != Some("Open");

    let knot_values = curve
        .child(&tags.knotvector)
        .and_then(|k| k.attribute("value"))
        .ok_or_else(|| Error::InvalidModel(format!("{} has no knot vector", curve.describe())))?;
    let knots = parse_f64_list("knot vector", knot_values)?;

    let control_points = curve
        .find_descendants(&tags.point3d)
        .map(|p| point3d(p, tags))
        .collect::<Result<Vec<_>>>()?;

    let declared = |name: &str| {
        properties
            .attribute(name)
            .and_then(|v| v.trim().parse::<usize>().ok())
    };
    if let Some(n) = declared("numCtrlPts").filter(|&n| n != control_points.len()) {
        diagnostics.warn(
            DiagnosticKind::GeometryConstructionFailure,
            &curve,
            format!(
                "declares {} control points but has {}",
                n,
                control_points.len()
            ),
        );
    }
    if let Some(n) = declared("numKnots").filter(|&n| n != knots.len()) {
        diagnostics.warn(
            DiagnosticKind::GeometryConstructionFailure,
            &curve,
            format!("declares {} knots but has {}", n, knots.len()),
        );
    }

    Ok(ContourPrimitive::NurbsCurve(NurbsCurve {
        control_points,
        knots,
        degree,
        periodic,
    }))
}

/// Turns contours into kernel wires
///
/// A contour whose only curve is closed on its own (a circle, a circle
/// through three points, a periodic NURBS) becomes that curve's wire.
/// Every other contour is flattened into edges, joined in order, and must
/// come out closed.
pub struct ContourResolver<'t> {
    tags: &'t Tags,
}

impl<'t> ContourResolver<'t> {
    /// Resolver using the given tag table
    pub fn new(tags: &'t Tags) -> Self {
        Self { tags }
    }

    /// Parse a contour element and build its wire
    pub fn resolve<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        contour: Element<'_>,
        diagnostics: &mut Diagnostics,
    ) -> std::result::Result<K::Wire, GeometryError> {
        let owner = match contour.parent() {
            Some(part) => part.describe(),
            None => contour.describe(),
        };
        let primitives = parse_contour(contour, self.tags, diagnostics);
        Self::build_wire(kernel, &primitives, &owner, diagnostics)
    }

    /// Build a closed wire from parsed primitives
    ///
    /// `owner` names the part in errors and diagnostics.
    pub fn build_wire<K: GeometryKernel>(
        kernel: &mut K,
        primitives: &[ContourPrimitive],
        owner: &str,
        diagnostics: &mut Diagnostics,
    ) -> std::result::Result<K::Wire, GeometryError> {
        let failure = |source: KernelError| GeometryError::ConstructionFailure {
            part: owner.to_string(),
            source,
        };
        let flat = flatten(primitives);

        if let [single] = flat.as_slice() {
            if let Some(wire) = closed_wire(kernel, single) {
                return wire.map_err(failure);
            }
        }

        let mut edges = Vec::with_capacity(flat.len());
        for primitive in flat {
            let edge = match primitive {
                ContourPrimitive::Line { p1, p2 } => kernel.make_edge(p1, p2),
                ContourPrimitive::Arc {
                    start,
                    end,
                    intermediate,
                } => kernel.make_arc(start, intermediate, end),
                ContourPrimitive::NurbsCurve(curve) => make_bspline(kernel, curve),
                ContourPrimitive::Circle { .. } | ContourPrimitive::CircleBy3Points { .. } => {
                    diagnostics.push(
                        DiagnosticKind::GeometryConstructionFailure,
                        Severity::Warning,
                        Some(owner.to_string()),
                        "closed circle inside an edge chain, skipped",
                    );
                    continue;
                }
                ContourPrimitive::CompositeCurve(_) => continue,
            };
            match edge {
                Ok(edge) => edges.push(edge),
                Err(e) => diagnostics.push(
                    DiagnosticKind::GeometryConstructionFailure,
                    Severity::Warning,
                    Some(owner.to_string()),
                    format!("edge skipped: {}", e),
                ),
            }
        }

        if edges.is_empty() {
            return Err(GeometryError::OpenContour(owner.to_string()));
        }
        let wire = kernel.make_wire(&edges).map_err(failure)?;
        if !kernel.wire_is_closed(&wire) {
            return Err(GeometryError::OpenContour(owner.to_string()));
        }
        Ok(wire)
    }
}

fn closed_wire<K: GeometryKernel>(
    kernel: &mut K,
    primitive: &ContourPrimitive,
) -> Option<std::result::Result<K::Wire, KernelError>> {
    let wire = match primitive {
        ContourPrimitive::Circle {
            center,
            normal,
            radius,
        } => kernel.make_circle(center, normal, *radius),
        ContourPrimitive::CircleBy3Points { p1, p2, p3 } => kernel.make_circle_through(p1, p2, p3),
        ContourPrimitive::NurbsCurve(curve) if curve.periodic => {
            make_bspline(kernel, curve).and_then(|edge| kernel.make_wire(&[edge]))
        }
        _ => return None,
    };
    Some(wire)
}

fn make_bspline<K: GeometryKernel>(
    kernel: &mut K,
    curve: &NurbsCurve,
) -> std::result::Result<K::Edge, KernelError> {
    let (knots, multiplicities) = curve.knot_multiplicities();
    kernel.make_bspline(
        &curve.control_points,
        &knots,
        &multiplicities,
        curve.degree,
        curve.periodic,
    )
}
