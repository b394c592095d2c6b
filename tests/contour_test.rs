//! Contour parsing and wire construction

mod common;

use common::*;
use libocx::geometry::{Request, WireId, parse_contour};
use libocx::{
    ContourPrimitive, ContourResolver, DiagnosticKind, Diagnostics, GeometryError,
    GeometryKernel, Guid, RecordingKernel,
};

fn nurbs(form: &str, declared_points: usize) -> String {
    let poles = [(0.0, 0.0, 0.0), (1.0, 1.0, 0.0), (2.0, 1.0, 0.0), (3.0, 0.0, 0.0)];
    nurbs_curve(&poles, &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0], 3, form).replace(
        r#"numCtrlPts="4""#,
        &format!(r#"numCtrlPts="{}""#, declared_points),
    )
}

/// Resolve the outer contour of plate P1
fn resolve(content: &str) -> (Result<WireId, GeometryError>, RecordingKernel, Diagnostics) {
    let (index, _) = index(&part("Plate", "P1", "Plate", content));
    let plate = index.get_object(&Guid::new("P1")).unwrap();
    let contour = plate.child(&index.tags().outercontour).unwrap();

    let mut kernel = RecordingKernel::new();
    let mut diagnostics = Diagnostics::new();
    let wire = ContourResolver::new(index.tags()).resolve(&mut kernel, contour, &mut diagnostics);
    (wire, kernel, diagnostics)
}

#[test]
fn test_rectangle_becomes_closed_wire() {
    let (wire, kernel, diagnostics) = resolve(&outer_contour(&rectangle(2.0, 1.0)));
    let wire = wire.unwrap();
    assert!(kernel.wire_is_closed(&wire));
    assert_eq!(kernel.wire_edge_count(wire), Some(4));
    assert!(diagnostics.is_empty());
}

#[test]
fn test_nested_composites_keep_order() {
    let corners = [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)];
    let curves = format!(
        "{}<ocx:CompositeCurve3D>{}<ocx:CompositeCurve3D>{}</ocx:CompositeCurve3D></ocx:CompositeCurve3D>{}",
        line(corners[0], corners[1]),
        line(corners[1], corners[2]),
        line(corners[2], corners[3]),
        line(corners[3], corners[0]),
    );
    let (wire, kernel, _) = resolve(&outer_contour(&curves));
    assert!(kernel.wire_is_closed(&wire.unwrap()));

    let edges: Vec<[f64; 3]> = kernel
        .requests()
        .iter()
        .filter_map(|r| match r {
            Request::Edge { start, .. } => Some(*start),
            _ => None,
        })
        .collect();
    assert_eq!(
        edges,
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]
    );
}

#[test]
fn test_gap_is_an_open_contour() {
    let curves = format!(
        "{}{}{}",
        line((0.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        line((1.0, 0.0, 0.0), (1.0, 1.0, 0.0)),
        line((1.0, 1.0, 0.0), (0.0, 1.0, 0.0)),
    );
    let (wire, _, _) = resolve(&outer_contour(&curves));
    assert!(matches!(wire, Err(GeometryError::OpenContour(_))));
}

#[test]
fn test_lone_circle_is_closed() {
    let (wire, kernel, _) = resolve(&format!(
        "<ocx:OuterContour>{}</ocx:OuterContour>",
        circle((0.0, 0.0, 0.0), 2.0)
    ));
    assert!(kernel.wire_is_closed(&wire.unwrap()));
    assert!(matches!(
        kernel.requests(),
        [Request::Circle { radius, .. }] if *radius == 1.0
    ));
}

#[test]
fn test_arc_edge_in_composite_chain() {
    let curves = format!(
        "{}{}{}{}",
        line((0.0, 0.0, 0.0), (2.0, 0.0, 0.0)),
        arc((2.0, 0.0, 0.0), (3.0, 1.0, 0.0), (2.0, 2.0, 0.0)),
        line((2.0, 2.0, 0.0), (0.0, 2.0, 0.0)),
        line((0.0, 2.0, 0.0), (0.0, 0.0, 0.0)),
    );
    let (wire, kernel, diagnostics) = resolve(&outer_contour(&curves));
    let wire = wire.unwrap();
    assert!(kernel.wire_is_closed(&wire));
    assert_eq!(kernel.wire_edge_count(wire), Some(4));
    assert!(diagnostics.is_empty());
    assert!(matches!(
        kernel.requests(),
        [
            Request::Edge { .. },
            Request::Arc { intermediate, .. },
            Request::Edge { .. },
            Request::Edge { .. },
            Request::Wire { .. },
        ] if *intermediate == [3.0, 1.0, 0.0]
    ));
}

#[test]
fn test_lone_circle_through_points_is_closed() {
    let (wire, mut kernel, diagnostics) = resolve(&format!(
        "<ocx:OuterContour>{}</ocx:OuterContour>",
        circle_through((1.0, 0.0, 0.0), (0.0, 1.0, 0.0), (-1.0, 0.0, 0.0))
    ));
    let wire = wire.unwrap();
    assert!(kernel.wire_is_closed(&wire));
    assert!(diagnostics.is_empty());
    assert!(matches!(
        kernel.requests(),
        [Request::CircleThrough { points }] if points[1] == [0.0, 1.0, 0.0]
    ));

    let face = kernel.make_face(&wire).unwrap();
    assert!(kernel.is_planar(&face));
    assert_eq!(kernel.face_points(face).map(<[_]>::len), Some(3));
}

#[test]
fn test_periodic_nurbs_is_a_lone_closed_contour() {
    let poles = [
        (0.0, 0.0, 0.0),
        (2.0, 0.0, 0.0),
        (2.0, 2.0, 0.0),
        (0.0, 2.0, 0.0),
        (0.0, 0.0, 0.0),
    ];
    let knots = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
    let (wire, kernel, diagnostics) = resolve(&format!(
        "<ocx:OuterContour>{}</ocx:OuterContour>",
        nurbs_curve(&poles, &knots, 3, "Periodic")
    ));
    let wire = wire.unwrap();
    assert!(kernel.wire_is_closed(&wire));
    assert_eq!(kernel.wire_edge_count(wire), Some(1));
    assert!(diagnostics.is_empty());
    assert!(matches!(
        kernel.requests(),
        [
            Request::Bspline {
                poles: 5,
                degree: 3,
                periodic: true,
                ..
            },
            Request::Wire { .. },
        ]
    ));
}

#[test]
fn test_unknown_child_is_skipped_with_warning() {
    let curves = format!(
        "<ocx:Ellipse3D/>{}",
        rectangle(1.0, 1.0)
    );
    let (wire, _, diagnostics) = resolve(&format!(
        "<ocx:OuterContour>{}</ocx:OuterContour>",
        curves
    ));
    assert!(wire.is_ok());
    assert_eq!(diagnostics.count(DiagnosticKind::UnknownContourChild), 1);
}

#[test]
fn test_empty_contour_is_open() {
    let (wire, _, _) = resolve("<ocx:OuterContour/>");
    assert!(matches!(wire, Err(GeometryError::OpenContour(_))));
}

#[test]
fn test_nurbs_is_read_with_multiplicities() {
    let (index, _) = index(&part(
        "Plate",
        "P1",
        "Curved",
        &format!("<ocx:OuterContour>{}</ocx:OuterContour>", nurbs("Open", 4)),
    ));
    let contour = index
        .get_object(&Guid::new("P1"))
        .unwrap()
        .child(&index.tags().outercontour)
        .unwrap();
    let mut diagnostics = Diagnostics::new();
    let primitives = parse_contour(contour, index.tags(), &mut diagnostics);
    assert!(diagnostics.is_empty());

    let [ContourPrimitive::NurbsCurve(curve)] = primitives.as_slice() else {
        panic!("expected one NURBS curve, got {:?}", primitives);
    };
    assert_eq!(curve.degree, 3);
    assert!(!curve.periodic);
    assert_eq!(curve.control_points.len(), 4);
    assert_eq!(curve.knot_multiplicities(), (vec![0.0, 1.0], vec![4, 4]));

    let mut kernel = RecordingKernel::new();
    let edge = kernel.make_bspline(
        &curve.control_points,
        &[0.0, 1.0],
        &[4, 4],
        curve.degree,
        curve.periodic,
    );
    assert!(edge.is_ok());
}

#[test]
fn test_nurbs_count_mismatch_is_reported() {
    let (index, _) = index(&part(
        "Plate",
        "P1",
        "Curved",
        &format!("<ocx:OuterContour>{}</ocx:OuterContour>", nurbs("Closed", 5)),
    ));
    let contour = index
        .get_object(&Guid::new("P1"))
        .unwrap()
        .child(&index.tags().outercontour)
        .unwrap();
    let mut diagnostics = Diagnostics::new();
    let primitives = parse_contour(contour, index.tags(), &mut diagnostics);
    assert_eq!(primitives.len(), 1);
    assert!(primitives[0].is_closed_curve());
    assert_eq!(
        diagnostics.count(DiagnosticKind::GeometryConstructionFailure),
        1
    );
}
