//! Shared fixtures for integration tests
//!
//! A compact OCX schema declaring every element the crate reads, and
//! builders for model documents written against it.

#![allow(dead_code)]

use libocx::{Diagnostics, Document, ModelIndex, SchemaDictionary};
use std::sync::Arc;

/// Target namespace of the fixture schema
pub const NS: &str = "https://3docx.org/fileadmin/ocx_schema//V286/OCX_Schema.xsd";

/// Version fixed by the fixture schema
pub const VERSION: &str = "2.8.6";

const ELEMENTS: &[&str] = &[
    "Panel",
    "Plate",
    "Bracket",
    "Stiffener",
    "Pillar",
    "Seam",
    "Material",
    "BarSection",
    "Vessel",
    "Header",
    "Description",
    "FrameTables",
    "XRefPlanes",
    "YRefPlanes",
    "ZRefPlanes",
    "RefPlane",
    "ReferenceLocation",
    "OuterContour",
    "InnerContours",
    "CompositeCurve3D",
    "Line3D",
    "Circle3D",
    "CircumCircle3D",
    "CircumArc3D",
    "NURBS3D",
    "NURBSproperties",
    "KnotVector",
    "Point3D",
    "StartPoint",
    "EndPoint",
    "IntermediatePoint",
    "Center",
    "Normal",
    "Diameter",
    "X",
    "Y",
    "Z",
    "UnboundedGeometry",
    "Plane3D",
    "GridRef",
    "Origin",
    "PhysicalProperties",
    "DryWeight",
    "CenterOfGravity",
    "PlateMaterial",
    "MaterialRef",
    "Thickness",
    "Density",
    "YoungsModulus",
    "PoissonRatio",
    "YieldStress",
    "ComposedOf",
    "StiffenedBy",
    "CutBy",
    "SplitBy",
    "ExternalGeometryRef",
];

/// Fixture schema text
pub fn schema_xsd() -> String {
    let mut xsd = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:ocx="{ns}" targetNamespace="{ns}">
"#,
        ns = NS
    );
    for name in ELEMENTS {
        xsd.push_str(&format!("  <xs:element name=\"{0}\" type=\"ocx:{0}_T\"/>\n", name));
    }
    xsd.push_str(
        r#"  <xs:attribute name="GUIDRef" type="xs:string"/>
  <xs:simpleType name="tightness_enum">
    <xs:restriction base="xs:string">
      <xs:enumeration value="NonTight"/>
      <xs:enumeration value="WaterTight"/>
      <xs:enumeration value="GasTight"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:complexType name="Panel_T">
    <xs:attribute name="tightness" type="ocx:tightness_enum"/>
    <xs:attribute name="isVirtual" type="xs:boolean"/>
    <xs:attribute name="functionType">
      <xs:simpleType>
        <xs:restriction base="xs:string">
          <xs:enumeration value="Deck"/>
          <xs:enumeration value="Bulkhead"/>
          <xs:enumeration value="Shell"/>
        </xs:restriction>
      </xs:simpleType>
    </xs:attribute>
  </xs:complexType>
  <xs:complexType name="Material_T">
    <xs:attribute name="grade">
      <xs:simpleType>
        <xs:restriction base="xs:string">
          <xs:enumeration value="NV-NS"/>
          <xs:enumeration value="NV-32"/>
        </xs:restriction>
      </xs:simpleType>
    </xs:attribute>
  </xs:complexType>
  <xs:complexType name="DocumentBase_T">
    <xs:attribute name="schemaVersion" type="xs:string" fixed="2.8.6"/>
  </xs:complexType>
</xs:schema>
"#,
    );
    xsd
}

/// Dictionary built from [`schema_xsd`]
pub fn dictionary() -> Arc<SchemaDictionary> {
    let mut diagnostics = Diagnostics::new();
    Arc::new(SchemaDictionary::from_str(&schema_xsd(), &mut diagnostics).unwrap())
}

/// Wrap model content in a document root declaring the fixture namespace
pub fn model(body: &str) -> String {
    model_with_version(body, VERSION)
}

/// Like [`model`], with a chosen schema version
pub fn model_with_version(body: &str, version: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ocx:ocxXML xmlns:ocx="{}" schemaVersion="{}">
<ocx:Header name="Test ship" author="tests"/>
{}
</ocx:ocxXML>
"#,
        NS, version, body
    )
}

/// Index a model body, returning the diagnostics recorded while indexing
pub fn index(body: &str) -> (ModelIndex, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let document = Document::parse_str(&model(body)).unwrap();
    let index = ModelIndex::build(document, dictionary(), &mut diagnostics);
    (index, diagnostics)
}

/// Install a test subscriber so tracing output shows with `--nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Quantity element
pub fn quantity(tag: &str, value: f64) -> String {
    format!(r#"<ocx:{} numericvalue="{}" unit="Um"/>"#, tag, value)
}

/// Point3D-typed element
pub fn point(tag: &str, (x, y, z): (f64, f64, f64)) -> String {
    format!(
        "<ocx:{tag}>{}{}{}</ocx:{tag}>",
        quantity("X", x),
        quantity("Y", y),
        quantity("Z", z),
        tag = tag
    )
}

/// Vector3D-typed element
pub fn vector(tag: &str, (x, y, z): (f64, f64, f64)) -> String {
    format!(r#"<ocx:{} x="{}" y="{}" z="{}"/>"#, tag, x, y, z)
}

/// Line3D from `a` to `b`
pub fn line(a: (f64, f64, f64), b: (f64, f64, f64)) -> String {
    format!(
        "<ocx:Line3D>{}{}</ocx:Line3D>",
        point("StartPoint", a),
        point("EndPoint", b)
    )
}

/// Circle3D in a plane normal to Z
pub fn circle(center: (f64, f64, f64), diameter: f64) -> String {
    format!(
        "<ocx:Circle3D>{}{}{}</ocx:Circle3D>",
        point("Center", center),
        vector("Normal", (0.0, 0.0, 1.0)),
        quantity("Diameter", diameter)
    )
}

/// CircumArc3D from `start` through `mid` to `end`
pub fn arc(start: (f64, f64, f64), mid: (f64, f64, f64), end: (f64, f64, f64)) -> String {
    format!(
        "<ocx:CircumArc3D>{}{}{}</ocx:CircumArc3D>",
        point("StartPoint", start),
        point("IntermediatePoint", mid),
        point("EndPoint", end)
    )
}

/// CircumCircle3D through three points
pub fn circle_through(
    p1: (f64, f64, f64),
    p2: (f64, f64, f64),
    p3: (f64, f64, f64),
) -> String {
    format!(
        "<ocx:CircumCircle3D>{}{}{}</ocx:CircumCircle3D>",
        point("StartPoint", p1),
        point("IntermediatePoint", p2),
        point("EndPoint", p3)
    )
}

/// NURBS3D with the given poles and knots; `form` is `Open`, `Closed` or
/// `Periodic`. The declared counts match the content.
pub fn nurbs_curve(poles: &[(f64, f64, f64)], knots: &[f64], degree: u32, form: &str) -> String {
    let control: String = poles
        .iter()
        .map(|p| format!("<ocx:ControlPoint>{}</ocx:ControlPoint>", point("Point3D", *p)))
        .collect();
    let knot_values: Vec<String> = knots.iter().map(f64::to_string).collect();
    format!(
        r#"<ocx:NURBS3D><ocx:NURBSproperties degree="{}" numCtrlPts="{}" numKnots="{}" form="{}"/><ocx:KnotVector value="{}"/><ocx:ControlPtList>{}</ocx:ControlPtList></ocx:NURBS3D>"#,
        degree,
        poles.len(),
        knots.len(),
        form,
        knot_values.join(" "),
        control
    )
}

/// Unbounded geometry given as an analytic plane
pub fn plane(origin: (f64, f64, f64), normal: (f64, f64, f64)) -> String {
    format!(
        "<ocx:UnboundedGeometry><ocx:Plane3D>{}{}</ocx:Plane3D></ocx:UnboundedGeometry>",
        point("Origin", origin),
        vector("Normal", normal)
    )
}

/// Four lines around a `width` by `height` rectangle in the z = 0 plane
pub fn rectangle(width: f64, height: f64) -> String {
    let corners = [
        (0.0, 0.0, 0.0),
        (width, 0.0, 0.0),
        (width, height, 0.0),
        (0.0, height, 0.0),
    ];
    (0..4)
        .map(|i| line(corners[i], corners[(i + 1) % 4]))
        .collect()
}

/// Outer contour holding a composite curve of `curves`
pub fn outer_contour(curves: &str) -> String {
    format!(
        "<ocx:OuterContour><ocx:CompositeCurve3D>{}</ocx:CompositeCurve3D></ocx:OuterContour>",
        curves
    )
}

/// Unbounded geometry referring to a reference-grid plane
pub fn grid_ref(guid: &str) -> String {
    format!(
        r#"<ocx:UnboundedGeometry><ocx:GridRef ocx:GUIDRef="{}"/></ocx:UnboundedGeometry>"#,
        guid
    )
}

/// Plate material with a thickness, optionally naming a catalogue material
pub fn plate_material(material: Option<&str>, thickness: Option<f64>) -> String {
    let reference = material
        .map(|guid| format!(r#"<ocx:MaterialRef ocx:GUIDRef="{}"/>"#, guid))
        .unwrap_or_default();
    let thickness = thickness
        .map(|t| quantity("Thickness", t))
        .unwrap_or_default();
    format!("<ocx:PlateMaterial>{}{}</ocx:PlateMaterial>", reference, thickness)
}

/// Physical properties with a dry weight
pub fn physical_properties(dry_weight: f64) -> String {
    format!(
        "<ocx:PhysicalProperties>{}</ocx:PhysicalProperties>",
        quantity("DryWeight", dry_weight)
    )
}

/// A part element of type `tag` with the given content
pub fn part(tag: &str, guid: &str, name: &str, content: &str) -> String {
    format!(
        r#"<ocx:{tag} ocx:GUIDRef="{guid}" name="{name}" id="{name}">{content}</ocx:{tag}>"#,
        tag = tag,
        guid = guid,
        name = name,
        content = content
    )
}

/// Frame table with reference planes on the given axes
///
/// Each entry is `(axis, guid, position)`, axis one of `X`, `Y`, `Z`.
pub fn frame_table(planes: &[(&str, &str, f64)]) -> String {
    let mut table = String::from("<ocx:FrameTables>");
    for axis in ["X", "Y", "Z"] {
        let members: String = planes
            .iter()
            .filter(|(a, _, _)| *a == axis)
            .map(|(_, guid, position)| {
                format!(
                    r#"<ocx:RefPlane ocx:GUIDRef="{}" name="{}{}">{}</ocx:RefPlane>"#,
                    guid,
                    axis,
                    position,
                    quantity("ReferenceLocation", *position)
                )
            })
            .collect();
        table.push_str(&format!(
            "<ocx:{a}RefPlanes>{m}</ocx:{a}RefPlanes>",
            a = axis,
            m = members
        ));
    }
    table.push_str("</ocx:FrameTables>");
    table
}

/// A 2 x 1 plate with a 0.4 diameter hole, oriented by grid plane `Z1`
pub fn plate_with_hole(guid: &str, name: &str, thickness: f64) -> String {
    part(
        "Plate",
        guid,
        name,
        &format!(
            "{}{}<ocx:InnerContours>{}</ocx:InnerContours>{}",
            grid_ref("Z1"),
            outer_contour(&rectangle(2.0, 1.0)),
            circle((1.0, 0.5, 0.0), 0.4),
            plate_material(Some("MAT1"), Some(thickness)),
        ),
    )
}

/// Catalogue material with every mechanical property
pub fn material(guid: &str, grade: &str) -> String {
    format!(
        r#"<ocx:Material ocx:GUIDRef="{}" name="Steel" grade="{}">{}{}{}{}</ocx:Material>"#,
        guid,
        grade,
        quantity("Density", 7850.0),
        quantity("YoungsModulus", 2.06e11),
        quantity("PoissonRatio", 0.3),
        quantity("YieldStress", 3.15e8),
    )
}
