//! Qualified tag table and curve/surface dispatch maps

use super::SchemaDictionary;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use std::collections::HashMap;

/// Curve primitives a contour can be made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    /// Straight segment between two points
    Line,
    /// Arc through start, intermediate and end points
    Arc,
    /// Full circle from center, normal and diameter
    Circle,
    /// Full circle through three points
    CircleBy3Points,
    /// NURBS curve
    Nurbs,
    /// Ordered sequence of nested curves
    Composite,
}

/// Surfaces an unbounded geometry declaration can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Analytic plane with origin and normal
    Plane,
    /// Reference to a reference-grid plane by GUID
    GridRef,
}

/// Every qualified name the crate queries the model with
///
/// Built once per schema. An element key the schema does not declare
/// resolves to an empty tag, which [`crate::parser::Element::is`] never
/// matches.
#[derive(Debug, Clone, Default)]
pub struct Tags {
    /// Panel element
    pub panel: String,
    /// Plate element
    pub plate: String,
    /// Bracket element
    pub bracket: String,
    /// Stiffener element
    pub stiffener: String,
    /// Pillar element
    pub pillar: String,
    /// Seam element
    pub seam: String,
    /// Material catalogue entry
    pub material: String,
    /// Bar section catalogue entry
    pub barsection: String,
    /// Vessel element
    pub vessel: String,
    /// Document header
    pub header: String,
    /// Free text description
    pub description: String,

    /// Reference grid container
    pub frametables: String,
    /// X reference-plane group
    pub xrefplanes: String,
    /// Y reference-plane group
    pub yrefplanes: String,
    /// Z reference-plane group
    pub zrefplanes: String,
    /// One reference plane
    pub refplane: String,
    /// Position of a reference plane along its axis
    pub referencelocation: String,

    /// Outer boundary of a part
    pub outercontour: String,
    /// Container of hole contours
    pub innercontours: String,
    /// Composite curve
    pub compositecurve3d: String,
    /// Line segment
    pub line3d: String,
    /// Circle by center, normal and diameter
    pub circle3d: String,
    /// Circle through three points
    pub circumcircle3d: String,
    /// Arc through three points
    pub circumarc3d: String,
    /// NURBS curve
    pub nurbs3d: String,
    /// NURBS degree, counts and form
    pub nurbsproperties: String,
    /// NURBS knot values
    pub knotvector: String,
    /// Point element
    pub point3d: String,
    /// Start point of a line or arc
    pub startpoint: String,
    /// End point of a line or arc
    pub endpoint: String,
    /// Intermediate point of an arc
    pub intermediatepoint: String,
    /// Circle center
    pub center: String,
    /// Circle or plane normal
    pub normal: String,
    /// Circle diameter
    pub diameter: String,
    /// X coordinate of a point
    pub x: String,
    /// Y coordinate of a point
    pub y: String,
    /// Z coordinate of a point
    pub z: String,

    /// Unbounded geometry declaration
    pub unboundedgeometry: String,
    /// Analytic plane
    pub plane3d: String,
    /// Reference-grid binding
    pub gridref: String,
    /// Plane origin
    pub origin: String,

    /// Physical properties of a part
    pub physicalproperties: String,
    /// Dry weight quantity
    pub dryweight: String,
    /// Center of gravity point
    pub centerofgravity: String,
    /// Material binding of a plate or bracket
    pub platematerial: String,
    /// Reference to a catalogue material
    pub materialref: String,
    /// Thickness quantity
    pub thickness: String,
    /// Density quantity
    pub density: String,
    /// Young's modulus quantity
    pub youngsmodulus: String,
    /// Poisson ratio quantity
    pub poissonratio: String,
    /// Yield stress quantity
    pub yieldstress: String,

    /// Panel sub-element listing composing parts
    pub composedof: String,
    /// Panel sub-element listing stiffeners
    pub stiffenedby: String,
    /// Panel sub-element listing cutouts
    pub cutby: String,
    /// Panel sub-element listing seams
    pub splitby: String,
    /// External geometry file reference
    pub externalgeometryref: String,

    /// GUID attribute
    pub guidref: String,
    /// Tightness attribute
    pub tightness: String,
    /// Panel function type attribute
    pub function_type: String,
    /// Material grade attribute
    pub grade: String,
    /// Relative path of an external geometry file
    pub externalref: String,
    /// Exchange format of an external geometry file
    pub geometry_format: String,
    /// Marks a panel that only groups other parts
    pub is_virtual: String,

    curves: HashMap<String, CurveKind>,
    surfaces: HashMap<String, SurfaceKind>,
}

impl Tags {
    /// Resolve every key against the dictionary
    pub fn resolve(dictionary: &SchemaDictionary, diagnostics: &mut Diagnostics) -> Self {
        let mut element = |key: &str| -> String {
            match dictionary.qualified(key) {
                Some(tag) => tag.to_string(),
                None => {
                    diagnostics.push(
                        DiagnosticKind::UnknownSchemaName,
                        Severity::Warning,
                        None,
                        format!("schema does not declare an element for key '{}'", key),
                    );
                    String::new()
                }
            }
        };

        let mut tags = Tags {
            panel: element("panel"),
            plate: element("plate"),
            bracket: element("bracket"),
            stiffener: element("stiffener"),
            pillar: element("pillar"),
            seam: element("seam"),
            material: element("material"),
            barsection: element("barsection"),
            vessel: element("vessel"),
            header: element("header"),
            description: element("description"),
            frametables: element("frametables"),
            xrefplanes: element("xrefplanes"),
            yrefplanes: element("yrefplanes"),
            zrefplanes: element("zrefplanes"),
            refplane: element("refplane"),
            referencelocation: element("referencelocation"),
            outercontour: element("outercontour"),
            innercontours: element("innercontours"),
            compositecurve3d: element("compositecurve3d"),
            line3d: element("line3d"),
            circle3d: element("circle3d"),
            circumcircle3d: element("circumcircle3d"),
            circumarc3d: element("circumarc3d"),
            nurbs3d: element("nurbs3d"),
            nurbsproperties: element("nurbsproperties"),
            knotvector: element("knotvector"),
            point3d: element("point3d"),
            startpoint: element("startpoint"),
            endpoint: element("endpoint"),
            intermediatepoint: element("intermediatepoint"),
            center: element("center"),
            normal: element("normal"),
            diameter: element("diameter"),
            x: element("x"),
            y: element("y"),
            z: element("z"),
            unboundedgeometry: element("unboundedgeometry"),
            plane3d: element("plane3d"),
            gridref: element("gridref"),
            origin: element("origin"),
            physicalproperties: element("physicalproperties"),
            dryweight: element("dryweight"),
            centerofgravity: element("centerofgravity"),
            platematerial: element("platematerial"),
            materialref: element("materialref"),
            thickness: element("thickness"),
            density: element("density"),
            youngsmodulus: element("youngsmodulus"),
            poissonratio: element("poissonratio"),
            yieldstress: element("yieldstress"),
            composedof: element("composedof"),
            stiffenedby: element("stiffenedby"),
            cutby: element("cutby"),
            splitby: element("splitby"),
            externalgeometryref: element("externalgeometryref"),
            ..Tags::default()
        };

        // Local attributes are unqualified in instance documents
        let attribute = |key: &str, local: &str| -> String {
            dictionary
                .qualified(key)
                .map(str::to_string)
                .unwrap_or_else(|| local.to_string())
        };
        tags.guidref = attribute("guidref", "GUIDRef");
        tags.tightness = attribute("tightness", "tightness");
        tags.function_type = attribute("functiontype", "functionType");
        tags.grade = attribute("grade", "grade");
        tags.externalref = attribute("externalref", "externalRef");
        tags.geometry_format = attribute("geometryformat", "geometryFormat");
        tags.is_virtual = attribute("isvirtual", "isVirtual");

        let curves = [
            (&tags.line3d, CurveKind::Line),
            (&tags.circumarc3d, CurveKind::Arc),
            (&tags.circle3d, CurveKind::Circle),
            (&tags.circumcircle3d, CurveKind::CircleBy3Points),
            (&tags.nurbs3d, CurveKind::Nurbs),
            (&tags.compositecurve3d, CurveKind::Composite),
        ]
        .into_iter()
        .filter(|(tag, _)| !tag.is_empty())
        .map(|(tag, kind)| (tag.clone(), kind))
        .collect();
        let surfaces = [
            (&tags.plane3d, SurfaceKind::Plane),
            (&tags.gridref, SurfaceKind::GridRef),
        ]
        .into_iter()
        .filter(|(tag, _)| !tag.is_empty())
        .map(|(tag, kind)| (tag.clone(), kind))
        .collect();
        tags.curves = curves;
        tags.surfaces = surfaces;
        tags
    }

    /// Curve kind for a qualified element name
    pub fn curve_kind(&self, tag: &str) -> Option<CurveKind> {
        self.curves.get(tag).copied()
    }

    /// Surface kind for a qualified element name
    pub fn surface_kind(&self, tag: &str) -> Option<SurfaceKind> {
        self.surfaces.get(tag).copied()
    }

    /// Tags of the structural part categories that can sit inside a panel
    pub fn panel_child_tags(&self) -> [&str; 5] {
        [
            &self.plate,
            &self.stiffener,
            &self.bracket,
            &self.pillar,
            &self.seam,
        ]
    }
}
