//! Face and solid construction for plates and brackets

use super::contour::ContourResolver;
use super::kernel::{GeometryKernel, KernelError};
use super::primitive::{GeometryIntent, UnboundedGeometry};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::error::GeometryError;
use crate::index::{Category, ModelIndex};
use crate::model::{Guid, element_guid, thickness};
use crate::parser::Element;
use nalgebra::Vector3;

/// What [`GeometryBuilder::build_part`] produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Extrude faces into solids
    pub solid: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { solid: true }
    }
}

/// A built part: its face, or its solid when solids were requested
#[derive(Debug, Clone, PartialEq)]
pub enum PartShape<F, S> {
    /// Planar face with holes cut out
    Face(F),
    /// Face extruded by the part thickness
    Solid(S),
}

/// Builds B-rep faces and solids from the geometry declared on parts
///
/// The builder only borrows the index. Each call takes the kernel to build
/// with, so callers may build independent parts in parallel with one
/// kernel per thread.
pub struct GeometryBuilder<'a> {
    index: &'a ModelIndex,
}

impl<'a> GeometryBuilder<'a> {
    /// Builder over an imported model
    pub fn new(index: &'a ModelIndex) -> Self {
        Self { index }
    }

    /// Face bounded by the part's outer contour, minus its inner contours
    ///
    /// Holes are cut in document order. A hole that cannot be built or cut
    /// is reported and the face is kept as it was.
    pub fn build_face<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        part: Element<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<K::Face, GeometryError> {
        let intent = GeometryIntent::read(part, self.index.tags(), diagnostics);
        self.face_from_intent(kernel, &intent, &part.describe(), diagnostics)
    }

    fn face_from_intent<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        intent: &GeometryIntent,
        owner: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<K::Face, GeometryError> {
        let outer = intent
            .outer_contour
            .as_ref()
            .ok_or_else(|| GeometryError::MissingContour(owner.to_string()))?;
        let wire = ContourResolver::build_wire(kernel, outer, owner, diagnostics)?;
        let mut face = kernel
            .make_face(&wire)
            .map_err(|source| construction_failure(owner, source))?;

        for (n, hole) in intent.inner_contours.iter().enumerate() {
            let hole_owner = format!("{} inner contour {}", owner, n + 1);
            let cut = ContourResolver::build_wire(kernel, hole, &hole_owner, diagnostics)
                .and_then(|wire| {
                    kernel
                        .make_face(&wire)
                        .map_err(|source| construction_failure(&hole_owner, source))
                })
                .and_then(|tool| {
                    kernel
                        .cut(&face, &tool)
                        .map_err(|source| construction_failure(&hole_owner, source))
                });
            match cut {
                Ok(result) => face = result,
                Err(e) => diagnostics.push(
                    DiagnosticKind::GeometryConstructionFailure,
                    Severity::Warning,
                    Some(hole_owner),
                    format!("hole skipped: {}", e),
                ),
            }
        }
        Ok(face)
    }

    /// Face extruded along the part's orientation by its thickness
    ///
    /// The orientation comes from the part's own unbounded geometry or,
    /// failing that, from its parent panel's.
    pub fn build_solid<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        part: Element<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<K::Solid, GeometryError> {
        let tags = self.index.tags();
        let owner = part.describe();
        let intent = GeometryIntent::read(part, tags, diagnostics);
        let face = self.face_from_intent(kernel, &intent, &owner, diagnostics)?;

        if !kernel.is_planar(&face) {
            return Err(GeometryError::NonPlanarBase(owner));
        }

        let unbounded = match intent.unbounded_geometry {
            Some(own) => own,
            None => self.parent_unbounded_geometry(part, &owner, diagnostics)?,
        };
        let normal = self.normal_of(&unbounded)?;
        let thickness = thickness(part.child(&tags.platematerial), part, tags, diagnostics);
        let vector = normal * thickness;

        tracing::debug!(part = %owner, thickness, "extruding face");
        kernel
            .extrude(&face, &vector)
            .map_err(|source| construction_failure(&owner, source))
    }

    fn parent_unbounded_geometry(
        &self,
        part: Element<'_>,
        owner: &str,
        diagnostics: &mut Diagnostics,
    ) -> Result<UnboundedGeometry, GeometryError> {
        let tags = self.index.tags();
        element_guid(part, tags)
            .and_then(|guid| self.index.get_parent_panel(&guid))
            .and_then(|panel| self.index.get_object(panel))
            .and_then(|panel| UnboundedGeometry::of(panel, tags, diagnostics))
            .ok_or_else(|| GeometryError::NoUnboundedGeometry(owner.to_string()))
    }

    /// Unit extrusion direction; an analytic plane normal is normalised, so
    /// thickness is measured along the unit normal and not the raw vector.
    fn normal_of(&self, unbounded: &UnboundedGeometry) -> Result<Vector3<f64>, GeometryError> {
        match unbounded {
            UnboundedGeometry::Plane { normal, .. } => {
                Ok(normal.try_normalize(f64::EPSILON).unwrap_or(*normal))
            }
            UnboundedGeometry::GridReference(guid) => self
                .index
                .reference_grid_normal(guid)
                .ok_or_else(|| GeometryError::UnresolvedReference(guid.to_string())),
        }
    }

    /// Build the part with the given GUID
    pub fn build_part<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        guid: &Guid,
        options: BuildOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<PartShape<K::Face, K::Solid>, GeometryError> {
        let part = self
            .index
            .resolve(guid, diagnostics)
            .ok_or_else(|| GeometryError::UnresolvedReference(guid.to_string()))?;
        if options.solid {
            self.build_solid(kernel, part, diagnostics)
                .map(PartShape::Solid)
        } else {
            self.build_face(kernel, part, diagnostics)
                .map(PartShape::Face)
        }
    }

    /// Build every bracket and plate, skipping parts that fail
    ///
    /// Failures are recorded in `diagnostics`; the successful shapes come
    /// back with their GUIDs, brackets first, each category in document
    /// order.
    pub fn build_all<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        options: BuildOptions,
        diagnostics: &mut Diagnostics,
    ) -> Vec<(Guid, PartShape<K::Face, K::Solid>)> {
        let tags = self.index.tags();
        let parts: Vec<Element<'_>> = self
            .index
            .elements(Category::Bracket)
            .chain(self.index.elements(Category::Plate))
            .collect();

        let mut shapes = Vec::with_capacity(parts.len());
        for part in parts {
            let Some(guid) = element_guid(part, tags) else {
                diagnostics.warn(
                    DiagnosticKind::MissingOptionalElement,
                    &part,
                    "part has no GUID, skipped",
                );
                continue;
            };
            tracing::debug!(part = %part.describe(), "building geometry");
            let built = if options.solid {
                self.build_solid(kernel, part, diagnostics)
                    .map(PartShape::Solid)
            } else {
                self.build_face(kernel, part, diagnostics)
                    .map(PartShape::Face)
            };
            match built {
                Ok(shape) => shapes.push((guid, shape)),
                Err(e) => record_failure(diagnostics, &part, &e),
            }
        }
        tracing::info!(built = shapes.len(), "built part geometry");
        shapes
    }
}

fn construction_failure(owner: &str, source: KernelError) -> GeometryError {
    GeometryError::ConstructionFailure {
        part: owner.to_string(),
        source,
    }
}

pub(crate) fn record_failure(diagnostics: &mut Diagnostics, part: &Element<'_>, error: &GeometryError) {
    let kind = match error {
        GeometryError::NonPlanarBase(_) => DiagnosticKind::NonPlanarBase,
        GeometryError::UnresolvedReference(_) => DiagnosticKind::UnresolvedReference,
        GeometryError::ExternalFileMissing(_) => DiagnosticKind::ExternalFileMissing,
        _ => DiagnosticKind::GeometryConstructionFailure,
    };
    diagnostics.error(kind, part, error.to_string());
}
