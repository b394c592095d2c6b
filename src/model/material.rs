//! Materials and plate material bindings

use super::core::{Guid, element_guid};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;
use crate::parser::{Element, numeric_value};
use crate::schema::Tags;

/// Thickness used when a plate material omits it, in the model's length unit
pub const DEFAULT_THICKNESS: f64 = 0.01;

/// Catalogue material
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    /// Document-local id
    pub id: String,
    /// GUID of the catalogue entry
    pub guid: Option<Guid>,
    /// Name, defaults to the id
    pub name: String,
    /// Material grade
    pub grade: Option<String>,
    /// Density
    pub density: Option<f64>,
    /// Young's modulus
    pub youngs_modulus: Option<f64>,
    /// Poisson ratio
    pub poisson_ratio: Option<f64>,
    /// Yield stress
    pub yield_stress: Option<f64>,
    /// Thickness, only set when resolved through a [`PlateMaterial`]
    pub thickness: Option<f64>,
}

impl Material {
    /// Read a catalogue Material element
    pub fn read(element: Element<'_>, tags: &Tags) -> Result<Self> {
        let quantity = |tag: &str| element.child(tag).map(numeric_value).transpose();
        let id = element.attribute("id").unwrap_or_default().to_string();
        Ok(Self {
            name: element
                .attribute("name")
                .map(str::to_string)
                .unwrap_or_else(|| id.clone()),
            id,
            guid: element_guid(element, tags),
            grade: element.attribute(&tags.grade).map(str::to_string),
            density: quantity(&tags.density)?,
            youngs_modulus: quantity(&tags.youngsmodulus)?,
            poisson_ratio: quantity(&tags.poissonratio)?,
            yield_stress: quantity(&tags.yieldstress)?,
            thickness: None,
        })
    }

    /// Combine a part's material binding with the catalogue entry it names
    pub fn resolve(binding: &PlateMaterial, catalogue: &Material) -> Self {
        Self {
            thickness: binding.thickness,
            ..catalogue.clone()
        }
    }

    /// Names of the mechanical properties this material lacks
    pub fn missing_properties(&self) -> Vec<&'static str> {
        [
            ("Density", self.density),
            ("YoungsModulus", self.youngs_modulus),
            ("PoissonRatio", self.poisson_ratio),
            ("YieldStress", self.yield_stress),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Material binding of a plate or bracket
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlateMaterial {
    /// GUID of the catalogue material
    pub material_ref: Option<Guid>,
    /// Plate thickness
    pub thickness: Option<f64>,
}

impl PlateMaterial {
    /// Read a PlateMaterial element
    pub fn read(element: Element<'_>, tags: &Tags) -> Result<Self> {
        let material_ref = element
            .child(&tags.materialref)
            .and_then(|r| element_guid(r, tags));
        let thickness = element.child(&tags.thickness).map(numeric_value).transpose()?;
        Ok(Self {
            material_ref,
            thickness,
        })
    }
}

/// Thickness of a part's plate material, with the documented fallback
///
/// Returns [`DEFAULT_THICKNESS`] when the binding or its thickness is
/// absent or unreadable, recording exactly one diagnostic about `owner`.
pub fn thickness(
    plate_material: Option<Element<'_>>,
    owner: Element<'_>,
    tags: &Tags,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let quantity = plate_material.and_then(|pm| pm.child(&tags.thickness));
    let reason = match quantity.map(numeric_value) {
        Some(Ok(value)) => return value,
        Some(Err(e)) => format!("has an unreadable thickness ({})", e),
        None => "has no thickness".to_string(),
    };
    diagnostics.info(
        DiagnosticKind::MissingOptionalElement,
        &owner,
        format!("{}, using default {}", reason, DEFAULT_THICKNESS),
    );
    DEFAULT_THICKNESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_takes_thickness_from_binding() {
        let catalogue = Material {
            id: "M1".into(),
            name: "Steel".into(),
            grade: Some("NV-36".into()),
            density: Some(7.85),
            ..Default::default()
        };
        let binding = PlateMaterial {
            material_ref: Some(Guid::new("{M}")),
            thickness: Some(0.015),
        };
        let resolved = Material::resolve(&binding, &catalogue);
        assert_eq!(resolved.thickness, Some(0.015));
        assert_eq!(resolved.grade.as_deref(), Some("NV-36"));
        assert_eq!(
            resolved.missing_properties(),
            vec!["YoungsModulus", "PoissonRatio", "YieldStress"]
        );
    }
}
