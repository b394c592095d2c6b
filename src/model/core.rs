//! Structural parts, GUIDs and the document header

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;
use crate::parser::{Element, NodeId, numeric_value, point3d};
use crate::schema::Tags;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical GUID
///
/// Source documents write GUIDs brace-delimited and in either case; the
/// canonical form has surrounding whitespace and braces removed and is
/// lowercase, so `{A1B2}` and `a1b2` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    /// Canonicalise a GUID as written in a document
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('{').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix('}').unwrap_or(trimmed);
        Guid(trimmed.trim().to_lowercase())
    }

    /// The canonical string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Brace-delimited uppercase form, as exporters write it
    pub fn braced(&self) -> String {
        format!("{{{}}}", self.0.to_uppercase())
    }

    /// True for a GUID attribute that was present but blank
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(raw: &str) -> Self {
        Guid::new(raw)
    }
}

/// GUID of an element, if it carries a non-blank GUID attribute
pub fn element_guid(element: Element<'_>, tags: &Tags) -> Option<Guid> {
    element
        .attribute(&tags.guidref)
        .map(Guid::new)
        .filter(|g| !g.is_empty())
}

/// Structural part categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartKind {
    /// Container of plates, stiffeners and other parts
    Panel,
    /// Plate
    Plate,
    /// Stiffener
    Stiffener,
    /// Bracket
    Bracket,
    /// Pillar
    Pillar,
    /// Seam splitting a panel
    Seam,
}

impl PartKind {
    /// Kind of an element, from its qualified tag
    pub fn of(element: Element<'_>, tags: &Tags) -> Option<Self> {
        let name = element.name();
        [
            (&tags.panel, PartKind::Panel),
            (&tags.plate, PartKind::Plate),
            (&tags.stiffener, PartKind::Stiffener),
            (&tags.bracket, PartKind::Bracket),
            (&tags.pillar, PartKind::Pillar),
            (&tags.seam, PartKind::Seam),
        ]
        .into_iter()
        .find(|(tag, _)| !tag.is_empty() && tag.as_str() == name)
        .map(|(_, kind)| kind)
    }

    /// Element name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            PartKind::Panel => "Panel",
            PartKind::Plate => "Plate",
            PartKind::Stiffener => "Stiffener",
            PartKind::Bracket => "Bracket",
            PartKind::Pillar => "Pillar",
            PartKind::Seam => "Seam",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Weight and center of gravity reported for a part
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhysicalProperties {
    /// Dry weight, in the model's weight unit
    pub dry_weight: Option<f64>,
    /// Center of gravity
    pub center_of_gravity: Option<Point3<f64>>,
}

impl PhysicalProperties {
    /// Read a PhysicalProperties element
    pub fn read(element: Element<'_>, tags: &Tags) -> Result<Self> {
        let dry_weight = element.child(&tags.dryweight).map(numeric_value).transpose()?;
        let center_of_gravity = element
            .child(&tags.centerofgravity)
            .map(|cog| point3d(cog, tags))
            .transpose()?;
        Ok(Self {
            dry_weight,
            center_of_gravity,
        })
    }
}

/// Typed view of one structural part element
#[derive(Debug, Clone, PartialEq)]
pub struct StructurePart {
    /// Category
    pub kind: PartKind,
    /// Document-local id
    pub id: String,
    /// GUID, absent when the element has none
    pub guid: Option<Guid>,
    /// Name, defaults to the id
    pub name: String,
    /// Free text description
    pub description: Option<String>,
    /// Reported weight and center of gravity
    pub physical_properties: Option<PhysicalProperties>,
    /// Tightness attribute as written on the element
    pub tightness: Option<String>,
    /// Location of the element in the document
    pub node: NodeId,
}

impl StructurePart {
    /// Read a part element; `None` if the element is not a structural part
    ///
    /// Malformed physical properties are reported and left out rather than
    /// failing the part.
    pub fn read(element: Element<'_>, tags: &Tags, diagnostics: &mut Diagnostics) -> Option<Self> {
        let kind = PartKind::of(element, tags)?;
        let id = element.attribute("id").unwrap_or_default().to_string();
        let name = element
            .attribute("name")
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());
        let description = element
            .child(&tags.description)
            .and_then(|d| d.text())
            .map(str::to_string);

        let physical_properties = match element.child(&tags.physicalproperties) {
            Some(props) => match PhysicalProperties::read(props, tags) {
                Ok(props) => Some(props),
                Err(e) => {
                    diagnostics.warn(
                        DiagnosticKind::MissingOptionalElement,
                        &element,
                        format!("unreadable physical properties: {}", e),
                    );
                    None
                }
            },
            None => None,
        };

        Some(Self {
            kind,
            id,
            guid: element_guid(element, tags),
            name,
            description,
            physical_properties,
            tightness: element.attribute(&tags.tightness).map(str::to_string),
            node: element.id(),
        })
    }

    /// Reported dry weight, if the part has one
    pub fn dry_weight(&self) -> Option<f64> {
        self.physical_properties.as_ref().and_then(|p| p.dry_weight)
    }

    /// True when the part carries a PhysicalProperties element
    pub fn has_physical_properties(&self) -> bool {
        self.physical_properties.is_some()
    }
}

/// Document header
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Header {
    /// Model name
    pub name: Option<String>,
    /// Time stamp as written
    pub time_stamp: Option<String>,
    /// Author
    pub author: Option<String>,
    /// Organization
    pub organization: Option<String>,
    /// System that wrote the document
    pub originating_system: Option<String>,
}

impl Header {
    /// Read the header child of the document root, if present
    pub fn read(root: Element<'_>, tags: &Tags) -> Option<Self> {
        let header = root.child(&tags.header)?;
        let attr = |name: &str| header.attribute(name).map(str::to_string);
        Some(Self {
            name: attr("name"),
            time_stamp: attr("time_stamp"),
            author: attr("author"),
            organization: attr("organization"),
            originating_system: attr("originating_system"),
        })
    }
}
