//! Plate tightness as an annotation property document
//!
//! The document lists every legal tightness once, under a generated value
//! id, and one `Tightness` property per plate pointing at the value id of
//! the plate's resolved tightness.

use crate::entities::EntitiesMap;
use crate::error::Result;
use crate::index::{Category, ModelIndex, UNDEFINED_TIGHTNESS};
use crate::model::element_guid;
use serde::Serialize;
use std::io::Write;
use uuid::Uuid;

const DEFINITION_NAME: &str = "Tightness";

/// Value id of `value`, generating one on first use
fn assign_value(value: &str, values: &mut Vec<AttributeValue>) -> String {
    if let Some(existing) = values.iter().find(|v| v.value == value) {
        return existing.value_id.clone();
    }
    let id = Uuid::new_v4().to_string();
    values.push(AttributeValue {
        value_id: id.clone(),
        value: value.to_string(),
        meta_data: None,
    });
    id
}

/// Property definition the values belong to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    /// Definition name
    pub definition_name: String,
    /// Value type
    #[serde(rename = "type")]
    pub kind: String,
    /// Colour parts by value
    pub enable_color_coding: bool,
    /// Show the definition name next to values
    pub show_attribute_name: bool,
    /// Custom colour settings, unused
    pub color_coding_settings: Option<serde_json::Value>,
}

/// One legal value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValue {
    /// Generated id
    pub value_id: String,
    /// Tightness value
    pub value: String,
    /// Unused
    pub meta_data: Option<serde_json::Value>,
}

/// Entity a property is attached to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    /// Annotation GUID, or the part GUID when no entity map knows the part
    pub entity_id: String,
    /// Part name
    pub description: String,
}

/// Value assignment within a property
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRef {
    /// Definition name
    pub definition_name: String,
    /// Id of the assigned [`AttributeValue`]
    pub value_id: String,
}

/// Tightness of one plate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Property name
    pub name: String,
    /// Annotation position, unused
    pub position: Option<serde_json::Value>,
    /// The plate
    pub entity_ref: EntityRef,
    /// Generated id
    pub property_id: String,
    /// Assigned values
    pub attributes: Vec<AttributeRef>,
}

/// Annotation document with one tightness property per plate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TightnessExport {
    /// Document format version
    pub version: String,
    /// The tightness definition
    pub attribute_definitions: AttributeDefinition,
    /// Legal values
    pub attribute_values: Vec<AttributeValue>,
    /// Plate properties in document order
    pub properties: Vec<Property>,
}

impl TightnessExport {
    /// Build the document for every plate of the model
    ///
    /// Legal values are the schema's tightness enumeration plus
    /// `Undefined`. A plate whose tightness is outside that list gets its
    /// value added. Entity ids come from `entities`, looked up by plate
    /// name, when given. A plate without a name is keyed by its `id`, then
    /// by its GUID.
    pub fn build(index: &ModelIndex, entities: Option<&EntitiesMap>) -> Self {
        let mut values: Vec<AttributeValue> = Vec::new();
        for legal in index
            .dictionary()
            .enumeration("tightness")
            .iter()
            .map(String::as_str)
            .chain([UNDEFINED_TIGHTNESS])
        {
            assign_value(legal, &mut values);
        }

        let tags = index.tags();
        let mut properties = Vec::new();
        for plate in index.elements(Category::Plate) {
            let Some(guid) = element_guid(plate, tags) else {
                continue;
            };
            let name = plate
                .attribute("name")
                .or_else(|| plate.attribute("id"))
                .map_or_else(|| guid.to_string(), str::to_string);
            let entity_id = entities
                .and_then(|map| map.get(&name))
                .map(str::to_string)
                .or_else(|| plate.attribute(&tags.guidref).map(str::to_string))
                .unwrap_or_else(|| guid.braced());
            let tightness = index.tightness(&guid);
            properties.push(Property {
                name: DEFINITION_NAME.to_string(),
                position: None,
                entity_ref: EntityRef {
                    entity_id,
                    description: name,
                },
                property_id: Uuid::new_v4().to_string(),
                attributes: vec![AttributeRef {
                    definition_name: DEFINITION_NAME.to_string(),
                    value_id: assign_value(&tightness, &mut values),
                }],
            });
        }
        tracing::info!(plates = properties.len(), "built tightness properties");

        Self {
            version: "2".to_string(),
            attribute_definitions: AttributeDefinition {
                definition_name: DEFINITION_NAME.to_string(),
                kind: "string".to_string(),
                enable_color_coding: true,
                show_attribute_name: true,
                color_coding_settings: None,
            },
            attribute_values: values,
            properties,
        }
    }

    /// Value id assigned to a tightness value
    pub fn value_id(&self, value: &str) -> Option<&str> {
        self.attribute_values
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.value_id.as_str())
    }

    /// Tightness value a property points at
    pub fn value_of(&self, property: &Property) -> Option<&str> {
        let id = &property.attributes.first()?.value_id;
        self.attribute_values
            .iter()
            .find(|v| &v.value_id == id)
            .map(|v| v.value.as_str())
    }

    /// Write the document as indented JSON
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// The document as indented JSON
    pub fn to_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
