//! Cross-reference indices over an imported OCX model
//!
//! [`ModelIndex`] owns the parsed [`Document`] and, built once, answers the
//! queries geometry construction, validation and diffing need in constant
//! time: element by GUID, parent panel of a part, children of a panel and
//! reference-grid planes by GUID. Elements are stored in the document arena
//! and handed out as borrowed [`Element`] views, so a part that refers to its
//! panel, which refers to the grid, never forms an ownership cycle.

mod frame_table;

use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::error::{Error, Result};
use crate::model::{
    Guid, Header, Material, PlateMaterial, ReferenceGridEntry, StructurePart, element_guid,
};
use crate::parser::{Document, Element, NodeId};
use crate::schema::{SchemaDictionary, Tags};
use nalgebra::{Point3, Vector3};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Tightness reported when neither a part nor its panel declares one
pub const UNDEFINED_TIGHTNESS: &str = "Undefined";

/// Element categories the index queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Panels
    Panel,
    /// Plates
    Plate,
    /// Stiffeners
    Stiffener,
    /// Brackets
    Bracket,
    /// Pillars
    Pillar,
    /// Seams
    Seam,
    /// Catalogue materials
    Material,
    /// Bar sections
    Section,
    /// Vessels
    Vessel,
    /// Reference grid tables
    FrameTable,
}

impl Category {
    /// Every category, in reporting order
    pub const ALL: [Category; 10] = [
        Category::Panel,
        Category::Plate,
        Category::Stiffener,
        Category::Bracket,
        Category::Pillar,
        Category::Seam,
        Category::Material,
        Category::Section,
        Category::Vessel,
        Category::FrameTable,
    ];

    fn tag(self, tags: &Tags) -> &str {
        match self {
            Category::Panel => &tags.panel,
            Category::Plate => &tags.plate,
            Category::Stiffener => &tags.stiffener,
            Category::Bracket => &tags.bracket,
            Category::Pillar => &tags.pillar,
            Category::Seam => &tags.seam,
            Category::Material => &tags.material,
            Category::Section => &tags.barsection,
            Category::Vessel => &tags.vessel,
            Category::FrameTable => &tags.frametables,
        }
    }

    /// Plural label used in summaries
    pub fn label(self) -> &'static str {
        match self {
            Category::Panel => "panels",
            Category::Plate => "plates",
            Category::Stiffener => "stiffeners",
            Category::Bracket => "brackets",
            Category::Pillar => "pillars",
            Category::Seam => "seams",
            Category::Material => "materials",
            Category::Section => "sections",
            Category::Vessel => "vessels",
            Category::FrameTable => "frame tables",
        }
    }
}

/// Immutable indices over one imported model
#[derive(Debug)]
pub struct ModelIndex {
    document: Document,
    dictionary: Arc<SchemaDictionary>,
    tags: Tags,
    version: Option<String>,
    header: Option<Header>,
    categories: HashMap<Category, Vec<NodeId>>,
    guids: HashMap<Guid, NodeId>,
    order: Vec<Guid>,
    duplicates: Vec<NodeId>,
    panel_children: HashMap<Guid, Vec<Guid>>,
    parent_panel: HashMap<Guid, Guid>,
    reference_grid: HashMap<Guid, ReferenceGridEntry>,
}

impl ModelIndex {
    /// Build every index over a parsed document
    ///
    /// Never fails: repeated GUIDs, grid planes without a location and
    /// similar defects are recorded in `diagnostics`.
    pub fn build(
        document: Document,
        dictionary: Arc<SchemaDictionary>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let tags = Tags::resolve(&dictionary, diagnostics);
        let root = document.root();

        let version = root
            .attribute_by_local_name("schemaVersion")
            .map(str::to_string);
        let mismatch = match (version.as_deref(), dictionary.version()) {
            (Some(model), Some(schema)) if model != schema => Some((model, schema)),
            _ => None,
        };
        if let Some((model, schema)) = mismatch {
            diagnostics.push(
                DiagnosticKind::VersionMismatch,
                Severity::Warning,
                None,
                format!(
                    "model version {} differs from the referenced schema version {}",
                    model, schema
                ),
            );
        }
        let header = Header::read(root, &tags);

        // 1. Elements per category
        let mut categories = HashMap::new();
        for category in Category::ALL {
            let tag = category.tag(&tags);
            let nodes: Vec<NodeId> = root.find_descendants(tag).map(|e| e.id()).collect();
            categories.insert(category, nodes);
        }

        // 5. Reference grid, first table only
        let mut grid_entries = Vec::new();
        if let Some(table) = categories
            .get(&Category::FrameTable)
            .and_then(|nodes| nodes.first())
        {
            grid_entries =
                frame_table::read_reference_grid(document.element(*table), &tags, diagnostics);
        }

        // 2. GUID map over parts and catalogue entries
        let mut addressed: Vec<(NodeId, Guid)> = Category::ALL
            .iter()
            .filter(|c| **c != Category::FrameTable)
            .flat_map(|c| categories[c].iter())
            .filter_map(|&id| element_guid(document.element(id), &tags).map(|g| (id, g)))
            .collect();
        addressed.sort_by_key(|(id, _)| *id);

        let mut guids = HashMap::with_capacity(addressed.len());
        let mut order = Vec::with_capacity(addressed.len());
        let mut duplicates = Vec::new();
        for (id, guid) in addressed {
            match guids.entry(guid) {
                Entry::Vacant(slot) => {
                    order.push(slot.key().clone());
                    slot.insert(id);
                }
                Entry::Occupied(slot) => {
                    diagnostics.warn(
                        DiagnosticKind::DuplicateGuid,
                        &document.element(id),
                        format!("GUID {} is already used by another element", slot.key()),
                    );
                    duplicates.push(id);
                }
            }
        }

        let mut reference_grid = HashMap::with_capacity(grid_entries.len());
        for (id, entry) in grid_entries {
            match reference_grid.entry(entry.guid.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                }
                Entry::Occupied(slot) => diagnostics.warn(
                    DiagnosticKind::DuplicateGuid,
                    &document.element(id),
                    format!("reference plane GUID {} is already used", slot.key()),
                ),
            }
        }

        // 3 and 4. Panel children and the reverse index; panels come in
        // document order, so an inner panel overwrites its enclosing one
        let child_tags = tags.panel_child_tags();
        let mut panel_children: HashMap<Guid, Vec<Guid>> = HashMap::new();
        let mut parent_panel = HashMap::new();
        for &panel_id in &categories[&Category::Panel] {
            let panel = document.element(panel_id);
            let Some(panel_guid) = element_guid(panel, &tags) else {
                continue;
            };
            let mut seen = HashSet::new();
            let children: Vec<Guid> = panel
                .descendants()
                .filter(|d| child_tags.iter().any(|t| d.is(t)))
                .filter_map(|d| element_guid(d, &tags))
                .filter(|g| seen.insert(g.clone()))
                .collect();
            for child in &children {
                parent_panel.insert(child.clone(), panel_guid.clone());
            }
            panel_children.entry(panel_guid).or_default().extend(children);
        }

        tracing::debug!(
            guids = order.len(),
            duplicates = duplicates.len(),
            grid = reference_grid.len(),
            "built model index"
        );

        Self {
            document,
            dictionary,
            tags,
            version,
            header,
            categories,
            guids,
            order,
            duplicates,
            panel_children,
            parent_panel,
            reference_grid,
        }
    }

    /// Element with the given GUID
    pub fn get_object(&self, guid: &Guid) -> Option<Element<'_>> {
        self.guids.get(guid).map(|&id| self.document.element(id))
    }

    /// Like [`get_object`](Self::get_object), recording an unresolved
    /// reference
    pub fn resolve(&self, guid: &Guid, diagnostics: &mut Diagnostics) -> Option<Element<'_>> {
        let found = self.get_object(guid);
        if found.is_none() {
            diagnostics.push(
                DiagnosticKind::UnresolvedReference,
                Severity::Warning,
                None,
                format!("GUID {} does not exist in the model", guid),
            );
        }
        found
    }

    /// GUID of the innermost panel containing the part
    pub fn get_parent_panel(&self, guid: &Guid) -> Option<&Guid> {
        self.parent_panel.get(guid)
    }

    /// Parts nested anywhere under the panel, in document order
    pub fn get_panel_children(&self, panel: &Guid) -> Option<&[Guid]> {
        self.panel_children.get(panel).map(Vec::as_slice)
    }

    /// Reference-grid plane with the given GUID
    pub fn reference_grid_entry(&self, guid: &Guid) -> Option<&ReferenceGridEntry> {
        self.reference_grid.get(guid)
    }

    /// Origin of a reference-grid plane
    pub fn reference_grid_position(&self, guid: &Guid) -> Option<Point3<f64>> {
        self.reference_grid_entry(guid).map(ReferenceGridEntry::origin)
    }

    /// Unit normal of a reference-grid plane
    pub fn reference_grid_normal(&self, guid: &Guid) -> Option<Vector3<f64>> {
        self.reference_grid_entry(guid).map(ReferenceGridEntry::normal)
    }

    /// Elements whose GUID was already taken, in document order
    pub fn duplicates(&self) -> Vec<Element<'_>> {
        self.duplicates
            .iter()
            .map(|&id| self.document.element(id))
            .collect()
    }

    /// Elements of one category, in document order
    pub fn elements(&self, category: Category) -> impl Iterator<Item = Element<'_>> + '_ {
        self.categories
            .get(&category)
            .into_iter()
            .flatten()
            .map(|&id| self.document.element(id))
    }

    /// Number of elements of one category
    pub fn count(&self, category: Category) -> usize {
        self.categories.get(&category).map_or(0, Vec::len)
    }

    /// Distinct GUIDs in document order
    pub fn guids(&self) -> &[Guid] {
        &self.order
    }

    /// True when an element with this GUID is indexed
    pub fn contains(&self, guid: &Guid) -> bool {
        self.guids.contains_key(guid)
    }

    /// Number of distinct GUIDs
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no element carries a GUID
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Typed view of the part with the given GUID
    pub fn structure_part(
        &self,
        guid: &Guid,
        diagnostics: &mut Diagnostics,
    ) -> Option<StructurePart> {
        self.get_object(guid)
            .and_then(|e| StructurePart::read(e, &self.tags, diagnostics))
    }

    /// Material binding of a plate or bracket element
    pub fn plate_material(&self, part: Element<'_>) -> Result<Option<PlateMaterial>> {
        part.child(&self.tags.platematerial)
            .map(|pm| PlateMaterial::read(pm, &self.tags))
            .transpose()
    }

    /// Catalogue material with the given GUID
    pub fn material(&self, guid: &Guid) -> Result<Option<Material>> {
        match self.get_object(guid) {
            Some(e) if e.is(&self.tags.material) => Material::read(e, &self.tags).map(Some),
            _ => Ok(None),
        }
    }

    /// Catalogue material of a part, with the part's thickness
    pub fn part_material(&self, part: Element<'_>) -> Result<Option<Material>> {
        let Some(binding) = self.plate_material(part)? else {
            return Ok(None);
        };
        let Some(material_ref) = binding.material_ref.as_ref() else {
            return Ok(None);
        };
        Ok(self
            .material(material_ref)?
            .map(|catalogue| Material::resolve(&binding, &catalogue)))
    }

    /// Tightness of a part
    ///
    /// The part's own attribute wins, then its parent panel's. Anything
    /// else, including a panel that exists but declares no tightness,
    /// yields [`UNDEFINED_TIGHTNESS`].
    pub fn tightness(&self, guid: &Guid) -> String {
        let own = self
            .get_object(guid)
            .and_then(|e| e.attribute(&self.tags.tightness));
        let inherited = || {
            self.get_parent_panel(guid)
                .and_then(|panel| self.get_object(panel))
                .and_then(|p| p.attribute(&self.tags.tightness))
        };
        own.or_else(inherited)
            .unwrap_or(UNDEFINED_TIGHTNESS)
            .to_string()
    }

    /// Schema version declared by the model document
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Document header, if present
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// The schema dictionary the index was built with
    pub fn dictionary(&self) -> &SchemaDictionary {
        &self.dictionary
    }

    /// Qualified tags resolved from the dictionary
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// The indexed document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Path of the model file, when imported from disk
    pub fn source_path(&self) -> Option<&Path> {
        self.document.source_path()
    }
}

/// Import a model file against a schema file
///
/// Only a missing model or schema file fails; both are fatal configuration
/// errors. Per-element problems end up in `diagnostics`.
pub fn import_model<P: AsRef<Path>, Q: AsRef<Path>>(
    model_path: P,
    schema_path: Q,
    diagnostics: &mut Diagnostics,
) -> Result<ModelIndex> {
    let model_path = model_path.as_ref();
    if !model_path.is_file() {
        return Err(Error::MissingFile(model_path.display().to_string()));
    }
    let dictionary = Arc::new(SchemaDictionary::load(schema_path, diagnostics)?);
    let document = Document::open(model_path)?;
    let index = ModelIndex::build(document, dictionary, diagnostics);

    tracing::info!(
        model = %model_path.display(),
        version = index.version().unwrap_or("unknown"),
        "imported OCX model"
    );
    for category in Category::ALL {
        tracing::info!("number of {:<12}: {}", category.label(), index.count(category));
    }
    if !index.duplicates.is_empty() {
        tracing::warn!("{} non-unique GUIDs", index.duplicates.len());
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> Arc<SchemaDictionary> {
        let mut xsd = String::from(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:ocx">"#,
        );
        for name in ["Panel", "Plate", "Bracket", "Seam"] {
            xsd.push_str(&format!(r#"<xs:element name="{}"/>"#, name));
        }
        xsd.push_str(r#"<xs:attribute name="GUIDRef"/></xs:schema>"#);
        Arc::new(SchemaDictionary::from_str(&xsd, &mut Diagnostics::new()).unwrap())
    }

    #[test]
    fn test_nested_panels_innermost_wins() {
        let doc = Document::parse_str(
            r#"<o:ocxXML xmlns:o="urn:ocx">
  <o:Panel o:GUIDRef="{OUTER}" tightness="WaterTight">
    <o:Plate o:GUIDRef="{P1}"/>
    <o:Panel o:GUIDRef="{INNER}">
      <o:Plate o:GUIDRef="{P2}"/>
    </o:Panel>
  </o:Panel>
</o:ocxXML>"#,
        )
        .unwrap();
        let mut diag = Diagnostics::new();
        let index = ModelIndex::build(doc, dictionary(), &mut diag);

        let outer = Guid::new("outer");
        let inner = Guid::new("inner");
        assert_eq!(index.get_parent_panel(&Guid::new("p1")), Some(&outer));
        assert_eq!(index.get_parent_panel(&Guid::new("p2")), Some(&inner));
        assert_eq!(index.get_panel_children(&outer).unwrap().len(), 2);
        assert_eq!(index.get_panel_children(&inner).unwrap(), &[Guid::new("p2")]);

        assert_eq!(index.tightness(&Guid::new("p1")), "WaterTight");
        assert_eq!(index.tightness(&Guid::new("p2")), UNDEFINED_TIGHTNESS);
        assert_eq!(index.tightness(&Guid::new("nowhere")), UNDEFINED_TIGHTNESS);
    }

    #[test]
    fn test_guid_order_follows_document() {
        let doc = Document::parse_str(
            r#"<o:ocxXML xmlns:o="urn:ocx">
  <o:Plate o:GUIDRef="{B}"/>
  <o:Panel o:GUIDRef="{A}"/>
  <o:Bracket o:GUIDRef="{C}"/>
  <o:Plate o:GUIDRef="{b}"/>
</o:ocxXML>"#,
        )
        .unwrap();
        let mut diag = Diagnostics::new();
        let index = ModelIndex::build(doc, dictionary(), &mut diag);

        let order: Vec<&str> = index.guids().iter().map(Guid::as_str).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
        assert_eq!(index.duplicates().len(), 1);
        assert_eq!(diag.count(DiagnosticKind::DuplicateGuid), 1);
        assert!(index.get_object(&Guid::new("{B}")).is_some());
    }

    #[test]
    fn test_resolve_records_unresolved_reference() {
        let doc = Document::parse_str(r#"<o:ocxXML xmlns:o="urn:ocx"/>"#).unwrap();
        let mut diag = Diagnostics::new();
        let index = ModelIndex::build(doc, dictionary(), &mut diag);
        assert!(index.is_empty());
        assert!(index.resolve(&Guid::new("x"), &mut diag).is_none());
        assert_eq!(diag.count(DiagnosticKind::UnresolvedReference), 1);
    }
}
