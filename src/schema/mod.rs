//! Schema dictionary built from the OCX XSD
//!
//! The model document is only ever queried through names qualified with the
//! schema's target namespace. [`SchemaDictionary`] reads the XSD once and
//! maps lowercase keys such as `plate` or `guidref` to `{namespace}Plate` and
//! `{namespace}GUIDRef`, records the declared type of every global element
//! and attribute, and collects the legal values of enumerated attributes.

mod tags;

pub use tags::{CurveKind, SurfaceKind, Tags};

use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::error::{Error, Result};
use crate::parser::{Document, Element, get_local_name};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// W3C XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Complex type carrying the fixed `schemaVersion` attribute
const VERSION_TYPE: &str = "DocumentBase_T";

fn xs(local: &str) -> String {
    format!("{{{}}}{}", XSD_NAMESPACE, local)
}

/// Lookup tables derived from an OCX schema
#[derive(Debug, Clone)]
pub struct SchemaDictionary {
    namespaces: BTreeMap<String, String>,
    target_namespace: String,
    names: HashMap<String, String>,
    types: HashMap<String, String>,
    enumerations: HashMap<String, Vec<String>>,
    version: Option<String>,
    source: Option<PathBuf>,
}

impl SchemaDictionary {
    /// Load the dictionary from an XSD file
    ///
    /// A path that does not resolve to a file is a fatal configuration
    /// error. A schema without a version-bearing type still loads; the gap
    /// is recorded in `diagnostics`.
    pub fn load<P: AsRef<Path>>(path: P, diagnostics: &mut Diagnostics) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::SchemaNotFound(path.display().to_string()));
        }
        let xsd = std::fs::read_to_string(path)?;
        let mut dictionary = Self::from_str(&xsd, diagnostics)?;
        dictionary.source = Some(path.to_path_buf());
        tracing::info!(
            schema = %path.display(),
            version = dictionary.version().unwrap_or("unknown"),
            names = dictionary.len(),
            "loaded schema dictionary"
        );
        Ok(dictionary)
    }

    /// Build the dictionary from an in-memory XSD
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(xsd: &str, diagnostics: &mut Diagnostics) -> Result<Self> {
        let document = Document::parse_str(xsd)?;
        let root = document.root();
        if !root.is(&xs("schema")) {
            return Err(Error::InvalidModel(format!(
                "expected an xs:schema root element, found '{}'",
                root.name()
            )));
        }

        let namespaces: BTreeMap<String, String> = root
            .namespace_declarations()
            .filter(|(prefix, _)| !prefix.is_empty())
            .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
            .collect();

        let target_namespace = root
            .attribute("targetNamespace")
            .map(str::to_string)
            .or_else(|| namespaces.get("ocx").cloned())
            .ok_or_else(|| {
                Error::InvalidModel(
                    "schema declares neither a targetNamespace nor an 'ocx' prefix".to_string(),
                )
            })?;

        let element_tag = xs("element");
        let attribute_tag = xs("attribute");
        let simple_type_tag = xs("simpleType");

        // Global declarations
        let mut names = HashMap::new();
        let mut types = HashMap::new();
        for declaration in root
            .children()
            .filter(|c| c.is(&element_tag) || c.is(&attribute_tag))
        {
            let Some(name) = declaration.attribute("name") else {
                continue;
            };
            let key = name.to_lowercase();
            names
                .entry(key.clone())
                .or_insert_with(|| format!("{{{}}}{}", target_namespace, name));
            if let Some(typ) = declaration.attribute("type") {
                types.entry(key).or_insert_with(|| typ.to_string());
            }
        }

        // Named simple types, for enumerations referenced through `type`
        let simple_types: HashMap<&str, Vec<String>> = root
            .children_named(&simple_type_tag)
            .filter_map(|st| st.attribute("name").map(|n| (n, enumeration_values(st))))
            .collect();

        let mut enumerations: HashMap<String, Vec<String>> = HashMap::new();
        let enumerated = root.descendants().filter(|d| {
            d.is(&attribute_tag) || (d.is(&element_tag) && d.parent() == Some(root))
        });
        for declaration in enumerated {
            let Some(name) = declaration.attribute("name") else {
                continue;
            };
            let values = match declaration.child(&simple_type_tag) {
                Some(inline) => enumeration_values(inline),
                None => declaration
                    .attribute("type")
                    .and_then(|t| simple_types.get(get_local_name(t)))
                    .cloned()
                    .unwrap_or_default(),
            };
            if !values.is_empty() {
                enumerations.entry(name.to_lowercase()).or_insert(values);
            }
        }

        let version = schema_version(root);
        if version.is_none() {
            diagnostics.push(
                DiagnosticKind::SchemaVersionMissing,
                Severity::Warning,
                None,
                format!(
                    "schema has no {} type with a fixed schemaVersion attribute",
                    VERSION_TYPE
                ),
            );
        }

        Ok(Self {
            namespaces,
            target_namespace,
            names,
            types,
            enumerations,
            version,
            source: None,
        })
    }

    /// Qualified name for a lowercase key, e.g. `plate` -> `{ns}Plate`
    ///
    /// Keys are matched case-insensitively.
    pub fn qualified(&self, key: &str) -> Option<&str> {
        self.names.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Declared type of a global element or attribute
    pub fn type_of(&self, key: &str) -> Option<&str> {
        self.types.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Legal values of an enumerated attribute, empty when unrestricted
    pub fn enumeration(&self, name: &str) -> &[String] {
        self.enumerations
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Version fixed by the schema, if declared
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Namespace the qualified names live in
    pub fn target_namespace(&self) -> &str {
        &self.target_namespace
    }

    /// Namespace URI bound to a prefix on the schema root
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// All prefix bindings declared on the schema root
    pub fn namespaces(&self) -> &BTreeMap<String, String> {
        &self.namespaces
    }

    /// Number of global names in the dictionary
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the schema declares no global elements or attributes
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Path the schema was loaded from
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn enumeration_values(simple_type: Element<'_>) -> Vec<String> {
    let enumeration_tag = xs("enumeration");
    simple_type
        .descendants()
        .filter(|d| d.is(&enumeration_tag))
        .filter_map(|d| d.attribute("value").map(str::to_string))
        .collect()
}

fn schema_version(root: Element<'_>) -> Option<String> {
    let complex_type_tag = xs("complexType");
    let attribute_tag = xs("attribute");
    let document_base = root
        .children_named(&complex_type_tag)
        .find(|c| c.attribute("name") == Some(VERSION_TYPE))?;
    document_base
        .descendants()
        .filter(|d| d.is(&attribute_tag))
        .find(|d| d.attribute("name") == Some("schemaVersion"))
        .and_then(|d| d.attribute("fixed"))
        .map(str::to_string)
}
