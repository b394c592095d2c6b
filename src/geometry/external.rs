//! Parts whose geometry lives in STEP or IGES files next to the model

use super::builder::record_failure;
use super::kernel::{GeometryKernel, KernelError};
use crate::diagnostics::Diagnostics;
use crate::error::GeometryError;
use crate::index::{Category, ModelIndex};
use crate::model::{Guid, element_guid};
use crate::parser::Element;
use crate::schema::Tags;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Exchange file formats a kernel can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExchangeFormat {
    /// ISO 10303 STEP
    Step,
    /// IGES
    Iges,
}

impl ExchangeFormat {
    /// Format for a declared format name or file extension
    ///
    /// Case is ignored and a leading dot is allowed, so `STEP`, `stp`,
    /// `.igs` and `IGES` all map.
    pub fn from_format_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix('.').unwrap_or(name);
        match name.to_ascii_uppercase().as_str() {
            "STEP" | "STP" => Some(ExchangeFormat::Step),
            "IGES" | "IGS" => Some(ExchangeFormat::Iges),
            _ => None,
        }
    }

    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_format_name)
    }
}

impl fmt::Display for ExchangeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeFormat::Step => f.write_str("STEP"),
            ExchangeFormat::Iges => f.write_str("IGES"),
        }
    }
}

/// External geometry reference declared on a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalGeometryRef {
    /// Path relative to the model file, `/`-separated
    pub path: String,
    /// Declared format name, if any
    pub declared_format: Option<String>,
}

impl ExternalGeometryRef {
    /// Read the reference declared on a part, if it declares one
    pub fn from_part(part: Element<'_>, tags: &Tags) -> Option<Self> {
        let reference = part.child(&tags.externalgeometryref)?;
        let path = reference.attribute(&tags.externalref)?.trim();
        if path.is_empty() {
            return None;
        }
        Some(Self {
            path: path.replace('\\', "/"),
            declared_format: reference
                .attribute(&tags.geometry_format)
                .map(str::to_string),
        })
    }

    /// Declared format, falling back to the file extension
    pub fn format(&self) -> Option<ExchangeFormat> {
        self.declared_format
            .as_deref()
            .and_then(ExchangeFormat::from_format_name)
            .or_else(|| ExchangeFormat::from_path(Path::new(&self.path)))
    }

    /// Path of the file relative to the model's directory, or the path
    /// itself when it is absolute
    ///
    /// Fails with [`GeometryError::ExternalFileMissing`] when no file
    /// exists there.
    pub fn resolve(&self, model_dir: &Path) -> Result<PathBuf, GeometryError> {
        let path = Path::new(&self.path);
        let file = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.path
                .split('/')
                .filter(|segment| !segment.is_empty() && *segment != ".")
                .fold(model_dir.to_path_buf(), |file, segment| file.join(segment))
        };
        if file.is_file() {
            Ok(file)
        } else {
            Err(GeometryError::ExternalFileMissing(
                file.display().to_string(),
            ))
        }
    }
}

/// Parts grouped for an assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyGroup {
    /// Panel name, or `Brackets`, `Plates` or `Pillars` for root parts
    pub name: String,
    /// GUID of the panel, `None` for root groups
    pub panel: Option<Guid>,
    /// Member parts in document order
    pub parts: Vec<Guid>,
}

/// Reads external part geometry through a kernel
pub struct ExternalGeometry<'a> {
    index: &'a ModelIndex,
}

impl<'a> ExternalGeometry<'a> {
    /// Reader over an imported model
    pub fn new(index: &'a ModelIndex) -> Self {
        Self { index }
    }

    /// Directory external paths are relative to
    ///
    /// The model file's directory, or the working directory for a model
    /// parsed from memory.
    pub fn model_dir(&self) -> PathBuf {
        self.index
            .source_path()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Read the external geometry of one part
    pub fn read_part<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        part: Element<'_>,
    ) -> Result<K::Shape, GeometryError> {
        let owner = part.describe();
        let reference = ExternalGeometryRef::from_part(part, self.index.tags())
            .ok_or_else(|| GeometryError::NoExternalGeometry(owner.clone()))?;
        let file = reference.resolve(&self.model_dir())?;
        let format = reference
            .format()
            .ok_or_else(|| GeometryError::ConstructionFailure {
                part: owner.clone(),
                source: KernelError::not_done(
                    "read_external",
                    format!(
                        "unknown geometry format {}",
                        reference.declared_format.as_deref().unwrap_or("(none)")
                    ),
                ),
            })?;
        tracing::debug!(part = %owner, file = %file.display(), %format, "reading external geometry");
        kernel
            .read_external(&file, format)
            .map_err(|source| GeometryError::ConstructionFailure {
                part: owner,
                source,
            })
    }

    /// Read the external geometry of the part with the given GUID
    pub fn read_guid<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        guid: &Guid,
        diagnostics: &mut Diagnostics,
    ) -> Result<K::Shape, GeometryError> {
        let part = self
            .index
            .resolve(guid, diagnostics)
            .ok_or_else(|| GeometryError::UnresolvedReference(guid.to_string()))?;
        self.read_part(kernel, part)
    }

    /// Read every plate, stiffener, bracket and pillar that has external
    /// geometry
    ///
    /// Parts without a reference are skipped quietly. Other failures are
    /// recorded in `diagnostics`.
    pub fn read_all<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        diagnostics: &mut Diagnostics,
    ) -> Vec<(Guid, K::Shape)> {
        let mut shapes = Vec::new();
        for category in [
            Category::Plate,
            Category::Stiffener,
            Category::Bracket,
            Category::Pillar,
        ] {
            for part in self.index.elements(category) {
                if let Some(read) = self.read_member(kernel, part, diagnostics) {
                    shapes.push(read);
                }
            }
        }
        tracing::info!(read = shapes.len(), "read external part geometry");
        shapes
    }

    fn read_member<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        part: Element<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Option<(Guid, K::Shape)> {
        let guid = element_guid(part, self.index.tags())?;
        match self.read_part(kernel, part) {
            Ok(shape) => Some((guid, shape)),
            Err(GeometryError::NoExternalGeometry(_)) => None,
            Err(e) => {
                record_failure(diagnostics, &part, &e);
                None
            }
        }
    }

    /// Assembly structure: one group per panel holding its children, then
    /// root brackets, plates and pillars that sit in no panel
    pub fn assembly(&self) -> Vec<AssemblyGroup> {
        let tags = self.index.tags();
        let mut groups = Vec::new();

        for panel in self.index.elements(Category::Panel) {
            let Some(guid) = element_guid(panel, tags) else {
                continue;
            };
            let parts = self
                .index
                .get_panel_children(&guid)
                .map(<[Guid]>::to_vec)
                .unwrap_or_default();
            let name = panel
                .attribute("name")
                .map_or_else(|| guid.to_string(), str::to_string);
            groups.push(AssemblyGroup {
                name,
                panel: Some(guid),
                parts,
            });
        }
        let grouped: HashSet<Guid> = groups
            .iter()
            .flat_map(|group: &AssemblyGroup| group.parts.iter().cloned())
            .collect();

        let mut roots = Vec::new();
        for (name, category) in [
            ("Brackets", Category::Bracket),
            ("Plates", Category::Plate),
            ("Pillars", Category::Pillar),
        ] {
            let parts = self
                .index
                .elements(category)
                .filter_map(|part| element_guid(part, tags))
                .filter(|guid| !grouped.contains(guid))
                .collect();
            roots.push(AssemblyGroup {
                name: name.to_string(),
                panel: None,
                parts,
            });
        }
        groups.extend(roots);
        groups
    }

    /// Read the external geometry of every assembly member, by group
    ///
    /// Members without external geometry are left out of their group.
    pub fn read_assembly<K: GeometryKernel>(
        &self,
        kernel: &mut K,
        diagnostics: &mut Diagnostics,
    ) -> Vec<(AssemblyGroup, Vec<(Guid, K::Shape)>)> {
        self.assembly()
            .into_iter()
            .map(|group| {
                let shapes = group
                    .parts
                    .iter()
                    .filter_map(|guid| self.index.get_object(guid))
                    .filter_map(|part| self.read_member(kernel, part, diagnostics))
                    .collect();
                (group, shapes)
            })
            .collect()
    }
}
