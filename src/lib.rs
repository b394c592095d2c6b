//! # libocx
//!
//! Indexing and geometry-intent resolution for OCX ship structural models.
//!
//! OCX models are XML documents describing a hull as panels, plates,
//! stiffeners, brackets, pillars and seams, each identified by a GUID and
//! referring to one another and to a reference grid by GUID. The element
//! names are defined by a versioned XSD schema.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Schema dictionary resolving element keys to namespace-qualified tags
//! - Constant-time lookups by GUID, parent panel, panel children and grid plane
//! - Contour resolution from curve elements into kernel wires
//! - Face and solid construction against any [`GeometryKernel`]
//! - Model quality checks, GUID-level diffing and tightness property export
//!
//! Per-element defects never abort an import. They are collected in
//! [`Diagnostics`]; only a missing model or schema file is an error.
//!
//! ## Example
//!
//! ```no_run
//! use libocx::{BuildOptions, Diagnostics, GeometryBuilder, RecordingKernel, import_model};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut diagnostics = Diagnostics::new();
//! let index = import_model("midship.3docx", "OCX_Schema.xsd", &mut diagnostics)?;
//!
//! let mut kernel = RecordingKernel::new();
//! let shapes = GeometryBuilder::new(&index).build_all(
//!     &mut kernel,
//!     BuildOptions::default(),
//!     &mut diagnostics,
//! );
//! println!("built {} parts, {} diagnostics", shapes.len(), diagnostics.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod diagnostics;
pub mod diff;
pub mod entities;
pub mod error;
pub mod export;
pub mod geometry;
pub mod index;
pub mod model;
pub mod parser;
pub mod schema;
pub mod validator;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use diff::{ModelDiff, WeightChange, diff};
pub use entities::EntitiesMap;
pub use error::{Error, GeometryError, Result};
pub use export::TightnessExport;
pub use geometry::{
    BuildOptions, ContourPrimitive, ContourResolver, ExchangeFormat, ExternalGeometry,
    GeometryBuilder, GeometryIntent, GeometryKernel, KernelError, PartShape, RecordingKernel,
    UnboundedGeometry,
};
pub use index::{Category, ModelIndex, UNDEFINED_TIGHTNESS, import_model};
pub use model::{Guid, Material, PartKind, StructurePart};
pub use parser::{Document, Element, NodeId};
pub use schema::{SchemaDictionary, Tags};
pub use validator::{ValidationReport, validate};
