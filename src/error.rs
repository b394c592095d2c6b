//! Error types for OCX model import and geometry construction
//!
//! Errors carry a code for categorization and a message with enough context
//! to locate the offending element.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and configuration errors
//! - **E2xxx**: XML parsing and structure errors
//! - **E3xxx**: Model and serialization errors
//! - **E5xxx**: Geometry construction errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading file
//! - `E1003`: Model or metadata file not found
//! - `E1004`: Schema file not found
//! - `E2001`: XML parsing error
//! - `E2002`: XML attribute error
//! - `E2003`: Invalid XML structure
//! - `E3001`: Invalid model structure
//! - `E3002`: Numeric parse error
//! - `E3003`: JSON error
//! - `E5001`..`E5008`: see [`GeometryError`]
//!
//! Only the configuration errors (`E1003`, `E1004`) are meant to stop a
//! tool. Everything that concerns a single part is reported through
//! [`GeometryError`] or a [`crate::Diagnostics`] entry and the caller moves
//! on to the next part.

use std::io;
use thiserror::Error;

use crate::geometry::KernelError;

/// Result type for OCX operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when importing OCX models and schemas
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading a file
    ///
    /// **Error Code**: E1001
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// A model or metadata file does not exist
    ///
    /// **Error Code**: E1003
    ///
    /// This is a fatal configuration error: nothing can be imported.
    #[error("[E1003] File not found: {0}")]
    MissingFile(String),

    /// The schema file does not exist
    ///
    /// **Error Code**: E1004
    ///
    /// This is a fatal configuration error: no tag can be resolved without
    /// the schema dictionary.
    #[error("[E1004] Schema not found: {0}")]
    SchemaNotFound(String),

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Malformed XML syntax
    /// - Invalid character encoding
    /// - Unclosed tags
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// Invalid XML structure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Unbalanced start and end tags
    /// - Undeclared namespace prefix
    /// - DTD declarations (not accepted)
    #[error("[E2003] Invalid XML structure: {0}")]
    InvalidXml(String),

    /// Invalid model structure
    ///
    /// **Error Code**: E3001
    #[error("[E3001] Invalid model: {0}")]
    InvalidModel(String),

    /// Parse error for numeric values
    ///
    /// **Error Code**: E3002
    ///
    /// **Suggestions**:
    /// - Verify numeric values use proper format (e.g., "1.5" not "1,5")
    #[error("[E3002] Parse error: {0}")]
    ParseError(String),

    /// JSON reading or writing failed
    ///
    /// **Error Code**: E3003
    #[error("[E3003] JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Geometry construction failed for a part
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Per-part geometry failures
///
/// These never abort an import. Builders return them as values so that the
/// surrounding loop can skip the part and continue.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The part has no outer contour declaration
    ///
    /// **Error Code**: E5001
    #[error("[E5001] {0} has no outer contour")]
    MissingContour(String),

    /// The outer contour does not resolve to one closed wire
    ///
    /// **Error Code**: E5002
    #[error("[E5002] Contour of {0} is not closed")]
    OpenContour(String),

    /// Neither the part nor its parent panel declares unbounded geometry
    ///
    /// **Error Code**: E5003
    #[error("[E5003] {0} has no unbounded geometry and no parent panel providing one")]
    NoUnboundedGeometry(String),

    /// Solid extrusion requested on a non-planar base face
    ///
    /// **Error Code**: E5004
    ///
    /// Only planar bases can be extruded.
    #[error("[E5004] Base face of {0} is not planar")]
    NonPlanarBase(String),

    /// A GUID reference does not resolve in the model index
    ///
    /// **Error Code**: E5005
    #[error("[E5005] Unresolved reference: {0}")]
    UnresolvedReference(String),

    /// The kernel reported that a construction step did not complete
    ///
    /// **Error Code**: E5006
    #[error("[E5006] Geometry construction failed for {part}: {source}")]
    ConstructionFailure {
        /// Description of the part being built
        part: String,
        /// The kernel failure
        source: KernelError,
    },

    /// A referenced external geometry file does not exist
    ///
    /// **Error Code**: E5007
    #[error("[E5007] External geometry file not found: {0}")]
    ExternalFileMissing(String),

    /// The part has no external geometry reference
    ///
    /// **Error Code**: E5008
    #[error("[E5008] {0} has no external geometry reference")]
    NoExternalGeometry(String),
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Self {
        Error::ParseError(format!("Failed to parse floating-point number: {}", err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::ParseError(format!("Failed to parse integer: {}", err))
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl Error {
    /// Create an InvalidXml error with element context
    ///
    /// # Example
    /// ```ignore
    /// Error::invalid_xml_element("ocx:Plate", "unbalanced end tag")
    /// ```
    pub fn invalid_xml_element(element: &str, message: &str) -> Self {
        Error::InvalidXml(format!("Element '<{}>': {}", element, message))
    }

    /// Create an InvalidModel error for a missing required attribute
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Error::InvalidModel(format!(
            "Element '<{}>' is missing required attribute '{}'",
            element, attribute
        ))
    }

    /// Create a ParseError with context about what was being parsed
    ///
    /// # Arguments
    /// * `field_name` - The name of the field being parsed (e.g., "knot vector")
    /// * `value` - The value that failed to parse
    /// * `expected_type` - The expected type (e.g., "floating-point number")
    pub fn parse_error_with_context(field_name: &str, value: &str, expected_type: &str) -> Self {
        Error::ParseError(format!(
            "Failed to parse '{}': expected {}, got '{}'. \
             Verify the value is properly formatted.",
            field_name, expected_type, value
        ))
    }

    /// Whether this error must terminate a batch tool
    ///
    /// Missing model or schema files are the only fatal conditions.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::MissingFile(_) | Error::SchemaNotFound(_))
    }
}
