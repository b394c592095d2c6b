//! Diagnostics collected while importing a model and building geometry
//!
//! Recoverable findings (a missing optional element, a duplicate GUID, a
//! contour child that is not understood) never abort processing. They are
//! pushed into a [`Diagnostics`] value that the caller passes explicitly into
//! each operation, and each entry is mirrored as a `tracing` event so that a
//! subscriber configured by the application sees the same stream.

use std::collections::BTreeMap;
use std::fmt;

use crate::parser::Element;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational, e.g. an optional element is absent
    Info,
    /// Something was skipped or defaulted
    Warning,
    /// An operation on one element failed
    Error,
}

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// An optional sub-element is absent and a default was used
    MissingOptionalElement,
    /// A GUID was seen more than once while indexing
    DuplicateGuid,
    /// A GUID reference does not resolve in the index
    UnresolvedReference,
    /// A contour child tag is not a known curve
    UnknownContourChild,
    /// The kernel did not complete a construction step
    GeometryConstructionFailure,
    /// Extrusion was requested on a non-planar face
    NonPlanarBase,
    /// A referenced external geometry file is missing
    ExternalFileMissing,
    /// The schema has no version-bearing complex type
    SchemaVersionMissing,
    /// A dictionary key is not declared by the schema
    UnknownSchemaName,
    /// The model was written against a different schema version
    VersionMismatch,
    /// A model QA check reported a finding
    ValidationFinding,
}

impl DiagnosticKind {
    /// Short stable name used in summaries
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingOptionalElement => "missing optional element",
            DiagnosticKind::DuplicateGuid => "duplicate GUID",
            DiagnosticKind::UnresolvedReference => "unresolved reference",
            DiagnosticKind::UnknownContourChild => "unknown contour child",
            DiagnosticKind::GeometryConstructionFailure => "geometry construction failure",
            DiagnosticKind::NonPlanarBase => "non-planar base",
            DiagnosticKind::ExternalFileMissing => "external file missing",
            DiagnosticKind::SchemaVersionMissing => "schema version missing",
            DiagnosticKind::UnknownSchemaName => "unknown schema name",
            DiagnosticKind::VersionMismatch => "version mismatch",
            DiagnosticKind::ValidationFinding => "validation finding",
        }
    }
}

/// One recorded finding
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Category
    pub kind: DiagnosticKind,
    /// Severity
    pub severity: Severity,
    /// Description of the element the finding is about (tag, id, name)
    pub element: Option<String>,
    /// Human readable message
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            Some(element) => write!(f, "{}: {}", element, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and mirror it as a tracing event
    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        severity: Severity,
        element: Option<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            severity,
            element,
            message: message.into(),
        };
        match severity {
            Severity::Info => tracing::info!(kind = kind.name(), "{}", diagnostic),
            Severity::Warning => tracing::warn!(kind = kind.name(), "{}", diagnostic),
            Severity::Error => tracing::error!(kind = kind.name(), "{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    /// Record an informational finding about `element`
    pub fn info(&mut self, kind: DiagnosticKind, element: &Element<'_>, message: impl Into<String>) {
        self.push(kind, Severity::Info, Some(element.describe()), message);
    }

    /// Record a warning about `element`
    pub fn warn(&mut self, kind: DiagnosticKind, element: &Element<'_>, message: impl Into<String>) {
        self.push(kind, Severity::Warning, Some(element.describe()), message);
    }

    /// Record an error about `element`
    pub fn error(&mut self, kind: DiagnosticKind, element: &Element<'_>, message: impl Into<String>) {
        self.push(kind, Severity::Error, Some(element.describe()), message);
    }

    /// All entries in the order they were recorded
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Entries of one kind
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    /// Number of entries of one kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when an entry of [`Severity::Error`] was recorded
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Move all entries of `other` into `self`
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Count of entries per kind, for end-of-run summaries
    pub fn summary(&self) -> BTreeMap<DiagnosticKind, usize> {
        let mut counts = BTreeMap::new();
        for d in &self.entries {
            *counts.entry(d.kind).or_insert(0) += 1;
        }
        counts
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
