//! Quality checks on imported OCX models
//!
//! [`validate`] runs a fixed sequence of checks over a [`ModelIndex`]:
//! - Panel sub-elements (ComposedOf, StiffenedBy, CutBy, SplitBy) that are
//!   present but empty
//! - Plates, brackets and stiffeners without physical properties
//! - Repeated GUIDs
//! - Panel dry weight against the sum of its children's
//! - Panel `functionType` and `tightness` against the schema enumerations
//! - Plates and brackets without a plate material
//! - Materials without a legal grade or mechanical properties
//!
//! Checks never fail. Each finding is a line in the returned
//! [`ValidationReport`] and a [`DiagnosticKind::ValidationFinding`] entry.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::index::{Category, ModelIndex};
use crate::model::{Material, StructurePart, element_guid};
use crate::parser::Element;
use std::fmt;

/// Relative difference between a panel's dry weight and its children's sum
/// above which the weight check reports the panel
pub const WEIGHT_TOLERANCE: f64 = 0.1;

/// Findings of one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// What was checked
    pub name: &'static str,
    /// One line per offending element, in document order
    pub findings: Vec<String>,
}

impl CheckResult {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            findings: Vec::new(),
        }
    }

    /// True when the check found nothing
    pub fn is_ok(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Results of all checks, in the order they ran
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// One entry per check
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    /// True when no check found anything
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(CheckResult::is_ok)
    }

    /// Every finding, check by check
    pub fn findings(&self) -> impl Iterator<Item = &str> {
        self.checks
            .iter()
            .flat_map(|c| c.findings.iter().map(String::as_str))
    }

    /// Result of the named check
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            if check.is_ok() {
                writeln!(f, "{}: OK", check.name)?;
            } else {
                writeln!(f, "{}: {} finding(s)", check.name, check.findings.len())?;
                for finding in &check.findings {
                    writeln!(f, "  {}", finding)?;
                }
            }
        }
        Ok(())
    }
}

/// Names of the checks, in the order [`validate`] runs them
pub const CHECKS: [&str; 8] = [
    "panel elements",
    "physical properties",
    "duplicate GUIDs",
    "panel dry weights",
    "panel functionType",
    "panel tightness",
    "part materials",
    "material grades",
];

/// Run every check over the model
pub fn validate(index: &ModelIndex, diagnostics: &mut Diagnostics) -> ValidationReport {
    let mut findings = Findings {
        index,
        diagnostics,
        current: None,
    };
    let mut checks = Vec::with_capacity(CHECKS.len());
    let runs: [fn(&mut Findings<'_, '_>); 8] = [
        check_panel_elements,
        check_physical_properties,
        check_duplicates,
        check_weights,
        check_function_type,
        check_tightness,
        check_part_material,
        check_material,
    ];
    for (name, run) in CHECKS.into_iter().zip(runs) {
        findings.current = Some(CheckResult::new(name));
        run(&mut findings);
        if let Some(result) = findings.current.take() {
            tracing::debug!(check = name, findings = result.findings.len(), "check done");
            checks.push(result);
        }
    }
    ValidationReport { checks }
}

struct Findings<'a, 'd> {
    index: &'a ModelIndex,
    diagnostics: &'d mut Diagnostics,
    current: Option<CheckResult>,
}

impl Findings<'_, '_> {
    fn report(&mut self, element: &Element<'_>, message: String) {
        let line = format!("{} {}", label(element, self.index), message);
        self.diagnostics
            .warn(DiagnosticKind::ValidationFinding, element, message);
        if let Some(current) = self.current.as_mut() {
            current.findings.push(line);
        }
    }

    fn legal(&self, enumeration: &str, value: &str) -> bool {
        let values = self.index.dictionary().enumeration(enumeration);
        values.is_empty() || values.iter().any(|v| v == value)
    }
}

/// `Plate 'P1' (guid)` style prefix for findings
fn label(element: &Element<'_>, index: &ModelIndex) -> String {
    match element_guid(*element, index.tags()) {
        Some(guid) => format!("{} with GUID {}", element.describe(), guid.braced()),
        None => element.describe(),
    }
}

fn check_panel_elements(f: &mut Findings<'_, '_>) {
    let tags = f.index.tags();
    let sub_elements = [
        (&tags.composedof, "ComposedOf"),
        (&tags.stiffenedby, "StiffenedBy"),
        (&tags.cutby, "CutBy"),
        (&tags.splitby, "SplitBy"),
    ];
    for panel in f.index.elements(Category::Panel) {
        for (tag, name) in sub_elements {
            if let Some(element) = panel.child(tag) {
                if element.children().next().is_none() {
                    f.report(&panel, format!("has {} with no content", name));
                }
            }
        }
    }
}

fn check_physical_properties(f: &mut Findings<'_, '_>) {
    let tags = f.index.tags();
    for category in [Category::Plate, Category::Bracket, Category::Stiffener] {
        for part in f.index.elements(category) {
            if part.child(&tags.physicalproperties).is_none() {
                f.report(&part, "has no PhysicalProperties".to_string());
            }
        }
    }
}

fn check_duplicates(f: &mut Findings<'_, '_>) {
    for duplicate in f.index.duplicates() {
        f.report(&duplicate, "is a duplicate".to_string());
    }
}

fn check_weights(f: &mut Findings<'_, '_>) {
    let tags = f.index.tags();
    for element in f.index.elements(Category::Panel) {
        let Some(panel) = StructurePart::read(element, tags, f.diagnostics) else {
            continue;
        };
        if element.attribute(&tags.is_virtual) == Some("true") {
            continue;
        }
        let (Some(guid), Some(panel_weight)) = (panel.guid.as_ref(), panel.dry_weight()) else {
            continue;
        };

        let children = f.index.get_panel_children(guid).unwrap_or_default();
        let mut child_weight = 0.0;
        for child in children {
            if let Some(weight) = f
                .index
                .structure_part(child, f.diagnostics)
                .and_then(|part| part.dry_weight())
            {
                child_weight += weight;
            }
        }

        let off = if panel_weight == 0.0 {
            child_weight != 0.0
        } else {
            (1.0 - child_weight / panel_weight).abs() > WEIGHT_TOLERANCE
        };
        if off {
            f.report(
                &element,
                format!(
                    "has DryWeight {:.3} but its children sum to {:.3}",
                    panel_weight, child_weight
                ),
            );
        }
    }
}

fn check_enumerated_attribute(f: &mut Findings<'_, '_>, attribute: &str, enumeration: &str) {
    for panel in f.index.elements(Category::Panel) {
        match panel.attribute(attribute) {
            None => f.report(&panel, format!("has no mandatory {}", enumeration)),
            Some(value) if !f.legal(enumeration, value) => {
                let legal = f.index.dictionary().enumeration(enumeration).join(", ");
                f.report(
                    &panel,
                    format!("has illegal {} '{}' (legal: {})", enumeration, value, legal),
                );
            }
            Some(_) => {}
        }
    }
}

fn check_function_type(f: &mut Findings<'_, '_>) {
    let attribute = f.index.tags().function_type.clone();
    check_enumerated_attribute(f, &attribute, "functionType");
}

fn check_tightness(f: &mut Findings<'_, '_>) {
    let attribute = f.index.tags().tightness.clone();
    check_enumerated_attribute(f, &attribute, "tightness");
}

fn check_part_material(f: &mut Findings<'_, '_>) {
    let tags = f.index.tags();
    for category in [Category::Plate, Category::Bracket] {
        for part in f.index.elements(category) {
            if part.child(&tags.platematerial).is_none() {
                f.report(&part, "has no material".to_string());
            }
        }
    }
}

fn check_material(f: &mut Findings<'_, '_>) {
    let tags = f.index.tags();
    for element in f.index.elements(Category::Material) {
        let material = match Material::read(element, tags) {
            Ok(material) => material,
            Err(e) => {
                f.report(&element, format!("cannot be read: {}", e));
                continue;
            }
        };
        match material.grade.as_deref() {
            None => f.report(&element, "has no mandatory material grade".to_string()),
            Some(grade) if !f.legal("grade", grade) => {
                f.report(&element, format!("has illegal material grade '{}'", grade));
            }
            Some(_) => {}
        }
        for property in material.missing_properties() {
            f.report(&element, format!("has no mandatory {}", property));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_display() {
        let report = ValidationReport {
            checks: vec![
                CheckResult::new("panel elements"),
                CheckResult {
                    name: "part materials",
                    findings: vec!["Plate 'P1' has no material".to_string()],
                },
            ],
        };
        assert!(!report.is_ok());
        let text = report.to_string();
        assert!(text.contains("panel elements: OK"));
        assert!(text.contains("part materials: 1 finding(s)"));
        assert!(text.contains("  Plate 'P1' has no material"));
        assert_eq!(report.findings().count(), 1);
    }
}
