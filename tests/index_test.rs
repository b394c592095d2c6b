//! Model index construction and queries

mod common;

use common::*;
use libocx::model::{DEFAULT_THICKNESS, thickness};
use libocx::{
    Category, DiagnosticKind, Diagnostics, Error, Guid, PartKind, UNDEFINED_TIGHTNESS,
    import_model,
};
use nalgebra::{Point3, Vector3};
use std::io::Write;

fn nested_panels() -> String {
    let inner = part(
        "Panel",
        "{INNER}",
        "Web",
        &format!(
            "<ocx:ComposedOf>{}</ocx:ComposedOf>",
            part("Plate", "{P2}", "WebPlate", "")
        ),
    );
    let outer = part(
        "Panel",
        "{OUTER}",
        "Deck",
        &format!(
            "<ocx:ComposedOf>{}{}</ocx:ComposedOf><ocx:StiffenedBy>{}</ocx:StiffenedBy>",
            part("Plate", "{P1}", "DeckPlate", ""),
            inner,
            part("Stiffener", "{S1}", "Longitudinal", ""),
        ),
    );
    format!(
        r#"<ocx:Vessel ocx:GUIDRef="{{V1}}">{}{}{}</ocx:Vessel>"#,
        frame_table(&[("X", "FR10", 7.0), ("Z", "Z1", 2.5)]),
        outer,
        part("Bracket", "{B1}", "LooseBracket", ""),
    )
}

#[test]
fn test_lookup_ignores_braces_and_case() {
    let (index, diagnostics) = index(&nested_panels());
    assert!(!diagnostics.has_errors());

    let plate = index.get_object(&Guid::new("p1")).unwrap();
    assert_eq!(plate.attribute("name"), Some("DeckPlate"));
    assert!(index.get_object(&Guid::new("{P1}")).is_some());
    assert!(index.contains(&Guid::new("{b1}")));
    assert!(index.get_object(&Guid::new("nope")).is_none());

    assert_eq!(index.count(Category::Panel), 2);
    assert_eq!(index.count(Category::Plate), 2);
    assert_eq!(index.count(Category::Vessel), 1);
    assert_eq!(index.version(), Some(VERSION));
    assert_eq!(
        index.header().and_then(|h| h.name.as_deref()),
        Some("Test ship")
    );
}

#[test]
fn test_innermost_panel_wins() {
    let (index, _) = index(&nested_panels());
    assert_eq!(
        index.get_parent_panel(&Guid::new("P2")),
        Some(&Guid::new("INNER"))
    );
    assert_eq!(
        index.get_parent_panel(&Guid::new("P1")),
        Some(&Guid::new("OUTER"))
    );
    assert_eq!(index.get_parent_panel(&Guid::new("B1")), None);

    // descendants of the outer panel, in document order
    let children: Vec<&str> = index
        .get_panel_children(&Guid::new("OUTER"))
        .unwrap()
        .iter()
        .map(Guid::as_str)
        .collect();
    assert_eq!(children, ["p1", "p2", "s1"]);
    assert_eq!(index.get_panel_children(&Guid::new("INNER")).unwrap().len(), 1);
}

#[test]
fn test_reference_grid() {
    let (index, _) = index(&nested_panels());
    let fr10 = Guid::new("FR10");
    assert_eq!(
        index.reference_grid_position(&fr10),
        Some(Point3::new(7.0, 0.0, 0.0))
    );
    assert_eq!(index.reference_grid_normal(&fr10), Some(Vector3::x()));
    assert_eq!(
        index.reference_grid_normal(&Guid::new("Z1")),
        Some(Vector3::z())
    );
    // grid planes are not structural parts
    assert!(index.get_object(&fr10).is_none());
}

#[test]
fn test_guid_map_holds_parts_only() {
    let body = format!(
        "{}{}{}",
        frame_table(&[("X", "FR10", 7.0), ("X", "FR10", 8.0)]),
        part("Plate", "P1", "Deck", ""),
        part("Plate", "P2", "Side", ""),
    );
    let (index, diagnostics) = index(&body);
    assert_eq!(index.len(), 2);
    let guids: Vec<&str> = index.guids().iter().map(Guid::as_str).collect();
    assert_eq!(guids, ["p1", "p2"]);
    assert!(index.duplicates().is_empty());

    // the repeated plane keeps its first position
    assert_eq!(
        index.reference_grid_position(&Guid::new("FR10")),
        Some(Point3::new(7.0, 0.0, 0.0))
    );
    assert_eq!(diagnostics.count(DiagnosticKind::DuplicateGuid), 1);
}

#[test]
fn test_missing_grid_group_is_informational() {
    let table = format!(
        r#"<ocx:FrameTables><ocx:ZRefPlanes><ocx:RefPlane ocx:GUIDRef="Z1">{}</ocx:RefPlane></ocx:ZRefPlanes></ocx:FrameTables>"#,
        quantity("ReferenceLocation", 0.0)
    );
    let (index, diagnostics) = index(&table);
    assert_eq!(index.reference_grid_normal(&Guid::new("Z1")), Some(Vector3::z()));
    // no X and no Y planes
    assert_eq!(diagnostics.count(DiagnosticKind::MissingOptionalElement), 2);
    assert!(!diagnostics.has_errors());
}

#[test]
fn test_duplicates_are_recorded_first_wins() {
    let body = format!(
        "{}{}",
        part("Plate", "{DUP}", "First", ""),
        part("Bracket", "{dup}", "Second", ""),
    );
    let (index, diagnostics) = index(&body);
    assert_eq!(index.len(), 1);
    assert_eq!(
        index.get_object(&Guid::new("DUP")).unwrap().attribute("name"),
        Some("First")
    );
    let duplicates = index.duplicates();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].attribute("name"), Some("Second"));
    assert_eq!(diagnostics.count(DiagnosticKind::DuplicateGuid), 1);
}

#[test]
fn test_version_mismatch_is_a_warning() {
    let mut diagnostics = Diagnostics::new();
    let document =
        libocx::Document::parse_str(&model_with_version("", "2.8.5")).unwrap();
    let index = libocx::ModelIndex::build(document, dictionary(), &mut diagnostics);
    assert_eq!(index.version(), Some("2.8.5"));
    assert_eq!(diagnostics.count(DiagnosticKind::VersionMismatch), 1);
}

#[test]
fn test_unresolved_reference_is_recorded() {
    let (index, _) = index("");
    let mut diagnostics = Diagnostics::new();
    assert!(index.resolve(&Guid::new("ghost"), &mut diagnostics).is_none());
    assert_eq!(diagnostics.count(DiagnosticKind::UnresolvedReference), 1);
}

#[test]
fn test_tightness_inheritance() {
    let body = format!(
        r#"<ocx:Panel ocx:GUIDRef="PN1" tightness="WaterTight">{}{}</ocx:Panel>
<ocx:Panel ocx:GUIDRef="PN2">{}</ocx:Panel>{}"#,
        part("Plate", "OWN", "Own", "").replace("name=", r#"tightness="GasTight" name="#),
        part("Plate", "INH", "Inherited", ""),
        part("Plate", "BARE", "Bare", ""),
        part("Plate", "ROOT", "Root", ""),
    );
    let (index, _) = index(&body);
    assert_eq!(index.tightness(&Guid::new("OWN")), "GasTight");
    assert_eq!(index.tightness(&Guid::new("INH")), "WaterTight");
    assert_eq!(index.tightness(&Guid::new("BARE")), UNDEFINED_TIGHTNESS);
    assert_eq!(index.tightness(&Guid::new("ROOT")), UNDEFINED_TIGHTNESS);
    assert_eq!(index.tightness(&Guid::new("MISSING")), UNDEFINED_TIGHTNESS);
}

#[test]
fn test_structure_part_and_material() {
    let body = format!(
        "{}{}",
        material("MAT1", "NV-NS"),
        part(
            "Plate",
            "P1",
            "DeckPlate",
            &format!(
                "{}{}",
                physical_properties(1250.0),
                plate_material(Some("MAT1"), Some(0.015))
            )
        ),
    );
    let (index, _) = index(&body);
    let mut diagnostics = Diagnostics::new();
    let plate = index
        .structure_part(&Guid::new("P1"), &mut diagnostics)
        .unwrap();
    assert_eq!(plate.kind, PartKind::Plate);
    assert_eq!(plate.name, "DeckPlate");
    assert_eq!(plate.dry_weight(), Some(1250.0));

    let element = index.get_object(&Guid::new("P1")).unwrap();
    let material = index.part_material(element).unwrap().unwrap();
    assert_eq!(material.grade.as_deref(), Some("NV-NS"));
    assert_eq!(material.density, Some(7850.0));
    assert_eq!(material.thickness, Some(0.015));
    assert!(material.missing_properties().is_empty());
}

#[test]
fn test_thickness_default_records_one_diagnostic() {
    let body = part("Plate", "P1", "Thin", &plate_material(Some("MAT1"), None));
    let (index, _) = index(&body);
    let tags = index.tags();
    let plate = index.get_object(&Guid::new("P1")).unwrap();

    let mut diagnostics = Diagnostics::new();
    let value = thickness(plate.child(&tags.platematerial), plate, tags, &mut diagnostics);
    assert_eq!(value, DEFAULT_THICKNESS);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.count(DiagnosticKind::MissingOptionalElement), 1);

    let mut diagnostics = Diagnostics::new();
    assert_eq!(
        thickness(None, plate, tags, &mut diagnostics),
        DEFAULT_THICKNESS
    );
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_import_from_files() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("OCX_Schema.xsd");
    let model_path = dir.path().join("model.3docx");
    std::fs::write(&schema_path, schema_xsd()).unwrap();
    let mut file = std::fs::File::create(&model_path).unwrap();
    file.write_all(model(&nested_panels()).as_bytes()).unwrap();

    let mut diagnostics = Diagnostics::new();
    let index = import_model(&model_path, &schema_path, &mut diagnostics).unwrap();
    assert_eq!(index.source_path(), Some(model_path.as_path()));
    assert_eq!(index.count(Category::Stiffener), 1);

    let err = import_model(dir.path().join("absent.3docx"), &schema_path, &mut diagnostics)
        .unwrap_err();
    assert!(matches!(err, Error::MissingFile(_)));
    let err = import_model(&model_path, dir.path().join("absent.xsd"), &mut diagnostics)
        .unwrap_err();
    assert!(matches!(err, Error::SchemaNotFound(_)));
}
