#![no_main]

use libfuzzer_sys::fuzz_target;
use libocx::{
    BuildOptions, Diagnostics, Document, GeometryBuilder, ModelIndex, RecordingKernel,
    SchemaDictionary, validate,
};
use std::sync::{Arc, OnceLock};

const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:ocx">
  <xs:element name="Panel"/>
  <xs:element name="Plate"/>
  <xs:element name="Bracket"/>
  <xs:element name="Stiffener"/>
  <xs:element name="Pillar"/>
  <xs:element name="FrameTables"/>
  <xs:element name="OuterContour"/>
  <xs:element name="CompositeCurve3D"/>
  <xs:element name="Line3D"/>
  <xs:element name="Circle3D"/>
  <xs:attribute name="GUIDRef"/>
</xs:schema>"#;

fn dictionary() -> Option<Arc<SchemaDictionary>> {
    static DICTIONARY: OnceLock<Option<Arc<SchemaDictionary>>> = OnceLock::new();
    DICTIONARY
        .get_or_init(|| {
            SchemaDictionary::from_str(SCHEMA, &mut Diagnostics::new())
                .ok()
                .map(Arc::new)
        })
        .clone()
}

fuzz_target!(|data: &[u8]| {
    // Indexing, validation and geometry resolution record defects as
    // diagnostics; none of them may panic on a well-formed document
    let Ok(document) = Document::from_reader(data) else {
        return;
    };
    let Some(dictionary) = dictionary() else {
        return;
    };
    let mut diagnostics = Diagnostics::new();
    let index = ModelIndex::build(document, dictionary, &mut diagnostics);
    let _ = validate(&index, &mut diagnostics);
    let mut kernel = RecordingKernel::new();
    let _ = GeometryBuilder::new(&index).build_all(
        &mut kernel,
        BuildOptions::default(),
        &mut diagnostics,
    );
});
