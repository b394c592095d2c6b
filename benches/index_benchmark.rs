use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use libocx::{BuildOptions, Diagnostics, Document, GeometryBuilder, ModelIndex, RecordingKernel};
use std::hint::black_box;

#[path = "../tests/common/mod.rs"]
mod common;

use common::*;

/// Generate a model with `panels` panels of `plates` plates each
///
/// Every plate is a rectangle with one hole, placed on a grid plane.
fn generate_model(panels: usize, plates: usize) -> String {
    let mut body = frame_table(&[("X", "FR0", 0.0), ("Z", "Z1", 2.5)]);
    body.push_str(&material("MAT1", "NV-NS"));
    for p in 0..panels {
        body.push_str(&format!(
            r#"<ocx:Panel ocx:GUIDRef="PN{0}" name="Panel{0}" tightness="WaterTight"><ocx:ComposedOf>"#,
            p
        ));
        for i in 0..plates {
            body.push_str(&plate_with_hole(
                &format!("P{}-{}", p, i),
                &format!("Plate{}_{}", p, i),
                0.01,
            ));
        }
        body.push_str("</ocx:ComposedOf></ocx:Panel>");
    }
    model(&body)
}

fn bench_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");
    let dictionary = dictionary();

    for &(panels, plates) in &[(10, 10), (50, 20), (100, 50)] {
        let xml = generate_model(panels, plates);
        group.bench_with_input(
            BenchmarkId::new("panels_plates", format!("{}p_{}pl", panels, plates)),
            &xml,
            |b, xml| {
                b.iter(|| {
                    let document = Document::parse_str(xml).unwrap();
                    let mut diagnostics = Diagnostics::new();
                    black_box(ModelIndex::build(
                        document,
                        dictionary.clone(),
                        &mut diagnostics,
                    ))
                });
            },
        );
    }

    group.finish();
}

fn bench_build_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_geometry");
    group.sample_size(20);

    for &(panels, plates) in &[(10, 10), (50, 20)] {
        let document = Document::parse_str(&generate_model(panels, plates)).unwrap();
        let index = ModelIndex::build(document, dictionary(), &mut Diagnostics::new());
        group.bench_with_input(
            BenchmarkId::new("panels_plates", format!("{}p_{}pl", panels, plates)),
            &index,
            |b, index| {
                b.iter(|| {
                    let mut kernel = RecordingKernel::new();
                    let mut diagnostics = Diagnostics::new();
                    black_box(GeometryBuilder::new(index).build_all(
                        &mut kernel,
                        BuildOptions::default(),
                        &mut diagnostics,
                    ))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_build_index, bench_build_geometry);
criterion_main!(benches);
