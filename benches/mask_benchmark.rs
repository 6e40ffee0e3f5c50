//! Benchmarks for deckmask anonymization performance.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use deckmask::model::Presentation;
use deckmask::pptx::{parser, writer};
use deckmask::scrub::{anonymize_presentation, mask_text};

/// Builds a slide part with the given number of text runs.
fn create_test_slide(run_count: usize) -> String {
    let mut xml = String::from(
        r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>"#,
    );
    for i in 0..run_count {
        xml.push_str(&format!(
            r#"<p:sp><p:txBody><a:bodyPr/><a:p><a:r><a:rPr sz="1800" b="1"><a:solidFill><a:srgbClr val="1F4E79"/></a:solidFill></a:rPr><a:t>Benchmark run number {i} with some filler text.</a:t></a:r></a:p></p:txBody></p:sp>"#
        ));
    }
    xml.push_str("</p:spTree></p:cSld></p:sld>");
    xml
}

fn bench_mask_text(c: &mut Criterion) {
    let short = "Quarterly Revenue: $4.2M";
    let long = short.repeat(100);

    let mut group = c.benchmark_group("mask_text");
    group.throughput(Throughput::Bytes(short.len() as u64));
    group.bench_function("short", |b| b.iter(|| mask_text(black_box(short))));
    group.throughput(Throughput::Bytes(long.len() as u64));
    group.bench_function("long", |b| b.iter(|| mask_text(black_box(&long))));
    group.finish();
}

fn bench_parse_slide(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_slide");
    for run_count in [10, 100, 1000] {
        let xml = create_test_slide(run_count);
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(run_count), &xml, |b, xml| {
            b.iter(|| parser::parse_slide_xml(black_box(xml)).unwrap());
        });
    }
    group.finish();
}

fn bench_anonymize_and_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("anonymize_rewrite");
    for run_count in [10, 100, 1000] {
        let xml = create_test_slide(run_count);
        let shapes = parser::parse_slide_xml(&xml).unwrap();
        let slide = deckmask::model::Slide {
            part_path: "ppt/slides/slide1.xml".to_string(),
            source_xml: xml.clone(),
            shapes,
        };
        group.throughput(Throughput::Bytes(xml.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(run_count),
            &slide,
            |b, slide| {
                b.iter(|| {
                    let mut presentation = Presentation {
                        slides: vec![slide.clone()],
                    };
                    anonymize_presentation(&mut presentation);
                    writer::rewrite_slide_xml(black_box(&presentation.slides[0])).unwrap()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_mask_text,
    bench_parse_slide,
    bench_anonymize_and_rewrite
);
criterion_main!(benches);
