//! End-to-end tests over synthetic presentations.
//!
//! Each test assembles a complete .pptx package in memory, runs the
//! file-level anonymize pipeline through a temp directory, and inspects
//! the output package.

use deckmask::pptx::PptxFile;
use deckmask::{anonymize_file, Error, FrameLayout, Paragraph, Run, Shape, TextFrame};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#;

const THEME: &str = r#"<?xml version="1.0"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office"/>"#;

const SLD_NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006""#;

/// Assemble a package whose slides carry the given part bodies, in order.
fn build_pptx(slides: &[&str]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(CONTENT_TYPES.as_bytes()).unwrap();

    let mut sld_ids = String::new();
    let mut rels = String::new();
    for i in 0..slides.len() {
        sld_ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            256 + i,
            i + 2
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="s" Target="slides/slide{}.xml"/>"#,
            i + 2,
            i + 1
        ));
    }

    zip.start_file("ppt/presentation.xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0"?><p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><p:sldIdLst>{sld_ids}</p:sldIdLst></p:presentation>"#
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("ppt/_rels/presentation.xml.rels", options)
        .unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="t" Target="theme/theme1.xml"/>{rels}</Relationships>"#
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("ppt/theme/theme1.xml", options).unwrap();
    zip.write_all(THEME.as_bytes()).unwrap();

    for (i, body) in slides.iter().enumerate() {
        zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
            .unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0"?><p:sld {SLD_NS}><p:cSld><p:spTree>{body}</p:spTree></p:cSld></p:sld>"#
            )
            .as_bytes(),
        )
        .unwrap();
    }

    zip.finish().unwrap().into_inner()
}

fn text_box(runs: &str) -> String {
    format!(
        r#"<p:sp><p:spPr><a:xfrm><a:off x="100" y="200"/><a:ext cx="914400" cy="457200"/></a:xfrm></p:spPr><p:txBody><a:bodyPr wrap="none" lIns="91440"><a:normAutofit/></a:bodyPr><a:p>{runs}</a:p></p:txBody></p:sp>"#
    )
}

fn run(text: &str) -> String {
    format!("<a:r><a:t>{text}</a:t></a:r>")
}

/// Run the pipeline in a temp dir and return the anonymized slide parts.
fn anonymize(data: Vec<u8>) -> (deckmask::ScrubSummary, Vec<u8>) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("deck.pptx");
    let output = dir.path().join("deck_anonymized.pptx");
    std::fs::write(&input, data).unwrap();

    let summary = anonymize_file(&input, &output).unwrap();
    let out_bytes = std::fs::read(&output).unwrap();
    (summary, out_bytes)
}

fn read_part(package: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(package.to_vec())).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}

#[test]
fn test_text_masked_lengths_and_case_preserved() {
    let data = build_pptx(&[&text_box(&run("Board Meeting 2024: Q3 results"))]);
    let (summary, out) = anonymize(data);

    assert_eq!(summary.slides, 1);
    assert_eq!(summary.runs_rewritten, 1);

    let slide = read_part(&out, "ppt/slides/slide1.xml");
    assert!(slide.contains("<a:t>Xxxxx Xxxxxxx xxxx: Xx xxxxxxx</a:t>"));
    // Shape geometry and body properties are untouched.
    assert!(slide.contains(r#"<a:off x="100" y="200"/>"#));
    assert!(slide.contains(r#"<a:bodyPr wrap="none" lIns="91440">"#));
    assert!(slide.contains("<a:normAutofit/>"));
}

#[test]
fn test_fonts_survive_and_rgb_color_kept() {
    let body = text_box(
        r#"<a:r><a:rPr lang="en-US" sz="2400" b="1" i="0" u="sng"><a:solidFill><a:srgbClr val="C00000"/></a:solidFill><a:latin typeface="Arial"/></a:rPr><a:t>Confidential</a:t></a:r>"#,
    );
    let (_, out) = anonymize(build_pptx(&[&body]));

    let slide = read_part(&out, "ppt/slides/slide1.xml");
    assert!(slide.contains(r#"<a:rPr lang="en-US" sz="2400" b="1" i="0" u="sng">"#));
    assert!(slide.contains(r#"<a:solidFill><a:srgbClr val="C00000"/></a:solidFill>"#));
    assert!(slide.contains(r#"<a:latin typeface="Arial"/>"#));
    assert!(slide.contains("<a:t>Xxxxxxxxxxxx</a:t>"));
}

#[test]
fn test_scheme_color_recovered_from_raw_markup() {
    // The only fill lives under the outline; the structured view never
    // surfaces it, so the raw fallback has to.
    let body = text_box(
        r#"<a:r><a:rPr><a:ln w="9525"><a:solidFill><a:schemeClr val="accent3"/></a:solidFill></a:ln></a:rPr><a:t>Outlined text</a:t></a:r>"#,
    );
    let (_, out) = anonymize(build_pptx(&[&body]));

    let slide = read_part(&out, "ppt/slides/slide1.xml");
    // The recovered scheme fill was added to the run properties, after
    // the outline, which keeps its own fill.
    assert!(slide.contains(
        r#"</a:ln><a:solidFill><a:schemeClr val="accent3"/></a:solidFill></a:rPr>"#
    ));
}

#[test]
fn test_unknown_scheme_slot_discarded() {
    let body = text_box(
        r#"<a:r><a:rPr><a:ln><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:rPr><a:t>Styled</a:t></a:r>"#,
    );
    let (_, out) = anonymize(build_pptx(&[&body]));

    let slide = read_part(&out, "ppt/slides/slide1.xml");
    // No run-level fill is introduced for a slot the model rejects.
    assert!(!slide.contains("</a:ln><a:solidFill>"));
    assert!(slide.contains("<a:t>Xxxxxx</a:t>"));
}

#[test]
fn test_whitespace_runs_and_fields_untouched() {
    let body = r#"<p:sp><p:txBody><a:bodyPr/><a:p><a:fld id="{1A2B}" type="slidenum"><a:t>7</a:t></a:fld><a:r><a:t>   </a:t></a:r><a:r><a:t>Title</a:t></a:r></a:p></p:txBody></p:sp>"#;
    let (summary, out) = anonymize(build_pptx(&[body]));

    assert_eq!(summary.runs_rewritten, 1);
    let slide = read_part(&out, "ppt/slides/slide1.xml");
    assert!(slide.contains("<a:t>7</a:t>"));
    assert!(slide.contains("<a:t>   </a:t>"));
    assert!(slide.contains("<a:t>Xxxxx</a:t>"));
}

#[test]
fn test_nested_groups_and_table() {
    let grouped = format!(
        r#"<p:grpSp><p:grpSpPr/><p:grpSp><p:grpSpPr/><p:grpSp><p:grpSpPr/>{}</p:grpSp></p:grpSp></p:grpSp>"#,
        text_box(&run("Deeply nested"))
    );
    let table = r#"<p:graphicFrame><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblGrid><a:gridCol w="3000"/><a:gridCol w="3000"/></a:tblGrid><a:tr h="370"><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>Revenue</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:bodyPr/><a:p><a:r><a:t>$1,234</a:t></a:r></a:p></a:txBody></a:tc></a:tr></a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#;
    let (summary, out) = anonymize(build_pptx(&[&grouped, table]));

    assert_eq!(summary.slides, 2);
    assert_eq!(summary.runs_rewritten, 3);

    let slide1 = read_part(&out, "ppt/slides/slide1.xml");
    assert!(slide1.contains("<a:t>Xxxxxx xxxxxx</a:t>"));
    assert_eq!(slide1.matches("<p:grpSp>").count(), 3);

    let slide2 = read_part(&out, "ppt/slides/slide2.xml");
    assert!(slide2.contains("<a:t>Xxxxxxx</a:t>"));
    assert!(slide2.contains("<a:t>$x,xxx</a:t>"));
    // Table geometry survives.
    assert_eq!(slide2.matches("<a:gridCol").count(), 2);
    assert!(slide2.contains(r#"<a:tr h="370">"#));
}

#[test]
fn test_non_slide_parts_copied_byte_identical() {
    let data = build_pptx(&[&text_box(&run("Some text"))]);
    let (_, out) = anonymize(data.clone());

    for part in ["[Content_Types].xml", "ppt/theme/theme1.xml", "ppt/presentation.xml"] {
        assert_eq!(read_part(&data, part), read_part(&out, part), "{part}");
    }
}

#[test]
fn test_output_reopens_as_valid_presentation() {
    let data = build_pptx(&[
        &text_box(&run("First slide")),
        &text_box(&run("Second slide")),
    ]);
    let (_, out) = anonymize(data);

    let reopened = PptxFile::from_bytes(out).unwrap();
    let presentation = reopened.parse().unwrap();
    assert_eq!(presentation.slides.len(), 2);
    assert_eq!(presentation.slides[0].runs()[0].text, "Xxxxx xxxxx");
    assert_eq!(presentation.slides[1].runs()[0].text, "Xxxxxx xxxxx");
}

#[test]
fn test_invalid_input_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("not_a_deck.pptx");
    let output = dir.path().join("out.pptx");
    std::fs::write(&input, b"plain text, not a zip").unwrap();

    let err = anonymize_file(&input, &output).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(!output.exists());
}

#[test]
fn test_walk_failure_leaves_no_output() {
    let data = build_pptx(&[&text_box(&run("Original"))]);
    let file = PptxFile::from_bytes(data).unwrap();
    let mut presentation = file.parse().unwrap();

    // Desync the model from its source markup: an extra dirty run has no
    // run element to pair with, so re-serialization must fail.
    presentation.slides[0].shapes.push(Shape::TextBox(TextFrame {
        layout: FrameLayout::default(),
        paragraphs: vec![Paragraph {
            runs: vec![Run {
                text: "Xxxxxxx".to_string(),
                dirty: true,
                ..Default::default()
            }],
        }],
    }));

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.pptx");

    let err = file.save(&presentation, &output).unwrap_err();
    assert!(matches!(err, Error::Processing(_)));
    assert!(!output.exists());
}

#[test]
fn test_missing_input_rejected_before_touching_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.pptx");

    let err = anonymize_file(dir.path().join("absent.pptx"), &output).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(!output.exists());
}
