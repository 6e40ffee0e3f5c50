//! PPTX package handling.
//!
//! [`PptxFile`] ties the pieces together: it opens the package, resolves
//! the slide parts in presentation order, parses them into the model,
//! and writes an edited copy back out. Slide order comes from
//! `ppt/presentation.xml` (`p:sldId` → `r:id`) joined with the targets
//! in `ppt/_rels/presentation.xml.rels`; parts the transform never
//! touches are copied from the source archive untouched.

pub mod parser;
pub mod writer;

use crate::container::PptxContainer;
use crate::detect;
use crate::error::{Error, Result};
use crate::model::{Presentation, Slide};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::path::Path;

/// An opened .pptx package with its slide parts resolved.
#[derive(Debug)]
pub struct PptxFile {
    container: PptxContainer,
    slide_paths: Vec<String>,
}

impl PptxFile {
    /// Open a presentation from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Open a presentation from in-memory bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        detect::validate_pptx_bytes(&data)?;
        let container = PptxContainer::from_bytes(data)?;
        let slide_paths = resolve_slide_paths(&container)?;
        Ok(Self {
            container,
            slide_paths,
        })
    }

    /// Slide part paths in presentation order.
    pub fn slide_paths(&self) -> &[String] {
        &self.slide_paths
    }

    /// Parse every slide into the presentation model.
    pub fn parse(&self) -> Result<Presentation> {
        let mut slides = Vec::with_capacity(self.slide_paths.len());
        for part_path in &self.slide_paths {
            let source_xml = self.container.read_xml(part_path)?;
            let shapes = parser::parse_slide_xml(&source_xml)?;
            slides.push(Slide {
                part_path: part_path.clone(),
                source_xml,
                shapes,
            });
        }
        Ok(Presentation { slides })
    }

    /// Write the presentation to `dest`.
    ///
    /// Only slides carrying dirty runs are re-serialized; every other
    /// archive entry is copied raw from the source. The destination is
    /// written in a single operation after the whole package has been
    /// assembled, so a failure anywhere leaves no partial file behind.
    pub fn save(&self, presentation: &Presentation, dest: impl AsRef<Path>) -> Result<()> {
        let mut replacements = HashMap::new();
        for slide in &presentation.slides {
            if slide.is_dirty() {
                let xml = writer::rewrite_slide_xml(slide)?;
                replacements.insert(slide.part_path.clone(), xml);
            }
        }
        self.container.save_with_replacements(dest, &replacements)
    }
}

/// Resolve slide part paths in the order `p:sldIdLst` declares them.
fn resolve_slide_paths(container: &PptxContainer) -> Result<Vec<String>> {
    let rels = parse_presentation_rels(container)?;
    let rel_ids = parse_slide_rel_ids(container)?;

    let mut paths = Vec::with_capacity(rel_ids.len());
    for rel_id in &rel_ids {
        let target = rels.get(rel_id).ok_or_else(|| {
            Error::MissingComponent(format!("relationship {rel_id} in presentation rels"))
        })?;
        paths.push(normalize_part_path(target));
    }
    Ok(paths)
}

/// Rels targets are relative to `ppt/`; a few producers emit
/// package-absolute targets instead.
fn normalize_part_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("ppt/{target}")
    }
}

/// Parse `ppt/_rels/presentation.xml.rels` into an Id → Target map.
fn parse_presentation_rels(container: &PptxContainer) -> Result<HashMap<String, String>> {
    let xml = container.read_xml("ppt/_rels/presentation.xml.rels")?;
    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut rels = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value()?.into_owned()),
                        b"Target" => target = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    rels.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

/// Parse `ppt/presentation.xml` for the `r:id` of each `p:sldId`, in
/// document order.
fn parse_slide_rel_ids(container: &PptxContainer) -> Result<Vec<String>> {
    let xml = container.read_xml("ppt/presentation.xml")?;
    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut rel_ids = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                for attr in e.attributes().flatten() {
                    // The relationship attribute is r:id; the bare id
                    // attribute is the slide's own numeric id.
                    if attr.key.local_name().as_ref() == b"id" && attr.key.as_ref() != b"id" {
                        rel_ids.push(attr.unescape_value()?.into_owned());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rel_ids)
}
