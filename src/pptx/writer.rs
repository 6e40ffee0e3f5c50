//! Slide XML rewriting.
//!
//! Re-emits the original slide part event-by-event, splicing in the new
//! run text and the resolved fill for every dirty run. Anything that is
//! not the text or fill of a dirty run is written back exactly as read,
//! so shape geometry, body properties, paragraph properties, and all
//! markup the parser never modeled survive unchanged.
//!
//! Edits are paired with run elements positionally: the writer counts
//! `a:r` elements inside text bodies (skipping fields and
//! `mc:AlternateContent`, exactly as the parser does), in document
//! order. A count mismatch aborts before anything is persisted.

use crate::error::{Error, Result};
use crate::model::Slide;
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

struct RunEdit {
    dirty: bool,
    text: String,
    fill_xml: Option<String>,
}

fn collect_edits(slide: &Slide) -> Vec<RunEdit> {
    slide
        .runs()
        .iter()
        .map(|run| RunEdit {
            dirty: run.dirty,
            text: run.text.clone(),
            fill_xml: if run.dirty {
                run.font.as_ref().and_then(|f| f.color.to_solid_fill_xml())
            } else {
                None
            },
        })
        .collect()
}

/// Fill-group children of `a:rPr`; at most one may be present, and a
/// resolved color replaces whichever one is there.
fn is_fill_local(local: &[u8]) -> bool {
    matches!(
        local,
        b"solidFill" | b"noFill" | b"gradFill" | b"blipFill" | b"pattFill" | b"grpFill"
    )
}

/// Rewrite a slide part, applying the edits carried by its dirty runs.
pub fn rewrite_slide_xml(slide: &Slide) -> Result<Vec<u8>> {
    let edits = collect_edits(slide);
    let mut reader = Reader::from_str(&slide.source_xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut txbody_depth = 0usize;
    // Depth of fld / AlternateContent nesting; runs inside are not edited.
    let mut skip_depth = 0usize;
    let mut in_run = false;
    let mut in_rpr = false;
    let mut in_text = false;
    let mut text_written = false;
    let mut run_dirty = false;
    let mut replacement_text = String::new();
    let mut pending_fill: Option<String> = None;
    let mut next_edit = 0usize;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"txBody" => {
                        txbody_depth += 1;
                        writer.write_event(event.borrow())?;
                    }
                    b"AlternateContent" | b"fld" => {
                        skip_depth += 1;
                        writer.write_event(event.borrow())?;
                    }
                    b"r" if txbody_depth > 0 && skip_depth == 0 && !in_run => {
                        let edit = edits
                            .get(next_edit)
                            .ok_or_else(run_count_mismatch)?;
                        next_edit += 1;
                        in_run = true;
                        run_dirty = edit.dirty;
                        replacement_text = edit.text.clone();
                        pending_fill = edit.fill_xml.clone();
                        writer.write_event(event.borrow())?;
                    }
                    b"rPr" if in_run && pending_fill.is_some() => {
                        in_rpr = true;
                        writer.write_event(event.borrow())?;
                    }
                    b"t" if in_run && !in_rpr => {
                        in_text = true;
                        text_written = false;
                        writer.write_event(event.borrow())?;
                    }
                    _ if in_rpr => {
                        // Direct child of rPr while a fill insert is due.
                        if is_fill_local(local.as_ref()) {
                            // Replace the existing fill in place.
                            let fill = pending_fill.take().unwrap_or_default();
                            write_raw(&mut writer, &fill)?;
                            reader.read_to_end(e.name())?;
                        } else if local.as_ref() == b"ln" {
                            // The outline sorts before the fill group;
                            // keep the pending fill waiting.
                            let name = e.name().as_ref().to_vec();
                            writer.write_event(event.borrow())?;
                            copy_subtree(&mut reader, &mut writer, &name)?;
                        } else {
                            // First child past the fill position: the
                            // fill goes in front of it.
                            if let Some(fill) = pending_fill.take() {
                                write_raw(&mut writer, &fill)?;
                            }
                            let name = e.name().as_ref().to_vec();
                            writer.write_event(event.borrow())?;
                            copy_subtree(&mut reader, &mut writer, &name)?;
                            in_rpr = false;
                        }
                    }
                    _ => writer.write_event(event.borrow())?,
                }
            }
            Event::Empty(e) => {
                let local = e.local_name();
                if in_rpr {
                    if is_fill_local(local.as_ref()) {
                        let fill = pending_fill.take().unwrap_or_default();
                        write_raw(&mut writer, &fill)?;
                    } else if local.as_ref() == b"ln" {
                        writer.write_event(event.borrow())?;
                    } else {
                        if let Some(fill) = pending_fill.take() {
                            write_raw(&mut writer, &fill)?;
                        }
                        writer.write_event(event.borrow())?;
                        in_rpr = false;
                    }
                } else if local.as_ref() == b"rPr" && in_run && pending_fill.is_some() {
                    // Expand <a:rPr .../> so the fill has somewhere to go.
                    let owned = e.to_owned();
                    let fill = pending_fill.take().unwrap_or_default();
                    writer.write_event(Event::Start(owned.clone()))?;
                    write_raw(&mut writer, &fill)?;
                    writer.write_event(Event::End(owned.to_end()))?;
                } else if local.as_ref() == b"r" && txbody_depth > 0 && skip_depth == 0 {
                    // A degenerate empty run still occupies an edit slot.
                    if next_edit >= edits.len() {
                        return Err(run_count_mismatch());
                    }
                    next_edit += 1;
                    writer.write_event(event.borrow())?;
                } else {
                    writer.write_event(event.borrow())?;
                }
            }
            Event::Text(_) | Event::CData(_) if in_text && run_dirty => {
                if !text_written {
                    writer.write_event(Event::Text(BytesText::new(&replacement_text)))?;
                    text_written = true;
                }
            }
            Event::End(e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"rPr" if in_rpr => {
                        // No child sorted after the fill position; the
                        // fill becomes the last child.
                        if let Some(fill) = pending_fill.take() {
                            write_raw(&mut writer, &fill)?;
                        }
                        in_rpr = false;
                        writer.write_event(event.borrow())?;
                    }
                    b"r" if in_run => {
                        in_run = false;
                        run_dirty = false;
                        pending_fill = None;
                        writer.write_event(event.borrow())?;
                    }
                    b"t" if in_text => {
                        in_text = false;
                        writer.write_event(event.borrow())?;
                    }
                    b"txBody" => {
                        txbody_depth = txbody_depth.saturating_sub(1);
                        writer.write_event(event.borrow())?;
                    }
                    b"AlternateContent" | b"fld" => {
                        skip_depth = skip_depth.saturating_sub(1);
                        writer.write_event(event.borrow())?;
                    }
                    _ => writer.write_event(event.borrow())?,
                }
            }
            Event::Eof => break,
            _ => writer.write_event(event.borrow())?,
        }
    }

    if next_edit != edits.len() {
        return Err(run_count_mismatch());
    }

    Ok(writer.into_inner().into_inner())
}

fn run_count_mismatch() -> Error {
    Error::Processing(
        "slide run count changed between parse and write".to_string(),
    )
}

/// Write pre-built markup verbatim.
fn write_raw(writer: &mut Writer<Cursor<Vec<u8>>>, markup: &str) -> Result<()> {
    writer.write_event(Event::Text(BytesText::from_escaped(markup)))?;
    Ok(())
}

/// Copy events through until the end tag matching `name`, counting
/// nested elements of the same name.
fn copy_subtree(
    reader: &mut Reader<&[u8]>,
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &[u8],
) -> Result<()> {
    let mut depth = 0usize;
    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Start(e) if e.name().as_ref() == name => depth += 1,
            Event::End(e) if e.name().as_ref() == name => {
                if depth == 0 {
                    writer.write_event(event.borrow())?;
                    return Ok(());
                }
                depth -= 1;
            }
            Event::Eof => {
                return Err(Error::XmlParse(format!(
                    "unclosed {} element",
                    String::from_utf8_lossy(name)
                )))
            }
            _ => {}
        }
        writer.write_event(event.borrow())?;
    }
}
