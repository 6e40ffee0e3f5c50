//! Slide XML parsing.
//!
//! Streams a slide part into the presentation model. Parsing is
//! deliberately shallow: only the containers the scrubber walks (text
//! boxes, groups, tables) and the run state it reads (text, `a:rPr`
//! attributes, solid fills) are materialized. Everything else is skipped
//! here and round-trips through the writer untouched.
//!
//! The enumeration order of runs must match the document order of `a:r`
//! elements in the XML; the writer pairs edits positionally.

use crate::error::{Error, Result};
use crate::model::{
    AutoSize, Color, Font, FrameLayout, Paragraph, RawFill, RgbColor, Run, Shape, Table,
    TableCell, TableRow, TextFrame,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parse a slide part into its shape tree.
pub fn parse_slide_xml(xml: &str) -> Result<Vec<Shape>> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"spTree" => {
                shapes = parse_shape_children(&mut reader, b"spTree")?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

/// Parse the children of `spTree` or `grpSp` until the matching end tag.
fn parse_shape_children(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<Vec<Shape>> {
    let mut shapes = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sp" => shapes.push(parse_sp(reader)?),
                b"grpSp" => shapes.push(Shape::Group(parse_shape_children(reader, b"grpSp")?)),
                b"graphicFrame" => shapes.push(parse_graphic_frame(reader)?),
                b"nvGrpSpPr" | b"grpSpPr" => {
                    reader.read_to_end(e.name())?;
                }
                // Pictures, connectors, ink, fallback wrappers: inert.
                _ => {
                    reader.read_to_end(e.name())?;
                    shapes.push(Shape::Other);
                }
            },
            Event::Empty(_) => {}
            Event::End(e) if e.local_name().as_ref() == end => break,
            Event::Eof => {
                return Err(Error::XmlParse(format!(
                    "unclosed {} element",
                    String::from_utf8_lossy(end)
                )))
            }
            _ => {}
        }
    }

    Ok(shapes)
}

/// Parse a `p:sp`. A shape without a text body is inert.
fn parse_sp(reader: &mut Reader<&[u8]>) -> Result<Shape> {
    let mut frame = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"txBody" => frame = Some(parse_text_frame(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.local_name().as_ref() == b"sp" => break,
            Event::Eof => return Err(Error::XmlParse("unclosed sp element".to_string())),
            _ => {}
        }
    }

    Ok(match frame {
        Some(frame) => Shape::TextBox(frame),
        None => Shape::Other,
    })
}

/// Parse a `p:graphicFrame`. Only frames carrying `a:tbl` become tables;
/// charts, SmartArt and OLE content live in other parts and stay inert.
fn parse_graphic_frame(reader: &mut Reader<&[u8]>) -> Result<Shape> {
    let mut table = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                // Descend through the graphic wrappers.
                b"graphic" | b"graphicData" => {}
                b"tbl" => table = Some(parse_table(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.local_name().as_ref() == b"graphicFrame" => break,
            Event::Eof => {
                return Err(Error::XmlParse("unclosed graphicFrame element".to_string()))
            }
            _ => {}
        }
    }

    Ok(match table {
        Some(table) => Shape::Table(table),
        None => Shape::Other,
    })
}

fn parse_table(reader: &mut Reader<&[u8]>) -> Result<Table> {
    let mut rows = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tr" => rows.push(parse_table_row(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.local_name().as_ref() == b"tbl" => break,
            Event::Eof => return Err(Error::XmlParse("unclosed tbl element".to_string())),
            _ => {}
        }
    }

    Ok(Table { rows })
}

fn parse_table_row(reader: &mut Reader<&[u8]>) -> Result<TableRow> {
    let mut cells = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tc" => cells.push(parse_table_cell(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"tc" => {
                cells.push(TableCell::default());
            }
            Event::End(e) if e.local_name().as_ref() == b"tr" => break,
            Event::Eof => return Err(Error::XmlParse("unclosed tr element".to_string())),
            _ => {}
        }
    }

    Ok(TableRow { cells })
}

fn parse_table_cell(reader: &mut Reader<&[u8]>) -> Result<TableCell> {
    let mut frame = TextFrame::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"txBody" => frame = parse_text_frame(reader)?,
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::End(e) if e.local_name().as_ref() == b"tc" => break,
            Event::Eof => return Err(Error::XmlParse("unclosed tc element".to_string())),
            _ => {}
        }
    }

    Ok(TableCell { frame })
}

/// Parse a text body (`p:txBody` on shapes, `a:txBody` in table cells).
fn parse_text_frame(reader: &mut Reader<&[u8]>) -> Result<TextFrame> {
    let mut layout = FrameLayout::default();
    let mut paragraphs = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"bodyPr" => {
                    layout = parse_body_pr_attrs(&e)?;
                    parse_body_pr_children(reader, &mut layout)?;
                }
                b"p" => paragraphs.push(parse_paragraph(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"bodyPr" => {
                layout = parse_body_pr_attrs(&e)?;
            }
            Event::End(e) if e.local_name().as_ref() == b"txBody" => break,
            Event::Eof => return Err(Error::XmlParse("unclosed txBody element".to_string())),
            _ => {}
        }
    }

    Ok(TextFrame { layout, paragraphs })
}

fn parse_body_pr_attrs(e: &BytesStart) -> Result<FrameLayout> {
    let mut layout = FrameLayout::default();

    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"wrap" => layout.word_wrap = Some(value.as_ref() != "none"),
            b"lIns" => layout.margin_left = value.parse().ok(),
            b"rIns" => layout.margin_right = value.parse().ok(),
            _ => {}
        }
    }

    Ok(layout)
}

fn parse_body_pr_children(reader: &mut Reader<&[u8]>, layout: &mut FrameLayout) -> Result<()> {
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                match e.local_name().as_ref() {
                    b"noAutofit" => layout.auto_size = Some(AutoSize::None),
                    b"normAutofit" => layout.auto_size = Some(AutoSize::ShrinkText),
                    b"spAutoFit" => layout.auto_size = Some(AutoSize::FitShape),
                    _ => {}
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"bodyPr" => break,
            Event::Eof => return Err(Error::XmlParse("unclosed bodyPr element".to_string())),
            _ => {}
        }
    }
    Ok(())
}

fn parse_paragraph(reader: &mut Reader<&[u8]>) -> Result<Paragraph> {
    let mut runs = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => runs.push(parse_run(reader)?),
                // Fields and line breaks are not eligible runs.
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"r" => {
                runs.push(Run::default());
            }
            Event::End(e) if e.local_name().as_ref() == b"p" => break,
            Event::Eof => return Err(Error::XmlParse("unclosed p element".to_string())),
            _ => {}
        }
    }

    Ok(Paragraph { runs })
}

fn parse_run(reader: &mut Reader<&[u8]>) -> Result<Run> {
    let mut run = Run::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rPr" => {
                    let attrs_font = parse_run_property_attrs(&e)?;
                    let (font, raw_fill) = parse_run_property_children(reader, attrs_font)?;
                    run.font = Some(font);
                    run.raw_fill = raw_fill;
                }
                b"t" => run.text = read_element_text(reader, b"t")?,
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"rPr" => run.font = Some(parse_run_property_attrs(&e)?),
                b"t" => run.text = String::new(),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"r" => break,
            Event::Eof => return Err(Error::XmlParse("unclosed r element".to_string())),
            _ => {}
        }
    }

    Ok(run)
}

fn read_element_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<String> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
            Event::End(e) if e.local_name().as_ref() == end => break,
            Event::Eof => return Err(Error::XmlParse("unclosed text element".to_string())),
            _ => {}
        }
    }
    Ok(text)
}

fn parse_run_property_attrs(e: &BytesStart) -> Result<Font> {
    let mut font = Font::default();

    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            b"sz" => font.size = value.parse().ok(),
            b"b" => font.bold = parse_ooxml_bool(&value),
            b"i" => font.italic = parse_ooxml_bool(&value),
            b"u" => font.underline = Some(value.as_ref() != "none"),
            _ => {}
        }
    }

    Ok(font)
}

fn parse_ooxml_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Parse the children of `a:rPr`.
///
/// The structured color comes only from a solid fill that is a *direct*
/// child of `rPr`; the raw-markup view takes the first solid fill at any
/// depth (it can sit under `a:ln`, `a:highlight`, or an underline fill,
/// where the structured accessor never looks). Both views may name the
/// same element, which is fine: Tier 2 then overrides Tier 1 with the
/// identical value.
fn parse_run_property_children(
    reader: &mut Reader<&[u8]>,
    mut font: Font,
) -> Result<(Font, Option<RawFill>)> {
    let mut raw_fill: Option<RawFill> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"solidFill" if depth == 0 || raw_fill.is_none() => {
                    let (raw, structured) = parse_solid_fill(reader)?;
                    if depth == 0 {
                        font.color = structured;
                    }
                    if raw_fill.is_none() {
                        raw_fill = Some(raw);
                    }
                }
                b"latin" => {
                    font.name = typeface_attr(&e).or(font.name);
                    depth += 1;
                }
                _ => depth += 1,
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"solidFill" if raw_fill.is_none() => {
                    // A fill with no color child; present but empty.
                    raw_fill = Some(RawFill::Other);
                }
                b"latin" => font.name = typeface_attr(&e).or(font.name),
                _ => {}
            },
            Event::End(e) => {
                if depth == 0 && e.local_name().as_ref() == b"rPr" {
                    break;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => return Err(Error::XmlParse("unclosed rPr element".to_string())),
            _ => {}
        }
    }

    Ok((font, raw_fill))
}

fn typeface_attr(e: &BytesStart) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        (attr.key.as_ref() == b"typeface")
            .then(|| String::from_utf8_lossy(&attr.value).to_string())
    })
}

/// Parse one `a:solidFill`, returning both the raw view and the
/// structured classification of its color child.
///
/// Only `srgbClr` and `schemeClr` are classified; anything else
/// (`sysClr`, `prstClr`, ...) leaves the fill as [`RawFill::Other`].
fn parse_solid_fill(reader: &mut Reader<&[u8]>) -> Result<(RawFill, Color)> {
    let mut raw = RawFill::Other;
    let mut structured = Color::Unset;
    let mut lum_mod: Option<f64> = None;
    let mut lum_off: Option<f64> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                classify_fill_child(&e, depth, &mut raw, &mut structured, &mut lum_mod, &mut lum_off);
                depth += 1;
            }
            Event::Empty(e) => {
                classify_fill_child(&e, depth, &mut raw, &mut structured, &mut lum_mod, &mut lum_off);
            }
            Event::End(e) => {
                if depth == 0 && e.local_name().as_ref() == b"solidFill" {
                    break;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => return Err(Error::XmlParse("unclosed solidFill element".to_string())),
            _ => {}
        }
    }

    if let Color::Theme { brightness, .. } = &mut structured {
        let b = if let Some(off) = lum_off {
            off / 100_000.0
        } else if let Some(m) = lum_mod {
            m / 100_000.0 - 1.0
        } else {
            0.0
        };
        if b != 0.0 {
            *brightness = Some(b as f32);
        }
    }

    Ok((raw, structured))
}

fn classify_fill_child(
    e: &BytesStart,
    depth: usize,
    raw: &mut RawFill,
    structured: &mut Color,
    lum_mod: &mut Option<f64>,
    lum_off: &mut Option<f64>,
) {
    match e.local_name().as_ref() {
        b"srgbClr" if depth == 0 && matches!(raw, RawFill::Other) => {
            if let Some(rgb) = val_attr(e).and_then(|v| RgbColor::from_hex(&v).ok()) {
                *raw = RawFill::Rgb(rgb);
                *structured = Color::Rgb(rgb);
            }
        }
        b"schemeClr" if depth == 0 && matches!(raw, RawFill::Other) => {
            if let Some(val) = val_attr(e) {
                if let Ok(slot) = val.parse() {
                    *structured = Color::Theme {
                        slot,
                        brightness: None,
                    };
                }
                *raw = RawFill::Scheme(val);
            }
        }
        // Luminance children of the scheme color carry brightness.
        b"lumMod" if depth == 1 => {
            *lum_mod = val_attr(e).and_then(|v| v.parse().ok());
        }
        b"lumOff" if depth == 1 => {
            *lum_off = val_attr(e).and_then(|v| v.parse().ok());
        }
        _ => {}
    }
}

fn val_attr(e: &BytesStart) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        (attr.key.as_ref() == b"val").then(|| String::from_utf8_lossy(&attr.value).to_string())
    })
}
