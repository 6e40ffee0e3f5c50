//! In-memory presentation model.
//!
//! The parser converts slide XML into these structures, the scrubber
//! mutates run text and color in place, and the writer splices the edits
//! back into the original XML. The model deliberately carries only what
//! the transform needs to read or rewrite; everything else stays in the
//! slide's source XML and round-trips untouched.

mod color;

pub use color::{Color, RawFill, RgbColor, ThemeSlot};

use serde::{Deserialize, Serialize};

/// A loaded presentation: ordered slides.
///
/// Owned by the caller; the scrubber only ever mutates runs within it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Presentation {
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Total number of runs across all slides.
    pub fn run_count(&self) -> usize {
        self.slides.iter().map(|s| s.run_count()).sum()
    }
}

/// One slide: its package part path, source XML, and parsed shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slide {
    /// Part path inside the package, e.g. `ppt/slides/slide1.xml`.
    pub part_path: String,

    /// The original part XML, kept so unedited content re-serializes
    /// byte-for-byte.
    #[serde(skip)]
    pub source_xml: String,

    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Iterate all runs in document order, including group and table
    /// nesting. This order matches the order of run elements in the
    /// slide XML, which the writer relies on.
    pub fn runs(&self) -> Vec<&Run> {
        let mut out = Vec::new();
        for shape in &self.shapes {
            shape.collect_runs(&mut out);
        }
        out
    }

    /// Number of runs on this slide.
    pub fn run_count(&self) -> usize {
        self.runs().len()
    }

    /// Whether any run on this slide has been rewritten.
    pub fn is_dirty(&self) -> bool {
        self.runs().iter().any(|r| r.dirty)
    }
}

/// A slide shape, dispatched exhaustively by the walker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Shape {
    /// A shape owning one text frame.
    TextBox(TextFrame),
    /// A group of child shapes, arbitrarily nested.
    Group(Vec<Shape>),
    /// A table of cells, each owning one text frame.
    Table(Table),
    /// Pictures, charts, connectors, unparsed content. Inert.
    Other,
}

impl Shape {
    fn collect_runs<'a>(&'a self, out: &mut Vec<&'a Run>) {
        match self {
            Shape::TextBox(frame) => frame.collect_runs(out),
            Shape::Group(children) => {
                for child in children {
                    child.collect_runs(out);
                }
            }
            Shape::Table(table) => {
                for row in &table.rows {
                    for cell in &row.cells {
                        cell.frame.collect_runs(out);
                    }
                }
            }
            Shape::Other => {}
        }
    }
}

/// Text-frame auto-size behavior from `<a:bodyPr>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoSize {
    /// `<a:noAutofit/>`
    None,
    /// `<a:normAutofit/>` - shrink text on overflow
    ShrinkText,
    /// `<a:spAutoFit/>` - grow the shape to fit
    FitShape,
}

/// Frame-level layout properties that must survive the round trip.
///
/// The walker reads these and reassigns them unchanged around the run
/// rewrite; the writer never touches `<a:bodyPr>`, so preservation also
/// holds at the byte level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameLayout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_size: Option<AutoSize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_wrap: Option<bool>,

    /// Left inset in EMUs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<i64>,

    /// Right inset in EMUs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<i64>,
}

/// A text frame: layout properties plus ordered paragraphs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextFrame {
    #[serde(default)]
    pub layout: FrameLayout,

    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    fn collect_runs<'a>(&'a self, out: &mut Vec<&'a Run>) {
        for para in &self.paragraphs {
            out.extend(para.runs.iter());
        }
    }

    /// Plain text of the frame, paragraphs joined by newlines.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table: ordered rows of cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count from the first row.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }
}

/// One table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

/// One table cell owning a text frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub frame: TextFrame,
}

/// A paragraph: ordered runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Paragraph {
    /// Get the plain text content.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// The smallest unit of text sharing one formatting state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Run {
    /// The text content. Rewritten in place by the scrubber, preserving
    /// character count.
    pub text: String,

    /// Structured formatting from `a:rPr`, absent when the run has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,

    /// First solid fill found anywhere under the run element; the Tier-2
    /// raw-markup view consulted during color resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_fill: Option<RawFill>,

    /// Set once the run has been rewritten; the writer only edits dirty
    /// runs.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dirty: bool,
}

impl Run {
    /// Create a plain run with no formatting.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Whether the text trims to empty. Such runs never enter the
    /// rewrite path.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Run-level font state. Only `color` is ever re-resolved; the rest is
/// read and reapplied verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Typeface name from `<a:latin>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Size in centipoints (e.g. 1800 = 18pt).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,

    #[serde(default, skip_serializing_if = "is_unset")]
    pub color: Color,
}

fn is_unset(color: &Color) -> bool {
    *color == Color::Unset
}
