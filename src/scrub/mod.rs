//! The anonymize operation.
//!
//! `anonymize_presentation` is the in-memory transform;
//! `anonymize_file` is the single load → transform → save boundary at
//! which every internal failure surfaces as one [`crate::Error`]. The
//! output file is only written after the full transform and
//! re-serialization succeed, so a failure leaves no partial output.

mod run;
mod text;
mod walker;

pub use run::rewrite_run;
pub use text::{mask_char, mask_text};
pub use walker::walk_shape;

use crate::detect;
use crate::error::Result;
use crate::model::Presentation;
use crate::pptx::PptxFile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Counters accumulated over one anonymization pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrubSummary {
    /// Slides iterated.
    pub slides: usize,

    /// Shapes visited, including nested group children.
    pub shapes_visited: usize,

    /// Runs whose text was rewritten.
    pub runs_rewritten: usize,

    /// Destination path, present after a successful save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ScrubSummary {
    /// Human-readable confirmation for the success path.
    pub fn message(&self) -> String {
        match &self.output {
            Some(dest) => format!(
                "Anonymized {} runs across {} slides; saved to: {}",
                self.runs_rewritten, self.slides, dest
            ),
            None => format!(
                "Anonymized {} runs across {} slides",
                self.runs_rewritten, self.slides
            ),
        }
    }
}

/// Anonymize every run of a loaded presentation in place.
///
/// Iterates slides and shapes in order and drives the shape walk. The
/// presentation's structure (slide order, shape nesting, table geometry)
/// is never altered, only run text and run color.
pub fn anonymize_presentation(presentation: &mut Presentation) -> ScrubSummary {
    let mut summary = ScrubSummary::default();
    for slide in presentation.slides.iter_mut() {
        summary.slides += 1;
        for shape in slide.shapes.iter_mut() {
            walk_shape(shape, &mut summary);
        }
    }
    summary
}

/// Anonymize `input` and write the result to `output`.
///
/// Validates the input before anything is loaded, runs the in-memory
/// transform, then re-serializes the package. The source file is never
/// written to; the destination is written in one shot at the end.
pub fn anonymize_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<ScrubSummary> {
    let input = input.as_ref();
    let output = output.as_ref();

    detect::validate_pptx_path(input)?;

    let file = PptxFile::open(input)?;
    let mut presentation = file.parse()?;

    let mut summary = anonymize_presentation(&mut presentation);

    file.save(&presentation, output)?;
    summary.output = Some(output.display().to_string());
    Ok(summary)
}
