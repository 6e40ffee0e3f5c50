//! Per-run rewriting.

use super::text::mask_text;
use crate::model::{Color, Run};

/// Rewrite one run in place: mask its text, then reapply its pre-rewrite
/// formatting with the color passed through two-tier resolution.
///
/// Runs whose text trims to empty are left untouched and never marked
/// dirty. A run without a font only has its text rewritten.
///
/// The formatting snapshot is taken before the text rewrite and
/// reapplied after it, even though source and destination are the same
/// run. Reassigning the color is what routes it through
/// [`Color::resolve`], so the ordering is load-bearing rather than a
/// self-copy artifact.
pub fn rewrite_run(run: &mut Run) {
    if run.is_blank() {
        return;
    }

    let formatting = run.font.clone();

    run.text = mask_text(&run.text);

    if let Some(mut font) = formatting {
        font.color = Color::resolve(&font.color, run.raw_fill.as_ref());
        run.font = Some(font);
    }

    run.dirty = true;
}
