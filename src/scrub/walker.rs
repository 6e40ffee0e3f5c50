//! Recursive shape walk.

use super::run::rewrite_run;
use super::ScrubSummary;
use crate::model::{Shape, TextFrame};

/// Groups nest shallowly in real decks; this bounds a pathological or
/// hand-crafted file. Children beyond the limit are left untouched.
const MAX_GROUP_DEPTH: usize = 64;

/// Walk one shape, rewriting every eligible run beneath it.
///
/// The walk is total: it dispatches exhaustively on the shape variant
/// and never fails on a shape it cannot handle.
pub fn walk_shape(shape: &mut Shape, summary: &mut ScrubSummary) {
    walk_shape_at(shape, 0, summary);
}

fn walk_shape_at(shape: &mut Shape, depth: usize, summary: &mut ScrubSummary) {
    summary.shapes_visited += 1;

    match shape {
        Shape::Group(children) => {
            if depth >= MAX_GROUP_DEPTH {
                return;
            }
            for child in children.iter_mut() {
                walk_shape_at(child, depth + 1, summary);
            }
        }
        Shape::TextBox(frame) => {
            // Frame-level layout must survive the rewrite untouched; read
            // it out and reassign it around the run pass.
            let layout = frame.layout.clone();
            scrub_frame(frame, summary);
            frame.layout = layout;
        }
        Shape::Table(table) => {
            for row in table.rows.iter_mut() {
                for cell in row.cells.iter_mut() {
                    scrub_frame(&mut cell.frame, summary);
                }
            }
        }
        Shape::Other => {}
    }
}

fn scrub_frame(frame: &mut TextFrame, summary: &mut ScrubSummary) {
    for paragraph in frame.paragraphs.iter_mut() {
        for run in paragraph.runs.iter_mut() {
            rewrite_run(run);
            if run.dirty {
                summary.runs_rewritten += 1;
            }
        }
    }
}
