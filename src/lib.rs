//! # deckmask
//!
//! Structure-preserving anonymization for PowerPoint presentations.
//!
//! deckmask replaces every alphanumeric character of a .pptx deck's text
//! with placeholder characters of the same length and letter case, while
//! keeping layout, fonts, colors, tables, and all other markup exactly
//! as they were. The anonymized copy remains a faithful visual skeleton
//! of the original and can be shared without exposing its content.
//!
//! ## Quick Start
//!
//! ```no_run
//! let summary = deckmask::anonymize_file("deck.pptx", "deck_anonymized.pptx")?;
//! println!("{}", summary.message());
//! # Ok::<(), deckmask::Error>(())
//! ```
//!
//! ## Lower-level API
//!
//! ```no_run
//! use deckmask::pptx::PptxFile;
//! use deckmask::scrub::anonymize_presentation;
//!
//! let file = PptxFile::open("deck.pptx")?;
//! let mut presentation = file.parse()?;
//! let summary = anonymize_presentation(&mut presentation);
//! println!("{} runs rewritten", summary.runs_rewritten);
//! file.save(&presentation, "deck_anonymized.pptx")?;
//! # Ok::<(), deckmask::Error>(())
//! ```

pub mod container;
pub mod detect;
pub mod error;
pub mod model;
pub mod pptx;
pub mod scrub;

// Re-exports
pub use container::PptxContainer;
pub use error::{Error, Result};
pub use model::{
    Color, Font, FrameLayout, Paragraph, Presentation, RawFill, RgbColor, Run, Shape, Slide,
    Table, TableCell, TableRow, TextFrame, ThemeSlot,
};
pub use pptx::PptxFile;
pub use scrub::{anonymize_file, anonymize_presentation, mask_text, ScrubSummary};

/// Library version, from Cargo metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
