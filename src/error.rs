//! Error types for the deckmask library.

use std::io;
use thiserror::Error;

/// Result type alias for deckmask operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while anonymizing a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input path or file is not a usable PPTX presentation.
    ///
    /// Raised before any part of the document is touched.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error reading or writing the ZIP package.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// The destination file is locked or not writable.
    ///
    /// The transform itself has already succeeded when this is raised;
    /// the source file is never written to.
    #[error("Permission denied writing output: {0}")]
    PermissionDenied(String),

    /// Any other failure during the document walk or re-serialization.
    #[error("Processing error: {0}")]
    Processing(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
