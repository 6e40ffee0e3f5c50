//! Input validation for PPTX presentations.
//!
//! All checks run before any part of the document is parsed or mutated,
//! so a rejected input is never half-processed.

use crate::error::{Error, Result};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Content type of the PPTX presentation main part.
const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Validate that `path` exists and carries the `.pptx` extension.
pub fn validate_pptx_path(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::InvalidInput(format!(
            "source file not found: {}",
            path.display()
        )));
    }
    let is_pptx = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("pptx"))
        .unwrap_or(false);
    if !is_pptx {
        return Err(Error::InvalidInput(format!(
            "not a .pptx file: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_data(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Validate that `data` looks like a PPTX package.
///
/// Checks the ZIP magic, then either the declared content type in
/// `[Content_Types].xml` or the presence of the `ppt/` folder structure.
pub fn validate_pptx_bytes(data: &[u8]) -> Result<()> {
    if !is_zip_data(data) {
        return Err(Error::InvalidInput(
            "not a ZIP-based package".to_string(),
        ));
    }

    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| Error::InvalidInput(format!("unreadable package: {e}")))?;

    let declared = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            use std::io::Read;
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            let content = crate::container::decode_xml_bytes(&bytes)?;
            content.contains(PPTX_CONTENT_TYPE)
        }
        Err(_) => false,
    };

    if declared || archive.file_names().any(|n| n.starts_with("ppt/")) {
        Ok(())
    } else {
        Err(Error::InvalidInput(
            "package is not a PowerPoint presentation".to_string(),
        ))
    }
}
