//! ZIP container abstraction for the PPTX package.
//!
//! Reading is part-by-part; writing re-emits the whole package, copying
//! every untouched entry raw so bytes and compression are preserved.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// PPTX package abstraction over a ZIP archive.
pub struct PptxContainer {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

/// Decode XML bytes handling UTF-8 (with or without BOM) and UTF-16 LE/BE.
///
/// OOXML parts are typically UTF-8, but some producers emit UTF-16.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.len() >= 3 && bytes[..3] == [0xEF, 0xBB, 0xBF] {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::XmlParse(e.to_string()));
    }

    if bytes.len() >= 2 && bytes[..2] == [0xFF, 0xFE] {
        return decode_utf16(&bytes[2..], u16::from_le_bytes);
    }

    if bytes.len() >= 2 && bytes[..2] == [0xFE, 0xFF] {
        return decode_utf16(&bytes[2..], u16::from_be_bytes);
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn decode_utf16(bytes: &[u8], from_bytes: fn([u8; 2]) -> u16) -> Result<String> {
    let len = bytes.len() & !1;
    let units = (0..len)
        .step_by(2)
        .map(|i| from_bytes([bytes[i], bytes[i + 1]]));
    let content = char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::XmlParse(e.to_string()))?;
    // The declaration still claims UTF-16; quick-xml would reject the
    // already-decoded string, so rewrite it.
    Ok(content
        .replacen("encoding=\"UTF-16\"", "encoding=\"UTF-8\"", 1)
        .replacen("encoding='UTF-16'", "encoding='UTF-8'", 1))
}

impl PptxContainer {
    /// Open a PPTX container from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create a PPTX container from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let cursor = Cursor::new(data);
        let archive = zip::ZipArchive::new(cursor)?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read an XML part from the archive as a string.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(path)
            .map_err(|_| Error::MissingComponent(path.to_string()))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        decode_xml_bytes(&bytes)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        let archive = self.archive.borrow();
        let found = archive.file_names().any(|n| n == path);
        found
    }

    /// List parts matching a prefix.
    pub fn list_files_with_prefix(&self, prefix: &str) -> Vec<String> {
        let archive = self.archive.borrow();
        archive
            .file_names()
            .filter(|n| n.starts_with(prefix))
            .map(String::from)
            .collect()
    }

    /// Assemble the anonymized package and write it to `dest`.
    ///
    /// Parts named in `replacements` are re-deflated from the given bytes;
    /// every other entry is copied raw from the source archive. The whole
    /// package is built in memory and written with a single `fs::write`,
    /// so a failure mid-assembly leaves no partial output file.
    pub fn save_with_replacements(
        &self,
        dest: impl AsRef<Path>,
        replacements: &HashMap<String, Vec<u8>>,
    ) -> Result<()> {
        let dest = dest.as_ref();
        let mut archive = self.archive.borrow_mut();
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));

        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            let name = entry.name().to_string();
            match replacements.get(&name) {
                Some(data) => {
                    drop(entry);
                    let options = SimpleFileOptions::default()
                        .compression_method(zip::CompressionMethod::Deflated);
                    writer.start_file(name, options)?;
                    writer.write_all(data)?;
                }
                None => {
                    writer.raw_copy_file(entry)?;
                }
            }
        }

        let bytes = writer.finish()?.into_inner();
        std::fs::write(dest, bytes).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                Error::PermissionDenied(dest.display().to_string())
            } else {
                Error::Io(e)
            }
        })
    }
}

impl std::fmt::Debug for PptxContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.archive.borrow().len();
        f.debug_struct("PptxContainer")
            .field("entries", &entries)
            .finish()
    }
}
