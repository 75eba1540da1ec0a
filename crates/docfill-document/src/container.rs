//! Docx container codec
//!
//! A `.docx` file is a zip archive of XML parts. [`DocxContainer`] holds every
//! entry in archive order so that non-text parts (styles, numbering, media)
//! survive regeneration byte-for-byte.

use crate::error::ContainerError;
use crate::wordml;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Main document body part
pub const DOCUMENT_PART: &str = "word/document.xml";

/// One archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// In-memory docx archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxContainer {
    entries: Vec<Entry>,
}

impl DocxContainer {
    /// Open a docx buffer
    ///
    /// # Errors
    /// - `ContainerError::InvalidArchive` if the buffer is not a zip archive
    /// - `ContainerError::MissingPart` if `word/document.xml` is absent
    /// - `ContainerError::Encoding` if a text part is not UTF-8
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, ContainerError> {
        let mut archive = ZipArchive::new(Cursor::new(buffer))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)
                    .map_err(|e| ContainerError::io_error(&name, e))?;
            }
            entries.push(Entry { name, data, is_dir });
        }

        let container = Self { entries };
        if container.entry(DOCUMENT_PART).is_none() {
            return Err(ContainerError::MissingPart(DOCUMENT_PART.to_string()));
        }
        // Fail early on corrupted text parts rather than mid-render
        for part in container.text_part_names() {
            container.part_str(&part)?;
        }
        Ok(container)
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Names of all archive entries in archive order
    #[must_use]
    pub fn part_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Text-bearing parts in reading order: body, then headers, then footers
    #[must_use]
    pub fn text_part_names(&self) -> Vec<String> {
        let mut headers = Vec::new();
        let mut footers = Vec::new();
        for entry in &self.entries {
            let name = entry.name.as_str();
            if !name.ends_with(".xml") {
                continue;
            }
            if name.starts_with("word/header") {
                headers.push(name.to_string());
            } else if name.starts_with("word/footer") {
                footers.push(name.to_string());
            }
        }
        headers.sort();
        footers.sort();

        let mut names = vec![DOCUMENT_PART.to_string()];
        names.extend(headers);
        names.extend(footers);
        names
    }

    /// Part contents as UTF-8 text
    ///
    /// # Errors
    /// `MissingPart` or `Encoding`
    pub fn part_str(&self, name: &str) -> Result<&str, ContainerError> {
        let entry = self
            .entry(name)
            .ok_or_else(|| ContainerError::MissingPart(name.to_string()))?;
        std::str::from_utf8(&entry.data).map_err(|_| ContainerError::Encoding {
            part: name.to_string(),
        })
    }

    /// Replace the contents of an existing part
    ///
    /// # Errors
    /// `MissingPart` if no entry has that name
    pub fn replace_part(&mut self, name: &str, data: Vec<u8>) -> Result<(), ContainerError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| ContainerError::MissingPart(name.to_string()))?;
        entry.data = data;
        Ok(())
    }

    /// Plain text of every text part, paragraphs separated by newlines
    ///
    /// # Errors
    /// Propagates part lookup failures
    pub fn extract_text(&self) -> Result<String, ContainerError> {
        let mut parts = Vec::new();
        for name in self.text_part_names() {
            let text = wordml::part_text(self.part_str(&name)?);
            if !text.is_empty() {
                parts.push(text);
            }
        }
        Ok(parts.join("\n"))
    }

    /// Re-pack into a zip buffer
    ///
    /// Entries keep their original order and a fixed timestamp, so identical
    /// content always produces identical bytes. Level 0 stores entries
    /// uncompressed; 1-9 deflate.
    ///
    /// # Errors
    /// `ContainerError::Write` on archive failures
    pub fn to_bytes(&self, compression_level: u32) -> Result<Vec<u8>, ContainerError> {
        let base = SimpleFileOptions::default().last_modified_time(zip::DateTime::default());
        let options = if compression_level == 0 {
            base.compression_method(CompressionMethod::Stored)
        } else {
            base.compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(compression_level.min(9))))
        };

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            if entry.is_dir {
                writer
                    .add_directory(entry.name.as_str(), options)
                    .map_err(|e| ContainerError::Write(e.to_string()))?;
                continue;
            }
            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| ContainerError::Write(e.to_string()))?;
            writer
                .write_all(&entry.data)
                .map_err(|e| ContainerError::Write(e.to_string()))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| ContainerError::Write(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
