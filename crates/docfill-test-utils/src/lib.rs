//! Testing utilities for the docfill workspace
//!
//! Builds minimal, valid `.docx` buffers in memory so tests never touch
//! fixture files on disk.

#![allow(missing_docs)]

use docfill_model::{Field, FieldType};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// In-memory `.docx` builder
#[derive(Debug, Clone)]
pub struct DocxBuilder {
    paragraphs: Vec<Vec<String>>,
    headers: Vec<String>,
    footers: Vec<String>,
    extra_parts: Vec<(String, Vec<u8>)>,
    with_body: bool,
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            paragraphs: Vec::new(),
            headers: Vec::new(),
            footers: Vec::new(),
            extra_parts: Vec::new(),
            with_body: true,
        }
    }

    /// Body paragraph in a single run
    pub fn paragraph(mut self, text: &str) -> Self {
        self.paragraphs.push(vec![text.to_string()]);
        self
    }

    /// Body paragraph split across one run per fragment, like Word does
    /// after editing
    pub fn paragraph_runs(mut self, runs: &[&str]) -> Self {
        self.paragraphs
            .push(runs.iter().map(|r| (*r).to_string()).collect());
        self
    }

    /// Add a header part with one paragraph
    pub fn header(mut self, text: &str) -> Self {
        self.headers.push(text.to_string());
        self
    }

    /// Add a footer part with one paragraph
    pub fn footer(mut self, text: &str) -> Self {
        self.footers.push(text.to_string());
        self
    }

    /// Add an arbitrary part, e.g. `word/styles.xml`
    pub fn part(mut self, name: &str, data: Vec<u8>) -> Self {
        self.extra_parts.push((name.to_string(), data));
        self
    }

    /// Omit `word/document.xml`
    pub fn without_body(mut self) -> Self {
        self.with_body = false;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .last_modified_time(zip::DateTime::default())
            .compression_method(CompressionMethod::Deflated);

        let mut write = |name: &str, data: &[u8]| {
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        };

        write("[Content_Types].xml", CONTENT_TYPES.as_bytes());
        write("_rels/.rels", ROOT_RELS.as_bytes());
        if self.with_body {
            let body: String = self.paragraphs.iter().map(|runs| paragraph_xml(runs)).collect();
            write("word/document.xml", document_xml("document", &format!("<w:body>{body}</w:body>")).as_bytes());
        }
        for (i, text) in self.headers.iter().enumerate() {
            let xml = document_xml("hdr", &paragraph_xml(&[text.clone()]));
            write(&format!("word/header{}.xml", i + 1), xml.as_bytes());
        }
        for (i, text) in self.footers.iter().enumerate() {
            let xml = document_xml("ftr", &paragraph_xml(&[text.clone()]));
            write(&format!("word/footer{}.xml", i + 1), xml.as_bytes());
        }
        for (name, data) in &self.extra_parts {
            write(name, data);
        }

        zip.finish().unwrap().into_inner()
    }
}

fn document_xml(root: &str, inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:{root} xmlns:w="{W_NS}">{inner}</w:{root}>"#
    )
}

fn paragraph_xml(runs: &[String]) -> String {
    let runs: String = runs
        .iter()
        .map(|text| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text)))
        .collect();
    format!("<w:p>{runs}</w:p>")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Three-tag SAFE template used across end-to-end tests
pub fn safe_template() -> Vec<u8> {
    DocxBuilder::new()
        .paragraph("SIMPLE AGREEMENT FOR FUTURE EQUITY")
        .paragraph("This SAFE is issued by {company_name} to {investor_name}.")
        .paragraph("Purchase Amount: {purchase_amount}")
        .build()
}

/// Field fixture with an explicit type
pub fn field(id: &str, placeholder: &str, field_type: FieldType, order: usize) -> Field {
    Field::new(id, placeholder, order).with_type(field_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn builds_readable_archive() {
        let buffer = DocxBuilder::new().paragraph("a & b").header("h").build();
        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();
        let mut body = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert!(body.contains("a &amp; b"));
        assert!(archive.by_name("word/header1.xml").is_ok());
    }

    #[test]
    fn split_runs_are_separate_elements() {
        let buffer = DocxBuilder::new().paragraph_runs(&["{comp", "any}"]).build();
        let mut archive = zip::ZipArchive::new(Cursor::new(buffer)).unwrap();
        let mut body = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body.matches("<w:r>").count(), 2);
    }
}
