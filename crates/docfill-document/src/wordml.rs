//! WordprocessingML paragraph model
//!
//! Word splits visible text across runs at arbitrary points, so a placeholder
//! like `{company_name}` may live in three separate `<w:t>` elements. This
//! module flattens a paragraph into its visible text while remembering which
//! `<w:t>` element owns each character, and rebuilds the paragraph XML after
//! edits, touching only the text elements whose content changed.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static PARAGRAPH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:p(?:\s[^>]*)?/>|<w:p(?:\s[^>]*[^/>])?>.*?</w:p>").expect("static regex")
});

static SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<w:t(?:\s[^>]*)?/>|<w:t(?:\s[^>]*[^/>])?>(.*?)</w:t>|<w:tab/>|<w:br(?:\s[^>]*)?/>|<w:cr/>",
    )
    .expect("static regex")
});

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(lt|gt|amp|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").expect("static regex"));

/// A piece of visible paragraph content
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Editable `<w:t>` element; `range` spans the whole element
    Text { range: Range<usize>, text: String },
    /// Tab or line break; not editable
    Fixed { ch: char },
}

/// Flattened view of one `<w:p>` element
#[derive(Debug, Clone)]
pub(crate) struct Paragraph<'a> {
    xml: &'a str,
    segments: Vec<Segment>,
}

impl<'a> Paragraph<'a> {
    pub(crate) fn parse(xml: &'a str) -> Self {
        let segments = SEGMENT
            .captures_iter(xml)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let tag = whole.as_str();
                if tag.starts_with("<w:tab") {
                    Some(Segment::Fixed { ch: '\t' })
                } else if tag.starts_with("<w:br") || tag.starts_with("<w:cr") {
                    Some(Segment::Fixed { ch: '\n' })
                } else {
                    let text = caps.get(1).map(|m| decode_entities(m.as_str())).unwrap_or_default();
                    Some(Segment::Text {
                        range: whole.range(),
                        text,
                    })
                }
            })
            .collect();
        Self { xml, segments }
    }

    /// Visible text with tabs and breaks
    pub(crate) fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Text { text, .. } => text.clone(),
                Segment::Fixed { ch } => ch.to_string(),
            })
            .collect()
    }

    /// Every visible char paired with the index of its owning text segment
    /// (`None` for tabs and breaks)
    pub(crate) fn chars(&self) -> Vec<(char, Option<usize>)> {
        let mut out = Vec::new();
        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Text { text, .. } => out.extend(text.chars().map(|c| (c, Some(idx)))),
                Segment::Fixed { ch } => out.push((*ch, None)),
            }
        }
        out
    }

    /// Number of segments (text and fixed)
    pub(crate) fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Rebuild the paragraph XML with new text for each text segment.
    ///
    /// `new_texts` is indexed like the segments; entries for fixed segments are
    /// ignored. Unchanged text elements are copied byte-for-byte.
    pub(crate) fn rebuild(&self, new_texts: &[String]) -> String {
        let mut out = String::with_capacity(self.xml.len());
        let mut cursor = 0;
        for (idx, segment) in self.segments.iter().enumerate() {
            let Segment::Text { range, text } = segment else {
                continue;
            };
            let Some(new_text) = new_texts.get(idx) else {
                continue;
            };
            if new_text == text {
                continue;
            }
            out.push_str(&self.xml[cursor..range.start]);
            out.push_str(&text_element(new_text));
            cursor = range.end;
        }
        out.push_str(&self.xml[cursor..]);
        out
    }
}

/// Split a part into alternating non-paragraph XML and paragraphs
pub(crate) fn split_paragraphs(part_xml: &str) -> Vec<PartPiece<'_>> {
    let mut pieces = Vec::new();
    let mut cursor = 0;
    for m in PARAGRAPH.find_iter(part_xml) {
        if m.start() > cursor {
            pieces.push(PartPiece::Markup(&part_xml[cursor..m.start()]));
        }
        pieces.push(PartPiece::Paragraph(m.as_str()));
        cursor = m.end();
    }
    if cursor < part_xml.len() {
        pieces.push(PartPiece::Markup(&part_xml[cursor..]));
    }
    pieces
}

/// Piece of a part's XML
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PartPiece<'a> {
    Markup(&'a str),
    Paragraph(&'a str),
}

/// Visible text of a part, one line per paragraph
pub(crate) fn part_text(part_xml: &str) -> String {
    PARAGRAPH
        .find_iter(part_xml)
        .map(|m| Paragraph::parse(m.as_str()).text())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize text as one or more `<w:t>` elements; newlines become `<w:br/>`
fn text_element(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("<w:t xml:space=\"preserve\">{}</w:t>", encode_entities(line)))
        .collect::<Vec<_>>()
        .join("<w:br/>")
}

pub(crate) fn decode_entities(raw: &str) -> String {
    ENTITY
        .replace_all(raw, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match name {
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "amp" => "&".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = if let Some(hex) = name.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        name[1..].parse::<u32>().ok()
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .into_owned()
}

pub(crate) fn encode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPLIT_RUNS: &str = concat!(
        r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr>"#,
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Dear {comp</w:t></w:r>"#,
        r#"<w:r><w:t>any_na</w:t></w:r>"#,
        r#"<w:r><w:t xml:space="preserve">me}, </w:t></w:r>"#,
        r#"<w:r><w:tab/><w:t>hi &amp; bye</w:t></w:r></w:p>"#
    );

    #[test]
    fn flattens_split_runs() {
        let p = Paragraph::parse(SPLIT_RUNS);
        assert_eq!(p.text(), "Dear {company_name}, \thi & bye");
        assert_eq!(p.segment_count(), 5);
    }

    #[test]
    fn char_owners_track_segments() {
        let p = Paragraph::parse(SPLIT_RUNS);
        let chars = p.chars();
        assert_eq!(chars[0], ('D', Some(0)));
        let tab = chars.iter().find(|(c, _)| *c == '\t').unwrap();
        assert_eq!(tab.1, None);
    }

    #[test]
    fn rebuild_touches_only_changed_segments() {
        let p = Paragraph::parse(SPLIT_RUNS);
        let new_texts = vec![
            "Dear Acme & Co".to_string(),
            String::new(),
            ", ".to_string(),
            String::new(),
            "hi & bye".to_string(),
        ];
        let xml = p.rebuild(&new_texts);
        assert!(xml.contains(r#"<w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Dear Acme &amp; Co</w:t>"#));
        assert!(xml.contains(r#"<w:t>hi &amp; bye</w:t>"#), "unchanged segment kept verbatim");
        assert!(xml.starts_with(r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr>"#));
        assert_eq!(Paragraph::parse(&xml).text(), "Dear Acme & Co, \thi & bye");
    }

    #[test]
    fn newlines_become_breaks() {
        assert_eq!(
            text_element("a\nb"),
            r#"<w:t xml:space="preserve">a</w:t><w:br/><w:t xml:space="preserve">b</w:t>"#
        );
    }

    #[test]
    fn paragraph_property_tags_are_not_paragraphs() {
        let xml = r#"<w:body><w:p><w:pPr><w:pStyle w:val="x"/></w:pPr><w:r><w:t>One</w:t></w:r></w:p><w:p/><w:p w:rsidR="1"><w:r><w:t>Two</w:t></w:r></w:p></w:body>"#;
        assert_eq!(part_text(xml), "One\n\nTwo");
        let pieces = split_paragraphs(xml);
        let paragraphs = pieces
            .iter()
            .filter(|p| matches!(p, PartPiece::Paragraph(_)))
            .count();
        assert_eq!(paragraphs, 3);
    }

    #[test]
    fn self_closing_text_is_empty_segment() {
        let p = Paragraph::parse(r#"<w:p><w:r><w:t xml:space="preserve"/></w:r><w:r><w:t>x</w:t></w:r></w:p>"#);
        assert_eq!(p.text(), "x");
        assert_eq!(p.segment_count(), 2);
    }

    #[test]
    fn table_elements_are_not_text() {
        let xml = r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;
        assert_eq!(part_text(xml), "Cell");
    }

    #[test]
    fn entity_roundtrip() {
        assert_eq!(decode_entities("a &lt;b&gt; &amp; &#65;&#x42;"), "a <b> & AB");
        assert_eq!(encode_entities("<a & b>"), "&lt;a &amp; b&gt;");
    }
}
