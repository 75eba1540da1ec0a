//! Placeholder tokens and template rendering
//!
//! Three placeholder shapes are recognized in visible text:
//! - Template tags: `{company_name}`, plus section markers `{#x}`, `{^x}`, `{/x}`
//! - Bracketed labels: `[Company Name]` (two or more chars, not only digits)
//! - Underscore blanks: `___` or longer, numbered `Blank_1`, `Blank_2`, ... in reading order
//!
//! The parser and the renderer share [`tokenize`], so a blank's number at
//! parse time always matches its number at render time.

use crate::container::DocxContainer;
use crate::error::ContainerError;
use crate::wordml::{split_paragraphs, Paragraph, PartPiece};
use docfill_model::normalize_key;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([^{}\n]+)\}|\[([^\[\]{}\n]{2,})\]|_{3,}").expect("static regex")
});

/// Fully transformed key/value binding for rendering
pub type TemplateData = BTreeMap<String, String>;

/// Lookup into [`TemplateData`] that tolerates placeholder spelling variants.
///
/// An exact key wins; otherwise the name is matched by [`normalize_key`], so
/// `[investor name]` binds to a value stored under `Investor Name` after
/// deduplication merged the two.
#[derive(Debug)]
pub struct Bindings<'d> {
    data: &'d TemplateData,
    normalized: HashMap<String, &'d String>,
}

impl<'d> Bindings<'d> {
    #[must_use]
    pub fn new(data: &'d TemplateData) -> Self {
        let mut normalized = HashMap::with_capacity(data.len());
        for (key, value) in data {
            let slot = normalized.entry(normalize_key(key)).or_insert(value);
            if slot.trim().is_empty() {
                *slot = value;
            }
        }
        Self { data, normalized }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'d String> {
        self.data
            .get(name)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.normalized.get(&normalize_key(name)).copied())
            .or_else(|| self.data.get(name))
    }
}

/// Visible marker for a tag with no binding at render time
#[must_use]
pub fn missing_marker(tag: &str) -> String {
    format!("[MISSING: {tag}]")
}

/// Auto-generated name of the n-th (1-based) underscore blank
#[must_use]
pub fn blank_name(n: usize) -> String {
    format!("Blank_{n}")
}

/// Kind of placeholder token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Leaf value tag `{name}`
    Value(String),
    /// Section open `{#name}` or inverted section `{^name}`
    SectionOpen { name: String, inverted: bool },
    /// Section close `{/name}`
    SectionClose(String),
    /// Bracketed label `[Label]`
    Bracket(String),
    /// Underscore run
    Blank,
}

/// A placeholder occurrence in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte span in the scanned text
    pub span: Range<usize>,
}

/// Find every placeholder token in reading order
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = if let Some(inner) = caps.get(1) {
                classify_tag(inner.as_str())?
            } else if let Some(inner) = caps.get(2) {
                let label = inner.as_str().trim();
                if label.chars().count() < 2 || label.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                TokenKind::Bracket(label.to_string())
            } else {
                TokenKind::Blank
            };
            Some(Token {
                kind,
                span: whole.range(),
            })
        })
        .collect()
}

fn classify_tag(inner: &str) -> Option<TokenKind> {
    let inner = inner.trim();
    let (marker, rest) = match inner.chars().next()? {
        c @ ('#' | '^' | '/') => (Some(c), inner[1..].trim()),
        _ => (None, inner),
    };
    if rest.is_empty() {
        return None;
    }
    let name = rest.to_string();
    Some(match marker {
        Some('#') => TokenKind::SectionOpen { name, inverted: false },
        Some('^') => TokenKind::SectionOpen { name, inverted: true },
        Some(_) => TokenKind::SectionClose(name),
        None => TokenKind::Value(name),
    })
}

/// Leaf value tag names, unique, in first-seen order
#[must_use]
pub fn leaf_tags(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for token in tokenize(text) {
        if let TokenKind::Value(name) = token.kind {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
    }
    seen
}

/// Section truthiness for a bound value
fn is_truthy(value: Option<&String>) -> bool {
    match value {
        None => false,
        Some(v) => {
            let v = v.trim().to_lowercase();
            !(v.is_empty() || v == "false" || v == "0" || v == "no")
        }
    }
}

/// Mutable state carried across paragraphs and parts during one render
#[derive(Debug)]
struct RenderState<'d> {
    bindings: Bindings<'d>,
    blank_counter: usize,
    /// Visibility of each open section
    sections: Vec<bool>,
    missing: Vec<String>,
}

impl<'d> RenderState<'d> {
    fn visible(&self) -> bool {
        self.sections.iter().all(|v| *v)
    }
}

/// Output of rendering a container
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    /// Container with every text part rewritten
    pub container: DocxContainer,
    /// Tags that fell back to [`missing_marker`]
    pub unbound_tags: Vec<String>,
}

/// Bind `data` into every text part of `container`.
///
/// Value tags with no binding render as [`missing_marker`]; bracket labels and
/// blanks without a binding are left as written.
///
/// # Errors
/// Propagates part access failures
pub fn render(container: &DocxContainer, data: &TemplateData) -> Result<RenderOutcome, ContainerError> {
    let mut output = container.clone();
    let mut state = RenderState {
        bindings: Bindings::new(data),
        blank_counter: 0,
        sections: Vec::new(),
        missing: Vec::new(),
    };

    for part in container.text_part_names() {
        let xml = container.part_str(&part)?;
        state.sections.clear();
        let rendered = render_part(xml, &mut state);
        if !state.sections.is_empty() {
            tracing::warn!(part = %part, open = state.sections.len(), "unclosed template sections");
        }
        output.replace_part(&part, rendered.into_bytes())?;
    }

    Ok(RenderOutcome {
        container: output,
        unbound_tags: state.missing,
    })
}

fn render_part(xml: &str, state: &mut RenderState<'_>) -> String {
    let mut out = String::with_capacity(xml.len());
    for piece in split_paragraphs(xml) {
        match piece {
            PartPiece::Markup(markup) => out.push_str(markup),
            PartPiece::Paragraph(p) => {
                if let Some(rendered) = render_paragraph(p, state) {
                    out.push_str(&rendered);
                }
            }
        }
    }
    out
}

/// Returns `None` when the paragraph should be dropped
fn render_paragraph(xml: &str, state: &mut RenderState<'_>) -> Option<String> {
    let paragraph = Paragraph::parse(xml);
    let text = paragraph.text();
    let chars = paragraph.chars();
    let tokens = tokenize(&text);

    let started_visible = state.visible();
    let mut new_texts = vec![String::new(); paragraph.segment_count()];
    let mut has_marker = false;
    let mut has_content = false;

    // Byte offset of each char, to align tokens (byte spans) with chars
    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let mut tokens = tokens.into_iter().peekable();
    let mut i = 0;

    while i < chars.len() {
        let offset = offsets[i];
        let token = match tokens.peek() {
            Some(t) if t.span.start == offset => tokens.next(),
            _ => None,
        };

        let Some(token) = token else {
            let (ch, owner) = chars[i];
            if state.visible() {
                if let Some(owner) = owner {
                    new_texts[owner].push(ch);
                }
                if !ch.is_whitespace() {
                    has_content = true;
                }
            }
            i += 1;
            continue;
        };

        // Chars covered by this token
        let mut end = i;
        while end < chars.len() && offsets[end] < token.span.end {
            end += 1;
        }
        let owner = chars[i..end].iter().find_map(|(_, o)| *o);
        let raw: String = chars[i..end].iter().map(|(c, _)| *c).collect();

        let replacement = match &token.kind {
            TokenKind::SectionOpen { name, inverted } => {
                has_marker = true;
                let truthy = is_truthy(state.bindings.get(name));
                state.sections.push(truthy != *inverted);
                None
            }
            TokenKind::SectionClose(_) => {
                has_marker = true;
                state.sections.pop();
                None
            }
            TokenKind::Value(name) => Some(match state.bindings.get(name) {
                Some(value) => value.clone(),
                None => {
                    if state.visible() {
                        state.missing.push(name.clone());
                    }
                    missing_marker(name)
                }
            }),
            TokenKind::Bracket(label) => Some(
                state
                    .bindings
                    .get(label)
                    .filter(|v| !v.trim().is_empty())
                    .cloned()
                    .unwrap_or(raw),
            ),
            TokenKind::Blank => {
                state.blank_counter += 1;
                Some(
                    state
                        .bindings
                        .get(&blank_name(state.blank_counter))
                        .filter(|v| !v.trim().is_empty())
                        .cloned()
                        .unwrap_or(raw),
                )
            }
        };

        if let (Some(replacement), Some(owner)) = (replacement, owner) {
            if state.visible() {
                if !replacement.trim().is_empty() {
                    has_content = true;
                }
                new_texts[owner].push_str(&replacement);
            }
        }
        i = end;
    }

    let ended_visible = state.visible();
    if !has_content && (has_marker || (!started_visible && !ended_visible)) {
        return None;
    }
    Some(paragraph.rebuild(&new_texts))
}
