//! Tag extraction engines.
//!
//! Both engines locate every occurrence of one tag name as a span of the
//! source text ([`SourceTag`]); the extraction mode is then applied the same
//! way for both. `Outer` and `Inner` are verbatim slices of the input, and
//! attribute values and text are decoded by [`markup`]. On well-formed markup
//! without nesting of the searched tag the engines produce identical output.
//! The regex engine does not track nesting, so it diverges on malformed
//! markup, unclosed tags, nested same-name tags, and tags inside comments or
//! scripts.

pub mod markup;
pub mod pattern;
pub mod structural;

use std::fmt;

use crate::mode::ExtractionMode;

/// Read access to one located tag occurrence.
pub trait TagNode {
    /// Value of the named attribute (case-insensitive), if present.
    fn attribute(&self, name: &str) -> Option<String>;
    /// Text content with nested tags stripped.
    fn inner_text(&self) -> String;
    /// Markup between the opening and closing tag.
    fn inner_markup(&self) -> String;
    /// The full markup of the occurrence.
    fn raw_markup(&self) -> String;
}

/// A located occurrence, borrowed from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTag<'a> {
    /// Opening tag through closing tag (or just the opening tag for void
    /// and self-closing elements).
    pub raw: &'a str,
    /// Attribute source of the opening tag, after the tag name.
    pub attrs: &'a str,
    /// Content between the opening and closing tag.
    pub inner: &'a str,
}

impl TagNode for SourceTag<'_> {
    fn attribute(&self, name: &str) -> Option<String> {
        markup::attribute(self.attrs, name)
    }

    fn inner_text(&self) -> String {
        markup::text(self.inner)
    }

    fn inner_markup(&self) -> String {
        self.inner.to_string()
    }

    fn raw_markup(&self) -> String {
        self.raw.to_string()
    }
}

/// Which engine locates the tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    #[default]
    Structural,
    Regex,
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Structural => write!(f, "HTML parser"),
            EngineKind::Regex => write!(f, "Regex"),
        }
    }
}

/// Every occurrence of `tag` in `content`, in document order.
pub fn find_tags<'a>(kind: EngineKind, content: &'a str, tag: &str) -> Vec<SourceTag<'a>> {
    match kind {
        EngineKind::Structural => structural::find_tags(content, tag),
        EngineKind::Regex => pattern::find_tags(content, tag),
    }
}

/// Extract one string per occurrence of `tag` in `content`.
pub fn extract(kind: EngineKind, content: &str, tag: &str, mode: &ExtractionMode) -> Vec<String> {
    let results: Vec<String> = find_tags(kind, content, tag)
        .iter()
        .filter_map(|node| render(node, mode))
        .collect();
    tracing::debug!("{kind} engine: {} <{tag}> results", results.len());
    results
}

/// Apply `mode` to one occurrence. `None` means the occurrence is skipped.
pub fn render<N: TagNode>(node: &N, mode: &ExtractionMode) -> Option<String> {
    match mode {
        ExtractionMode::Attribute(name) => node.attribute(name),
        ExtractionMode::Text => {
            let text = node.inner_text();
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        ExtractionMode::Outer => Some(node.raw_markup()),
        ExtractionMode::Inner => Some(node.inner_markup()),
    }
}
