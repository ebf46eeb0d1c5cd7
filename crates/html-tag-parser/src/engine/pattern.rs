//! Tag location with a regular expression, without tracking nesting.

use regex::{Captures, Regex};

use super::SourceTag;

/// Build the occurrence pattern for `tag`.
///
/// Matches `<tag ...>content</tag>`, `<tag .../>`, and a bare `<tag ...>`
/// with no closing tag (void elements). Content ends at the first closing tag.
pub fn tag_regex(tag: &str) -> Result<Regex, regex::Error> {
    let t = regex::escape(tag);
    Regex::new(&format!(
        r"(?is)<{t}(?P<attrs>\s[^>]*?)?\s*(?:/>|>(?:(?P<inner>.*?)</{t}\s*>)?)"
    ))
}

/// Every match of the occurrence pattern for `tag`, in document order.
pub fn find_tags<'a>(content: &'a str, tag: &str) -> Vec<SourceTag<'a>> {
    match tag_regex(tag) {
        Ok(re) => re.captures_iter(content).map(|caps| source_tag(&caps)).collect(),
        Err(e) => {
            tracing::warn!("cannot build pattern for <{tag}>: {e}");
            Vec::new()
        }
    }
}

fn source_tag<'a>(caps: &Captures<'a>) -> SourceTag<'a> {
    SourceTag {
        raw: caps.get(0).map_or("", |m| m.as_str()),
        attrs: caps.name("attrs").map_or("", |m| m.as_str()),
        inner: caps.name("inner").map_or("", |m| m.as_str()),
    }
}
