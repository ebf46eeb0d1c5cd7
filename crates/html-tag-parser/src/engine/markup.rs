//! Decoding of source markup with the HTML5 tokenizer (`scraper`/html5ever).
//!
//! Both engines hand source slices to these helpers, so attribute values and
//! text come out decoded the same way whichever engine located the tag.

use scraper::{ElementRef, Html};

/// Look up `name` (case-insensitive) in the attribute source of an opening
/// tag, i.e. everything between the tag name and the closing `>`.
///
/// The value is entity-decoded; a bare attribute yields an empty string.
/// When an attribute repeats, the first occurrence wins.
pub fn attribute(attrs: &str, name: &str) -> Option<String> {
    if attrs.trim().is_empty() {
        return None;
    }
    // A neutral host element keeps table-context tags from being dropped.
    let fragment = Html::parse_fragment(&format!("<span {attrs}></span>"));
    let host = fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "span")?;

    host.value()
        .attrs()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.to_string())
}

/// Text of a markup slice: tags and comments stripped, character references
/// decoded (the full HTML5 named set plus numeric references).
pub fn text(markup: &str) -> String {
    if !markup.contains('<') && !markup.contains('&') {
        return markup.to_string();
    }
    Html::parse_fragment(markup).root_element().text().collect()
}
