//! Nesting-aware tag location over the source text.
//!
//! The input is split into tags, comments, and raw text, and elements are
//! matched up with a stack of open elements while keeping every element's
//! byte span. No HTML5 tree-construction rules are applied: nothing is
//! synthesized (`html`, `body`, `tbody`) and nothing is dropped (a bare
//! `<td>` outside a table), so every occurrence in the file is found and its
//! markup is sliced from the input unchanged.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::SourceTag;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is text up to the matching closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?s)<!--.*?-->",
            r"|<!\[CDATA\[.*?\]\]>",
            r"|<[!?][^>]*>",
            r"|</(?P<close>[A-Za-z][^\s/>]*)[^>]*>",
            r#"|<(?P<open>[A-Za-z][^\s/>]*)(?P<attrs>(?:[^>"']|"[^"]*"|'[^']*')*?)(?P<slash>/)?>"#,
        ))
        .expect("markup token regex is valid")
    })
}

/// One element with its byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    /// Lowercased tag name.
    name: String,
    start: usize,
    open_end: usize,
    inner_end: usize,
    end: usize,
    attrs: Range<usize>,
}

impl Element {
    fn close(&mut self, inner_end: usize, end: usize) {
        self.inner_end = inner_end;
        self.end = end;
    }
}

/// Every element named `tag` (case-insensitive), in document order.
pub fn find_tags<'a>(content: &'a str, tag: &str) -> Vec<SourceTag<'a>> {
    let tag = tag.to_ascii_lowercase();
    locate(content)
        .into_iter()
        .filter(|el| el.name == tag)
        .map(|el| SourceTag {
            raw: &content[el.start..el.end],
            attrs: &content[el.attrs],
            inner: &content[el.open_end..el.inner_end],
        })
        .collect()
}

/// Build the element list, ordered by start offset.
///
/// A closing tag closes the nearest open element of the same name and
/// implicitly closes everything opened after it; a closing tag with no open
/// counterpart is ignored. Elements still open at the end run to the end of
/// the input.
fn locate(content: &str) -> Vec<Element> {
    let lower = content.to_ascii_lowercase();
    let mut elements: Vec<Element> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut pos = 0;

    while let Some(caps) = token_regex().captures_at(content, pos) {
        let Some(whole) = caps.get(0) else { break };
        pos = whole.end();

        if let Some(name) = caps.name("close") {
            let name = name.as_str().to_ascii_lowercase();
            if let Some(depth) = open.iter().rposition(|&i| elements[i].name == name) {
                for &i in &open[depth + 1..] {
                    elements[i].close(whole.start(), whole.start());
                }
                elements[open[depth]].close(whole.start(), whole.end());
                open.truncate(depth);
            } else {
                tracing::trace!("ignoring stray </{name}> at byte {}", whole.start());
            }
            continue;
        }

        let Some(name) = caps.name("open") else {
            // comment, CDATA, doctype, or processing instruction
            continue;
        };
        let mut element = Element {
            name: name.as_str().to_ascii_lowercase(),
            start: whole.start(),
            open_end: whole.end(),
            inner_end: whole.end(),
            end: whole.end(),
            attrs: caps.name("attrs").map_or(name.end()..name.end(), |m| m.range()),
        };

        if caps.name("slash").is_some() || VOID_ELEMENTS.contains(&element.name.as_str()) {
            elements.push(element);
        } else if RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
            let needle = format!("</{}", element.name);
            let (inner_end, end) = match lower[whole.end()..].find(&needle) {
                Some(offset) => {
                    let close_start = whole.end() + offset;
                    let close_end = content[close_start..]
                        .find('>')
                        .map_or(content.len(), |i| close_start + i + 1);
                    (close_start, close_end)
                }
                None => (content.len(), content.len()),
            };
            element.close(inner_end, end);
            pos = end;
            elements.push(element);
        } else {
            open.push(elements.len());
            elements.push(element);
        }
    }

    for &i in &open {
        elements[i].close(content.len(), content.len());
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outer(content: &str, tag: &str) -> Vec<String> {
        find_tags(content, tag).iter().map(|t| t.raw.to_string()).collect()
    }

    fn inner(content: &str, tag: &str) -> Vec<String> {
        find_tags(content, tag).iter().map(|t| t.inner.to_string()).collect()
    }

    #[test]
    fn test_nested_tags_in_document_order() {
        let html = "<ul><li>1</li><li>2<ul><li>3</li></ul></li></ul>";
        assert_eq!(inner(html, "li"), vec!["1", "2<ul><li>3</li></ul>", "3"]);
        assert_eq!(outer(html, "ul")[1], "<ul><li>3</li></ul>");
    }

    #[test]
    fn test_attribute_source_is_kept() {
        let tags = find_tags(r#"<a href="x" title='a > b'>go</a>"#, "a");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].attrs, r#" href="x" title='a > b'"#);
        assert_eq!(tags[0].inner, "go");
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let html = r#"<p>a<br>b<BR/>c<img src="x" /></p><div/>"#;
        assert_eq!(outer(html, "br"), vec!["<br>", "<BR/>"]);
        assert_eq!(outer(html, "img"), vec![r#"<img src="x" />"#]);
        assert_eq!(inner(html, "p"), vec![r#"a<br>b<BR/>c<img src="x" />"#]);
        assert_eq!(outer(html, "div"), vec!["<div/>"]);
    }

    #[test]
    fn test_unclosed_element_ends_at_parent_close() {
        let html = "<div><p>one<p>two</div><p>three";
        assert_eq!(inner(html, "p"), vec!["one<p>two", "two", "three"]);
        assert_eq!(outer(html, "div"), vec!["<div><p>one<p>two</div>"]);
    }

    #[test]
    fn test_stray_closing_tag_is_ignored() {
        assert_eq!(inner("<p>a</span>b</p>", "p"), vec!["a</span>b"]);
    }

    #[test]
    fn test_comments_and_scripts_are_not_tokenized() {
        let html = r#"<!-- <p>hidden</p> --><script>var s = "<p>no</p>";</script><p>yes</p>"#;
        assert_eq!(inner(html, "p"), vec!["yes"]);
        assert_eq!(inner(html, "script"), vec![r#"var s = "<p>no</p>";"#]);
    }

    #[test]
    fn test_fragment_keeps_table_cells_and_adds_nothing() {
        let html = "<td>cell</td><tr><th>h</th></tr>";
        assert_eq!(inner(html, "td"), vec!["cell"]);
        assert_eq!(inner(html, "th"), vec!["h"]);
        assert!(find_tags(html, "tbody").is_empty());
        assert!(find_tags(html, "html").is_empty());
    }

    #[test]
    fn test_non_ascii_content_keeps_offsets() {
        let html = "<p>Grüße</p><p>日本</p>";
        assert_eq!(inner(html, "P"), vec!["Grüße", "日本"]);
    }
}
