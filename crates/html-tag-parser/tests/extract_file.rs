//! End-to-end tests for the tag extraction pipeline over real files.

use std::path::Path;

use html_tag_parser::{run, EngineKind, ExtractionMode, TagExtractionRequest};
use reptile_core::ReptileError;
use tempfile::TempDir;

// ── helpers ──

fn request(dir: &Path, tag: &str, mode: ExtractionMode, engine: EngineKind) -> TagExtractionRequest {
    TagExtractionRequest {
        input_path: dir.join("input.html"),
        tag_name: tag.to_string(),
        output_path: dir.join("output.txt"),
        mode,
        engine,
        separator: "\n".to_string(),
    }
}

fn write_input(dir: &TempDir, content: &[u8]) {
    std::fs::write(dir.path().join("input.html"), content).unwrap();
}

fn read_output(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("output.txt")).unwrap()
}

const PAGE: &str = r#"<html><head><title>Links</title></head>
<body>
  <a href="https://one.example">One</a>
  <a href="https://two.example" class="ext">Two</a>
  <a name="anchor">Anchor</a>
</body></html>"#;

// ── tests ──

#[test]
fn test_attribute_mode_writes_one_value_per_line() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, PAGE.as_bytes());

    let req = request(
        dir.path(),
        "a",
        ExtractionMode::Attribute("href".into()),
        EngineKind::Structural,
    );
    let outcome = run(&req).unwrap();

    assert_eq!(outcome.items, 2);
    assert_eq!(read_output(&dir), "https://one.example\nhttps://two.example");
}

#[test]
fn test_custom_separator() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, b"<span>a</span><span>b</span><span>c</span>");

    let mut req = request(dir.path(), "span", ExtractionMode::Text, EngineKind::Regex);
    req.separator = "|".to_string();
    run(&req).unwrap();

    assert_eq!(read_output(&dir), "a|b|c");
}

/// Well-formed inputs with no nesting of the searched tag, paired with the tag.
const FLAT_INPUTS: &[(&str, &str)] = &[
    (PAGE, "a"),
    (r#"<P id="u">Third</P><p ID='v'>Fourth</p>"#, "p"),
    ("<a href='x'>hi</a><A HREF=\"y\" id=z>there</A>", "a"),
    ("<p>&copy; 2024 &mdash; caf&eacute;</p><p id='n'>&#169; &#xA9; &lt;tag&gt;</p>", "p"),
    ("<p>a<BR>b<br/>c<br id=\"last\" /></p>", "br"),
    ("<p>a<BR>b<br/>c</p>", "p"),
    (r#"<img src="a.png" alt="A &amp; B"><IMG id='i2' SRC='b.png' />"#, "img"),
    ("<table><tr><td id=c1>one</td><TD>two &nbsp;</TD></tr></table>", "td"),
    ("<tr><td>bare</td></tr>", "td"),
];

fn flat_modes() -> Vec<ExtractionMode> {
    vec![
        ExtractionMode::Inner,
        ExtractionMode::Text,
        ExtractionMode::Outer,
        ExtractionMode::Attribute("href".into()),
        ExtractionMode::Attribute("id".into()),
        ExtractionMode::Attribute("alt".into()),
    ]
}

#[test]
fn test_engines_write_identical_files() {
    for (input, tag) in FLAT_INPUTS {
        for mode in flat_modes() {
            let parsed_dir = TempDir::new().unwrap();
            write_input(&parsed_dir, input.as_bytes());
            let parsed = run(&request(parsed_dir.path(), tag, mode.clone(), EngineKind::Structural)).unwrap();

            let regex_dir = TempDir::new().unwrap();
            write_input(&regex_dir, input.as_bytes());
            let matched = run(&request(regex_dir.path(), tag, mode.clone(), EngineKind::Regex)).unwrap();

            assert_eq!(parsed.items, matched.items, "<{tag}> {mode} in {input}");
            assert_eq!(read_output(&parsed_dir), read_output(&regex_dir), "<{tag}> {mode} in {input}");
        }
    }
}

#[test]
fn test_include_tag_writes_source_markup() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, b"<P Class='x'>One &copy;</P>\n<p>Two<BR>lines</p>");

    run(&request(dir.path(), "p", ExtractionMode::Outer, EngineKind::Structural)).unwrap();

    assert_eq!(read_output(&dir), "<P Class='x'>One &copy;</P>\n<p>Two<BR>lines</p>");
}

#[test]
fn test_bare_row_fragment_finds_cells() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, b"<td>cell</td><td>next</td>");

    let outcome = run(&request(dir.path(), "td", ExtractionMode::Text, EngineKind::Structural)).unwrap();

    assert_eq!(outcome.items, 2);
    assert_eq!(read_output(&dir), "cell\nnext");
}

#[test]
fn test_no_matching_tags_writes_empty_file() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, PAGE.as_bytes());

    let outcome = run(&request(dir.path(), "table", ExtractionMode::Inner, EngineKind::Structural)).unwrap();

    assert_eq!(outcome.items, 0);
    assert_eq!(read_output(&dir), "");
}

#[test]
fn test_latin1_input_is_decoded() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, b"<p>Gr\xfc\xdfe</p>");

    run(&request(dir.path(), "p", ExtractionMode::Text, EngineKind::Structural)).unwrap();

    assert_eq!(read_output(&dir), "Grüße");
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = run(&request(dir.path(), "p", ExtractionMode::Inner, EngineKind::Structural)).unwrap_err();
    assert!(matches!(err, ReptileError::Io { .. }));
    assert!(!dir.path().join("output.txt").exists());
}

#[test]
fn test_unwritable_output_is_io_error() {
    let dir = TempDir::new().unwrap();
    write_input(&dir, PAGE.as_bytes());

    let mut req = request(dir.path(), "a", ExtractionMode::Inner, EngineKind::Structural);
    req.output_path = dir.path().join("no-such-dir").join("out.txt");

    let err = run(&req).unwrap_err();
    assert!(matches!(err, ReptileError::Io { .. }));
}
