//! Extract HTML tags, attribute values, or text from a local file.
//!
//! The pipeline is linear: read and decode the input, locate every occurrence
//! of one tag with the chosen engine, render each occurrence according to the
//! [`ExtractionMode`], join with the separator, and write the output file.

pub mod decode;
pub mod engine;
pub mod mode;

use std::path::PathBuf;

use reptile_core::{join_items, write_output, ReptileError, ReptileResult};

pub use engine::EngineKind;
pub use mode::ExtractionMode;

/// Default separator between extracted items.
pub const DEFAULT_SEPARATOR: &str = "\n";

/// One tag extraction job.
#[derive(Debug, Clone)]
pub struct TagExtractionRequest {
    pub input_path: PathBuf,
    pub tag_name: String,
    pub output_path: PathBuf,
    pub mode: ExtractionMode,
    pub engine: EngineKind,
    pub separator: String,
}

/// What a finished extraction produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagExtractionOutcome {
    pub items: usize,
    pub input_chars: usize,
}

/// Check that `tag` is a plain tag name such as `a`, `h1`, or `my-widget`.
pub fn validate_tag_name(tag: &str) -> ReptileResult<()> {
    let mut chars = tag.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ReptileError::Config(format!("invalid tag name: {tag:?}")))
    }
}

/// Extract strings from already-decoded content.
pub fn extract_items(
    content: &str,
    tag: &str,
    mode: &ExtractionMode,
    engine: EngineKind,
) -> ReptileResult<Vec<String>> {
    validate_tag_name(tag)?;
    Ok(engine::extract(engine, content, tag, mode))
}

/// Run the full pipeline: read, extract, join, write.
pub fn run(request: &TagExtractionRequest) -> ReptileResult<TagExtractionOutcome> {
    validate_tag_name(&request.tag_name)?;

    tracing::info!("Reading input file: {}", request.input_path.display());
    let content = decode::read_text(&request.input_path)?;
    let input_chars = content.chars().count();
    tracing::info!("Read {input_chars} characters from input file");

    tracing::info!(
        "Extracting <{}> tags using {}",
        request.tag_name,
        request.engine
    );
    let items = engine::extract(request.engine, &content, &request.tag_name, &request.mode);
    if items.is_empty() {
        tracing::warn!(
            "No <{}> tags found in {}",
            request.tag_name,
            request.input_path.display()
        );
    }

    write_output(&request.output_path, &join_items(&items, &request.separator))?;
    tracing::info!(
        "Saved {} items to {}",
        items.len(),
        request.output_path.display()
    );

    Ok(TagExtractionOutcome {
        items: items.len(),
        input_chars,
    })
}
