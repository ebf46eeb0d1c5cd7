//! What to emit for each located tag.

use std::fmt;

use reptile_core::{ReptileError, ReptileResult};

/// Extraction mode for one tag occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Markup between the opening and closing tag.
    #[default]
    Inner,
    /// Value of the named attribute; occurrences without it are skipped.
    Attribute(String),
    /// Inner text with nested tags stripped.
    Text,
    /// The complete tag: opening tag, content, and closing tag.
    Outer,
}

impl ExtractionMode {
    /// Build the mode from the CLI flags. At most one flag may be set.
    pub fn from_flags(attr: Option<&str>, text_only: bool, include_tag: bool) -> ReptileResult<Self> {
        let mut chosen = Vec::new();
        if attr.is_some() {
            chosen.push("--attr");
        }
        if text_only {
            chosen.push("--text-only");
        }
        if include_tag {
            chosen.push("--include-tag");
        }
        if chosen.len() > 1 {
            return Err(ReptileError::Config(format!(
                "{} are mutually exclusive",
                chosen.join(", ")
            )));
        }

        match attr {
            Some("") => Err(ReptileError::Config("--attr needs an attribute name".into())),
            Some(name) => Ok(ExtractionMode::Attribute(name.to_string())),
            None if text_only => Ok(ExtractionMode::Text),
            None if include_tag => Ok(ExtractionMode::Outer),
            None => Ok(ExtractionMode::Inner),
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Inner => write!(f, "Tag content"),
            ExtractionMode::Attribute(name) => write!(f, "Attribute '{name}'"),
            ExtractionMode::Text => write!(f, "Text content only"),
            ExtractionMode::Outer => write!(f, "Complete HTML tags"),
        }
    }
}
