//! Selector-based text extraction from a rendered page.
//!
//! Two flavours: a single selector whose matches are trimmed and joined by the
//! caller, and a list of [`SelectorSpec`]s from the config file that can nest,
//! exclude sub-elements, rewrite tags, and choose their own separators.

use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use serde::Deserialize;

use reptile_core::{join_items, ReptileResult};

use crate::config::SelectorType;
use crate::renderer::{ElementHandle, RenderContext};

/// Separator between matches of a single `--selector`.
pub const SIMPLE_SEPARATOR: &str = "\n\n";

/// Default separator inside a [`SelectorSpec`].
pub const SPEC_SEPARATOR: &str = "\n";

fn default_separator() -> String {
    SPEC_SEPARATOR.to_string()
}

/// One entry of the `selectors` list in a config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectorSpec {
    /// Entries without a selector are skipped with a warning.
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub selector_type: SelectorType,
    #[serde(default = "default_separator")]
    pub separator: String,
    /// CSS selectors removed from each match before its text is read.
    #[serde(default, alias = "Exclusions")]
    pub exclusions: Vec<String>,
    /// Selectors evaluated inside each match instead of reading its text.
    #[serde(default)]
    pub selectors: Vec<SelectorSpec>,
    #[serde(default)]
    pub replace: Vec<ReplaceRule>,
}

/// Replace every `target_tag` tag (opening, closing, or self-closing) with `replace_str`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplaceRule {
    pub target_tag: String,
    pub replace_str: String,
}

impl ReplaceRule {
    fn pattern(&self) -> Option<Regex> {
        let t = regex::escape(&self.target_tag);
        Regex::new(&format!(r"<{t}[^>]*/?>|</{t}>")).ok()
    }

    /// Apply this rule to `text`.
    pub fn apply(&self, text: &str) -> String {
        match self.pattern() {
            Some(re) => re.replace_all(text, self.replace_str.as_str()).into_owned(),
            None => text.to_string(),
        }
    }
}

/// Text of every element matching `selector`, trimmed, in document order.
///
/// Elements with no text are skipped, and an element whose text cannot be read
/// is logged and skipped. No match at all yields an empty list.
pub async fn extract_simple(
    ctx: &dyn RenderContext,
    selector: &str,
    kind: SelectorType,
) -> ReptileResult<Vec<String>> {
    tracing::info!("Extracting text from containers matching selector: {selector} (type: {kind})");
    let elements = ctx.query(None, selector, kind).await?;

    if elements.is_empty() {
        tracing::warn!("No elements found matching selector: {selector}");
        return Ok(Vec::new());
    }

    let mut texts = Vec::new();
    for (i, element) in elements.into_iter().enumerate() {
        match ctx.text_content(element).await {
            Ok(Some(text)) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    tracing::debug!("Extracted text from element {}: {:.100}", i + 1, trimmed);
                    texts.push(trimmed.to_string());
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to extract text from element {}: {e}", i + 1),
        }
    }

    if texts.is_empty() {
        tracing::warn!("No text content found in matching elements");
    } else {
        tracing::info!("Successfully extracted text from {} containers", texts.len());
    }
    Ok(texts)
}

/// Evaluate one selector entry, optionally inside `parent`, returning one entry per match.
pub fn process_spec<'a>(
    ctx: &'a dyn RenderContext,
    spec: &'a SelectorSpec,
    parent: Option<ElementHandle>,
) -> BoxFuture<'a, ReptileResult<Vec<String>>> {
    async move {
        let Some(selector) = spec.selector.as_deref().filter(|s| !s.trim().is_empty()) else {
            tracing::warn!("Missing selector in config entry, skipping: {spec:?}");
            return Ok(Vec::new());
        };
        tracing::debug!("Processing selector: {selector} (type: {})", spec.selector_type);
        let elements = ctx.query(parent, selector, spec.selector_type).await?;
        if elements.is_empty() {
            tracing::debug!("No elements found matching selector: {selector}");
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for (i, element) in elements.into_iter().enumerate() {
            match process_element(ctx, spec, element).await {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to process element {}: {e}", i + 1),
            }
        }

        if !spec.replace.is_empty() {
            tracing::debug!("Applying {} replace rules", spec.replace.len());
            for entry in &mut entries {
                for rule in &spec.replace {
                    *entry = rule.apply(entry);
                }
            }
        }
        Ok(entries)
    }
    .boxed()
}

async fn process_element(
    ctx: &dyn RenderContext,
    spec: &SelectorSpec,
    element: ElementHandle,
) -> ReptileResult<Option<String>> {
    for exclusion in &spec.exclusions {
        for excluded in ctx.query(Some(element), exclusion, SelectorType::Css).await? {
            if let Err(e) = ctx.remove(excluded).await {
                tracing::debug!("Failed to remove excluded element: {e}");
            }
        }
    }

    if spec.selectors.is_empty() {
        let text = ctx.inner_text(element).await?.unwrap_or_default();
        let trimmed = text.trim();
        return Ok((!trimmed.is_empty()).then(|| trimmed.to_string()));
    }

    let mut nested = Vec::new();
    for child in &spec.selectors {
        nested.extend(process_spec(ctx, child, Some(element)).await?);
    }
    Ok((!nested.is_empty()).then(|| join_items(&nested, &spec.separator)))
}

/// Evaluate every top-level selector entry and combine the results.
///
/// Results of one entry are joined with its separator; a separator other than
/// `"\n"` is also appended after the block. Blocks are joined with `"\n"`.
/// An entry that fails is logged and contributes nothing.
pub async fn process_selectors(ctx: &dyn RenderContext, specs: &[SelectorSpec]) -> String {
    let mut blocks = Vec::new();
    for spec in specs {
        match process_spec(ctx, spec, None).await {
            Ok(entries) if !entries.is_empty() => {
                let mut block = join_items(&entries, &spec.separator);
                if spec.separator != SPEC_SEPARATOR && !block.is_empty() {
                    block.push_str(&spec.separator);
                }
                blocks.push(block);
            }
            Ok(_) => {}
            Err(e) => tracing::error!(
                "Failed to process selector config {:?}: {e}",
                spec.selector.as_deref().unwrap_or_default()
            ),
        }
    }
    join_items(&blocks, SPEC_SEPARATOR)
}
