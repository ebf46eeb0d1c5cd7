//! The page fetch pipeline: resolve URL → render → extract → write.

use std::future::Future;
use std::path::PathBuf;

use reptile_core::{join_items, write_output, ReptileResult};

use crate::config::EffectiveConfig;
use crate::renderer::{RenderContext, Renderer};
use crate::selectors::{self, SIMPLE_SEPARATOR};
use crate::url::resolve_target;

/// One page to fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub output_path: PathBuf,
    pub config: EffectiveConfig,
}

/// What the payload was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// The full rendered document.
    Document,
    /// Text of the elements matching a single selector.
    Selector { matches: usize },
    /// Output of the configured selector list.
    SelectorList,
}

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// The URL actually navigated to.
    pub url: String,
    pub kind: PayloadKind,
    /// Size of the written payload in bytes.
    pub bytes: usize,
}

/// Render `url` and build the payload described by `config`.
///
/// The context is closed whether or not rendering succeeds.
pub async fn render_payload(
    renderer: &dyn Renderer,
    url: &str,
    config: &EffectiveConfig,
) -> ReptileResult<(String, PayloadKind)> {
    let mut ctx = renderer.new_context().await?;
    let result = render_in(ctx.as_mut(), url, config).await;
    if let Err(e) = ctx.close().await {
        tracing::debug!("failed to close page: {e}");
    }
    result
}

async fn render_in(
    ctx: &mut dyn RenderContext,
    url: &str,
    config: &EffectiveConfig,
) -> ReptileResult<(String, PayloadKind)> {
    tracing::info!("Navigating to {url}");
    let nav = ctx.navigate(url, config.timeout_ms).await?;
    tracing::debug!("loaded {} in {}ms", nav.final_url, nav.load_time_ms);

    if let Some(selector) = &config.selector {
        let texts = selectors::extract_simple(ctx, selector, config.selector_type).await?;
        let matches = texts.len();
        return Ok((join_items(&texts, SIMPLE_SEPARATOR), PayloadKind::Selector { matches }));
    }

    if !config.selectors.is_empty() {
        let content = selectors::process_selectors(ctx, &config.selectors).await;
        return Ok((content, PayloadKind::SelectorList));
    }

    let html = ctx.html().await?;
    tracing::info!("Successfully fetched full HTML content from {url}");
    Ok((html, PayloadKind::Document))
}

/// Run one fetch end to end. Nothing is written unless rendering succeeds.
pub async fn fetch(renderer: &dyn Renderer, request: &FetchRequest) -> ReptileResult<FetchOutcome> {
    let url = resolve_target(&request.url, request.config.baseurl.as_deref());
    let (payload, kind) = render_payload(renderer, &url, &request.config).await?;
    write_output(&request.output_path, &payload)?;

    Ok(FetchOutcome {
        url,
        kind,
        bytes: payload.len(),
    })
}

/// Run one fetch unless `cancel` resolves first, then shut the renderer down
/// either way. `Ok(None)` means the fetch was cancelled and nothing was written.
pub async fn fetch_and_shutdown<F>(
    renderer: &dyn Renderer,
    request: &FetchRequest,
    cancel: F,
) -> ReptileResult<Option<FetchOutcome>>
where
    F: Future<Output = ()>,
{
    let result = tokio::select! {
        result = fetch(renderer, request) => Some(result),
        _ = cancel => {
            tracing::info!("Operation cancelled by user");
            None
        }
    };
    if let Err(e) = renderer.shutdown().await {
        tracing::warn!("browser shutdown: {e}");
    }
    result.transpose()
}
