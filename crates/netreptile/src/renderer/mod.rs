//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over the
//! browser engine (Chromium via chromiumoxide). Elements found by a query are
//! referred to by opaque [`ElementHandle`]s owned by the context that produced
//! them.

pub mod chromium;
pub mod fixture;

use async_trait::async_trait;

use reptile_core::ReptileResult;

use crate::config::SelectorType;

/// Result of navigating to a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken until the page settled, in milliseconds.
    pub load_time_ms: u64,
}

/// Reference to an element inside one [`RenderContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub(crate) usize);

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> ReptileResult<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> ReptileResult<()>;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to `url` and wait until the network is idle, all under one
    /// deadline of `timeout_ms`. Fails with `ReptileError::Navigation`.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> ReptileResult<NavigationResult>;
    /// The full rendered document markup.
    async fn html(&self) -> ReptileResult<String>;
    /// Elements matching `selector`, in document order. With a `scope`, the
    /// query is evaluated relative to that element.
    async fn query(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
        kind: SelectorType,
    ) -> ReptileResult<Vec<ElementHandle>>;
    /// The DOM `textContent` of an element.
    async fn text_content(&self, element: ElementHandle) -> ReptileResult<Option<String>>;
    /// The rendered `innerText` of an element (line breaks preserved).
    async fn inner_text(&self, element: ElementHandle) -> ReptileResult<Option<String>>;
    /// Detach an element from the document.
    async fn remove(&self, element: ElementHandle) -> ReptileResult<()>;
    /// Close this context.
    async fn close(self: Box<Self>) -> ReptileResult<()>;
}
