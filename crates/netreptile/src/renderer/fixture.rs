//! In-memory renderer over static HTML.
//!
//! Evaluates CSS selectors with `scraper` against a fixed document, so the
//! fetch pipeline can run without a browser. XPath is not supported. Removed
//! elements are hidden from later queries and text reads; `html()` always
//! returns the original markup.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use reptile_core::{ReptileError, ReptileResult};

use super::{ElementHandle, NavigationResult, RenderContext, Renderer};
use crate::config::SelectorType;

/// A renderer that serves one static document for every URL.
#[derive(Debug, Clone)]
pub struct FixtureRenderer {
    html: String,
    failure: Option<String>,
    delay: Duration,
    shutdowns: Arc<AtomicUsize>,
}

impl FixtureRenderer {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            failure: None,
            delay: Duration::ZERO,
            shutdowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A renderer whose navigations always fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new("")
        }
    }

    /// Pretend the page needs `delay` to settle.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// How many times [`Renderer::shutdown`] has been called.
    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for FixtureRenderer {
    async fn new_context(&self) -> ReptileResult<Box<dyn RenderContext>> {
        Ok(Box::new(FixtureContext {
            page: self.clone(),
            state: Mutex::new(FixtureState::default()),
        }))
    }

    async fn shutdown(&self) -> ReptileResult<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FixtureState {
    /// Handle index → element position in document order.
    handles: Vec<usize>,
    /// Positions of removed elements.
    removed: HashSet<usize>,
}

/// A context over the fixture document.
pub struct FixtureContext {
    page: FixtureRenderer,
    state: Mutex<FixtureState>,
}

fn elements(doc: &Html) -> Vec<ElementRef<'_>> {
    doc.root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect()
}

fn position(all: &[ElementRef<'_>], el: ElementRef<'_>) -> Option<usize> {
    all.iter().position(|candidate| *candidate == el)
}

fn is_removed(all: &[ElementRef<'_>], removed: &HashSet<usize>, el: ElementRef<'_>) -> bool {
    std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .any(|node| position(all, node).is_some_and(|i| removed.contains(&i)))
}

fn collect_text(
    el: ElementRef<'_>,
    all: &[ElementRef<'_>],
    removed: &HashSet<usize>,
    line_breaks: bool,
    out: &mut String,
) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if position(all, child_el).is_some_and(|i| removed.contains(&i)) {
                continue;
            }
            if line_breaks && child_el.value().name() == "br" {
                out.push('\n');
            }
            collect_text(child_el, all, removed, line_breaks, out);
        }
    }
}

impl FixtureContext {
    fn lock(&self) -> std::sync::MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn select(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> ReptileResult<Vec<ElementHandle>> {
        let sel = Selector::parse(selector).map_err(|e| {
            ReptileError::Selector(format!("invalid css selector {selector:?}: {e:?}"))
        })?;
        let doc = Html::parse_document(&self.page.html);
        let all = elements(&doc);
        let mut state = self.lock();

        let matches: Vec<ElementRef<'_>> = match scope {
            None => doc.select(&sel).collect(),
            Some(handle) => {
                let root = state
                    .handles
                    .get(handle.0)
                    .and_then(|&i| all.get(i).copied())
                    .ok_or_else(|| ReptileError::Browser(format!("unknown element handle {}", handle.0)))?;
                root.select(&sel).filter(|el| *el != root).collect()
            }
        };

        let mut handles = Vec::new();
        for el in matches {
            if is_removed(&all, &state.removed, el) {
                continue;
            }
            if let Some(i) = position(&all, el) {
                state.handles.push(i);
                handles.push(ElementHandle(state.handles.len() - 1));
            }
        }
        Ok(handles)
    }

    fn text(&self, handle: ElementHandle, line_breaks: bool) -> ReptileResult<Option<String>> {
        let doc = Html::parse_document(&self.page.html);
        let all = elements(&doc);
        let state = self.lock();
        let el = state
            .handles
            .get(handle.0)
            .and_then(|&i| all.get(i).copied())
            .ok_or_else(|| ReptileError::Browser(format!("unknown element handle {}", handle.0)))?;

        let mut out = String::new();
        collect_text(el, &all, &state.removed, line_breaks, &mut out);
        Ok(Some(out))
    }
}

#[async_trait]
impl RenderContext for FixtureContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> ReptileResult<NavigationResult> {
        if let Some(message) = &self.page.failure {
            return Err(ReptileError::Navigation(format!("navigation to {url} failed: {message}")));
        }
        let settle = tokio::time::sleep(self.page.delay);
        if tokio::time::timeout(Duration::from_millis(timeout_ms), settle)
            .await
            .is_err()
        {
            return Err(ReptileError::Navigation(format!(
                "navigation to {url} timed out after {timeout_ms}ms"
            )));
        }
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: self.page.delay.as_millis() as u64,
        })
    }

    async fn html(&self) -> ReptileResult<String> {
        Ok(self.page.html.clone())
    }

    async fn query(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
        kind: SelectorType,
    ) -> ReptileResult<Vec<ElementHandle>> {
        match kind {
            SelectorType::Css => self.select(scope, selector),
            SelectorType::Xpath => Err(ReptileError::Selector(
                "the fixture renderer only evaluates CSS selectors".into(),
            )),
        }
    }

    async fn text_content(&self, element: ElementHandle) -> ReptileResult<Option<String>> {
        self.text(element, false)
    }

    async fn inner_text(&self, element: ElementHandle) -> ReptileResult<Option<String>> {
        self.text(element, true)
    }

    async fn remove(&self, element: ElementHandle) -> ReptileResult<()> {
        let mut state = self.lock();
        let position = *state
            .handles
            .get(element.0)
            .ok_or_else(|| ReptileError::Browser(format!("unknown element handle {}", element.0)))?;
        state.removed.insert(position);
        Ok(())
    }

    async fn close(self: Box<Self>) -> ReptileResult<()> {
        Ok(())
    }
}
