//! Chromium-based renderer using chromiumoxide.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;

use reptile_core::{ReptileError, ReptileResult};

use super::{ElementHandle, NavigationResult, RenderContext, Renderer};
use crate::config::SelectorType;

/// Desktop Chrome user agent presented to every site.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Resolves once no new resource has been requested for 500ms.
const NETWORK_IDLE_JS: &str = r#"
new Promise((resolve) => {
    let observer = null;
    const settle = () => { if (observer) observer.disconnect(); resolve(true); };
    let timer = setTimeout(settle, 500);
    if (typeof PerformanceObserver === 'function') {
        observer = new PerformanceObserver(() => {
            clearTimeout(timer);
            timer = setTimeout(settle, 500);
        });
        observer.observe({ type: 'resource', buffered: false });
    }
})
"#;

/// Attribute used to hand XPath matches over to the CSS element lookup.
const MATCH_ATTR: &str = "data-netreptile-match";

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. NETREPTILE_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("NETREPTILE_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.netreptile/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".netreptile/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".netreptile/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".netreptile/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".netreptile/chromium/chrome-linux64/chrome"),
                home.join(".netreptile/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: tokio::sync::Mutex<Browser>,
}

impl ChromiumRenderer {
    /// Launch a headless Chromium instance.
    pub async fn new() -> ReptileResult<Self> {
        let chrome_path = find_chromium().ok_or_else(|| {
            ReptileError::Browser(
                "Chromium not found. Install Chrome/Chromium or set NETREPTILE_CHROMIUM_PATH."
                    .into(),
            )
        })?;
        tracing::debug!("using Chromium at {}", chrome_path.display());

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(1920, 1080)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg(format!("--user-agent={USER_AGENT}"))
            .build()
            .map_err(|e| ReptileError::Browser(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ReptileError::Browser(format!("failed to launch Chromium: {e}")))?;

        // Spawn the handler task
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("browser handler: {e}");
                }
            }
        });

        Ok(Self {
            browser: tokio::sync::Mutex::new(browser),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> ReptileResult<Box<dyn RenderContext>> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(|e| ReptileError::Browser(format!("failed to create new page: {e}")))?;

        Ok(Box::new(ChromiumContext {
            page,
            elements: Mutex::new(Vec::new()),
            next_token: AtomicUsize::new(0),
        }))
    }

    async fn shutdown(&self) -> ReptileResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| ReptileError::Browser(format!("failed to close browser: {e}")))?;
        let _ = browser.wait().await;
        Ok(())
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
    elements: Mutex<Vec<Arc<Element>>>,
    next_token: AtomicUsize,
}

impl ChromiumContext {
    fn register(&self, found: Vec<Element>) -> Vec<ElementHandle> {
        let mut elements = self.elements.lock().unwrap_or_else(|e| e.into_inner());
        found
            .into_iter()
            .map(|el| {
                elements.push(Arc::new(el));
                ElementHandle(elements.len() - 1)
            })
            .collect()
    }

    fn element(&self, handle: ElementHandle) -> ReptileResult<Arc<Element>> {
        let elements = self.elements.lock().unwrap_or_else(|e| e.into_inner());
        elements
            .get(handle.0)
            .cloned()
            .ok_or_else(|| ReptileError::Browser(format!("unknown element handle {}", handle.0)))
    }

    async fn string_fn(&self, handle: ElementHandle, function: &str) -> ReptileResult<Option<String>> {
        let element = self.element(handle)?;
        let ret = element
            .call_js_fn(function, false)
            .await
            .map_err(|e| ReptileError::Browser(format!("element script failed: {e}")))?;
        Ok(ret
            .result
            .value
            .and_then(|v| v.as_str().map(str::to_owned)))
    }

    /// Mark every element the XPath selects with a unique token, then collect
    /// them through a CSS attribute lookup so they come back as elements.
    async fn query_xpath(
        &self,
        scope: Option<ElementHandle>,
        xpath: &str,
    ) -> ReptileResult<Vec<ElementHandle>> {
        let token = format!("m{}", self.next_token.fetch_add(1, Ordering::Relaxed));
        let xpath_literal = serde_json::to_string(xpath)
            .map_err(|e| ReptileError::Selector(format!("cannot encode xpath: {e}")))?;

        let marked = match scope {
            None => {
                let script = document_mark_expression(&xpath_literal, &token);
                self.page
                    .evaluate(script.as_str())
                    .await
                    .map_err(|e| selector_error(xpath, e))?
                    .into_value::<u64>()
                    .map_err(|e| ReptileError::Browser(format!("unexpected xpath result: {e:?}")))?
            }
            Some(handle) => {
                let element = self.element(handle)?;
                let function = scoped_mark_function(&xpath_literal, &token);
                let ret = element
                    .call_js_fn(function, false)
                    .await
                    .map_err(|e| selector_error(xpath, e))?;
                if let Some(exception) = ret.exception_details {
                    return Err(ReptileError::Selector(format!(
                        "invalid xpath {xpath:?}: {}",
                        exception.text
                    )));
                }
                ret.result.value.and_then(|v| v.as_u64()).unwrap_or(0)
            }
        };

        if marked == 0 {
            return Ok(Vec::new());
        }

        let found = self
            .page
            .find_elements(marker_selector(&token))
            .await
            .map_err(|e| selector_error(xpath, e))?;

        if let Err(e) = self.page.evaluate(cleanup_expression(&token).as_str()).await {
            tracing::debug!("failed to clear xpath markers: {e}");
        }

        Ok(self.register(found))
    }
}

/// Script body that marks the element results of the XPath, evaluated
/// against `context`, with `token`, and returns how many it marked.
fn mark_script(xpath_literal: &str, context: &str, token: &str) -> String {
    format!(
        "const result = document.evaluate({xpath_literal}, {context}, null, \
         XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
         let count = 0; \
         for (let i = 0; i < result.snapshotLength; i++) {{ \
             const node = result.snapshotItem(i); \
             if (node.nodeType === Node.ELEMENT_NODE) {{ node.setAttribute('{MATCH_ATTR}', '{token}'); count++; }} \
         }} \
         return count;"
    )
}

/// Page-level expression: the XPath is evaluated against the whole document.
fn document_mark_expression(xpath_literal: &str, token: &str) -> String {
    format!("(() => {{ {} }})()", mark_script(xpath_literal, "document", token))
}

/// Function declaration called on an element: the XPath is evaluated with the
/// element (`this`) as context node, so relative paths stay inside it.
fn scoped_mark_function(xpath_literal: &str, token: &str) -> String {
    format!("function() {{ {} }}", mark_script(xpath_literal, "this", token))
}

/// CSS selector for the elements marked with `token`.
fn marker_selector(token: &str) -> String {
    format!("[{MATCH_ATTR}=\"{token}\"]")
}

/// Expression that removes the marker from every element carrying `token`.
fn cleanup_expression(token: &str) -> String {
    format!(
        "document.querySelectorAll('{}').forEach((n) => n.removeAttribute('{MATCH_ATTR}'))",
        marker_selector(token)
    )
}

fn selector_error(selector: &str, e: CdpError) -> ReptileError {
    ReptileError::Selector(format!("query {selector:?} failed: {e}"))
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> ReptileResult<NavigationResult> {
        let start = Instant::now();
        let idle = EvaluateParams::builder()
            .expression(NETWORK_IDLE_JS)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(ReptileError::Browser)?;

        let page = &self.page;
        let settle = async move {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            page.evaluate_expression(idle).await?;
            Ok::<_, CdpError>(())
        };

        let result = tokio::time::timeout(Duration::from_millis(timeout_ms), settle).await;
        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(())) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .unwrap_or_else(|| url.to_string());
                tracing::debug!("page settled after {load_time_ms}ms at {final_url}");
                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => Err(ReptileError::Navigation(format!("navigation to {url} failed: {e}"))),
            Err(_) => Err(ReptileError::Navigation(format!(
                "navigation to {url} timed out after {timeout_ms}ms"
            ))),
        }
    }

    async fn html(&self) -> ReptileResult<String> {
        let result = self
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| ReptileError::Browser(format!("failed to get HTML: {e}")))?;

        result
            .into_value()
            .map_err(|e| ReptileError::Browser(format!("failed to convert HTML result: {e:?}")))
    }

    async fn query(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
        kind: SelectorType,
    ) -> ReptileResult<Vec<ElementHandle>> {
        match kind {
            SelectorType::Xpath => self.query_xpath(scope, selector).await,
            SelectorType::Css => {
                let found = match scope {
                    None => self.page.find_elements(selector).await,
                    Some(handle) => self.element(handle)?.find_elements(selector).await,
                }
                .map_err(|e| selector_error(selector, e))?;
                Ok(self.register(found))
            }
        }
    }

    async fn text_content(&self, element: ElementHandle) -> ReptileResult<Option<String>> {
        self.string_fn(element, "function() { return this.textContent; }")
            .await
    }

    async fn inner_text(&self, element: ElementHandle) -> ReptileResult<Option<String>> {
        self.string_fn(element, "function() { return this.innerText; }")
            .await
    }

    async fn remove(&self, element: ElementHandle) -> ReptileResult<()> {
        self.element(element)?
            .call_js_fn("function() { this.remove(); }", false)
            .await
            .map_err(|e| ReptileError::Browser(format!("failed to remove element: {e}")))?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> ReptileResult<()> {
        let _ = self.page.close().await;
        Ok(())
    }
}
