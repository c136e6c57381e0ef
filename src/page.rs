//! Page Abstraction
//!
//! High-level API for a browser page: navigation, element lookup by CSS
//! selector or accessibility role/name, and screenshot capture.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::cdp::Session;
use crate::error::{Error, Result};

/// Global counter for unique marker IDs to prevent race conditions
static MARKER_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Escape a string for safe use in JavaScript string literals
fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
        .replace('`', "\\`")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace("${", "\\${")
}

/// CSS selector covering the native elements and explicit role attribute for
/// an accessibility role
fn role_selector(role: &str) -> String {
    match role {
        "heading" => r#"h1, h2, h3, h4, h5, h6, [role="heading"]"#.to_string(),
        "button" => {
            r#"button, input[type="submit"], input[type="button"], [role="button"]"#.to_string()
        }
        "link" => r#"a[href], [role="link"]"#.to_string(),
        other => format!(r#"[role="{}"]"#, escape_js_string(other)),
    }
}

/// A browser page
pub struct Page {
    session: Session,
}

impl Page {
    /// Create a new Page wrapping a CDP session
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    /// Get the underlying CDP session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Get the target ID backing this page
    pub fn target_id(&self) -> &str {
        self.session.target_id()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Navigate to a URL
    pub async fn goto(&self, url: &str) -> Result<()> {
        let result = self.session.navigate(url).await?;
        if let Some(error) = result.error_text {
            return Err(Error::Navigation(error));
        }
        // Wait for navigation to settle
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        Ok(())
    }

    /// Wait for the document to finish loading by polling document.readyState
    ///
    /// Resolves once readyState === "complete", times out otherwise.
    pub async fn wait_for_ready(&self, timeout_ms: u64) -> Result<()> {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);
        let poll_interval = std::time::Duration::from_millis(50);

        loop {
            match self.session.evaluate("document.readyState").await {
                Ok(result) => {
                    if let Some(value) = result.result.value {
                        if value.as_str() == Some("complete") {
                            return Ok(());
                        }
                    }
                }
                Err(_) => {
                    // Page might be navigating, readyState unavailable - keep waiting
                }
            }

            if start.elapsed() > timeout {
                return Err(Error::Timeout(format!(
                    "Document did not finish loading within {}ms",
                    timeout_ms
                )));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    // =========================================================================
    // Page Info
    // =========================================================================

    /// Get current URL
    pub async fn url(&self) -> Result<String> {
        let frame_tree = self.session.get_frame_tree().await?;
        Ok(frame_tree.frame.url)
    }

    /// Get page title
    pub async fn title(&self) -> Result<String> {
        let result = self.session.evaluate("document.title").await?;
        if let Some(value) = result.result.value {
            if let Some(s) = value.as_str() {
                return Ok(s.to_string());
            }
        }
        Ok(String::new())
    }

    /// Get page HTML content
    pub async fn content(&self) -> Result<String> {
        let result = self
            .session
            .evaluate("document.documentElement.outerHTML")
            .await?;
        if let Some(value) = result.result.value {
            if let Some(s) = value.as_str() {
                return Ok(s.to_string());
            }
        }
        Ok(String::new())
    }

    // =========================================================================
    // Screenshots
    // =========================================================================

    /// Capture a viewport screenshot as PNG bytes
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.session
            .capture_screenshot(Some("png"), None, false)
            .await
    }

    /// Capture a screenshot of the full page, beyond the viewport
    pub async fn screenshot_full_page(&self) -> Result<Vec<u8>> {
        self.session
            .capture_screenshot(Some("png"), None, true)
            .await
    }

    // =========================================================================
    // Element Finding
    // =========================================================================

    /// Find an element by CSS selector
    pub async fn find(&self, selector: &str) -> Result<Element<'_>> {
        let doc = self.session.get_document(Some(0)).await?;
        let node_id = self.session.query_selector(doc.node_id, selector).await?;

        if node_id == 0 {
            return Err(Error::ElementNotFound(selector.to_string()));
        }

        Ok(Element {
            page: self,
            node_id,
        })
    }

    /// Wait for an element to appear in the DOM
    pub async fn wait_for(&self, selector: &str, timeout_ms: u64) -> Result<Element<'_>> {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if let Ok(element) = self.find(selector).await {
                return Ok(element);
            }

            if start.elapsed() > timeout {
                return Err(Error::Timeout(format!(
                    "Element '{}' not found within {}ms",
                    selector, timeout_ms
                )));
            }

            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }

    // =========================================================================
    // Role-based Element Finding
    // =========================================================================

    /// Find an element by accessibility role and accessible name
    ///
    /// The accessible name is resolved the way assistive tooling does:
    /// `aria-label` first, then `aria-labelledby` (referenced elements' text,
    /// space-joined), then the element's own text content. Matching is
    /// whitespace-normalized, case-insensitive, and full-string. Elements
    /// inside `aria-hidden` subtrees or without rendered boxes are skipped.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use snapcheck::{Browser, Result};
    /// # async fn example() -> Result<()> {
    /// # let browser = Browser::launch().await?;
    /// # let page = browser.new_page("http://localhost:5173/dashboard").await?;
    /// let heading = page.find_by_role("heading", "Children").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_by_role(&self, role: &str, name: &str) -> Result<Element<'_>> {
        // Use unique marker ID to prevent race conditions between concurrent calls
        let marker_id = MARKER_COUNTER.fetch_add(1, Ordering::SeqCst);
        let marker_attr = format!("data-snapcheck-role-{}", marker_id);

        let escaped_name = escape_js_string(name);
        let selector = role_selector(role);

        let js = format!(
            r#"
            (() => {{
                const accessibleName = (el) => {{
                    const label = el.getAttribute('aria-label');
                    if (label && label.trim()) return label;
                    const refs = el.getAttribute('aria-labelledby');
                    if (refs) {{
                        const text = refs.split(/\s+/)
                            .map(id => {{
                                const target = document.getElementById(id);
                                return target ? (target.innerText || target.textContent || '') : '';
                            }})
                            .join(' ');
                        if (text.trim()) return text;
                    }}
                    return el.innerText || el.textContent || '';
                }};
                const normalize = (s) => s.replace(/\s+/g, ' ').trim().toLowerCase();
                const wanted = normalize('{escaped_name}');
                for (const el of document.querySelectorAll('{selector}')) {{
                    if (el.closest('[aria-hidden="true"]') !== null) continue;
                    if (el.getClientRects().length === 0) continue;
                    if (normalize(accessibleName(el)) === wanted) {{
                        el.setAttribute('{marker_attr}', 'true');
                        return true;
                    }}
                }}
                return false;
            }})()
            "#,
            escaped_name = escaped_name,
            selector = selector,
            marker_attr = marker_attr
        );

        let found: bool = self.evaluate(&js).await?;
        if !found {
            return Err(Error::ElementNotFound(format!(
                "{} named '{}'",
                role, name
            )));
        }

        // Now find it by the marker attribute
        let marker_selector = format!("[{}='true']", marker_attr);
        let element = self.find(&marker_selector).await?;

        // Clean up the marker
        let cleanup_js = format!(
            "document.querySelector('[{}]')?.removeAttribute('{}')",
            marker_attr, marker_attr
        );
        self.execute(&cleanup_js).await?;

        Ok(element)
    }

    /// Wait for an element with the given role and accessible name to be
    /// visible (rendered with a computable box model)
    pub async fn wait_for_role_visible(
        &self,
        role: &str,
        name: &str,
        timeout_ms: u64,
    ) -> Result<Element<'_>> {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if let Ok(element) = self.find_by_role(role, name).await {
                // Check if we can compute box model (element is visible/rendered)
                if element.center().await.is_ok() {
                    return Ok(element);
                }
            }

            if start.elapsed() > timeout {
                return Err(Error::Timeout(format!(
                    "No visible {} named '{}' within {}ms",
                    role, name, timeout_ms
                )));
            }

            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }

    // =========================================================================
    // JavaScript Evaluation
    // =========================================================================

    /// Evaluate JavaScript and return the result
    pub async fn evaluate<T: serde::de::DeserializeOwned>(&self, expression: &str) -> Result<T> {
        let result = self.session.evaluate(expression).await?;

        if let Some(exception) = result.exception_details {
            return Err(Error::CdpSimple(format!(
                "JavaScript error: {} at {}:{}",
                exception.text, exception.line_number, exception.column_number
            )));
        }

        if let Some(value) = result.result.value {
            let typed: T = serde_json::from_value(value)?;
            return Ok(typed);
        }

        Err(Error::CdpSimple("No value returned from evaluate".into()))
    }

    /// Execute JavaScript without expecting a return value
    pub async fn execute(&self, expression: &str) -> Result<()> {
        let result = self.session.evaluate(expression).await?;

        if let Some(exception) = result.exception_details {
            return Err(Error::CdpSimple(format!(
                "JavaScript error: {} at {}:{}",
                exception.text, exception.line_number, exception.column_number
            )));
        }

        Ok(())
    }
}

/// An element on the page
pub struct Element<'a> {
    page: &'a Page,
    node_id: i32,
}

impl<'a> Element<'a> {
    /// Get the element's center coordinates
    pub async fn center(&self) -> Result<(f64, f64)> {
        let model = self.page.session.get_box_model(self.node_id).await?;
        Ok(model.center())
    }

    /// Check if the element is visible (has a computable box model)
    ///
    /// Returns Ok(true) if the element is rendered and potentially visible,
    /// Ok(false) if the element exists but is not rendered (display:none, etc.),
    /// or Err if there was a transport/session error.
    #[must_use = "returns visibility state"]
    pub async fn is_visible(&self) -> Result<bool> {
        match self.page.session.get_box_model(self.node_id).await {
            Ok(_) => Ok(true),
            Err(Error::Cdp { message, .. }) if message.contains("box model") => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Get outer HTML
    pub async fn outer_html(&self) -> Result<String> {
        self.page.session.get_outer_html(self.node_id).await
    }
}
