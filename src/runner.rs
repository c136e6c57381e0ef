//! End-to-end page verification
//!
//! Launches a browser, loads the target URL, waits for the expected element
//! to render, and writes screenshot evidence to disk. The browser is released
//! on every exit path, including mid-run failure.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::browser::Browser;
use crate::error::Result;
use crate::BrowserConfig;

/// What to verify and where to put the evidence
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Page to load
    pub url: String,
    /// Accessibility role of the element to wait for
    pub role: String,
    /// Accessible name of the element to wait for
    pub name: String,
    /// Where the screenshot is written (parent directory must exist)
    pub output: PathBuf,
    /// Budget for the load wait and the element wait, each
    pub timeout_ms: u64,
    /// Capture the full page instead of the viewport
    pub full_page: bool,
    /// Browser launch options
    pub browser: BrowserConfig,
}

impl VerifyConfig {
    /// Create a config waiting for a heading with the given accessible name
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            role: "heading".into(),
            name: name.into(),
            output: PathBuf::from("verification.png"),
            timeout_ms: 10_000,
            full_page: false,
            browser: BrowserConfig::default(),
        }
    }
}

/// Summary of a successful verification run
#[derive(Debug, Clone)]
pub struct VerifyReport {
    /// URL the page ended up at
    pub url: String,
    /// Page title at capture time
    pub title: String,
    /// Where the screenshot was written
    pub output: PathBuf,
    /// Screenshot size in bytes
    pub bytes_written: usize,
    /// Wall time for the whole run, browser launch included
    pub elapsed: Duration,
}

/// Run the verification sequence described by `config`
///
/// Steps: launch, open page, navigate, wait for the element to be visible,
/// screenshot, close. The first failing step aborts the run and its error is
/// returned; the browser is closed regardless of which step failed.
pub async fn verify(config: &VerifyConfig) -> Result<VerifyReport> {
    let started = Instant::now();

    let browser = Browser::launch_with_config(config.browser.clone()).await?;

    // The browser handle must be released whether or not the checks pass.
    let outcome = run_checks(&browser, config).await;
    let closed = browser.close().await;

    let (url, title, bytes_written) = outcome?;
    closed?;

    Ok(VerifyReport {
        url,
        title,
        output: config.output.clone(),
        bytes_written,
        elapsed: started.elapsed(),
    })
}

async fn run_checks(browser: &Browser, config: &VerifyConfig) -> Result<(String, String, usize)> {
    let page = browser.new_page(&config.url).await?;

    page.wait_for_ready(config.timeout_ms).await?;
    page.wait_for_role_visible(&config.role, &config.name, config.timeout_ms)
        .await?;
    tracing::debug!(role = %config.role, name = %config.name, "element visible");

    let url = page.url().await?;
    let title = page.title().await?;

    let png = if config.full_page {
        page.screenshot_full_page().await?
    } else {
        page.screenshot().await?
    };
    std::fs::write(&config.output, &png)?;
    tracing::info!(
        path = %config.output.display(),
        bytes = png.len(),
        "screenshot written"
    );

    Ok((url, title, png.len()))
}
