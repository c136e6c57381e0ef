//! # Snapcheck
//!
//! Render verification for web pages.
//!
//! Snapcheck launches a headless Chrome/Chromium, loads a page, waits until an
//! element with a given accessibility role and accessible name is visible, and
//! writes a screenshot to disk as evidence. It speaks a minimal hand-rolled
//! subset of the Chrome DevTools Protocol, no driver binary required.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapcheck::{verify, VerifyConfig};
//!
//! #[tokio::main]
//! async fn main() -> snapcheck::Result<()> {
//!     let mut config = VerifyConfig::new("http://localhost:5173/dashboard", "Children");
//!     config.output = "dashboard.png".into();
//!
//!     let report = verify(&config).await?;
//!     println!("verified {} ({} bytes)", report.url, report.bytes_written);
//!     Ok(())
//! }
//! ```
//!
//! The lower-level pieces are usable on their own:
//!
//! ```rust,no_run
//! use snapcheck::Browser;
//!
//! # #[tokio::main]
//! # async fn main() -> snapcheck::Result<()> {
//! let browser = Browser::launch().await?;
//! let page = browser.new_page("https://example.com").await?;
//! page.wait_for_role_visible("heading", "Example Domain", 5_000).await?;
//! let png = page.screenshot().await?;
//! std::fs::write("example.png", png)?;
//! browser.close().await?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod browser;
pub mod cdp;
pub mod error;
pub mod page;
pub mod runner;

// Re-exports
pub use browser::Browser;
pub use error::{Error, Result};
pub use page::{Element, Page};
pub use runner::{verify, VerifyConfig, VerifyReport};

/// Browser launch options
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Headless mode
    pub headless: bool,
    /// Path to Chrome/Chromium binary (None = auto-discover)
    pub chrome_path: Option<PathBuf>,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

impl BrowserConfig {
    /// Create a visible (non-headless) config
    pub fn headed() -> Self {
        Self {
            headless: false,
            ..Default::default()
        }
    }
}
