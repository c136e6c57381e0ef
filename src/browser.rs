//! Browser Launcher
//!
//! Handles Chrome discovery, launching with headless-friendly flags, and
//! connection setup.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cdp::transport::launch_chrome;
use crate::cdp::{Connection, Transport};
use crate::error::{Error, Result};
use crate::page::Page;
use crate::BrowserConfig;

/// Global counter for unique user data directories
static BROWSER_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Locate a Chrome/Chromium binary at the usual install paths
pub fn find_chrome() -> Result<PathBuf> {
    let candidates = if cfg!(target_os = "macos") {
        vec![
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ]
    } else if cfg!(target_os = "windows") {
        vec![
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    } else {
        vec![]
    };

    for candidate in candidates {
        let path = Path::new(candidate);
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    Err(Error::ChromeNotFound)
}

/// Launch arguments for an unattended browser run
fn launch_args(config: &BrowserConfig) -> Vec<String> {
    let mut args = vec![
        "--no-first-run".into(),
        "--no-default-browser-check".into(),
        "--no-sandbox".into(),
        "--disable-dev-shm-usage".into(),
        "--disable-gpu".into(),
        "--disable-extensions".into(),
        "--disable-sync".into(),
        "--mute-audio".into(),
        "--hide-scrollbars".into(),
        format!(
            "--window-size={},{}",
            config.viewport_width, config.viewport_height
        ),
    ];

    if config.headless {
        args.push("--headless=new".into());
    }

    args
}

/// A running browser instance
pub struct Browser {
    connection: Connection,
    /// User data directory (cleaned up on close)
    user_data_dir: PathBuf,
}

impl Browser {
    /// Launch a headless browser with default config
    pub async fn launch() -> Result<Self> {
        Self::launch_with_config(BrowserConfig::default()).await
    }

    /// Launch with custom config
    pub async fn launch_with_config(config: BrowserConfig) -> Result<Self> {
        // Create unique user data directory
        let instance_id = BROWSER_COUNTER.fetch_add(1, Ordering::Relaxed);
        let user_data_dir = std::env::temp_dir().join(format!(
            "snapcheck-browser-{}-{}",
            std::process::id(),
            instance_id
        ));

        // Clean up any stale data
        let _ = std::fs::remove_dir_all(&user_data_dir);
        std::fs::create_dir_all(&user_data_dir)?;

        // Find Chrome path
        let chrome_path = match &config.chrome_path {
            Some(p) => p.clone(),
            None => find_chrome()?,
        };

        // Build args
        let mut args = launch_args(&config);
        args.push(format!("--user-data-dir={}", user_data_dir.display()));

        // Launch Chrome
        tracing::info!("Launching Chrome from {:?}", chrome_path);
        let (child, ws_url) = launch_chrome(&chrome_path, &args)?;

        // Create transport and connection
        let transport = Transport::new(child, &ws_url)?;
        let connection = Connection::new(transport);

        // Get browser version
        let version = connection.version().await?;
        tracing::info!("Connected to Chrome: {}", version.product);

        Ok(Self {
            connection,
            user_data_dir,
        })
    }

    /// Create a new page and navigate to URL
    pub async fn new_page(&self, url: &str) -> Result<Page> {
        // Create a new target (window size is set via --window-size Chrome arg)
        let target_id = self.connection.create_target("about:blank").await?;

        // Attach to the target
        let session = self.connection.attach_to_target(&target_id).await?;

        // Enable page events
        session.page_enable().await?;

        // Navigate to URL
        let nav_result = session.navigate(url).await?;
        if let Some(error) = nav_result.error_text {
            return Err(Error::Navigation(error));
        }

        // Brief settle time for the initial page load to start.
        // For reliable waiting, callers should use page.wait_for_ready() or
        // page.wait_for(selector, timeout) after this returns.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        Ok(Page::new(session))
    }

    /// Get the browser version
    pub async fn version(&self) -> Result<String> {
        let v = self.connection.version().await?;
        Ok(v.product)
    }

    /// Close a page, releasing its target
    pub async fn close_page(&self, page: &Page) -> Result<()> {
        self.connection.close_target(page.target_id()).await?;
        Ok(())
    }

    /// Close the browser
    pub async fn close(self) -> Result<()> {
        self.connection.close().await?;

        // Clean up user data directory
        let _ = std::fs::remove_dir_all(&self.user_data_dir);

        Ok(())
    }
}

impl Drop for Browser {
    fn drop(&mut self) {
        // Best-effort cleanup of user data directory if close() wasn't called.
        // The Transport's Drop impl handles killing the Chrome process.
        let _ = std::fs::remove_dir_all(&self.user_data_dir);
    }
}
