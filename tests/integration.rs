//! Integration tests for snapcheck
//!
//! Browser tests require Chrome to be installed and available.
//! Run with: cargo test --test integration -- --ignored

use std::path::PathBuf;

use snapcheck::{verify, Browser, BrowserConfig, Error, VerifyConfig};

/// Check if Chrome is available
fn chrome_available() -> bool {
    snapcheck::browser::find_chrome().is_ok()
}

/// Build a data: URL serving the given HTML
fn data_url(html: &str) -> String {
    format!("data:text/html,{}", html)
}

/// Per-test screenshot path under the system temp dir
fn temp_png(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "snapcheck-test-{}-{}.png",
        std::process::id(),
        name
    ))
}

// =============================================================================
// Tests that do not need a browser
// =============================================================================

#[test]
fn verify_config_defaults() {
    let config = VerifyConfig::new("http://localhost:5173/dashboard", "Children");
    assert_eq!(config.url, "http://localhost:5173/dashboard");
    assert_eq!(config.role, "heading");
    assert_eq!(config.name, "Children");
    assert_eq!(config.output, PathBuf::from("verification.png"));
    assert_eq!(config.timeout_ms, 10_000);
    assert!(!config.full_page);
    assert!(config.browser.headless);
    assert_eq!(config.browser.viewport_width, 1280);
    assert_eq!(config.browser.viewport_height, 720);
    assert!(config.browser.chrome_path.is_none());
}

#[test]
fn browser_config_headed() {
    let config = BrowserConfig::headed();
    assert!(!config.headless);
    assert_eq!(config.viewport_width, 1280);
}

#[test]
fn error_display() {
    let err = Error::Navigation("net::ERR_CONNECTION_REFUSED".into());
    assert_eq!(
        err.to_string(),
        "Navigation failed: net::ERR_CONNECTION_REFUSED"
    );

    let err = Error::Timeout("No visible heading named 'Children' within 10000ms".into());
    assert!(err.to_string().starts_with("Timeout:"));

    assert_eq!(
        Error::ChromeNotFound.to_string(),
        "No Chrome or Chromium binary found"
    );
}

#[test]
fn devtools_url_parsing() {
    use snapcheck::cdp::transport::devtools_url_from_line;

    let line = "DevTools listening on ws://127.0.0.1:33445/devtools/browser/5a8c-11f0";
    assert_eq!(
        devtools_url_from_line(line),
        Some("ws://127.0.0.1:33445/devtools/browser/5a8c-11f0")
    );

    assert_eq!(
        devtools_url_from_line("[1108/121314.567:ERROR:gpu_init.cc] Passthrough is not supported"),
        None
    );
    assert_eq!(devtools_url_from_line(""), None);
}

// =============================================================================
// Browser tests
// =============================================================================

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_browser_launch() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let version = browser.version().await.expect("Failed to get version");
    assert!(!version.is_empty());
    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_navigation_and_title() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page("about:blank")
        .await
        .expect("Failed to create page");

    page.goto(&data_url("<title>Dashboard</title><h1>Children</h1>"))
        .await
        .expect("Failed to navigate");
    page.wait_for_ready(5_000).await.expect("Load never settled");

    let title = page.title().await.expect("Failed to get title");
    assert_eq!(title, "Dashboard");

    let url = page.url().await.expect("Failed to get URL");
    assert!(url.starts_with("data:"));

    let content = page.content().await.expect("Failed to get content");
    assert!(content.contains("Children"));

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_wait_for_delayed_element() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page(&data_url(
            r#"<script>
                setTimeout(() => {
                    document.body.innerHTML = '<h1 id="late">Children</h1>';
                }, 100);
            </script>"#,
        ))
        .await
        .expect("Failed to create page");

    let element = page.wait_for("#late", 5_000).await.expect("Element never appeared");
    let html = element.outer_html().await.expect("Failed to get HTML");
    assert!(html.contains("Children"));

    // The role-based wait tolerates late-rendered content the same way
    page.wait_for_role_visible("heading", "Children", 5_000)
        .await
        .expect("Late heading not found");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_find_by_role_native_heading() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page(&data_url("<h1>Children</h1><p>Two kids registered</p>"))
        .await
        .expect("Failed to create page");

    let heading = page
        .wait_for_role_visible("heading", "Children", 5_000)
        .await
        .expect("Heading not found");
    assert!(heading.is_visible().await.expect("Visibility check failed"));
    let html = heading.outer_html().await.expect("Failed to get HTML");
    assert!(html.contains("<h1>"));

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_find_by_role_role_attribute() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page(&data_url(
            r#"<div role="heading" aria-level="1">Children</div>"#,
        ))
        .await
        .expect("Failed to create page");

    page.wait_for_role_visible("heading", "Children", 5_000)
        .await
        .expect("Role-attribute heading not found");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_accessible_name_from_aria_label() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page(&data_url(r#"<h2 aria-label="Children">Kids</h2>"#))
        .await
        .expect("Failed to create page");

    // aria-label wins over the rendered text
    page.wait_for_role_visible("heading", "Children", 5_000)
        .await
        .expect("aria-label name not matched");
    let result = page.find_by_role("heading", "Kids").await;
    assert!(result.is_err());

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_accessible_name_from_aria_labelledby() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page(&data_url(
            r#"<span id="lbl">Children</span><h2 aria-labelledby="lbl">overview</h2>"#,
        ))
        .await
        .expect("Failed to create page");

    page.wait_for_role_visible("heading", "Children", 5_000)
        .await
        .expect("aria-labelledby name not matched");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_accessible_name_normalization() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page(&data_url("<h1>  children   of the   corn </h1>"))
        .await
        .expect("Failed to create page");

    // Case-insensitive, whitespace-normalized, full-string match
    page.wait_for_role_visible("heading", "Children of the Corn", 5_000)
        .await
        .expect("Normalized name not matched");
    let partial = page.find_by_role("heading", "Children").await;
    assert!(partial.is_err(), "partial names must not match");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_missing_heading_times_out() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page(&data_url("<p>No headings on this page</p>"))
        .await
        .expect("Failed to create page");

    let result = page.wait_for_role_visible("heading", "Children", 1_000).await;
    match result {
        Err(Error::Timeout(_)) => {}
        other => panic!("Expected timeout, got {:?}", other.map(|_| ())),
    }

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_hidden_heading_not_matched() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page(&data_url(
            r#"<h1 style="display:none">Children</h1>"#,
        ))
        .await
        .expect("Failed to create page");

    let result = page.wait_for_role_visible("heading", "Children", 1_000).await;
    assert!(result.is_err(), "hidden heading must not satisfy the wait");

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_navigation_connection_refused() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    // Bind to grab a free port, then drop the listener so nothing is there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        listener.local_addr().expect("No local addr").port()
    };
    let url = format!("http://127.0.0.1:{}/dashboard", port);

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let result = browser.new_page(&url).await;
    match result {
        Err(Error::Navigation(text)) => assert!(text.contains("ERR"), "got: {}", text),
        Err(other) => panic!("Expected navigation error, got {:?}", other),
        Ok(_) => panic!("Navigation to a dead port should fail"),
    }

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_screenshot_png_signature() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page(&data_url("<body style='background:red'><h1>Red</h1></body>"))
        .await
        .expect("Failed to create page");

    let png = page.screenshot().await.expect("Failed to take screenshot");
    assert!(png.len() > 100);
    assert_eq!(&png[0..4], &[0x89, 0x50, 0x4E, 0x47]); // PNG signature

    let full = page
        .screenshot_full_page()
        .await
        .expect("Failed to take full-page screenshot");
    assert_eq!(&full[0..4], &[0x89, 0x50, 0x4E, 0x47]);

    browser.close().await.expect("Failed to close browser");
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_close_page() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let browser = Browser::launch().await.expect("Failed to launch browser");
    let page = browser
        .new_page(&data_url("<h1>Children</h1>"))
        .await
        .expect("Failed to create page");

    browser.close_page(&page).await.expect("Failed to close page");
    browser.close().await.expect("Failed to close browser");
}

// =============================================================================
// End-to-end verification runs
// =============================================================================

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_verify_happy_path_overwrites() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let mut config = VerifyConfig::new(
        data_url("<title>Dashboard</title><h1>Children</h1>"),
        "Children",
    );
    config.output = temp_png("happy");
    let _ = std::fs::remove_file(&config.output);

    let report = verify(&config).await.expect("Verification failed");
    assert!(config.output.exists());
    assert_eq!(report.title, "Dashboard");
    assert!(report.bytes_written > 100);

    let png = std::fs::read(&config.output).expect("Failed to read screenshot");
    assert_eq!(png.len(), report.bytes_written);
    assert_eq!(&png[0..4], &[0x89, 0x50, 0x4E, 0x47]);

    // Running again overwrites the file without manual cleanup
    let report = verify(&config).await.expect("Second run failed");
    assert!(report.bytes_written > 100);

    let _ = std::fs::remove_file(&config.output);
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_verify_missing_element_writes_nothing() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let mut config = VerifyConfig::new(data_url("<p>Still loading...</p>"), "Children");
    config.output = temp_png("missing-element");
    config.timeout_ms = 1_500;
    let _ = std::fs::remove_file(&config.output);

    let result = verify(&config).await;
    match result {
        Err(Error::Timeout(_)) => {}
        other => panic!("Expected timeout, got {:?}", other.map(|_| ())),
    }
    assert!(
        !config.output.exists(),
        "failed run must not leave a screenshot behind"
    );
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_verify_unreachable_server_writes_nothing() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        listener.local_addr().expect("No local addr").port()
    };
    let mut config = VerifyConfig::new(format!("http://127.0.0.1:{}/dashboard", port), "Children");
    config.output = temp_png("unreachable");
    let _ = std::fs::remove_file(&config.output);

    let result = verify(&config).await;
    match result {
        Err(Error::Navigation(_)) => {}
        other => panic!("Expected navigation error, got {:?}", other.map(|_| ())),
    }
    assert!(!config.output.exists());
}

#[tokio::test]
#[ignore = "requires Chrome"]
async fn test_verify_missing_output_dir_fails() {
    if !chrome_available() {
        eprintln!("Chrome not found, skipping test");
        return;
    }

    let mut config = VerifyConfig::new(data_url("<h1>Children</h1>"), "Children");
    // The parent directory is an external collaborator; it is not created here
    config.output = std::env::temp_dir()
        .join(format!("snapcheck-no-such-dir-{}", std::process::id()))
        .join("verification.png");

    let result = verify(&config).await;
    match result {
        Err(Error::Io(_)) => {}
        other => panic!("Expected IO error, got {:?}", other.map(|_| ())),
    }
}
