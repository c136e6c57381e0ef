use std::path::PathBuf;

use clap::Parser;

use snapcheck::{verify, VerifyConfig};

#[derive(Parser, Debug)]
#[command(
    name = "snapcheck",
    version,
    about = "Verify a page renders an element and capture screenshot evidence"
)]
struct Cli {
    /// Page to load
    #[arg(long, default_value = "http://localhost:5173/dashboard")]
    url: String,
    /// Accessibility role of the element to wait for
    #[arg(long, default_value = "heading")]
    role: String,
    /// Accessible name of the element to wait for
    #[arg(long, default_value = "Children")]
    name: String,
    /// Screenshot path (parent directory must exist)
    #[arg(long, default_value = "jules-scratch/verification/verification.png")]
    output: PathBuf,
    /// Budget in milliseconds for the load wait and the element wait, each
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
    /// Capture the full page instead of the viewport
    #[arg(long, default_value_t = false)]
    full_page: bool,
    /// Run with a visible browser window
    #[arg(long, default_value_t = false)]
    headed: bool,
    /// Path to the Chrome/Chromium binary
    #[arg(long)]
    chrome_path: Option<PathBuf>,
    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280)]
    viewport_width: u32,
    /// Viewport height in pixels
    #[arg(long, default_value_t = 720)]
    viewport_height: u32,
}

#[tokio::main]
async fn main() -> snapcheck::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = VerifyConfig::new(cli.url, cli.name);
    config.role = cli.role;
    config.output = cli.output;
    config.timeout_ms = cli.timeout_ms;
    config.full_page = cli.full_page;
    config.browser.headless = !cli.headed;
    config.browser.chrome_path = cli.chrome_path;
    config.browser.viewport_width = cli.viewport_width;
    config.browser.viewport_height = cli.viewport_height;

    let report = verify(&config).await?;

    tracing::info!(
        url = %report.url,
        title = %report.title,
        path = %report.output.display(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "page verified"
    );

    Ok(())
}
