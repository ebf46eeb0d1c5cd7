//! NetReptile: fetch a rendered web page and save it to a file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use netreptile::config::{self, CliOverrides};
use netreptile::{fetch_and_shutdown, ChromiumRenderer, FetchRequest, PayloadKind, SelectorType};

#[derive(Parser)]
#[command(
    name = "netreptile",
    about = "Fetch web page content using headless Chromium and save to file",
    version,
    after_help = "Examples:\n  netreptile https://example.com output.html\n  netreptile \"https://www.google.com\" google.html --timeout 60000\n  netreptile https://news.example.com news.txt --selector \".article-content\"\n  netreptile https://forum.example.com posts.txt --selector \"//div[@class='post']\" --selector-type xpath"
)]
struct Cli {
    /// URL of the web page to fetch
    url: String,

    /// Path to the output file where content will be saved
    output_file: PathBuf,

    /// JSON config file (timeout, selector, selector_type, baseurl, selectors)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Navigation timeout in milliseconds [default: 30000]
    #[arg(long)]
    timeout: Option<u64>,

    /// CSS selector or XPath of the containers to extract text from
    #[arg(long)]
    selector: Option<String>,

    /// Type of selector [default: css]
    #[arg(long, value_enum)]
    selector_type: Option<SelectorType>,

    /// Enable verbose/debug logging
    #[arg(long, short)]
    verbose: bool,
}

/// Exit code used when the user interrupts the fetch.
const EXIT_INTERRUPTED: i32 = 130;

/// How a run that did not fail ended.
enum RunStatus {
    Saved,
    Interrupted,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    reptile_core::logging::init(cli.verbose);

    // Consistent exit codes: 0=success, 1=error, 130=interrupted
    match run(cli).await {
        Ok(RunStatus::Saved) => {}
        Ok(RunStatus::Interrupted) => std::process::exit(EXIT_INTERRUPTED),
        Err(e) => {
            eprintln!("{}", reptile_core::error_line(&e));
            std::process::exit(1);
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

async fn run(cli: Cli) -> Result<RunStatus> {
    let overrides = CliOverrides {
        timeout: cli.timeout,
        selector: cli.selector,
        selector_type: cli.selector_type,
    };
    let config = config::resolve_from_path(cli.config.as_deref(), &overrides)?;

    let request = FetchRequest {
        url: cli.url,
        output_path: cli.output_file,
        config,
    };

    let renderer = tokio::select! {
        renderer = ChromiumRenderer::new() => renderer?,
        _ = interrupted() => {
            tracing::info!("Operation cancelled by user");
            return Ok(RunStatus::Interrupted);
        }
    };

    let Some(outcome) = fetch_and_shutdown(&renderer, &request, interrupted())
        .await
        .with_context(|| format!("failed to process {}", request.url))?
    else {
        return Ok(RunStatus::Interrupted);
    };

    if let PayloadKind::Selector { matches: 0 } = outcome.kind {
        tracing::warn!("Selector matched no text; wrote an empty file");
    }
    tracing::debug!("fetched {} ({} bytes)", outcome.url, outcome.bytes);
    println!(
        "Successfully saved page content to: {}",
        request.output_path.display()
    );
    Ok(RunStatus::Saved)
}
