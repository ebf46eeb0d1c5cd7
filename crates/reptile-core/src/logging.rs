//! Logging setup shared by both binaries.

use tracing_subscriber::EnvFilter;

/// Level used when `--verbose` is passed and `RUST_LOG` is unset.
pub const VERBOSE_LEVEL: &str = "debug";
/// Level used by default when `RUST_LOG` is unset.
pub const DEFAULT_LEVEL: &str = "info";

/// Pick the filter directive for the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LEVEL
    } else {
        DEFAULT_LEVEL
    }
}

/// Install the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the verbosity flag.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if verbose {
        tracing::debug!("Verbose mode enabled");
    }
}
