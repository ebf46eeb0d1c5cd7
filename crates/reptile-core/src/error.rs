//! Error type shared by the fetch and tag-extraction tools.

use std::path::PathBuf;

/// All errors that can end a netreptile invocation.
#[derive(thiserror::Error, Debug)]
pub enum ReptileError {
    /// Missing or malformed config file, or an invalid option value.
    #[error("Config error: {0}")]
    Config(String),

    /// The page could not be reached or did not settle before the deadline.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// A selector could not be parsed or evaluated.
    #[error("Selector error: {0}")]
    Selector(String),

    /// The browser could not be launched or stopped responding.
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReptileError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReptileError::Io {
            path: path.into(),
            source,
        }
    }

    /// Short category label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ReptileError::Config(_) => "config",
            ReptileError::Navigation(_) => "navigation",
            ReptileError::Selector(_) => "selector",
            ReptileError::Browser(_) => "browser",
            ReptileError::Io { .. } => "io",
        }
    }
}

/// Convenience result type.
pub type ReptileResult<T> = Result<T, ReptileError>;

/// The one line a binary prints to stderr before exiting with an error.
///
/// Uses the alternate form so an `anyhow` chain prints every cause.
pub fn error_line(err: &impl std::fmt::Display) -> String {
    format!("Error: {err:#}")
}
