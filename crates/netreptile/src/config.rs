//! Configuration resolution: CLI flags over config file over defaults.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use reptile_core::{ReptileError, ReptileResult};

use crate::selectors::SelectorSpec;

/// Default navigation timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Query language of a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectorType {
    #[default]
    Css,
    Xpath,
}

impl fmt::Display for SelectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorType::Css => write!(f, "css"),
            SelectorType::Xpath => write!(f, "xpath"),
        }
    }
}

/// Contents of a JSON config file. Every field is optional; unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub timeout: Option<u64>,
    pub selector: Option<String>,
    pub selector_type: Option<SelectorType>,
    pub baseurl: Option<String>,
    pub selectors: Option<Vec<SelectorSpec>>,
}

/// Values supplied on the command line. `None` means the flag was not given.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub timeout: Option<u64>,
    pub selector: Option<String>,
    pub selector_type: Option<SelectorType>,
}

/// The configuration a fetch runs with. Immutable once resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveConfig {
    pub timeout_ms: u64,
    pub selector: Option<String>,
    pub selector_type: SelectorType,
    pub baseurl: Option<String>,
    pub selectors: Vec<SelectorSpec>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            selector: None,
            selector_type: SelectorType::Css,
            baseurl: None,
            selectors: Vec::new(),
        }
    }
}

impl FileConfig {
    /// Parse a config file from JSON text.
    pub fn from_json(text: &str) -> ReptileResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ReptileError::Config(format!("invalid config JSON: {e}")))
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> ReptileResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ReptileError::Config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            ReptileError::Config(format!("invalid config file {}: {e}", path.display()))
        })?;
        tracing::info!("Loaded config from {}", path.display());
        tracing::debug!("config file values: {config:?}");
        Ok(config)
    }
}

/// Merge the three sources. Each field independently takes the CLI value if
/// present, else the file value if present, else the default.
///
/// A CLI selector also replaces a complex `selectors` list from the file.
pub fn resolve(
    defaults: &EffectiveConfig,
    file: Option<&FileConfig>,
    cli: &CliOverrides,
) -> EffectiveConfig {
    let file_timeout = file.and_then(|f| f.timeout);
    let file_selector = file.and_then(|f| f.selector.clone());
    let file_selector_type = file.and_then(|f| f.selector_type);
    let file_baseurl = file.and_then(|f| f.baseurl.clone());
    let file_selectors = file.and_then(|f| f.selectors.clone());

    let selectors = if cli.selector.is_some() {
        Vec::new()
    } else {
        file_selectors.unwrap_or_else(|| defaults.selectors.clone())
    };

    EffectiveConfig {
        timeout_ms: cli.timeout.or(file_timeout).unwrap_or(defaults.timeout_ms),
        selector: cli
            .selector
            .clone()
            .or(file_selector)
            .or_else(|| defaults.selector.clone()),
        selector_type: cli
            .selector_type
            .or(file_selector_type)
            .unwrap_or(defaults.selector_type),
        baseurl: file_baseurl.or_else(|| defaults.baseurl.clone()),
        selectors,
    }
}

/// Load the optional config file and resolve against the built-in defaults.
pub fn resolve_from_path(path: Option<&Path>, cli: &CliOverrides) -> ReptileResult<EffectiveConfig> {
    let file = path.map(FileConfig::load).transpose()?;
    let config = resolve(&EffectiveConfig::default(), file.as_ref(), cli);
    tracing::debug!("effective config: {config:?}");
    Ok(config)
}
