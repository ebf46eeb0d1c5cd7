//! NetReptile: fetch rendered web pages with headless Chromium.
//!
//! The effective configuration is resolved from CLI flags, an optional JSON
//! config file, and defaults ([`config`]). A fetch normalizes the URL
//! ([`url`]), renders the page through a [`renderer::Renderer`], optionally
//! extracts text by selector ([`selectors`]), and writes the payload
//! ([`fetch`]).

pub mod config;
pub mod fetch;
pub mod renderer;
pub mod selectors;
pub mod url;

pub use config::{CliOverrides, EffectiveConfig, FileConfig, SelectorType};
pub use fetch::{fetch, fetch_and_shutdown, FetchOutcome, FetchRequest, PayloadKind};
pub use renderer::chromium::ChromiumRenderer;
pub use renderer::fixture::FixtureRenderer;
pub use renderer::{RenderContext, Renderer};
