//! Shared plumbing for the netreptile tools: the error type, output writing,
//! and logging setup.

pub mod error;
pub mod logging;
pub mod output;

pub use error::{error_line, ReptileError, ReptileResult};
pub use output::{join_items, write_output};
