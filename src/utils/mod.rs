//! The `utils` module provides shared definitions used across the `sbexport`
//! pipeline.
//!
//! - `error`: the single error type every stage of the export propagates.
//! - `logging`: tracing subscriber setup. Logs go to stderr so stdout only ever
//!   carries the exported document.

pub mod error;
pub mod logging;

pub use error::{ExportError, Result};
