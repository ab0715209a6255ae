//! Core types for LogParse.
//!
//! Holds the row and table model for proxy access logs, the closed set of
//! per-file statistics and their computation, the error taxonomy, and the
//! command-line settings.

pub mod error;
pub mod metrics;
pub mod models;
pub mod settings;
