//! Data ingestion layer for LogParse.
//!
//! Responsible for validating input and output paths, reading and parsing
//! whitespace-separated proxy access logs, running the per-file analysis
//! pipeline and writing the JSON report.

pub mod analysis;
pub mod reader;
pub mod writer;

pub use logparse_core as core;
