use std::path::PathBuf;
use thiserror::Error;

/// Run- and file-level errors produced by LogParse.
#[derive(Error, Debug)]
pub enum LogParseError {
    /// None of the metric flags was switched on.
    #[error("At least one of the Output Information flags is required")]
    NoMetricSelected,

    /// One or more input paths do not exist.
    #[error("Input file(s) not found:\n{}", join_paths(.0))]
    InputNotFound(Vec<PathBuf>),

    /// One or more input paths exist but cannot be read.
    #[error("Unable to read [Permission Denied]:\n{}", join_paths(.0))]
    InputNotReadable(Vec<PathBuf>),

    /// The output destination cannot be opened for writing.
    #[error("Write permissions denied for {path}: {source}")]
    OutputNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file name does not carry the `.log` suffix.
    #[error("File format not recognised: {0}")]
    UnrecognizedFormat(PathBuf),

    /// The file contained no parseable rows.
    #[error("File not in expected format [SSV], no rows parsed: {0}")]
    NoRows(PathBuf),

    /// The JSON report could not be serialized.
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single log line was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("expected at least {expected} fields, saw {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("expected at most {expected} fields, saw {found}")]
    TooManyFields { expected: usize, found: usize },

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("invalid byte count: {0:?}")]
    InvalidBytes(String),

    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

/// Errors raised while computing a single statistic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricError {
    /// The metric has no defined value over zero rows.
    #[error("cannot compute {0} over an empty table")]
    EmptyInput(&'static str),

    /// The byte total does not fit in 64 bits.
    #[error("total bytes overflowed u64")]
    BytesOverflow,
}

/// Convenience alias used throughout the LogParse crates.
pub type Result<T> = std::result::Result<T, LogParseError>;

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
