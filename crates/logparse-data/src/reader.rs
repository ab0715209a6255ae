//! Access log validation and loading for LogParse.
//!
//! Checks input and output paths up front, then reads whitespace-separated
//! Squid access logs into [`LogTable`]s. Malformed lines are dropped and
//! reported; a bad file is skipped without stopping the run.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use logparse_core::error::{LineError, LogParseError, Result};
use logparse_core::models::{
    LogRecord, LogTable, BYTES_FIELD, CLIENT_FIELD, MIN_FIELDS, TIMESTAMP_FIELD,
};
use tracing::{debug, error, info, warn};

/// File name suffix of logs LogParse knows how to read.
pub const LOG_SUFFIX: &str = ".log";

// ── Public types ──────────────────────────────────────────────────────────────

/// A file that was read and parsed successfully.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub table: LogTable,
    /// Lines dropped while parsing.
    pub bad_lines: usize,
}

/// A line that could not be turned into a [`LogRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct BadLine {
    /// 1-based line number within the file.
    pub line_number: usize,
    pub line: String,
    pub error: LineError,
}

/// Result of parsing one file's content.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub table: LogTable,
    pub bad_lines: Vec<BadLine>,
}

// ── Path validation ───────────────────────────────────────────────────────────

/// Verify every input can be read and the output can be written before any
/// file is parsed.
///
/// All missing inputs are reported together, then all unreadable ones. The
/// output file is created (or truncated) as part of the check.
pub fn verify_file_locations(inputs: &[PathBuf], output: &Path) -> Result<()> {
    let mut not_found = Vec::new();
    let mut not_readable = Vec::new();

    for path in inputs {
        if !path.exists() {
            not_found.push(path.clone());
        } else if !is_readable(path) {
            not_readable.push(path.clone());
        }
    }

    if !not_found.is_empty() {
        return Err(LogParseError::InputNotFound(not_found));
    }
    if !not_readable.is_empty() {
        return Err(LogParseError::InputNotReadable(not_readable));
    }

    if inputs.iter().any(|p| same_file(p, output)) {
        return Err(LogParseError::OutputNotWritable {
            path: output.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "output path is also an input file",
            ),
        });
    }

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(output)
        .map_err(|source| LogParseError::OutputNotWritable {
            path: output.to_path_buf(),
            source,
        })?;

    Ok(())
}

fn is_readable(path: &Path) -> bool {
    path.is_file() && std::fs::File::open(path).is_ok()
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse a single non-blank log line.
///
/// `max_fields` is the width fixed by the first good row of the file; lines
/// wider than that are rejected. Narrower lines are accepted as long as the
/// positional fields are present.
pub fn parse_line(line: &str, max_fields: Option<usize>) -> std::result::Result<LogRecord, LineError> {
    let fields: Vec<&str> = line.split_whitespace().collect();

    if fields.len() < MIN_FIELDS {
        return Err(LineError::TooFewFields {
            expected: MIN_FIELDS,
            found: fields.len(),
        });
    }
    if let Some(max) = max_fields {
        if fields.len() > max {
            return Err(LineError::TooManyFields {
                expected: max,
                found: fields.len(),
            });
        }
    }

    let raw_ts = fields[TIMESTAMP_FIELD];
    let timestamp = raw_ts
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| LineError::InvalidTimestamp(raw_ts.to_string()))?;

    let raw_bytes = fields[BYTES_FIELD];
    let bytes = raw_bytes
        .parse::<u64>()
        .map_err(|_| LineError::InvalidBytes(raw_bytes.to_string()))?;

    Ok(LogRecord {
        timestamp,
        client: fields[CLIENT_FIELD].to_string(),
        bytes,
        field_count: fields.len(),
    })
}

/// Parse a whole file's content into a table plus the lines that were
/// rejected. Blank lines are skipped silently.
pub fn parse_log(content: &[u8]) -> ParseOutcome {
    let mut records = Vec::new();
    let mut bad_lines = Vec::new();
    let mut width: Option<usize> = None;

    for (idx, raw) in content.split(|&b| b == b'\n').enumerate() {
        let line_number = idx + 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

        let line = match std::str::from_utf8(raw) {
            Ok(l) => l,
            Err(_) => {
                bad_lines.push(BadLine {
                    line_number,
                    line: String::from_utf8_lossy(raw).into_owned(),
                    error: LineError::InvalidEncoding,
                });
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line, width) {
            Ok(record) => {
                width.get_or_insert(record.field_count);
                records.push(record);
            }
            Err(error) => bad_lines.push(BadLine {
                line_number,
                line: line.to_string(),
                error,
            }),
        }
    }

    ParseOutcome {
        table: LogTable::new(records),
        bad_lines,
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Whether `path` carries the recognised log suffix.
pub fn has_log_suffix(path: &Path) -> bool {
    path.to_string_lossy().ends_with(LOG_SUFFIX)
}

/// Read and parse one log file, logging each rejected line.
///
/// Fails when the file cannot be read or yields no rows at all.
pub fn load_file(path: &Path) -> Result<LoadedFile> {
    let content = std::fs::read(path).map_err(|source| LogParseError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let outcome = parse_log(&content);
    for bad in &outcome.bad_lines {
        warn!(
            "Bad line {} in {}: {} ({})",
            bad.line_number,
            path.display(),
            bad.line,
            bad.error
        );
    }

    if outcome.table.is_empty() {
        return Err(LogParseError::NoRows(path.to_path_buf()));
    }

    debug!(
        "File {}: {} rows, {} bad lines",
        path.display(),
        outcome.table.len(),
        outcome.bad_lines.len()
    );

    Ok(LoadedFile {
        path: path.to_path_buf(),
        table: outcome.table,
        bad_lines: outcome.bad_lines.len(),
    })
}

/// Load every recognised log among `paths`, in order.
///
/// Unrecognised, unreadable and empty files are logged and left out; a
/// path given more than once is loaded once.
pub fn load_files(paths: &[PathBuf]) -> Vec<LoadedFile> {
    let mut seen: HashSet<&Path> = HashSet::new();
    let mut loaded = Vec::new();

    for path in paths {
        info!("Loading file: {}", path.display());

        if !seen.insert(path.as_path()) {
            warn!("Duplicate input {} already loaded, skipping", path.display());
            continue;
        }
        if !has_log_suffix(path) {
            error!("{}", LogParseError::UnrecognizedFormat(path.clone()));
            continue;
        }

        match load_file(path) {
            Ok(file) => loaded.push(file),
            Err(e) => error!("{}, skipping", e),
        }
    }

    info!("Files loaded");
    loaded
}

// ── Tests ─────────────────────────────────────────────────────────────────────
