//! Main analysis pipeline for LogParse.
//!
//! Validates paths, loads every log, computes the requested statistics per
//! file and writes the JSON report once at the end.

use std::path::{Path, PathBuf};
use std::time::Instant;

use logparse_core::error::{LogParseError, Result};
use logparse_core::metrics::compute_stats;
use logparse_core::models::{MetricRequest, Report};
use tracing::{info, warn};

use crate::reader::{load_files, verify_file_locations, LoadedFile};
use crate::writer::write_report;

// ── Public types ──────────────────────────────────────────────────────────────

/// Counters gathered over one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Input paths given on the command line.
    pub files_requested: usize,
    /// Files that were loaded and analysed.
    pub files_analysed: usize,
    /// Rows accepted across all analysed files.
    pub rows: usize,
    /// Lines dropped across all analysed files.
    pub bad_lines: usize,
    /// Metric computations that failed and were left out of the report.
    pub metric_failures: usize,
    /// Wall-clock seconds spent loading files.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent computing statistics.
    pub analysis_time_seconds: f64,
}

/// The complete output of [`analyze_logs`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub report: Report,
    pub summary: RunSummary,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Compute the requested statistics for each loaded file.
///
/// A metric that cannot be computed for a file is logged and omitted from
/// that file's entry; it never affects other metrics or other files.
pub fn analyze_files(files: &[LoadedFile], request: &MetricRequest) -> (Report, usize) {
    let mut report = Report::new();
    let mut failures = 0;

    for file in files {
        info!("Analysing {}", file.path.display());
        let (stats, failed) = compute_stats(&file.table, request);
        for (metric, e) in &failed {
            warn!("Skipping {} for {}: {}", metric, file.path.display(), e);
        }
        failures += failed.len();
        report.insert(file.path.display().to_string(), stats);
    }

    (report, failures)
}

/// Run the full pipeline.
///
/// 1. Reject an empty metric selection.
/// 2. Verify inputs are readable and `output` is writable.
/// 3. Load every recognised log file.
/// 4. Compute the requested metrics per file.
/// 5. Write the report to `output`.
///
/// Only steps 1 and 2 can fail the run before work starts; per-line,
/// per-file and per-metric problems are logged and skipped.
pub fn analyze_logs(
    inputs: &[PathBuf],
    output: &Path,
    request: &MetricRequest,
) -> Result<AnalysisResult> {
    if request.is_empty() {
        return Err(LogParseError::NoMetricSelected);
    }

    verify_file_locations(inputs, output)?;

    // ── Step 1: Load files ────────────────────────────────────────────────────
    let load_start = Instant::now();
    let files = load_files(inputs);
    let load_time_seconds = load_start.elapsed().as_secs_f64();

    // ── Step 2: Compute statistics ────────────────────────────────────────────
    let analysis_start = Instant::now();
    let (report, metric_failures) = analyze_files(&files, request);
    let analysis_time_seconds = analysis_start.elapsed().as_secs_f64();

    // ── Step 3: Write output ──────────────────────────────────────────────────
    write_report(&report, output)?;

    let summary = RunSummary {
        files_requested: inputs.len(),
        files_analysed: files.len(),
        rows: files.iter().map(|f| f.table.len()).sum(),
        bad_lines: files.iter().map(|f| f.bad_lines).sum(),
        metric_failures,
        load_time_seconds,
        analysis_time_seconds,
    };

    info!(
        "Analysed {}/{} files ({} rows, {} bad lines) in {:.3}s",
        summary.files_analysed,
        summary.files_requested,
        summary.rows,
        summary.bad_lines,
        load_time_seconds + analysis_time_seconds
    );

    Ok(AnalysisResult { report, summary })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
