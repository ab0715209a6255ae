use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::error::Result;
use crate::models::{Metric, MetricRequest};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Parse Squid proxy access logs and report per-file statistics as JSON
#[derive(Parser, Debug, Clone)]
#[command(
    name = "logparse",
    about = "Parse SquidProxy logs and report per-file statistics as JSON",
    version,
    group(
        ArgGroup::new("output_information")
            .args(["mfip", "lfip", "eps", "bytes"])
            .required(true)
            .multiple(true)
    )
)]
pub struct Settings {
    /// One or more files to parse
    #[arg(
        short = 'i',
        long = "input-file-path",
        visible_alias = "inputFilePath",
        num_args = 1..,
        required = true
    )]
    pub input_file_path: Vec<PathBuf>,

    /// Path to a file to save output in plain text JSON format
    #[arg(
        short = 'o',
        long = "output-file-path",
        visible_alias = "outputFilePath",
        required = true
    )]
    pub output_file_path: PathBuf,

    /// Most frequent IP
    #[arg(long, help_heading = "Output Information")]
    pub mfip: bool,

    /// Least frequent IP
    #[arg(long, help_heading = "Output Information")]
    pub lfip: bool,

    /// Events per Second
    #[arg(long, help_heading = "Output Information")]
    pub eps: bool,

    /// Total amount of bytes exchanged
    #[arg(long, help_heading = "Output Information")]
    pub bytes: bool,

    /// Logging level
    #[arg(
        long,
        env = "LOGPARSE_LOG_LEVEL",
        default_value = "INFO",
        value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"]
    )]
    pub log_level: String,

    /// Log file path (logs go to stderr when unset)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Whether the flag for `metric` was passed.
    pub fn is_enabled(&self, metric: Metric) -> bool {
        match metric {
            Metric::MostFrequentIp => self.mfip,
            Metric::LeastFrequentIp => self.lfip,
            Metric::EventsPerSecond => self.eps,
            Metric::TotalBytes => self.bytes,
        }
    }

    /// The set of metrics selected on the command line.
    ///
    /// Fails with [`LogParseError::NoMetricSelected`](crate::error::LogParseError)
    /// when no flag is set, which clap already enforces for parsed settings.
    pub fn metric_request(&self) -> Result<MetricRequest> {
        MetricRequest::new(Metric::ALL.into_iter().filter(|m| self.is_enabled(*m)))
    }

    /// The log level to run with; `--debug` wins over `--log-level`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
