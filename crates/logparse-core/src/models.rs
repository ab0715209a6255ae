use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{LogParseError, Result};

/// Minimum number of whitespace-separated fields a row must carry: timestamp,
/// elapsed, client, result code and byte count.
pub const MIN_FIELDS: usize = 5;

/// Column positions within a Squid native access log line.
pub const TIMESTAMP_FIELD: usize = 0;
pub const CLIENT_FIELD: usize = 2;
pub const BYTES_FIELD: usize = 4;

// ── LogRecord / LogTable ───────────────────────────────────────────────────────

/// A single row parsed from a proxy access log.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Request completion time in epoch seconds (sub-second precision kept).
    pub timestamp: f64,
    /// Client address as written in the log.
    pub client: String,
    /// Bytes delivered to the client.
    pub bytes: u64,
    /// Number of fields the source line had.
    pub field_count: usize,
}

/// An immutable, ordered set of rows loaded from one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogTable {
    records: Vec<LogRecord>,
}

impl LogTable {
    pub fn new(records: Vec<LogRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogRecord> {
        self.records.iter()
    }
}

impl FromIterator<LogRecord> for LogTable {
    fn from_iter<I: IntoIterator<Item = LogRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LogTable {
    type Item = &'a LogRecord;
    type IntoIter = std::slice::Iter<'a, LogRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── Metric ─────────────────────────────────────────────────────────────────────

/// The closed set of statistics LogParse knows how to compute.
///
/// Declaration order is the order metrics appear in the JSON report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "mfip")]
    MostFrequentIp,
    #[serde(rename = "lfip")]
    LeastFrequentIp,
    #[serde(rename = "eps")]
    EventsPerSecond,
    #[serde(rename = "bytes")]
    TotalBytes,
}

impl Metric {
    /// Every supported metric, in report order.
    pub const ALL: [Metric; 4] = [
        Metric::MostFrequentIp,
        Metric::LeastFrequentIp,
        Metric::EventsPerSecond,
        Metric::TotalBytes,
    ];

    /// CLI flag name (without dashes), also used as the JSON key.
    pub fn key(self) -> &'static str {
        match self {
            Metric::MostFrequentIp => "mfip",
            Metric::LeastFrequentIp => "lfip",
            Metric::EventsPerSecond => "eps",
            Metric::TotalBytes => "bytes",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ── MetricValue ────────────────────────────────────────────────────────────────

/// A computed statistic, serialized as a bare JSON string, number or integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{}", v),
            MetricValue::Text(v) => f.write_str(v),
        }
    }
}

// ── MetricRequest ──────────────────────────────────────────────────────────────

/// The metrics switched on for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricRequest {
    metrics: BTreeSet<Metric>,
}

impl MetricRequest {
    /// Build a request, rejecting an empty selection.
    pub fn new(metrics: impl IntoIterator<Item = Metric>) -> Result<Self> {
        let metrics: BTreeSet<Metric> = metrics.into_iter().collect();
        if metrics.is_empty() {
            return Err(LogParseError::NoMetricSelected);
        }
        Ok(Self { metrics })
    }

    pub fn all() -> Self {
        Self {
            metrics: Metric::ALL.into_iter().collect(),
        }
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Iterate the requested metrics in report order.
    pub fn iter(&self) -> impl Iterator<Item = Metric> + '_ {
        self.metrics.iter().copied()
    }
}

// ── Report ─────────────────────────────────────────────────────────────────────

/// Computed statistics for a single file, keyed by metric.
pub type FileStats = BTreeMap<Metric, MetricValue>;

/// Statistics for every successfully loaded file, in input order.
///
/// Serializes as a JSON object mapping file path to its [`FileStats`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    files: Vec<(String, FileStats)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the stats for `path`. A repeated path replaces the earlier entry
    /// in place.
    pub fn insert(&mut self, path: impl Into<String>, stats: FileStats) {
        let path = path.into();
        match self.files.iter_mut().find(|(p, _)| *p == path) {
            Some(existing) => existing.1 = stats,
            None => self.files.push((path, stats)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&FileStats> {
        self.files.iter().find(|(p, _)| p == path).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileStats)> {
        self.files.iter().map(|(p, s)| (p.as_str(), s))
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.files.len()))?;
        for (path, stats) in &self.files {
            map.serialize_entry(path, stats)?;
        }
        map.end()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
