//! Per-table statistics.
//!
//! Every [`Metric`] is computed independently over a whole [`LogTable`];
//! no metric reads another metric's result.

use std::collections::HashMap;

use tracing::debug;

use crate::error::MetricError;
use crate::models::{FileStats, LogTable, Metric, MetricRequest, MetricValue};

// ── Dispatch ──────────────────────────────────────────────────────────────────

impl Metric {
    /// Compute this metric over `table`.
    pub fn compute(self, table: &LogTable) -> Result<MetricValue, MetricError> {
        match self {
            Metric::MostFrequentIp => most_frequent_ip(table).map(MetricValue::Text),
            Metric::LeastFrequentIp => least_frequent_ip(table).map(MetricValue::Text),
            Metric::EventsPerSecond => events_per_second(table).map(MetricValue::Float),
            Metric::TotalBytes => total_bytes(table).map(MetricValue::Integer),
        }
    }
}

/// Compute every metric in `request` over `table`.
///
/// Failed metrics are returned separately so the caller decides how to
/// report them; the successful ones land in the [`FileStats`].
pub fn compute_stats(
    table: &LogTable,
    request: &MetricRequest,
) -> (FileStats, Vec<(Metric, MetricError)>) {
    let mut stats = FileStats::new();
    let mut failures = Vec::new();

    for metric in request.iter() {
        match metric.compute(table) {
            Ok(value) => {
                debug!("{} = {}", metric, value);
                stats.insert(metric, value);
            }
            Err(e) => failures.push((metric, e)),
        }
    }

    (stats, failures)
}

// ── Client frequency ──────────────────────────────────────────────────────────

/// Occurrence count of a client plus the row index it was first seen at.
#[derive(Debug, Clone, Copy)]
struct ClientCount {
    count: u64,
    first_seen: usize,
}

/// Count rows per client in a single pass.
fn client_counts(table: &LogTable) -> HashMap<&str, ClientCount> {
    let mut counts: HashMap<&str, ClientCount> = HashMap::new();
    for (idx, record) in table.iter().enumerate() {
        counts
            .entry(record.client.as_str())
            .or_insert(ClientCount {
                count: 0,
                first_seen: idx,
            })
            .count += 1;
    }
    counts
}

/// The client with the highest request count.
///
/// Ties go to the client that appears first in the table.
pub fn most_frequent_ip(table: &LogTable) -> Result<String, MetricError> {
    client_counts(table)
        .into_iter()
        .min_by_key(|(_, c)| (std::cmp::Reverse(c.count), c.first_seen))
        .map(|(client, _)| client.to_string())
        .ok_or(MetricError::EmptyInput(Metric::MostFrequentIp.key()))
}

/// The client with the lowest request count.
///
/// Ties go to the client that appears first in the table.
pub fn least_frequent_ip(table: &LogTable) -> Result<String, MetricError> {
    client_counts(table)
        .into_iter()
        .min_by_key(|(_, c)| (c.count, c.first_seen))
        .map(|(client, _)| client.to_string())
        .ok_or(MetricError::EmptyInput(Metric::LeastFrequentIp.key()))
}

// ── Event rate ────────────────────────────────────────────────────────────────

/// Round an epoch timestamp to its whole second, halves going to the even
/// neighbour.
pub fn round_to_second(timestamp: f64) -> i64 {
    timestamp.round_ties_even() as i64
}

/// Mean number of events per second, over seconds that saw at least one
/// event.
pub fn events_per_second(table: &LogTable) -> Result<f64, MetricError> {
    let mut buckets: HashMap<i64, u64> = HashMap::new();
    for record in table {
        *buckets.entry(round_to_second(record.timestamp)).or_default() += 1;
    }

    if buckets.is_empty() {
        return Err(MetricError::EmptyInput(Metric::EventsPerSecond.key()));
    }

    let events: u64 = buckets.values().sum();
    Ok(events as f64 / buckets.len() as f64)
}

// ── Volume ────────────────────────────────────────────────────────────────────

/// Exact sum of the byte column. Zero for an empty table.
pub fn total_bytes(table: &LogTable) -> Result<u64, MetricError> {
    table
        .iter()
        .try_fold(0u64, |acc, r| acc.checked_add(r.bytes))
        .ok_or(MetricError::BytesOverflow)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
