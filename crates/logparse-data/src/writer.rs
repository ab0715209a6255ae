//! JSON report output.

use std::io::Write;
use std::path::Path;

use logparse_core::error::{LogParseError, Result};
use logparse_core::models::Report;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

const INDENT: &[u8] = b"    ";

/// Render `report` as pretty-printed JSON with four-space indentation.
pub fn render_report(report: &Report) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    report.serialize(&mut ser)?;
    Ok(buf)
}

/// Write `report` to `path`, replacing any existing contents.
///
/// The write goes through `path` itself, so a symlinked output updates its
/// target and no other file next to it is touched.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    info!("Writing json");
    let json = render_report(report)?;

    let write = || -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(&json)?;
        file.sync_all()
    };

    write().map_err(|source| LogParseError::OutputNotWritable {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use logparse_core::models::{FileStats, Metric, MetricValue};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample_report() -> Report {
        let mut stats = FileStats::new();
        stats.insert(Metric::MostFrequentIp, MetricValue::Text("10.0.0.1".into()));
        stats.insert(Metric::EventsPerSecond, MetricValue::Float(1.5));
        stats.insert(Metric::TotalBytes, MetricValue::Integer(9_007_199_254_740_993));
        let mut report = Report::new();
        report.insert("a.log", stats);
        report
    }

    #[test]
    fn test_render_uses_four_space_indent() {
        let json = String::from_utf8(render_report(&sample_report()).unwrap()).unwrap();
        let expected = "{\n    \"a.log\": {\n        \"mfip\": \"10.0.0.1\",\n        \"eps\": 1.5,\n        \"bytes\": 9007199254740993\n    }\n}";
        assert_eq!(json, expected);
    }

    #[test]
    fn test_render_empty_report() {
        let json = render_report(&Report::new()).unwrap();
        assert_eq!(json, b"{}");
    }

    #[test]
    fn test_write_report_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.json");
        std::fs::write(&path, "old contents").unwrap();

        write_report(&sample_report(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: BTreeMap<String, FileStats> = serde_json::from_str(&text).unwrap();
        let stats = &parsed["a.log"];
        assert_eq!(
            stats[&Metric::TotalBytes],
            MetricValue::Integer(9_007_199_254_740_993)
        );
        match stats[&Metric::EventsPerSecond] {
            MetricValue::Float(v) => assert!((v - 1.5).abs() < 1e-9),
            ref other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_write_report_leaves_sibling_files_alone() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report");
        let sibling = tmp.path().join("report.json.tmp");
        std::fs::write(&sibling, "user data").unwrap();

        write_report(&sample_report(), &path).unwrap();

        assert_eq!(std::fs::read_to_string(&sibling).unwrap(), "user data");
        let parsed: BTreeMap<String, FileStats> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(parsed.contains_key("a.log"));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_report_through_symlink_updates_target() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("real.json");
        let link = tmp.path().join("out.json");
        std::fs::write(&target, "").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        write_report(&sample_report(), &link).unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        let parsed: BTreeMap<String, FileStats> =
            serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
        assert!(parsed.contains_key("a.log"));
    }

    #[test]
    fn test_write_report_into_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("out.json");
        let err = write_report(&sample_report(), &path).unwrap_err();
        assert!(matches!(err, LogParseError::OutputNotWritable { .. }));
    }
}
