mod bootstrap;

use anyhow::Result;
use clap::Parser;
use logparse_core::settings::Settings;
use logparse_data::analysis::{analyze_logs, AnalysisResult};

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level(), settings.log_file.as_ref())?;

    tracing::info!("LogParse v{} starting", env!("CARGO_PKG_VERSION"));

    let result = run(&settings)?;

    tracing::info!(
        "Wrote statistics for {} file(s) to {}",
        result.report.len(),
        settings.output_file_path.display()
    );

    Ok(())
}

/// Compute the selected metrics for every input and write the report.
fn run(settings: &Settings) -> Result<AnalysisResult> {
    let request = settings.metric_request()?;
    tracing::info!(
        "Metrics: {}",
        request.iter().map(|m| m.key()).collect::<Vec<_>>().join(", ")
    );

    let result = analyze_logs(
        &settings.input_file_path,
        &settings.output_file_path,
        &request,
    )?;

    Ok(result)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn args(input: &Path, output: &Path, flags: &[&str]) -> Vec<String> {
        let mut v = vec![
            "logparse".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
        ];
        v.extend(flags.iter().map(|f| f.to_string()));
        v
    }

    #[test]
    fn test_run_writes_selected_metrics_only() {
        let tmp = TempDir::new().expect("tempdir");
        let input = tmp.path().join("access.log");
        std::fs::write(&input, "100 x 1.1.1.1 x 50\n100 x 2.2.2.2 x 50\n").expect("write log");
        let output = tmp.path().join("out.json");

        let settings = Settings::try_parse_from(args(&input, &output, &["--eps", "--bytes"]))
            .expect("valid args");
        run(&settings).expect("run succeeds");

        let text = std::fs::read_to_string(&output).expect("output written");
        let json: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        let stats = &json[input.display().to_string()];
        assert_eq!(stats["eps"], serde_json::json!(2.0));
        assert_eq!(stats["bytes"], serde_json::json!(100));
        assert!(stats.get("mfip").is_none());
        assert!(stats.get("lfip").is_none());
    }

    #[test]
    fn test_no_metric_flags_is_usage_error_without_output() {
        let tmp = TempDir::new().expect("tempdir");
        let input = tmp.path().join("access.log");
        std::fs::write(&input, "100 x 1.1.1.1 x 50\n").expect("write log");
        let output = tmp.path().join("out.json");

        let parsed = Settings::try_parse_from(args(&input, &output, &[]));

        assert!(parsed.is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_run_missing_input_fails() {
        let tmp = TempDir::new().expect("tempdir");
        let input = tmp.path().join("missing.log");
        let output = tmp.path().join("out.json");

        let settings =
            Settings::try_parse_from(args(&input, &output, &["--mfip"])).expect("valid args");
        let err = run(&settings).unwrap_err();

        assert!(err.to_string().contains("missing.log"));
        assert!(!output.exists());
    }
}
