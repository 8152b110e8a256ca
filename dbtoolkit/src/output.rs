//! Report rendering for the inspection commands.
//!
//! Text reports go to stdout in the wording operators grep for; logs stay on
//! stderr. JSON reports serialize the whole [`InspectionResult`].

use std::io::Write;

use anyhow::Context;
use clap::ValueEnum;
use colored::Colorize;
use dbtoolkit_core::inspection::{
    InspectionResult, OCCUPANCY_COLUMN, RISKY_COLUMN_HEADERS, ScanKind, ValidityCheck,
    available_checks, finding_message, render_table, risky_column_rows, summary_line,
};
use serde_json::json;

/// Report format for stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable messages and tables
    #[default]
    Text,
    /// One pretty-printed JSON document
    Json,
}

/// Renders a scan result as text.
///
/// Finding lines come first, then skipped-check warnings, the summary line
/// and, for overflow scans, the risky-column table.
///
/// # Errors
/// Returns an error if a table size cannot be rendered.
pub fn render_text(result: &InspectionResult, colorize: bool) -> anyhow::Result<String> {
    let mut lines: Vec<String> = result
        .findings
        .iter()
        .map(|finding| finding_message(result, finding))
        .collect();

    for advisory in &result.advisories {
        lines.push(format!("Warning: {}", advisory.message));
    }

    lines.push(summary_line(result));

    let mut output = lines.join("\n");
    output.push('\n');

    if result.scan_kind == ScanKind::OverflowRisk && !result.findings.is_empty() {
        let rows: Vec<Vec<String>> = risky_column_rows(result)?
            .into_iter()
            .map(Vec::from)
            .collect();
        output.push_str(&render_table(&RISKY_COLUMN_HEADERS, &rows, |index, cell| {
            if colorize && index == OCCUPANCY_COLUMN {
                cell.red().bold().to_string()
            } else {
                cell
            }
        }));
    }

    Ok(output)
}

/// Renders a scan result as pretty-printed JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_json(result: &InspectionResult) -> anyhow::Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize inspection result")
}

/// Renders the check registry.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_checks(format: OutputFormat) -> anyhow::Result<String> {
    let checks = available_checks();
    match format {
        OutputFormat::Text => {
            let width = checks
                .iter()
                .map(|check| check.name().len())
                .max()
                .unwrap_or_default();
            let mut output = String::new();
            for check in checks {
                output.push_str(&format!(
                    "{:width$}  {}\n",
                    check.name(),
                    check.description(),
                    width = width
                ));
            }
            Ok(output)
        }
        OutputFormat::Json => {
            let entries: Vec<_> = checks.iter().map(check_entry).collect();
            serde_json::to_string_pretty(&entries).context("Failed to serialize check list")
        }
    }
}

fn check_entry(check: &ValidityCheck) -> serde_json::Value {
    json!({
        "name": check.name(),
        "description": check.description(),
    })
}

/// Writes a rendered report to stdout.
///
/// # Errors
/// Returns an error if stdout is closed.
pub fn print_report(report: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(report.as_bytes())
        .and_then(|()| {
            if report.ends_with('\n') {
                Ok(())
            } else {
                stdout.write_all(b"\n")
            }
        })
        .and_then(|()| stdout.flush())
        .context("Failed to write report to stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbtoolkit_core::adapters::{DatabaseSnapshot, SnapshotAdapter, TableSnapshot};
    use dbtoolkit_core::inspection::{InspectionConfig, Inspector};
    use dbtoolkit_core::models::RawColumn;
    use serde_json::json;

    fn tags(current: u64) -> SnapshotAdapter {
        SnapshotAdapter::new(
            DatabaseSnapshot::new("shop").with_table(
                TableSnapshot::new("tags")
                    .with_size_bytes(16_384)
                    .with_column(
                        RawColumn::new("id", "tinyint")
                            .with_unsigned(true)
                            .with_nullable(false)
                            .with_auto_increment(true),
                    )
                    .with_column(RawColumn::new("label", "varchar"))
                    .with_row(json!({"id": current, "label": "rust"})),
            ),
        )
    }

    #[tokio::test]
    async fn test_render_overflow_report() {
        let adapter = tags(200);
        let inspector = Inspector::new(&adapter, InspectionConfig::default());
        let (result, _) = inspector.run_overflow_scan(70.0).await.unwrap();

        let report = render_text(&result, false).unwrap();

        let expected = "\
shop.tags.id is full for 78.4314%  (threshold for allowed usage is 70%)
1 auto-incremental column(s) found where 70% of the total possible values have already been used.
+-----------+--------+------------------+-------+----------+----------+---------------+
| Table     | Column | Type             | Size  | Cur. Val | Max. Val | Occupancy (%) |
+-----------+--------+------------------+-------+----------+----------+---------------+
| shop.tags | id     | unsigned tinyint | 16 KB | 200      | 255      | 78.4314       |
+-----------+--------+------------------+-------+----------+----------+---------------+
";
        assert_eq!(report, expected);
    }

    #[tokio::test]
    async fn test_render_clean_overflow_report() {
        let adapter = tags(10);
        let inspector = Inspector::new(&adapter, InspectionConfig::default());
        let (result, _) = inspector.run_overflow_scan(70.0).await.unwrap();

        assert_eq!(render_text(&result, true).unwrap(), "No issues found.\n");
    }

    #[tokio::test]
    async fn test_render_validity_report_with_advisory() {
        let adapter = tags(10);
        let inspector = Inspector::new(&adapter, InspectionConfig::default());
        let (result, _) = inspector.run_validity_scan::<&str>(&[]).await.unwrap();

        let report = render_text(&result, false).unwrap();
        assert_eq!(
            report,
            "Warning: Could not find max length for tags.label column.\nNo issues found.\n"
        );
    }

    #[tokio::test]
    async fn test_render_json_report() {
        let adapter = tags(200);
        let inspector = Inspector::new(&adapter, InspectionConfig::default());
        let (result, _) = inspector.run_overflow_scan(70.0).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&render_json(&result).unwrap()).unwrap();
        assert_eq!(value["database_name"], "shop");
        assert_eq!(value["risky_column_count"], 1);
        assert_eq!(value["findings"][0]["column_name"], "id");
    }

    #[test]
    fn test_render_checks() {
        let text = render_checks(OutputFormat::Text).unwrap();
        let names: Vec<&str> = text
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .collect();
        assert_eq!(names, vec!["null", "datetime", "long_text", "long_string"]);

        let json: serde_json::Value =
            serde_json::from_str(&render_checks(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(4));
        assert_eq!(json[0]["name"], "null");
    }
}
