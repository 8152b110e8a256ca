//! Operator-facing rendering of inspection results.
//!
//! Produces plain strings only; coloring is left to the caller.

use bigdecimal::{BigDecimal, RoundingMode};

use super::models::{CheckFinding, FindingDetails, InspectionResult, ScanKind};
use crate::{Result, error::ToolkitError};

const SIZE_UNITS: [&str; 5] = ["bytes", "KB", "MB", "GB", "TB"];

/// Decimals beyond this are below `f64` resolution for any byte count.
const MAX_BYTE_PRECISION: u32 = 15;

/// Header of the risky-column table.
pub const RISKY_COLUMN_HEADERS: [&str; 7] = [
    "Table",
    "Column",
    "Type",
    "Size",
    "Cur. Val",
    "Max. Val",
    "Occupancy (%)",
];

/// Index of the occupancy cell in a risky-column row.
pub const OCCUPANCY_COLUMN: usize = 6;

/// Renders a byte count with binary units, e.g. `1536` as `1.5 KB`.
///
/// The value is rounded to `precision` decimals (at most 15) and trailing
/// zeros are dropped. Zero renders as `0`.
///
/// # Errors
/// Returns `UnknownSizeUnit` for sizes of 1024 TB and above.
///
/// # Example
/// ```rust
/// use dbtoolkit_core::inspection::format_bytes;
///
/// assert_eq!(format_bytes(1536, 2).unwrap(), "1.5 KB");
/// assert_eq!(format_bytes(0, 2).unwrap(), "0");
/// ```
pub fn format_bytes(size: u64, precision: u32) -> Result<String> {
    if size == 0 {
        return Ok("0".to_string());
    }

    let mut unit = 0_u32;
    let mut remaining = size;
    while remaining >= 1024 {
        remaining /= 1024;
        unit = unit.saturating_add(1);
    }

    let suffix = usize::try_from(unit)
        .ok()
        .and_then(|index| SIZE_UNITS.get(index))
        .ok_or(ToolkitError::UnknownSizeUnit { size })?;

    let exponent = i32::try_from(unit).unwrap_or_default();
    let decimals = i32::try_from(precision.min(MAX_BYTE_PRECISION)).unwrap_or_default();

    let scaled = size as f64 / 1024_f64.powi(exponent);
    let factor = 10_f64.powi(decimals);
    let rounded = (scaled * factor).round() / factor;

    Ok(format!("{} {}", rounded, suffix))
}

/// Renders an exact value as a thousands-separated integer, rounding half up.
///
/// # Example
/// ```rust
/// use bigdecimal::BigDecimal;
/// use dbtoolkit_core::inspection::format_number;
///
/// assert_eq!(format_number(&BigDecimal::from(4294967295_u64)), "4,294,967,295");
/// ```
pub fn format_number(value: &BigDecimal) -> String {
    let (digits, _) = value
        .with_scale_round(0, RoundingMode::HalfUp)
        .as_bigint_and_exponent();
    let digits = digits.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };

    let capacity = digits.len().saturating_add(digits.len().div_ceil(3));
    let mut grouped = String::with_capacity(capacity);
    for (index, digit) in digits.chars().enumerate() {
        let remaining = digits.len().saturating_sub(index);
        if index > 0 && remaining.is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{}{}", sign, grouped)
}

/// Renders a percentage without trailing zeros, e.g. `12.5` or `70`.
pub fn format_percentage(value: f64) -> String {
    format!("{}", value)
}

/// One line per finding, in the wording operators know.
pub fn finding_message(result: &InspectionResult, finding: &CheckFinding) -> String {
    let column = format!("{}.{}", finding.table_name, finding.column_name);
    match &finding.details {
        FindingDetails::NullOnNotNullable => format!(
            "{} has {} NULLs but the column is not nullable.",
            column, finding.issue_count
        ),
        FindingDetails::InvalidDatetime => format!(
            "{} has {} invalid datetime values.",
            column, finding.issue_count
        ),
        FindingDetails::TextTooLong { .. } => format!(
            "{} has {} too long text values.",
            column, finding.issue_count
        ),
        FindingDetails::StringTooLong { max_length } => format!(
            "{} has {} too long string values (longer than {} chars).",
            column, finding.issue_count, max_length
        ),
        FindingDetails::OverflowRisk { .. } => format!(
            "{}.{} is full for {}%  (threshold for allowed usage is {}%)",
            result.database_name,
            column,
            format_percentage(finding.occupancy_percentage().unwrap_or_default()),
            format_percentage(result.threshold_percentage.unwrap_or_default())
        ),
    }
}

/// Closing summary line of a scan.
pub fn summary_line(result: &InspectionResult) -> String {
    match result.scan_kind {
        ScanKind::Validity if result.total_issue_count > 0 => format!(
            "Found {} Database values with issues.",
            result.total_issue_count
        ),
        ScanKind::OverflowRisk if result.risky_column_count > 0 => format!(
            "{} auto-incremental column(s) found where {}% of the total possible values have already been used.",
            result.risky_column_count,
            format_percentage(result.threshold_percentage.unwrap_or_default())
        ),
        _ => "No issues found.".to_string(),
    }
}

/// Cells of one risky-column row, in [`RISKY_COLUMN_HEADERS`] order.
///
/// Returns `None` for findings that are not overflow risks.
///
/// # Errors
/// Returns `UnknownSizeUnit` if the table size cannot be rendered.
pub fn risky_column_row(
    result: &InspectionResult,
    finding: &CheckFinding,
) -> Result<Option<[String; 7]>> {
    let FindingDetails::OverflowRisk {
        column_type,
        current_value,
        max_value,
        size_bytes,
        ..
    } = &finding.details
    else {
        return Ok(None);
    };

    let size = match size_bytes {
        Some(bytes) => format_bytes(*bytes, 2)?,
        None => "unknown".to_string(),
    };

    Ok(Some([
        format!("{}.{}", result.database_name, finding.table_name),
        finding.column_name.clone(),
        column_type.clone(),
        size,
        format_number(current_value),
        format_number(max_value),
        format_percentage(finding.occupancy_percentage().unwrap_or_default()),
    ]))
}

/// All risky-column rows of a result, highest occupancy first.
///
/// # Errors
/// Returns `UnknownSizeUnit` if a table size cannot be rendered.
pub fn risky_column_rows(result: &InspectionResult) -> Result<Vec<[String; 7]>> {
    let mut rows = Vec::new();
    for finding in &result.findings {
        if let Some(row) = risky_column_row(result, finding)? {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Renders an ASCII table.
///
/// `decorate` receives the column index and the padded cell text of every
/// body cell and may wrap it (for example in terminal colors).
pub fn render_table<F>(headers: &[&str], rows: &[Vec<String>], decorate: F) -> String
where
    F: Fn(usize, String) -> String,
{
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let separator = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width.saturating_add(2)));
            line.push('+');
        }
        line
    };

    let pad = |text: &str, width: usize| {
        let fill = width.saturating_sub(text.chars().count());
        format!(" {}{} ", text, " ".repeat(fill))
    };

    let mut output = String::new();
    output.push_str(&separator);
    output.push('\n');

    output.push('|');
    for (header, width) in headers.iter().zip(&widths) {
        output.push_str(&pad(header, *width));
        output.push('|');
    }
    output.push('\n');
    output.push_str(&separator);
    output.push('\n');

    for row in rows {
        output.push('|');
        for (index, width) in widths.iter().enumerate() {
            let cell = row.get(index).map_or("", String::as_str);
            output.push_str(&decorate(index, pad(cell, *width)));
            output.push('|');
        }
        output.push('\n');
    }
    output.push_str(&separator);
    output.push('\n');

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::models::{
        CanonicalKind, CheckKind, ColumnDescriptor, ResultAggregator,
    };
    use std::str::FromStr;

    fn column(table: &str, name: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            table_name: table.to_string(),
            column_name: name.to_string(),
            raw_type: "tinyint".to_string(),
            canonical_kind: CanonicalKind::UnsignedTinyint,
            nullable: false,
            max_length: None,
            is_auto_increment: true,
            tags: vec![],
        }
    }

    fn overflow_result(size_bytes: Option<u64>) -> InspectionResult {
        let mut aggregator =
            ResultAggregator::new(ScanKind::OverflowRisk, "shop").with_threshold(70.0);
        aggregator.add_finding(CheckFinding::new(
            &column("tags", "id"),
            CheckKind::OverflowRisk,
            1,
            FindingDetails::OverflowRisk {
                column_type: "unsigned tinyint".to_string(),
                current_value: BigDecimal::from(200),
                max_value: BigDecimal::from(255),
                occupancy: BigDecimal::from_str("78.4314").unwrap(),
                size_bytes,
            },
        ));
        aggregator.finalize()
    }

    #[test]
    fn test_format_bytes() {
        let test_cases = [
            (0, 2, "0"),
            (1, 2, "1 bytes"),
            (1023, 2, "1023 bytes"),
            (1024, 2, "1 KB"),
            (1536, 2, "1.5 KB"),
            (16_384, 2, "16 KB"),
            (1_572_864, 2, "1.5 MB"),
            (1_234_567, 2, "1.18 MB"),
            (1_234_567, 0, "1 MB"),
            (5_368_709_120, 2, "5 GB"),
            (1_099_511_627_776, 2, "1 TB"),
        ];

        for (size, precision, expected) in test_cases {
            assert_eq!(
                format_bytes(size, precision).unwrap(),
                expected,
                "Failed for size={}, precision={}",
                size,
                precision
            );
        }
    }

    #[test]
    fn test_format_bytes_huge_precision() {
        assert_eq!(format_bytes(1536, u32::MAX).unwrap(), "1.5 KB");
        assert_eq!(format_bytes(1023, u32::MAX).unwrap(), "1023 bytes");
        assert_eq!(
            format_bytes(1_234_567, u32::MAX).unwrap(),
            format_bytes(1_234_567, 15).unwrap()
        );
    }

    #[test]
    fn test_format_bytes_beyond_terabytes() {
        let error = format_bytes(1_125_899_906_842_624, 2).unwrap_err();
        assert!(matches!(error, ToolkitError::UnknownSizeUnit { .. }));
    }

    #[test]
    fn test_format_number() {
        let test_cases = [
            ("0", "0"),
            ("200", "200"),
            ("1000", "1,000"),
            ("4294967295", "4,294,967,295"),
            ("-9223372036854775808", "-9,223,372,036,854,775,808"),
            ("1234.5", "1,235"),
            (
                "99999999999999999999999999999.99999999999999999999999999999",
                "100,000,000,000,000,000,000,000,000,000",
            ),
        ];

        for (input, expected) in test_cases {
            assert_eq!(
                format_number(&BigDecimal::from_str(input).unwrap()),
                expected,
                "Failed for {}",
                input
            );
        }
    }

    #[test]
    fn test_format_percentage_trims_zeros() {
        assert_eq!(format_percentage(70.0), "70");
        assert_eq!(format_percentage(12.5), "12.5");
        assert_eq!(format_percentage(78.4314), "78.4314");
    }

    #[test]
    fn test_overflow_messages() {
        let result = overflow_result(Some(16_384));

        assert_eq!(
            finding_message(&result, &result.findings[0]),
            "shop.tags.id is full for 78.4314%  (threshold for allowed usage is 70%)"
        );
        assert_eq!(
            summary_line(&result),
            "1 auto-incremental column(s) found where 70% of the total possible values have already been used."
        );
    }

    #[test]
    fn test_risky_column_rows() {
        let result = overflow_result(Some(16_384));
        let rows = risky_column_rows(&result).unwrap();

        assert_eq!(
            rows,
            vec![[
                "shop.tags".to_string(),
                "id".to_string(),
                "unsigned tinyint".to_string(),
                "16 KB".to_string(),
                "200".to_string(),
                "255".to_string(),
                "78.4314".to_string(),
            ]]
        );

        let result = overflow_result(None);
        let rows = risky_column_rows(&result).unwrap();
        assert_eq!(rows[0][3], "unknown");
    }

    #[test]
    fn test_validity_messages() {
        let mut aggregator = ResultAggregator::new(ScanKind::Validity, "shop");
        let mut name = column("users", "name");
        name.canonical_kind = CanonicalKind::String;
        aggregator.add_finding(CheckFinding::new(
            &name,
            CheckKind::LongString,
            1,
            FindingDetails::StringTooLong { max_length: 50 },
        ));
        aggregator.add_finding(CheckFinding::new(
            &column("users", "email"),
            CheckKind::Null,
            3,
            FindingDetails::NullOnNotNullable,
        ));
        let result = aggregator.finalize();

        let messages: Vec<String> = result
            .findings
            .iter()
            .map(|finding| finding_message(&result, finding))
            .collect();
        assert_eq!(
            messages,
            vec![
                "users.name has 1 too long string values (longer than 50 chars).",
                "users.email has 3 NULLs but the column is not nullable.",
            ]
        );
        assert_eq!(summary_line(&result), "Found 4 Database values with issues.");
    }

    #[test]
    fn test_clean_summary() {
        let result = ResultAggregator::new(ScanKind::Validity, "shop").finalize();
        assert_eq!(summary_line(&result), "No issues found.");

        let result = ResultAggregator::new(ScanKind::OverflowRisk, "shop")
            .with_threshold(70.0)
            .finalize();
        assert_eq!(summary_line(&result), "No issues found.");
    }

    #[test]
    fn test_render_table() {
        let rows = vec![vec!["shop.tags".to_string(), "78.4314".to_string()]];
        let table = render_table(&["Table", "Occupancy (%)"], &rows, |index, cell| {
            if index == 1 { format!("*{}*", cell) } else { cell }
        });

        let expected = "\
+-----------+---------------+
| Table     | Occupancy (%) |
+-----------+---------------+
| shop.tags |* 78.4314       *|
+-----------+---------------+
";
        assert_eq!(table, expected);
    }
}
