//! Auto-increment overflow risk.
//!
//! Occupancy is the share of a column's type range already consumed by its
//! current maximum. It is computed and compared exactly; floats are only
//! produced for display.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Zero};

use super::models::{CheckFinding, CheckKind, ColumnDescriptor, FindingDetails};
use super::type_range::range_for;
use crate::adapters::QueryOracle;
use crate::{Result, error::ToolkitError};

/// Decimal places kept in occupancy values.
pub const OCCUPANCY_SCALE: i64 = 4;

/// Returns true if the overflow check inspects `column`.
///
/// Every auto-increment column qualifies; one without a numeric kind is
/// rejected later by the range lookup.
pub fn is_applicable(column: &ColumnDescriptor) -> bool {
    column.is_auto_increment
}

/// `current / max * 100`, rounded half-up to [`OCCUPANCY_SCALE`] decimals.
///
/// A non-positive `max` yields zero.
///
/// # Example
/// ```rust
/// use bigdecimal::BigDecimal;
/// use dbtoolkit_core::inspection::occupancy;
///
/// let occupancy = occupancy(&BigDecimal::from(200), &BigDecimal::from(255));
/// assert_eq!(occupancy.to_string(), "78.4314");
/// ```
pub fn occupancy(current: &BigDecimal, max: &BigDecimal) -> BigDecimal {
    if *max <= BigDecimal::zero() {
        return BigDecimal::zero().with_scale(OCCUPANCY_SCALE);
    }
    ((current * BigDecimal::from(100)) / max)
        .with_scale_round(OCCUPANCY_SCALE, RoundingMode::HalfUp)
}

/// Converts a threshold percentage to an exact decimal.
///
/// The float's shortest decimal form is used, so `70.1` becomes exactly
/// `70.1`.
///
/// # Errors
/// Returns a configuration error for NaN or infinite thresholds.
pub fn exact_threshold(threshold_percentage: f64) -> Result<BigDecimal> {
    if !threshold_percentage.is_finite() {
        return Err(ToolkitError::configuration(format!(
            "Threshold must be a finite percentage, got {}",
            threshold_percentage
        )));
    }
    BigDecimal::from_str(&threshold_percentage.to_string()).map_err(|e| {
        ToolkitError::configuration(format!(
            "Invalid threshold {}: {}",
            threshold_percentage, e
        ))
    })
}

/// Assesses one auto-increment column.
///
/// Returns a finding when occupancy is at or above `threshold`.
/// `size_bytes` is the best-effort size of the column's table and is only
/// carried into the finding.
///
/// # Errors
/// - `UnknownTypeKind` when the column's kind has no numeric range
/// - `QueryFailed` when the oracle cannot read the current maximum
pub async fn assess(
    column: &ColumnDescriptor,
    oracle: &dyn QueryOracle,
    threshold: &BigDecimal,
    size_bytes: Option<u64>,
) -> Result<Option<CheckFinding>> {
    if !is_applicable(column) {
        return Ok(None);
    }

    let range = range_for(column.canonical_kind)?;

    let current = oracle
        .max_value(&column.table_name, &column.column_name)
        .await
        .map_err(|e| {
            ToolkitError::query_failed(
                &column.table_name,
                &column.column_name,
                CheckKind::OverflowRisk.as_str(),
                e,
            )
        })?;

    let occupancy = occupancy(&current, &range.max);
    tracing::trace!(
        "{}: {} of {} used ({}%)",
        column.qualified_name(),
        current,
        range.max,
        occupancy
    );

    if occupancy < *threshold {
        return Ok(None);
    }

    Ok(Some(CheckFinding::new(
        column,
        CheckKind::OverflowRisk,
        1,
        FindingDetails::OverflowRisk {
            column_type: column.canonical_kind.label().to_string(),
            current_value: current,
            max_value: range.max,
            occupancy,
            size_bytes,
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::super::checks::test_support::{FixedOracle, column};
    use super::*;
    use crate::inspection::models::CanonicalKind;

    fn auto_increment(name: &str, kind: CanonicalKind) -> ColumnDescriptor {
        let mut descriptor = column(name, kind);
        descriptor.is_auto_increment = true;
        descriptor
    }

    fn decimal(text: &str) -> BigDecimal {
        BigDecimal::from_str(text).unwrap()
    }

    #[test]
    fn test_occupancy_rounding() {
        let test_cases = [
            ("200", "255", "78.4314"),
            ("0", "255", "0"),
            ("255", "255", "100"),
            ("1", "3", "33.3333"),
            ("2", "3", "66.6667"),
            ("9223372036854775807", "18446744073709551615", "50"),
        ];

        for (current, max, expected) in test_cases {
            assert_eq!(
                occupancy(&decimal(current), &decimal(max)),
                decimal(expected),
                "Failed for {}/{}",
                current,
                max
            );
        }
    }

    #[test]
    fn test_occupancy_is_exact_near_the_top_of_bigint() {
        // u64::MAX - 1 is not representable as f64
        let current = decimal("18446744073709551614");
        let max = decimal("18446744073709551615");
        assert_eq!(occupancy(&current, &max), decimal("100"));

        let current = decimal("18446744073709551615");
        assert!(occupancy(&current, &max) >= decimal("100"));
    }

    #[test]
    fn test_exact_threshold() {
        assert_eq!(exact_threshold(70.0).unwrap(), decimal("70"));
        assert_eq!(exact_threshold(70.1).unwrap(), decimal("70.1"));
        assert_eq!(exact_threshold(0.0001).unwrap(), decimal("0.0001"));
        assert!(exact_threshold(f64::NAN).is_err());
        assert!(exact_threshold(f64::INFINITY).is_err());
    }

    #[tokio::test]
    async fn test_flagged_at_threshold() {
        let mut oracle = FixedOracle::default();
        oracle.max_values.insert("id".to_string(), BigDecimal::from(200));
        let id = auto_increment("id", CanonicalKind::UnsignedTinyint);

        let finding = assess(&id, &oracle, &decimal("70"), Some(16_384))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(finding.occupancy(), Some(&decimal("78.4314")));
        assert_eq!(finding.issue_count, 1);
        let FindingDetails::OverflowRisk {
            column_type,
            max_value,
            size_bytes,
            ..
        } = &finding.details
        else {
            panic!("unexpected details {:?}", finding.details);
        };
        assert_eq!(column_type, "unsigned tinyint");
        assert_eq!(*max_value, BigDecimal::from(255));
        assert_eq!(*size_bytes, Some(16_384));

        // Equality counts as flagged
        let finding = assess(&id, &oracle, &decimal("78.4314"), None)
            .await
            .unwrap();
        assert!(finding.is_some());

        let finding = assess(&id, &oracle, &decimal("78.4315"), None)
            .await
            .unwrap();
        assert!(finding.is_none());
    }

    #[tokio::test]
    async fn test_empty_table_is_never_flagged() {
        let oracle = FixedOracle::default();
        let id = auto_increment("id", CanonicalKind::UnsignedBigint);

        let finding = assess(&id, &oracle, &decimal("0.0001"), None).await.unwrap();
        assert!(finding.is_none());
    }

    #[tokio::test]
    async fn test_non_auto_increment_columns_are_skipped() {
        let oracle = FixedOracle::failing();
        let amount = column("amount", CanonicalKind::Integer);

        assert!(!is_applicable(&amount));
        assert!(assess(&amount, &oracle, &decimal("70"), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_auto_increment_is_an_error() {
        let oracle = FixedOracle::default();
        let id = auto_increment("id", CanonicalKind::Other);

        let error = assess(&id, &oracle, &decimal("70"), None).await.unwrap_err();
        assert!(matches!(error, ToolkitError::UnknownTypeKind { .. }));
    }

    #[tokio::test]
    async fn test_oracle_failure_carries_context() {
        let oracle = FixedOracle::failing();
        let id = auto_increment("id", CanonicalKind::Integer);

        let error = assess(&id, &oracle, &decimal("70"), None).await.unwrap_err();
        assert!(error.is_query_failure());
        assert!(error.to_string().contains("'overflow_risk'"));
    }
}
