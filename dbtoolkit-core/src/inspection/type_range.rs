//! Storage limits of the numeric column kinds.
//!
//! Bounds are parsed from fixed literals into exact decimals. Nothing here
//! is computed from the platform's integer types.

use bigdecimal::BigDecimal;
use std::str::FromStr;

use super::models::CanonicalKind;
use crate::{Result, error::ToolkitError};

const DECIMAL_MAX: &str = "99999999999999999999999999999.99999999999999999999999999999";
const DECIMAL_MIN: &str = "-99999999999999999999999999999.99999999999999999999999999999";

/// `(kind, min, max)` for every numeric kind.
const RANGE_TABLE: [(CanonicalKind, &str, &str); 12] = [
    (CanonicalKind::Tinyint, "-128", "127"),
    (CanonicalKind::UnsignedTinyint, "0", "255"),
    (CanonicalKind::Smallint, "-32768", "32767"),
    (CanonicalKind::UnsignedSmallint, "0", "65535"),
    (CanonicalKind::Mediumint, "-8388608", "8388607"),
    (CanonicalKind::UnsignedMediumint, "0", "16777215"),
    (CanonicalKind::Integer, "-2147483648", "2147483647"),
    (CanonicalKind::UnsignedInteger, "0", "4294967295"),
    (
        CanonicalKind::Bigint,
        "-9223372036854775808",
        "9223372036854775807",
    ),
    (CanonicalKind::UnsignedBigint, "0", "18446744073709551615"),
    (CanonicalKind::Decimal, DECIMAL_MIN, DECIMAL_MAX),
    (CanonicalKind::UnsignedDecimal, "0", DECIMAL_MAX),
];

/// Inclusive value range of a numeric kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRange {
    pub min: BigDecimal,
    pub max: BigDecimal,
}

/// Looks up the range of `kind`.
///
/// # Errors
///
/// Returns `UnknownTypeKind` for any kind that is not integer or decimal.
///
/// # Example
///
/// ```rust
/// use dbtoolkit_core::inspection::{CanonicalKind, range_for};
///
/// let range = range_for(CanonicalKind::UnsignedTinyint).unwrap();
/// assert_eq!(range.max.to_string(), "255");
/// assert!(range_for(CanonicalKind::Text).is_err());
/// ```
pub fn range_for(kind: CanonicalKind) -> Result<TypeRange> {
    let (_, min, max) = RANGE_TABLE
        .iter()
        .find(|(entry, _, _)| *entry == kind)
        .ok_or_else(|| ToolkitError::unknown_type_kind(kind.label()))?;

    Ok(TypeRange {
        min: parse_bound(min)?,
        max: parse_bound(max)?,
    })
}

fn parse_bound(literal: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(literal).map_err(|e| {
        ToolkitError::configuration(format!("Invalid range bound '{}': {}", literal, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_maxima() {
        let test_cases = [
            (CanonicalKind::Tinyint, "127"),
            (CanonicalKind::UnsignedTinyint, "255"),
            (CanonicalKind::Smallint, "32767"),
            (CanonicalKind::UnsignedSmallint, "65535"),
            (CanonicalKind::Mediumint, "8388607"),
            (CanonicalKind::UnsignedMediumint, "16777215"),
            (CanonicalKind::Integer, "2147483647"),
            (CanonicalKind::UnsignedInteger, "4294967295"),
            (CanonicalKind::Bigint, "9223372036854775807"),
            (CanonicalKind::UnsignedBigint, "18446744073709551615"),
            (CanonicalKind::Decimal, DECIMAL_MAX),
            (CanonicalKind::UnsignedDecimal, DECIMAL_MAX),
        ];

        for (kind, expected) in test_cases {
            let range = range_for(kind).unwrap();
            assert_eq!(
                range.max,
                BigDecimal::from_str(expected).unwrap(),
                "Failed for {}",
                kind
            );
        }
    }

    #[test]
    fn test_unsigned_kinds_start_at_zero() {
        for kind in CanonicalKind::NUMERIC {
            let range = range_for(kind).unwrap();
            if kind.label().starts_with("unsigned") {
                assert_eq!(range.min, BigDecimal::from(0), "Failed for {}", kind);
            } else {
                assert!(range.min < BigDecimal::from(0), "Failed for {}", kind);
            }
        }
    }

    #[test]
    fn test_bigint_bounds_are_exact() {
        let range = range_for(CanonicalKind::Bigint).unwrap();
        assert_eq!(range.min, BigDecimal::from(i64::MIN));
        assert_eq!(range.max, BigDecimal::from(i64::MAX));

        let range = range_for(CanonicalKind::UnsignedBigint).unwrap();
        assert_eq!(range.max, BigDecimal::from(u64::MAX));
    }

    #[test]
    fn test_non_numeric_kinds_are_rejected() {
        for kind in [
            CanonicalKind::Date,
            CanonicalKind::Datetime,
            CanonicalKind::Text,
            CanonicalKind::String,
            CanonicalKind::AsciiString,
            CanonicalKind::Other,
        ] {
            let error = range_for(kind).unwrap_err();
            assert!(
                matches!(error, ToolkitError::UnknownTypeKind { .. }),
                "Failed for {}",
                kind
            );
        }
    }
}
