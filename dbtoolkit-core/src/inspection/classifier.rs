//! Maps raw column metadata to canonical kinds.
//!
//! The lookup table accepts both MySQL `DATA_TYPE` names and the normalized
//! names used by schema snapshots. The unsigned flag only changes integer
//! and decimal kinds.

use super::models::{CanonicalKind, ColumnDescriptor, ColumnTag};
use crate::models::RawColumn;

/// `(raw name, signed kind, unsigned kind)`
const TYPE_MAP: &[(&str, CanonicalKind, CanonicalKind)] = &[
    ("int", CanonicalKind::Integer, CanonicalKind::UnsignedInteger),
    ("integer", CanonicalKind::Integer, CanonicalKind::UnsignedInteger),
    ("bigint", CanonicalKind::Bigint, CanonicalKind::UnsignedBigint),
    ("tinyint", CanonicalKind::Tinyint, CanonicalKind::UnsignedTinyint),
    ("smallint", CanonicalKind::Smallint, CanonicalKind::UnsignedSmallint),
    ("mediumint", CanonicalKind::Mediumint, CanonicalKind::UnsignedMediumint),
    ("decimal", CanonicalKind::Decimal, CanonicalKind::UnsignedDecimal),
    ("numeric", CanonicalKind::Decimal, CanonicalKind::UnsignedDecimal),
    ("dec", CanonicalKind::Decimal, CanonicalKind::UnsignedDecimal),
    ("fixed", CanonicalKind::Decimal, CanonicalKind::UnsignedDecimal),
    ("date", CanonicalKind::Date, CanonicalKind::Date),
    ("date_immutable", CanonicalKind::Date, CanonicalKind::Date),
    ("year", CanonicalKind::Date, CanonicalKind::Date),
    ("datetime", CanonicalKind::Datetime, CanonicalKind::Datetime),
    ("datetime_immutable", CanonicalKind::Datetime, CanonicalKind::Datetime),
    ("datetimetz", CanonicalKind::Datetime, CanonicalKind::Datetime),
    ("datetimetz_immutable", CanonicalKind::Datetime, CanonicalKind::Datetime),
    ("timestamp", CanonicalKind::Datetime, CanonicalKind::Datetime),
    ("text", CanonicalKind::Text, CanonicalKind::Text),
    ("tinytext", CanonicalKind::Text, CanonicalKind::Text),
    ("mediumtext", CanonicalKind::Text, CanonicalKind::Text),
    ("longtext", CanonicalKind::Text, CanonicalKind::Text),
    ("string", CanonicalKind::String, CanonicalKind::String),
    ("varchar", CanonicalKind::String, CanonicalKind::String),
    ("char", CanonicalKind::String, CanonicalKind::String),
    ("ascii_string", CanonicalKind::AsciiString, CanonicalKind::AsciiString),
];

/// Resolves a raw type name to its canonical kind.
///
/// Names are matched case-insensitively; a trailing `unsigned` in the name
/// itself (`int unsigned`) counts as the unsigned flag.
pub fn canonical_kind(raw_type: &str, is_unsigned: bool) -> CanonicalKind {
    let normalized = raw_type.trim().to_ascii_lowercase();
    let (name, unsigned) = match normalized.strip_suffix(" unsigned") {
        Some(base) => (base.trim_end(), true),
        None => (normalized.as_str(), is_unsigned),
    };

    TYPE_MAP
        .iter()
        .find(|(raw, _, _)| *raw == name)
        .map(|(_, signed_kind, unsigned_kind)| {
            if unsigned {
                *unsigned_kind
            } else {
                *signed_kind
            }
        })
        .unwrap_or(CanonicalKind::Other)
}

/// Returns true if an integer column's name suggests an epoch timestamp.
///
/// Matches names containing `timestamp` or ending in `_at`. This is a name
/// heuristic: unrelated columns such as `look_at` are tagged as well.
pub fn looks_like_integer_timestamp(kind: CanonicalKind, column_name: &str) -> bool {
    kind.is_timestamp_capable_integer()
        && (column_name.contains("timestamp") || column_name.ends_with("_at"))
}

/// Builds the descriptor used by every check.
pub fn classify(table_name: &str, column: &RawColumn) -> ColumnDescriptor {
    let canonical_kind = canonical_kind(&column.data_type, column.is_unsigned);

    let mut tags = Vec::new();
    if looks_like_integer_timestamp(canonical_kind, &column.name) {
        tags.push(ColumnTag::LikelyIntegerTimestamp);
    }

    ColumnDescriptor {
        table_name: table_name.to_string(),
        column_name: column.name.clone(),
        raw_type: column.data_type.clone(),
        canonical_kind,
        nullable: column.is_nullable,
        max_length: column.max_length,
        is_auto_increment: column.is_auto_increment,
        tags,
    }
}
