//! Zero or epoch-start dates.
//!
//! A stored value `<= 1` is treated as invalid. This catches MySQL zero
//! dates (`0000-00-00`) and integer timestamps of `0` or `1`, and nothing
//! else. Integer columns are only checked when the classifier tagged them
//! as likely timestamps.

use super::{CheckOutcome, count, outcome_for};
use crate::Result;
use crate::adapters::{Predicate, QueryOracle};
use crate::inspection::models::{
    CanonicalKind, CheckKind, ColumnDescriptor, ColumnTag, FindingDetails,
};

pub(super) fn applies_to(column: &ColumnDescriptor) -> bool {
    matches!(
        column.canonical_kind,
        CanonicalKind::Date | CanonicalKind::Datetime
    ) || column.has_tag(ColumnTag::LikelyIntegerTimestamp)
}

pub(super) async fn run(
    column: &ColumnDescriptor,
    oracle: &dyn QueryOracle,
) -> Result<CheckOutcome> {
    let invalid = count(
        CheckKind::Datetime,
        column,
        oracle,
        Predicate::LessOrEqual(1),
    )
    .await?;
    Ok(outcome_for(
        column,
        CheckKind::Datetime,
        invalid,
        FindingDetails::InvalidDatetime,
    ))
}
