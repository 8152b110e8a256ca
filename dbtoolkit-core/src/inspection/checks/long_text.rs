//! Text values too large to be read back in one packet.

use super::{CheckContext, CheckOutcome, count, outcome_for};
use crate::adapters::{Predicate, QueryOracle};
use crate::inspection::models::{CanonicalKind, CheckKind, ColumnDescriptor, FindingDetails};
use crate::{Result, error::ToolkitError};

pub(super) fn applies_to(column: &ColumnDescriptor) -> bool {
    column.canonical_kind == CanonicalKind::Text
}

pub(super) async fn run(
    column: &ColumnDescriptor,
    oracle: &dyn QueryOracle,
    context: &CheckContext,
) -> Result<CheckOutcome> {
    let max_allowed_packet = context.max_allowed_packet.ok_or_else(|| {
        ToolkitError::configuration(
            "max_allowed_packet must be resolved before the long_text check",
        )
    })?;

    let too_long = count(
        CheckKind::LongText,
        column,
        oracle,
        Predicate::LengthGreaterThan(max_allowed_packet),
    )
    .await?;
    Ok(outcome_for(
        column,
        CheckKind::LongText,
        too_long,
        FindingDetails::TextTooLong { max_allowed_packet },
    ))
}
