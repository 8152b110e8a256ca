//! String values longer than the column's declared length.
//!
//! Without a known capacity the column cannot be judged; an advisory is
//! recorded instead of a finding.

use super::{CheckOutcome, count, outcome_for};
use crate::Result;
use crate::adapters::{Predicate, QueryOracle};
use crate::inspection::models::{
    Advisory, CanonicalKind, CheckKind, ColumnDescriptor, FindingDetails,
};

pub(super) fn applies_to(column: &ColumnDescriptor) -> bool {
    matches!(
        column.canonical_kind,
        CanonicalKind::String | CanonicalKind::AsciiString
    )
}

pub(super) async fn run(
    column: &ColumnDescriptor,
    oracle: &dyn QueryOracle,
) -> Result<CheckOutcome> {
    let Some(max_length) = column.known_capacity() else {
        let advisory = Advisory::capacity_unknown(column);
        tracing::warn!("{}", advisory.message);
        return Ok(CheckOutcome::Advisory(advisory));
    };

    let too_long = count(
        CheckKind::LongString,
        column,
        oracle,
        Predicate::LengthGreaterThan(u64::from(max_length)),
    )
    .await?;
    Ok(outcome_for(
        column,
        CheckKind::LongString,
        too_long,
        FindingDetails::StringTooLong { max_length },
    ))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{FixedOracle, column};
    use super::*;
    use crate::inspection::models::AdvisoryKind;

    #[tokio::test]
    async fn test_longer_than_declared_length() {
        let mut name = column("name", CanonicalKind::String);
        name.max_length = Some(50);
        let oracle = FixedOracle::counting(1);

        let outcome = run(&name, &oracle).await.unwrap();

        let CheckOutcome::Finding(finding) = outcome else {
            panic!("expected a finding, got {:?}", outcome);
        };
        assert_eq!(finding.issue_count, 1);
        assert_eq!(
            finding.details,
            FindingDetails::StringTooLong { max_length: 50 }
        );
        assert_eq!(oracle.predicates(), vec![Predicate::LengthGreaterThan(50)]);
    }

    #[tokio::test]
    async fn test_unknown_capacity_is_advisory() {
        for max_length in [None, Some(0)] {
            let mut bio = column("bio", CanonicalKind::AsciiString);
            bio.max_length = max_length;
            let oracle = FixedOracle::counting(9);

            let outcome = run(&bio, &oracle).await.unwrap();

            let CheckOutcome::Advisory(advisory) = outcome else {
                panic!("expected an advisory, got {:?}", outcome);
            };
            assert_eq!(advisory.kind, AdvisoryKind::CapacityUnknown);
            assert_eq!(
                advisory.message,
                "Could not find max length for users.bio column."
            );
            assert!(oracle.predicates().is_empty());
        }
    }
}
