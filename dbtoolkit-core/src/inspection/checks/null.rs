//! NULLs stored in columns declared NOT NULL.

use super::{CheckOutcome, count, outcome_for};
use crate::Result;
use crate::adapters::{Predicate, QueryOracle};
use crate::inspection::models::{CheckKind, ColumnDescriptor, FindingDetails};

pub(super) fn applies_to(column: &ColumnDescriptor) -> bool {
    !column.nullable
}

pub(super) async fn run(
    column: &ColumnDescriptor,
    oracle: &dyn QueryOracle,
) -> Result<CheckOutcome> {
    let nulls = count(CheckKind::Null, column, oracle, Predicate::IsNull).await?;
    Ok(outcome_for(
        column,
        CheckKind::Null,
        nulls,
        FindingDetails::NullOnNotNullable,
    ))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{FixedOracle, column};
    use super::*;
    use crate::inspection::models::CanonicalKind;

    #[tokio::test]
    async fn test_nulls_in_not_nullable_column() {
        let mut email = column("email", CanonicalKind::String);
        email.nullable = false;
        let oracle = FixedOracle::counting(3);

        let outcome = run(&email, &oracle).await.unwrap();

        let CheckOutcome::Finding(finding) = outcome else {
            panic!("expected a finding, got {:?}", outcome);
        };
        assert_eq!(finding.issue_count, 3);
        assert_eq!(finding.check_kind, CheckKind::Null);
        assert_eq!(oracle.predicates(), vec![Predicate::IsNull]);
    }

    #[tokio::test]
    async fn test_no_nulls_passes() {
        let mut email = column("email", CanonicalKind::String);
        email.nullable = false;

        let outcome = run(&email, &FixedOracle::counting(0)).await.unwrap();
        assert_eq!(outcome, CheckOutcome::Passed);
    }

    #[test]
    fn test_nullable_columns_are_skipped() {
        assert!(!applies_to(&column("nickname", CanonicalKind::String)));
    }
}
