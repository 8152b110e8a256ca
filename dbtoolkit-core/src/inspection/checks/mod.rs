//! Validity checks and their registry.
//!
//! Each check decides whether it applies to a column, asks the oracle one
//! counting question and turns a nonzero answer into a finding. Checks are
//! a closed set dispatched through [`ValidityCheck`].

mod datetime;
mod long_string;
mod long_text;
mod null;

use std::collections::BTreeSet;

use super::models::{Advisory, CheckFinding, CheckKind, ColumnDescriptor};
use crate::adapters::{Predicate, QueryOracle};
use crate::{Result, error::ToolkitError};

/// Registered validity checks, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidityCheck {
    Null,
    Datetime,
    LongText,
    LongString,
}

impl ValidityCheck {
    pub const ALL: [ValidityCheck; 4] = [
        ValidityCheck::Null,
        ValidityCheck::Datetime,
        ValidityCheck::LongText,
        ValidityCheck::LongString,
    ];

    /// Kind recorded on findings.
    pub fn kind(&self) -> CheckKind {
        match self {
            ValidityCheck::Null => CheckKind::Null,
            ValidityCheck::Datetime => CheckKind::Datetime,
            ValidityCheck::LongText => CheckKind::LongText,
            ValidityCheck::LongString => CheckKind::LongString,
        }
    }

    /// Registry name, e.g. `long_text`.
    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// One-line description for `list-checks`.
    pub fn description(&self) -> &'static str {
        match self {
            ValidityCheck::Null => "NULL values stored in NOT NULL columns",
            ValidityCheck::Datetime => "zero or epoch-start dates, including integer timestamps",
            ValidityCheck::LongText => "text values longer than max_allowed_packet",
            ValidityCheck::LongString => "string values longer than the declared length",
        }
    }

    /// Returns true if the check applies to `column` at all.
    pub fn applies_to(&self, column: &ColumnDescriptor) -> bool {
        match self {
            ValidityCheck::Null => null::applies_to(column),
            ValidityCheck::Datetime => datetime::applies_to(column),
            ValidityCheck::LongText => long_text::applies_to(column),
            ValidityCheck::LongString => long_string::applies_to(column),
        }
    }

    /// Runs the check on one column.
    ///
    /// # Errors
    /// Oracle failures are returned as `QueryFailed` carrying the table,
    /// column and check name.
    pub async fn run(
        &self,
        column: &ColumnDescriptor,
        oracle: &dyn QueryOracle,
        context: &CheckContext,
    ) -> Result<CheckOutcome> {
        if !self.applies_to(column) {
            return Ok(CheckOutcome::NotApplicable);
        }

        match self {
            ValidityCheck::Null => null::run(column, oracle).await,
            ValidityCheck::Datetime => datetime::run(column, oracle).await,
            ValidityCheck::LongText => long_text::run(column, oracle, context).await,
            ValidityCheck::LongString => long_string::run(column, oracle).await,
        }
    }
}

impl std::fmt::Display for ValidityCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ValidityCheck {
    type Err = ToolkitError;

    fn from_str(name: &str) -> Result<Self> {
        ValidityCheck::ALL
            .into_iter()
            .find(|check| check.name() == name.trim())
            .ok_or_else(|| ToolkitError::UnknownCheckKind {
                name: name.to_string(),
                available: available_names(),
            })
    }
}

/// Run-level values shared by all checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckContext {
    /// Resolved once per run, only when `long_text` is selected
    pub max_allowed_packet: Option<u64>,
}

/// Result of running one check on one column.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// The column is out of scope for the check
    NotApplicable,
    /// The check ran and found nothing
    Passed,
    Finding(CheckFinding),
    Advisory(Advisory),
}

/// All registered checks.
pub fn available_checks() -> &'static [ValidityCheck] {
    &ValidityCheck::ALL
}

fn available_names() -> String {
    ValidityCheck::ALL
        .iter()
        .map(ValidityCheck::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves requested check names. An empty request selects every check.
///
/// # Errors
/// Returns `UnknownCheckKind` naming the first unknown entry.
///
/// # Example
/// ```rust
/// use dbtoolkit_core::inspection::{ValidityCheck, select_checks};
///
/// let selected = select_checks(&["long_text", "null"]).unwrap();
/// let order: Vec<_> = selected.into_iter().collect();
/// assert_eq!(order, vec![ValidityCheck::Null, ValidityCheck::LongText]);
/// ```
pub fn select_checks<S: AsRef<str>>(requested: &[S]) -> Result<BTreeSet<ValidityCheck>> {
    if requested.is_empty() {
        return Ok(ValidityCheck::ALL.into_iter().collect());
    }

    requested
        .iter()
        .map(|name| name.as_ref().parse::<ValidityCheck>())
        .collect()
}

/// Asks the oracle for a count, attaching check context to failures.
async fn count(
    check: CheckKind,
    column: &ColumnDescriptor,
    oracle: &dyn QueryOracle,
    predicate: Predicate,
) -> Result<u64> {
    oracle
        .count_where(&column.table_name, &column.column_name, &predicate)
        .await
        .map_err(|e| {
            ToolkitError::query_failed(&column.table_name, &column.column_name, check.as_str(), e)
        })
}

/// Wraps a nonzero count into a finding.
fn outcome_for(
    column: &ColumnDescriptor,
    check: CheckKind,
    issue_count: u64,
    details: super::models::FindingDetails,
) -> CheckOutcome {
    if issue_count == 0 {
        tracing::trace!("{}: {} OK", column.qualified_name(), check);
        CheckOutcome::Passed
    } else {
        CheckOutcome::Finding(CheckFinding::new(column, check, issue_count, details))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory oracle for check tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bigdecimal::BigDecimal;

    use crate::Result;
    use crate::adapters::{Predicate, QueryOracle};
    use crate::error::ToolkitError;
    use crate::inspection::models::{CanonicalKind, ColumnDescriptor};

    /// Answers every count with a fixed value and records the predicates.
    #[derive(Default)]
    pub struct FixedOracle {
        pub count: u64,
        pub fail: bool,
        pub max_values: HashMap<String, BigDecimal>,
        pub seen: Mutex<Vec<Predicate>>,
    }

    impl FixedOracle {
        pub fn counting(count: u64) -> Self {
            Self {
                count,
                ..Default::default()
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn predicates(&self) -> Vec<Predicate> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryOracle for FixedOracle {
        async fn count_where(&self, _: &str, _: &str, predicate: &Predicate) -> Result<u64> {
            self.seen.lock().unwrap().push(*predicate);
            if self.fail {
                return Err(ToolkitError::QueryTimeout { elapsed_ms: 5 });
            }
            Ok(self.count)
        }

        async fn max_value(&self, _: &str, column: &str) -> Result<BigDecimal> {
            if self.fail {
                return Err(ToolkitError::QueryTimeout { elapsed_ms: 5 });
            }
            Ok(self.max_values.get(column).cloned().unwrap_or_default())
        }

        async fn table_size_bytes(&self, _: &str) -> Result<Option<u64>> {
            Ok(None)
        }

        async fn max_allowed_packet_size(&self) -> Result<u64> {
            Ok(4_194_304)
        }
    }

    pub fn column(name: &str, kind: CanonicalKind) -> ColumnDescriptor {
        ColumnDescriptor {
            table_name: "users".to_string(),
            column_name: name.to_string(),
            raw_type: kind.label().to_string(),
            canonical_kind: kind,
            nullable: true,
            max_length: None,
            is_auto_increment: false,
            tags: vec![],
        }
    }
}
