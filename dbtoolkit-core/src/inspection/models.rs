//! Inspection data models.
//!
//! Column descriptors, findings, advisories and the aggregated result of a
//! scan. Findings carry counts and bounds only, never row contents.

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized, engine-agnostic classification of a column's storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalKind {
    Integer,
    UnsignedInteger,
    Bigint,
    UnsignedBigint,
    Tinyint,
    UnsignedTinyint,
    Smallint,
    UnsignedSmallint,
    Mediumint,
    UnsignedMediumint,
    Decimal,
    UnsignedDecimal,
    Date,
    Datetime,
    Text,
    String,
    AsciiString,
    Other,
}

impl CanonicalKind {
    /// Kinds with an entry in the type range table.
    pub const NUMERIC: [CanonicalKind; 12] = [
        CanonicalKind::Integer,
        CanonicalKind::UnsignedInteger,
        CanonicalKind::Bigint,
        CanonicalKind::UnsignedBigint,
        CanonicalKind::Tinyint,
        CanonicalKind::UnsignedTinyint,
        CanonicalKind::Smallint,
        CanonicalKind::UnsignedSmallint,
        CanonicalKind::Mediumint,
        CanonicalKind::UnsignedMediumint,
        CanonicalKind::Decimal,
        CanonicalKind::UnsignedDecimal,
    ];

    /// Returns true for integer and decimal kinds.
    pub fn is_numeric(&self) -> bool {
        Self::NUMERIC.contains(self)
    }

    /// Returns true for the plain integer and bigint kinds, the only ones
    /// commonly used to hold epoch timestamps.
    pub fn is_timestamp_capable_integer(&self) -> bool {
        matches!(
            self,
            CanonicalKind::Integer
                | CanonicalKind::UnsignedInteger
                | CanonicalKind::Bigint
                | CanonicalKind::UnsignedBigint
        )
    }

    /// Operator-facing type label, e.g. `unsigned bigint`.
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalKind::Integer => "integer",
            CanonicalKind::UnsignedInteger => "unsigned integer",
            CanonicalKind::Bigint => "bigint",
            CanonicalKind::UnsignedBigint => "unsigned bigint",
            CanonicalKind::Tinyint => "tinyint",
            CanonicalKind::UnsignedTinyint => "unsigned tinyint",
            CanonicalKind::Smallint => "smallint",
            CanonicalKind::UnsignedSmallint => "unsigned smallint",
            CanonicalKind::Mediumint => "mediumint",
            CanonicalKind::UnsignedMediumint => "unsigned mediumint",
            CanonicalKind::Decimal => "decimal",
            CanonicalKind::UnsignedDecimal => "unsigned decimal",
            CanonicalKind::Date => "date",
            CanonicalKind::Datetime => "datetime",
            CanonicalKind::Text => "text",
            CanonicalKind::String => "string",
            CanonicalKind::AsciiString => "ascii_string",
            CanonicalKind::Other => "other",
        }
    }
}

impl std::fmt::Display for CanonicalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Heuristic tags attached by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnTag {
    /// Integer column whose name suggests it stores an epoch timestamp.
    LikelyIntegerTimestamp,
}

/// Normalized view of one column, built once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub table_name: String,
    pub column_name: String,
    /// Type name as reported by the enumerator
    pub raw_type: String,
    pub canonical_kind: CanonicalKind,
    pub nullable: bool,
    /// Declared character capacity; `0` or absent means unknown
    pub max_length: Option<u32>,
    pub is_auto_increment: bool,
    pub tags: Vec<ColumnTag>,
}

impl ColumnDescriptor {
    /// Returns true if the classifier attached `tag`.
    pub fn has_tag(&self, tag: ColumnTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Declared capacity, if known and nonzero.
    pub fn known_capacity(&self) -> Option<u32> {
        self.max_length.filter(|length| *length != 0)
    }

    /// `table.column`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.table_name, self.column_name)
    }
}

/// Kind of check that produced a finding or advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Null,
    Datetime,
    LongText,
    LongString,
    OverflowRisk,
}

impl CheckKind {
    /// Name used on the command line and in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::Null => "null",
            CheckKind::Datetime => "datetime",
            CheckKind::LongText => "long_text",
            CheckKind::LongString => "long_string",
            CheckKind::OverflowRisk => "overflow_risk",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check-specific data attached to a finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingDetails {
    NullOnNotNullable,
    InvalidDatetime,
    TextTooLong {
        max_allowed_packet: u64,
    },
    StringTooLong {
        max_length: u32,
    },
    OverflowRisk {
        /// e.g. `unsigned bigint`
        column_type: String,
        current_value: BigDecimal,
        max_value: BigDecimal,
        /// Percentage of the range in use, rounded to 4 decimals
        occupancy: BigDecimal,
        /// Best-effort table size (data + index); `None` when unavailable
        size_bytes: Option<u64>,
    },
}

/// Output of one check on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckFinding {
    pub table_name: String,
    pub column_name: String,
    pub check_kind: CheckKind,
    /// Violating rows; `1` for a flagged overflow-risk column
    pub issue_count: u64,
    pub details: FindingDetails,
}

impl CheckFinding {
    /// Creates a validity finding for `column`.
    pub fn new(
        column: &ColumnDescriptor,
        check_kind: CheckKind,
        issue_count: u64,
        details: FindingDetails,
    ) -> Self {
        Self {
            table_name: column.table_name.clone(),
            column_name: column.column_name.clone(),
            check_kind,
            issue_count,
            details,
        }
    }

    /// Exact occupancy for overflow-risk findings.
    pub fn occupancy(&self) -> Option<&BigDecimal> {
        match &self.details {
            FindingDetails::OverflowRisk { occupancy, .. } => Some(occupancy),
            _ => None,
        }
    }

    /// Occupancy as a float, for display only.
    pub fn occupancy_percentage(&self) -> Option<f64> {
        self.occupancy().and_then(ToPrimitive::to_f64)
    }
}

/// Why an advisory was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    /// Long-string check skipped: declared capacity unknown
    CapacityUnknown,
    /// Check query failed and the run was configured to continue
    QueryFailed,
}

/// Non-fatal diagnostic. Never counted and never affects the exit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    pub table_name: String,
    pub column_name: String,
    pub check_kind: CheckKind,
    pub kind: AdvisoryKind,
    pub message: String,
}

impl Advisory {
    /// Advisory for a string column without a usable declared length.
    pub fn capacity_unknown(column: &ColumnDescriptor) -> Self {
        Self {
            table_name: column.table_name.clone(),
            column_name: column.column_name.clone(),
            check_kind: CheckKind::LongString,
            kind: AdvisoryKind::CapacityUnknown,
            message: format!(
                "Could not find max length for {} column.",
                column.qualified_name()
            ),
        }
    }

    /// Advisory recording a skipped check under the skip-and-continue policy.
    pub fn query_failed(
        column: &ColumnDescriptor,
        check_kind: CheckKind,
        error: &crate::error::ToolkitError,
    ) -> Self {
        let mut message = error.to_string();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            table_name: column.table_name.clone(),
            column_name: column.column_name.clone(),
            check_kind,
            kind: AdvisoryKind::QueryFailed,
            message,
        }
    }
}

/// Which scan produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanKind {
    Validity,
    OverflowRisk,
}

/// Final status of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    /// Process exit code (`0` or `1`).
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }
}

/// Aggregated result of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionResult {
    pub scan_kind: ScanKind,
    pub database_name: String,
    /// Sum of violating rows over all validity findings
    pub total_issue_count: u64,
    /// Number of flagged overflow-risk columns
    pub risky_column_count: u64,
    pub findings: Vec<CheckFinding>,
    pub advisories: Vec<Advisory>,
    pub tables_scanned: u64,
    pub columns_scanned: u64,
    /// Threshold used by an overflow scan
    pub threshold_percentage: Option<f64>,
    pub inspected_at: DateTime<Utc>,
}

impl InspectionResult {
    /// `Success` iff nothing was found. Advisories are ignored.
    pub fn exit_status(&self) -> ExitStatus {
        if self.total_issue_count == 0 && self.risky_column_count == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Failure
        }
    }

    /// True when at least one check was skipped after a query failure.
    pub fn is_degraded(&self) -> bool {
        self.advisories
            .iter()
            .any(|advisory| advisory.kind == AdvisoryKind::QueryFailed)
    }
}

/// Accumulates findings over a run and produces the final result.
///
/// The aggregator is owned by the orchestrating scan; nothing reads the
/// partial state before [`ResultAggregator::finalize`].
#[derive(Debug)]
pub struct ResultAggregator {
    scan_kind: ScanKind,
    database_name: String,
    threshold_percentage: Option<f64>,
    total_issue_count: u64,
    risky_column_count: u64,
    findings: Vec<CheckFinding>,
    advisories: Vec<Advisory>,
    tables_scanned: u64,
    columns_scanned: u64,
}

impl ResultAggregator {
    /// Starts an empty aggregation.
    pub fn new(scan_kind: ScanKind, database_name: impl Into<String>) -> Self {
        Self {
            scan_kind,
            database_name: database_name.into(),
            threshold_percentage: None,
            total_issue_count: 0,
            risky_column_count: 0,
            findings: Vec::new(),
            advisories: Vec::new(),
            tables_scanned: 0,
            columns_scanned: 0,
        }
    }

    /// Records the threshold of an overflow scan.
    pub fn with_threshold(mut self, threshold_percentage: f64) -> Self {
        self.threshold_percentage = Some(threshold_percentage);
        self
    }

    /// Counts a scanned table.
    pub fn record_table(&mut self) {
        self.tables_scanned = self.tables_scanned.saturating_add(1);
    }

    /// Counts a scanned column.
    pub fn record_column(&mut self) {
        self.columns_scanned = self.columns_scanned.saturating_add(1);
    }

    /// Adds a finding. Overflow flags and violating rows are counted apart.
    pub fn add_finding(&mut self, finding: CheckFinding) {
        if finding.check_kind == CheckKind::OverflowRisk {
            self.risky_column_count = self.risky_column_count.saturating_add(1);
        } else {
            self.total_issue_count = self.total_issue_count.saturating_add(finding.issue_count);
        }
        self.findings.push(finding);
    }

    /// Adds an advisory.
    pub fn add_advisory(&mut self, advisory: Advisory) {
        self.advisories.push(advisory);
    }

    /// Finalizes the result, ranking overflow findings by occupancy.
    pub fn finalize(mut self) -> InspectionResult {
        rank_by_occupancy(&mut self.findings);
        InspectionResult {
            scan_kind: self.scan_kind,
            database_name: self.database_name,
            total_issue_count: self.total_issue_count,
            risky_column_count: self.risky_column_count,
            findings: self.findings,
            advisories: self.advisories,
            tables_scanned: self.tables_scanned,
            columns_scanned: self.columns_scanned,
            threshold_percentage: self.threshold_percentage,
            inspected_at: Utc::now(),
        }
    }
}

/// Sorts overflow findings by occupancy, highest first.
///
/// The sort is stable, so equal occupancies keep scan order. Findings
/// without an occupancy keep their relative order ahead of ranked ones.
pub fn rank_by_occupancy(findings: &mut [CheckFinding]) {
    findings.sort_by(|a, b| match (a.occupancy(), b.occupancy()) {
        (Some(left), Some(right)) => right.cmp(left),
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
