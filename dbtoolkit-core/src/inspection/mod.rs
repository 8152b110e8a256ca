//! Schema health inspection.
//!
//! Two scans are provided by [`Inspector`]:
//! - a validity scan counting stored values that break their column's
//!   declared constraints (NULLs in NOT NULL columns, zero dates, oversized
//!   text and strings)
//! - an overflow scan reporting auto-increment columns whose current maximum
//!   has consumed a large share of their type's range
//!
//! Results are aggregated into an [`InspectionResult`]; only findings affect
//! the [`ExitStatus`], advisories never do.

pub mod checks;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod models;
pub mod overflow;
pub mod report;
pub mod type_range;

pub use checks::{CheckContext, CheckOutcome, ValidityCheck, available_checks, select_checks};
pub use classifier::{canonical_kind, classify};
pub use config::{
    ConfigValidationError, DEFAULT_THRESHOLD_PERCENTAGE, InspectionConfig, QueryErrorPolicy,
};
pub use engine::Inspector;
pub use models::{
    Advisory, AdvisoryKind, CanonicalKind, CheckFinding, CheckKind, ColumnDescriptor, ColumnTag,
    ExitStatus, FindingDetails, InspectionResult, ResultAggregator, ScanKind,
};
pub use overflow::{assess, exact_threshold, occupancy};
pub use report::{
    OCCUPANCY_COLUMN, RISKY_COLUMN_HEADERS, finding_message, format_bytes, format_number,
    format_percentage, render_table, risky_column_row, risky_column_rows, summary_line,
};
pub use type_range::{TypeRange, range_for};
