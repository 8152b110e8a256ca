//! Scan orchestration.
//!
//! Tables, columns and checks are processed strictly one after another.
//! Each run owns its [`ResultAggregator`]; nothing is shared between runs.

use std::collections::BTreeSet;

use tracing::{debug, info, trace, warn};

use super::checks::{CheckContext, CheckOutcome, ValidityCheck, select_checks};
use super::classifier::classify;
use super::config::{InspectionConfig, QueryErrorPolicy, validate_threshold};
use super::models::{
    Advisory, CheckKind, ColumnDescriptor, ExitStatus, InspectionResult, ResultAggregator,
    ScanKind,
};
use super::overflow;
use crate::adapters::{DatabaseAdapter, DeadlineOracle, QueryOracle};
use crate::{Result, error::ToolkitError};

/// Runs inspections against one database.
pub struct Inspector<'a> {
    adapter: &'a dyn DatabaseAdapter,
    config: InspectionConfig,
}

impl std::fmt::Debug for Inspector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inspector")
            .field("database", &self.adapter.database_name())
            .field("config", &self.config)
            .finish()
    }
}

impl<'a> Inspector<'a> {
    pub fn new(adapter: &'a dyn DatabaseAdapter, config: InspectionConfig) -> Self {
        Self { adapter, config }
    }

    /// The configuration this inspector runs with.
    pub fn config(&self) -> &InspectionConfig {
        &self.config
    }

    /// Rejects engines whose SQL dialect the checks do not speak.
    ///
    /// # Errors
    /// Returns `UnsupportedEngine` for anything but MySQL or MariaDB.
    pub fn ensure_supported_engine(&self) -> Result<()> {
        let database_type = self.adapter.database_type();
        if database_type.is_mysql_compatible() {
            Ok(())
        } else {
            Err(ToolkitError::unsupported_engine(database_type.to_string()))
        }
    }

    /// Finds stored values that violate their column's constraints.
    ///
    /// An empty `selected_checks` runs every registered check.
    ///
    /// # Errors
    /// - `UnsupportedEngine` before any query is issued
    /// - `UnknownCheckKind` for an unregistered check name
    /// - `QueryFailed` on the first failing check under the abort policy
    pub async fn run_validity_scan<S: AsRef<str>>(
        &self,
        selected_checks: &[S],
    ) -> Result<(InspectionResult, ExitStatus)> {
        self.ensure_supported_engine()?;
        let checks = select_checks(selected_checks)?;
        let oracle = self.oracle();
        let database = self.adapter.database_name();

        let context = CheckContext {
            max_allowed_packet: if checks.contains(&ValidityCheck::LongText) {
                Some(oracle.max_allowed_packet_size().await?)
            } else {
                None
            },
        };

        let tables = self.adapter.list_tables().await?;
        info!(
            "Checking {} tables in '{}' ({})",
            tables.len(),
            database,
            check_names(&checks)
        );

        let mut aggregator = ResultAggregator::new(ScanKind::Validity, database);
        for table in &tables {
            debug!("Table {}.{}: checking...", database, table);
            aggregator.record_table();

            for raw in self.adapter.list_columns(table).await? {
                let column = classify(table, &raw);
                trace!("{}:\t{}", column.qualified_name(), column.raw_type);
                aggregator.record_column();

                for check in &checks {
                    match check.run(&column, &oracle, &context).await {
                        Ok(outcome) => record_outcome(&mut aggregator, outcome),
                        Err(error) => {
                            self.recover(&mut aggregator, &column, check.kind(), error)?;
                        }
                    }
                }
            }

            trace!("Table {}.{}: OK", database, table);
        }

        Ok(finish(aggregator))
    }

    /// Finds auto-increment columns whose values approach their type limit.
    ///
    /// # Errors
    /// - `UnsupportedEngine` before any query is issued
    /// - `Configuration` for a negative or non-finite threshold
    /// - `UnknownTypeKind` for an auto-increment column of non-numeric kind
    /// - `QueryFailed` on the first failing query under the abort policy
    pub async fn run_overflow_scan(
        &self,
        threshold_percentage: f64,
    ) -> Result<(InspectionResult, ExitStatus)> {
        self.ensure_supported_engine()?;
        validate_threshold(threshold_percentage)?;
        let threshold = overflow::exact_threshold(threshold_percentage)?;
        let oracle = self.oracle();
        let database = self.adapter.database_name();

        let tables = self.adapter.list_tables().await?;
        info!(
            "Checking auto-increment columns of {} tables in '{}' (threshold {}%)",
            tables.len(),
            database,
            threshold_percentage
        );

        let mut aggregator = ResultAggregator::new(ScanKind::OverflowRisk, database)
            .with_threshold(threshold_percentage);
        for table in &tables {
            debug!("Table {}.{}: checking...", database, table);
            aggregator.record_table();

            let columns: Vec<ColumnDescriptor> = self
                .adapter
                .list_columns(table)
                .await?
                .iter()
                .map(|raw| classify(table, raw))
                .filter(overflow::is_applicable)
                .collect();

            if columns.is_empty() {
                trace!("Table {}.{}: OK", database, table);
                continue;
            }

            let size_bytes = table_size(&oracle, table).await;

            for column in &columns {
                trace!("\t{} is autoincrement.", column.column_name);
                aggregator.record_column();

                match overflow::assess(column, &oracle, &threshold, size_bytes).await {
                    Ok(Some(finding)) => {
                        debug!(
                            "{}.{} is full for {}%",
                            database,
                            column.qualified_name(),
                            finding.occupancy_percentage().unwrap_or_default()
                        );
                        aggregator.add_finding(finding);
                    }
                    Ok(None) => {}
                    Err(error) => {
                        self.recover(&mut aggregator, column, CheckKind::OverflowRisk, error)?;
                    }
                }
            }

            trace!("Table {}.{}: OK", database, table);
        }

        Ok(finish(aggregator))
    }

    /// Runs the validity scan with the configured check selection.
    ///
    /// # Errors
    /// Same as [`Inspector::run_validity_scan`]
    pub async fn run_configured_validity_scan(&self) -> Result<(InspectionResult, ExitStatus)> {
        self.run_validity_scan(self.config.checks.as_slice()).await
    }

    /// Runs the overflow scan with the configured threshold.
    ///
    /// # Errors
    /// Same as [`Inspector::run_overflow_scan`]
    pub async fn run_configured_overflow_scan(&self) -> Result<(InspectionResult, ExitStatus)> {
        self.run_overflow_scan(self.config.threshold_percentage).await
    }

    fn oracle(&self) -> DeadlineOracle<'a> {
        let inner: &'a dyn QueryOracle = self.adapter;
        DeadlineOracle::new(inner, self.config.query_timeout)
    }

    /// Applies the query error policy to a failed check.
    fn recover(
        &self,
        aggregator: &mut ResultAggregator,
        column: &ColumnDescriptor,
        check: CheckKind,
        error: ToolkitError,
    ) -> Result<()> {
        if self.config.query_error_policy == QueryErrorPolicy::SkipAndContinue
            && error.is_query_failure()
        {
            let advisory = Advisory::query_failed(column, check, &error);
            warn!("Skipping {} check: {}", check, advisory.message);
            aggregator.add_advisory(advisory);
            Ok(())
        } else {
            Err(error)
        }
    }
}

fn record_outcome(aggregator: &mut ResultAggregator, outcome: CheckOutcome) {
    match outcome {
        CheckOutcome::NotApplicable | CheckOutcome::Passed => {}
        CheckOutcome::Finding(finding) => {
            debug!(
                "{}.{}: {} rows failed the {} check",
                finding.table_name, finding.column_name, finding.issue_count, finding.check_kind
            );
            aggregator.add_finding(finding);
        }
        CheckOutcome::Advisory(advisory) => aggregator.add_advisory(advisory),
    }
}

/// Table size is informational; failures are logged and ignored.
async fn table_size(oracle: &dyn QueryOracle, table: &str) -> Option<u64> {
    match oracle.table_size_bytes(table).await {
        Ok(size) => size,
        Err(error) => {
            warn!("Could not read size of table '{}': {}", table, error);
            None
        }
    }
}

fn finish(aggregator: ResultAggregator) -> (InspectionResult, ExitStatus) {
    let result = aggregator.finalize();
    let status = result.exit_status();
    info!(
        "Scanned {} tables, {} columns: {} issues, {} risky columns, {} advisories",
        result.tables_scanned,
        result.columns_scanned,
        result.total_issue_count,
        result.risky_column_count,
        result.advisories.len()
    );
    (result, status)
}

fn check_names(checks: &BTreeSet<ValidityCheck>) -> String {
    checks
        .iter()
        .map(ValidityCheck::name)
        .collect::<Vec<_>>()
        .join(", ")
}
