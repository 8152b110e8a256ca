//! Inspection run configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::checks::ValidityCheck;
use crate::error::ToolkitError;

/// Default overflow threshold, in percent.
pub const DEFAULT_THRESHOLD_PERCENTAGE: f64 = 70.0;

/// What to do when a single check's query fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryErrorPolicy {
    /// Abort the whole run on the first failure
    #[default]
    Abort,
    /// Record a `QueryFailed` advisory and continue with the next check
    SkipAndContinue,
}

/// Inspection run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionConfig {
    /// Overflow occupancy at or above which a column is flagged, in percent
    pub threshold_percentage: f64,
    /// Validity checks to run; empty means all
    pub checks: Vec<String>,
    /// Failure handling for individual check queries
    pub query_error_policy: QueryErrorPolicy,
    /// Client-side deadline for each oracle query
    pub query_timeout: Option<Duration>,
}

/// Validation errors for inspection configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("threshold_percentage must be a finite value of at least 0, got {0}")]
    InvalidThreshold(f64),
    #[error("unknown check '{0}'")]
    UnknownCheck(String),
    #[error("query_timeout must be greater than 0")]
    ZeroQueryTimeout,
}

impl From<ConfigValidationError> for ToolkitError {
    fn from(error: ConfigValidationError) -> Self {
        ToolkitError::configuration(error.to_string())
    }
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            threshold_percentage: DEFAULT_THRESHOLD_PERCENTAGE,
            checks: Vec::new(),
            query_error_policy: QueryErrorPolicy::Abort,
            query_timeout: None,
        }
    }
}

/// Checks that a threshold is finite and not negative.
///
/// Values above 100 are accepted; no column can reach them.
pub fn validate_threshold(threshold_percentage: f64) -> Result<(), ConfigValidationError> {
    if threshold_percentage.is_finite() && threshold_percentage >= 0.0 {
        Ok(())
    } else {
        Err(ConfigValidationError::InvalidThreshold(
            threshold_percentage,
        ))
    }
}

impl InspectionConfig {
    /// Creates a new inspection config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the overflow threshold.
    pub fn with_threshold_percentage(mut self, threshold_percentage: f64) -> Self {
        self.threshold_percentage = threshold_percentage;
        self
    }

    /// Builder method to select validity checks by name.
    pub fn with_checks<I, S>(mut self, checks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checks = checks.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the query error policy.
    pub fn with_query_error_policy(mut self, policy: QueryErrorPolicy) -> Self {
        self.query_error_policy = policy;
        self
    }

    /// Builder method to set a per-query deadline.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Validates the configuration.
    ///
    /// Returns an error if the threshold is out of range, a check name is
    /// unknown or the deadline is zero.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_threshold(self.threshold_percentage)?;

        if let Some(unknown) = self
            .checks
            .iter()
            .find(|name| name.parse::<ValidityCheck>().is_err())
        {
            return Err(ConfigValidationError::UnknownCheck(unknown.clone()));
        }

        if self.query_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConfigValidationError::ZeroQueryTimeout);
        }

        Ok(())
    }
}
