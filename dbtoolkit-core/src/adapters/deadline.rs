//! Per-query deadline for any [`QueryOracle`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use super::{Predicate, QueryOracle};
use crate::{Result, error::ToolkitError};

/// Wraps an oracle so that every query fails with `QueryTimeout` once the
/// deadline elapses. Without a deadline queries are passed through.
pub struct DeadlineOracle<'a> {
    inner: &'a dyn QueryOracle,
    timeout: Option<Duration>,
}

impl<'a> DeadlineOracle<'a> {
    pub fn new(inner: &'a dyn QueryOracle, timeout: Option<Duration>) -> Self {
        Self { inner, timeout }
    }

    async fn guarded<T, F>(&self, query: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        match self.timeout {
            None => query.await,
            Some(limit) => tokio::time::timeout(limit, query)
                .await
                .map_err(|_| ToolkitError::QueryTimeout {
                    elapsed_ms: limit.as_millis(),
                })?,
        }
    }
}

impl std::fmt::Debug for DeadlineOracle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlineOracle")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl QueryOracle for DeadlineOracle<'_> {
    async fn count_where(&self, table: &str, column: &str, predicate: &Predicate) -> Result<u64> {
        self.guarded(self.inner.count_where(table, column, predicate))
            .await
    }

    async fn max_value(&self, table: &str, column: &str) -> Result<BigDecimal> {
        self.guarded(self.inner.max_value(table, column)).await
    }

    async fn table_size_bytes(&self, table: &str) -> Result<Option<u64>> {
        self.guarded(self.inner.table_size_bytes(table)).await
    }

    async fn max_allowed_packet_size(&self) -> Result<u64> {
        self.guarded(self.inner.max_allowed_packet_size()).await
    }
}
