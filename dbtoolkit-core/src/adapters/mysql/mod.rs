//! MySQL database adapter with connection pooling.
//!
//! # Module Structure
//! - `connection`: Connection pool management and validation
//! - `schema_collection`: Table and column enumeration from INFORMATION_SCHEMA
//! - `queries`: Counting and aggregate queries used by the checks
//!
//! # Security Guarantees
//! - All operations are read-only (SELECT only, read-only session)
//! - Connection strings are sanitized in error messages
//! - Statements are bounded by `max_execution_time`
//! - Identifiers are backtick-quoted before interpolation

pub mod connection;
pub mod queries;
pub mod schema_collection;

#[cfg(test)]
mod tests;

use super::{
    ConnectionConfig, DatabaseAdapter, Predicate, QueryOracle, SchemaEnumerator,
};
use crate::Result;
use crate::error::ToolkitError;
use crate::models::{DatabaseType, RawColumn};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::MySqlPool;

pub use connection::{parse_mysql_connection_config, validate_mysql_connection_string};
pub use queries::{count_query, max_value_query, quote_identifier};

/// MySQL database adapter with connection pooling
pub struct MySqlAdapter {
    /// Connection pool for database operations
    pub pool: MySqlPool,
    /// Connection configuration (pool settings, timeouts, etc.)
    pub config: ConnectionConfig,
    /// Inspected schema, taken from the URL path
    database_name: String,
    /// MySQL or MariaDB, from the URL scheme
    database_type: DatabaseType,
}

impl std::fmt::Debug for MySqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdapter")
            .field("config", &self.config)
            .field("database_name", &self.database_name)
            .field("database_type", &self.database_type)
            .field("pool_size", &self.pool.size())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SchemaEnumerator for MySqlAdapter {
    async fn list_tables(&self) -> Result<Vec<String>> {
        schema_collection::list_tables(&self.pool, &self.database_name).await
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<RawColumn>> {
        schema_collection::list_columns(&self.pool, &self.database_name, table).await
    }
}

#[async_trait]
impl QueryOracle for MySqlAdapter {
    async fn count_where(&self, table: &str, column: &str, predicate: &Predicate) -> Result<u64> {
        queries::count_where(&self.pool, table, column, predicate).await
    }

    async fn max_value(&self, table: &str, column: &str) -> Result<BigDecimal> {
        queries::max_value(&self.pool, table, column).await
    }

    async fn table_size_bytes(&self, table: &str) -> Result<Option<u64>> {
        queries::table_size_bytes(&self.pool, &self.database_name, table).await
    }

    async fn max_allowed_packet_size(&self) -> Result<u64> {
        queries::max_allowed_packet_size(&self.pool).await
    }
}

#[async_trait]
impl DatabaseAdapter for MySqlAdapter {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(ToolkitError::connection_failed)?;

        if connectivity_result != 1 {
            return Err(ToolkitError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        // Column metadata is read from INFORMATION_SCHEMA
        let visible_tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = ?",
        )
        .bind(&self.database_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            ToolkitError::insufficient_privileges(format!(
                "Cannot access INFORMATION_SCHEMA: {}",
                e
            ))
        })?;

        tracing::debug!(
            "Connection OK, {} tables visible in '{}'",
            visible_tables,
            self.database_name
        );

        Ok(())
    }

    fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    fn database_name(&self) -> &str {
        &self.database_name
    }
}
