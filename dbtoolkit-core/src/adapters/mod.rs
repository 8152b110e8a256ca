//! Database adapter traits and factory for inspection runs.
//!
//! The inspection engine talks to a database only through two narrow
//! collaborators: a [`SchemaEnumerator`] listing tables and columns, and a
//! [`QueryOracle`] answering counting and aggregate questions. Both are
//! object safe so a run can hold `Box<dyn DatabaseAdapter>`.
//!
//! # Module Structure
//! - `config`: Connection configuration
//! - `deadline`: Per-query deadline wrapper
//! - `snapshot`: Offline adapter over a JSON schema snapshot
//! - `mysql`: Live MySQL adapter (feature `mysql`)

use crate::Result;
use crate::models::{DatabaseType, RawColumn};
use async_trait::async_trait;
use bigdecimal::BigDecimal;

pub mod config;
pub mod deadline;
pub mod snapshot;

#[cfg(feature = "mysql")]
pub mod mysql;

pub use config::ConnectionConfig;
pub use deadline::DeadlineOracle;
pub use snapshot::{DatabaseSnapshot, SnapshotAdapter, TableSnapshot};

/// Row condition counted by [`QueryOracle::count_where`].
///
/// Counts follow SQL semantics: `NULL` values only match [`Predicate::IsNull`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Value is `NULL`
    IsNull,
    /// Value compares less than or equal to the bound
    LessOrEqual(i64),
    /// Stored length in bytes exceeds the bound
    LengthGreaterThan(u64),
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::IsNull => write!(f, "IS NULL"),
            Predicate::LessOrEqual(bound) => write!(f, "<= {}", bound),
            Predicate::LengthGreaterThan(bound) => write!(f, "LENGTH > {}", bound),
        }
    }
}

/// Lists the tables and columns of the inspected database.
#[async_trait]
pub trait SchemaEnumerator: Send + Sync {
    /// Lists base tables in a stable order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Lists the columns of `table` in ordinal order.
    async fn list_columns(&self, table: &str) -> Result<Vec<RawColumn>>;
}

/// Executes read-only counting and aggregate queries.
///
/// # Security
/// - Implementations never return row contents
/// - Identifiers are quoted by the implementation, never by callers
#[async_trait]
pub trait QueryOracle: Send + Sync {
    /// Counts rows of `table` whose `column` matches `predicate`.
    async fn count_where(&self, table: &str, column: &str, predicate: &Predicate) -> Result<u64>;

    /// Largest stored value of `column`; `0` for an empty table.
    async fn max_value(&self, table: &str, column: &str) -> Result<BigDecimal>;

    /// Data plus index size of `table`, if the engine reports it.
    async fn table_size_bytes(&self, table: &str) -> Result<Option<u64>>;

    /// Largest packet the connection accepts.
    async fn max_allowed_packet_size(&self) -> Result<u64>;
}

/// A connected database that can be inspected.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn DatabaseAdapter>`. It upcasts to `&dyn QueryOracle` and
/// `&dyn SchemaEnumerator`.
#[async_trait]
pub trait DatabaseAdapter: SchemaEnumerator + QueryOracle {
    /// Tests the database connection without inspecting anything.
    ///
    /// # Errors
    /// Returns error if connection fails or metadata is not readable
    async fn test_connection(&self) -> Result<()>;

    /// Returns the engine this adapter talks to.
    fn database_type(&self) -> DatabaseType;

    /// Name of the inspected database (schema).
    fn database_name(&self) -> &str;
}

/// Factory function to create database adapters based on connection string.
///
/// # Security
/// - Detects the engine from the URL scheme
/// - Sanitizes the connection string in all error messages
///
/// # Errors
/// Returns `UnsupportedEngine` for any non-MySQL engine, and a
/// configuration error for an unrecognized connection string.
pub async fn create_adapter(connection_string: &str) -> Result<Box<dyn DatabaseAdapter>> {
    let database_type = detect_database_type(connection_string)?;

    match database_type {
        #[cfg(feature = "mysql")]
        DatabaseType::MySQL | DatabaseType::MariaDB => {
            let adapter = mysql::MySqlAdapter::new(connection_string).await?;
            Ok(Box::new(adapter))
        }
        #[cfg(not(feature = "mysql"))]
        DatabaseType::MySQL | DatabaseType::MariaDB => {
            Err(crate::error::ToolkitError::configuration(
                "MySQL support not compiled in. Use --features mysql",
            ))
        }
        other => Err(crate::error::ToolkitError::unsupported_engine(other.to_string())),
    }
}

/// Detects database type from connection string.
///
/// # Errors
/// Returns error if connection string format is unrecognized
pub fn detect_database_type(connection_string: &str) -> Result<DatabaseType> {
    if connection_string.starts_with("mysql://") {
        Ok(DatabaseType::MySQL)
    } else if connection_string.starts_with("mariadb://") {
        Ok(DatabaseType::MariaDB)
    } else if connection_string.starts_with("postgres://")
        || connection_string.starts_with("postgresql://")
    {
        Ok(DatabaseType::PostgreSQL)
    } else if connection_string.starts_with("sqlite://")
        || connection_string.starts_with("sqlite:")
        || connection_string == ":memory:"
        || connection_string.ends_with(".db")
        || connection_string.ends_with(".sqlite")
        || connection_string.ends_with(".sqlite3")
    {
        Ok(DatabaseType::SQLite)
    } else if connection_string.starts_with("mongodb://")
        || connection_string.starts_with("mongodb+srv://")
    {
        Ok(DatabaseType::MongoDB)
    } else if connection_string.starts_with("mssql://")
        || connection_string.starts_with("sqlserver://")
    {
        Ok(DatabaseType::SqlServer)
    } else {
        Err(crate::error::ToolkitError::configuration(format!(
            "Unrecognized database connection string format: {}",
            crate::error::redact_database_url(connection_string)
        )))
    }
}
