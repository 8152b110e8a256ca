//! Counting and aggregate queries for the inspection checks.
//!
//! Identifiers cannot be bound as parameters, so table and column names are
//! backtick-quoted by [`quote_identifier`]. Predicate bounds are typed
//! integers and are inlined as literals.

use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use sqlx::MySqlPool;

use crate::Result;
use crate::adapters::Predicate;
use crate::error::ToolkitError;

/// Quotes a MySQL identifier, doubling embedded backticks.
///
/// # Example
/// ```rust
/// use dbtoolkit_core::adapters::mysql::quote_identifier;
///
/// assert_eq!(quote_identifier("users"), "`users`");
/// assert_eq!(quote_identifier("we`ird"), "`we``ird`");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// SQL counting the rows of `table` whose `column` matches `predicate`.
pub fn count_query(table: &str, column: &str, predicate: &Predicate) -> String {
    let table = quote_identifier(table);
    let column = quote_identifier(column);

    match predicate {
        Predicate::IsNull => format!("SELECT COUNT(*) FROM {table} WHERE {column} IS NULL"),
        Predicate::LessOrEqual(bound) => {
            format!("SELECT COUNT({column}) FROM {table} WHERE {column} <= {bound}")
        }
        Predicate::LengthGreaterThan(bound) => {
            format!("SELECT COUNT({column}) FROM {table} WHERE LENGTH({column}) > {bound}")
        }
    }
}

/// SQL reading the largest value of `column` as text, keeping full precision.
pub fn max_value_query(table: &str, column: &str) -> String {
    format!(
        "SELECT CAST(MAX({}) AS CHAR) FROM {}",
        quote_identifier(column),
        quote_identifier(table)
    )
}

pub(crate) async fn count_where(
    pool: &MySqlPool,
    table: &str,
    column: &str,
    predicate: &Predicate,
) -> Result<u64> {
    let sql = count_query(table, column, predicate);
    tracing::trace!("{}", sql);

    let count: i64 = sqlx::query_scalar(&sql)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            ToolkitError::query_execution(
                format!("Failed to count {} rows in {}.{}", predicate, table, column),
                e,
            )
        })?;

    Ok(u64::try_from(count).unwrap_or(0))
}

pub(crate) async fn max_value(pool: &MySqlPool, table: &str, column: &str) -> Result<BigDecimal> {
    let sql = max_value_query(table, column);
    tracing::trace!("{}", sql);

    let value: Option<String> = sqlx::query_scalar(&sql)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            ToolkitError::query_execution(
                format!("Failed to read max value of {}.{}", table, column),
                e,
            )
        })?;

    match value {
        None => Ok(BigDecimal::zero()),
        Some(text) => BigDecimal::from_str(text.trim()).map_err(|e| {
            ToolkitError::query_execution(
                format!("Max value of {}.{} is not numeric", table, column),
                e,
            )
        }),
    }
}

pub(crate) async fn table_size_bytes(
    pool: &MySqlPool,
    db_name: &str,
    table: &str,
) -> Result<Option<u64>> {
    let size_query = r#"
        SELECT CAST(DATA_LENGTH + INDEX_LENGTH AS SIGNED)
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = ?
        AND TABLE_NAME = ?
    "#;

    let size: Option<Option<i64>> = sqlx::query_scalar(size_query)
        .bind(db_name)
        .bind(table)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            ToolkitError::query_execution(format!("Failed to read size of table '{}'", table), e)
        })?;

    Ok(size.flatten().and_then(|bytes| u64::try_from(bytes).ok()))
}

pub(crate) async fn max_allowed_packet_size(pool: &MySqlPool) -> Result<u64> {
    let packet: i64 = sqlx::query_scalar("SELECT CAST(@@max_allowed_packet AS SIGNED)")
        .fetch_one(pool)
        .await
        .map_err(|e| ToolkitError::query_execution("Failed to read max_allowed_packet", e))?;

    u64::try_from(packet).map_err(|e| {
        ToolkitError::query_execution(format!("Invalid max_allowed_packet {}", packet), e)
    })
}
