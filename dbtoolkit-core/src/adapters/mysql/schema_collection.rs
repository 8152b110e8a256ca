//! MySQL table and column enumeration.
//!
//! Reads INFORMATION_SCHEMA only. Text columns are cast to CHAR to avoid
//! VARBINARY results on MySQL 8.0+.

use crate::Result;
use crate::error::ToolkitError;
use crate::models::RawColumn;
use sqlx::{MySqlPool, Row};

/// Lists base tables of `db_name` in name order.
pub(crate) async fn list_tables(pool: &MySqlPool, db_name: &str) -> Result<Vec<String>> {
    let tables_query = r#"
        SELECT CAST(TABLE_NAME AS CHAR) as TABLE_NAME
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = ?
        AND TABLE_TYPE = 'BASE TABLE'
        ORDER BY TABLE_NAME
    "#;

    let rows = sqlx::query(tables_query)
        .bind(db_name)
        .fetch_all(pool)
        .await
        .map_err(|e| ToolkitError::query_execution("Failed to enumerate tables", e))?;

    let mut tables = Vec::with_capacity(rows.len());
    for row in &rows {
        let table_name: String = row
            .try_get("TABLE_NAME")
            .map_err(|e| ToolkitError::query_execution("Failed to parse table name", e))?;
        tables.push(table_name);
    }

    tracing::debug!("Found {} tables in '{}'", tables.len(), db_name);
    Ok(tables)
}

/// Lists the columns of `table_name` in ordinal order.
pub(crate) async fn list_columns(
    pool: &MySqlPool,
    db_name: &str,
    table_name: &str,
) -> Result<Vec<RawColumn>> {
    let columns_query = r#"
        SELECT
            CAST(c.COLUMN_NAME AS CHAR) as COLUMN_NAME,
            CAST(c.DATA_TYPE AS CHAR) as DATA_TYPE,
            CAST(c.COLUMN_TYPE AS CHAR) as COLUMN_TYPE,
            CAST(c.CHARACTER_MAXIMUM_LENGTH AS SIGNED) as CHARACTER_MAXIMUM_LENGTH,
            CAST(c.IS_NULLABLE AS CHAR) as IS_NULLABLE,
            CAST(c.EXTRA AS CHAR) as EXTRA
        FROM INFORMATION_SCHEMA.COLUMNS c
        WHERE c.TABLE_SCHEMA = ?
        AND c.TABLE_NAME = ?
        ORDER BY c.ORDINAL_POSITION
    "#;

    let rows = sqlx::query(columns_query)
        .bind(db_name)
        .bind(table_name)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            ToolkitError::query_execution(
                format!("Failed to collect columns for table '{}'", table_name),
                e,
            )
        })?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let column_name: String = row
            .try_get("COLUMN_NAME")
            .map_err(|e| ToolkitError::query_execution("Failed to parse column name", e))?;
        let data_type: String = row.try_get("DATA_TYPE").unwrap_or_default();
        let column_type: String = row.try_get("COLUMN_TYPE").unwrap_or_default();
        let char_max_length: Option<i64> = row.try_get("CHARACTER_MAXIMUM_LENGTH").ok().flatten();
        let is_nullable: String = row.try_get("IS_NULLABLE").unwrap_or_default();
        let extra: String = row.try_get("EXTRA").unwrap_or_default();

        columns.push(raw_column(
            column_name,
            &data_type,
            &column_type,
            char_max_length,
            &is_nullable,
            &extra,
        ));
    }

    Ok(columns)
}

/// Builds a [`RawColumn`] from INFORMATION_SCHEMA.COLUMNS values.
///
/// Lengths above `u32::MAX` (LONGTEXT reports 4294967295) are clamped.
pub(crate) fn raw_column(
    name: String,
    data_type: &str,
    column_type: &str,
    char_max_length: Option<i64>,
    is_nullable: &str,
    extra: &str,
) -> RawColumn {
    let mut column = RawColumn::new(name, data_type.to_lowercase())
        .with_nullable(is_nullable.eq_ignore_ascii_case("YES"))
        .with_unsigned(column_type.to_lowercase().contains("unsigned"))
        .with_auto_increment(extra.to_lowercase().contains("auto_increment"));

    if let Some(length) = char_max_length
        && length > 0
    {
        column = column.with_max_length(u32::try_from(length).unwrap_or(u32::MAX));
    }

    column
}
