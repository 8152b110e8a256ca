//! Offline adapter over a JSON schema snapshot.
//!
//! A snapshot holds column metadata and rows for each table. Predicates are
//! evaluated in memory following MySQL comparison rules closely enough for
//! inspection: strings compare by their leading numeric prefix
//! (`'0000-00-00'` is `0`) and lengths are byte lengths.
//!
//! ```json
//! {
//!   "database_type": "MySQL",
//!   "database_name": "shop",
//!   "max_allowed_packet": 67108864,
//!   "tables": [{
//!     "name": "users",
//!     "size_bytes": 16384,
//!     "columns": [{"name": "id", "data_type": "int", "is_nullable": false,
//!                  "is_unsigned": true, "is_auto_increment": true}],
//!     "rows": [{"id": 1}]
//!   }]
//! }
//! ```

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DatabaseAdapter, Predicate, QueryOracle, SchemaEnumerator};
use crate::error::ToolkitError;
use crate::models::{DatabaseType, RawColumn};
use crate::Result;

/// MySQL 8 default for `max_allowed_packet`.
pub const DEFAULT_MAX_ALLOWED_PACKET: u64 = 67_108_864;

/// Serialized database captured for offline inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    #[serde(default = "default_database_type")]
    pub database_type: DatabaseType,
    pub database_name: String,
    #[serde(default = "default_max_allowed_packet")]
    pub max_allowed_packet: u64,
    #[serde(default)]
    pub tables: Vec<TableSnapshot>,
}

/// One table of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub name: String,
    /// Data plus index size, if it was captured
    #[serde(default)]
    pub size_bytes: Option<u64>,
    pub columns: Vec<RawColumn>,
    /// Rows keyed by column name; a missing key is `NULL`
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

fn default_database_type() -> DatabaseType {
    DatabaseType::MySQL
}

fn default_max_allowed_packet() -> u64 {
    DEFAULT_MAX_ALLOWED_PACKET
}

impl DatabaseSnapshot {
    /// Starts an empty MySQL snapshot.
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_type: DatabaseType::MySQL,
            database_name: database_name.into(),
            max_allowed_packet: DEFAULT_MAX_ALLOWED_PACKET,
            tables: Vec::new(),
        }
    }

    /// Builder method to set the reported engine.
    pub fn with_database_type(mut self, database_type: DatabaseType) -> Self {
        self.database_type = database_type;
        self
    }

    /// Builder method to set the connection packet limit.
    pub fn with_max_allowed_packet(mut self, max_allowed_packet: u64) -> Self {
        self.max_allowed_packet = max_allowed_packet;
        self
    }

    /// Builder method to add a table.
    pub fn with_table(mut self, table: TableSnapshot) -> Self {
        self.tables.push(table);
        self
    }
}

impl TableSnapshot {
    /// Starts an empty table without columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes: None,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Builder method to add a column.
    pub fn with_column(mut self, column: RawColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Builder method to add a row from a JSON object. Non-object values
    /// are stored as an empty row.
    pub fn with_row(mut self, row: Value) -> Self {
        let row = match row {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.rows.push(row);
        self
    }

    /// Builder method to set the captured table size.
    pub fn with_size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }
}

/// Adapter answering inspection queries from a [`DatabaseSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotAdapter {
    snapshot: DatabaseSnapshot,
}

impl SnapshotAdapter {
    pub fn new(snapshot: DatabaseSnapshot) -> Self {
        Self { snapshot }
    }

    /// Parses a snapshot from JSON text.
    ///
    /// # Errors
    /// Returns `Serialization` if the text is not a valid snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot =
            serde_json::from_str(json).map_err(|e| ToolkitError::Serialization {
                context: "Failed to parse database snapshot".to_string(),
                source: e,
            })?;
        Ok(Self::new(snapshot))
    }

    /// Loads a snapshot file.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read and `Serialization` if it
    /// is not a valid snapshot
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ToolkitError::Io {
                context: format!("Failed to read snapshot {}", path.display()),
                source: e,
            })?;
        tracing::debug!("Loaded snapshot {} ({} bytes)", path.display(), json.len());
        Self::from_json(&json)
    }

    /// The wrapped snapshot.
    pub fn snapshot(&self) -> &DatabaseSnapshot {
        &self.snapshot
    }

    fn table(&self, table: &str) -> Result<&TableSnapshot> {
        self.snapshot
            .tables
            .iter()
            .find(|candidate| candidate.name == table)
            .ok_or_else(|| {
                ToolkitError::configuration(format!("Table '{}' not found in snapshot", table))
            })
    }

    /// Non-null values of `column`, after checking the column exists.
    fn values<'a>(&'a self, table: &str, column: &'a str) -> Result<Vec<&'a Value>> {
        let snapshot = self.table(table)?;
        if !snapshot.columns.iter().any(|c| c.name == column) {
            return Err(ToolkitError::configuration(format!(
                "Column '{}.{}' not found in snapshot",
                table, column
            )));
        }
        Ok(snapshot
            .rows
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|value| !value.is_null())
            .collect())
    }

    fn null_count(&self, table: &str, column: &str) -> Result<u64> {
        let snapshot = self.table(table)?;
        let non_null = self.values(table, column)?.len();
        Ok(snapshot.rows.len().saturating_sub(non_null) as u64)
    }
}

/// Numeric value of a stored value when compared with a number.
///
/// Strings contribute their leading numeric prefix, or `0` when there is
/// none. Returns `None` for `NULL`.
pub fn numeric_value(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(BigDecimal::from(u8::from(*flag))),
        Value::Number(number) => {
            Some(BigDecimal::from_str(&number.to_string()).unwrap_or_else(|_| BigDecimal::zero()))
        }
        Value::String(text) => Some(leading_number(text)),
        Value::Array(_) | Value::Object(_) => Some(BigDecimal::zero()),
    }
}

fn leading_number(text: &str) -> BigDecimal {
    let trimmed = text.trim_start();
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    if trimmed.len().saturating_sub(unsigned.len()) > 1 {
        return BigDecimal::zero();
    }

    let integer = leading_digits(unsigned);
    let fraction = unsigned
        .get(integer.len()..)
        .and_then(|rest| rest.strip_prefix('.'))
        .map(leading_digits)
        .unwrap_or_default();

    if integer.is_empty() && fraction.is_empty() {
        return BigDecimal::zero();
    }

    let sign = if trimmed.starts_with('-') { "-" } else { "" };
    let integer = if integer.is_empty() { "0" } else { integer };
    let number = if fraction.is_empty() {
        format!("{sign}{integer}")
    } else {
        format!("{sign}{integer}.{fraction}")
    };
    BigDecimal::from_str(&number).unwrap_or_else(|_| BigDecimal::zero())
}

fn leading_digits(text: &str) -> &str {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text.get(..end).unwrap_or_default()
}

/// Stored length in bytes. Returns `None` for `NULL`.
pub fn byte_length(value: &Value) -> Option<u64> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.len() as u64),
        other => Some(other.to_string().len() as u64),
    }
}

#[async_trait]
impl SchemaEnumerator for SnapshotAdapter {
    async fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self
            .snapshot
            .tables
            .iter()
            .map(|table| table.name.clone())
            .collect())
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<RawColumn>> {
        Ok(self.table(table)?.columns.clone())
    }
}

#[async_trait]
impl QueryOracle for SnapshotAdapter {
    async fn count_where(&self, table: &str, column: &str, predicate: &Predicate) -> Result<u64> {
        let count = match predicate {
            Predicate::IsNull => return self.null_count(table, column),
            Predicate::LessOrEqual(bound) => {
                let bound = BigDecimal::from(*bound);
                self.values(table, column)?
                    .into_iter()
                    .filter_map(numeric_value)
                    .filter(|value| *value <= bound)
                    .count()
            }
            Predicate::LengthGreaterThan(bound) => self
                .values(table, column)?
                .into_iter()
                .filter_map(byte_length)
                .filter(|length| length > bound)
                .count(),
        };
        Ok(count as u64)
    }

    async fn max_value(&self, table: &str, column: &str) -> Result<BigDecimal> {
        Ok(self
            .values(table, column)?
            .into_iter()
            .filter_map(numeric_value)
            .max()
            .unwrap_or_else(BigDecimal::zero))
    }

    async fn table_size_bytes(&self, table: &str) -> Result<Option<u64>> {
        Ok(self.table(table)?.size_bytes)
    }

    async fn max_allowed_packet_size(&self) -> Result<u64> {
        Ok(self.snapshot.max_allowed_packet)
    }
}

#[async_trait]
impl DatabaseAdapter for SnapshotAdapter {
    async fn test_connection(&self) -> Result<()> {
        for table in &self.snapshot.tables {
            if table.columns.is_empty() {
                return Err(ToolkitError::configuration(format!(
                    "Table '{}' in snapshot has no columns",
                    table.name
                )));
            }
        }
        Ok(())
    }

    fn database_type(&self) -> DatabaseType {
        self.snapshot.database_type
    }

    fn database_name(&self) -> &str {
        &self.snapshot.database_name
    }
}
