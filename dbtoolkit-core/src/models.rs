//! Core data models shared by adapters and the inspection engine.
//!
//! Adapters describe the inspected database with these types; the engine
//! never looks at driver-specific rows.

use serde::{Deserialize, Serialize};

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    PostgreSQL,
    MySQL,
    MariaDB,
    SQLite,
    MongoDB,
    SqlServer,
}

impl DatabaseType {
    /// Returns true for engines that accept the MySQL dialect used by the
    /// inspection queries.
    pub fn is_mysql_compatible(&self) -> bool {
        matches!(self, DatabaseType::MySQL | DatabaseType::MariaDB)
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::MySQL => write!(f, "MySQL"),
            DatabaseType::MariaDB => write!(f, "MariaDB"),
            DatabaseType::SQLite => write!(f, "SQLite"),
            DatabaseType::MongoDB => write!(f, "MongoDB"),
            DatabaseType::SqlServer => write!(f, "SQL Server"),
        }
    }
}

/// Column metadata as reported by a schema enumerator.
///
/// `data_type` is the engine's type name (`int`, `varchar`, ...) or a
/// normalized name (`integer`, `string`, `ascii_string`, ...); the
/// classifier accepts both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: String,
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub is_nullable: bool,
    #[serde(default)]
    pub is_unsigned: bool,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub is_auto_increment: bool,
}

fn default_nullable() -> bool {
    true
}

impl RawColumn {
    /// Creates a nullable, signed, non auto-increment column.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            is_unsigned: false,
            max_length: None,
            is_auto_increment: false,
        }
    }

    /// Builder method to set nullability.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.is_nullable = nullable;
        self
    }

    /// Builder method to mark the column unsigned.
    pub fn with_unsigned(mut self, unsigned: bool) -> Self {
        self.is_unsigned = unsigned;
        self
    }

    /// Builder method to set the declared character length.
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Builder method to mark the column auto-increment.
    pub fn with_auto_increment(mut self, auto_increment: bool) -> Self {
        self.is_auto_increment = auto_increment;
        self
    }
}
