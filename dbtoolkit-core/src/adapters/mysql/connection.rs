//! MySQL connection pool management and validation.
//!
//! # Security Features
//! - Validates connection string format and parameters
//! - Opens every session read-only with a statement time limit
//! - Never includes the password in errors or logs

use super::{ConnectionConfig, MySqlAdapter};
use crate::Result;
use crate::error::{ToolkitError, redact_database_url};
use crate::models::DatabaseType;
use percent_encoding::percent_decode_str;
use sqlx::MySqlPool;
use std::time::Duration;
use url::Url;

impl MySqlAdapter {
    /// Creates a new MySQL adapter with a lazy connection pool.
    ///
    /// # Arguments
    /// * `connection_string` - MySQL connection URL naming the inspected database
    ///
    /// # Errors
    /// Returns error if:
    /// - Connection string format is invalid
    /// - The URL does not name a database
    /// - Pool configuration is invalid
    pub async fn new(connection_string: &str) -> Result<Self> {
        let config = parse_mysql_connection_config(connection_string)?;
        Self::with_config(connection_string, config).await
    }

    /// Creates a new MySQL adapter with custom configuration.
    ///
    /// # Errors
    /// Same as [`MySqlAdapter::new`], plus configuration validation errors
    pub async fn with_config(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        validate_mysql_connection_string(connection_string)?;

        let database_name = config.database.clone().ok_or_else(|| {
            ToolkitError::configuration(
                "Connection string must name the database to inspect (mysql://host/database)",
            )
        })?;

        let database_type = if connection_string.starts_with("mariadb://") {
            DatabaseType::MariaDB
        } else {
            DatabaseType::MySQL
        };

        let pool = create_mysql_connection_pool(connection_string, &config, database_type)?;

        tracing::debug!("Created {} pool for {}", database_type, config);

        Ok(Self {
            pool,
            config,
            database_name,
            database_type,
        })
    }

    /// Closes the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Parses MySQL connection string to extract configuration parameters
///
/// # Returns
/// Validated connection configuration
pub fn parse_mysql_connection_config(connection_string: &str) -> Result<ConnectionConfig> {
    validate_mysql_connection_string(connection_string)?;

    let url = Url::parse(connection_string).map_err(|e| {
        ToolkitError::configuration(format!("Invalid MySQL connection string format: {}", e))
    })?;

    let mut config = ConnectionConfig::new(url.host_str().unwrap_or("localhost").to_string());

    config = config.with_port(url.port().unwrap_or(3306));

    // The driver decodes the path before connecting; metadata queries must
    // filter on the same name.
    let database = percent_decode_str(url.path().trim_start_matches('/'))
        .decode_utf8()
        .map_err(|_| ToolkitError::configuration("Database name is not valid UTF-8"))?;
    if !database.is_empty() {
        if database.contains('/') {
            return Err(ToolkitError::configuration(
                "Database name must not contain '/'",
            ));
        }
        if database.chars().count() > 64 {
            return Err(ToolkitError::configuration(
                "Database name too long: maximum 64 characters",
            ));
        }
        config = config.with_database(database.to_string());
    }

    let username = url.username();
    if !username.is_empty() {
        if username.len() > 32 {
            return Err(ToolkitError::configuration(
                "Username too long: maximum 32 characters for MySQL",
            ));
        }
        config = config.with_username(username.to_string());
    }

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "connect_timeout" => {
                if let Ok(timeout_secs) = value.parse::<u64>()
                    && timeout_secs > 0
                    && timeout_secs <= 300
                {
                    config.connect_timeout = Duration::from_secs(timeout_secs);
                }
            }
            "pool_max_conns" => {
                if let Ok(max_conns) = value.parse::<u32>()
                    && max_conns > 0
                    && max_conns <= 100
                {
                    config.max_connections = max_conns;
                }
            }
            _ => {}
        }
    }

    config.validate()?;

    Ok(config)
}

/// Validates MySQL connection string format
///
/// # Errors
/// Returns error if connection string is invalid or not a MySQL URL
pub fn validate_mysql_connection_string(connection_string: &str) -> Result<()> {
    let url = Url::parse(connection_string).map_err(|e| {
        ToolkitError::configuration(format!("Invalid MySQL connection string format: {}", e))
    })?;

    if url.scheme() != "mysql" && url.scheme() != "mariadb" {
        return Err(ToolkitError::configuration(
            "Connection string must use mysql:// scheme",
        ));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ToolkitError::configuration(
            "Connection string must specify a host",
        ));
    }

    if url.port() == Some(0) {
        return Err(ToolkitError::configuration(
            "Invalid port number: must be greater than 0",
        ));
    }

    Ok(())
}

/// sqlx only understands the `mysql` scheme.
fn driver_url(connection_string: &str) -> String {
    match connection_string.strip_prefix("mariadb://") {
        Some(rest) => format!("mysql://{}", rest),
        None => connection_string.to_string(),
    }
}

/// Session statement limit; MariaDB names it differently and counts seconds.
fn statement_limit_sql(database_type: DatabaseType, query_timeout: Duration) -> String {
    match database_type {
        DatabaseType::MariaDB => format!(
            "SET SESSION max_statement_time = {}",
            query_timeout.as_secs_f64()
        ),
        _ => format!(
            "SET SESSION max_execution_time = {}",
            query_timeout.as_millis()
        ),
    }
}

/// Creates a lazy MySQL connection pool.
///
/// Each new session is set read-only, bounded by a statement time limit and
/// pinned to UTC.
fn create_mysql_connection_pool(
    connection_string: &str,
    config: &ConnectionConfig,
    database_type: DatabaseType,
) -> Result<MySqlPool> {
    use sqlx::Executor;

    let statement_limit = statement_limit_sql(database_type, config.query_timeout);
    let read_only = config.read_only;

    sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(config.max_connections.min(100))
        .acquire_timeout(config.connect_timeout)
        .test_before_acquire(true)
        .after_connect(move |conn, _meta| {
            let statement_limit = statement_limit.clone();
            Box::pin(async move {
                conn.execute(statement_limit.as_str()).await?;

                if read_only {
                    conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                }

                conn.execute("SET time_zone = '+00:00'").await?;

                Ok(())
            })
        })
        .connect_lazy(&driver_url(connection_string))
        .map_err(|e| ToolkitError::Connection {
            context: format!(
                "Failed to create MySQL connection pool to {}",
                redact_database_url(connection_string)
            ),
            source: Box::new(e),
        })
}
