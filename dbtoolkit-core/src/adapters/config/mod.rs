//! Configuration types for database adapters.
//!
//! # Security
//! These configuration structs intentionally do NOT store passwords or credentials.
//! Credentials stay in the connection URL handed to the pool and are never logged.

mod connection;

pub use connection::ConnectionConfig;
