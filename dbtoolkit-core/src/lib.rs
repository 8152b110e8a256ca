//! Core library of the database toolkit.
//!
//! Inspects a live MySQL database, or an offline JSON snapshot of one, for
//! stored values that violate their column's constraints and for
//! auto-increment columns approaching the limit of their type.
//!
//! # Security Guarantees
//! - All database operations are read-only
//! - Connection strings are redacted in every error and log line
//! - Findings carry counts and bounds, never row contents
//!
//! # Example
//! ```rust
//! use dbtoolkit_core::adapters::{DatabaseSnapshot, SnapshotAdapter, TableSnapshot};
//! use dbtoolkit_core::inspection::{ExitStatus, InspectionConfig, Inspector};
//! use dbtoolkit_core::models::RawColumn;
//!
//! let adapter = SnapshotAdapter::new(DatabaseSnapshot::new("shop").with_table(
//!     TableSnapshot::new("users")
//!         .with_column(RawColumn::new("email", "varchar").with_max_length(191)),
//! ));
//! let inspector = Inspector::new(&adapter, InspectionConfig::default());
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .enable_all()
//!     .build()
//!     .unwrap();
//! let (result, status) = runtime.block_on(inspector.run_validity_scan::<&str>(&[])).unwrap();
//! assert_eq!(status, ExitStatus::Success);
//! assert_eq!(result.columns_scanned, 1);
//! ```

pub mod adapters;
pub mod error;
pub mod inspection;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use adapters::{
    ConnectionConfig, DatabaseAdapter, Predicate, QueryOracle, SchemaEnumerator, create_adapter,
};
pub use error::{Result, ToolkitError};
pub use inspection::{ExitStatus, InspectionConfig, InspectionResult, Inspector};
pub use models::{DatabaseType, RawColumn};
