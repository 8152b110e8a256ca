//! Schema health inspection tool.
//!
//! This binary inspects a MySQL database (or an offline snapshot of one) for
//! stored values that break their column's constraints and for
//! auto-increment columns that are running out of values.
//!
//! # Security Guarantees
//! - Read-only database operations only
//! - No credentials stored or logged

use std::process::ExitCode;

use clap::Parser;
use dbtoolkit::{Cli, run};
use dbtoolkit_core::logging::init_logging;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet, cli.global.log_json) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
