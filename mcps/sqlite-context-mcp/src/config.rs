//! Configuration for the SQLite context server
//!
//! Settings come from command-line flags, each of which falls back to an
//! environment variable. Only the database path is required.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ContextError, ContextResult};

/// Command-line arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "sqlite-context-mcp")]
#[command(about = "MCP server exposing SQLite table schemas over stdio")]
pub struct Args {
    /// Path to the SQLite database file
    #[arg(long, env = "DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    /// How long to wait on a locked database before failing, in seconds
    #[arg(long, env = "SQLITE_BUSY_TIMEOUT_SECS", default_value_t = 30)]
    pub busy_timeout_secs: u64,

    /// Allow the query tool to run write statements (INSERT, UPDATE, DELETE, ...)
    #[arg(long, env = "SQLITE_ALLOW_WRITES")]
    pub allow_writes: bool,
}

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub database_path: PathBuf,
    pub busy_timeout: Duration,
    pub allow_writes: bool,
}

impl ContextConfig {
    /// Resolve configuration from parsed arguments
    pub fn from_args(args: Args) -> ContextResult<Self> {
        let database_path = args
            .database_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ContextError::StartupConfigurationMissing)?;

        Ok(Self {
            database_path,
            busy_timeout: Duration::from_secs(args.busy_timeout_secs),
            allow_writes: args.allow_writes,
        })
    }

    /// Parse the process arguments and environment
    pub fn load() -> ContextResult<Self> {
        Self::from_args(Args::parse())
    }
}
