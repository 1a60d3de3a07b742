//! SQLite Context MCP Server
//!
//! Serves a SQLite database's table schemas over stdio. The database file
//! is given by `DATABASE_PATH` (or `--database-path`).

use rmcp::{transport::stdio, ServiceExt};
use std::sync::Arc;

use sqlite_context_mcp::{init_tracing, ContextConfig, SqliteContextServer, SqliteDatabase};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("sqlite_context_mcp")?;

    let config = ContextConfig::load()?;

    tracing::info!(
        path = %config.database_path.display(),
        allow_writes = config.allow_writes,
        "Starting SQLite context MCP server"
    );

    let database = SqliteDatabase::open(&config.database_path, config.busy_timeout)?;
    let server = SqliteContextServer::new(Arc::new(database), config.allow_writes);
    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");

    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
