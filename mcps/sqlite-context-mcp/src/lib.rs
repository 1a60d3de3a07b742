//! SQLite Context MCP Library
//!
//! Exposes a SQLite database's tables to MCP clients: each table is a
//! `sqlite://<table>/schema` resource, the `get_schema` tool and the
//! `sqlite-schema` prompt render `CREATE TABLE` SQL, and the `query` tool
//! runs read-only SQL.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use sqlite_context_mcp::{SqliteContextServer, SqliteDatabase};
//!
//! let db = SqliteDatabase::open(path, Duration::from_secs(30))?;
//! let server = SqliteContextServer::new(Arc::new(db), false);
//! let response = server.router().dispatch("resources/list", json!({})).await?;
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod params;
pub mod render;
pub mod router;
pub mod server;
pub mod telemetry;
pub mod types;
pub mod uri;

// Re-export main server type
pub use server::SqliteContextServer;

pub use config::ContextConfig;
pub use database::{Database, SqliteDatabase};
pub use error::{ContextError, ContextResult, RequestFailed};
pub use render::{render_schema, SchemaSelector, ALL_TABLES};
pub use router::{Request, RequestKind, Response, Router};
pub use telemetry::init_tracing;
pub use uri::ResourceUri;
