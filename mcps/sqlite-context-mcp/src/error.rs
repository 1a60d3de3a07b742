//! Error types for the SQLite context server
//!
//! [`ContextError`] covers everything a single request can fail with.
//! The router wraps it in [`RequestFailed`] so callers know which request
//! kind failed, and the MCP layer turns that into an `rmcp::ErrorData`.

use rmcp::ErrorData as McpError;
use thiserror::Error;

use crate::router::RequestKind;

/// Errors raised while serving a request or starting the server
#[derive(Error, Debug)]
pub enum ContextError {
    /// A metadata or data query against the database failed
    #[error("database query failed: {0}")]
    DatabaseQueryFailed(#[from] rusqlite::Error),

    /// A resource URI did not have the `sqlite://<table>/schema` shape
    #[error("invalid resource URI: {0}")]
    InvalidResourceIdentifier(String),

    /// A request carried a missing or malformed argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A non read-only statement was sent while writes are disabled
    #[error(
        "write operations are disabled; only read-only SELECT, EXPLAIN, PRAGMA and WITH statements are allowed"
    )]
    WritesDisabled,

    /// A query string held more than one SQL statement
    #[error("only one SQL statement may be executed per query")]
    MultipleStatements,

    /// The request method, tool or prompt is not one this server knows
    #[error("unsupported request kind: {0}")]
    UnsupportedRequestKind(String),

    /// `DATABASE_PATH` was not supplied at startup
    #[error(
        "no database path configured - set the DATABASE_PATH environment variable or pass --database-path"
    )]
    StartupConfigurationMissing,

    /// A response payload could not be encoded
    #[error("failed to encode response: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for server operations
pub type ContextResult<T> = Result<T, ContextError>;

/// A request that failed, tagged with the kind of request it was
#[derive(Error, Debug)]
#[error("{kind} failed: {source}")]
pub struct RequestFailed {
    pub kind: RequestKind,
    #[source]
    pub source: ContextError,
}

impl RequestFailed {
    pub fn new(kind: RequestKind, source: ContextError) -> Self {
        Self { kind, source }
    }
}

impl From<RequestFailed> for McpError {
    fn from(err: RequestFailed) -> Self {
        let message = err.to_string();
        match err.source {
            ContextError::InvalidResourceIdentifier(_)
            | ContextError::InvalidArgument(_)
            | ContextError::WritesDisabled
            | ContextError::MultipleStatements => McpError::invalid_params(message, None),
            ContextError::UnsupportedRequestKind(_) => McpError::invalid_request(message, None),
            _ => McpError::internal_error(message, None),
        }
    }
}
