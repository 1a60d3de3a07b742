//! Request routing
//!
//! [`Router`] owns the injected [`Database`] handle and answers every
//! request kind the server supports. Each request is handled on its own;
//! nothing is carried over between requests except the connection.
//!
//! The MCP binding calls the typed methods directly. [`Router::dispatch`]
//! accepts loosely-typed `(method, params)` pairs for in-process callers
//! and rejects anything it does not recognise.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::database::Database;
use crate::error::{ContextError, ContextResult, RequestFailed};
use crate::params::{QueryParams, SchemaParams};
use crate::render::{render_schema, SchemaSelector};
use crate::types::{QueryResult, ResourceEntry, ResourceText, SCHEMA_MIME_TYPE};
use crate::uri::ResourceUri;

/// Tool that renders table schemas
pub const SCHEMA_TOOL: &str = "get_schema";

/// Tool that runs SQL queries
pub const QUERY_TOOL: &str = "query";

/// Prompt that renders table schemas
pub const SCHEMA_PROMPT: &str = "sqlite-schema";

// ============================================================================
// Request / Response Types
// ============================================================================

/// The kind of request being served, used to tag failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    ListResources,
    ReadResource,
    SchemaTool,
    QueryTool,
    SchemaPrompt,
    /// The request could not be classified
    Unknown,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ListResources => f.write_str("resources/list"),
            Self::ReadResource => f.write_str("resources/read"),
            Self::SchemaTool => write!(f, "tools/call {}", SCHEMA_TOOL),
            Self::QueryTool => write!(f, "tools/call {}", QUERY_TOOL),
            Self::SchemaPrompt => write!(f, "prompts/get {}", SCHEMA_PROMPT),
            Self::Unknown => f.write_str("request"),
        }
    }
}

/// A request the router can serve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListResources,
    ReadResource { uri: String },
    SchemaTool { table_name: String },
    QueryTool { query: String },
    SchemaPrompt { table_name: String },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::ListResources => RequestKind::ListResources,
            Self::ReadResource { .. } => RequestKind::ReadResource,
            Self::SchemaTool { .. } => RequestKind::SchemaTool,
            Self::QueryTool { .. } => RequestKind::QueryTool,
            Self::SchemaPrompt { .. } => RequestKind::SchemaPrompt,
        }
    }

    /// Build a request from an MCP method name and its JSON params
    pub fn from_method(method: &str, params: Value) -> Result<Self, RequestFailed> {
        match method {
            "resources/list" => Ok(Self::ListResources),
            "resources/read" => {
                let params: ReadResourceParams = parse(RequestKind::ReadResource, params)?;
                Ok(Self::ReadResource { uri: params.uri })
            }
            "tools/call" => {
                let call: NamedCall = parse(RequestKind::Unknown, params)?;
                match call.name.as_str() {
                    SCHEMA_TOOL => {
                        let args: SchemaParams = parse(RequestKind::SchemaTool, call.arguments)?;
                        Ok(Self::SchemaTool {
                            table_name: args.table_name,
                        })
                    }
                    QUERY_TOOL => {
                        let args: QueryParams = parse(RequestKind::QueryTool, call.arguments)?;
                        Ok(Self::QueryTool { query: args.query })
                    }
                    other => Err(unsupported(format!("tool '{}'", other))),
                }
            }
            "prompts/get" => {
                let call: NamedCall = parse(RequestKind::Unknown, params)?;
                match call.name.as_str() {
                    SCHEMA_PROMPT => {
                        let args: SchemaParams = parse(RequestKind::SchemaPrompt, call.arguments)?;
                        Ok(Self::SchemaPrompt {
                            table_name: args.table_name,
                        })
                    }
                    other => Err(unsupported(format!("prompt '{}'", other))),
                }
            }
            other => Err(unsupported(format!("method '{}'", other))),
        }
    }
}

/// A successful response, one variant per request kind
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Resources(Vec<ResourceEntry>),
    Resource(ResourceText),
    Schema(String),
    Rows(QueryResult),
}

#[derive(Debug, Deserialize)]
struct ReadResourceParams {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct NamedCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

fn parse<T: DeserializeOwned>(kind: RequestKind, params: Value) -> Result<T, RequestFailed> {
    serde_json::from_value(params)
        .map_err(|e| RequestFailed::new(kind, ContextError::InvalidArgument(e.to_string())))
}

fn unsupported(what: String) -> RequestFailed {
    RequestFailed::new(RequestKind::Unknown, ContextError::UnsupportedRequestKind(what))
}

fn tagged<T>(kind: RequestKind, result: ContextResult<T>) -> Result<T, RequestFailed> {
    result.map_err(|source| {
        tracing::warn!(%kind, error = %source, "Request failed");
        RequestFailed::new(kind, source)
    })
}

// ============================================================================
// Router
// ============================================================================

/// Routes requests to their handlers
#[derive(Clone)]
pub struct Router {
    db: Arc<dyn Database>,
    allow_writes: bool,
}

impl Router {
    pub fn new(db: Arc<dyn Database>, allow_writes: bool) -> Self {
        Self { db, allow_writes }
    }

    pub fn allow_writes(&self) -> bool {
        self.allow_writes
    }

    /// Serve a typed request
    pub async fn handle(&self, request: Request) -> Result<Response, RequestFailed> {
        match request {
            Request::ListResources => self.list_resources().await.map(Response::Resources),
            Request::ReadResource { uri } => self.read_resource(&uri).await.map(Response::Resource),
            Request::SchemaTool { table_name } => {
                self.schema_tool(&table_name).await.map(Response::Schema)
            }
            Request::QueryTool { query } => self.query(&query).await.map(Response::Rows),
            Request::SchemaPrompt { table_name } => {
                self.schema_prompt(&table_name).await.map(Response::Schema)
            }
        }
    }

    /// Parse a loosely-typed request and serve it
    pub async fn dispatch(&self, method: &str, params: Value) -> Result<Response, RequestFailed> {
        let request = Request::from_method(method, params).inspect_err(|e| {
            tracing::warn!(method, error = %e, "Rejected request");
        })?;
        self.handle(request).await
    }

    /// One schema resource per user table
    pub async fn list_resources(&self) -> Result<Vec<ResourceEntry>, RequestFailed> {
        tagged(RequestKind::ListResources, self.resource_entries().await)
    }

    /// Column descriptors for the table named by `uri`, as JSON text
    pub async fn read_resource(&self, uri: &str) -> Result<ResourceText, RequestFailed> {
        tagged(RequestKind::ReadResource, self.resource_text(uri).await)
    }

    /// Rendered schema for the get_schema tool
    pub async fn schema_tool(&self, table_name: &str) -> Result<String, RequestFailed> {
        tagged(RequestKind::SchemaTool, self.render(table_name).await)
    }

    /// Rendered schema for the sqlite-schema prompt
    pub async fn schema_prompt(&self, table_name: &str) -> Result<String, RequestFailed> {
        tagged(RequestKind::SchemaPrompt, self.render(table_name).await)
    }

    /// Run a query, refusing writes unless they are enabled
    pub async fn query(&self, sql: &str) -> Result<QueryResult, RequestFailed> {
        tagged(RequestKind::QueryTool, self.run_query(sql).await)
    }

    async fn resource_entries(&self) -> ContextResult<Vec<ResourceEntry>> {
        let tables = self.db.list_tables().await?;
        tracing::debug!(count = tables.len(), "Listing schema resources");

        Ok(tables
            .into_iter()
            .map(|table| ResourceEntry {
                uri: ResourceUri::new(table.as_str()).to_string(),
                mime_type: SCHEMA_MIME_TYPE.to_string(),
                name: format!("\"{}\" database schema", table),
            })
            .collect())
    }

    async fn resource_text(&self, uri: &str) -> ContextResult<ResourceText> {
        let resource: ResourceUri = uri.parse()?;
        tracing::debug!(table = resource.table(), "Reading schema resource");

        let columns = self.db.table_columns(resource.table()).await?;

        Ok(ResourceText {
            uri: uri.to_string(),
            mime_type: SCHEMA_MIME_TYPE.to_string(),
            text: serde_json::to_string_pretty(&columns)?,
        })
    }

    async fn render(&self, table_name: &str) -> ContextResult<String> {
        let selector: SchemaSelector = table_name.parse()?;
        tracing::debug!(%selector, "Rendering schema");

        render_schema(self.db.as_ref(), &selector).await
    }

    async fn run_query(&self, sql: &str) -> ContextResult<QueryResult> {
        let read_only = !self.allow_writes;
        if read_only && !is_read_only_query(sql) {
            return Err(ContextError::WritesDisabled);
        }

        tracing::debug!(sql, read_only, "Executing query");
        // The keyword check is only a first pass; the database refuses any
        // statement SQLite reports as writing
        self.db.execute(sql, read_only).await
    }
}

/// Check if a query is a read-only statement
fn is_read_only_query(query: &str) -> bool {
    let normalized = query.trim_start().to_uppercase();
    // WITH covers CTEs that end in SELECT
    ["SELECT", "EXPLAIN", "PRAGMA", "WITH"]
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
}
