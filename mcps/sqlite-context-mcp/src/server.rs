//! MCP server binding
//!
//! Maps MCP resources, tools and prompts onto the [`Router`]. All request
//! handling lives in the router; this module only converts between
//! router types and `rmcp::model` types.

use rmcp::{
    handler::server::{
        router::{prompt::PromptRouter, tool::ToolRouter},
        wrapper::Parameters,
    },
    model::{
        AnnotateAble, CallToolResult, Content, GetPromptRequestParam, GetPromptResult,
        ListPromptsResult, ListResourcesResult, PaginatedRequestParam, PromptMessage,
        PromptMessageRole, RawResource, ReadResourceRequestParam, ReadResourceResult, Resource,
        ResourceContents, ServerCapabilities, ServerInfo,
    },
    prompt, prompt_handler, prompt_router,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer,
};
use serde::Serialize;
use std::sync::Arc;

use crate::database::Database;
use crate::params::{QueryParams, SchemaParams};
use crate::router::Router;
use crate::types::ResourceEntry;

/// SQLite context MCP server
#[derive(Clone)]
pub struct SqliteContextServer {
    router: Router,
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl SqliteContextServer {
    /// Create a server over an already opened database
    pub fn new(database: Arc<dyn Database>, allow_writes: bool) -> Self {
        Self {
            router: Router::new(database, allow_writes),
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
        }
    }

    /// The request router, for in-process callers
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[tool(description = "Get the CREATE TABLE statement for a table. Pass \"all-tables\" as table_name to get every table in the database.")]
    async fn get_schema(
        &self,
        Parameters(params): Parameters<SchemaParams>,
    ) -> Result<CallToolResult, McpError> {
        let sql = self.router.schema_tool(&params.table_name).await?;
        Ok(CallToolResult::success(vec![Content::text(sql)]))
    }

    #[tool(description = "Execute a SQL query on the database. Returns column names and rows as JSON. One statement per call. In read-only mode (default), only SELECT, EXPLAIN, PRAGMA and WITH statements that do not modify the database are allowed.")]
    async fn query(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = self.router.query(&params.query).await?;
        json_success(&result)
    }
}

// ============================================================================
// Prompt Router
// ============================================================================

#[prompt_router]
impl SqliteContextServer {
    #[prompt(
        name = "sqlite-schema",
        description = "Schema of a table as CREATE TABLE SQL, or of every table with \"all-tables\""
    )]
    async fn sqlite_schema(
        &self,
        Parameters(params): Parameters<SchemaParams>,
    ) -> Result<GetPromptResult, McpError> {
        let sql = self.router.schema_prompt(&params.table_name).await?;

        Ok(GetPromptResult {
            description: Some(format!("SQLite schema for {}", params.table_name)),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, sql)],
        })
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
#[prompt_handler]
impl rmcp::ServerHandler for SqliteContextServer {
    fn get_info(&self) -> ServerInfo {
        let mode = if self.router.allow_writes() {
            "read-write"
        } else {
            "read-only"
        };
        ServerInfo {
            instructions: Some(format!(
                "SQLite context server ({} mode). Each table is a resource at \
                sqlite://<table>/schema. Use get_schema or the sqlite-schema prompt for \
                CREATE TABLE statements (\"all-tables\" covers every table) and query to run SQL.",
                mode
            )),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = self
            .router
            .list_resources()
            .await?
            .into_iter()
            .map(to_resource)
            .collect();

        Ok(ListResourcesResult::with_all_items(resources))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let resource = self.router.read_resource(&request.uri).await?;

        let mut contents = ResourceContents::text(resource.text, resource.uri);
        if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
            *mime_type = Some(resource.mime_type);
        }

        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }
}

fn to_resource(entry: ResourceEntry) -> Resource {
    let mut raw = RawResource::new(entry.uri, entry.name);
    raw.mime_type = Some(entry.mime_type);
    raw.no_annotation()
}

fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteDatabase;
    use rmcp::ServerHandler;
    use rusqlite::Connection;

    fn test_server(allow_writes: bool) -> SqliteContextServer {
        let conn = Connection::open_in_memory().unwrap();
        SqliteContextServer::new(Arc::new(SqliteDatabase::from_connection(conn)), allow_writes)
    }

    #[test]
    fn test_capabilities() {
        let info = test_server(false).get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.prompts.is_some());
        assert!(info.capabilities.resources.is_some());
        assert!(info.instructions.unwrap().contains("read-only"));
    }

    #[test]
    fn test_tools_registered() {
        let server = test_server(false);
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["get_schema", "query"]);
    }

    #[test]
    fn test_prompts_registered() {
        let server = test_server(false);
        let names: Vec<String> = server
            .prompt_router
            .list_all()
            .into_iter()
            .map(|p| p.name.to_string())
            .collect();
        assert_eq!(names, vec!["sqlite-schema"]);
    }

    #[test]
    fn test_to_resource() {
        let resource = to_resource(ResourceEntry {
            uri: "sqlite://users/schema".to_string(),
            mime_type: "application/json".to_string(),
            name: "\"users\" database schema".to_string(),
        });
        assert_eq!(resource.raw.uri, "sqlite://users/schema");
        assert_eq!(resource.raw.mime_type.as_deref(), Some("application/json"));
        assert_eq!(resource.raw.name, "\"users\" database schema");
    }
}
