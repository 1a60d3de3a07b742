//! Parameter types for tools and prompts

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for the get_schema tool and the sqlite-schema prompt
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SchemaParams {
    /// Name of the table to describe, or "all-tables" for every table
    pub table_name: String,
}

/// Parameters for the query tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// SQL query to execute. Must be a single statement. In read-only mode it must not modify the database.
    pub query: String,
}
