//! Payload types shared by the database layer, router and MCP binding

use serde::{Deserialize, Serialize};

/// MIME type advertised for every schema resource
pub const SCHEMA_MIME_TYPE: &str = "application/json";

// ============================================================================
// Database Types
// ============================================================================

/// One column of a table, in the shape SQLite's `table_info` pragma reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Ordinal position within the table
    pub cid: i64,
    pub name: String,
    /// Declared type name, empty when the column was declared without one
    #[serde(rename = "type")]
    pub declared_type: String,
    pub notnull: bool,
    /// Default expression text exactly as declared
    pub dflt_value: Option<String>,
    /// Position within the primary key, 0 when not part of it
    pub pk: i64,
}

/// Query result with column info and rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Rows as arrays of values
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Number of rows returned
    pub row_count: usize,
}

// ============================================================================
// Response Types
// ============================================================================

/// An addressable schema resource, one per user table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub uri: String,
    pub mime_type: String,
    pub name: String,
}

/// Contents of a schema resource read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceText {
    pub uri: String,
    pub mime_type: String,
    /// Pretty-printed JSON array of [`Column`] descriptors
    pub text: String,
}
