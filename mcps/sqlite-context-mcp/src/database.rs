//! Database access for the context server
//!
//! The [`Database`] trait is the only thing the renderer and router know
//! about storage. [`SqliteDatabase`] implements it over a single shared
//! rusqlite connection that lives as long as the process.

use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Batch, Connection};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::{ContextError, ContextResult};
use crate::types::{Column, QueryResult};

/// Prefix SQLite reserves for its internal tables
pub const SYSTEM_TABLE_PREFIX: &str = "sqlite_";

// `_` is a LIKE wildcard, so it is escaped to match the prefix literally
const LIST_TABLES_SQL: &str = r"SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite\_%' ESCAPE '\'";

const TABLE_COLUMNS_SQL: &str =
    r#"SELECT cid, name, type, "notnull", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid"#;

/// Read access to a relational database
#[async_trait]
pub trait Database: Send + Sync {
    /// Names of every user table, in the order the database reports them
    async fn list_tables(&self) -> ContextResult<Vec<String>>;

    /// Column definitions for `table` in ordinal order
    ///
    /// An unknown table yields an empty list rather than an error.
    async fn table_columns(&self, table: &str) -> ContextResult<Vec<Column>>;

    /// Run a single statement and collect its rows
    ///
    /// With `read_only` set, a statement that would modify the database is
    /// rejected with [`ContextError::WritesDisabled`] before it runs.
    async fn execute(&self, sql: &str, read_only: bool) -> ContextResult<QueryResult>;
}

/// SQLite-backed [`Database`]
#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    /// Open the database file at `path`
    pub fn open(path: &Path, busy_timeout: Duration) -> ContextResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;

        tracing::debug!(path = %path.display(), "Opened SQLite database");

        Ok(Self::from_connection(conn))
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn list_tables(&self) -> ContextResult<Vec<String>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(LIST_TABLES_SQL)?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tables)
    }

    async fn table_columns(&self, table: &str) -> ContextResult<Vec<Column>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(TABLE_COLUMNS_SQL)?;
        let columns = stmt
            .query_map([table], |row| {
                Ok(Column {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    declared_type: row.get(2)?,
                    notnull: row.get::<_, i64>(3)? != 0,
                    dflt_value: row.get(4)?,
                    pk: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(columns)
    }

    async fn execute(&self, sql: &str, read_only: bool) -> ContextResult<QueryResult> {
        let conn = self.conn.lock().await;

        // Anything after the first statement must be whitespace or comments
        let mut batch = Batch::new(&conn, sql);
        let Some(mut stmt) = batch.next()? else {
            return Err(ContextError::InvalidArgument("query is empty".to_string()));
        };
        if batch.next()?.is_some() {
            return Err(ContextError::MultipleStatements);
        }

        if read_only && !stmt.readonly() {
            return Err(ContextError::WritesDisabled);
        }

        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows: Vec<Vec<serde_json::Value>> = stmt
            .query_map([], |row| {
                let mut values = Vec::with_capacity(columns.len());
                for i in 0..columns.len() {
                    values.push(to_json(row.get(i)?));
                }
                Ok(values)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QueryResult {
            row_count: rows.len(),
            columns,
            rows,
        })
    }
}

fn to_json(value: SqlValue) -> serde_json::Value {
    match value {
        SqlValue::Null => serde_json::Value::Null,
        SqlValue::Integer(i) => serde_json::json!(i),
        SqlValue::Real(f) => serde_json::json!(f),
        SqlValue::Text(s) => serde_json::Value::String(s),
        SqlValue::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
    }
}
