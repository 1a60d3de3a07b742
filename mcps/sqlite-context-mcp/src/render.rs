//! Schema rendering
//!
//! Turns column metadata into fenced `CREATE TABLE` SQL. A selector names
//! either one table or, via [`ALL_TABLES`], every user table. Output is a
//! pure function of the database state: tables keep the order the database
//! lists them in and columns keep their ordinal order.

use futures_util::future::try_join_all;
use std::fmt;
use std::str::FromStr;

use crate::database::Database;
use crate::error::{ContextError, ContextResult};
use crate::types::Column;

/// Reserved selector value meaning "every user table"
pub const ALL_TABLES: &str = "all-tables";

const FENCE_OPEN: &str = "```sql\n";
const FENCE_CLOSE: &str = "```";

/// Which tables a schema render covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSelector {
    AllTables,
    Table(String),
}

impl FromStr for SchemaSelector {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(ContextError::InvalidArgument(
                "table name must not be empty".to_string(),
            )),
            ALL_TABLES => Ok(Self::AllTables),
            table => Ok(Self::Table(table.to_string())),
        }
    }
}

impl fmt::Display for SchemaSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllTables => f.write_str(ALL_TABLES),
            Self::Table(name) => f.write_str(name),
        }
    }
}

/// Render the schema for `selector` as a fenced SQL block
pub async fn render_schema(db: &dyn Database, selector: &SchemaSelector) -> ContextResult<String> {
    match selector {
        SchemaSelector::AllTables => {
            let tables = db.list_tables().await?;

            // try_join_all yields results in input order, not completion order
            let columns = try_join_all(tables.iter().map(|t| db.table_columns(t))).await?;

            let mut sql = String::from(FENCE_OPEN);
            for (table, columns) in tables.iter().zip(&columns) {
                sql.push_str(&create_table_statement(table, columns));
                sql.push('\n');
            }
            sql.push_str(FENCE_CLOSE);
            Ok(sql)
        }
        SchemaSelector::Table(table) => {
            let columns = db.table_columns(table).await?;

            let mut sql = String::from(FENCE_OPEN);
            sql.push_str(&create_table_statement(table, &columns));
            sql.push_str(FENCE_CLOSE);
            Ok(sql)
        }
    }
}

/// A single `CREATE TABLE` statement, terminated by `;` and a newline
pub fn create_table_statement(table: &str, columns: &[Column]) -> String {
    let body = columns
        .iter()
        .map(column_definition)
        .collect::<Vec<_>>()
        .join(",\n");

    format!("CREATE TABLE \"{}\" (\n{}\n);\n", table, body)
}

fn column_definition(column: &Column) -> String {
    let mut def = format!("  \"{}\" {}", column.name, column.declared_type);
    if column.notnull {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = &column.dflt_value {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }
    def
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteDatabase;
    use crate::types::QueryResult;
    use async_trait::async_trait;
    use rusqlite::Connection;

    fn test_db(schema: &str) -> SqliteDatabase {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(schema).unwrap();
        SqliteDatabase::from_connection(conn)
    }

    fn column(cid: i64, name: &str, ty: &str, notnull: bool, default: Option<&str>) -> Column {
        Column {
            cid,
            name: name.to_string(),
            declared_type: ty.to_string(),
            notnull,
            dflt_value: default.map(str::to_string),
            pk: 0,
        }
    }

    const USERS: &str = "CREATE TABLE users (id INTEGER NOT NULL, name TEXT DEFAULT 'anon');";

    #[test]
    fn test_selector_parsing() {
        assert_eq!("all-tables".parse::<SchemaSelector>().unwrap(), SchemaSelector::AllTables);
        assert_eq!(
            "users".parse::<SchemaSelector>().unwrap(),
            SchemaSelector::Table("users".to_string())
        );
        assert!(matches!(
            "".parse::<SchemaSelector>(),
            Err(ContextError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_column_clauses() {
        assert_eq!(
            column_definition(&column(0, "a", "TEXT", false, None)),
            "  \"a\" TEXT"
        );
        assert_eq!(
            column_definition(&column(0, "a", "TEXT", true, None)),
            "  \"a\" TEXT NOT NULL"
        );
        assert_eq!(
            column_definition(&column(0, "a", "INT", true, Some("0"))),
            "  \"a\" INT NOT NULL DEFAULT 0"
        );
        assert_eq!(
            column_definition(&column(0, "ts", "TEXT", false, Some("CURRENT_TIMESTAMP"))),
            "  \"ts\" TEXT DEFAULT CURRENT_TIMESTAMP"
        );
    }

    #[tokio::test]
    async fn test_render_single_table() {
        let db = test_db(USERS);
        let sql = render_schema(&db, &SchemaSelector::Table("users".to_string()))
            .await
            .unwrap();

        assert_eq!(
            sql,
            "```sql\n\
             CREATE TABLE \"users\" (\n  \"id\" INTEGER NOT NULL,\n  \"name\" TEXT DEFAULT 'anon'\n);\n\
             ```"
        );
    }

    #[tokio::test]
    async fn test_render_all_tables_in_listing_order() {
        let db = test_db(
            "CREATE TABLE zebra (z TEXT);
             CREATE TABLE apple (a INTEGER NOT NULL);
             CREATE TABLE counters (id INTEGER PRIMARY KEY AUTOINCREMENT);",
        );

        let sql = render_schema(&db, &SchemaSelector::AllTables).await.unwrap();

        assert_eq!(sql.matches("```").count(), 2);
        assert!(sql.starts_with("```sql\n"));
        assert!(sql.ends_with("```"));
        assert_eq!(sql.matches("CREATE TABLE").count(), 3);
        assert!(!sql.contains("sqlite_sequence"));

        let zebra = sql.find("CREATE TABLE \"zebra\"").unwrap();
        let apple = sql.find("CREATE TABLE \"apple\"").unwrap();
        let counters = sql.find("CREATE TABLE \"counters\"").unwrap();
        assert!(zebra < apple && apple < counters);

        assert!(sql.contains(");\n\nCREATE TABLE \"apple\""));
    }

    #[tokio::test]
    async fn test_render_all_tables_empty_database() {
        let db = test_db("");
        let sql = render_schema(&db, &SchemaSelector::AllTables).await.unwrap();
        assert_eq!(sql, "```sql\n```");
    }

    // Boundary case: an unknown table renders an empty body instead of
    // reporting "not found". Pinned here so a change is deliberate.
    #[tokio::test]
    async fn test_render_unknown_table_has_empty_body() {
        let db = test_db(USERS);
        let sql = render_schema(&db, &SchemaSelector::Table("ghost".to_string()))
            .await
            .unwrap();
        assert_eq!(sql, "```sql\nCREATE TABLE \"ghost\" (\n\n);\n```");
    }

    /// Lists two tables but fails to describe the second
    struct FlakyDatabase;

    #[async_trait]
    impl Database for FlakyDatabase {
        async fn list_tables(&self) -> ContextResult<Vec<String>> {
            Ok(vec!["good".to_string(), "broken".to_string()])
        }

        async fn table_columns(&self, table: &str) -> ContextResult<Vec<Column>> {
            match table {
                "good" => Ok(vec![column(0, "id", "INTEGER", false, None)]),
                _ => Err(ContextError::DatabaseQueryFailed(
                    rusqlite::Error::InvalidQuery,
                )),
            }
        }

        async fn execute(&self, _sql: &str, _read_only: bool) -> ContextResult<QueryResult> {
            unreachable!("not used by the renderer")
        }
    }

    #[tokio::test]
    async fn test_render_all_tables_fails_as_a_whole() {
        let err = render_schema(&FlakyDatabase, &SchemaSelector::AllTables)
            .await
            .unwrap_err();
        assert!(matches!(err, ContextError::DatabaseQueryFailed(_)));
    }
}
