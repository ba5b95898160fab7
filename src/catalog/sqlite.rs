use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, info};

use crate::catalog::SchemaIntrospector;
use crate::error::{LitepgError, LitepgResult};
use crate::types::{ColumnDescriptor, IndexDescriptor, TableDescriptor, ViewDescriptor};

const TABLE_NAMES_SQL: &str = r#"
SELECT name FROM sqlite_master
WHERE type = 'table' AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
ORDER BY name
"#;

const TABLE_SQL_SQL: &str = "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1";

const TABLE_COLUMNS_SQL: &str = r#"
SELECT cid, name, CAST(type AS TEXT), "notnull", CAST(dflt_value AS TEXT), pk
FROM pragma_table_info(?1)
ORDER BY cid
"#;

const VIEWS_SQL: &str = r#"
SELECT name, sql FROM sqlite_master
WHERE type = 'view' AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
ORDER BY name
"#;

// automatic indexes have no stored text and are named sqlite_autoindex_*
const INDEXES_SQL: &str = r#"
SELECT name, sql FROM sqlite_master
WHERE type = 'index' AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
ORDER BY name
"#;

type ColumnRow = (i64, String, String, i64, Option<String>, i64);

/// Introspects a SQLite database file through a read-only connection
pub struct SqliteIntrospector {
    path: PathBuf,
    conn: SqliteConnection,
}

impl SqliteIntrospector {
    /// Open the database file read-only. The file is never created.
    pub async fn open(path: impl AsRef<Path>) -> LitepgResult<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(LitepgError::connectivity(format!(
                "SQLite database not found: {}",
                path.display()
            )));
        }

        let conn = SqliteConnectOptions::new()
            .filename(&path)
            .read_only(true)
            .create_if_missing(false)
            .disable_statement_logging()
            .connect()
            .await
            .map_err(|e| {
                LitepgError::connectivity(format!("cannot open {}: {}", path.display(), e))
            })?;

        info!(path = %path.display(), "Opened source catalog");
        Ok(Self { path, conn })
    }
}

impl SchemaIntrospector for SqliteIntrospector {
    async fn table_names(&mut self) -> LitepgResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(TABLE_NAMES_SQL)
            .fetch_all(&mut self.conn)
            .await?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn describe_table(&mut self, name: &str) -> LitepgResult<TableDescriptor> {
        let table_sql: Option<(Option<String>,)> = sqlx::query_as(TABLE_SQL_SQL)
            .bind(name)
            .fetch_optional(&mut self.conn)
            .await?;

        let Some((table_sql,)) = table_sql else {
            return Err(LitepgError::emission(
                format!("table {}", name),
                "not found in source catalog",
            ));
        };

        let rows: Vec<ColumnRow> = sqlx::query_as(TABLE_COLUMNS_SQL)
            .bind(name)
            .fetch_all(&mut self.conn)
            .await?;

        let without_rowid = table_sql.as_deref().map(is_without_rowid).unwrap_or(false);
        let table = build_table_descriptor(name, rows, without_rowid);

        debug!(
            table = name,
            columns = table.columns.len(),
            without_rowid = without_rowid,
            "Described table"
        );
        Ok(table)
    }

    async fn views(&mut self) -> LitepgResult<Vec<ViewDescriptor>> {
        let rows: Vec<(String, Option<String>)> = sqlx::query_as(VIEWS_SQL)
            .fetch_all(&mut self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, definition)| ViewDescriptor { name, definition })
            .collect())
    }

    async fn indexes(&mut self) -> LitepgResult<Vec<IndexDescriptor>> {
        let rows: Vec<(String, Option<String>)> = sqlx::query_as(INDEXES_SQL)
            .fetch_all(&mut self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, definition)| IndexDescriptor { name, definition })
            .collect())
    }

    async fn close(self) -> LitepgResult<()> {
        debug!(path = %self.path.display(), "Closing source catalog");
        self.conn.close().await?;
        Ok(())
    }
}

/// Turn `pragma_table_info` rows into a descriptor, flagging the row id alias
fn build_table_descriptor(name: &str, rows: Vec<ColumnRow>, without_rowid: bool) -> TableDescriptor {
    let pk_count = rows.iter().filter(|row| row.5 > 0).count();

    let mut table = TableDescriptor::new(name);
    table.without_rowid = without_rowid;

    for (_cid, column_name, declared_type, not_null, default_value, pk) in rows {
        let primary_key_position = u32::try_from(pk).ok().filter(|p| *p > 0);
        let rowid_alias = primary_key_position.is_some()
            && pk_count == 1
            && !without_rowid
            && declared_type.trim().eq_ignore_ascii_case("INTEGER");

        table.add_column(ColumnDescriptor {
            name: column_name,
            source_type: declared_type,
            nullable: not_null == 0,
            default_value,
            primary_key_position,
            rowid_alias,
        });
    }

    table
}

/// Table options follow the closing parenthesis of the column list
fn is_without_rowid(table_sql: &str) -> bool {
    let options = match table_sql.rfind(')') {
        Some(end) => &table_sql[end + 1..],
        None => return false,
    };

    options.split(',').any(|option| {
        let words: Vec<&str> = option.split_whitespace().collect();
        words.len() == 2
            && words[0].eq_ignore_ascii_case("WITHOUT")
            && words[1].trim_end_matches(';').eq_ignore_ascii_case("ROWID")
    })
}
