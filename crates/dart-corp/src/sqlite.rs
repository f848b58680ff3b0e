//! SQLite-based directory implementation.

use async_trait::async_trait;
use dart_core::{CorpDirectory, CorpInfo, DataError, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, instrument};

const SELECT_COLUMNS: &str = "corp_code, corp_name, corp_eng_name, stock_code, modify_date";

/// SQLite-backed corporation directory.
///
/// Stores the seeded corp-code list in a database file so that lookups do
/// not require re-parsing `CORPCODE.xml`. Search hits come back in seeding
/// order.
#[derive(Debug)]
pub struct SqliteDirectory {
    conn: Mutex<Connection>,
}

fn store_err(e: impl std::fmt::Display) -> DataError {
    DataError::Store(e.to_string())
}

impl SqliteDirectory {
    /// Open (or create) a directory database at the given path.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(store_err)?;
        }
        let conn = Connection::open(path).map_err(store_err)?;
        let directory = Self {
            conn: Mutex::new(conn),
        };
        directory.initialize_schema()?;
        Ok(directory)
    }

    /// Create an in-memory SQLite directory.
    ///
    /// Useful for testing; data is lost when the directory is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        let directory = Self {
            conn: Mutex::new(conn),
        };
        directory.initialize_schema()?;
        Ok(directory)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(store_err)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS corp_codes (
                corp_code TEXT NOT NULL UNIQUE,
                corp_name TEXT NOT NULL,
                corp_eng_name TEXT NOT NULL DEFAULT '',
                stock_code TEXT NOT NULL DEFAULT '',
                modify_date TEXT NOT NULL DEFAULT ''
            )",
            [],
        )
        .map_err(store_err)?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_corp_codes_name ON corp_codes(corp_name)",
            [],
        )
        .map_err(store_err)?;

        debug!("SQLite directory schema initialized");
        Ok(())
    }

    fn row_to_info(row: &Row<'_>) -> rusqlite::Result<CorpInfo> {
        Ok(CorpInfo {
            corp_code: row.get(0)?,
            corp_name: row.get(1)?,
            corp_eng_name: row.get(2)?,
            stock_code: row.get(3)?,
            modify_date: row.get(4)?,
        })
    }
}

/// Escapes `LIKE` wildcards so the query is matched literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl CorpDirectory for SqliteDirectory {
    #[instrument(skip(self))]
    async fn find_by_code(&self, corp_code: &str) -> Result<Option<CorpInfo>> {
        let conn = self.conn.lock().map_err(store_err)?;
        let found = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM corp_codes WHERE corp_code = ?1"),
                params![corp_code],
                Self::row_to_info,
            )
            .optional()
            .map_err(store_err)?;
        debug!(found = found.is_some(), "Directory lookup");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CorpInfo>> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().map_err(store_err)?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM corp_codes
                 WHERE corp_name LIKE ?1 ESCAPE '\\' OR corp_eng_name LIKE ?1 ESCAPE '\\'
                 ORDER BY rowid
                 LIMIT ?2"
            ))
            .map_err(store_err)?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let hits = stmt
            .query_map(params![like_pattern(query), limit], Self::row_to_info)
            .map_err(store_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err)?;

        debug!(hits = hits.len(), "Directory search");
        Ok(hits)
    }

    #[instrument(skip(self, entries), fields(count = entries.len()))]
    async fn replace_all(&self, entries: &[CorpInfo]) -> Result<usize> {
        let mut conn = self.conn.lock().map_err(store_err)?;
        let tx = conn.transaction().map_err(store_err)?;

        tx.execute("DELETE FROM corp_codes", []).map_err(store_err)?;
        {
            let mut insert = tx
                .prepare(
                    "INSERT OR REPLACE INTO corp_codes
                     (corp_code, corp_name, corp_eng_name, stock_code, modify_date)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(store_err)?;

            for entry in entries.iter().filter(|e| !e.corp_code.is_empty()) {
                insert
                    .execute(params![
                        entry.corp_code,
                        entry.corp_name,
                        entry.corp_eng_name,
                        entry.stock_code,
                        entry.modify_date,
                    ])
                    .map_err(store_err)?;
            }
        }

        let stored: i64 = tx
            .query_row("SELECT COUNT(*) FROM corp_codes", [], |row| row.get(0))
            .map_err(store_err)?;
        tx.commit().map_err(store_err)?;

        debug!(stored, "Directory replaced");
        usize::try_from(stored).map_err(store_err)
    }

    async fn len(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(store_err)?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM corp_codes", [], |row| row.get(0))
            .map_err(store_err)?;
        usize::try_from(count).map_err(store_err)
    }
}
