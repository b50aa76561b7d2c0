//! SQLite implementation using rusqlite (synchronous).

use crate::index::*;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// Table and column layout used by the game's `meta` file:
/// table `a`, `h` = bundle name, `n` = logical path.
const QUERY_SQL: &str = "SELECT h, n FROM a WHERE n LIKE ?1 LIMIT ?2";

/// SQLite-backed metadata index
pub struct SqliteMeta {
    conn: Connection,
}

impl From<rusqlite::Error> for MetaError {
    fn from(e: rusqlite::Error) -> Self {
        MetaError::Database(e.to_string())
    }
}

impl SqliteMeta {
    /// Open an existing metadata file read-only
    pub fn open<P: AsRef<Path>>(path: P) -> MetaResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MetaError::NotFound(path.display().to_string()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        tracing::debug!(path = %path.display(), "opened metadata index");
        Ok(Self { conn })
    }

    /// Open an empty in-memory index with the game's schema (for testing)
    pub fn open_in_memory() -> MetaResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("CREATE TABLE a (h TEXT NOT NULL, n TEXT NOT NULL);")?;
        Ok(Self { conn })
    }

    /// Add a record. Only meaningful for in-memory indexes.
    pub fn insert(&self, record: &AssetRecord) -> MetaResult<()> {
        self.conn.execute(
            "INSERT INTO a (h, n) VALUES (?1, ?2)",
            params![record.bundle, record.path],
        )?;
        Ok(())
    }
}

impl MetaIndex for SqliteMeta {
    fn query(&self, pattern: &str, limit: Option<u32>) -> MetaResult<Vec<AssetRecord>> {
        let limit = limit.map_or(-1, i64::from);
        let mut stmt = self.conn.prepare(QUERY_SQL)?;
        let rows = stmt.query_map(params![pattern, limit], |row| {
            Ok(AssetRecord {
                bundle: row.get(0)?,
                path: row.get(1)?,
            })
        })?;

        let records = rows.collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(pattern, count = records.len(), "metadata query");
        Ok(records)
    }
}
