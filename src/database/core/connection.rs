//! Database connection management
//!
//! This module provides the SQLite connection wrapper used by database handles.

use anyhow::{anyhow, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// How long a statement waits on a locked file before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Core database connection wrapper
///
/// `DatabaseConn` keeps creation and opening apart: [`DatabaseConn::open_existing`]
/// never creates a file, so a missing file cannot be silently turned into an
/// empty database.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open (and create if needed) a database file for reading and writing
    pub fn create(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| anyhow!("Failed to create database at '{}': {}", path.display(), e))?;

        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Open an existing database file for reading and writing
    pub fn open_existing(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| anyhow!("Failed to open database at '{}': {}", path.display(), e))?;

        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| anyhow!("Failed to create in-memory database: {}", e))?;

        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Configure the connection
    ///
    /// Nothing here may read the file: a foreign file must still open, so that
    /// the properties check is what rejects it.
    fn configure(&self) -> Result<()> {
        self.conn
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| anyhow!("Failed to set busy timeout: {}", e))?;

        Ok(())
    }

    /// Begin an unchecked transaction
    ///
    /// Dropping the returned transaction without committing rolls it back.
    pub fn transaction(&self) -> Result<rusqlite::Transaction<'_>> {
        self.conn
            .unchecked_transaction()
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table_name],
                |row| row.get(0),
            )
            .map_err(|e| anyhow!("Failed to check table existence: {}", e))?;
        Ok(count > 0)
    }

    /// Get the row count for a table
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM \"{}\"", table_name.replace('"', "\"\""));
        let count: u64 = self
            .conn
            .query_row(&query, [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get table count: {}", e))?;
        Ok(count)
    }

    /// Close the connection, reporting any error from the engine
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| anyhow!("Failed to close database: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.conn.execute_batch("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_table_count() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.conn.execute_batch("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();
        db.conn.execute_batch("INSERT INTO test_table (id) VALUES (1), (2), (3)")
            .unwrap();

        assert_eq!(db.table_count("test_table").unwrap(), 3);
    }

    #[test]
    fn test_open_existing_does_not_create() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.sqlite3");

        assert!(DatabaseConn::open_existing(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_create_then_open_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.sqlite3");

        let db = DatabaseConn::create(&path).unwrap();
        db.conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
        db.close().unwrap();

        let db = DatabaseConn::open_existing(&path).unwrap();
        assert!(db.table_exists("t").unwrap());
    }

    #[test]
    fn test_transaction_rollback_on_drop() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
        {
            let tx = db.transaction().unwrap();
            tx.execute("INSERT INTO t (id) VALUES (1)", []).unwrap();
        }
        assert_eq!(db.table_count("t").unwrap(), 0);
    }
}
