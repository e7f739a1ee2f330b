//! Database module
//!
//! This module provides all database functionality of appdb, organized into:
//!
//! - **core**: SQLite connection wrapper and the reserved properties table
//! - **handle**: `DatabaseHandle`, the create/open/close entry point for callers
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # SQLite DatabaseConn wrapper
//! │   └── schema      # properties table and compatibility check
//! │
//! └── handle          # DatabaseHandle lifecycle
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use appdb::database::{DatabaseHandle, Properties};
//!
//! let mut expected = Properties::new();
//! expected.insert("applicationName".to_string(), "ledger".to_string());
//! expected.insert("databaseVersion".to_string(), "1".to_string());
//!
//! // Stamp a new file
//! let mut db = DatabaseHandle::new("ledger.sqlite3", expected.clone());
//! db.create_new("CREATE TABLE entries (id INTEGER PRIMARY KEY, amount INTEGER);")?;
//! db.close();
//!
//! // Reattach later; foreign or outdated files are refused
//! let mut db = DatabaseHandle::new("ledger.sqlite3", expected);
//! db.open()?;
//! let conn = db.connection().expect("open handle has a connection");
//! ```

pub mod core;
mod handle;

pub use self::core::{
    CompatibilityStatus, DatabaseConn, Properties, PropertiesTable, SchemaDefinitions,
};
pub use handle::{DatabaseHandle, HandleState};

/// Ensure the directory holding a database file exists
pub fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))
}
