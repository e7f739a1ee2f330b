#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! appdb - property-stamped SQLite application databases
//!
//! appdb opens, creates, and validates single-file SQLite databases that belong to
//! one application. Every file is stamped at creation with a fixed set of key/value
//! properties (for example an application name and a database version) kept in a
//! reserved `properties` table. Reopening a file compares that table with the
//! properties the caller expects, so foreign or incompatible files are refused
//! before any application SQL runs against them.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (always) | Database handle, config loading | `rusqlite`, `config` |
//! | `cli` | `appdb` command-line tool | `clap`, `tabled`, `tracing-subscriber` |
//!
//! ```toml
//! # Library only
//! appdb = { version = "0.1", default-features = false }
//! ```
//!
//! # Architecture
//!
//! - **[`database`]**: SQLite connection wrapper, properties table, [`DatabaseHandle`]
//! - **[`config`]**: Configuration management
//! - **[`error`]**: [`HandleError`] and its [`ErrorKind`]
//! - **[`utils`]**: Output formatting for the command-line tool
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use appdb::{DatabaseHandle, ErrorKind, Properties};
//!
//! let expected: Properties = [
//!     ("applicationName".to_string(), "ledger".to_string()),
//!     ("databaseVersion".to_string(), "1".to_string()),
//! ]
//! .into_iter()
//! .collect();
//!
//! let mut db = DatabaseHandle::new("ledger.sqlite3", expected);
//! match db.open() {
//!     Ok(()) => {}
//!     Err(e) if e.kind() == ErrorKind::FileNotExists => {
//!         db.create_new("CREATE TABLE entries (id INTEGER PRIMARY KEY, amount INTEGER);")?;
//!     }
//!     Err(e) => return Err(e.into()),
//! }
//!
//! if let Some(conn) = db.connection() {
//!     conn.execute("INSERT INTO entries (amount) VALUES (?1)", [42])?;
//! }
//! db.close();
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod utils;

// =============================================================================
// Configuration
// =============================================================================

pub use config::{format_size, get_database_file_info, AppDbConfig, DatabaseFileInfo};

// =============================================================================
// Database Module
// =============================================================================

pub use database::{
    CompatibilityStatus, DatabaseConn, DatabaseHandle, HandleState, Properties, PropertiesTable,
    SchemaDefinitions,
};

// =============================================================================
// Errors and utilities
// =============================================================================

pub use error::{ErrorKind, HandleError};
pub use utils::OutputFormat;
