//! Core database infrastructure
//!
//! This module provides the foundational database components used by handles:
//! - `DatabaseConn`: SQLite connection wrapper with explicit create/open-existing entry points
//! - `PropertiesTable`: Reserved properties table and the compatibility check
//! - `CompatibilityStatus`: Outcome of the compatibility check

mod connection;
mod schema;

pub use connection::DatabaseConn;
pub use schema::{CompatibilityStatus, Properties, PropertiesTable, SchemaDefinitions};
