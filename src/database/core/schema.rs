//! Reserved properties table
//!
//! Every application database carries a `properties` table of key/value strings
//! written once at creation. Reopening a file compares that table against the
//! properties the caller expects.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::fmt;

/// Expected or stored properties, keyed by property name
pub type Properties = BTreeMap<String, String>;

/// SQL for the reserved properties table
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    pub const PROPERTIES_TABLE_NAME: &'static str = "properties";

    /// SQL for creating the properties table
    ///
    /// The column layout is part of the file format and must not change.
    pub const PROPERTIES_TABLE: &'static str = "CREATE TABLE properties (key TEXT, value TEXT);";

    pub const INSERT_PROPERTY: &'static str = "INSERT INTO properties VALUES (?1, ?2)";

    pub const SELECT_PROPERTIES: &'static str = "SELECT key, value FROM properties";
}

/// Reader and writer for the properties table on a single connection
pub struct PropertiesTable<'a> {
    conn: &'a Connection,
}

impl<'a> PropertiesTable<'a> {
    /// Create a new properties table accessor for the given connection
    ///
    /// Pass a transaction (it derefs to `Connection`) to have writes join it.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create the properties table
    pub fn create(&self) -> Result<()> {
        self.conn
            .execute_batch(SchemaDefinitions::PROPERTIES_TABLE)
            .map_err(|e| anyhow!("Failed to create properties table: {}", e))
    }

    /// Insert one row per property
    pub fn insert_all(&self, properties: &Properties) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare(SchemaDefinitions::INSERT_PROPERTY)
            .map_err(|e| anyhow!("Failed to prepare property insert: {}", e))?;

        for (key, value) in properties {
            stmt.execute([key, value])
                .map_err(|e| anyhow!("Failed to insert property '{}': {}", key, e))?;
        }

        Ok(())
    }

    /// Read every stored row, in table order
    ///
    /// Duplicate keys are kept as separate rows.
    pub fn read_all(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare(SchemaDefinitions::SELECT_PROPERTIES)
            .map_err(|e| anyhow!("Failed to query properties: {}", e))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| anyhow!("Failed to query properties: {}", e))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow!("Failed to read property row: {}", e))
    }

    /// Compare the stored rows with the expected properties
    ///
    /// A row whose key is expected with a non-empty value must carry that value.
    /// Expected keys with an empty value accept anything. After the scan only the
    /// number of rows is compared against the number of expected entries, so the
    /// key sets themselves are never matched up.
    pub fn check(&self, expected: &Properties) -> CompatibilityStatus {
        let mut stmt = match self.conn.prepare(SchemaDefinitions::SELECT_PROPERTIES) {
            Ok(stmt) => stmt,
            Err(e) => return CompatibilityStatus::Unreadable(e.to_string()),
        };
        let mut rows = match stmt.query([]) {
            Ok(rows) => rows,
            Err(e) => return CompatibilityStatus::Unreadable(e.to_string()),
        };

        let mut stored = 0usize;
        loop {
            let row = match rows.next() {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(e) => return CompatibilityStatus::Unreadable(e.to_string()),
            };
            let (key, value) = match (row.get::<_, String>(0), row.get::<_, String>(1)) {
                (Ok(key), Ok(value)) => (key, value),
                (Err(e), _) | (_, Err(e)) => {
                    return CompatibilityStatus::Unreadable(e.to_string());
                }
            };

            if let Some(want) = expected.get(&key) {
                if !want.is_empty() && *want != value {
                    return CompatibilityStatus::ValueMismatch {
                        key,
                        expected: want.clone(),
                        found: value,
                    };
                }
            }
            stored += 1;
        }

        if stored != expected.len() {
            return CompatibilityStatus::CountMismatch {
                stored,
                expected: expected.len(),
            };
        }

        CompatibilityStatus::Compatible
    }
}

/// Outcome of comparing a file's properties table with the expected properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompatibilityStatus {
    /// File belongs to the application
    Compatible,

    /// Properties table is missing or a row could not be read
    Unreadable(String),

    /// A stored value differs from a non-empty expected value
    ValueMismatch {
        key: String,
        expected: String,
        found: String,
    },

    /// Number of stored rows differs from the number of expected properties
    CountMismatch { stored: usize, expected: usize },
}

impl CompatibilityStatus {
    pub fn is_compatible(&self) -> bool {
        matches!(self, CompatibilityStatus::Compatible)
    }
}

impl fmt::Display for CompatibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatibilityStatus::Compatible => write!(f, "compatible"),
            CompatibilityStatus::Unreadable(reason) => {
                write!(f, "properties table unreadable: {}", reason)
            }
            CompatibilityStatus::ValueMismatch {
                key,
                expected,
                found,
            } => write!(
                f,
                "property '{}' is '{}', expected '{}'",
                key, found, expected
            ),
            CompatibilityStatus::CountMismatch { stored, expected } => write!(
                f,
                "stored {} properties, expected {}",
                stored, expected
            ),
        }
    }
}
