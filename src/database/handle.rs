//! Property-stamped database handle
//!
//! A [`DatabaseHandle`] owns the path of one application database file, the
//! properties that file is expected to carry, and (while open) the connection to it.
//!
//! ```text
//! Unopened --create_new / open--> Open --close--> Closed
//!                                   ^               |
//!                                   +--create_new---+
//!                                      / open
//! ```
//!
//! A failed `create_new` or `open` never leaves a connection behind.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::database::core::{DatabaseConn, Properties, PropertiesTable};
use crate::error::HandleError;

/// Side files SQLite may leave next to a database file
const SIDE_FILE_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// Lifecycle state of a [`DatabaseHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Constructed, no connection made yet
    Unopened,
    /// Connection is live and the file passed validation
    Open,
    /// Released by [`DatabaseHandle::close`]
    Closed,
}

/// Handle to a single application database file
///
/// The handle is created without touching the filesystem. [`DatabaseHandle::create_new`]
/// stamps a fresh file with the expected properties, [`DatabaseHandle::open`] reattaches to
/// an existing one and refuses files whose properties table does not match.
pub struct DatabaseHandle {
    path: PathBuf,
    expected: Properties,
    db: Option<DatabaseConn>,
    state: HandleState,
}

impl DatabaseHandle {
    /// Create a new handle for the given path and expected properties
    pub fn new(path: impl AsRef<Path>, expected: Properties) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            expected,
            db: None,
            state: HandleState::Unopened,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn expected_properties(&self) -> &Properties {
        &self.expected
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == HandleState::Open
    }

    /// The live connection, if the handle is open
    pub fn connection(&self) -> Option<&Connection> {
        self.db.as_ref().map(|db| &db.conn)
    }

    /// Create a new database file
    ///
    /// The properties table, the given schema statements and one row per expected
    /// property are written in a single transaction. If any of it fails the file is
    /// removed again and [`HandleError::FileCannotBeCreated`] is returned.
    pub fn create_new(&mut self, schema: &str) -> Result<(), HandleError> {
        self.release();

        if self.path.as_os_str().is_empty() {
            return Err(HandleError::FileCannotBeCreated {
                path: self.path.clone(),
                reason: "no path set".to_string(),
            });
        }

        // Anything other than a definite "not found" counts as present.
        if !matches!(self.path.try_exists(), Ok(false)) {
            return Err(HandleError::FileAlreadyExists {
                path: self.path.clone(),
            });
        }

        let db = match DatabaseConn::create(&self.path) {
            Ok(db) => db,
            Err(e) => {
                self.remove_partial_file();
                return Err(HandleError::FileCannotBeCreated {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if let Err(e) = Self::populate(&db, schema, &self.expected) {
            drop(db);
            self.remove_partial_file();
            return Err(HandleError::FileCannotBeCreated {
                path: self.path.clone(),
                reason: e.to_string(),
            });
        }

        info!(
            "Created database {} with {} properties",
            self.path.display(),
            self.expected.len()
        );
        self.db = Some(db);
        self.state = HandleState::Open;
        Ok(())
    }

    /// Write the properties table, schema and property rows in one transaction
    fn populate(db: &DatabaseConn, schema: &str, expected: &Properties) -> anyhow::Result<()> {
        let tx = db.transaction()?;
        let table = PropertiesTable::new(&tx);

        table.create()?;
        debug!("Executing schema statements");
        tx.execute_batch(schema)
            .map_err(|e| anyhow::anyhow!("Failed to execute schema: {}", e))?;
        table.insert_all(expected)?;

        tx.commit()
            .map_err(|e| anyhow::anyhow!("Failed to commit transaction: {}", e))
    }

    /// Open an existing database file and validate its properties
    ///
    /// A file that fails validation is closed again right away; the handle stays
    /// without a connection.
    pub fn open(&mut self) -> Result<(), HandleError> {
        self.release();

        if self.path.as_os_str().is_empty() || matches!(self.path.try_exists(), Ok(false)) {
            return Err(HandleError::FileNotExists {
                path: self.path.clone(),
            });
        }

        let db =
            DatabaseConn::open_existing(&self.path).map_err(|e| HandleError::FileCannotBeOpen {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        let status = PropertiesTable::new(&db.conn).check(&self.expected);
        if !status.is_compatible() {
            warn!("Rejected database {}: {}", self.path.display(), status);
            if let Err(e) = db.close() {
                warn!("{}", e);
            }
            return Err(HandleError::FileNotValidAppDatabase {
                path: self.path.clone(),
                reason: status.to_string(),
            });
        }

        info!("Opened database {}", self.path.display());
        self.db = Some(db);
        self.state = HandleState::Open;
        Ok(())
    }

    /// Read back the stored properties of an open database
    ///
    /// If a key is stored more than once, the last row wins.
    pub fn stored_properties(&self) -> Result<Properties, HandleError> {
        let db = self
            .db
            .as_ref()
            .ok_or_else(|| HandleError::FileCannotBeOpen {
                path: self.path.clone(),
                reason: "handle is not open".to_string(),
            })?;

        let rows = PropertiesTable::new(&db.conn).read_all().map_err(|e| {
            HandleError::FileNotValidAppDatabase {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(rows.into_iter().collect())
    }

    /// Release the connection and forget the path and expected properties
    ///
    /// Calling this on a handle without a connection only resets the fields.
    pub fn close(&mut self) {
        self.release();
        self.path = PathBuf::new();
        self.expected = Properties::new();
        self.state = HandleState::Closed;
    }

    /// Drop the live connection, if any
    fn release(&mut self) {
        if let Some(db) = self.db.take() {
            debug!("Closing connection to {}", self.path.display());
            if let Err(e) = db.close() {
                warn!("{}", e);
            }
            self.state = HandleState::Closed;
        }
    }

    /// Best-effort removal of a half-created database file
    fn remove_partial_file(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(
                    "Failed to remove partial database {}: {}",
                    self.path.display(),
                    e
                );
            }
        }

        for suffix in SIDE_FILE_SUFFIXES {
            let mut side = self.path.clone().into_os_string();
            side.push(suffix);
            let side = PathBuf::from(side);
            if side.exists() {
                if let Err(e) = fs::remove_file(&side) {
                    warn!("Failed to remove {}: {}", side.display(), e);
                }
            }
        }
    }
}

impl std::fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseHandle")
            .field("path", &self.path)
            .field("expected", &self.expected)
            .field("state", &self.state)
            .finish()
    }
}
