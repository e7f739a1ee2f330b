//! Error types for database handles
//!
//! Every failure of [`DatabaseHandle`](crate::database::DatabaseHandle) maps onto exactly one
//! [`ErrorKind`]. The engine-specific detail travels along as a reason string.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The closed set of failure kinds a handle can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileNotExists,
    FileAlreadyExists,
    FileCannotBeCreated,
    FileCannotBeOpen,
    FileNotValidAppDatabase,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::FileNotExists => write!(f, "file does not exist"),
            ErrorKind::FileAlreadyExists => write!(f, "file already exists"),
            ErrorKind::FileCannotBeCreated => write!(f, "file cannot be created"),
            ErrorKind::FileCannotBeOpen => write!(f, "file cannot be open"),
            ErrorKind::FileNotValidAppDatabase => write!(f, "given file is not a valid file"),
        }
    }
}

/// Error returned by handle operations
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("file does not exist: {}", .path.display())]
    FileNotExists { path: PathBuf },

    #[error("file already exists: {}", .path.display())]
    FileAlreadyExists { path: PathBuf },

    #[error("file cannot be created: {}: {reason}", .path.display())]
    FileCannotBeCreated { path: PathBuf, reason: String },

    #[error("file cannot be open: {}: {reason}", .path.display())]
    FileCannotBeOpen { path: PathBuf, reason: String },

    #[error("given file is not a valid file: {}: {reason}", .path.display())]
    FileNotValidAppDatabase { path: PathBuf, reason: String },
}

impl HandleError {
    /// The kind of this error, without the attached detail
    pub fn kind(&self) -> ErrorKind {
        match self {
            HandleError::FileNotExists { .. } => ErrorKind::FileNotExists,
            HandleError::FileAlreadyExists { .. } => ErrorKind::FileAlreadyExists,
            HandleError::FileCannotBeCreated { .. } => ErrorKind::FileCannotBeCreated,
            HandleError::FileCannotBeOpen { .. } => ErrorKind::FileCannotBeOpen,
            HandleError::FileNotValidAppDatabase { .. } => ErrorKind::FileNotValidAppDatabase,
        }
    }
}
