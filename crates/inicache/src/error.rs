//! Error type for configuration store operations.
//!
//! Recoverable parse problems (malformed lines, duplicates) are never errors;
//! they are logged and skipped.  Everything here is fatal for the current
//! call and is returned to the caller unchanged.

use std::fmt;
use std::io;
use std::path::PathBuf;

use inicache_core::{KeyFormatError, ValueError};
use thiserror::Error;

/// The file operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Stat,
    Read,
    Write,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoOp::Stat => "stat",
            IoOp::Read => "read",
            IoOp::Write => "write",
        })
    }
}

/// Errors returned by [`crate::Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading, writing, or inspecting the backing file failed.
    #[error("failed to {op} {}: {source}, maybe permission denied", path.display())]
    Io {
        path: PathBuf,
        op: IoOp,
        #[source]
        source: io::Error,
    },

    /// The parent directory of the backing file could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file could not be created.
    #[error("failed to create file {}: {source}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored value could not be converted to the requested type.
    #[error(transparent)]
    Conversion(#[from] ValueError),

    /// A key template could not be formatted with its arguments.
    #[error(transparent)]
    KeyFormat(#[from] KeyFormatError),
}

impl SettingsError {
    /// Returns `true` for failures of the backing file or its directory.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            SettingsError::Io { .. } | SettingsError::CreateDir { .. } | SettingsError::CreateFile { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_message_names_operation_and_path() {
        // Arrange
        let err = SettingsError::Io {
            path: PathBuf::from("/etc/app.ini"),
            op: IoOp::Read,
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.starts_with("failed to read /etc/app.ini"), "got {msg}");
        assert!(err.is_storage());
    }

    #[test]
    fn test_conversion_error_is_not_storage() {
        let err = SettingsError::from(inicache_core::decode_value("x", 0).unwrap_err());
        assert!(!err.is_storage());
        assert!(err.to_string().contains("invalid integer value"));
    }
}
