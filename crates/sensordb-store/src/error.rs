//! Error types for sensordb-store.

use std::path::PathBuf;

/// Result type for sensordb-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sensordb-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Consumer open against a path with no store.
    #[error("Store does not exist: {path}")]
    NotFound { path: PathBuf },

    /// Read against a store that holds no samples.
    #[error("Store contains no samples")]
    Empty,

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// SQLite could not open the file or materialize the schema.
    #[error("Cannot open store {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    /// The file is a database but has no `SensorData` table.
    #[error("Store {path} has no SensorData table")]
    MissingTable { path: PathBuf },

    /// The `SensorData` table lacks an expected column.
    #[error("SensorData table is missing column '{column}'")]
    MissingColumn { column: &'static str },

    /// Mutation attempted through a consumer handle.
    #[error("Store is read-only (opened as consumer)")]
    ReadOnly,

    /// An insert or delete could not be completed.
    #[error("Write failed: {0}")]
    Write(#[source] rusqlite::Error),

    /// A query failed for a reason other than "no rows".
    #[error("Read failed: {0}")]
    Read(#[source] rusqlite::Error),

    /// The connection refused to close.
    #[error("Close failed: {0}")]
    Close(#[source] rusqlite::Error),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad failure categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing store on consumer open, or no samples on read.
    NotFound,
    /// Filesystem, engine or schema error during open.
    OpenFailed,
    /// Mutation attempted on a consumer handle.
    ReadOnlyViolation,
    /// Insert or eviction could not be completed.
    WriteFailed,
    /// Query execution error.
    ReadFailed,
    /// Releasing the connection failed.
    CloseFailed,
    /// Formatting samples for export failed.
    ExportFailed,
}

impl Error {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } | Error::Empty => ErrorKind::NotFound,
            Error::CreateDirectory { .. }
            | Error::Open { .. }
            | Error::MissingTable { .. }
            | Error::MissingColumn { .. } => ErrorKind::OpenFailed,
            Error::ReadOnly => ErrorKind::ReadOnlyViolation,
            Error::Write(_) => ErrorKind::WriteFailed,
            Error::Read(_) => ErrorKind::ReadFailed,
            Error::Close(_) => ErrorKind::CloseFailed,
            Error::Csv(_) | Error::Serialization(_) | Error::Io(_) => ErrorKind::ExportFailed,
        }
    }

    /// True for a missing store and for an empty one.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_empty_share_kind() {
        let missing = Error::NotFound {
            path: PathBuf::from("/tmp/none.db"),
        };
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert!(missing.is_not_found());
        assert!(Error::Empty.is_not_found());
    }

    #[test]
    fn test_open_failures_map_to_open_failed() {
        let err = Error::MissingTable {
            path: PathBuf::from("/tmp/other.db"),
        };
        assert_eq!(err.kind(), ErrorKind::OpenFailed);
        assert_eq!(
            Error::MissingColumn { column: "id" }.kind(),
            ErrorKind::OpenFailed
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::NotFound {
            path: PathBuf::from("/data/sensors.db"),
        };
        assert_eq!(err.to_string(), "Store does not exist: /data/sensors.db");
        assert_eq!(
            Error::ReadOnly.to_string(),
            "Store is read-only (opened as consumer)"
        );
        assert_eq!(Error::ReadOnly.kind(), ErrorKind::ReadOnlyViolation);
    }
}
