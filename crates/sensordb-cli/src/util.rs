//! Shared helpers for command implementations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sensordb_store::{Mode, Store};

use crate::config::StorageConfig;

/// Open the store as the producer, creating it if needed.
pub fn open_producer(db: &Path, storage: &StorageConfig, retention: Option<i64>) -> Result<Store> {
    let options = storage.open_options(Mode::Producer, retention);
    Store::open_with(db, &options)
        .with_context(|| format!("Failed to open database {}", db.display()))
}

/// Open an existing store read-only.
pub fn open_consumer(db: &Path, storage: &StorageConfig) -> Result<Store> {
    let options = storage.open_options(Mode::Consumer, None);
    Store::open_with(db, &options)
        .with_context(|| format!("Failed to open database {}", db.display()))
}

/// Write output to file or stdout.
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output(Some(&path), "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_open_consumer_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        let err = open_consumer(&path, &StorageConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to open database"));
        let store_err = err.downcast_ref::<sensordb_store::Error>().unwrap();
        assert!(store_err.is_not_found());
        assert!(!path.exists());
    }

    #[test]
    fn test_open_producer_then_consumer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensors.db");
        let storage = StorageConfig::default();

        let producer = open_producer(&path, &storage, Some(5)).unwrap();
        assert_eq!(producer.retention().limit(), Some(5));
        let consumer = open_consumer(&path, &storage).unwrap();
        assert_eq!(consumer.mode(), Mode::Consumer);
    }
}
