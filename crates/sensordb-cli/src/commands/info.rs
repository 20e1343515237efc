//! Info command: database location and contents summary.

use std::path::Path;

use anyhow::{Context, Result};
use sensordb_store::Error;

use crate::config::StorageConfig;
use crate::util::open_consumer;

/// Print the database path, size, sample count and id range.
pub fn cmd_info(db: &Path, storage: &StorageConfig) -> Result<()> {
    println!("Database path: {}", db.display());

    if !db.exists() {
        println!("Database does not exist yet. Run 'sensordb log' to create it.");
        return Ok(());
    }

    let metadata = std::fs::metadata(db)
        .with_context(|| format!("Failed to stat {}", db.display()))?;
    println!("Database size: {} KB", metadata.len() / 1024);

    let store = open_consumer(db, storage)?;
    println!("Samples: {}", store.count()?);

    match store.id_range()? {
        Some((first, last)) => println!("Id range: {}..={}", first, last),
        None => println!("Id range: (empty)"),
    }

    match store.read_latest() {
        Ok(latest) => println!("Latest sample: {} UTC", latest.timestamp),
        Err(Error::Empty) => {}
        Err(e) => return Err(e).context("Failed to read latest sample"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_missing_database_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("sensors.db");
        cmd_info(&db, &StorageConfig::default()).unwrap();
        assert!(!db.exists());
    }

    #[test]
    fn test_info_rejects_non_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("sensors.db");
        std::fs::write(&db, vec![0x42u8; 4096]).unwrap();
        assert!(cmd_info(&db, &StorageConfig::default()).is_err());
    }
}
