//! Latest command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sensordb_store::Error;

use crate::cli::OutputFormat;
use crate::config::StorageConfig;
use crate::format::{FormatOptions, format_sample};
use crate::util::{open_consumer, write_output};

/// Print the most recent sample. An empty store is not an error.
pub fn cmd_latest(
    db: &Path,
    storage: &StorageConfig,
    format: OutputFormat,
    output: Option<&PathBuf>,
    opts: &FormatOptions,
) -> Result<()> {
    let store = open_consumer(db, storage)?;

    let sample = match store.read_latest() {
        Ok(sample) => sample,
        Err(Error::Empty) => {
            eprintln!("No samples stored yet. Run 'sensordb log' to record one.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to read latest sample"),
    };

    let content = format_sample(&sample, format, opts)?;
    write_output(output, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::open_producer;
    use sensordb_store::Reading;

    #[test]
    fn test_latest_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("sensors.db");
        let out = dir.path().join("latest.json");
        let storage = StorageConfig::default();

        let producer = open_producer(&db, &storage, None).unwrap();
        producer.append(&Reading::new(20.0, 1000.0, 19.5, 45.0)).unwrap();
        producer.append(&Reading::new(25.5, 1013.2, 25.0, 40.0)).unwrap();

        cmd_latest(
            &db,
            &storage,
            OutputFormat::Json,
            Some(&out),
            &FormatOptions::default(),
        )
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["id"], 2);
        assert_eq!(value["bmp280_temperature"], 25.5);
    }

    #[test]
    fn test_latest_on_empty_store_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("sensors.db");
        let out = dir.path().join("latest.txt");
        let storage = StorageConfig::default();
        open_producer(&db, &storage, None).unwrap();

        cmd_latest(
            &db,
            &storage,
            OutputFormat::Text,
            Some(&out),
            &FormatOptions::default(),
        )
        .unwrap();
        assert!(!out.exists());
    }
}
