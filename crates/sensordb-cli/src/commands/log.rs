//! Log command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use sensordb_store::{Appended, Eviction, Reading};

use crate::config::StorageConfig;
use crate::util::open_producer;

/// Append one reading as the producer.
pub fn cmd_log(
    db: &Path,
    storage: &StorageConfig,
    reading: Reading,
    retention: Option<i64>,
    quiet: bool,
) -> Result<()> {
    let store = open_producer(db, storage, retention)?;
    let appended = store.append(&reading).context("Failed to append reading")?;
    store.close().context("Failed to close database")?;

    if !quiet {
        println!("{}", describe_append(&appended));
    }
    Ok(())
}

/// One-line summary of an append outcome.
pub fn describe_append(appended: &Appended) -> String {
    match &appended.eviction {
        Eviction::Skipped | Eviction::Evicted(0) => format!("Logged sample #{}", appended.id),
        Eviction::Evicted(n) => format!(
            "Logged sample #{} (evicted {} old sample{})",
            appended.id,
            n,
            if *n == 1 { "" } else { "s" }
        ),
        Eviction::Failed(_) => format!("Logged sample #{} (eviction failed)", appended.id),
    }
}
