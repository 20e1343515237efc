//! Ingest command: append readings from `t,p,t,h` lines.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use sensordb_store::{Eviction, Reading, Store};
use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::util::open_producer;

/// Outcome of an ingest run.
#[derive(Debug, Default, PartialEq)]
pub struct IngestReport {
    /// Readings appended.
    pub appended: usize,
    /// Samples evicted by retention along the way.
    pub evicted: usize,
    /// Malformed lines, as `line N: reason`.
    pub errors: Vec<String>,
}

/// Append every well-formed line of `input` (or stdin) as the producer.
pub fn cmd_ingest(
    db: &Path,
    storage: &StorageConfig,
    input: Option<PathBuf>,
    retention: Option<i64>,
    quiet: bool,
) -> Result<()> {
    let data = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
    };

    let store = open_producer(db, storage, retention)?;
    let report = ingest(&store, &data)?;
    store.close().context("Failed to close database")?;

    if !quiet {
        println!("Ingest complete:");
        println!("  Appended: {}", report.appended);
        println!("  Evicted: {}", report.evicted);
        println!("  Skipped (malformed): {}", report.errors.len());
    }
    for error in &report.errors {
        eprintln!("  {}", error);
    }

    Ok(())
}

/// Append the readings in `data`, skipping blank, comment and malformed lines.
pub fn ingest(store: &Store, data: &str) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for (index, line) in data.lines().enumerate() {
        let line_no = index + 1;
        let reading = match parse_line(line) {
            Ok(Some(reading)) => reading,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping line {}: {}", line_no, e);
                report.errors.push(format!("line {}: {}", line_no, e));
                continue;
            }
        };

        let appended = store
            .append(&reading)
            .with_context(|| format!("Failed to append line {}", line_no))?;
        debug!("Line {} stored as sample #{}", line_no, appended.id);
        report.appended += 1;
        if let Eviction::Evicted(n) = appended.eviction {
            report.evicted += n;
        }
    }

    Ok(report)
}

/// Parse one `t,p,t,h` line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Reading>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        bail!("expected 4 comma-separated values, found {}", fields.len());
    }

    let mut values = [0.0f64; 4];
    for (value, field) in values.iter_mut().zip(&fields) {
        *value = field
            .parse()
            .with_context(|| format!("invalid number '{}'", field))?;
    }

    Ok(Some(Reading::new(values[0], values[1], values[2], values[3])))
}
