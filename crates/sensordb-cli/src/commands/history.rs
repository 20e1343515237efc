//! History command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::OutputFormat;
use crate::config::StorageConfig;
use crate::format::{FormatOptions, format_samples};
use crate::util::{open_consumer, write_output};

/// Arguments for the history command.
pub struct HistoryArgs<'a> {
    pub count: usize,
    pub oldest_first: bool,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub opts: &'a FormatOptions,
}

/// Print the last `count` samples.
pub fn cmd_history(db: &Path, storage: &StorageConfig, args: HistoryArgs<'_>) -> Result<()> {
    let HistoryArgs {
        count,
        oldest_first,
        format,
        output,
        opts,
    } = args;

    let store = open_consumer(db, storage)?;
    let mut samples = store
        .read_last_n(count)
        .context("Failed to read samples")?;
    if oldest_first {
        samples.reverse();
    }

    let content = format_samples(&samples, format, opts)?;
    write_output(output, &content)
}
