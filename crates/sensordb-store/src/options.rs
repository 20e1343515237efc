//! Options for opening a store.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::{Mode, Retention};

/// Default time a statement waits for a lock held by another process.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite journal mode a producer configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    /// Rollback journal, SQLite's default.
    #[default]
    Delete,
    /// Write-ahead log. Readers never block the producer.
    Wal,
}

impl JournalMode {
    pub(crate) fn as_pragma(self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Wal => "WAL",
        }
    }
}

impl fmt::Display for JournalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalMode::Delete => f.write_str("delete"),
            JournalMode::Wal => f.write_str("wal"),
        }
    }
}

impl FromStr for JournalMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "delete" => Ok(JournalMode::Delete),
            "wal" => Ok(JournalMode::Wal),
            other => Err(format!(
                "unknown journal mode '{}': expected 'delete' or 'wal'",
                other
            )),
        }
    }
}

/// Builder for [`Store::open_with`](crate::Store::open_with).
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sensordb_store::{JournalMode, Mode, OpenOptions, Retention, Store};
///
/// let options = OpenOptions::new(Mode::Producer)
///     .retention(Retention::from(10_000))
///     .journal_mode(JournalMode::Wal)
///     .busy_timeout(Duration::from_secs(2));
/// let store = Store::open_with("/var/lib/sensordb/sensors.db", &options)?;
/// # Ok::<(), sensordb_store::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    pub mode: Mode,
    pub retention: Retention,
    pub busy_timeout: Duration,
    /// Journal mode a producer sets; `None` keeps whatever the file has.
    pub journal_mode: Option<JournalMode>,
}

impl OpenOptions {
    /// Options for the given role with unbounded retention.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            retention: Retention::Unbounded,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            journal_mode: None,
        }
    }

    /// Set the retention limit. Ignored by consumers.
    pub fn retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    /// Bound lock waits on a store shared with other processes.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Journal mode a producer switches the file to. Consumers leave the
    /// file untouched.
    pub fn journal_mode(mut self, journal_mode: JournalMode) -> Self {
        self.journal_mode = Some(journal_mode);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_options_defaults() {
        let options = OpenOptions::new(Mode::Consumer);
        assert_eq!(options.mode, Mode::Consumer);
        assert_eq!(options.retention, Retention::Unbounded);
        assert_eq!(options.busy_timeout, DEFAULT_BUSY_TIMEOUT);
        assert_eq!(options.journal_mode, None);

        let options = options.journal_mode(JournalMode::Wal);
        assert_eq!(options.journal_mode, Some(JournalMode::Wal));
    }

    #[test]
    fn test_journal_mode_parse() {
        assert_eq!("WAL".parse::<JournalMode>(), Ok(JournalMode::Wal));
        assert_eq!("delete".parse::<JournalMode>(), Ok(JournalMode::Delete));
        assert!("memory".parse::<JournalMode>().is_err());
        assert_eq!(JournalMode::Wal.to_string(), "wal");
    }
}
