//! Local persistence for BMP280/HTU21D sensor samples.
//!
//! This crate provides a SQLite-based, retention-bounded time-series store
//! with a single-writer/multi-reader discipline.
//!
//! # Features
//!
//! - Producer handles create the store, append readings and evict the
//!   oldest samples beyond a retention limit
//! - Consumer handles open an existing store strictly read-only
//! - Latest-sample and last-N reads, plus incremental reads by id
//! - CSV and JSON export
//!
//! # Example
//!
//! ```no_run
//! use sensordb_store::{Mode, Reading, Retention, Store};
//!
//! let producer = Store::open("sensors.db", Mode::Producer, Retention::from(1000))?;
//! producer.append(&Reading::new(25.5, 1013.2, 25.0, 40.0))?;
//!
//! let consumer = Store::open("sensors.db", Mode::Consumer, Retention::Unbounded)?;
//! let latest = consumer.read_latest()?;
//! let recent = consumer.read_last_n(10)?;
//! # Ok::<(), sensordb_store::Error>(())
//! ```

mod error;
pub mod export;
mod models;
mod options;
mod queries;
mod schema;
mod store;

pub use error::{Error, ErrorKind, Result};
pub use models::{Appended, Eviction, Mode, Reading, Retention, Sample};
pub use options::{DEFAULT_BUSY_TIMEOUT, JournalMode, OpenOptions};
pub use queries::SampleQuery;
pub use schema::{COLUMNS, TABLE};
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/sensordb/sensors.db`
/// - macOS: `~/Library/Application Support/sensordb/sensors.db`
/// - Windows: `C:\Users\<user>\AppData\Local\sensordb\sensors.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("sensordb")
        .join("sensors.db")
}
