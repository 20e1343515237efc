//! Main store implementation.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, Row};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{Appended, Eviction, Mode, Reading, Retention, Sample};
use crate::options::OpenOptions;
use crate::queries::SampleQuery;
use crate::schema;

/// SQLite-based store for sensor samples.
///
/// A handle owns its connection exclusively and is not `Sync`: share it
/// between threads only behind an external lock, or open one handle per
/// thread.
pub struct Store {
    conn: Connection,
    mode: Mode,
    retention: Retention,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("mode", &self.mode)
            .field("retention", &self.retention)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Open a store at `path` in the given role.
    ///
    /// A producer creates the database and its table when absent. A consumer
    /// fails with [`Error::NotFound`] instead and never creates a file.
    pub fn open<P: AsRef<Path>>(path: P, mode: Mode, retention: Retention) -> Result<Self> {
        Self::open_with(path, &OpenOptions::new(mode).retention(retention))
    }

    /// Open a store with explicit options.
    pub fn open_with<P: AsRef<Path>>(path: P, options: &OpenOptions) -> Result<Self> {
        let path = path.as_ref();

        info!(
            "Opening database at {} as {} (retention: {})",
            path.display(),
            options.mode,
            options.retention
        );

        let conn = match options.mode {
            Mode::Producer => open_producer(path, options)?,
            Mode::Consumer => open_consumer(path, options)?,
        };

        Ok(Self {
            conn,
            mode: options.mode,
            retention: options.retention,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a producer store backed by an in-memory database (for testing).
    pub fn open_in_memory(retention: Retention) -> Result<Self> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        schema::initialize(&conn).map_err(|source| Error::Open { path, source })?;

        Ok(Self {
            conn,
            mode: Mode::Producer,
            retention,
            path: None,
        })
    }

    /// Role this handle was opened in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Retention limit enforced after each append.
    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// Backing file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Release the connection.
    ///
    /// Consumes the handle, so it cannot be used afterwards. Dropping a
    /// `Store` releases it too, without reporting errors.
    pub fn close(self) -> Result<()> {
        debug!("Closing {} store", self.mode);
        self.conn.close().map_err(|(_, e)| Error::Close(e))
    }
}

fn open_producer(path: &Path, options: &OpenOptions) -> Result<Connection> {
    let open_err = |source: rusqlite::Error| Error::Open {
        path: path.to_path_buf(),
        source,
    };

    // Create parent directories if needed
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags).map_err(open_err)?;

    conn.busy_timeout(options.busy_timeout).map_err(open_err)?;
    if let Some(journal_mode) = options.journal_mode {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = {};",
            journal_mode.as_pragma()
        ))
        .map_err(open_err)?;
    }

    schema::initialize(&conn).map_err(open_err)?;
    check_schema(&conn, path)?;

    Ok(conn)
}

fn open_consumer(path: &Path, options: &OpenOptions) -> Result<Connection> {
    // SQLite would report a missing file too, but only after the caller
    // could no longer tell it apart from a corrupt one.
    if matches!(path.try_exists(), Ok(false)) {
        warn!("Database does not exist: {}", path.display());
        return Err(Error::NotFound {
            path: path.to_path_buf(),
        });
    }

    let open_err = |source: rusqlite::Error| Error::Open {
        path: path.to_path_buf(),
        source,
    };

    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags).map_err(open_err)?;
    conn.busy_timeout(options.busy_timeout).map_err(open_err)?;

    check_schema(&conn, path)?;

    Ok(conn)
}

fn check_schema(conn: &Connection, path: &Path) -> Result<()> {
    match schema::verify(conn) {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::MissingTable {
            path: path.to_path_buf(),
        }),
        // Not a database, locked, unreadable
        Err(Error::Read(source)) => Err(Error::Open {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) => Err(e),
    }
}

// SQLite stores a bound NaN as NULL.
fn measurement(row: &Row<'_>, idx: usize) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(idx)?.unwrap_or(f64::NAN))
}

fn sample_from_row(row: &Row<'_>) -> rusqlite::Result<Sample> {
    Ok(Sample {
        id: row.get(0)?,
        timestamp: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        bmp280_temperature: measurement(row, 2)?,
        bmp280_pressure: measurement(row, 3)?,
        htu21d_temperature: measurement(row, 4)?,
        htu21d_humidity: measurement(row, 5)?,
    })
}

// Write operations
impl Store {
    /// Append one reading.
    ///
    /// The store assigns the id and timestamp. Under a retention limit the
    /// oldest samples are evicted afterwards; an eviction failure is logged
    /// and reported in [`Appended::eviction`] but does not fail the append,
    /// because the new sample is already committed.
    pub fn append(&self, reading: &Reading) -> Result<Appended> {
        if !self.mode.is_writable() {
            warn!("Refusing to append through a consumer handle");
            return Err(Error::ReadOnly);
        }

        self.conn
            .prepare_cached(
                "INSERT INTO SensorData (bmp280_temperature, bmp280_pressure,
                 htu21d_temperature, htu21d_humidity)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .and_then(|mut stmt| {
                stmt.execute(rusqlite::params![
                    reading.bmp280_temperature,
                    reading.bmp280_pressure,
                    reading.htu21d_temperature,
                    reading.htu21d_humidity,
                ])
            })
            .map_err(Error::Write)?;

        let id = self.conn.last_insert_rowid();
        debug!("Appended sample {}", id);

        let eviction = match self.retention {
            Retention::Unbounded => Eviction::Skipped,
            Retention::Limit(limit) => match self.evict(limit.get()) {
                Ok(removed) => Eviction::Evicted(removed),
                Err(e) => {
                    warn!("Retention trim after sample {} failed: {}", id, e);
                    Eviction::Failed(e.to_string())
                }
            },
        };

        Ok(Appended { id, eviction })
    }

    /// Run the retention step on demand.
    ///
    /// Returns the number of samples removed; `0` when retention is
    /// unbounded. Useful to retry after [`Eviction::Failed`].
    pub fn enforce_retention(&self) -> Result<usize> {
        if !self.mode.is_writable() {
            return Err(Error::ReadOnly);
        }

        match self.retention {
            Retention::Unbounded => Ok(0),
            Retention::Limit(limit) => self.evict(limit.get()).map_err(Error::Write),
        }
    }

    /// Delete everything but the `limit` highest ids.
    fn evict(&self, limit: u32) -> rusqlite::Result<usize> {
        let removed = self
            .conn
            .prepare_cached(
                "DELETE FROM SensorData WHERE id NOT IN (
                 SELECT id FROM SensorData ORDER BY id DESC LIMIT ?1)",
            )?
            .execute([i64::from(limit)])?;

        if removed > 0 {
            debug!("Evicted {} samples (limit {})", removed, limit);
        }

        Ok(removed)
    }
}

// Read operations
impl Store {
    /// Query samples with filters.
    pub fn query(&self, query: &SampleQuery) -> Result<Vec<Sample>> {
        let (sql, params) = query.build_sql();

        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare_cached(&sql).map_err(Error::Read)?;
        let samples = stmt
            .query_map(rusqlite::params_from_iter(params), sample_from_row)
            .map_err(Error::Read)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::Read)?;

        Ok(samples)
    }

    /// The most recently appended sample.
    ///
    /// Fails with [`Error::Empty`] when the store holds no samples.
    pub fn read_latest(&self) -> Result<Sample> {
        self.query(&SampleQuery::new().limit(1))?
            .into_iter()
            .next()
            .ok_or(Error::Empty)
    }

    /// Up to `max_samples` samples, newest first.
    ///
    /// Returns an empty vector for an empty store or `max_samples == 0`.
    pub fn read_last_n(&self, max_samples: usize) -> Result<Vec<Sample>> {
        if max_samples == 0 {
            return Ok(Vec::new());
        }
        self.query(&SampleQuery::new().limit(max_samples))
    }

    /// Up to `limit` samples appended after `id`, oldest first.
    ///
    /// Lets a consumer follow the store: pass the last id it has seen.
    pub fn read_after(&self, id: i64, limit: usize) -> Result<Vec<Sample>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.query(&SampleQuery::new().after_id(id).limit(limit).oldest_first())
    }

    /// Number of samples currently stored.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM SensorData", [], |row| row.get(0))
            .map_err(Error::Read)?;

        Ok(count.max(0) as u64)
    }

    /// Lowest and highest stored id, or `None` when empty.
    pub fn id_range(&self) -> Result<Option<(i64, i64)>> {
        let range: (Option<i64>, Option<i64>) = self
            .conn
            .query_row("SELECT MIN(id), MAX(id) FROM SensorData", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(Error::Read)?;

        Ok(match range {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        })
    }
}
